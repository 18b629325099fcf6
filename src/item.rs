use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ItemId = u64;
pub type ListId = u64;

/// A prompt/answer pair owned by the external item store.
///
/// The engine never mutates an item; it only reports outcomes back by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeItem {
    pub id: ItemId,
    pub prompt: String,
    pub answer: String,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub streak: u32,
}

impl PracticeItem {
    pub fn new(id: ItemId, prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            answer: answer.into(),
            starred: false,
            streak: 0,
        }
    }

    pub fn starred(mut self) -> Self {
        self.starred = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FocusMode {
    #[default]
    All,
    StarredOnly,
}

impl FocusMode {
    pub fn admits(&self, item: &PracticeItem) -> bool {
        match self {
            FocusMode::All => true,
            FocusMode::StarredOnly => item.starred,
        }
    }
}

/// Which word lists a session draws from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListSelection {
    #[default]
    All,
    Lists(Vec<ListId>),
}

/// Read-only view of the practice item store.
pub trait ItemSource {
    /// Ordered items for the given selection, already filtered by `focus`.
    fn items(&self, selection: &ListSelection, focus: FocusMode) -> Vec<PracticeItem>;
}

/// Item store backed by plain vectors, grouped by list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItems {
    lists: BTreeMap<ListId, Vec<PracticeItem>>,
}

impl InMemoryItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, list: ListId, items: Vec<PracticeItem>) -> Self {
        self.insert_list(list, items);
        self
    }

    pub fn insert_list(&mut self, list: ListId, items: Vec<PracticeItem>) {
        self.lists.entry(list).or_default().extend(items);
    }
}

impl ItemSource for InMemoryItems {
    fn items(&self, selection: &ListSelection, focus: FocusMode) -> Vec<PracticeItem> {
        let lists: Vec<&Vec<PracticeItem>> = match selection {
            ListSelection::All => self.lists.values().collect(),
            ListSelection::Lists(ids) => ids.iter().filter_map(|id| self.lists.get(id)).collect(),
        };

        lists
            .into_iter()
            .flatten()
            .filter(|item| focus.admits(item))
            .cloned()
            .collect()
    }
}
