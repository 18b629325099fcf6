//! Vocabulary lists bundled with the binary.

use crate::item::{InMemoryItems, ItemId, ListId, PracticeItem};
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::from_str;
use thiserror::Error;

static CATALOG_DIR: Dir = include_dir!("src/catalog");

/// Item ids are `list id * ITEM_ID_STRIDE + position in list`.
const ITEM_ID_STRIDE: ItemId = 10_000;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no bundled list named {0:?}")]
    NotFound(String),
    #[error("bundled list {0:?} is not valid UTF-8")]
    NotUtf8(String),
    #[error("bundled list is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize, Clone, Debug)]
struct RawEntry {
    prompt: String,
    answer: String,
    #[serde(default)]
    starred: bool,
}

#[derive(Deserialize, Clone, Debug)]
struct RawList {
    id: ListId,
    name: String,
    items: Vec<RawEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VocabList {
    pub id: ListId,
    pub name: String,
    pub items: Vec<PracticeItem>,
}

impl VocabList {
    pub fn load(name: &str) -> Result<Self, CatalogError> {
        let file_name = format!("{name}.json");
        let file = CATALOG_DIR
            .get_file(&file_name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        let text = file
            .contents_utf8()
            .ok_or_else(|| CatalogError::NotUtf8(name.to_string()))?;
        let raw: RawList = from_str(text)?;

        let items = raw
            .items
            .into_iter()
            .enumerate()
            .map(|(i, entry)| PracticeItem {
                id: raw.id * ITEM_ID_STRIDE + i as ItemId,
                prompt: entry.prompt,
                answer: entry.answer,
                starred: entry.starred,
                streak: 0,
            })
            .collect();
        Ok(VocabList {
            id: raw.id,
            name: raw.name,
            items,
        })
    }
}

/// Names of all bundled lists, sorted.
pub fn list_names() -> Vec<String> {
    CATALOG_DIR
        .files()
        .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
        .filter_map(|f| f.path().file_stem().map(|s| s.to_string_lossy().into_owned()))
        .sorted()
        .collect()
}

/// Every bundled list, keyed by list id.
pub fn load_all() -> Result<InMemoryItems, CatalogError> {
    let mut source = InMemoryItems::new();
    for name in list_names() {
        let list = VocabList::load(&name)?;
        source.insert_list(list.id, list.items);
    }
    Ok(source)
}
