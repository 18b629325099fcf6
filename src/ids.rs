use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of something the player can pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u32);

/// Handle of something the player can drop onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Session-scoped id allocator; ids are never reused until the session resets.
#[derive(Debug, Clone, Default)]
pub struct IdSeq {
    next: u32,
}

impl IdSeq {
    pub fn next_token(&mut self) -> TokenId {
        TokenId(self.bump())
    }

    pub fn next_target(&mut self) -> TargetId {
        TargetId(self.bump())
    }

    fn bump(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_across_kinds() {
        let mut ids = IdSeq::default();
        assert_eq!(ids.next_token(), TokenId(0));
        assert_eq!(ids.next_target(), TargetId(1));
        assert_eq!(ids.next_token(), TokenId(2));
    }
}
