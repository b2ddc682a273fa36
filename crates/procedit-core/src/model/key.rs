use serde::{Deserialize, Serialize};

/// Opaque address of a content node in the store
///
/// Keys are allocated from a per-store counter and never reused within that
/// store, so a stale key can be detected by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(u64);

impl ContentKey {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_order() {
        let a = ContentKey::new(2);
        let b = ContentKey::new(10);
        assert_eq!(a.to_string(), "#2");
        assert!(a < b);
        assert_eq!(b.raw(), 10);
    }
}
