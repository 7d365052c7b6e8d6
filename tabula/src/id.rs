use sha2::{Digest, Sha256};

/// Stable identifier of a table, derived from its name and enclosing scope.
///
/// The same name under the same parent always hashes to the same id, so
/// persisted settings find their table again across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u32);

impl TableId {
    /// Id `0` marks discarded settings records and is never produced by hashing.
    pub const NONE: TableId = TableId(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Hash `name` within `seed`. Text after `###` replaces the whole label for hashing.
    pub fn from_name(name: &str, seed: TableId) -> Self {
        let key = match name.find("###") {
            Some(pos) => &name[pos..],
            None => name,
        };
        let mut hasher = Sha256::new();
        hasher.update(seed.0.to_be_bytes());
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();
        let raw = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        Self(if raw == 0 { 1 } else { raw })
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_scope_is_stable() {
        let a = TableId::from_name("files", TableId::NONE);
        let b = TableId::from_name("files", TableId::NONE);
        assert_eq!(a, b);
        assert!(!a.is_none());
    }

    #[test]
    fn test_scope_changes_id() {
        let outer = TableId::from_name("outer", TableId::NONE);
        assert_ne!(
            TableId::from_name("files", TableId::NONE),
            TableId::from_name("files", outer)
        );
    }

    #[test]
    fn test_triple_hash_overrides_label() {
        assert_eq!(
            TableId::from_name("Files (3)###files", TableId::NONE),
            TableId::from_name("Files (12)###files", TableId::NONE)
        );
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(TableId::from_raw(0xAB).to_string(), "0x000000AB");
    }
}
