use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Namespace for ids that were not written as UUIDs (hand-edited or legacy
/// map files). Hashing them into a v5 UUID keeps them stable across loads.
const LEGACY_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_5d2e_94a1_4b7e_8c3f_2a90_d1e4_b7c5);

/// Identifier of a pin or region. Assigned once on creation, never reassigned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(Uuid);

impl AnnotationId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its persisted form.
    ///
    /// Strings that are not UUIDs map deterministically onto one, so the same
    /// legacy id always yields the same `AnnotationId`.
    pub fn from_persisted(s: &str) -> Self {
        match Uuid::parse_str(s) {
            Ok(uuid) => Self(uuid),
            Err(_) => Self(Uuid::new_v5(&LEGACY_NAMESPACE, s.as_bytes())),
        }
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AnnotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for AnnotationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Debug for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for AnnotationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(AnnotationId::from_persisted(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let a = AnnotationId::new();
        let b = AnnotationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn uuid_strings_parse_verbatim() {
        let id = AnnotationId::new();
        let parsed = AnnotationId::from_persisted(&id.to_string());
        assert_eq!(parsed, id);
    }

    #[test]
    fn legacy_ids_are_stable() {
        let a = AnnotationId::from_persisted("pin-1700000000000");
        let b = AnnotationId::from_persisted("pin-1700000000000");
        let c = AnnotationId::from_persisted("pin-1700000000001");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
