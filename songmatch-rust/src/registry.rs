use std::collections::BTreeMap;

use crate::error::DatabaseError;
use crate::models::ItemId;

/// Bidirectional mapping between item ids and item names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    name_to_id: BTreeMap<String, ItemId>,
    id_to_name: BTreeMap<ItemId, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from its two persisted halves, rejecting any pair
    /// of maps that do not mirror each other.
    pub(crate) fn from_parts(
        name_to_id: BTreeMap<String, ItemId>,
        id_to_name: BTreeMap<ItemId, String>,
    ) -> Result<Self, DatabaseError> {
        for (id, name) in &id_to_name {
            if name_to_id.get(name) != Some(id) {
                return Err(DatabaseError::Inconsistent { item: *id });
            }
        }
        for (name, id) in &name_to_id {
            if id_to_name.get(id) != Some(name) {
                return Err(DatabaseError::Inconsistent { item: *id });
            }
        }
        Ok(Registry {
            name_to_id,
            id_to_name,
        })
    }

    pub(crate) fn parts(&self) -> (&BTreeMap<String, ItemId>, &BTreeMap<ItemId, String>) {
        (&self.name_to_id, &self.id_to_name)
    }

    /// Adds an entry. Both the id and the name must be new.
    pub fn insert(&mut self, item: ItemId, name: &str) -> Result<(), DatabaseError> {
        if self.id_to_name.contains_key(&item) {
            return Err(DatabaseError::DuplicateRegistration { item });
        }
        if self.name_to_id.contains_key(name) {
            return Err(DatabaseError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.name_to_id.insert(name.to_string(), item);
        self.id_to_name.insert(item, name.to_string());
        Ok(())
    }

    pub fn name_of(&self, item: ItemId) -> Option<&str> {
        self.id_to_name.get(&item).map(String::as_str)
    }

    pub fn id_of(&self, name: &str) -> Option<ItemId> {
        self.name_to_id.get(name).copied()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.id_to_name.contains_key(&item)
    }

    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &str)> {
        self.id_to_name.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_work_in_both_directions() {
        let mut registry = Registry::new();
        registry.insert(ItemId(7), "intro.json").unwrap();
        assert_eq!(registry.name_of(ItemId(7)), Some("intro.json"));
        assert_eq!(registry.id_of("intro.json"), Some(ItemId(7)));
        assert_eq!(registry.name_of(ItemId(8)), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = Registry::new();
        registry.insert(ItemId(1), "a").unwrap();
        let err = registry.insert(ItemId(1), "b").unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateRegistration { item: ItemId(1) }));
        assert_eq!(registry.name_of(ItemId(1)), Some("a"));
        assert_eq!(registry.id_of("b"), None);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = Registry::new();
        registry.insert(ItemId(1), "a").unwrap();
        assert!(matches!(
            registry.insert(ItemId(2), "a"),
            Err(DatabaseError::DuplicateName { .. })
        ));
        assert!(!registry.contains(ItemId(2)));
    }

    #[test]
    fn mismatched_halves_are_inconsistent() {
        let name_to_id = BTreeMap::from([("a".to_string(), ItemId(1))]);
        let id_to_name = BTreeMap::from([(ItemId(2), "a".to_string())]);
        assert!(matches!(
            Registry::from_parts(name_to_id, id_to_name),
            Err(DatabaseError::Inconsistent { item: ItemId(2) })
        ));
    }
}
