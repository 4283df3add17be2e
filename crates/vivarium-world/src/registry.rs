//! Per-kind views over the environment's organisms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use vivarium_core::{Kind, OrganismId};

/// Ordered id sets for each organism kind, owned by one simulation session.
///
/// Only the environment inserts or removes entries, in the same step as its
/// organism collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationRegistry {
    insects: BTreeSet<OrganismId>,
    plants: BTreeSet<OrganismId>,
}

impl PopulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: OrganismId, kind: Kind) -> bool {
        match kind {
            Kind::Insect => self.insects.insert(id),
            Kind::Plant => self.plants.insert(id),
        }
    }

    pub(crate) fn remove(&mut self, id: OrganismId) -> bool {
        self.insects.remove(&id) || self.plants.remove(&id)
    }

    pub fn insects(&self) -> impl Iterator<Item = OrganismId> + '_ {
        self.insects.iter().copied()
    }

    pub fn plants(&self) -> impl Iterator<Item = OrganismId> + '_ {
        self.plants.iter().copied()
    }

    pub fn of_kind(&self, kind: Kind) -> &BTreeSet<OrganismId> {
        match kind {
            Kind::Insect => &self.insects,
            Kind::Plant => &self.plants,
        }
    }

    pub fn kind_of(&self, id: OrganismId) -> Option<Kind> {
        if self.insects.contains(&id) {
            Some(Kind::Insect)
        } else if self.plants.contains(&id) {
            Some(Kind::Plant)
        } else {
            None
        }
    }

    pub fn contains(&self, id: OrganismId) -> bool {
        self.kind_of(id).is_some()
    }

    pub fn insect_count(&self) -> usize {
        self.insects.len()
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn len(&self) -> usize {
        self.insects.len() + self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_are_ordered_and_kind_scoped() {
        let mut registry = PopulationRegistry::new();
        registry.insert(OrganismId(7), Kind::Insect);
        registry.insert(OrganismId(2), Kind::Insect);
        registry.insert(OrganismId(5), Kind::Plant);

        assert_eq!(registry.insects().collect::<Vec<_>>(), vec![OrganismId(2), OrganismId(7)]);
        assert_eq!(registry.plants().collect::<Vec<_>>(), vec![OrganismId(5)]);
        assert_eq!(registry.kind_of(OrganismId(5)), Some(Kind::Plant));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_remove() {
        let mut registry = PopulationRegistry::new();
        registry.insert(OrganismId(1), Kind::Plant);
        assert!(registry.remove(OrganismId(1)));
        assert!(!registry.remove(OrganismId(1)));
        assert!(registry.is_empty());
        assert_eq!(registry.kind_of(OrganismId(1)), None);
    }

    #[test]
    fn test_duplicate_insert_reports_false() {
        let mut registry = PopulationRegistry::new();
        assert!(registry.insert(OrganismId(1), Kind::Insect));
        assert!(!registry.insert(OrganismId(1), Kind::Insect));
        assert_eq!(registry.insect_count(), 1);
    }
}
