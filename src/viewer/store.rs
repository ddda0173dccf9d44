//! Holder for the latest validated [`SolutionSet`].

use thiserror::Error;

use crate::solve::{SolutionSet, SolutionVariant, SOLUTION_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("solution index {0} is out of range 0..4")]
    IndexOutOfRange(usize),

    #[error("no solutions are loaded")]
    Empty,
}

/// Latest validated result set, replaced wholesale (never merged).
#[derive(Debug, Clone, Default)]
pub struct SolutionStore {
    current: Option<SolutionSet>,
}

impl SolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite whatever is stored.
    pub fn replace(&mut self, set: SolutionSet) {
        self.current = Some(set);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&SolutionSet> {
        self.current.as_ref()
    }

    /// Variant at `index`.  The range check comes first, so an out-of-range
    /// index is reported as such even when the store is empty.
    pub fn get_by_index(&self, index: usize) -> Result<&SolutionVariant, StoreError> {
        if index >= SOLUTION_COUNT {
            return Err(StoreError::IndexOutOfRange(index));
        }
        self.current
            .as_ref()
            .and_then(|set| set.get(index))
            .ok_or(StoreError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::model::fixtures::{solution_set, variant};
    use crate::solve::ApproachType;

    #[test]
    fn empty_store() {
        let store = SolutionStore::new();
        assert!(store.current().is_none());
        assert_eq!(store.get_by_index(0), Err(StoreError::Empty));
        assert_eq!(store.get_by_index(4), Err(StoreError::IndexOutOfRange(4)));
    }

    #[test]
    fn get_by_index_in_and_out_of_range() {
        let mut store = SolutionStore::new();
        store.replace(solution_set());

        assert_eq!(
            store.get_by_index(2).unwrap().approach_type,
            ApproachType::SpaceOptimized
        );
        assert_eq!(store.get_by_index(4), Err(StoreError::IndexOutOfRange(4)));
        assert_eq!(
            store.get_by_index(usize::MAX),
            Err(StoreError::IndexOutOfRange(usize::MAX))
        );
    }

    #[test]
    fn replace_overwrites_without_merging() {
        let mut store = SolutionStore::new();
        store.replace(solution_set());

        let mut variants: Vec<_> = ApproachType::ORDER.iter().copied().map(variant).collect();
        variants[0].title = "Replaced".into();
        store.replace(SolutionSet::new(variants).unwrap());

        assert_eq!(store.get_by_index(0).unwrap().title, "Replaced");
        assert_eq!(store.current().unwrap().len(), 4);

        store.clear();
        assert!(store.current().is_none());
    }
}
