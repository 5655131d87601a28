use smartlist_models::{CatalogId, CatalogItem};
use std::collections::{BTreeMap, BTreeSet};

/// Differences between what a list tracks and what it should contain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Target items not yet tracked, in id order
    pub to_add: Vec<CatalogItem>,
    /// Tracked ids absent from the target, in id order
    pub to_remove: Vec<CatalogId>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn add_chunks(&self, size: usize) -> std::slice::Chunks<'_, CatalogItem> {
        self.to_add.chunks(size.max(1))
    }

    pub fn remove_chunks(&self, size: usize) -> std::slice::Chunks<'_, CatalogId> {
        self.to_remove.chunks(size.max(1))
    }
}

/// Set difference in both directions between `tracked` and `target`.
pub fn plan(
    tracked: &BTreeSet<CatalogId>,
    target: &BTreeMap<CatalogId, CatalogItem>,
) -> ReconcilePlan {
    let to_add = target
        .iter()
        .filter(|(id, _)| !tracked.contains(id))
        .map(|(_, item)| item.clone())
        .collect();
    let to_remove = tracked
        .iter()
        .filter(|id| !target.contains_key(id))
        .copied()
        .collect();

    ReconcilePlan { to_add, to_remove }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(ids: &[u64]) -> BTreeMap<CatalogId, CatalogItem> {
        ids.iter()
            .map(|&id| (CatalogId(id), CatalogItem::new(id, format!("Item {}", id), None)))
            .collect()
    }

    fn tracked(ids: &[u64]) -> BTreeSet<CatalogId> {
        ids.iter().map(|&id| CatalogId(id)).collect()
    }

    fn added_ids(plan: &ReconcilePlan) -> Vec<u64> {
        plan.to_add.iter().map(|item| item.id.0).collect()
    }

    #[test]
    fn test_plan_is_symmetric_difference() {
        // A=1 B=2 C=3 D=4
        let plan = plan(&tracked(&[1, 2, 3]), &target(&[2, 3, 4]));
        assert_eq!(added_ids(&plan), vec![4]);
        assert_eq!(plan.to_remove, vec![CatalogId(1)]);
    }

    #[test]
    fn test_plan_sets_are_disjoint() {
        let plan = plan(&tracked(&[1, 5, 9, 12]), &target(&[5, 6, 7, 12, 13]));
        for item in &plan.to_add {
            assert!(!plan.to_remove.contains(&item.id));
        }
        assert_eq!(added_ids(&plan), vec![6, 7, 13]);
        assert_eq!(plan.to_remove, vec![CatalogId(1), CatalogId(9)]);
    }

    #[test]
    fn test_applying_plan_reaches_target() {
        let current = tracked(&[1, 2, 3]);
        let wanted = target(&[3, 4, 5]);
        let first = plan(&current, &wanted);

        let mut after: BTreeSet<CatalogId> = current
            .iter()
            .filter(|id| !first.to_remove.contains(id))
            .copied()
            .collect();
        after.extend(first.to_add.iter().map(|item| item.id));

        assert_eq!(after, wanted.keys().copied().collect());
        assert!(plan(&after, &wanted).is_empty());
    }

    #[test]
    fn test_empty_target_removes_everything() {
        let plan = plan(&tracked(&[1, 2]), &BTreeMap::new());
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove.len(), 2);
    }

    #[test]
    fn test_chunks_respect_size() {
        let ids: Vec<u64> = (1..=250).collect();
        let plan = plan(&BTreeSet::new(), &target(&ids));

        let sizes: Vec<usize> = plan.add_chunks(100).map(|chunk| chunk.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(plan.add_chunks(0).count(), 250);
        assert_eq!(plan.remove_chunks(100).count(), 0);
    }
}
