use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A cluster: one parameter value shared by a set of items.
///
/// The value is held behind an `Arc` so that cloning a [`Partition`] copies
/// the item sets but shares the values.
#[derive(Debug, PartialEq)]
pub struct Cell<P> {
    value: Arc<P>,
    items: Vec<usize>,
}

impl<P> Cell<P> {
    fn new(value: Arc<P>) -> Self {
        Cell {
            value,
            items: Vec::new(),
        }
    }

    /// The parameter value of the cluster
    #[inline]
    pub fn value(&self) -> &P {
        &self.value
    }

    /// Shared handle to the parameter value
    #[inline]
    pub fn value_arc(&self) -> Arc<P> {
        Arc::clone(&self.value)
    }

    /// Indices of the items in the cluster, in no particular order
    #[inline]
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// Number of items in the cluster
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Errors building or validating a [`Partition`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// The labels reference a different number of clusters than there are
    /// values
    #[error("labels use {n_labels} clusters but {n_values} values were given")]
    ValueCountMismatch { n_labels: usize, n_values: usize },
    /// A label in 0..k has no items
    #[error("cluster {label} has no items")]
    EmptyCluster { label: usize },
    /// An item in 0..n does not belong to any cluster
    #[error("item {item} is not assigned to a cluster")]
    UnassignedItem { item: usize },
    /// An item index outside 0..n is assigned
    #[error("item {item} is out of range for {n_items} items")]
    ItemOutOfRange { item: usize, n_items: usize },
    /// An item appears more than once
    #[error("item {item} is assigned more than once")]
    DuplicateItem { item: usize },
}

/// The clustering state of a chain.
///
/// An arena of [`Cell`]s addressed by index. Cell order is insertion order
/// and only matters for addressing; [`Partition::remove_empty_cells`] keeps
/// the relative order of the survivors.
///
/// Every item belongs to exactly one cell, except transiently while a
/// sampler has removed an item and not yet reassigned it.
///
/// # Example
///
/// ```rust
/// use dpmix::data::Partition;
///
/// let mut part: Partition<f64> = Partition::new();
/// let a = part.add_cell(0.1);
/// let b = part.add_cell(0.9);
///
/// part.add_item(0, a);
/// part.add_item(1, b);
/// part.add_item(2, a);
///
/// assert_eq!(part.labels(), vec![0, 1, 0]);
/// assert_eq!(part.counts(), vec![2, 1]);
///
/// // Moving the only item out of a cell leaves it empty until pruned
/// part.remove_item(1, b);
/// part.add_item(1, a);
/// assert_eq!(part.n_cells(), 2);
///
/// part.remove_empty_cells();
/// assert_eq!(part.n_cells(), 1);
/// assert_eq!(part.labels(), vec![0, 0, 0]);
/// ```
#[derive(Debug, PartialEq)]
pub struct Partition<P> {
    cells: Vec<Cell<P>>,
    /// The cell index owning each item, `None` while unassigned
    owner: Vec<Option<usize>>,
}

// Manual impls so that cloning never requires `P: Clone`
impl<P> Clone for Cell<P> {
    fn clone(&self) -> Self {
        Cell {
            value: Arc::clone(&self.value),
            items: self.items.clone(),
        }
    }
}

impl<P> Clone for Partition<P> {
    fn clone(&self) -> Self {
        Partition {
            cells: self.cells.clone(),
            owner: self.owner.clone(),
        }
    }
}

impl<P> Default for Partition<P> {
    fn default() -> Self {
        Partition::new()
    }
}

impl<P> Partition<P> {
    /// Empty partition
    #[must_use]
    pub fn new() -> Self {
        Partition {
            cells: Vec::new(),
            owner: Vec::new(),
        }
    }

    /// Build a partition from per-item cluster labels and one value per
    /// label.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use dpmix::data::Partition;
    /// let part = Partition::from_labels(&[0, 1, 0, 2], vec![0.2, 0.5, 0.8])
    ///     .unwrap();
    /// assert_eq!(part.counts(), vec![2, 1, 1]);
    /// assert_eq!(*part.value(2), 0.8);
    ///
    /// // Label 2 would have no items
    /// assert!(Partition::from_labels(&[0, 1, 0], vec![0.2, 0.5, 0.8]).is_err());
    /// ```
    pub fn from_labels(
        labels: &[usize],
        values: Vec<P>,
    ) -> Result<Self, PartitionError> {
        let n_labels = labels.iter().max().map_or(0, |&k| k + 1);
        if n_labels != values.len() {
            return Err(PartitionError::ValueCountMismatch {
                n_labels,
                n_values: values.len(),
            });
        }

        let mut part = Partition::new();
        values.into_iter().for_each(|value| {
            part.add_cell(value);
        });
        labels
            .iter()
            .enumerate()
            .for_each(|(item, &label)| part.add_item(item, label));

        if let Some(label) = part.cells.iter().position(Cell::is_empty) {
            Err(PartitionError::EmptyCluster { label })
        } else {
            Ok(part)
        }
    }

    /// Append a new, empty cell holding `value`. Returns its index.
    pub fn add_cell(&mut self, value: P) -> usize {
        self.add_cell_shared(Arc::new(value))
    }

    /// Append a new, empty cell sharing an existing value. Returns its index.
    pub fn add_cell_shared(&mut self, value: Arc<P>) -> usize {
        self.cells.push(Cell::new(value));
        self.cells.len() - 1
    }

    /// Put `item` in the cell at `cell_ix`.
    ///
    /// The item must not currently belong to any cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell_ix` is out of range.
    pub fn add_item(&mut self, item: usize, cell_ix: usize) {
        assert!(
            cell_ix < self.cells.len(),
            "cell index {cell_ix} out of range for {} cells",
            self.cells.len()
        );
        if item >= self.owner.len() {
            self.owner.resize(item + 1, None);
        }
        debug_assert!(
            self.owner[item].is_none(),
            "item {item} is already assigned to cell {:?}",
            self.owner[item]
        );
        self.owner[item] = Some(cell_ix);
        self.cells[cell_ix].items.push(item);
    }

    /// Take `item` out of the cell at `cell_ix`. The cell is kept even if it
    /// becomes empty.
    ///
    /// # Panics
    ///
    /// Panics if the item is not in that cell.
    pub fn remove_item(&mut self, item: usize, cell_ix: usize) {
        let cell = &mut self.cells[cell_ix];
        let pos = cell
            .items
            .iter()
            .position(|&ix| ix == item)
            .unwrap_or_else(|| {
                panic!("item {item} is not in cell {cell_ix}")
            });
        cell.items.swap_remove(pos);
        self.owner[item] = None;
    }

    /// Take `item` out of whichever cell holds it and return that cell's
    /// index.
    ///
    /// # Panics
    ///
    /// Panics if the item is unassigned.
    pub fn take_item(&mut self, item: usize) -> usize {
        let cell_ix = self
            .cell_of(item)
            .unwrap_or_else(|| panic!("item {item} is not assigned"));
        self.remove_item(item, cell_ix);
        cell_ix
    }

    /// Drop every cell with no items, keeping the relative order of the
    /// others.
    pub fn remove_empty_cells(&mut self) {
        if self.cells.iter().all(|cell| !cell.is_empty()) {
            return;
        }
        self.cells.retain(|cell| !cell.is_empty());
        self.reindex();
    }

    /// Drop the cell at `cell_ix`, which must be empty
    ///
    /// # Panics
    ///
    /// Panics if the cell still has items.
    pub fn remove_cell(&mut self, cell_ix: usize) {
        assert!(
            self.cells[cell_ix].is_empty(),
            "cell {cell_ix} still has {} items",
            self.cells[cell_ix].len()
        );
        self.cells.remove(cell_ix);
        self.reindex();
    }

    fn reindex(&mut self) {
        let owner = &mut self.owner;
        self.cells.iter().enumerate().for_each(|(cell_ix, cell)| {
            cell.items.iter().for_each(|&item| owner[item] = Some(cell_ix));
        });
    }

    /// Number of cells, including any empty ones
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of assigned items
    #[inline]
    pub fn n_items(&self) -> usize {
        self.cells.iter().map(Cell::len).sum()
    }

    /// The cells in index order
    #[inline]
    pub fn cells(&self) -> &[Cell<P>] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, cell_ix: usize) -> &Cell<P> {
        &self.cells[cell_ix]
    }

    /// Index of the cell holding `item`, if any
    #[inline]
    pub fn cell_of(&self, item: usize) -> Option<usize> {
        self.owner.get(item).copied().flatten()
    }

    /// Parameter value of the cell at `cell_ix`
    #[inline]
    pub fn value(&self, cell_ix: usize) -> &P {
        &self.cells[cell_ix].value
    }

    /// Replace the parameter value of the cell at `cell_ix`
    pub fn set_value(&mut self, cell_ix: usize, value: P) {
        self.cells[cell_ix].value = Arc::new(value);
    }

    /// Size of each cell
    pub fn counts(&self) -> Vec<usize> {
        self.cells.iter().map(Cell::len).collect()
    }

    /// The owning cell index of every item, in item order
    ///
    /// # Panics
    ///
    /// Panics if any item is unassigned.
    pub fn labels(&self) -> Vec<usize> {
        self.owner
            .iter()
            .enumerate()
            .map(|(item, ix)| {
                ix.unwrap_or_else(|| panic!("item {item} is not assigned"))
            })
            .collect()
    }

    /// The value of every cell, in cell order
    pub fn cell_values(&self) -> Vec<&P> {
        self.cells.iter().map(|cell| cell.value()).collect()
    }

    /// Check that the items are exactly `0..n_items`, each in one cell
    pub fn validate(&self, n_items: usize) -> Result<(), PartitionError> {
        let mut seen = vec![false; n_items];
        for cell in &self.cells {
            for &item in &cell.items {
                if item >= n_items {
                    return Err(PartitionError::ItemOutOfRange {
                        item,
                        n_items,
                    });
                } else if seen[item] {
                    return Err(PartitionError::DuplicateItem { item });
                }
                seen[item] = true;
            }
        }
        match seen.iter().position(|&s| !s) {
            Some(item) => Err(PartitionError::UnassignedItem { item }),
            None => Ok(()),
        }
    }
}

impl<P: Clone> Partition<P> {
    /// The value of the cell owning each item, in item order
    ///
    /// # Panics
    ///
    /// Panics if any item is unassigned.
    pub fn item_values(&self) -> Vec<P> {
        self.labels()
            .iter()
            .map(|&ix| self.value(ix).clone())
            .collect()
    }
}

impl<P> fmt::Display for Partition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Partition (n: {}, k: {})",
            self.n_items(),
            self.n_cells()
        )?;
        writeln!(f, "  counts: {:?}", self.counts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn three_cells() -> Partition<f64> {
        Partition::from_labels(&[0, 1, 0, 2, 1], vec![0.1, 0.5, 0.9]).unwrap()
    }

    #[test]
    fn from_labels_builds_cells() {
        let part = three_cells();
        assert_eq!(part.n_cells(), 3);
        assert_eq!(part.n_items(), 5);
        assert_eq!(part.labels(), vec![0, 1, 0, 2, 1]);
        assert_eq!(part.counts(), vec![2, 2, 1]);
        assert!(part.validate(5).is_ok());
    }

    #[test]
    fn from_labels_value_mismatch() {
        let res = Partition::from_labels(&[0, 1], vec![0.1]);
        assert_eq!(
            res,
            Err(PartitionError::ValueCountMismatch {
                n_labels: 2,
                n_values: 1
            })
        );
    }

    #[test]
    fn prune_keeps_relative_order() {
        let mut part = three_cells();
        part.remove_item(1, 1);
        part.remove_item(4, 1);
        part.add_item(1, 2);
        part.add_item(4, 0);
        part.remove_empty_cells();

        assert_eq!(part.cell_values(), vec![&0.1, &0.9]);
        assert_eq!(part.labels(), vec![0, 1, 0, 1, 0]);
        assert_eq!(part.cell_of(3), Some(1));
    }

    #[test]
    fn take_item_reports_owner() {
        let mut part = three_cells();
        assert_eq!(part.take_item(3), 2);
        assert_eq!(part.cell_of(3), None);
        assert!(part.cell(2).is_empty());
        assert_eq!(
            part.validate(5),
            Err(PartitionError::UnassignedItem { item: 3 })
        );
    }

    #[test]
    #[should_panic]
    fn remove_absent_item_panics() {
        let mut part = three_cells();
        part.remove_item(0, 1);
    }

    #[test]
    #[should_panic]
    fn add_to_missing_cell_panics() {
        let mut part = three_cells();
        part.take_item(0);
        part.add_item(0, 7);
    }

    #[test]
    fn clone_shares_values_but_not_items() {
        let part = three_cells();
        let mut copy = part.clone();
        assert!(Arc::ptr_eq(&part.cell(0).value_arc(), &copy.cell(0).value_arc()));

        copy.remove_item(2, 0);
        copy.add_item(2, 1);
        copy.set_value(1, 0.4);

        assert_eq!(part.labels(), vec![0, 1, 0, 2, 1]);
        assert_eq!(*part.value(1), 0.5);
        assert_eq!(copy.labels(), vec![0, 1, 1, 2, 1]);
    }

    #[test]
    fn item_values_follow_labels() {
        let part = three_cells();
        assert_eq!(part.item_values(), vec![0.1, 0.5, 0.1, 0.9, 0.5]);
    }

    #[test]
    fn validate_catches_duplicates() {
        let mut part: Partition<f64> = Partition::new();
        let a = part.add_cell(0.0);
        let b = part.add_cell(1.0);
        part.add_item(0, a);
        // bypass the owner map to simulate a broken invariant
        part.cells[b].items.push(0);
        assert_eq!(
            part.validate(1),
            Err(PartitionError::DuplicateItem { item: 0 })
        );
    }

    proptest! {
        #[test]
        fn random_moves_keep_every_item_once(
            labels in prop::collection::vec(0_usize..4, 1..30),
            moves in prop::collection::vec((0_usize..30, 0_usize..5), 0..60),
        ) {
            // relabel so that every label in 0..k is used
            let mut map: Vec<Option<usize>> = vec![None; 4];
            let mut k = 0;
            let labels: Vec<usize> = labels.iter().map(|&z| {
                *map[z].get_or_insert_with(|| { k += 1; k - 1 })
            }).collect();
            let n = labels.len();

            let mut part = Partition::from_labels(&labels, (0..k).collect()).unwrap();
            for (item, target) in moves {
                let item = item % n;
                part.take_item(item);
                let target = if target >= part.n_cells() {
                    part.add_cell(target + 100)
                } else {
                    target
                };
                part.add_item(item, target);
                part.remove_empty_cells();

                prop_assert!(part.validate(n).is_ok());
                prop_assert!(part.cells().iter().all(|c| !c.is_empty()));
                prop_assert_eq!(part.counts().iter().sum::<usize>(), n);
            }
        }
    }
}
