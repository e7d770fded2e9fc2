//! Indexable view over the items of one split.
//!
//! A view knows its length and a function that produces item `i`. For a
//! generated split the function runs the audio pipeline from the sampling
//! plan; for a persisted split it is a lookup into the loaded items. Items
//! are not cached: asking for the same index twice computes it twice, and
//! gives the same result.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use misophonia_spec::{MisophoniaItem, Split};

use crate::error::{DatasetError, DatasetResult};

type ItemFn = dyn Fn(usize) -> DatasetResult<MisophoniaItem> + Send + Sync;

/// A lazily evaluated, randomly indexable split.
#[derive(Clone)]
pub struct DatasetSplitView {
    split: Split,
    len: usize,
    item_fn: Arc<ItemFn>,
}

impl fmt::Debug for DatasetSplitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetSplitView")
            .field("split", &self.split)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl DatasetSplitView {
    /// Creates a view of `len` items computed by `item_fn`.
    ///
    /// `item_fn` is only called with indices in `0..len`.
    pub fn new<F>(split: Split, len: usize, item_fn: F) -> Self
    where
        F: Fn(usize) -> DatasetResult<MisophoniaItem> + Send + Sync + 'static,
    {
        Self {
            split,
            len,
            item_fn: Arc::new(item_fn),
        }
    }

    /// Creates a view over already materialized items.
    pub fn from_items(split: Split, items: Vec<MisophoniaItem>) -> Self {
        let items = Arc::new(items);
        let len = items.len();
        Self::new(split, len, move |i| {
            items
                .get(i)
                .cloned()
                .ok_or(DatasetError::IndexOutOfRange {
                    index: i as isize,
                    len: items.len(),
                })
        })
    }

    /// The split this view covers.
    pub fn split(&self) -> Split {
        self.split
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view has no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns item `index`; negative indices count from the end.
    pub fn get(&self, index: isize) -> DatasetResult<MisophoniaItem> {
        let resolved = self.resolve(index)?;
        (self.item_fn)(resolved)
    }

    /// Returns items `range.start..range.end`, clamped to the view.
    pub fn slice(&self, range: Range<usize>) -> DatasetResult<Vec<MisophoniaItem>> {
        let end = range.end.min(self.len);
        let start = range.start.min(end);
        (start..end).map(|i| (self.item_fn)(i)).collect()
    }

    /// Returns the items at the given indices, in the given order.
    pub fn select(&self, indices: &[isize]) -> DatasetResult<Vec<MisophoniaItem>> {
        indices.iter().map(|&i| self.get(i)).collect()
    }

    /// Iterates over all items in index order.
    pub fn iter(&self) -> impl Iterator<Item = DatasetResult<MisophoniaItem>> + '_ {
        (0..self.len).map(move |i| (self.item_fn)(i))
    }

    fn resolve(&self, index: isize) -> DatasetResult<usize> {
        let len = self.len as isize;
        let resolved = if index < 0 { len + index } else { index };
        if (0..len).contains(&resolved) {
            Ok(resolved as usize)
        } else {
            Err(DatasetError::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }
}
