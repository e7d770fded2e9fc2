//! Per-split pools of trigger, control, and background items.

use misophonia_spec::{LabelType, SourceDataItem, Split};

/// Source items of one split, partitioned by label type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePools {
    /// Trigger sounds.
    pub triggers: Vec<SourceDataItem>,
    /// Control sounds.
    pub controls: Vec<SourceDataItem>,
    /// Background sounds.
    pub backgrounds: Vec<SourceDataItem>,
}

/// Sizes of the three pools, all the sampling planner needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSizes {
    /// Number of trigger items.
    pub triggers: usize,
    /// Number of control items.
    pub controls: usize,
    /// Number of background items.
    pub backgrounds: usize,
}

impl SourcePools {
    /// Partitions items by label type, keeping only those of `split`.
    ///
    /// Input order is preserved within each pool.
    pub fn from_items<I>(items: I, split: Split) -> Self
    where
        I: IntoIterator<Item = SourceDataItem>,
    {
        let mut pools = Self::default();
        for item in items.into_iter().filter(|item| item.split == split) {
            match item.label_type {
                LabelType::Trigger => pools.triggers.push(item),
                LabelType::Control => pools.controls.push(item),
                LabelType::Background => pools.backgrounds.push(item),
            }
        }
        pools
    }

    /// The pool for a label type.
    pub fn pool(&self, label_type: LabelType) -> &[SourceDataItem] {
        match label_type {
            LabelType::Trigger => &self.triggers,
            LabelType::Control => &self.controls,
            LabelType::Background => &self.backgrounds,
        }
    }

    /// Sizes of all pools.
    pub fn sizes(&self) -> PoolSizes {
        PoolSizes {
            triggers: self.triggers.len(),
            controls: self.controls.len(),
            backgrounds: self.backgrounds.len(),
        }
    }
}
