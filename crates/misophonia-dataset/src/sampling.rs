//! Sampling planner.
//!
//! Every random decision about which source items form which output item is
//! made here, in one sequential pass over a single generator seeded from the
//! master seed. Item generation afterwards only reads the plan, so any index
//! can be generated on any worker in any order with identical results.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_pcg::Pcg32;
use tracing::debug;

use misophonia_backend_audio::rng::create_rng;

use crate::config::{FallbackPolicy, GenerateOptions};
use crate::error::{DatasetError, DatasetResult};
use crate::pools::PoolSizes;

/// An endless sequence of shuffled permutations of `0..n`.
///
/// Every index is yielded once before any index repeats. The first
/// permutation is drawn lazily on the first request.
#[derive(Debug, Clone)]
pub struct IndexCycle {
    order: Vec<usize>,
    position: usize,
}

impl IndexCycle {
    /// Creates a cycle over `0..n`.
    pub fn new(n: usize) -> Self {
        Self {
            order: (0..n).collect(),
            position: n,
        }
    }

    /// Number of distinct indices.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the cycle has no indices.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the next index, reshuffling after each full pass.
    ///
    /// Returns `None` for an empty cycle.
    pub fn next_index<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        if self.position >= self.order.len() {
            self.order.shuffle(rng);
            self.position = 0;
        }
        let index = self.order[self.position];
        self.position += 1;
        Some(index)
    }
}

/// The complete plan for one split, indexed by output item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplingPlan {
    /// Whether each item is a trigger item.
    pub is_trigger: Vec<bool>,
    /// Indices into the trigger or control pool, per item.
    pub foreground_indices: Vec<Vec<usize>>,
    /// Indices into the background pool, per item.
    pub background_indices: Vec<Vec<usize>>,
    /// Seed of each item's own generator.
    pub seeds: Vec<u32>,
}

/// One item's entry in a [`SamplingPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEntry<'a> {
    /// Whether the item is a trigger item.
    pub is_trigger: bool,
    /// Indices into the trigger or control pool.
    pub foreground_indices: &'a [usize],
    /// Indices into the background pool.
    pub background_indices: &'a [usize],
    /// Seed of the item's generator.
    pub seed: u32,
}

impl SamplingPlan {
    /// Number of planned items.
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Returns true if no items are planned.
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Returns the plan for item `index`.
    pub fn entry(&self, index: usize) -> Option<PlanEntry<'_>> {
        Some(PlanEntry {
            is_trigger: *self.is_trigger.get(index)?,
            foreground_indices: self.foreground_indices.get(index)?,
            background_indices: self.background_indices.get(index)?,
            seed: *self.seeds.get(index)?,
        })
    }
}

/// Rejects pool configurations the options cannot be satisfied with.
fn check_pools(sizes: &PoolSizes, options: &GenerateOptions) -> DatasetResult<()> {
    if sizes.backgrounds == 0 {
        return Err(DatasetError::EmptyPool { pool: "background" });
    }
    let ratio = options.trig_to_control_ratio;
    let needs_triggers = ratio > 0.0 && sizes.triggers == 0;
    let needs_controls = ratio < 1.0 && sizes.controls == 0;
    let no_fallback = options.fallback == FallbackPolicy::Error
        || (sizes.triggers == 0 && sizes.controls == 0);
    if needs_triggers && no_fallback {
        return Err(DatasetError::EmptyPool { pool: "trigger" });
    }
    if needs_controls && no_fallback {
        return Err(DatasetError::EmptyPool { pool: "control" });
    }
    Ok(())
}

/// Builds the sampling plan for one split.
///
/// Per item, draws happen in the fixed order: foreground count, background
/// count, trigger flag, foreground indices, background indices, item seed.
/// When the drawn class has an empty pool, the item uses the other
/// foreground pool (only reachable with [`FallbackPolicy::UseOtherPool`]).
///
/// # Arguments
/// * `sizes` - Sizes of the trigger, control, and background pools
/// * `options` - Generation options; `random_seed` seeds the planner
///
/// # Returns
/// The plan, or a configuration error raised before any draw
pub fn plan_sampling(sizes: &PoolSizes, options: &GenerateOptions) -> DatasetResult<SamplingPlan> {
    options.validate()?;
    check_pools(sizes, options)?;

    let mut rng: Pcg32 = create_rng(options.random_seed);
    let mut triggers = IndexCycle::new(sizes.triggers);
    let mut controls = IndexCycle::new(sizes.controls);
    let mut backgrounds = IndexCycle::new(sizes.backgrounds);

    let n = options.num_samples;
    let mut plan = SamplingPlan {
        is_trigger: Vec::with_capacity(n),
        foreground_indices: Vec::with_capacity(n),
        background_indices: Vec::with_capacity(n),
        seeds: Vec::with_capacity(n),
    };

    let (fg_min, fg_max) = options.foregrounds_per_item;
    let (bg_min, bg_max) = options.backgrounds_per_item;
    for _ in 0..n {
        let fg_count = rng.gen_range(fg_min..=fg_max);
        let bg_count = rng.gen_range(bg_min..=bg_max);
        let mut is_trigger = rng.gen_bool(options.trig_to_control_ratio);
        if is_trigger && triggers.is_empty() {
            is_trigger = false;
        } else if !is_trigger && controls.is_empty() {
            is_trigger = true;
        }

        let cycle = if is_trigger {
            &mut triggers
        } else {
            &mut controls
        };
        let pool = if is_trigger { "trigger" } else { "control" };
        let fg = (0..fg_count)
            .map(|_| cycle.next_index(&mut rng).ok_or(DatasetError::EmptyPool { pool }))
            .collect::<DatasetResult<Vec<_>>>()?;
        let bg = (0..bg_count)
            .map(|_| {
                backgrounds
                    .next_index(&mut rng)
                    .ok_or(DatasetError::EmptyPool { pool: "background" })
            })
            .collect::<DatasetResult<Vec<_>>>()?;
        let seed = rng.gen::<u32>();

        plan.is_trigger.push(is_trigger);
        plan.foreground_indices.push(fg);
        plan.background_indices.push(bg);
        plan.seeds.push(seed);
    }

    debug!(
        "Planned {} items ({} trigger) from seed {}",
        plan.len(),
        plan.is_trigger.iter().filter(|t| **t).count(),
        options.random_seed
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn sizes(triggers: usize, controls: usize, backgrounds: usize) -> PoolSizes {
        PoolSizes {
            triggers,
            controls,
            backgrounds,
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let options = GenerateOptions::new(50)
            .with_foregrounds(1, 3)
            .with_backgrounds(1, 2)
            .with_seed(7);
        let a = plan_sampling(&sizes(5, 4, 3), &options).unwrap();
        let b = plan_sampling(&sizes(5, 4, 3), &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);

        let c = plan_sampling(&sizes(5, 4, 3), &options.clone().with_seed(8)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_counts_respect_ranges() {
        let options = GenerateOptions::new(200)
            .with_foregrounds(2, 4)
            .with_backgrounds(1, 3);
        let plan = plan_sampling(&sizes(3, 3, 2), &options).unwrap();
        for i in 0..plan.len() {
            let entry = plan.entry(i).unwrap();
            assert!((2..=4).contains(&entry.foreground_indices.len()));
            assert!((1..=3).contains(&entry.background_indices.len()));
            let bound = 3;
            assert!(entry.foreground_indices.iter().all(|&j| j < bound));
            assert!(entry.background_indices.iter().all(|&j| j < 2));
        }
        assert!(plan.entry(200).is_none());
    }

    #[test]
    fn test_ratio_extremes() {
        let sizes = sizes(2, 2, 1);
        let options = GenerateOptions::new(30);
        let all_triggers = plan_sampling(&sizes, &options.clone().with_ratio(1.0)).unwrap();
        assert!(all_triggers.is_trigger.iter().all(|t| *t));
        let all_controls = plan_sampling(&sizes, &options.with_ratio(0.0)).unwrap();
        assert!(all_controls.is_trigger.iter().all(|t| !*t));
    }

    #[test]
    fn test_fallback_to_other_pool() {
        let options = GenerateOptions::new(20);
        let plan = plan_sampling(&sizes(0, 3, 1), &options.clone().with_ratio(0.9)).unwrap();
        assert!(plan.is_trigger.iter().all(|t| !*t));
        let plan = plan_sampling(&sizes(3, 0, 1), &options.with_ratio(0.1)).unwrap();
        assert!(plan.is_trigger.iter().all(|t| *t));
    }

    #[test]
    fn test_empty_pool_errors() {
        let strict = GenerateOptions::new(5).with_fallback(FallbackPolicy::Error);
        assert!(matches!(
            plan_sampling(&sizes(0, 3, 1), &strict),
            Err(DatasetError::EmptyPool { pool: "trigger" })
        ));
        assert!(matches!(
            plan_sampling(&sizes(3, 0, 1), &strict),
            Err(DatasetError::EmptyPool { pool: "control" })
        ));
        // Ratio 1.0 never needs controls.
        assert!(plan_sampling(&sizes(3, 0, 1), &strict.clone().with_ratio(1.0)).is_ok());
        assert!(matches!(
            plan_sampling(&sizes(3, 3, 0), &GenerateOptions::new(5)),
            Err(DatasetError::EmptyPool { pool: "background" })
        ));
        assert!(matches!(
            plan_sampling(&sizes(0, 0, 2), &GenerateOptions::new(5)),
            Err(DatasetError::EmptyPool { .. })
        ));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = GenerateOptions::new(5).with_foregrounds(2, 1);
        assert!(matches!(
            plan_sampling(&sizes(1, 1, 1), &options),
            Err(DatasetError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_background_pool_exhausted_before_reuse() {
        let options = GenerateOptions::new(6).with_backgrounds(1, 1);
        let plan = plan_sampling(&sizes(1, 1, 6), &options).unwrap();
        let mut seen: Vec<usize> = plan.background_indices.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_cycle_yields_none() {
        let mut rng = Pcg32::seed_from_u64(0);
        assert_eq!(IndexCycle::new(0).next_index(&mut rng), None);
    }

    proptest! {
        #[test]
        fn test_cycle_exhaustion(n in 1usize..40, seed in any::<u64>(), offset in 0usize..3) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut cycle = IndexCycle::new(n);
            for _ in 0..offset * n {
                cycle.next_index(&mut rng);
            }
            let mut window: Vec<usize> = (0..n)
                .map(|_| cycle.next_index(&mut rng).unwrap())
                .collect();
            window.sort_unstable();
            prop_assert_eq!(window, (0..n).collect::<Vec<_>>());
        }
    }
}
