//! Experimental trigger/control pairs.
//!
//! A pair is a persisted trigger item and a derived control item that keeps
//! the trigger's backgrounds and mixing parameters and swaps only the
//! foreground sound. Derived items link back through `paired_uuid` and are
//! appended to the same split.

use std::collections::BTreeSet;

use misophonia_backend_audio::rng::create_component_rng;
use misophonia_backend_audio::{
    binaural_mix, prepare_substituted_foreground, AudioLoader, Renderer,
};
use misophonia_spec::{MisophoniaItem, Split};
use rand::seq::{index, SliceRandom};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{IfExists, SaveOptions};
use crate::error::{DatasetError, DatasetResult};
use crate::persistence::PremadeMisophoniaDataset;
use crate::split_view::DatasetSplitView;

/// Key of the generator that picks control items.
const CONTROLS_KEY: &str = "controls";

/// Outcome of a pairing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairSummary {
    /// Categories that produced pairs, sorted.
    pub categories: Vec<String>,
    /// Categories skipped for lack of a validated or non-validated trigger.
    pub skipped_categories: Vec<String>,
    /// Trigger items that received a paired control, in pairing order.
    pub triggers: Vec<Uuid>,
    /// Ids of the derived control items, in completion order.
    pub derived: Vec<Uuid>,
}

impl PairSummary {
    /// Number of pairs written.
    pub fn len(&self) -> usize {
        self.derived.len()
    }

    /// Returns true if no pairs were written.
    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }
}

/// Single foreground, single category, and not itself a derived item.
fn is_eligible(item: &MisophoniaItem) -> bool {
    item.foregrounds().len() == 1
        && item.foreground_categories().len() == 1
        && item.paired_uuid().is_none()
        && item.uuid().is_some()
}

fn category(item: &MisophoniaItem) -> &str {
    item.foreground_categories()
        .first()
        .map(String::as_str)
        .unwrap_or_default()
}

fn of_category<'a>(pool: &[&'a MisophoniaItem], name: &str) -> Vec<&'a MisophoniaItem> {
    pool.iter().copied().filter(|item| category(item) == name).collect()
}

/// Derives one control item per selected trigger and appends them to `split`.
///
/// For every foreground category among validated triggers, one validated and
/// one non-validated trigger of that category are chosen; a category lacking
/// either is skipped with a warning. Each chosen trigger then gets a distinct
/// control item, drawn without replacement. Too few controls is an error and
/// nothing is written.
///
/// Candidates are ordered by uuid before drawing, so the result depends only
/// on the persisted items and `seed`. Only the test split is paired; any
/// other split is rejected before anything is read.
///
/// # Arguments
/// * `dataset` - Persisted dataset to read from and append to
/// * `split` - Split to pair, must be [`Split::Test`]
/// * `seed` - Seed for category and control selection
/// * `loader` - Loader for the foreground and background source audio
/// * `renderer` - Renderer for the derived mixes
pub fn add_experimental_pairs_to_dataset(
    dataset: &PremadeMisophoniaDataset,
    split: Split,
    seed: u32,
    loader: &dyn AudioLoader,
    renderer: &dyn Renderer,
) -> DatasetResult<PairSummary> {
    if split != Split::Test {
        return Err(DatasetError::PairingSplit { split });
    }
    let mut items: Vec<MisophoniaItem> = dataset
        .load_split_items(split)?
        .into_iter()
        .filter(is_eligible)
        .collect();
    items.sort_by_key(|item| item.uuid());

    let (triggers, controls): (Vec<_>, Vec<_>) =
        items.iter().partition(|item| item.is_trigger());
    let (validated, unvalidated): (Vec<&MisophoniaItem>, Vec<&MisophoniaItem>) = triggers
        .into_iter()
        .partition(|item| item.foregrounds()[0].source_item.is_validated());
    info!(
        "Pairing {} split: {} validated triggers, {} other triggers, {} controls",
        split,
        validated.len(),
        unvalidated.len(),
        controls.len()
    );

    let categories: BTreeSet<&str> = validated.iter().map(|item| category(item)).collect();
    let mut summary = PairSummary::default();
    let mut selected: Vec<&MisophoniaItem> = Vec::new();
    for name in categories {
        let mut rng = create_component_rng(seed, name);
        let picked_validated = of_category(&validated, name).choose(&mut rng).copied();
        let picked_other = of_category(&unvalidated, name).choose(&mut rng).copied();
        match (picked_validated, picked_other) {
            (Some(a), Some(b)) => {
                selected.push(a);
                selected.push(b);
                summary.categories.push(name.to_string());
            }
            _ => {
                warn!(
                    "Skipping category '{}': needs both a validated and a non-validated trigger",
                    name
                );
                summary.skipped_categories.push(name.to_string());
            }
        }
    }

    if selected.is_empty() {
        info!("No trigger items to pair in {} split", split);
        return Ok(summary);
    }
    if controls.len() < selected.len() {
        return Err(DatasetError::InsufficientControls {
            needed: selected.len(),
            available: controls.len(),
        });
    }

    let mut rng = create_component_rng(seed, CONTROLS_KEY);
    let picks = index::sample(&mut rng, controls.len(), selected.len());

    let mut derived = Vec::with_capacity(selected.len());
    for (trigger, control_index) in selected.iter().zip(picks.iter()) {
        let control = controls[control_index];
        derived.push(derive_pair(trigger, control, loader, renderer)?);
        summary.triggers.extend(trigger.uuid());
    }

    let view = DatasetSplitView::from_items(split, derived);
    let saved = dataset.save_split(&view, IfExists::Append, &SaveOptions::default())?;
    summary.derived = saved.uuids;
    info!("Added {} experimental pairs to {} split", summary.len(), split);
    Ok(summary)
}

/// Re-renders `trigger` with `control`'s foreground sound.
fn derive_pair(
    trigger: &MisophoniaItem,
    control: &MisophoniaItem,
    loader: &dyn AudioLoader,
    renderer: &dyn Renderer,
) -> DatasetResult<MisophoniaItem> {
    let params = trigger.global_mixing_params();
    let replacement = &control.foregrounds()[0].source_item;
    let prepared = prepare_substituted_foreground(
        &trigger.foregrounds()[0],
        trigger.backgrounds(),
        replacement,
        params,
        trigger.length(),
        loader,
    )?;
    let (mix, _) = binaural_mix(
        &prepared.foregrounds,
        &prepared.backgrounds,
        params,
        false,
        renderer,
    )?;
    debug!(
        "Paired trigger {:?} with '{}'",
        trigger.uuid(),
        replacement.file_path.display()
    );

    let item = MisophoniaItem::builder(trigger.split(), mix, params.clone())
        .trigger(false)
        .foregrounds(prepared.foregrounds.into_iter().map(|p| p.track).collect())
        .backgrounds(prepared.backgrounds.into_iter().map(|p| p.track).collect())
        .paired_uuid(trigger.uuid())
        .build()?;
    Ok(item)
}
