//! Generating dataset items from source data.

use std::sync::Arc;

use misophonia_backend_audio::rng::create_rng;
use misophonia_backend_audio::{
    binaural_mix, prepare_track_specs, AudioLoader, PrepareOptions, Renderer, RendererKind,
    WavFileLoader,
};
use misophonia_spec::{AudioData, GlobalMixingParams, MisophoniaItem, SourceDataItem, Split};
use tracing::{debug, info};

use crate::config::GenerateOptions;
use crate::error::{DatasetError, DatasetResult};
use crate::pools::SourcePools;
use crate::sampling::{plan_sampling, SamplingPlan};
use crate::source::SourceData;
use crate::split_view::DatasetSplitView;

/// A dataset synthesized on demand from source datasets.
pub struct GeneratedMisophoniaDataset {
    sources: Vec<Box<dyn SourceData>>,
    loader: Arc<dyn AudioLoader>,
    renderer: Arc<dyn Renderer>,
    items: Option<Arc<Vec<SourceDataItem>>>,
}

impl GeneratedMisophoniaDataset {
    /// Creates a dataset over `sources` with the WAV loader and binaural renderer.
    pub fn new(sources: Vec<Box<dyn SourceData>>) -> Self {
        Self {
            sources,
            loader: Arc::new(WavFileLoader),
            renderer: Arc::from(RendererKind::default().create()),
            items: None,
        }
    }

    /// Replaces the audio loader.
    pub fn with_loader(mut self, loader: Arc<dyn AudioLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Replaces the renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Names of the configured sources.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Makes every source available and loads its metadata.
    pub fn prepare(&mut self) -> DatasetResult<()> {
        let mut items = Vec::new();
        for source in &self.sources {
            if !source.is_downloaded() {
                info!("Downloading source dataset '{}'", source.name());
                source.download_data()?;
            }
            let metadata = source.get_metadata()?;
            debug!("Source '{}' has {} items", source.name(), metadata.len());
            items.extend(metadata);
        }
        info!(
            "Prepared {} source items from {} datasets",
            items.len(),
            self.sources.len()
        );
        self.items = Some(Arc::new(items));
        Ok(())
    }

    /// Plans a split and returns a view whose items are generated on access.
    ///
    /// Configuration errors (empty pools, bad ranges) are raised here,
    /// before any audio is touched.
    pub fn get_split(
        &self,
        split: Split,
        options: &GenerateOptions,
    ) -> DatasetResult<DatasetSplitView> {
        let items = self.items.as_ref().ok_or(DatasetError::NotPrepared)?;
        let pools = SourcePools::from_items(items.iter().cloned(), split);
        let plan = plan_sampling(&pools.sizes(), options)?;
        info!(
            "Planned {} {} items from {} triggers, {} controls, {} backgrounds",
            plan.len(),
            split,
            pools.triggers.len(),
            pools.controls.len(),
            pools.backgrounds.len()
        );

        let generator = ItemGenerator {
            split,
            pools,
            plan,
            prepare_options: options.prepare_options(),
            loader: Arc::clone(&self.loader),
            renderer: Arc::clone(&self.renderer),
        };
        let len = generator.plan.len();
        Ok(DatasetSplitView::new(split, len, move |i| {
            generator.generate(i)
        }))
    }
}

/// Everything needed to generate any item of a planned split.
struct ItemGenerator {
    split: Split,
    pools: SourcePools,
    plan: SamplingPlan,
    prepare_options: PrepareOptions,
    loader: Arc<dyn AudioLoader>,
    renderer: Arc<dyn Renderer>,
}

impl ItemGenerator {
    /// Generates item `index` from its plan entry and its own generator.
    fn generate(&self, index: usize) -> DatasetResult<MisophoniaItem> {
        let entry = self.plan.entry(index).ok_or(DatasetError::IndexOutOfRange {
            index: index as isize,
            len: self.plan.len(),
        })?;
        let fg_pool = if entry.is_trigger {
            &self.pools.triggers
        } else {
            &self.pools.controls
        };
        let fg_items: Vec<SourceDataItem> = entry
            .foreground_indices
            .iter()
            .map(|&i| fg_pool[i].clone())
            .collect();
        let bg_items: Vec<SourceDataItem> = entry
            .background_indices
            .iter()
            .map(|&i| self.pools.backgrounds[i].clone())
            .collect();

        let mut rng = create_rng(entry.seed);
        let params = GlobalMixingParams::sample(&mut rng);
        let prepared = prepare_track_specs(
            &fg_items,
            &bg_items,
            &params,
            &self.prepare_options,
            self.loader.as_ref(),
            &mut rng,
        )?;
        let (mix, ground_truth) = binaural_mix(
            &prepared.foregrounds,
            &prepared.backgrounds,
            &params,
            entry.is_trigger,
            self.renderer.as_ref(),
        )?;
        debug!(
            "Generated item {} ({}, {} fg, {} bg, {} samples)",
            index,
            if entry.is_trigger { "trigger" } else { "control" },
            fg_items.len(),
            bg_items.len(),
            mix.num_samples()
        );

        let item = MisophoniaItem::builder(self.split, mix, params)
            .trigger(entry.is_trigger)
            .ground_truth(ground_truth.map(AudioData::from))
            .foregrounds(prepared.foregrounds.into_iter().map(|p| p.track).collect())
            .backgrounds(prepared.backgrounds.into_iter().map(|p| p.track).collect())
            .build()?;
        Ok(item)
    }
}
