use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Dungeon, connectivity,
    dungeon::assemble,
    endpoints,
    main_path::{self, SearchLimits},
    map::GridError,
    path_length,
};

/// Represents errors that can occur while generating a layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("a {width}x{height} grid has no two distinct cells for start and exit")]
    GridTooSmall { width: usize, height: usize },
    #[error("a {width}x{height} grid has more cells than can be addressed")]
    GridTooLarge { width: usize, height: usize },
    #[error("invalid size range {min}..={max}")]
    InvalidSizeRange { min: usize, max: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Tunables for layout generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Candidate paths collected before the main-path search stops.
    pub path_cap: usize,
    /// How far past the target length a partial path may grow.
    pub length_slack: usize,
    /// Smallest width/height drawn by [`LayoutGenerator::generate_random_size`].
    pub min_size: usize,
    /// Largest width/height drawn by [`LayoutGenerator::generate_random_size`].
    pub max_size: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let limits = SearchLimits::default();
        GeneratorConfig {
            path_cap: limits.path_cap,
            length_slack: limits.length_slack,
            min_size: 3,
            max_size: 5,
        }
    }
}

impl GeneratorConfig {
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            path_cap: self.path_cap,
            length_slack: self.length_slack,
        }
    }
}

/// Generates single-level dungeons from an owned random source.
///
/// Seeded generators are reproducible: the same seed, config and dimensions
/// always produce an equal [`Dungeon`].
#[derive(Debug)]
pub struct LayoutGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl LayoutGenerator {
    pub fn new(config: GeneratorConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    /// Runs the full pipeline on a `width` x `height` grid: endpoints, target
    /// length, main path, connectivity fill, assembly.
    pub fn generate(&mut self, width: usize, height: usize) -> Result<Dungeon, GenerationError> {
        let (start, exit) = endpoints::select(&mut self.rng, width, height)?;
        let target = path_length::target_length(&mut self.rng, start, exit, width, height);
        let path = main_path::find_path(
            &mut self.rng,
            start,
            exit,
            width,
            height,
            target,
            self.config.search_limits(),
        );
        log::debug!(
            "main path of {} rooms ({:?}) for target {target}",
            path.rooms.len(),
            path.quality
        );
        let rooms = connectivity::fill(&path.rooms, width, height)?;
        Ok(assemble(width, height, start, exit, rooms))
    }

    /// Draws width and height uniformly from the configured size range, then generates.
    pub fn generate_random_size(&mut self) -> Result<Dungeon, GenerationError> {
        let GeneratorConfig {
            min_size, max_size, ..
        } = self.config;
        if min_size > max_size {
            return Err(GenerationError::InvalidSizeRange {
                min: min_size,
                max: max_size,
            });
        }
        let width = self.rng.random_range(min_size..=max_size);
        let height = self.rng.random_range(min_size..=max_size);
        self.generate(width, height)
    }
}

/// Generates a `width` x `height` dungeon with the default configuration.
pub fn generate_layout(
    width: usize,
    height: usize,
    seed: Option<u64>,
) -> Result<Dungeon, GenerationError> {
    LayoutGenerator::new(GeneratorConfig::default(), seed).generate(width, height)
}
