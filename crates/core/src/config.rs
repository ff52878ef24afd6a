//! Round configuration

use crate::error::GameError;
use crate::types::{
    GridPreset, Point, StackColor, BACKGROUND_SEED_COUNT, CELL_SIZE, CELL_SPACING,
    CLEAR_THRESHOLD, DEAL_BATCH_SIZE, STAGING_ORIGIN, STAGING_STEP, TARGET_SCORE_CANDIDATES,
};

/// Where dealt stacks wait before being dragged onto the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagingLayout {
    /// Center of slot 0
    pub origin: Point,
    /// Horizontal distance between slots
    pub step: f32,
}

impl StagingLayout {
    pub fn slot(&self, index: usize) -> Point {
        self.origin.offset(self.step * index as f32, 0.0)
    }
}

impl Default for StagingLayout {
    fn default() -> Self {
        Self {
            origin: STAGING_ORIGIN,
            step: STAGING_STEP,
        }
    }
}

/// Everything a round needs to start
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub rows: u32,
    pub columns: u32,
    pub cell_size: f32,
    pub spacing: f32,
    /// Center of the cell at row 0, column 0
    pub origin: Point,
    pub clear_threshold: u32,
    pub deal_batch_size: usize,
    pub background_seed_count: usize,
    pub target_score_candidates: Vec<u32>,
    pub staging: StagingLayout,
}

impl GameConfig {
    pub fn from_preset(preset: GridPreset) -> Self {
        Self {
            rows: preset.rows,
            columns: preset.columns,
            origin: preset.origin,
            ..Self::base()
        }
    }

    fn base() -> Self {
        let preset = GridPreset::ALL[0];
        Self {
            rows: preset.rows,
            columns: preset.columns,
            cell_size: CELL_SIZE,
            spacing: CELL_SPACING,
            origin: preset.origin,
            clear_threshold: CLEAR_THRESHOLD,
            deal_batch_size: DEAL_BATCH_SIZE,
            background_seed_count: BACKGROUND_SEED_COUNT,
            target_score_candidates: TARGET_SCORE_CANDIDATES.to_vec(),
            staging: StagingLayout::default(),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Reject configurations a round cannot start with
    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |reason| Err(GameError::InvalidConfiguration { reason });

        if self.rows == 0 || self.columns == 0 {
            return invalid("grid must have at least one row and one column");
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return invalid("cell size must be positive");
        }
        if !(self.spacing.is_finite() && self.spacing >= 0.0) {
            return invalid("spacing must be non-negative");
        }
        if !self.origin.is_finite() {
            return invalid("origin must be finite");
        }
        if self.clear_threshold == 0 {
            return invalid("clear threshold must be positive");
        }
        if self.deal_batch_size == 0 {
            return invalid("deal batch size must be positive");
        }
        if self.background_seed_count > StackColor::ALL.len() {
            return invalid("background seed count exceeds the palette");
        }
        if self.target_score_candidates.is_empty() {
            return invalid("at least one target score candidate is required");
        }
        if !(self.staging.origin.is_finite() && self.staging.step.is_finite()) {
            return invalid("staging layout must be finite");
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::base()
    }
}
