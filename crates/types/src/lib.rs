//! Shared types - data structures and constants used by every layer
//!
//! All types here are plain data with no external dependencies, so the core rules,
//! the engine and any presentation layer can share them freely.
//!
//! # Grid Geometry
//!
//! Cells are squares laid out in rows and columns. Neighboring cell centers are one
//! *pitch* apart, where `pitch = CELL_SIZE + CELL_SPACING`:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `CELL_SIZE` | 70.0 | Side length of a cell |
//! | `CELL_SPACING` | 10.0 | Gap between neighboring cells |
//! | `POSITION_TOLERANCE` | 1.0 | Fuzzy-equality tolerance for coordinates |
//!
//! # Game Rules
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `CLEAR_THRESHOLD` | 10 | Height at which a stack is cleared |
//! | `DEAL_BATCH_SIZE` | 3 | Active stacks dealt per batch |
//! | `BACKGROUND_SEED_COUNT` | 5 | Background stacks seeded per round |
//! | `MIN_STACK_HEIGHT`..=`MAX_STACK_HEIGHT` | 2..=4 | Height of freshly created stacks |
//! | `TICK_PERIOD_MS` | 1000 | Wall-clock length of one elapsed-time unit |
//!
//! # Examples
//!
//! ```
//! use honeycomb_types::{Point, StackColor, GridPreset, CELL_SIZE, CELL_SPACING};
//!
//! let color = StackColor::from_str("Red").unwrap();
//! assert_eq!(color, StackColor::Red);
//! assert_eq!(color.as_str(), "red");
//!
//! let a = Point::new(35.0, 187.0);
//! let b = Point::new(35.0 + CELL_SIZE + CELL_SPACING, 187.0);
//! assert_eq!(a.distance(b), 80.0);
//!
//! let preset = GridPreset::ALL[0];
//! assert_eq!((preset.rows, preset.columns), (5, 5));
//! ```

use std::fmt;

/// Side length of a grid cell
pub const CELL_SIZE: f32 = 70.0;

/// Gap between neighboring cells
pub const CELL_SPACING: f32 = 10.0;

/// Coordinates closer than this on both axes are considered the same position
pub const POSITION_TOLERANCE: f32 = 1.0;

/// Height at which a stack gets flagged for clearing
pub const CLEAR_THRESHOLD: u32 = 10;

/// Number of active stacks dealt per batch
pub const DEAL_BATCH_SIZE: usize = 3;

/// Number of background stacks seeded at round start
pub const BACKGROUND_SEED_COUNT: usize = 5;

/// Smallest height of a freshly created stack
pub const MIN_STACK_HEIGHT: u32 = 2;

/// Largest height of a freshly created stack
pub const MAX_STACK_HEIGHT: u32 = 4;

/// Candidate target scores; one is drawn per round
pub const TARGET_SCORE_CANDIDATES: [u32; 6] = [75, 100, 125, 150, 175, 200];

/// Center of the first staging slot (outside the grid)
pub const STAGING_ORIGIN: Point = Point::new(70.0, 670.0);

/// Horizontal distance between staging slots
pub const STAGING_STEP: f32 = 120.0;

/// Wall-clock length of one elapsed-time unit (1 second)
pub const TICK_PERIOD_MS: u64 = 1000;


/// A point in layout coordinates (x grows right, y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Fuzzy equality: both axes differ by less than [`POSITION_TOLERANCE`]
    pub fn is_close_to(self, other: Point) -> bool {
        (self.x - other.x).abs() < POSITION_TOLERANCE && (self.y - other.y).abs() < POSITION_TOLERANCE
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Stack colors
///
/// The palette has nine entries; background seeding needs distinct colors, so at most
/// nine background stacks can be seeded per round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StackColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Gray,
    Purple,
    White,
    Pink,
}

impl StackColor {
    /// Every palette entry, in draw order
    pub const ALL: [StackColor; 9] = [
        StackColor::Red,
        StackColor::Orange,
        StackColor::Yellow,
        StackColor::Green,
        StackColor::Blue,
        StackColor::Gray,
        StackColor::Purple,
        StackColor::White,
        StackColor::Pink,
    ];

    /// Parse a color from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use honeycomb_types::StackColor;
    ///
    /// assert_eq!(StackColor::from_str("PINK"), Some(StackColor::Pink));
    /// assert_eq!(StackColor::from_str("black"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(StackColor::Red),
            "orange" => Some(StackColor::Orange),
            "yellow" => Some(StackColor::Yellow),
            "green" => Some(StackColor::Green),
            "blue" => Some(StackColor::Blue),
            "gray" | "grey" => Some(StackColor::Gray),
            "purple" => Some(StackColor::Purple),
            "white" => Some(StackColor::White),
            "pink" => Some(StackColor::Pink),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StackColor::Red => "red",
            StackColor::Orange => "orange",
            StackColor::Yellow => "yellow",
            StackColor::Green => "green",
            StackColor::Blue => "blue",
            StackColor::Gray => "gray",
            StackColor::Purple => "purple",
            StackColor::White => "white",
            StackColor::Pink => "pink",
        }
    }
}

impl fmt::Display for StackColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique stack identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackId(pub u32);

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grid cell coordinate (row-major)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub column: u32,
}

impl CellCoord {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// How a stack entered the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackKind {
    /// Pre-seeded at round start, never movable
    Background,
    /// Dealt to a staging slot, movable until placed
    Active,
}

/// Session lifecycle phase
///
/// `Idle -> Running -> {Won, Lost}`; terminal phases can be restarted or abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Phase::Idle | Phase::Running => Outcome::None,
            Phase::Won => Outcome::Won,
            Phase::Lost => Outcome::Lost,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Won => "won",
            Phase::Lost => "lost",
        }
    }
}

/// Terminal outcome of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    None,
    Won,
    Lost,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::None => "none",
            Outcome::Won => "won",
            Outcome::Lost => "lost",
        }
    }
}

/// A predefined grid layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPreset {
    pub rows: u32,
    pub columns: u32,
    /// Center of the cell at row 0, column 0
    pub origin: Point,
}

impl GridPreset {
    /// Built-in layouts; each is centered for a 390pt-wide canvas
    pub const ALL: [GridPreset; 3] = [
        GridPreset {
            rows: 5,
            columns: 5,
            origin: Point::new(35.0, 187.0),
        },
        GridPreset {
            rows: 5,
            columns: 3,
            origin: Point::new(105.0, 187.0),
        },
        GridPreset {
            rows: 4,
            columns: 4,
            origin: Point::new(65.0, 227.0),
        },
    ];

    pub fn get(index: usize) -> Option<GridPreset> {
        Self::ALL.get(index).copied()
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

/// Placement event emitted by the core after a stack lands
///
/// Engine-internal; mirrors what `PlacementResult` reports to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreLastEvent {
    pub stack: StackId,
    pub merged: u32,
    pub height: u32,
    pub cleared_amount: u32,
}
