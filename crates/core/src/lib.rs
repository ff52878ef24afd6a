//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains all the game rules and state management. It has **no dependencies**
//! on rendering, audio, input or I/O, making it:
//!
//! - **Deterministic**: Same seed (or scripted random source) produces identical rounds
//! - **Testable**: Every rule is reachable through plain function calls
//! - **Portable**: Any presentation layer can drive it and render its snapshots
//!
//! # Module Structure
//!
//! - [`grid`]: Fixed cell geometry for a rows x columns configuration
//! - [`registry`]: Authoritative stack collection and free-cell set
//! - [`merge`]: Single-pass same-color merge and clear flagging
//! - [`session`]: Round lifecycle, scoring, dealing, win/lose transitions
//! - [`rng`]: Injectable random source with a seeded LCG default
//! - [`snapshot`]: Immutable views for the presentation layer
//! - [`config`]: Round configuration and validation
//!
//! # Game Rules
//!
//! - **Seeding**: 5 non-movable background stacks with distinct colors on random cells
//! - **Dealing**: 3 movable stacks at a time; a new batch arrives once all are placed
//! - **Placement**: A dropped stack snaps to the nearest free cell within one cell size
//! - **Merging**: Same-color orthogonal neighbors fold into the placed stack (one pass)
//! - **Clearing**: A stack of height 10 or more is cleared and its height is scored
//! - **Winning**: Score reaches the round's target
//! - **Losing**: The grid has no free cell left before the target is reached
//!
//! # Example
//!
//! ```
//! use honeycomb_core::{GameConfig, GameSession};
//! use honeycomb_core::types::Phase;
//!
//! let mut session = GameSession::new(GameConfig::default(), 12345).unwrap();
//! let snapshot = session.start_round().unwrap();
//! assert_eq!(snapshot.phase, Phase::Running);
//!
//! // Drag the first dealt stack onto the first free cell.
//! let stack = snapshot.movable().next().unwrap().id;
//! let cell = session.registry().free_cells().next().unwrap();
//! let target = session.registry().grid().center(cell);
//! let result = session.place_stack(stack, target).unwrap();
//! assert!(result.success);
//!
//! session.tick();
//! assert_eq!(session.elapsed(), 1);
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod merge;
pub mod registry;
pub mod rng;
pub mod session;
pub mod snapshot;

pub use honeycomb_types as types;

// Re-export commonly used types for convenience
pub use config::{GameConfig, StagingLayout};
pub use error::GameError;
pub use grid::{compute_cell_positions, Cell, Grid};
pub use merge::MergeOutcome;
pub use registry::{Placement, Stack, StackRegistry, StackSlot};
pub use rng::{RandomSource, ScriptedRng, SimpleRng};
pub use session::{GameSession, PlacementResult, RoundSignal};
pub use snapshot::{SessionSnapshot, StackSnapshot};
