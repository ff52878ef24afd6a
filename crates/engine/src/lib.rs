//! Engine layer - async plumbing and automated play around the pure core
//!
//! # Module Structure
//!
//! - [`clock`]: Cancellable periodic ticks on a tokio interval
//! - [`driver`]: Single-owner session task fed by commands and clock ticks
//! - [`place`]: Greedy placement planner used for headless play
//!
//! # Example
//!
//! ```
//! use honeycomb_core::{GameConfig, GameSession};
//! use honeycomb_engine::place::autoplay_step;
//!
//! let mut session = GameSession::new(GameConfig::default(), 42).unwrap();
//! session.start_round().unwrap();
//! let result = autoplay_step(&mut session).unwrap();
//! assert!(result.success);
//! ```

pub mod clock;
pub mod driver;
pub mod place;

pub use clock::{default_period, RoundClock};
pub use driver::{spawn_driver, DriverError, DriverHandle, SessionCommand};
pub use place::{apply_place, autoplay_step, evaluate_cell, plan_place, PlaceChoice, PlaceError};
