//! Headless autoplay runner.
//!
//! Plays seeded rounds with the greedy planner and reports each one as a JSON line. Every
//! placement advances the round clock by one unit, and cleared stacks are dismissed right away
//! since nothing animates them.

use std::env;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::core::{GameConfig, GameSession, RandomSource};
use crate::engine::place::autoplay_step;
use crate::types::{GridPreset, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoplayConfig {
    pub seed: u32,
    pub rounds: u32,
    pub preset: usize,
    /// Placement cap per round; a round still running at the cap is reported unfinished
    pub max_moves: u32,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            rounds: 1,
            preset: 0,
            max_moves: 500,
        }
    }
}

impl AutoplayConfig {
    /// Defaults overridden by `HONEYCOMB_SEED`, `HONEYCOMB_ROUNDS` and `HONEYCOMB_PRESET`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str| env::var(name).ok().map(|s| s.trim().to_string());

        Self {
            seed: var("HONEYCOMB_SEED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seed),
            rounds: var("HONEYCOMB_ROUNDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rounds),
            preset: var("HONEYCOMB_PRESET")
                .and_then(|s| s.parse().ok())
                .filter(|&p| GridPreset::get(p).is_some())
                .unwrap_or(defaults.preset),
            max_moves: defaults.max_moves,
        }
    }

    pub fn grid_preset(&self) -> Result<GridPreset> {
        GridPreset::get(self.preset).ok_or_else(|| anyhow!("autoplay: unknown preset: {}", self.preset))
    }
}

pub fn parse_autoplay_args(args: &[String], defaults: AutoplayConfig) -> Result<AutoplayConfig> {
    let mut config = defaults;
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--seed" | "--rounds" | "--preset" | "--max-moves" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("autoplay: missing value for {}", flag))?;
                let invalid = || anyhow!("autoplay: invalid {} value: {}", flag, v);
                match flag {
                    "--seed" => config.seed = v.parse().map_err(|_| invalid())?,
                    "--rounds" => config.rounds = v.parse().map_err(|_| invalid())?,
                    "--preset" => config.preset = v.parse().map_err(|_| invalid())?,
                    _ => config.max_moves = v.parse().map_err(|_| invalid())?,
                }
            }
            other => {
                return Err(anyhow!("autoplay: unknown argument: {}", other));
            }
        }
        i += 1;
    }

    config.grid_preset()?;
    if config.max_moves == 0 {
        return Err(anyhow!("autoplay: --max-moves must be positive"));
    }
    Ok(config)
}

/// Summary of one played round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub seed: u32,
    pub preset: usize,
    pub rows: u32,
    pub columns: u32,
    /// `won`, `lost`, or `none` when the move cap stopped the round
    pub outcome: &'static str,
    pub score: u32,
    pub target: u32,
    pub moves: u32,
    pub merges: u32,
    pub clears: u32,
    pub elapsed: u32,
    pub free_cells: usize,
}

/// Play the current round until it ends or `max_moves` placements were made
///
/// A session that is not running is reported as-is with zero moves.
pub fn play_round<R: RandomSource>(
    session: &mut GameSession<R>,
    seed: u32,
    preset: usize,
    max_moves: u32,
) -> Result<RoundReport> {
    let mut moves = 0u32;
    let mut merges = 0u32;
    let mut clears = 0u32;
    while session.phase() == Phase::Running && moves < max_moves {
        let result = autoplay_step(session)
            .map_err(|e| anyhow!("autoplay: {} ({})", e.message(), e.code()))?;
        moves += 1;
        merges += result.merged_ids.len() as u32;
        if let Some(cleared) = result.cleared_stack_id {
            clears += 1;
            session.dismiss_cleared(cleared);
        }
        session.tick();
    }

    // The signal is only pending for a finished round; drain it either way.
    let _ = session.take_signal();
    let snapshot = session.snapshot();
    let grid = session.registry().grid();
    Ok(RoundReport {
        round: snapshot.round,
        seed,
        preset,
        rows: grid.rows(),
        columns: grid.columns(),
        outcome: snapshot.outcome.as_str(),
        score: snapshot.score,
        target: snapshot.target,
        moves,
        merges,
        clears,
        elapsed: snapshot.elapsed,
        free_cells: snapshot.free_cells,
    })
}

/// Play `config.rounds` rounds on one seeded session
pub fn run_autoplay(config: &AutoplayConfig) -> Result<Vec<RoundReport>> {
    let preset = config.grid_preset()?;
    let mut session = GameSession::new(GameConfig::from_preset(preset), config.seed)
        .map_err(|e| anyhow!("autoplay: {} ({})", e, e.code()))?;

    let mut reports = Vec::with_capacity(config.rounds as usize);
    for _ in 0..config.rounds {
        session
            .start_round()
            .map_err(|e| anyhow!("autoplay: round start failed: {} ({})", e, e.code()))?;
        let report = play_round(&mut session, config.seed, config.preset, config.max_moves)?;
        tracing::info!(
            round = report.round,
            outcome = report.outcome,
            score = report.score,
            moves = report.moves,
            "autoplay round done"
        );
        reports.push(report);
    }
    Ok(reports)
}
