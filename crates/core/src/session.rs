//! Session module - round lifecycle and scoring
//!
//! Ties the grid, registry, merge pass and randomness together:
//!
//! - `Idle -> Running` on [`GameSession::start_round`]: target drawn, timer reset, grid seeded,
//!   first batch dealt.
//! - While running, every placement is one atomic step: place, merge, clear, score,
//!   win/lose check, and a new deal once no movable stack remains.
//! - `Running -> Won` when score reaches the target, `Running -> Lost` when the grid has no
//!   free cell left. Each terminal transition is reported once through
//!   [`GameSession::take_signal`].
//!
//! Clears are booked when flagged: the score is credited and the cell freed right away, while
//! the stack lingers in the clearing list until the presentation layer dismisses it.

use crate::config::GameConfig;
use crate::error::GameError;
use crate::grid::Grid;
use crate::registry::StackRegistry;
use crate::rng::{RandomSource, SimpleRng};
use crate::snapshot::SessionSnapshot;
use crate::types::{CellCoord, CoreLastEvent, Outcome, Phase, Point, StackId};

/// What a placement request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementResult {
    /// `false` when no free cell was near the drop point; nothing changed then
    pub success: bool,
    pub stack: StackId,
    pub cell: Option<CellCoord>,
    pub merged_ids: Vec<StackId>,
    pub cleared_stack_id: Option<StackId>,
    pub cleared_amount: Option<u32>,
    pub new_free_cell_count: usize,
    /// Stacks dealt because the last movable stack was placed
    pub dealt_ids: Vec<StackId>,
    pub outcome: Outcome,
}

impl PlacementResult {
    fn rejected(stack: StackId, free: usize, outcome: Outcome) -> Self {
        Self {
            success: false,
            stack,
            cell: None,
            merged_ids: Vec::new(),
            cleared_stack_id: None,
            cleared_amount: None,
            new_free_cell_count: free,
            dealt_ids: Vec::new(),
            outcome,
        }
    }
}

/// Terminal transition report, emitted once per finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSignal {
    pub round: u32,
    pub outcome: Outcome,
    pub score: u32,
    pub target: u32,
    pub elapsed: u32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession<R: RandomSource = SimpleRng> {
    config: GameConfig,
    registry: StackRegistry,
    rng: R,
    phase: Phase,
    score: u32,
    target: u32,
    /// Elapsed time units in the current round (one per tick)
    elapsed: u32,
    clock_running: bool,
    /// Monotonic round id (increments on every start)
    round: u32,
    signal: Option<RoundSignal>,
    /// Last placement event (consumed by observers)
    last_event: Option<CoreLastEvent>,
}

impl GameSession<SimpleRng> {
    /// Create an idle session with a seeded RNG
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, GameError> {
        Self::with_rng(config, SimpleRng::new(seed))
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Create an idle session drawing from `rng`
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, GameError> {
        config.validate()?;
        let grid = Grid::from_config(&config)?;
        let registry = StackRegistry::new(grid, config.staging);
        Ok(Self {
            config,
            registry,
            rng,
            phase: Phase::Idle,
            score: 0,
            target: 0,
            elapsed: 0,
            clock_running: false,
            round: 0,
            signal: None,
            last_event: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &StackRegistry {
        &self.registry
    }

    /// Direct registry access for scripted setups
    ///
    /// Mutations made here bypass scoring and the win/lose checks until the next placement.
    #[doc(hidden)]
    pub fn registry_mut(&mut self) -> &mut StackRegistry {
        &mut self.registry
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Outcome {
        self.phase.outcome()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn clock_running(&self) -> bool {
        self.clock_running
    }

    pub fn free_cell_count(&self) -> usize {
        self.registry.free_count()
    }

    /// Swap in a new configuration; not allowed mid-round
    pub fn reconfigure(&mut self, config: GameConfig) -> Result<(), GameError> {
        if self.phase == Phase::Running {
            return Err(GameError::InvalidConfiguration {
                reason: "cannot reconfigure a running round",
            });
        }
        config.validate()?;
        let grid = Grid::from_config(&config)?;
        self.registry = StackRegistry::new(grid, config.staging);
        self.config = config;
        Ok(())
    }

    /// Apply `config` and start a round with it
    pub fn start_round_with(&mut self, config: GameConfig) -> Result<SessionSnapshot, GameError> {
        if self.phase == Phase::Running {
            self.abandon();
        }
        self.reconfigure(config)?;
        self.start_round()
    }

    /// Start a fresh round from any phase
    ///
    /// On error the session is left idle with an empty board.
    pub fn start_round(&mut self) -> Result<SessionSnapshot, GameError> {
        self.round = self.round.wrapping_add(1);
        self.signal = None;
        self.last_event = None;

        if let Err(err) = self.setup_round() {
            tracing::warn!(round = self.round, error = %err, "round setup failed");
            self.reset_to_idle();
            return Err(err);
        }

        self.phase = Phase::Running;
        self.clock_running = true;
        tracing::info!(
            round = self.round,
            target = self.target,
            cells = self.registry.total_cells(),
            "round started"
        );

        // A seed that fills the whole grid ends the round on the spot.
        self.evaluate_round();
        Ok(self.snapshot())
    }

    fn setup_round(&mut self) -> Result<(), GameError> {
        self.config.validate()?;
        self.registry.reset();
        self.score = 0;
        self.elapsed = 0;
        self.target = self
            .rng
            .choose(&self.config.target_score_candidates)
            .ok_or(GameError::InvalidConfiguration {
                reason: "at least one target score candidate is required",
            })?;

        self.registry
            .seed_background(&mut self.rng, self.config.background_seed_count)?;
        self.deal_batch()?;
        Ok(())
    }

    /// Start over after a finished (or running) round
    pub fn restart(&mut self) -> Result<SessionSnapshot, GameError> {
        tracing::info!(round = self.round, phase = self.phase.as_str(), "restart requested");
        self.start_round()
    }

    /// Leave the round and return to idle
    pub fn abandon(&mut self) {
        if self.phase != Phase::Idle {
            tracing::info!(round = self.round, phase = self.phase.as_str(), "round abandoned");
        }
        self.reset_to_idle();
    }

    fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.clock_running = false;
        self.registry.reset();
        self.score = 0;
        self.target = 0;
        self.elapsed = 0;
    }

    /// Advance elapsed time by one unit while the round runs
    pub fn tick(&mut self) -> SessionSnapshot {
        if self.phase == Phase::Running && self.clock_running {
            self.elapsed = self.elapsed.saturating_add(1);
            tracing::trace!(elapsed = self.elapsed, "tick");
        }
        self.snapshot()
    }

    /// Stop the clock; later ticks do nothing. Idempotent.
    pub fn stop_clock(&mut self) {
        self.clock_running = false;
    }

    /// Resume a stopped clock, only while the round runs
    pub fn resume_clock(&mut self) -> bool {
        if self.phase == Phase::Running {
            self.clock_running = true;
        }
        self.clock_running
    }

    /// Drop a stack at `point`
    ///
    /// Returns `Ok` with `success == false` when no free cell is close enough; the stack then
    /// stays where it was. Unknown or settled stacks and non-running sessions are errors.
    pub fn place_stack(
        &mut self,
        stack: StackId,
        point: Point,
    ) -> Result<PlacementResult, GameError> {
        if self.phase != Phase::Running {
            return Err(GameError::NotRunning);
        }

        let placement = match self
            .registry
            .place(stack, point, self.config.clear_threshold)
        {
            Ok(placement) => placement,
            Err(GameError::NoNearbyCell { x, y }) => {
                tracing::debug!(stack = stack.0, x, y, "no free cell near drop point");
                return Ok(PlacementResult::rejected(
                    stack,
                    self.registry.free_count(),
                    self.outcome(),
                ));
            }
            Err(err) => return Err(err),
        };

        let coord = self.registry.grid().coord(placement.cell);
        let merge = placement.merge;

        let mut cleared_amount = None;
        if merge.needs_clear() {
            self.registry.release(stack);
            self.score = self.score.saturating_add(merge.pending_clear);
            cleared_amount = Some(merge.pending_clear);
            tracing::debug!(
                stack = stack.0,
                amount = merge.pending_clear,
                score = self.score,
                "stack cleared"
            );
        }

        self.last_event = Some(CoreLastEvent {
            stack,
            merged: merge.merged.len() as u32,
            height: merge.height,
            cleared_amount: merge.pending_clear,
        });

        self.evaluate_round();

        let mut dealt_ids = Vec::new();
        if self.phase == Phase::Running && !self.registry.has_movable() {
            dealt_ids = self.deal_batch()?;
        }

        tracing::debug!(
            stack = stack.0,
            row = coord.row,
            column = coord.column,
            height = merge.height,
            free = self.registry.free_count(),
            "stack placed"
        );

        Ok(PlacementResult {
            success: true,
            stack,
            cell: Some(coord),
            merged_ids: merge.merged.to_vec(),
            cleared_stack_id: cleared_amount.map(|_| stack),
            cleared_amount,
            new_free_cell_count: self.registry.free_count(),
            dealt_ids,
            outcome: self.outcome(),
        })
    }

    /// Deal a batch, shrunk to the free-cell count when the grid is nearly full
    fn deal_batch(&mut self) -> Result<Vec<StackId>, GameError> {
        let n = self.config.deal_batch_size.min(self.registry.free_count());
        if n < self.config.deal_batch_size {
            tracing::debug!(
                requested = self.config.deal_batch_size,
                dealt = n,
                "deal batch reduced to free cells"
            );
        }
        self.registry.deal_active(&mut self.rng, n)
    }

    fn evaluate_round(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        if self.score >= self.target {
            self.finish(Phase::Won);
        } else if self.registry.free_count() == 0 {
            self.finish(Phase::Lost);
        }
    }

    fn finish(&mut self, phase: Phase) {
        debug_assert!(phase.is_terminal());
        self.phase = phase;
        self.clock_running = false;
        self.signal = Some(RoundSignal {
            round: self.round,
            outcome: phase.outcome(),
            score: self.score,
            target: self.target,
            elapsed: self.elapsed,
        });
        tracing::info!(
            round = self.round,
            outcome = phase.as_str(),
            score = self.score,
            target = self.target,
            elapsed = self.elapsed,
            "round finished"
        );
    }

    /// Take the terminal-transition report, if one is pending
    pub fn take_signal(&mut self) -> Option<RoundSignal> {
        self.signal.take()
    }

    /// Take and clear the last placement event.
    pub fn take_last_event(&mut self) -> Option<CoreLastEvent> {
        self.last_event.take()
    }

    /// Forget a cleared stack once its removal animation is done
    pub fn dismiss_cleared(&mut self, stack: StackId) -> bool {
        self.registry.dismiss_cleared(stack)
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.fill_stacks(&self.registry);
        out.score = self.score;
        out.target = self.target;
        out.elapsed = self.elapsed;
        out.phase = self.phase;
        out.outcome = self.phase.outcome();
        out.round = self.round;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
