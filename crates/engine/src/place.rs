//! Greedy placement planner.
//!
//! Picks a (movable stack, free cell) pair by a one-ply heuristic and drops the stack on the
//! chosen cell's center. Used by the headless runner and the benchmarks.

use honeycomb_core::types::{CellCoord, Phase, StackId};
use honeycomb_core::{GameError, GameSession, PlacementResult, RandomSource, StackRegistry};

/// Bonus for a placement that reaches the clear threshold.
const CLEAR_BONUS: i64 = 1_000;

/// Penalty per differently-colored neighbor.
const CLUTTER_PENALTY: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    NotPlayable,
    NoMovable,
    UnknownStack,
    StackNotMovable,
    CellOutOfBounds,
    CellOccupied,
    NoNearbyCell,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "not_running",
            PlaceError::NoMovable => "no_movable",
            PlaceError::UnknownStack
            | PlaceError::StackNotMovable
            | PlaceError::CellOutOfBounds
            | PlaceError::CellOccupied
            | PlaceError::NoNearbyCell => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "session is not running",
            PlaceError::NoMovable => "no movable stack to place",
            PlaceError::UnknownStack => "stack id is unknown",
            PlaceError::StackNotMovable => "stack is already settled",
            PlaceError::CellOutOfBounds => "target cell is outside the grid",
            PlaceError::CellOccupied => "target cell is occupied",
            PlaceError::NoNearbyCell => "no free cell near the drop point",
        }
    }
}

impl From<GameError> for PlaceError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::UnknownStack(_) => PlaceError::UnknownStack,
            GameError::StackNotMovable(_) => PlaceError::StackNotMovable,
            GameError::NoNearbyCell { .. } => PlaceError::NoNearbyCell,
            GameError::NotRunning
            | GameError::InvalidConfiguration { .. }
            | GameError::InsufficientCells { .. } => PlaceError::NotPlayable,
        }
    }
}

/// A planned move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceChoice {
    pub stack: StackId,
    pub cell: CellCoord,
    pub score: i64,
}

/// Score dropping `stack` on grid cell `cell`
///
/// Rewards same-color neighbor height, a large bonus when the merged height reaches
/// `clear_threshold`, and a small penalty per differently-colored neighbor.
pub fn evaluate_cell(
    registry: &StackRegistry,
    stack: StackId,
    cell: usize,
    clear_threshold: u32,
) -> Option<i64> {
    let placed = registry.stack(stack)?;
    if !registry.is_free(cell) {
        return None;
    }

    let mut merged_height = placed.height;
    let mut clutter = 0i64;
    for neighbor in registry.grid().neighbors(cell) {
        let Some(other) = registry.occupant(neighbor).and_then(|id| registry.stack(id)) else {
            continue;
        };
        if other.color == placed.color {
            merged_height += other.height;
        } else {
            clutter += 1;
        }
    }

    let gain = i64::from(merged_height - placed.height);
    let bonus = if merged_height >= clear_threshold {
        CLEAR_BONUS + i64::from(merged_height)
    } else {
        0
    };
    Some(gain * 10 + bonus - clutter * CLUTTER_PENALTY)
}

/// Best move for the current session, or `None` when nothing can be placed
///
/// Ties keep the earliest movable stack and then the lowest row-major cell.
pub fn plan_place<R: RandomSource>(session: &GameSession<R>) -> Option<PlaceChoice> {
    if session.phase() != Phase::Running {
        return None;
    }
    let registry = session.registry();
    let threshold = session.config().clear_threshold;

    let mut best: Option<(StackId, usize, i64)> = None;
    for stack in registry.movable_ids() {
        for cell in registry.free_cells() {
            let Some(score) = evaluate_cell(registry, stack, cell, threshold) else {
                continue;
            };
            if best.map_or(true, |(_, _, s)| score > s) {
                best = Some((stack, cell, score));
            }
        }
    }

    best.map(|(stack, cell, score)| PlaceChoice {
        stack,
        cell: registry.grid().coord(cell),
        score,
    })
}

/// Drop `stack` exactly on `target`
pub fn apply_place<R: RandomSource>(
    session: &mut GameSession<R>,
    stack: StackId,
    target: CellCoord,
) -> Result<PlacementResult, PlaceError> {
    if session.phase() != Phase::Running {
        return Err(PlaceError::NotPlayable);
    }

    let registry = session.registry();
    let Some(placed) = registry.stack(stack) else {
        return Err(PlaceError::UnknownStack);
    };
    if !placed.movable {
        return Err(PlaceError::StackNotMovable);
    }
    let Some(cell) = registry.grid().index_of(target) else {
        return Err(PlaceError::CellOutOfBounds);
    };
    if !registry.is_free(cell) {
        return Err(PlaceError::CellOccupied);
    }

    let point = registry.grid().center(cell);
    let result = session.place_stack(stack, point)?;
    if !result.success {
        return Err(PlaceError::NoNearbyCell);
    }
    Ok(result)
}

/// Plan and apply one move
pub fn autoplay_step<R: RandomSource>(
    session: &mut GameSession<R>,
) -> Result<PlacementResult, PlaceError> {
    if session.phase() != Phase::Running {
        return Err(PlaceError::NotPlayable);
    }
    let choice = plan_place(session).ok_or(PlaceError::NoMovable)?;
    tracing::trace!(
        stack = choice.stack.0,
        row = choice.cell.row,
        column = choice.cell.column,
        score = choice.score,
        "planned move"
    );
    apply_place(session, choice.stack, choice.cell)
}
