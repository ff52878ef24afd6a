//! Registry module - authoritative stack collection
//!
//! Owns every live stack plus the free-cell set. Stacks are either staged (dealt, waiting
//! outside the grid), on a grid cell, or released for clearing (off the grid, kept only so
//! the presentation layer can animate them away).
//!
//! The free-cell set is maintained incrementally alongside a per-cell occupancy table.
//! After every mutation `free == all cells - occupied cells`; debug builds assert it.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::config::StagingLayout;
use crate::error::GameError;
use crate::grid::Grid;
use crate::merge::{merge_around, MergeOutcome};
use crate::rng::RandomSource;
use crate::types::{
    CellCoord, Point, StackColor, StackId, StackKind, MAX_STACK_HEIGHT, MIN_STACK_HEIGHT,
};

/// Where a stack currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackSlot {
    /// Waiting in a staging slot outside the grid
    Staged(usize),
    /// Settled on a grid cell (flat index)
    Cell(usize),
    /// Cleared and detached from the grid, awaiting dismissal
    Clearing,
}

/// A colored stack
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub id: StackId,
    pub kind: StackKind,
    pub color: StackColor,
    pub height: u32,
    pub movable: bool,
    /// Height recorded when the stack crossed the clear threshold, 0 otherwise
    pub pending_clear: u32,
    pub slot: StackSlot,
    /// Center point for rendering
    pub position: Point,
}

impl Stack {
    pub fn cell(&self) -> Option<usize> {
        match self.slot {
            StackSlot::Cell(index) => Some(index),
            _ => None,
        }
    }

    pub fn is_on_grid(&self) -> bool {
        matches!(self.slot, StackSlot::Cell(_))
    }
}

/// Result of a successful placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub stack: StackId,
    pub cell: usize,
    pub merge: MergeOutcome,
}

/// Live stacks and free cells for one grid
#[derive(Debug, Clone)]
pub struct StackRegistry {
    grid: Grid,
    staging: StagingLayout,
    /// Staged and on-grid stacks, in creation order
    stacks: Vec<Stack>,
    clearing: Vec<Stack>,
    occupancy: Vec<Option<StackId>>,
    free: BTreeSet<usize>,
    next_id: u32,
}

impl StackRegistry {
    pub fn new(grid: Grid, staging: StagingLayout) -> Self {
        let occupancy = vec![None; grid.len()];
        let free = (0..grid.len()).collect();
        Self {
            grid,
            staging,
            stacks: Vec::new(),
            clearing: Vec::new(),
            occupancy,
            free,
            next_id: 1,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn staging(&self) -> &StagingLayout {
        &self.staging
    }

    /// Staged and on-grid stacks, in creation order
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Stacks released for clearing that have not been dismissed yet
    pub fn clearing(&self) -> &[Stack] {
        &self.clearing
    }

    pub fn stack(&self, id: StackId) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.id == id)
    }

    pub(crate) fn stack_mut(&mut self, id: StackId) -> Option<&mut Stack> {
        self.stacks.iter_mut().find(|s| s.id == id)
    }

    /// Stack occupying `cell`, if any
    pub fn occupant(&self, cell: usize) -> Option<StackId> {
        self.occupancy.get(cell).copied().flatten()
    }

    pub fn stack_at(&self, coord: CellCoord) -> Option<&Stack> {
        let cell = self.grid.index_of(coord)?;
        self.occupant(cell).and_then(|id| self.stack(id))
    }

    /// Free cells in ascending (row-major) order
    pub fn free_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.free.iter().copied()
    }

    pub fn is_free(&self, cell: usize) -> bool {
        self.free.contains(&cell)
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.iter().filter(|o| o.is_some()).count()
    }

    pub fn total_cells(&self) -> usize {
        self.grid.len()
    }

    /// Whether any stack can still be dragged
    pub fn has_movable(&self) -> bool {
        self.stacks.iter().any(|s| s.movable)
    }

    pub fn movable_ids(&self) -> impl Iterator<Item = StackId> + '_ {
        self.stacks.iter().filter(|s| s.movable).map(|s| s.id)
    }

    /// Drop every stack and free every cell; ids keep increasing
    pub fn reset(&mut self) {
        self.stacks.clear();
        self.clearing.clear();
        self.occupancy.iter_mut().for_each(|o| *o = None);
        self.free = (0..self.grid.len()).collect();
        debug_assert!(self.is_consistent());
    }

    /// `free == all cells - occupied cells`, and occupancy agrees with the stacks
    pub fn is_consistent(&self) -> bool {
        let occupancy_matches_free = self
            .occupancy
            .iter()
            .enumerate()
            .all(|(cell, o)| o.is_none() == self.free.contains(&cell));
        let sizes_match = self.free.len() + self.occupied_count() == self.grid.len();
        let stacks_match = self.stacks.iter().all(|s| match s.slot {
            StackSlot::Cell(cell) => self.occupancy[cell] == Some(s.id),
            StackSlot::Staged(_) => s.movable,
            StackSlot::Clearing => false,
        });
        let on_grid = self.stacks.iter().filter(|s| s.is_on_grid()).count();
        occupancy_matches_free && sizes_match && stacks_match && on_grid == self.occupied_count()
    }

    fn allocate_id(&mut self) -> StackId {
        let id = StackId(self.next_id);
        self.next_id += 1;
        id
    }

    fn occupy(&mut self, cell: usize, id: StackId) {
        assert!(
            self.occupancy[cell].is_none(),
            "cell {} already holds {:?}",
            cell,
            self.occupancy[cell]
        );
        self.occupancy[cell] = Some(id);
        let was_free = self.free.remove(&cell);
        assert!(was_free, "cell {} was occupied but missing from the free set", cell);
    }

    fn vacate(&mut self, cell: usize) {
        self.occupancy[cell] = None;
        let inserted = self.free.insert(cell);
        assert!(inserted, "cell {} was already free", cell);
    }

    fn push_stack(&mut self, stack: Stack) {
        assert!(
            self.stack(stack.id).is_none(),
            "duplicate stack id {}",
            stack.id
        );
        self.stacks.push(stack);
    }

    fn next_staging_slot(&self) -> usize {
        (0..)
            .find(|slot| {
                !self
                    .stacks
                    .iter()
                    .any(|s| s.slot == StackSlot::Staged(*slot))
            })
            .unwrap_or(0)
    }

    /// Put a settled, non-movable stack directly on a cell
    ///
    /// Used for scripted setups; normal play goes through seeding and placement.
    pub fn spawn_at(
        &mut self,
        coord: CellCoord,
        color: StackColor,
        height: u32,
        kind: StackKind,
    ) -> Result<StackId, GameError> {
        let cell = self.grid.index_of(coord).ok_or(GameError::InvalidConfiguration {
            reason: "cell outside the grid",
        })?;
        if !self.is_free(cell) {
            return Err(GameError::InsufficientCells {
                requested: 1,
                available: 0,
            });
        }
        let id = self.allocate_id();
        self.occupy(cell, id);
        self.push_stack(Stack {
            id,
            kind,
            color,
            height: height.max(1),
            movable: false,
            pending_clear: 0,
            slot: StackSlot::Cell(cell),
            position: self.grid.center(cell),
        });
        debug_assert!(self.is_consistent());
        Ok(id)
    }

    /// Add a movable stack to the next empty staging slot
    pub fn stage(&mut self, color: StackColor, height: u32) -> StackId {
        let slot = self.next_staging_slot();
        let id = self.allocate_id();
        self.push_stack(Stack {
            id,
            kind: StackKind::Active,
            color,
            height: height.max(1),
            movable: true,
            pending_clear: 0,
            slot: StackSlot::Staged(slot),
            position: self.staging.slot(slot),
        });
        id
    }

    /// Seed `count` non-movable background stacks on random free cells
    ///
    /// Colors are pairwise distinct (redrawn on collision); heights are in
    /// [`MIN_STACK_HEIGHT`]..=[`MAX_STACK_HEIGHT`].
    pub fn seed_background<R: RandomSource>(
        &mut self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<StackId>, GameError> {
        if count > StackColor::ALL.len() {
            return Err(GameError::InvalidConfiguration {
                reason: "background seed count exceeds the palette",
            });
        }
        if count > self.free_count() {
            return Err(GameError::InsufficientCells {
                requested: count,
                available: self.free_count(),
            });
        }

        let colors = distinct_colors(rng, count);

        let mut cells: Vec<usize> = self.free_cells().collect();
        rng.shuffle(&mut cells);

        let mut ids = Vec::with_capacity(count);
        for (&cell, color) in cells.iter().zip(colors) {
            let height = rng.next_inclusive(MIN_STACK_HEIGHT, MAX_STACK_HEIGHT);
            let id = self.allocate_id();
            self.occupy(cell, id);
            self.push_stack(Stack {
                id,
                kind: StackKind::Background,
                color,
                height,
                movable: false,
                pending_clear: 0,
                slot: StackSlot::Cell(cell),
                position: self.grid.center(cell),
            });
            ids.push(id);
        }

        tracing::debug!(count, free = self.free_count(), "seeded background stacks");
        debug_assert!(self.is_consistent());
        Ok(ids)
    }

    /// Deal `n` movable stacks into the staging slots
    pub fn deal_active<R: RandomSource>(
        &mut self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<StackId>, GameError> {
        if n > self.free_count() {
            return Err(GameError::InsufficientCells {
                requested: n,
                available: self.free_count(),
            });
        }

        let mut ids = Vec::with_capacity(n);
        for _ in 0..n {
            let color = rng.choose(&StackColor::ALL).unwrap_or(StackColor::Gray);
            let height = rng.next_inclusive(MIN_STACK_HEIGHT, MAX_STACK_HEIGHT);
            ids.push(self.stage(color, height));
        }

        tracing::debug!(dealt = n, "dealt active stacks");
        Ok(ids)
    }

    /// Nearest free cell whose center is strictly within one cell size of `target`
    ///
    /// Ties go to the lowest row-major index. A non-finite target reaches nothing.
    pub fn nearest_free_cell(&self, target: Point) -> Option<usize> {
        if !target.is_finite() {
            return None;
        }
        let reach = self.grid.cell_size();
        let mut best: Option<(usize, f32)> = None;
        for cell in self.free_cells() {
            let d = target.distance(self.grid.center(cell));
            if !(d < reach) {
                continue;
            }
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((cell, d)),
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Drop a movable stack at `target`
    ///
    /// On success the stack settles on the nearest free cell and the merge/clear pass runs
    /// before returning. On `NoNearbyCell` nothing changes and the stack stays staged.
    pub fn place(
        &mut self,
        id: StackId,
        target: Point,
        clear_threshold: u32,
    ) -> Result<Placement, GameError> {
        let stack = self.stack(id).ok_or(GameError::UnknownStack(id))?;
        if !stack.movable {
            return Err(GameError::StackNotMovable(id));
        }

        let cell = self
            .nearest_free_cell(target)
            .ok_or(GameError::NoNearbyCell {
                x: target.x,
                y: target.y,
            })?;

        self.occupy(cell, id);
        let center = self.grid.center(cell);
        if let Some(stack) = self.stack_mut(id) {
            stack.slot = StackSlot::Cell(cell);
            stack.position = center;
            stack.movable = false;
        }

        let merge = merge_around(self, id, clear_threshold);
        debug_assert!(self.is_consistent());

        Ok(Placement {
            stack: id,
            cell,
            merge,
        })
    }

    /// Same-color stacks on the orthogonal neighbors of `cell`, excluding `exclude`
    pub fn find_adjacent(
        &self,
        cell: usize,
        color: StackColor,
        exclude: StackId,
    ) -> ArrayVec<StackId, 4> {
        self.grid
            .neighbors(cell)
            .into_iter()
            .filter_map(|n| self.occupant(n))
            .filter(|&other| other != exclude)
            .filter(|&other| self.stack(other).is_some_and(|s| s.color == color))
            .collect()
    }

    /// Delete a stack, freeing its cell
    pub fn remove(&mut self, id: StackId) -> Option<Stack> {
        let index = self.stacks.iter().position(|s| s.id == id)?;
        let stack = self.stacks.remove(index);
        if let StackSlot::Cell(cell) = stack.slot {
            self.vacate(cell);
        }
        debug_assert!(self.is_consistent());
        Some(stack)
    }

    /// Detach a settled stack from the grid into the clearing list
    ///
    /// The cell is freed immediately; the stack stays visible through [`Self::clearing`]
    /// until [`Self::dismiss_cleared`].
    pub fn release(&mut self, id: StackId) -> Option<&Stack> {
        let mut stack = self.remove(id)?;
        stack.slot = StackSlot::Clearing;
        stack.movable = false;
        self.clearing.push(stack);
        self.clearing.last()
    }

    /// Forget a released stack; returns whether it was present
    pub fn dismiss_cleared(&mut self, id: StackId) -> bool {
        let before = self.clearing.len();
        self.clearing.retain(|s| s.id != id);
        self.clearing.len() != before
    }
}

/// Draw `count` pairwise-distinct colors, redrawing on collision
///
/// A source that keeps repeating itself stops being retried after a bounded number of
/// draws; remaining colors are then filled in palette order.
fn distinct_colors<R: RandomSource>(rng: &mut R, count: usize) -> Vec<StackColor> {
    let mut colors: Vec<StackColor> = Vec::with_capacity(count);
    let mut attempts = 0usize;
    let max_attempts = 64 * StackColor::ALL.len();

    while colors.len() < count && attempts < max_attempts {
        attempts += 1;
        if let Some(color) = rng.choose(&StackColor::ALL) {
            if !colors.contains(&color) {
                colors.push(color);
            }
        }
    }

    for color in StackColor::ALL {
        if colors.len() >= count {
            break;
        }
        if !colors.contains(&color) {
            colors.push(color);
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SimpleRng};

    fn registry(rows: u32, columns: u32) -> StackRegistry {
        let grid = Grid::new(rows, columns, 70.0, 10.0, Point::new(35.0, 187.0)).unwrap();
        StackRegistry::new(grid, StagingLayout::default())
    }

    #[test]
    fn test_new_registry_all_free() {
        let reg = registry(5, 5);
        assert_eq!(reg.free_count(), 25);
        assert_eq!(reg.occupied_count(), 0);
        assert!(reg.is_consistent());
        assert!(!reg.has_movable());
    }

    #[test]
    fn test_seed_background() {
        let mut reg = registry(5, 5);
        let mut rng = SimpleRng::new(42);
        let ids = reg.seed_background(&mut rng, 5).unwrap();

        assert_eq!(ids.len(), 5);
        assert_eq!(reg.free_count(), 20);
        assert!(reg.is_consistent());

        let mut colors: Vec<StackColor> = reg.stacks().iter().map(|s| s.color).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 5, "background colors must be distinct");

        for s in reg.stacks() {
            assert_eq!(s.kind, StackKind::Background);
            assert!(!s.movable);
            assert!((MIN_STACK_HEIGHT..=MAX_STACK_HEIGHT).contains(&s.height));
            assert!(s.is_on_grid());
        }
    }

    #[test]
    fn test_seed_background_insufficient_cells() {
        let mut reg = registry(2, 2);
        let mut rng = SimpleRng::new(1);
        assert_eq!(
            reg.seed_background(&mut rng, 5),
            Err(GameError::InsufficientCells {
                requested: 5,
                available: 4
            })
        );
        assert_eq!(reg.free_count(), 4);
    }

    #[test]
    fn test_seed_background_retries_color_collisions() {
        let mut reg = registry(3, 3);
        // Always the same color: falls back to palette order after bounded retries.
        let mut rng = ScriptedRng::new(vec![0]);
        reg.seed_background(&mut rng, 3).unwrap();
        let mut colors: Vec<StackColor> = reg.stacks().iter().map(|s| s.color).collect();
        colors.sort();
        assert_eq!(
            colors,
            vec![StackColor::Red, StackColor::Orange, StackColor::Yellow]
        );
    }

    #[test]
    fn test_deal_active_staging_slots() {
        let mut reg = registry(5, 5);
        let mut rng = SimpleRng::new(5);
        let ids = reg.deal_active(&mut rng, 3).unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(reg.free_count(), 25, "dealing does not touch the grid");
        for (i, id) in ids.iter().enumerate() {
            let s = reg.stack(*id).unwrap();
            assert!(s.movable);
            assert_eq!(s.slot, StackSlot::Staged(i));
            assert_eq!(s.position, reg.staging().slot(i));
        }
    }

    #[test]
    fn test_deal_active_insufficient_cells() {
        let mut reg = registry(1, 2);
        let mut rng = SimpleRng::new(5);
        assert!(matches!(
            reg.deal_active(&mut rng, 3),
            Err(GameError::InsufficientCells {
                requested: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_place_snaps_to_nearest_free_cell() {
        let mut reg = registry(3, 3);
        let id = reg.stage(StackColor::Blue, 3);
        // Near cell (1,1) at (115, 267).
        let placement = reg.place(id, Point::new(120.0, 270.0), 10).unwrap();

        assert_eq!(placement.cell, 4);
        let s = reg.stack(id).unwrap();
        assert!(!s.movable);
        assert_eq!(s.position, Point::new(115.0, 267.0));
        assert!(!reg.is_free(4));
        assert_eq!(reg.free_count(), 8);
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_place_tie_breaks_on_lowest_index() {
        let mut reg = registry(1, 2);
        let id = reg.stage(StackColor::Blue, 3);
        // Exactly between (35,187) and (115,187).
        let placement = reg.place(id, Point::new(75.0, 187.0), 10).unwrap();
        assert_eq!(placement.cell, 0);
    }

    #[test]
    fn test_place_skips_occupied_cells() {
        let mut reg = registry(1, 2);
        reg.spawn_at(CellCoord::new(0, 0), StackColor::Red, 2, StackKind::Background)
            .unwrap();
        let id = reg.stage(StackColor::Blue, 3);
        // Closer to the occupied cell 0, but only cell 1 is free.
        let placement = reg.place(id, Point::new(70.0, 187.0), 10).unwrap();
        assert_eq!(placement.cell, 1);
    }

    #[test]
    fn test_place_no_nearby_cell_leaves_stack_staged() {
        let mut reg = registry(2, 2);
        let id = reg.stage(StackColor::Green, 2);
        let before = reg.stack(id).unwrap().clone();

        let err = reg.place(id, Point::new(500.0, 900.0), 10).unwrap_err();
        assert!(matches!(err, GameError::NoNearbyCell { .. }));
        assert_eq!(reg.stack(id), Some(&before));
        assert_eq!(reg.free_count(), 4);
    }

    #[test]
    fn test_place_non_finite_target_leaves_stack_staged() {
        let mut reg = registry(2, 2);
        let id = reg.stage(StackColor::Green, 2);
        let before = reg.stack(id).unwrap().clone();

        for target in [
            Point::new(f32::NAN, f32::NAN),
            Point::new(35.0, f32::NAN),
            Point::new(f32::INFINITY, 187.0),
        ] {
            assert_eq!(reg.nearest_free_cell(target), None);
            let err = reg.place(id, target, 10).unwrap_err();
            assert!(matches!(err, GameError::NoNearbyCell { .. }));
        }
        assert_eq!(reg.stack(id), Some(&before));
        assert_eq!(reg.free_count(), 4);
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_place_reach_is_strict() {
        let mut reg = registry(1, 1);
        let id = reg.stage(StackColor::Green, 2);
        // Exactly one cell size away from (35,187).
        assert!(reg.place(id, Point::new(105.0, 187.0), 10).is_err());
        assert!(reg.place(id, Point::new(104.0, 187.0), 10).is_ok());
    }

    #[test]
    fn test_place_rejects_unknown_and_settled() {
        let mut reg = registry(2, 2);
        assert_eq!(
            reg.place(StackId(99), Point::new(35.0, 187.0), 10),
            Err(GameError::UnknownStack(StackId(99)))
        );

        let id = reg.stage(StackColor::Green, 2);
        reg.place(id, Point::new(35.0, 187.0), 10).unwrap();
        assert_eq!(
            reg.place(id, Point::new(115.0, 187.0), 10),
            Err(GameError::StackNotMovable(id))
        );
    }

    #[test]
    fn test_find_adjacent_filters_color_and_self() {
        let mut reg = registry(3, 3);
        let center = reg
            .spawn_at(CellCoord::new(1, 1), StackColor::Red, 2, StackKind::Active)
            .unwrap();
        let up = reg
            .spawn_at(CellCoord::new(0, 1), StackColor::Red, 2, StackKind::Active)
            .unwrap();
        reg.spawn_at(CellCoord::new(1, 0), StackColor::Blue, 2, StackKind::Active)
            .unwrap();
        // Diagonal does not count.
        reg.spawn_at(CellCoord::new(0, 0), StackColor::Red, 2, StackKind::Active)
            .unwrap();

        let adj = reg.find_adjacent(4, StackColor::Red, center);
        assert_eq!(adj.as_slice(), &[up]);
    }

    #[test]
    fn test_remove_frees_cell() {
        let mut reg = registry(2, 2);
        let id = reg
            .spawn_at(CellCoord::new(1, 1), StackColor::Red, 2, StackKind::Background)
            .unwrap();
        assert_eq!(reg.free_count(), 3);

        let removed = reg.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(reg.free_count(), 4);
        assert!(reg.is_free(3));
        assert!(reg.remove(id).is_none());
        assert!(reg.is_consistent());
    }

    #[test]
    fn test_release_and_dismiss() {
        let mut reg = registry(2, 2);
        let id = reg
            .spawn_at(CellCoord::new(0, 0), StackColor::Red, 12, StackKind::Active)
            .unwrap();

        let released = reg.release(id).unwrap();
        assert_eq!(released.slot, StackSlot::Clearing);
        assert_eq!(reg.free_count(), 4);
        assert!(reg.stack(id).is_none());
        assert_eq!(reg.clearing().len(), 1);
        assert!(reg.is_consistent());

        assert!(reg.dismiss_cleared(id));
        assert!(!reg.dismiss_cleared(id));
        assert!(reg.clearing().is_empty());
    }

    #[test]
    fn test_reset_keeps_ids_increasing() {
        let mut reg = registry(2, 2);
        let first = reg.stage(StackColor::Red, 2);
        reg.reset();
        let second = reg.stage(StackColor::Red, 2);
        assert!(second > first);
        assert_eq!(reg.free_count(), 4);
        assert_eq!(reg.stacks().len(), 1);
    }

    #[test]
    fn test_staging_reuses_first_empty_slot() {
        let mut reg = registry(2, 2);
        let a = reg.stage(StackColor::Red, 2);
        let _b = reg.stage(StackColor::Red, 2);
        reg.place(a, Point::new(35.0, 187.0), 10).unwrap();
        let c = reg.stage(StackColor::Red, 2);
        assert_eq!(reg.stack(c).unwrap().slot, StackSlot::Staged(0));
    }
}
