use crate::registry::{Stack, StackRegistry, StackSlot};
use crate::types::{CellCoord, Outcome, Phase, Point, StackColor, StackId, StackKind};

/// Read-only view of one stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackSnapshot {
    pub id: StackId,
    /// `None` while staged or clearing
    pub cell: Option<CellCoord>,
    pub position: Point,
    pub color: StackColor,
    pub height: u32,
    pub movable: bool,
    pub pending_clear: u32,
    pub background: bool,
}

impl StackSnapshot {
    fn from_stack(stack: &Stack, registry: &StackRegistry) -> Self {
        let cell = match stack.slot {
            StackSlot::Cell(index) => Some(registry.grid().coord(index)),
            StackSlot::Staged(_) | StackSlot::Clearing => None,
        };
        Self {
            id: stack.id,
            cell,
            position: stack.position,
            color: stack.color,
            height: stack.height,
            movable: stack.movable,
            pending_clear: stack.pending_clear,
            background: stack.kind == StackKind::Background,
        }
    }
}

/// Immutable session state handed to the presentation layer after every core call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    /// Staged and on-grid stacks, then stacks still animating their clear
    pub stacks: Vec<StackSnapshot>,
    pub free_cells: usize,
    pub total_cells: usize,
    pub score: u32,
    pub target: u32,
    pub elapsed: u32,
    pub phase: Phase,
    pub outcome: Outcome,
    pub round: u32,
}

impl SessionSnapshot {
    pub(crate) fn fill_stacks(&mut self, registry: &StackRegistry) {
        self.stacks.clear();
        self.stacks.extend(
            registry
                .stacks()
                .iter()
                .chain(registry.clearing())
                .map(|s| StackSnapshot::from_stack(s, registry)),
        );
        self.free_cells = registry.free_count();
        self.total_cells = registry.total_cells();
    }

    pub fn playable(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn stack(&self, id: StackId) -> Option<&StackSnapshot> {
        self.stacks.iter().find(|s| s.id == id)
    }

    pub fn movable(&self) -> impl Iterator<Item = &StackSnapshot> {
        self.stacks.iter().filter(|s| s.movable)
    }

    pub fn on_grid(&self) -> impl Iterator<Item = &StackSnapshot> {
        self.stacks.iter().filter(|s| s.cell.is_some())
    }

    pub fn occupied_cells(&self) -> usize {
        self.on_grid().count()
    }
}
