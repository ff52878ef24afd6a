//! Merge/clear pass run after every successful placement
//!
//! One adjacency pass centered on the stack that just landed: every orthogonal neighbor of
//! the same color is folded into it and removed. The pass does not chain: stacks that become
//! adjacent to the survivor's color through the merge are left alone until some later
//! placement lands next to them.

use arrayvec::ArrayVec;

use crate::registry::StackRegistry;
use crate::types::StackId;

/// What the merge pass did to the survivor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Neighbors folded into the survivor (now gone)
    pub merged: ArrayVec<StackId, 4>,
    /// Sum of the merged neighbors' heights
    pub absorbed: u32,
    /// Survivor height after the pass
    pub height: u32,
    /// Set to `height` when the survivor reached the clear threshold
    pub pending_clear: u32,
}

impl MergeOutcome {
    pub fn did_merge(&self) -> bool {
        !self.merged.is_empty()
    }

    pub fn needs_clear(&self) -> bool {
        self.pending_clear > 0
    }
}

/// Fold same-color neighbors of `survivor` into it and flag it for clearing if needed
///
/// `survivor` must be on the grid.
pub(crate) fn merge_around(
    registry: &mut StackRegistry,
    survivor: StackId,
    clear_threshold: u32,
) -> MergeOutcome {
    let Some((cell, color, height)) = registry
        .stack(survivor)
        .and_then(|s| s.cell().map(|cell| (cell, s.color, s.height)))
    else {
        debug_assert!(false, "merge_around on a stack that is not on the grid");
        return MergeOutcome::default();
    };

    let neighbors = registry.find_adjacent(cell, color, survivor);

    let mut outcome = MergeOutcome {
        height,
        ..MergeOutcome::default()
    };
    for id in neighbors {
        if let Some(removed) = registry.remove(id) {
            outcome.absorbed += removed.height;
            outcome.merged.push(id);
        }
    }
    outcome.height = height + outcome.absorbed;

    if outcome.height >= clear_threshold {
        outcome.pending_clear = outcome.height;
    }

    if let Some(stack) = registry.stack_mut(survivor) {
        stack.height = outcome.height;
        stack.pending_clear = outcome.pending_clear;
    }

    if outcome.did_merge() {
        tracing::debug!(
            stack = survivor.0,
            merged = outcome.merged.len(),
            height = outcome.height,
            pending_clear = outcome.pending_clear,
            "merged same-color neighbors"
        );
    }

    outcome
}
