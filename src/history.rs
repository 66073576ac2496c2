//! Single-slot undo history.
//!
//! One snapshot, not a stack. Undo swaps the live buffer with the snapshot,
//! so undoing twice returns to the edited state (undo doubles as redo).

use crate::imaging::PixelBuffer;

#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    previous: Option<PixelBuffer>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-copy `live` into the slot, replacing any earlier snapshot.
    pub fn save(&mut self, live: &PixelBuffer) {
        match &mut self.previous {
            Some(slot) => slot.copy_from(live),
            None => self.previous = Some(live.clone()),
        }
    }

    /// Swap `live` with the snapshot. Returns `false` when there is none.
    pub fn undo(&mut self, live: &mut PixelBuffer) -> bool {
        match &mut self.previous {
            Some(slot) => {
                std::mem::swap(slot, live);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.previous.is_some()
    }
}
