//! Per-frame command buffer between the input source and the engine.

use arrayvec::ArrayVec;

use crate::types::GameCommand;

/// Commands buffered per frame. Key repeat rarely produces more than a handful.
pub const QUEUE_CAPACITY: usize = 32;

/// FIFO of pending commands, drained into the engine once per frame.
///
/// Fixed capacity; commands pushed while full are dropped.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: ArrayVec<GameCommand, QUEUE_CAPACITY>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a command. Returns false when the queue is full.
    pub fn push(&mut self, command: GameCommand) -> bool {
        self.pending.try_push(command).is_ok()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove all pending commands in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = GameCommand> + '_ {
        self.pending.drain(..)
    }
}
