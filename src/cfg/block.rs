//! Basic blocks.
//!
//! A block is an ordered sequence of instruction handles plus the edge
//! handles entering and leaving it. Blocks are identified by their
//! position in the graph arena; a purged block's handle is never reused.

use crate::cfg::{EdgeId, InsnId};

/// A basic block: ordered instructions and incident edges.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    insns: Vec<InsnId>,
    preds: Vec<EdgeId>,
    succs: Vec<EdgeId>,
}

impl BasicBlock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the instruction handles in block order.
    #[must_use]
    pub fn instructions(&self) -> &[InsnId] {
        &self.insns
    }

    /// Returns the handles of edges entering this block.
    #[must_use]
    pub fn preds(&self) -> &[EdgeId] {
        &self.preds
    }

    /// Returns the handles of edges leaving this block.
    #[must_use]
    pub fn succs(&self) -> &[EdgeId] {
        &self.succs
    }

    /// Returns the number of instructions in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.insns.len()
    }

    /// Returns `true` if the block holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    /// Returns the handle of the last instruction, if any.
    #[must_use]
    pub fn last_instruction(&self) -> Option<InsnId> {
        self.insns.last().copied()
    }

    pub(crate) fn insns_mut(&mut self) -> &mut Vec<InsnId> {
        &mut self.insns
    }

    pub(crate) fn preds_mut(&mut self) -> &mut Vec<EdgeId> {
        &mut self.preds
    }

    pub(crate) fn succs_mut(&mut self) -> &mut Vec<EdgeId> {
        &mut self.succs
    }
}
