use thiserror::Error;

use crate::cfg::{BlockId, EdgeId, InsnId};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The rewrite engine itself is infallible by design: every decision function reports
/// "applicable / not applicable" and a missed opportunity is never an error. Failures can only
/// occur at the graph-construction boundary, when client code hands the control-flow graph a
/// handle that does not belong to it.
///
/// # Examples
///
/// ```rust
/// use dexopt::{cfg::{ControlFlowGraph, EdgeKind, BlockId}, Error};
///
/// let mut cfg = ControlFlowGraph::new(1);
/// let bogus = BlockId::new(99);
/// match cfg.add_edge(cfg.entry(), bogus, EdgeKind::Goto) {
///     Err(Error::InvalidBlock(id)) => assert_eq!(id, bogus),
///     other => panic!("expected InvalidBlock, got {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A block handle does not refer to a live block of this graph.
    ///
    /// Returned by edge insertion and block-level mutation primitives when
    /// the referenced block was never allocated or has been purged.
    #[error("Block handle does not belong to this graph - {0}")]
    InvalidBlock(BlockId),

    /// An instruction handle does not refer to a live instruction of this graph.
    ///
    /// Instruction slots are never reused within one graph, so this either
    /// means the handle came from a different graph or the instruction has
    /// already been deleted by a committed edit.
    #[error("Instruction handle does not belong to this graph - {0}")]
    InvalidInstruction(InsnId),

    /// An edge handle does not refer to a live edge of this graph.
    #[error("Edge handle does not belong to this graph - {0}")]
    InvalidEdge(EdgeId),

    /// An instruction position is past the end of the block it points into.
    ///
    /// Positions are (block, index) pairs; the index must be at most the
    /// current instruction count of the block.
    #[error("Position {1} is out of bounds for block {0}")]
    InvalidPosition(BlockId, usize),
}
