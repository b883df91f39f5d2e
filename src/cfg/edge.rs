//! Typed control-flow edges.
//!
//! Every edge carries the semantics of the transfer it represents; the
//! graph has no untyped edges. Unconditional flow — including the
//! fall-through out of a block with no terminator and the default case of
//! a switch — is a [`EdgeKind::Goto`] edge. Blocks therefore never
//! contain an explicit jump instruction: removing a conditional or switch
//! terminator and leaving a single goto edge *is* the rewrite to an
//! unconditional jump.

use std::fmt;

use crate::cfg::BlockId;

/// The kind of control transfer an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Unconditional transfer: fall-through, jump, or switch default.
    Goto,
    /// Taken when the conditional terminator's predicate holds.
    BranchTrue,
    /// Taken when the conditional terminator's predicate does not hold.
    BranchFalse,
    /// A switch case, keyed by the selector value that takes it.
    Case(i32),
    /// Transfer to an exception handler.
    Throw,
}

impl EdgeKind {
    /// Returns `true` for the two conditional-branch edge kinds.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self, Self::BranchTrue | Self::BranchFalse)
    }

    /// Returns `true` for switch-case edges.
    #[must_use]
    pub const fn is_case(self) -> bool {
        matches!(self, Self::Case(_))
    }

    /// Returns the case key for a switch-case edge.
    #[must_use]
    pub const fn case_key(self) -> Option<i32> {
        match self {
            Self::Case(k) => Some(k),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Goto => f.write_str("goto"),
            Self::BranchTrue => f.write_str("branch-true"),
            Self::BranchFalse => f.write_str("branch-false"),
            Self::Case(k) => write!(f, "case {k}"),
            Self::Throw => f.write_str("throw"),
        }
    }
}

/// An edge between two blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    src: BlockId,
    target: BlockId,
    kind: EdgeKind,
}

impl Edge {
    pub(crate) const fn new(src: BlockId, target: BlockId, kind: EdgeKind) -> Self {
        Self { src, target, kind }
    }

    /// Returns the source block.
    #[must_use]
    pub const fn src(&self) -> BlockId {
        self.src
    }

    /// Returns the target block.
    #[must_use]
    pub const fn target(&self) -> BlockId {
        self.target
    }

    /// Returns the edge kind.
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub(crate) fn set_target(&mut self, target: BlockId) {
        self.target = target;
    }

    pub(crate) fn set_kind(&mut self, kind: EdgeKind) {
        self.kind = kind;
    }
}
