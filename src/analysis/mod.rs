//! Abstract interpretation over the control-flow graph.
//!
//! The analysis stack feeding the rewrite engine:
//!
//! - lattice traits — how abstract values combine at merge and split
//!   points
//! - the constant domain — [`SignedDomain`], [`AbstractValue`],
//!   [`ConstantEnvironment`]
//! - [`WholeProgramState`] — the read-only cross-method summary
//! - [`AnalysisContext`] — instruction and branch replay semantics
//! - [`ConstantAnalysis`] — the intraprocedural forward fixpoint
//! - [`LivenessAnalysis`] — backward register liveness, the forwarding
//!   guard
//!
//! The engine consumes these through a narrow interface: per-block entry
//! environments, forward replay within a block, and per-edge refinement.

mod domain;
mod fixpoint;
mod interp;
mod lattice;
mod liveness;
mod whole_program;

pub use domain::{AbstractValue, ConstantEnvironment, Interval, SignedDomain};
pub use fixpoint::ConstantAnalysis;
pub use interp::AnalysisContext;
pub use lattice::{JoinSemiLattice, MeetSemiLattice};
pub use liveness::{LivenessAnalysis, RegSet};
pub use whole_program::WholeProgramState;
