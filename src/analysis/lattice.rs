//! Lattice traits for abstract domains.
//!
//! Every abstract domain in this crate — the signed integer domain, the
//! constant value union, per-point environments, and the liveness
//! register sets — implements one or both of these traits so that
//! fixpoint iteration can combine states at control-flow merge and split
//! points uniformly.
//!
//! # Conventions
//!
//! - **Top (⊤)**: no information; the register may hold anything.
//! - **Bottom (⊥)**: contradiction; the program point is unreachable.
//! - **Meet (∧)**: greatest lower bound — refines information, used when
//!   an edge predicate constrains a value.
//! - **Join (∨)**: least upper bound — widens information, used when
//!   several paths merge and must all be covered.
//!
//! The forward constant analysis joins at merge points (soundly widening
//! toward top); the backward liveness analysis unions at split points.

/// A meet semi-lattice with a meet (greatest lower bound) operation.
///
/// The meet must be idempotent, commutative, and associative.
pub trait MeetSemiLattice: Clone + PartialEq {
    /// Computes the greatest lower bound of two elements.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;

    /// Returns `true` if this is the bottom element.
    ///
    /// Once bottom is reached, further meets cannot change the value.
    fn is_bottom(&self) -> bool;
}

/// A join semi-lattice with a join (least upper bound) operation.
///
/// The join must be idempotent, commutative, and associative.
pub trait JoinSemiLattice: Clone + PartialEq {
    /// Computes the least upper bound of two elements.
    #[must_use]
    fn join(&self, other: &Self) -> Self;

    /// Returns `true` if this is the top element.
    ///
    /// Top is the identity for meet: `x.meet(top) = x`.
    fn is_top(&self) -> bool;
}
