//! Counters reported by the rewrite engine.
//!
//! Pure bookkeeping: counters never influence decisions. Consumers add
//! the per-method records together for build-time reporting.

use std::ops::{Add, AddAssign};

/// Counters of the edits one or more `apply` calls performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Dead conditional-branch and switch-case edges deleted.
    pub branches_removed: usize,
    /// Edges redirected past a skippable block.
    pub branches_forwarded: usize,
    /// Instructions replaced by materialized constant sequences.
    pub materialized_consts: usize,
    /// Parameter registers given a materialized constant at entry.
    pub added_param_consts: usize,
    /// Blocks truncated into null-pointer-exception throws.
    pub throws: usize,
    /// Null-guard pseudo-instructions removed.
    pub null_checks: usize,
    /// Null-assertion helper calls removed.
    pub null_check_method_calls: usize,
    /// Instructions removed by purging unreachable blocks.
    pub unreachable_instructions_removed: usize,
}

impl TransformStats {
    /// Returns `true` if no edit was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.branches_removed == 0
            && self.branches_forwarded == 0
            && self.materialized_consts == 0
            && self.added_param_consts == 0
            && self.throws == 0
            && self.null_checks == 0
            && self.null_check_method_calls == 0
            && self.unreachable_instructions_removed == 0
    }
}

impl AddAssign for TransformStats {
    fn add_assign(&mut self, rhs: Self) {
        self.branches_removed += rhs.branches_removed;
        self.branches_forwarded += rhs.branches_forwarded;
        self.materialized_consts += rhs.materialized_consts;
        self.added_param_consts += rhs.added_param_consts;
        self.throws += rhs.throws;
        self.null_checks += rhs.null_checks;
        self.null_check_method_calls += rhs.null_check_method_calls;
        self.unreachable_instructions_removed += rhs.unreachable_instructions_removed;
    }
}

impl Add for TransformStats {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}
