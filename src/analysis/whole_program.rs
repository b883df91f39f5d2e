//! The read-only whole-program value summary.
//!
//! A prior, separately-synchronized aggregation phase (outside this crate)
//! walks every method of the program and records:
//!
//! - for each field, the single constant value it holds **if and only if**
//!   every store anywhere in the program agrees on that value;
//! - for each side-effect-free method, the single constant it returns
//!   **if and only if** every return site agrees.
//!
//! Partial knowledge is never recorded: absence from the summary means
//! "unknown", and the rewrite engine treats it as top. During rewriting
//! the summary is shared immutably across any number of per-method engine
//! instances.

use std::collections::HashMap;

use crate::{
    analysis::AbstractValue,
    ir::{FieldRef, MethodRef},
};

/// Immutable whole-program constant summary.
#[derive(Debug, Clone, Default)]
pub struct WholeProgramState {
    field_values: HashMap<FieldRef, AbstractValue>,
    method_returns: HashMap<MethodRef, AbstractValue>,
}

impl WholeProgramState {
    /// Creates an empty summary (everything unknown).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the program-wide constant value of a field.
    ///
    /// Only the aggregation phase should call this; the value must be the
    /// one every store in the program writes.
    pub fn record_field(&mut self, field: FieldRef, value: AbstractValue) {
        self.field_values.insert(field, value);
    }

    /// Records the constant return value of a proven-pure method.
    pub fn record_method_return(&mut self, method: MethodRef, value: AbstractValue) {
        self.method_returns.insert(method, value);
    }

    /// Returns the program-wide constant value of a field, if every store
    /// agrees on one.
    #[must_use]
    pub fn field_value(&self, field: &FieldRef) -> Option<&AbstractValue> {
        self.field_values.get(field)
    }

    /// Returns the constant return value of a method, if the method is
    /// proven pure and single-valued.
    #[must_use]
    pub fn pure_method_return(&self, method: &MethodRef) -> Option<&AbstractValue> {
        self.method_returns.get(method)
    }
}
