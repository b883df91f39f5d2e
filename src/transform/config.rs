//! Configuration for the rewrite engine.
//!
//! One immutable value constructed per engine instance and passed by
//! value; there is no ambient or global configuration state. Every toggle
//! is independent, and the defaults match the production pipeline:
//! in-body move materialization, dead-switch removal, and parameter
//! materialization on, call-result materialization opt-in.

use std::collections::HashSet;

use crate::ir::{MethodRef, TypeRef};

/// Immutable per-engine configuration.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Replace register moves whose value is a known constant.
    pub replace_moves_with_consts: bool,

    /// Replace call-result bindings whose value is a known constant.
    ///
    /// Off by default: deleting the producing call is only sound when the
    /// call is known side-effect-free, which the caller asserts by
    /// enabling this (or, per method, via
    /// [`getter_methods_for_immutable_fields`](Self::getter_methods_for_immutable_fields)).
    pub replace_move_result_with_consts: bool,

    /// Rewrite switches with a provably constant selector into
    /// unconditional jumps.
    pub remove_dead_switch: bool,

    /// Materialize constants for parameters proven constant on entry.
    pub add_param_const: bool,

    /// The type whose static initializer is being optimized, if any.
    ///
    /// Suppresses whole-program assumptions about that type's fields:
    /// mid-`<clinit>` they do not yet hold their final values, and the
    /// stores establishing them must not be treated as redundant.
    pub class_under_init: Option<TypeRef>,

    /// Methods known to be pure getters of immutable state; their results
    /// may be materialized even when
    /// [`replace_move_result_with_consts`](Self::replace_move_result_with_consts)
    /// is off.
    pub getter_methods_for_immutable_fields: HashSet<MethodRef>,

    /// Additional null-assertion helpers recognized beyond the built-in
    /// platform set.
    pub extra_null_check_methods: HashSet<MethodRef>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            replace_moves_with_consts: true,
            replace_move_result_with_consts: false,
            remove_dead_switch: true,
            add_param_const: true,
            class_under_init: None,
            getter_methods_for_immutable_fields: HashSet::new(),
            extra_null_check_methods: HashSet::new(),
        }
    }
}

impl TransformConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
