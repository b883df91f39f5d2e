//! Cross-module reference legality.
//!
//! Deployment splits a program into modules: a root module that every
//! module may reference, and feature modules that may only be referenced
//! from within themselves. Materializing a class-object constant emits a
//! type reference into the rewritten method, so the engine must prove the
//! reference legal before doing it; a type that is external to the
//! analysis or lives in a foreign feature module suppresses the rewrite.

use std::collections::HashMap;

use crate::ir::TypeRef;

/// Identifier of a deployment module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    /// The root module, referenceable from everywhere.
    pub const ROOT: Self = Self(0);

    /// Creates a module identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// The cross-module visibility oracle.
///
/// Records which module each analyzed type belongs to. Types never
/// assigned are *unavailable* (external, not under analysis) and may not
/// be referenced; primitives are always legal.
#[derive(Debug, Clone, Default)]
pub struct CrossModuleRefs {
    assignments: HashMap<TypeRef, ModuleId>,
}

impl CrossModuleRefs {
    /// Creates an empty oracle (every class type unavailable).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a type to a module.
    pub fn assign(&mut self, ty: TypeRef, module: ModuleId) {
        self.assignments.insert(ty, module);
    }

    /// Returns the module a type belongs to, or `None` for unavailable
    /// types.
    #[must_use]
    pub fn module_of(&self, ty: &TypeRef) -> Option<ModuleId> {
        self.assignments.get(ty).copied()
    }

    /// Returns `true` if the type is under analysis at all.
    #[must_use]
    pub fn is_available(&self, ty: &TypeRef) -> bool {
        self.assignments.contains_key(ty)
    }

    /// Returns `true` if code in `from_module` may legally reference
    /// `to`.
    ///
    /// Primitives are always legal; class types must be available and
    /// either in the root module or in the referencing module itself.
    #[must_use]
    pub fn is_reference_legal(&self, from_module: ModuleId, to: &TypeRef) -> bool {
        if to.is_primitive() {
            return true;
        }
        match self.module_of(to) {
            Some(ModuleId::ROOT) => true,
            Some(module) => module == from_module,
            None => false,
        }
    }

    /// Returns `true` if a reference from the declaring type's module to
    /// `to` would be illegal.
    ///
    /// Convenience form of [`is_reference_legal`](Self::is_reference_legal)
    /// keyed by the referencing type; a referencing type that is itself
    /// unavailable makes every reference illegal.
    #[must_use]
    pub fn illegal_ref(&self, from: &TypeRef, to: &TypeRef) -> bool {
        match self.module_of(from) {
            Some(module) => !self.is_reference_legal(module, to),
            None => true,
        }
    }
}
