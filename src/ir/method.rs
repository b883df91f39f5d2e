//! Per-method context consumed by the rewrite engine.
//!
//! The engine never resolves methods itself; the caller describes the
//! method being optimized — its declaring type, prototype, and access
//! flags — and the engine uses that for the cross-module return-type guard
//! and for parameter bookkeeping.

use bitflags::bitflags;

use crate::ir::{Proto, StrRef, TypeRef};

bitflags! {
    /// Method access flags, matching the DEX `access_flags` encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAccess: u32 {
        /// Visible everywhere.
        const PUBLIC = 0x0001;
        /// Visible only to the declaring class.
        const PRIVATE = 0x0002;
        /// Visible to subclasses and package.
        const PROTECTED = 0x0004;
        /// No receiver; parameters start at the first declared parameter.
        const STATIC = 0x0008;
        /// Not overridable.
        const FINAL = 0x0010;
        /// Synchronized on entry.
        const SYNCHRONIZED = 0x0020;
        /// Implemented natively.
        const NATIVE = 0x0100;
        /// No implementation.
        const ABSTRACT = 0x0400;
        /// Compiler-generated.
        const SYNTHETIC = 0x1000;
        /// An instance or static initializer.
        const CONSTRUCTOR = 0x1_0000;
    }
}

/// Identity and shape of the method whose control-flow graph is being
/// rewritten.
#[derive(Debug, Clone)]
pub struct MethodContext {
    declaring_type: TypeRef,
    name: StrRef,
    proto: Proto,
    access: MethodAccess,
}

impl MethodContext {
    /// Creates a method context.
    #[must_use]
    pub fn new(declaring_type: TypeRef, name: &str, proto: Proto, access: MethodAccess) -> Self {
        Self {
            declaring_type,
            name: StrRef::new(name),
            proto,
            access,
        }
    }

    /// Returns the type declaring this method.
    #[must_use]
    pub const fn declaring_type(&self) -> &TypeRef {
        &self.declaring_type
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the prototype.
    #[must_use]
    pub const fn proto(&self) -> &Proto {
        &self.proto
    }

    /// Returns the access flags.
    #[must_use]
    pub const fn access(&self) -> MethodAccess {
        self.access
    }

    /// Returns `true` if the method has no receiver.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.access.contains(MethodAccess::STATIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_flag() {
        let m = MethodContext::new(
            TypeRef::new("La/B;"),
            "f",
            Proto::void(),
            MethodAccess::PUBLIC | MethodAccess::STATIC,
        );
        assert!(m.is_static());
        assert_eq!(m.name(), "f");

        let n = MethodContext::new(TypeRef::new("La/B;"), "g", Proto::void(), MethodAccess::PUBLIC);
        assert!(!n.is_static());
    }
}
