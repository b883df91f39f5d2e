//! Symbol references carried by instructions.
//!
//! Types, fields, methods, and string constants are identified by
//! descriptor-based reference values. References are cheap to clone (the
//! backing text is shared) and compare by content, so they can serve as
//! map keys in the whole-program summary and in configuration sets.
//!
//! Type descriptors follow the usual conventions: `I`, `J`, `Z`, ... for
//! primitives, `V` for void, `Lpkg/Name;` for class types, and a leading
//! `[` for arrays.

use std::fmt;
use std::sync::Arc;

/// An interned string constant.
///
/// Used both for `const-string` payloads and for member names inside
/// [`FieldRef`] / [`MethodRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrRef(Arc<str>);

impl StrRef {
    /// Creates a reference to the given string content.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(Arc::from(value))
    }

    /// Returns the string content.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl From<&str> for StrRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A reference to a type, identified by its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    /// Creates a type reference from a descriptor string.
    #[must_use]
    pub fn new(descriptor: &str) -> Self {
        Self(Arc::from(descriptor))
    }

    /// Returns the descriptor string.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the void descriptor `V`.
    #[must_use]
    pub fn is_void(&self) -> bool {
        &*self.0 == "V"
    }

    /// Returns `true` for primitive descriptors (including void).
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !self.is_reference()
    }

    /// Returns `true` for class and array descriptors, the ones whose
    /// materialization is subject to cross-module legality checks.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.0.starts_with('L') || self.0.starts_with('[')
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(descriptor: &str) -> Self {
        Self::new(descriptor)
    }
}

/// A reference to a field: owning type, name, and field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    owner: TypeRef,
    name: StrRef,
    field_type: TypeRef,
}

impl FieldRef {
    /// Creates a field reference.
    #[must_use]
    pub fn new(owner: TypeRef, name: &str, field_type: TypeRef) -> Self {
        Self {
            owner,
            name: StrRef::new(name),
            field_type,
        }
    }

    /// Returns the type declaring this field.
    #[must_use]
    pub const fn owner(&self) -> &TypeRef {
        &self.owner
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the declared type of the field.
    #[must_use]
    pub const fn field_type(&self) -> &TypeRef {
        &self.field_type
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.owner, self.name.as_str(), self.field_type)
    }
}

/// A method prototype: return type plus parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proto {
    return_type: TypeRef,
    params: Vec<TypeRef>,
}

impl Proto {
    /// Creates a prototype from a return type and parameter list.
    #[must_use]
    pub fn new(return_type: TypeRef, params: Vec<TypeRef>) -> Self {
        Self {
            return_type,
            params,
        }
    }

    /// Creates the `()V` prototype.
    #[must_use]
    pub fn void() -> Self {
        Self::new(TypeRef::new("V"), Vec::new())
    }

    /// Returns the return type.
    #[must_use]
    pub const fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// Returns the parameter types.
    #[must_use]
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for p in &self.params {
            write!(f, "{p}")?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// A reference to a method: owning type, name, and prototype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    owner: TypeRef,
    name: StrRef,
    proto: Proto,
}

impl MethodRef {
    /// Creates a method reference.
    #[must_use]
    pub fn new(owner: TypeRef, name: &str, proto: Proto) -> Self {
        Self {
            owner,
            name: StrRef::new(name),
            proto,
        }
    }

    /// Returns the type declaring this method.
    #[must_use]
    pub const fn owner(&self) -> &TypeRef {
        &self.owner
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
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}{}", self.owner, self.name.as_str(), self.proto)
    }
}

/// The symbol payload of an instruction, when it has one.
///
/// Exactly one of these shapes is legal for a given opcode: string loads
/// carry [`SymbolRef::Str`], class loads and allocations carry
/// [`SymbolRef::Type`], field accesses [`SymbolRef::Field`], and calls
/// [`SymbolRef::Method`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolRef {
    /// A string constant.
    Str(StrRef),
    /// A type reference.
    Type(TypeRef),
    /// A field reference.
    Field(FieldRef),
    /// A method reference.
    Method(MethodRef),
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Type(t) => write!(f, "{t}"),
            Self::Field(fr) => write!(f, "{fr}"),
            Self::Method(m) => write!(f, "{m}"),
        }
    }
}
