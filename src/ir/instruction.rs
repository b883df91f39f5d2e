//! The instruction value type.
//!
//! An [`Instruction`] is a plain value: an opcode, source registers, an
//! optional destination register, an optional integer literal, and an
//! optional [`SymbolRef`] payload. Once an instruction has been handed to
//! a [`ControlFlowGraph`](crate::cfg::ControlFlowGraph) it is only mutable
//! through the graph's staged-edit protocol; nothing in this module
//! exposes in-place mutation.

use std::fmt;

use crate::ir::{FieldRef, MethodRef, Opcode, StrRef, SymbolRef, TypeRef};

/// A virtual register.
///
/// Registers are method-local and densely numbered from zero. The
/// distinguished [`Reg::RESULT`] pseudo-register holds the value produced
/// by the most recent result-carrying instruction until a
/// `move-result`-family instruction binds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(u32);

impl Reg {
    /// The result pseudo-register.
    pub const RESULT: Self = Self(u32::MAX);

    /// Creates a register with the given number.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the register number.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns `true` if this is the result pseudo-register.
    #[must_use]
    pub const fn is_result(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_result() {
            f.write_str("vRES")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

/// A single bytecode instruction.
///
/// Constructed with [`Instruction::new`] and the `with_*` builder methods:
///
/// ```rust
/// use dexopt::ir::{Instruction, Opcode, Reg};
///
/// let insn = Instruction::new(Opcode::Const)
///     .with_dest(Reg::new(0))
///     .with_literal(42);
/// assert_eq!(insn.literal(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: Opcode,
    srcs: Vec<Reg>,
    dest: Option<Reg>,
    literal: Option<i64>,
    reference: Option<SymbolRef>,
}

impl Instruction {
    /// Creates an instruction with no operands.
    #[must_use]
    pub const fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            srcs: Vec::new(),
            dest: None,
            literal: None,
            reference: None,
        }
    }

    /// Sets the source register list.
    #[must_use]
    pub fn with_srcs(mut self, srcs: Vec<Reg>) -> Self {
        self.srcs = srcs;
        self
    }

    /// Appends a single source register.
    #[must_use]
    pub fn with_src(mut self, src: Reg) -> Self {
        self.srcs.push(src);
        self
    }

    /// Sets the destination register.
    #[must_use]
    pub fn with_dest(mut self, dest: Reg) -> Self {
        self.dest = Some(dest);
        self
    }

    /// Sets the integer literal.
    #[must_use]
    pub fn with_literal(mut self, literal: i64) -> Self {
        self.literal = Some(literal);
        self
    }

    /// Sets a string-constant payload.
    #[must_use]
    pub fn with_string(mut self, value: StrRef) -> Self {
        self.reference = Some(SymbolRef::Str(value));
        self
    }

    /// Sets a type-reference payload.
    #[must_use]
    pub fn with_type(mut self, value: TypeRef) -> Self {
        self.reference = Some(SymbolRef::Type(value));
        self
    }

    /// Sets a field-reference payload.
    #[must_use]
    pub fn with_field(mut self, value: FieldRef) -> Self {
        self.reference = Some(SymbolRef::Field(value));
        self
    }

    /// Sets a method-reference payload.
    #[must_use]
    pub fn with_method(mut self, value: MethodRef) -> Self {
        self.reference = Some(SymbolRef::Method(value));
        self
    }

    /// Returns the opcode.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Returns the source registers.
    #[must_use]
    pub fn srcs(&self) -> &[Reg] {
        &self.srcs
    }

    /// Returns the source register at the given position, if present.
    #[must_use]
    pub fn src(&self, index: usize) -> Option<Reg> {
        self.srcs.get(index).copied()
    }

    /// Returns the destination register, if any.
    #[must_use]
    pub const fn dest(&self) -> Option<Reg> {
        self.dest
    }

    /// Returns the integer literal, if any.
    #[must_use]
    pub const fn literal(&self) -> Option<i64> {
        self.literal
    }

    /// Returns the symbol payload, if any.
    #[must_use]
    pub const fn reference(&self) -> Option<&SymbolRef> {
        self.reference.as_ref()
    }

    /// Returns the string payload, if this instruction carries one.
    #[must_use]
    pub fn string_ref(&self) -> Option<&StrRef> {
        match &self.reference {
            Some(SymbolRef::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the type payload, if this instruction carries one.
    #[must_use]
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match &self.reference {
            Some(SymbolRef::Type(t)) => Some(t),
            _ => None,
        }
    }

    /// Returns the field payload, if this instruction carries one.
    #[must_use]
    pub fn field_ref(&self) -> Option<&FieldRef> {
        match &self.reference {
            Some(SymbolRef::Field(f)) => Some(f),
            _ => None,
        }
    }

    /// Returns the method payload, if this instruction carries one.
    #[must_use]
    pub fn method_ref(&self) -> Option<&MethodRef> {
        match &self.reference {
            Some(SymbolRef::Method(m)) => Some(m),
            _ => None,
        }
    }

    /// Returns the register this instruction is guaranteed to dereference,
    /// if it has one. See [`Opcode::dereferenced_src`].
    #[must_use]
    pub fn dereferenced_reg(&self) -> Option<Reg> {
        self.opcode
            .dereferenced_src()
            .and_then(|idx| self.src(idx))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        if let Some(dest) = self.dest {
            write!(f, " {dest}")?;
        }
        for src in &self.srcs {
            write!(f, " {src}")?;
        }
        if let Some(lit) = self.literal {
            write!(f, " #{lit}")?;
        }
        if let Some(r) = &self.reference {
            write!(f, " {r}")?;
        }
        Ok(())
    }
}
