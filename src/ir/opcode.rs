//! Opcode taxonomy for the register-based instruction set.
//!
//! The set is deliberately limited to the shapes the optimizer reasons
//! about: constant loads, register moves, result bindings, field accesses,
//! conditional branches, switches, calls, throws, and the integer
//! arithmetic the abstract interpreter folds. Instruction encoding and
//! decoding live outside this crate; an opcode here is a semantic tag, not
//! a wire format.
//!
//! # Result-carrying instructions
//!
//! Instructions that produce a value but may throw (calls, field loads,
//! allocations, string/class constant pool loads) do not carry a
//! destination register themselves. They write the distinguished result
//! pseudo-register, and the value is bound by a following
//! `move-result`-family instruction. [`Opcode::writes_result_register`]
//! identifies the producers, [`Opcode::is_result_binding`] the consumers.

use strum::{Display, IntoStaticStr};

/// Semantic tag of an [`Instruction`](crate::ir::Instruction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[allow(missing_docs)]
pub enum Opcode {
    #[strum(serialize = "nop")]
    Nop,

    // Parameter loads; these form the prefix of the entry block.
    #[strum(serialize = "load-param")]
    LoadParam,
    #[strum(serialize = "load-param-wide")]
    LoadParamWide,
    #[strum(serialize = "load-param-object")]
    LoadParamObject,

    // Constant loads. `const` and `const-wide` write their destination
    // directly; string and class loads go through the result register.
    #[strum(serialize = "const")]
    Const,
    #[strum(serialize = "const-wide")]
    ConstWide,
    #[strum(serialize = "const-string")]
    ConstString,
    #[strum(serialize = "const-class")]
    ConstClass,

    // Register moves.
    #[strum(serialize = "move")]
    Move,
    #[strum(serialize = "move-wide")]
    MoveWide,
    #[strum(serialize = "move-object")]
    MoveObject,

    // Result bindings after a call.
    #[strum(serialize = "move-result")]
    MoveResult,
    #[strum(serialize = "move-result-wide")]
    MoveResultWide,
    #[strum(serialize = "move-result-object")]
    MoveResultObject,

    // Result bindings after a non-call producer (constant pool loads,
    // allocations, field loads, throwing arithmetic).
    #[strum(serialize = "move-result-pseudo")]
    MoveResultPseudo,
    #[strum(serialize = "move-result-pseudo-object")]
    MoveResultPseudoObject,

    // Returns and throw.
    #[strum(serialize = "return")]
    Return,
    #[strum(serialize = "return-object")]
    ReturnObject,
    #[strum(serialize = "return-void")]
    ReturnVoid,
    #[strum(serialize = "throw")]
    Throw,

    // Multi-way branch; case keys live on the outgoing edges.
    #[strum(serialize = "switch")]
    Switch,

    // Two-register conditionals.
    #[strum(serialize = "if-eq")]
    IfEq,
    #[strum(serialize = "if-ne")]
    IfNe,
    #[strum(serialize = "if-lt")]
    IfLt,
    #[strum(serialize = "if-ge")]
    IfGe,
    #[strum(serialize = "if-gt")]
    IfGt,
    #[strum(serialize = "if-le")]
    IfLe,

    // Compare-with-zero conditionals.
    #[strum(serialize = "if-eqz")]
    IfEqz,
    #[strum(serialize = "if-nez")]
    IfNez,
    #[strum(serialize = "if-ltz")]
    IfLtz,
    #[strum(serialize = "if-gez")]
    IfGez,
    #[strum(serialize = "if-gtz")]
    IfGtz,
    #[strum(serialize = "if-lez")]
    IfLez,

    // 32-bit integer arithmetic, two-register forms. Division and
    // remainder may throw and therefore bind through the result register.
    #[strum(serialize = "add-int")]
    AddInt,
    #[strum(serialize = "sub-int")]
    SubInt,
    #[strum(serialize = "mul-int")]
    MulInt,
    #[strum(serialize = "div-int")]
    DivInt,
    #[strum(serialize = "rem-int")]
    RemInt,
    #[strum(serialize = "and-int")]
    AndInt,
    #[strum(serialize = "or-int")]
    OrInt,
    #[strum(serialize = "xor-int")]
    XorInt,
    #[strum(serialize = "shl-int")]
    ShlInt,
    #[strum(serialize = "shr-int")]
    ShrInt,
    #[strum(serialize = "ushr-int")]
    UshrInt,

    // Register/literal forms.
    #[strum(serialize = "add-int/lit")]
    AddIntLit,
    #[strum(serialize = "rsub-int/lit")]
    RsubIntLit,
    #[strum(serialize = "mul-int/lit")]
    MulIntLit,
    #[strum(serialize = "div-int/lit")]
    DivIntLit,
    #[strum(serialize = "rem-int/lit")]
    RemIntLit,
    #[strum(serialize = "and-int/lit")]
    AndIntLit,
    #[strum(serialize = "or-int/lit")]
    OrIntLit,
    #[strum(serialize = "xor-int/lit")]
    XorIntLit,
    #[strum(serialize = "shl-int/lit")]
    ShlIntLit,
    #[strum(serialize = "shr-int/lit")]
    ShrIntLit,
    #[strum(serialize = "ushr-int/lit")]
    UshrIntLit,

    // Instance field accesses; the object register is src 0 for gets and
    // src 1 for puts (src 0 is the stored value).
    #[strum(serialize = "iget")]
    Iget,
    #[strum(serialize = "iget-object")]
    IgetObject,
    #[strum(serialize = "iput")]
    Iput,
    #[strum(serialize = "iput-object")]
    IputObject,

    // Static field accesses.
    #[strum(serialize = "sget")]
    Sget,
    #[strum(serialize = "sget-object")]
    SgetObject,
    #[strum(serialize = "sput")]
    Sput,
    #[strum(serialize = "sput-object")]
    SputObject,

    // Calls; arguments are the source registers, the receiver (if any)
    // is src 0.
    #[strum(serialize = "invoke-static")]
    InvokeStatic,
    #[strum(serialize = "invoke-virtual")]
    InvokeVirtual,
    #[strum(serialize = "invoke-direct")]
    InvokeDirect,
    #[strum(serialize = "invoke-interface")]
    InvokeInterface,

    // Object and array operations.
    #[strum(serialize = "new-instance")]
    NewInstance,
    #[strum(serialize = "instance-of")]
    InstanceOf,
    #[strum(serialize = "array-length")]
    ArrayLength,
    #[strum(serialize = "aget")]
    Aget,
    #[strum(serialize = "aput")]
    Aput,
    #[strum(serialize = "monitor-enter")]
    MonitorEnter,

    // Internal null-guard pseudo-instruction: asserts src 0 is non-null,
    // raising a NullPointerException otherwise. Inserted by earlier
    // pipeline stages, recognized and eliminated here.
    #[strum(serialize = "null-check")]
    NullCheck,
}

impl Opcode {
    /// Returns `true` for the parameter-load prefix instructions.
    #[must_use]
    pub const fn is_load_param(self) -> bool {
        matches!(
            self,
            Self::LoadParam | Self::LoadParamWide | Self::LoadParamObject
        )
    }

    /// Returns `true` for constant loads of any shape (integer, wide,
    /// string, class).
    #[must_use]
    pub const fn is_const_load(self) -> bool {
        matches!(
            self,
            Self::Const | Self::ConstWide | Self::ConstString | Self::ConstClass
        )
    }

    /// Returns `true` for register-to-register moves.
    #[must_use]
    pub const fn is_move(self) -> bool {
        matches!(self, Self::Move | Self::MoveWide | Self::MoveObject)
    }

    /// Returns `true` for call-result bindings (`move-result` family).
    #[must_use]
    pub const fn is_move_result(self) -> bool {
        matches!(
            self,
            Self::MoveResult | Self::MoveResultWide | Self::MoveResultObject
        )
    }

    /// Returns `true` for result-binding pseudo-instructions following a
    /// non-call producer.
    #[must_use]
    pub const fn is_move_result_pseudo(self) -> bool {
        matches!(self, Self::MoveResultPseudo | Self::MoveResultPseudoObject)
    }

    /// Returns `true` for any result binding, call or pseudo.
    #[must_use]
    pub const fn is_result_binding(self) -> bool {
        self.is_move_result() || self.is_move_result_pseudo()
    }

    /// Returns `true` if this instruction writes the result
    /// pseudo-register instead of a destination register.
    #[must_use]
    pub const fn writes_result_register(self) -> bool {
        matches!(
            self,
            Self::ConstString
                | Self::ConstClass
                | Self::NewInstance
                | Self::InstanceOf
                | Self::ArrayLength
                | Self::Aget
                | Self::Iget
                | Self::IgetObject
                | Self::Sget
                | Self::SgetObject
                | Self::InvokeStatic
                | Self::InvokeVirtual
                | Self::InvokeDirect
                | Self::InvokeInterface
                | Self::DivInt
                | Self::RemInt
                | Self::DivIntLit
                | Self::RemIntLit
        )
    }

    /// Returns `true` for the twelve two-way conditional branches.
    #[must_use]
    pub const fn is_conditional_branch(self) -> bool {
        matches!(
            self,
            Self::IfEq
                | Self::IfNe
                | Self::IfLt
                | Self::IfGe
                | Self::IfGt
                | Self::IfLe
                | Self::IfEqz
                | Self::IfNez
                | Self::IfLtz
                | Self::IfGez
                | Self::IfGtz
                | Self::IfLez
        )
    }

    /// Returns `true` for the compare-with-zero conditional forms.
    #[must_use]
    pub const fn is_zero_test(self) -> bool {
        matches!(
            self,
            Self::IfEqz | Self::IfNez | Self::IfLtz | Self::IfGez | Self::IfGtz | Self::IfLez
        )
    }

    /// Returns `true` for call instructions.
    #[must_use]
    pub const fn is_invoke(self) -> bool {
        matches!(
            self,
            Self::InvokeStatic | Self::InvokeVirtual | Self::InvokeDirect | Self::InvokeInterface
        )
    }

    /// Returns `true` for instance or static field stores.
    #[must_use]
    pub const fn is_field_put(self) -> bool {
        matches!(
            self,
            Self::Iput | Self::IputObject | Self::Sput | Self::SputObject
        )
    }

    /// Returns `true` for instance or static field loads.
    #[must_use]
    pub const fn is_field_get(self) -> bool {
        matches!(
            self,
            Self::Iget | Self::IgetObject | Self::Sget | Self::SgetObject
        )
    }

    /// Returns `true` for static field accesses.
    #[must_use]
    pub const fn is_static_field_access(self) -> bool {
        matches!(
            self,
            Self::Sget | Self::SgetObject | Self::Sput | Self::SputObject
        )
    }

    /// Returns `true` for instructions that terminate a block when present
    /// as its last instruction (branches, switches, returns, throw).
    ///
    /// A block need not carry a terminator at all: unconditional flow is
    /// represented purely by a goto edge.
    #[must_use]
    pub const fn is_terminator(self) -> bool {
        self.is_conditional_branch()
            || matches!(
                self,
                Self::Switch | Self::Return | Self::ReturnObject | Self::ReturnVoid | Self::Throw
            )
    }

    /// Returns `true` for instructions with no observable effect beyond
    /// writing their destination register.
    ///
    /// This is the legality filter for skipping a block during branch
    /// target forwarding: such instructions may be bypassed whenever their
    /// definitions are not live past the block.
    #[must_use]
    pub const fn is_side_effect_free(self) -> bool {
        matches!(
            self,
            Self::Nop
                | Self::Const
                | Self::ConstWide
                | Self::ConstString
                | Self::ConstClass
                | Self::Move
                | Self::MoveWide
                | Self::MoveObject
                | Self::MoveResultPseudo
                | Self::MoveResultPseudoObject
        )
    }

    /// Returns the source-register index that this instruction
    /// dereferences, if it unconditionally dereferences one.
    ///
    /// Used to detect operations that are guaranteed to raise a
    /// `NullPointerException` when the register is provably null.
    #[must_use]
    pub const fn dereferenced_src(self) -> Option<usize> {
        match self {
            Self::Iget
            | Self::IgetObject
            | Self::ArrayLength
            | Self::Aget
            | Self::MonitorEnter
            | Self::Throw
            | Self::NullCheck
            | Self::InvokeVirtual
            | Self::InvokeDirect
            | Self::InvokeInterface => Some(0),
            Self::Iput | Self::IputObject | Self::Aput => Some(1),
            _ => None,
        }
    }

    /// Returns the conditional with the opposite truth value, or `None`
    /// if this is not a conditional branch.
    ///
    /// Folding the branch-false edge through the inverted opcode lets edge
    /// analysis consider only the "taken" case of each conditional.
    #[must_use]
    pub const fn invert_conditional(self) -> Option<Self> {
        match self {
            Self::IfEq => Some(Self::IfNe),
            Self::IfNe => Some(Self::IfEq),
            Self::IfLt => Some(Self::IfGe),
            Self::IfGe => Some(Self::IfLt),
            Self::IfGt => Some(Self::IfLe),
            Self::IfLe => Some(Self::IfGt),
            Self::IfEqz => Some(Self::IfNez),
            Self::IfNez => Some(Self::IfEqz),
            Self::IfLtz => Some(Self::IfGez),
            Self::IfGez => Some(Self::IfLtz),
            Self::IfGtz => Some(Self::IfLez),
            Self::IfLez => Some(Self::IfGtz),
            _ => None,
        }
    }
}
