//! Abstract instruction and branch semantics.
//!
//! The fixpoint iterator computes one environment per block entry; every
//! consumer re-derives per-instruction state by replaying these semantics
//! forward within a block. Keeping the replay in one place guarantees the
//! engine's decision phase sees exactly the states the analysis proved.
//!
//! Arithmetic follows the 32-bit two's-complement semantics of the
//! register machine: non-wide results are truncated to 32 bits, shift
//! amounts are masked to five bits, and division or remainder by a
//! provably-zero operand simply yields no constant (the instruction will
//! throw at runtime; proving that is the engine's job, not the
//! interpreter's).

use std::collections::HashSet;

use crate::{
    analysis::{AbstractValue, ConstantEnvironment, Interval, SignedDomain, WholeProgramState},
    ir::{Instruction, MethodRef, Opcode, Reg, TypeRef},
};

/// Shared inputs of the abstract semantics: the whole-program summary and
/// the method-independent recognition sets.
#[derive(Debug, Clone)]
pub struct AnalysisContext<'a> {
    wps: &'a WholeProgramState,
    class_under_init: Option<TypeRef>,
    null_assertions: HashSet<MethodRef>,
}

impl<'a> AnalysisContext<'a> {
    /// Creates a context over the given whole-program summary.
    #[must_use]
    pub fn new(wps: &'a WholeProgramState) -> Self {
        Self {
            wps,
            class_under_init: None,
            null_assertions: HashSet::new(),
        }
    }

    /// Declares that the analyzed method is the static initializer of
    /// `ty`.
    ///
    /// Whole-program knowledge about fields of that type is suppressed
    /// while it is being initialized: the summary describes the fully
    /// initialized program, which does not hold mid-`<clinit>`.
    #[must_use]
    pub fn with_class_under_init(mut self, ty: TypeRef) -> Self {
        self.class_under_init = Some(ty);
        self
    }

    /// Sets the recognized null-assertion helper methods.
    #[must_use]
    pub fn with_null_assertions(mut self, methods: HashSet<MethodRef>) -> Self {
        self.null_assertions = methods;
        self
    }

    /// Returns `true` if `method` is a recognized null-assertion helper.
    #[must_use]
    pub fn is_null_assertion(&self, method: &MethodRef) -> bool {
        self.null_assertions.contains(method)
    }

    /// Returns the whole-program summary.
    #[must_use]
    pub const fn whole_program(&self) -> &'a WholeProgramState {
        self.wps
    }

    /// Applies the abstract semantics of one instruction to `env`.
    pub fn analyze_instruction(&self, insn: &Instruction, env: &mut ConstantEnvironment) {
        if env.is_bottom() {
            return;
        }
        let op = insn.opcode();
        match op {
            Opcode::Nop | Opcode::LoadParam | Opcode::LoadParamWide | Opcode::LoadParamObject => {}

            Opcode::Const | Opcode::ConstWide => {
                if let (Some(dest), Some(lit)) = (insn.dest(), insn.literal()) {
                    env.set(dest, AbstractValue::exact(lit));
                }
            }
            Opcode::ConstString => {
                if let Some(s) = insn.string_ref() {
                    env.set(Reg::RESULT, AbstractValue::Str(s.clone()));
                }
            }
            Opcode::ConstClass => {
                if let Some(t) = insn.type_ref() {
                    env.set(Reg::RESULT, AbstractValue::ClassObject(t.clone()));
                }
            }

            Opcode::Move | Opcode::MoveWide | Opcode::MoveObject => {
                if let (Some(dest), Some(src)) = (insn.dest(), insn.src(0)) {
                    let value = env.get(src);
                    env.set(dest, value);
                }
            }
            op if op.is_result_binding() => {
                if let Some(dest) = insn.dest() {
                    let value = env.get(Reg::RESULT);
                    env.set(dest, value);
                }
            }

            op if is_binop(op) => self.analyze_binop(insn, env),
            op if is_binop_lit(op) => self.analyze_binop_lit(insn, env),

            Opcode::InstanceOf => {
                // instance-of on a provably-null reference is always false
                let src = insn.src(0).map(|r| env.get(r));
                if src.is_some_and(|v| v.is_exact_null()) {
                    env.set(Reg::RESULT, AbstractValue::exact(0));
                } else {
                    env.set(Reg::RESULT, AbstractValue::Top);
                }
            }
            Opcode::NewInstance => {
                env.set(Reg::RESULT, AbstractValue::nonnull());
            }
            Opcode::ArrayLength => {
                // array lengths are never negative
                env.set(
                    Reg::RESULT,
                    AbstractValue::Int(SignedDomain::Range(Interval::Gez)),
                );
            }

            Opcode::Sget | Opcode::SgetObject => {
                env.set(Reg::RESULT, self.static_field_value(insn));
            }
            Opcode::Iget | Opcode::IgetObject | Opcode::Aget => {
                env.set(Reg::RESULT, AbstractValue::Top);
            }

            Opcode::NullCheck => {
                if let Some(reg) = insn.src(0) {
                    refine_nonnull(env, reg);
                }
            }

            op if op.is_invoke() => self.analyze_invoke(insn, env),

            _ => {
                // no model: clobber whatever the instruction writes
                if let Some(dest) = insn.dest() {
                    env.set(dest, AbstractValue::Top);
                } else if op.writes_result_register() {
                    env.set(Reg::RESULT, AbstractValue::Top);
                }
            }
        }
    }

    fn static_field_value(&self, insn: &Instruction) -> AbstractValue {
        let Some(field) = insn.field_ref() else {
            return AbstractValue::Top;
        };
        // While a class is being statically initialized, its fields do not
        // yet hold their program-wide values.
        if self.class_under_init.as_ref() == Some(field.owner()) {
            return AbstractValue::Top;
        }
        self.wps
            .field_value(field)
            .cloned()
            .unwrap_or(AbstractValue::Top)
    }

    fn analyze_invoke(&self, insn: &Instruction, env: &mut ConstantEnvironment) {
        env.set(Reg::RESULT, AbstractValue::Top);
        let Some(method) = insn.method_ref() else {
            return;
        };
        if self.null_assertions.contains(method) {
            // the helper returns normally only when its argument was
            // non-null, so the argument is non-null afterwards
            if let Some(reg) = insn.src(0) {
                refine_nonnull(env, reg);
            }
            return;
        }
        if let Some(value) = self.wps.pure_method_return(method) {
            env.set(Reg::RESULT, value.clone());
        }
    }

    fn analyze_binop(&self, insn: &Instruction, env: &mut ConstantEnvironment) {
        let op = insn.opcode();
        let left = insn.src(0).and_then(|r| env.get(r).constant_int());
        let right = insn.src(1).and_then(|r| env.get(r).constant_int());
        let result = match (left, right) {
            (Some(a), Some(b)) => fold_int(op, a, b),
            _ => None,
        };
        write_arith_result(insn, result, env);
    }

    fn analyze_binop_lit(&self, insn: &Instruction, env: &mut ConstantEnvironment) {
        let op = insn.opcode();
        let src = insn.src(0).and_then(|r| env.get(r).constant_int());
        let result = match (src, insn.literal()) {
            (Some(a), Some(lit)) => fold_int(op, a, lit),
            _ => None,
        };
        write_arith_result(insn, result, env);
    }

    /// Computes the environment holding after a conditional branch is
    /// taken (`taken = true`) or not taken (`taken = false`).
    ///
    /// An unsatisfiable predicate produces the bottom environment, which
    /// is how dead branches are detected.
    pub fn refine_conditional(
        &self,
        insn: &Instruction,
        taken: bool,
        env: &mut ConstantEnvironment,
    ) {
        if env.is_bottom() {
            return;
        }
        let op = if taken {
            insn.opcode()
        } else {
            match insn.opcode().invert_conditional() {
                Some(op) => op,
                None => return,
            }
        };
        let Some(left_reg) = insn.src(0) else { return };
        let left = env.get(left_reg);
        let right_reg = insn.src(1);
        let right = right_reg.map_or(AbstractValue::exact(0), |r| env.get(r));

        match op {
            Opcode::IfEq | Opcode::IfEqz => {
                use crate::analysis::MeetSemiLattice;
                let refined = left.meet(&right);
                if refined.is_bottom() {
                    env.set_to_bottom();
                    return;
                }
                env.set(left_reg, refined.clone());
                if let Some(r) = right_reg {
                    env.set(r, refined);
                }
            }
            Opcode::IfNe | Opcode::IfNez => {
                if left.provably_equal(&right) {
                    env.set_to_bottom();
                } else if right.is_exact_null() {
                    refine_nonnull(env, left_reg);
                } else if left.is_exact_null() {
                    if let Some(r) = right_reg {
                        refine_nonnull(env, r);
                    }
                }
            }
            Opcode::IfLt => {
                if provably_leq(&right, &left) {
                    env.set_to_bottom();
                }
            }
            Opcode::IfGe => {
                if provably_lt(&left, &right) {
                    env.set_to_bottom();
                }
            }
            Opcode::IfGt => {
                if provably_leq(&left, &right) {
                    env.set_to_bottom();
                }
            }
            Opcode::IfLe => {
                if provably_lt(&right, &left) {
                    env.set_to_bottom();
                }
            }
            Opcode::IfLtz => env.refine(left_reg, &range_value(Interval::Ltz)),
            Opcode::IfGez => env.refine(left_reg, &range_value(Interval::Gez)),
            Opcode::IfGtz => env.refine(left_reg, &range_value(Interval::Gtz)),
            Opcode::IfLez => env.refine(left_reg, &range_value(Interval::Lez)),
            _ => {}
        }
    }
}

/// Refines a register to "provably non-null" without disturbing
/// already-known object identities.
///
/// String and class-object constants are non-null as they stand; integer
/// (null-ness) domains are met with the non-zero interval; a register
/// that is exactly null makes the point unreachable.
pub(crate) fn refine_nonnull(env: &mut ConstantEnvironment, reg: Reg) {
    match env.get(reg) {
        AbstractValue::Str(_) | AbstractValue::ClassObject(_) | AbstractValue::Bottom => {}
        AbstractValue::Int(d) => match d.meet(SignedDomain::NEZ) {
            Some(refined) => env.set(reg, AbstractValue::Int(refined)),
            None => env.set_to_bottom(),
        },
        AbstractValue::Top => env.set(reg, AbstractValue::nonnull()),
    }
}

fn range_value(interval: Interval) -> AbstractValue {
    AbstractValue::Int(SignedDomain::Range(interval))
}

fn provably_leq(a: &AbstractValue, b: &AbstractValue) -> bool {
    match (a.as_int(), b.as_int()) {
        (Some(a), Some(b)) => match (a.upper_bound(), b.lower_bound()) {
            (Some(hi), Some(lo)) => hi <= lo,
            _ => false,
        },
        _ => false,
    }
}

fn provably_lt(a: &AbstractValue, b: &AbstractValue) -> bool {
    match (a.as_int(), b.as_int()) {
        (Some(a), Some(b)) => match (a.upper_bound(), b.lower_bound()) {
            (Some(hi), Some(lo)) => hi < lo,
            _ => false,
        },
        _ => false,
    }
}

const fn is_binop(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::AddInt
            | Opcode::SubInt
            | Opcode::MulInt
            | Opcode::DivInt
            | Opcode::RemInt
            | Opcode::AndInt
            | Opcode::OrInt
            | Opcode::XorInt
            | Opcode::ShlInt
            | Opcode::ShrInt
            | Opcode::UshrInt
    )
}

const fn is_binop_lit(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::AddIntLit
            | Opcode::RsubIntLit
            | Opcode::MulIntLit
            | Opcode::DivIntLit
            | Opcode::RemIntLit
            | Opcode::AndIntLit
            | Opcode::OrIntLit
            | Opcode::XorIntLit
            | Opcode::ShlIntLit
            | Opcode::ShrIntLit
            | Opcode::UshrIntLit
    )
}

/// Folds a 32-bit integer operation, `None` when the result is not a
/// compile-time constant (division or remainder by zero).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fold_int(op: Opcode, a: i64, b: i64) -> Option<i64> {
    let a = a as i32;
    let b = b as i32;
    let result = match op {
        Opcode::AddInt | Opcode::AddIntLit => a.wrapping_add(b),
        Opcode::SubInt => a.wrapping_sub(b),
        Opcode::RsubIntLit => b.wrapping_sub(a),
        Opcode::MulInt | Opcode::MulIntLit => a.wrapping_mul(b),
        Opcode::DivInt | Opcode::DivIntLit => {
            if b == 0 {
                return None;
            }
            a.wrapping_div(b)
        }
        Opcode::RemInt | Opcode::RemIntLit => {
            if b == 0 {
                return None;
            }
            a.wrapping_rem(b)
        }
        Opcode::AndInt | Opcode::AndIntLit => a & b,
        Opcode::OrInt | Opcode::OrIntLit => a | b,
        Opcode::XorInt | Opcode::XorIntLit => a ^ b,
        // shift distances are masked to five bits
        Opcode::ShlInt | Opcode::ShlIntLit => a.wrapping_shl(b as u32 & 0x1f),
        Opcode::ShrInt | Opcode::ShrIntLit => a.wrapping_shr(b as u32 & 0x1f),
        Opcode::UshrInt | Opcode::UshrIntLit => ((a as u32) >> (b as u32 & 0x1f)) as i32,
        _ => return None,
    };
    Some(i64::from(result))
}

fn write_arith_result(insn: &Instruction, result: Option<i64>, env: &mut ConstantEnvironment) {
    let value = result.map_or(AbstractValue::Top, AbstractValue::exact);
    if insn.opcode().writes_result_register() {
        env.set(Reg::RESULT, value);
    } else if let Some(dest) = insn.dest() {
        env.set(dest, value);
    }
}
