//! Constant materialization.
//!
//! Converts an abstract constant value into the concrete instruction
//! sequence that produces it at runtime, bound to the destination
//! register of the instruction being replaced. The match over
//! [`AbstractValue`] is exhaustive on purpose: a new abstract-value
//! variant must decide its materialization here before the crate
//! compiles.

use crate::{
    analysis::AbstractValue,
    ir::{Instruction, Opcode, Reg, TypeRef},
    modules::CrossModuleRefs,
};

/// Materializes `value` into instructions writing `dest`.
///
/// Returns an empty sequence when the value cannot (or must not) be
/// materialized:
///
/// - top and bottom carry no constant;
/// - an integer domain that is not a single exact value carries no
///   constant either;
/// - a class-object constant whose type the declaring method's module may
///   not legally reference is suppressed, keeping the original
///   instruction in place.
///
/// `wide` selects the 64-bit constant-load form and is taken from the
/// destination width of the instruction being replaced.
#[must_use]
pub fn materialize_value(
    value: &AbstractValue,
    dest: Reg,
    wide: bool,
    xrefs: &CrossModuleRefs,
    declaring_type: &TypeRef,
) -> Vec<Instruction> {
    match value {
        AbstractValue::Int(domain) => {
            let Some(literal) = domain.constant() else {
                return Vec::new();
            };
            let opcode = if wide { Opcode::ConstWide } else { Opcode::Const };
            vec![Instruction::new(opcode).with_dest(dest).with_literal(literal)]
        }
        AbstractValue::Str(s) => vec![
            Instruction::new(Opcode::ConstString).with_string(s.clone()),
            Instruction::new(Opcode::MoveResultPseudoObject).with_dest(dest),
        ],
        AbstractValue::ClassObject(ty) => {
            if xrefs.illegal_ref(declaring_type, ty) {
                return Vec::new();
            }
            vec![
                Instruction::new(Opcode::ConstClass).with_type(ty.clone()),
                Instruction::new(Opcode::MoveResultPseudoObject).with_dest(dest),
            ]
        }
        AbstractValue::Top | AbstractValue::Bottom => Vec::new(),
    }
}
