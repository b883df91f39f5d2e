//! Dead-branch, dead-switch, null-check, and provable-NPE scenarios.

use dexopt::analysis::{ConstantAnalysis, ConstantEnvironment, WholeProgramState};
use dexopt::cfg::{BlockId, ControlFlowGraph, EdgeKind};
use dexopt::ir::{
    FieldRef, Instruction, MethodAccess, MethodContext, MethodRef, Opcode, Proto, Reg, TypeRef,
};
use dexopt::modules::{CrossModuleRefs, ModuleId};
use dexopt::transform::{Transform, TransformConfig};

fn declaring_type() -> TypeRef {
    TypeRef::new("Lcom/example/Dead;")
}

fn method() -> MethodContext {
    MethodContext::new(
        declaring_type(),
        "test",
        Proto::void(),
        MethodAccess::PUBLIC | MethodAccess::STATIC,
    )
}

fn xrefs() -> CrossModuleRefs {
    let mut refs = CrossModuleRefs::new();
    refs.assign(declaring_type(), ModuleId::ROOT);
    refs
}

fn run(cfg: &mut ControlFlowGraph, config: TransformConfig) -> Transform {
    let wps = WholeProgramState::new();
    run_with(cfg, &wps, config, ConstantEnvironment::top())
}

fn run_with(
    cfg: &mut ControlFlowGraph,
    wps: &WholeProgramState,
    config: TransformConfig,
    entry_env: ConstantEnvironment,
) -> Transform {
    let mut transform = Transform::new(config);
    let mut analysis =
        ConstantAnalysis::new(wps).with_null_assertions(transform.null_assertions().clone());
    analysis.run(cfg, entry_env);
    transform.apply(&analysis, wps, cfg, &xrefs(), &method());
    transform
}

fn opcodes_of(cfg: &ControlFlowGraph, block: BlockId) -> Vec<Opcode> {
    cfg.block(block)
        .unwrap()
        .instructions()
        .iter()
        .filter_map(|id| cfg.instruction(*id))
        .map(Instruction::opcode)
        .collect()
}

fn const_insn(reg: u32, value: i64) -> Instruction {
    Instruction::new(Opcode::Const)
        .with_dest(Reg::new(reg))
        .with_literal(value)
}

#[test]
fn statically_decided_conditional_becomes_a_jump() {
    // v0 = 1; if-eqz v0 -> b1 (true) / b2 (false); b1 is dead
    let mut cfg = ControlFlowGraph::new(2);
    let entry = cfg.entry();
    let b1 = cfg.add_block();
    let b2 = cfg.add_block();
    cfg.append_instruction(entry, const_insn(0, 1)).unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::IfEqz).with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(b1, const_insn(1, 9)).unwrap();
    cfg.append_instruction(b1, Instruction::new(Opcode::ReturnVoid))
        .unwrap();
    cfg.append_instruction(b2, Instruction::new(Opcode::ReturnVoid))
        .unwrap();
    cfg.add_edge(entry, b1, EdgeKind::BranchTrue).unwrap();
    cfg.add_edge(entry, b2, EdgeKind::BranchFalse).unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().branches_removed, 1);
    assert_eq!(transform.stats().unreachable_instructions_removed, 2);

    // exactly one outgoing edge, normalized to goto, aimed at the live branch
    let succs: Vec<BlockId> = cfg.succs(entry).collect();
    assert_eq!(succs, vec![b2]);
    let only_edge = cfg.block(entry).unwrap().succs()[0];
    assert_eq!(cfg.edge(only_edge).unwrap().kind(), EdgeKind::Goto);

    // the conditional is gone, the dead block purged
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const]);
    assert!(cfg.block(b1).is_none());
}

#[test]
fn switch_on_exact_selector_keeps_only_the_matching_case() {
    // v0 = 2; switch v0 with cases {1, 2, 3} and a default
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    let case1 = cfg.add_block();
    let case2 = cfg.add_block();
    let case3 = cfg.add_block();
    let default = cfg.add_block();
    for b in [case1, case2, case3, default] {
        cfg.append_instruction(b, Instruction::new(Opcode::ReturnVoid))
            .unwrap();
    }
    cfg.append_instruction(entry, const_insn(0, 2)).unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Switch).with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.add_edge(entry, case1, EdgeKind::Case(1)).unwrap();
    cfg.add_edge(entry, case2, EdgeKind::Case(2)).unwrap();
    cfg.add_edge(entry, case3, EdgeKind::Case(3)).unwrap();
    cfg.add_edge(entry, default, EdgeKind::Goto).unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    // case-1, case-3, and the default edge are deleted
    assert_eq!(transform.stats().branches_removed, 3);
    let succs: Vec<BlockId> = cfg.succs(entry).collect();
    assert_eq!(succs, vec![case2]);
    let kept = cfg.block(entry).unwrap().succs()[0];
    assert_eq!(cfg.edge(kept).unwrap().kind(), EdgeKind::Goto);
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const]);
    assert!(cfg.block(case1).is_none());
    assert!(cfg.block(case3).is_none());
    assert!(cfg.block(default).is_none());
}

#[test]
fn switch_with_no_matching_case_jumps_to_default() {
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    let case1 = cfg.add_block();
    let default = cfg.add_block();
    for b in [case1, default] {
        cfg.append_instruction(b, Instruction::new(Opcode::ReturnVoid))
            .unwrap();
    }
    cfg.append_instruction(entry, const_insn(0, 7)).unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Switch).with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.add_edge(entry, case1, EdgeKind::Case(1)).unwrap();
    cfg.add_edge(entry, default, EdgeKind::Goto).unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().branches_removed, 1);
    let succs: Vec<BlockId> = cfg.succs(entry).collect();
    assert_eq!(succs, vec![default]);
}

#[test]
fn dead_switch_removal_respects_its_toggle() {
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    let case1 = cfg.add_block();
    let default = cfg.add_block();
    for b in [case1, default] {
        cfg.append_instruction(b, Instruction::new(Opcode::ReturnVoid))
            .unwrap();
    }
    cfg.append_instruction(entry, const_insn(0, 1)).unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Switch).with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.add_edge(entry, case1, EdgeKind::Case(1)).unwrap();
    cfg.add_edge(entry, default, EdgeKind::Goto).unwrap();

    let config = TransformConfig {
        remove_dead_switch: false,
        ..TransformConfig::default()
    };
    let transform = run(&mut cfg, config);

    assert_eq!(transform.stats().branches_removed, 0);
    assert_eq!(cfg.succs(entry).count(), 2);
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const, Opcode::Switch]);
}

#[test]
fn provable_null_dereference_becomes_a_throw() {
    // v0 = null; iget v0.f; the rest of the block and both successor
    // edges must disappear behind a throw
    let field = FieldRef::new(declaring_type(), "f", TypeRef::new("I"));
    let mut cfg = ControlFlowGraph::new(2);
    let entry = cfg.entry();
    let next = cfg.add_block();
    cfg.append_instruction(entry, const_insn(0, 0)).unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Iget)
            .with_src(Reg::new(0))
            .with_field(field),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::MoveResultPseudo).with_dest(Reg::new(1)),
    )
    .unwrap();
    cfg.append_instruction(next, Instruction::new(Opcode::ReturnVoid))
        .unwrap();
    cfg.add_edge(entry, next, EdgeKind::Goto).unwrap();

    let registers_before = cfg.register_count();
    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().throws, 1);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![
            Opcode::Const,
            Opcode::NewInstance,
            Opcode::MoveResultPseudoObject,
            Opcode::InvokeDirect,
            Opcode::Throw
        ]
    );
    // the block is now a terminal, exception-raising leaf
    assert_eq!(cfg.succs(entry).count(), 0);
    assert!(cfg.block(next).is_none());
    // the exception object lives in a fresh temporary
    assert!(cfg.register_count() > registers_before);

    let new_instance = cfg
        .block(entry)
        .unwrap()
        .instructions()
        .iter()
        .filter_map(|id| cfg.instruction(*id))
        .find(|i| i.opcode() == Opcode::NewInstance)
        .unwrap();
    assert_eq!(
        new_instance.type_ref().map(TypeRef::descriptor),
        Some("Ljava/lang/NullPointerException;")
    );
}

#[test]
fn null_guard_over_nonnull_register_is_removed() {
    // v0 = new instance (non-null); null-check v0 is redundant
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::NewInstance).with_type(declaring_type()),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::MoveResultPseudoObject).with_dest(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::NullCheck).with_src(Reg::new(0)),
    )
    .unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().null_checks, 1);
    assert_eq!(transform.stats().null_check_method_calls, 0);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![Opcode::NewInstance, Opcode::MoveResultPseudoObject]
    );
}

#[test]
fn assertion_helper_call_over_nonnull_register_is_removed() {
    let check = MethodRef::new(
        TypeRef::new("Lkotlin/jvm/internal/Intrinsics;"),
        "checkNotNull",
        Proto::new(TypeRef::new("V"), vec![TypeRef::new("Ljava/lang/Object;")]),
    );
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::NewInstance).with_type(declaring_type()),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::MoveResultPseudoObject).with_dest(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::InvokeStatic)
            .with_src(Reg::new(0))
            .with_method(check),
    )
    .unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().null_check_method_calls, 1);
    assert_eq!(transform.stats().null_checks, 0);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![Opcode::NewInstance, Opcode::MoveResultPseudoObject]
    );
}

#[test]
fn null_check_over_unknown_register_stays() {
    // the parameter could be anything: the guard must survive
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::LoadParamObject).with_dest(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::NullCheck).with_src(Reg::new(0)),
    )
    .unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().null_checks, 0);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![Opcode::LoadParamObject, Opcode::NullCheck]
    );
}

#[test]
fn assertion_helper_on_provable_null_becomes_a_throw() {
    // checkNotNull(null) always raises; the call collapses to a throw
    let check = MethodRef::new(
        TypeRef::new("Lkotlin/jvm/internal/Intrinsics;"),
        "checkNotNull",
        Proto::new(TypeRef::new("V"), vec![TypeRef::new("Ljava/lang/Object;")]),
    );
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(entry, const_insn(0, 0)).unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::InvokeStatic)
            .with_src(Reg::new(0))
            .with_method(check),
    )
    .unwrap();
    cfg.append_instruction(entry, Instruction::new(Opcode::ReturnVoid))
        .unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().throws, 1);
    assert_eq!(transform.stats().null_check_method_calls, 0);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![
            Opcode::Const,
            Opcode::NewInstance,
            Opcode::MoveResultPseudoObject,
            Opcode::InvokeDirect,
            Opcode::Throw
        ]
    );
}

#[test]
fn unreachable_blocks_behind_dead_branches_are_purged_transitively() {
    // entry -> (dead) b1 -> b2; b2 is only reachable through b1
    let mut cfg = ControlFlowGraph::new(2);
    let entry = cfg.entry();
    let b1 = cfg.add_block();
    let b2 = cfg.add_block();
    let live = cfg.add_block();
    cfg.append_instruction(entry, const_insn(0, 0)).unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::IfNez).with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(b1, const_insn(1, 1)).unwrap();
    cfg.append_instruction(b2, const_insn(2, 2)).unwrap();
    cfg.append_instruction(b2, Instruction::new(Opcode::ReturnVoid))
        .unwrap();
    cfg.append_instruction(live, Instruction::new(Opcode::ReturnVoid))
        .unwrap();
    cfg.add_edge(entry, b1, EdgeKind::BranchTrue).unwrap();
    cfg.add_edge(entry, live, EdgeKind::BranchFalse).unwrap();
    cfg.add_edge(b1, b2, EdgeKind::Goto).unwrap();

    let transform = run(&mut cfg, TransformConfig::default());

    assert_eq!(transform.stats().branches_removed, 1);
    // const in b1 plus const + return-void in b2
    assert_eq!(transform.stats().unreachable_instructions_removed, 3);
    assert!(cfg.block(b1).is_none());
    assert!(cfg.block(b2).is_none());
    assert!(cfg.block(live).is_some());
}
