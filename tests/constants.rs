//! Constant materialization scenarios: moves, call results, parameter
//! constants, redundant stores, and commit idempotence.

use dexopt::analysis::{AbstractValue, ConstantAnalysis, ConstantEnvironment, WholeProgramState};
use dexopt::cfg::{ControlFlowGraph, EdgeKind};
use dexopt::ir::{
    FieldRef, Instruction, MethodAccess, MethodContext, MethodRef, Opcode, Proto, Reg, StrRef,
    TypeRef,
};
use dexopt::modules::{CrossModuleRefs, ModuleId};
use dexopt::transform::{Transform, TransformConfig};

fn declaring_type() -> TypeRef {
    TypeRef::new("Lcom/example/Main;")
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

fn run(
    cfg: &mut ControlFlowGraph,
    wps: &WholeProgramState,
    config: TransformConfig,
    entry_env: ConstantEnvironment,
) -> Transform {
    let mut analysis = ConstantAnalysis::new(wps);
    analysis.run(cfg, entry_env);
    let mut transform = Transform::new(config);
    transform.apply(&analysis, wps, cfg, &xrefs(), &method());
    transform
}

fn opcodes_of(cfg: &ControlFlowGraph, block: dexopt::cfg::BlockId) -> Vec<Opcode> {
    cfg.block(block)
        .unwrap()
        .instructions()
        .iter()
        .filter_map(|id| cfg.instruction(*id))
        .map(Instruction::opcode)
        .collect()
}

#[test]
fn move_of_known_constant_becomes_const() {
    // v0 = 42; v1 = v0; return v1
    let mut cfg = ControlFlowGraph::new(2);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Const)
            .with_dest(Reg::new(0))
            .with_literal(42),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Move)
            .with_dest(Reg::new(1))
            .with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(entry, Instruction::new(Opcode::Return).with_src(Reg::new(1)))
        .unwrap();

    let wps = WholeProgramState::new();
    let transform = run(
        &mut cfg,
        &wps,
        TransformConfig::default(),
        ConstantEnvironment::top(),
    );

    assert_eq!(transform.stats().materialized_consts, 1);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![Opcode::Const, Opcode::Const, Opcode::Return]
    );
    // the replacement binds the move's destination with the move's value
    let replaced = cfg
        .block(entry)
        .unwrap()
        .instructions()
        .iter()
        .filter_map(|id| cfg.instruction(*id))
        .nth(1)
        .unwrap();
    assert_eq!(replaced.dest(), Some(Reg::new(1)));
    assert_eq!(replaced.literal(), Some(42));
}

#[test]
fn moves_stay_when_toggle_is_off() {
    let mut cfg = ControlFlowGraph::new(2);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Const)
            .with_dest(Reg::new(0))
            .with_literal(1),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Move)
            .with_dest(Reg::new(1))
            .with_src(Reg::new(0)),
    )
    .unwrap();

    let wps = WholeProgramState::new();
    let config = TransformConfig {
        replace_moves_with_consts: false,
        ..TransformConfig::default()
    };
    let transform = run(&mut cfg, &wps, config, ConstantEnvironment::top());

    assert_eq!(transform.stats().materialized_consts, 0);
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const, Opcode::Move]);
}

#[test]
fn call_result_string_collapses_to_string_load() {
    // invoke-static name(); move-result-object v0; return-object v0
    // where name() is summarized to always return "foo"
    let getter = MethodRef::new(
        declaring_type(),
        "name",
        Proto::new(TypeRef::new("Ljava/lang/String;"), Vec::new()),
    );
    let mut wps = WholeProgramState::new();
    wps.record_method_return(getter.clone(), AbstractValue::Str(StrRef::new("foo")));

    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::InvokeStatic).with_method(getter),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::MoveResultObject).with_dest(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::ReturnObject).with_src(Reg::new(0)),
    )
    .unwrap();

    let config = TransformConfig {
        replace_move_result_with_consts: true,
        ..TransformConfig::default()
    };
    let transform = run(&mut cfg, &wps, config, ConstantEnvironment::top());

    assert_eq!(transform.stats().materialized_consts, 1);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![
            Opcode::ConstString,
            Opcode::MoveResultPseudoObject,
            Opcode::ReturnObject
        ]
    );
    let insns: Vec<&Instruction> = cfg
        .block(entry)
        .unwrap()
        .instructions()
        .iter()
        .filter_map(|id| cfg.instruction(*id))
        .collect();
    assert_eq!(insns[0].string_ref().map(StrRef::as_str), Some("foo"));
    assert_eq!(insns[1].dest(), Some(Reg::new(0)));
}

#[test]
fn pure_getter_set_enables_call_result_materialization() {
    let getter = MethodRef::new(
        declaring_type(),
        "answer",
        Proto::new(TypeRef::new("I"), Vec::new()),
    );
    let mut wps = WholeProgramState::new();
    wps.record_method_return(getter.clone(), AbstractValue::exact(42));

    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::InvokeStatic).with_method(getter.clone()),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::MoveResult).with_dest(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(entry, Instruction::new(Opcode::Return).with_src(Reg::new(0)))
        .unwrap();

    // the global toggle stays off; the per-method set carries the proof
    let mut config = TransformConfig::default();
    config.getter_methods_for_immutable_fields.insert(getter);
    let transform = run(&mut cfg, &wps, config, ConstantEnvironment::top());

    assert_eq!(transform.stats().materialized_consts, 1);
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const, Opcode::Return]);
}

#[test]
fn cross_module_class_constant_is_suppressed() {
    // v0 = Foreign.class (via const-class + binding); v1 = v0 (move-object)
    // Foreign lives in another feature module, so the move must survive.
    let foreign = TypeRef::new("Lfeature/Foreign;");
    let mut refs = CrossModuleRefs::new();
    refs.assign(declaring_type(), ModuleId::new(1));
    refs.assign(foreign.clone(), ModuleId::new(2));

    let mut cfg = ControlFlowGraph::new(2);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::ConstClass).with_type(foreign),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::MoveResultPseudoObject).with_dest(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::MoveObject)
            .with_dest(Reg::new(1))
            .with_src(Reg::new(0)),
    )
    .unwrap();

    let wps = WholeProgramState::new();
    let mut analysis = ConstantAnalysis::new(&wps);
    analysis.run(&cfg, ConstantEnvironment::top());
    let mut transform = Transform::new(TransformConfig::default());
    transform.apply(&analysis, &wps, &mut cfg, &refs, &method());

    assert_eq!(transform.stats().materialized_consts, 0);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![
            Opcode::ConstClass,
            Opcode::MoveResultPseudoObject,
            Opcode::MoveObject
        ]
    );
}

#[test]
fn entry_constant_parameters_are_materialized_once() {
    // load-param v0 with the caller-proven value 7
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::LoadParam).with_dest(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(entry, Instruction::new(Opcode::Return).with_src(Reg::new(0)))
        .unwrap();

    let wps = WholeProgramState::new();
    let seeded =
        ConstantEnvironment::top().with_value(Reg::new(0), AbstractValue::exact(7));

    let transform = run(&mut cfg, &wps, TransformConfig::default(), seeded.clone());
    assert_eq!(transform.stats().added_param_consts, 1);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![Opcode::LoadParam, Opcode::Const, Opcode::Return]
    );

    // a second run over the already-materialized method adds nothing
    let again = run(&mut cfg, &wps, TransformConfig::default(), seeded);
    assert_eq!(again.stats().added_param_consts, 0);
    assert_eq!(
        opcodes_of(&cfg, entry),
        vec![Opcode::LoadParam, Opcode::Const, Opcode::Return]
    );
}

#[test]
fn redundant_store_of_program_wide_constant_is_deleted() {
    let field = FieldRef::new(declaring_type(), "FLAG", TypeRef::new("I"));
    let mut wps = WholeProgramState::new();
    wps.record_field(field.clone(), AbstractValue::exact(1));

    // v0 = 1; sput v0 -> FLAG   (store of the agreed value: deletable)
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Const)
            .with_dest(Reg::new(0))
            .with_literal(1),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Sput)
            .with_src(Reg::new(0))
            .with_field(field),
    )
    .unwrap();

    let transform = run(
        &mut cfg,
        &wps,
        TransformConfig::default(),
        ConstantEnvironment::top(),
    );
    assert!(transform.stats().is_empty());
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const]);
}

#[test]
fn store_of_a_different_value_is_never_deleted() {
    let field = FieldRef::new(declaring_type(), "FLAG", TypeRef::new("I"));
    let mut wps = WholeProgramState::new();
    wps.record_field(field.clone(), AbstractValue::exact(1));

    // v0 = 2; sput v0 -> FLAG   (disagrees with the summary: must stay)
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Const)
            .with_dest(Reg::new(0))
            .with_literal(2),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Sput)
            .with_src(Reg::new(0))
            .with_field(field),
    )
    .unwrap();

    run(
        &mut cfg,
        &wps,
        TransformConfig::default(),
        ConstantEnvironment::top(),
    );
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const, Opcode::Sput]);
}

#[test]
fn store_during_class_initializer_is_kept() {
    let field = FieldRef::new(declaring_type(), "FLAG", TypeRef::new("I"));
    let mut wps = WholeProgramState::new();
    wps.record_field(field.clone(), AbstractValue::exact(1));

    // inside <clinit> the store establishes the value; it is not redundant
    let mut cfg = ControlFlowGraph::new(1);
    let entry = cfg.entry();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Const)
            .with_dest(Reg::new(0))
            .with_literal(1),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Sput)
            .with_src(Reg::new(0))
            .with_field(field),
    )
    .unwrap();

    let config = TransformConfig {
        class_under_init: Some(declaring_type()),
        ..TransformConfig::default()
    };
    run(&mut cfg, &wps, config, ConstantEnvironment::top());
    assert_eq!(opcodes_of(&cfg, entry), vec![Opcode::Const, Opcode::Sput]);
}

#[test]
fn apply_is_idempotent_on_a_fixpoint_graph() {
    // a method with a bit of everything that rewrites on the first pass
    let mut cfg = ControlFlowGraph::new(3);
    let entry = cfg.entry();
    let b1 = cfg.add_block();
    let b2 = cfg.add_block();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Const)
            .with_dest(Reg::new(0))
            .with_literal(5),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::Move)
            .with_dest(Reg::new(1))
            .with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(
        entry,
        Instruction::new(Opcode::IfEqz).with_src(Reg::new(0)),
    )
    .unwrap();
    cfg.append_instruction(b1, Instruction::new(Opcode::ReturnVoid))
        .unwrap();
    cfg.append_instruction(b2, Instruction::new(Opcode::Return).with_src(Reg::new(1)))
        .unwrap();
    cfg.add_edge(entry, b1, EdgeKind::BranchTrue).unwrap();
    cfg.add_edge(entry, b2, EdgeKind::BranchFalse).unwrap();

    let wps = WholeProgramState::new();
    let first = run(
        &mut cfg,
        &wps,
        TransformConfig::default(),
        ConstantEnvironment::top(),
    );
    assert!(!first.stats().is_empty());

    let shape_after_first: Vec<Vec<Opcode>> = cfg
        .block_ids()
        .map(|b| opcodes_of(&cfg, b))
        .collect();
    let count_after_first = cfg.instruction_count();

    // second pass with a freshly recomputed analysis stages nothing
    let second = run(
        &mut cfg,
        &wps,
        TransformConfig::default(),
        ConstantEnvironment::top(),
    );
    assert!(second.stats().is_empty(), "{:?}", second.stats());
    let shape_after_second: Vec<Vec<Opcode>> = cfg
        .block_ids()
        .map(|b| opcodes_of(&cfg, b))
        .collect();
    assert_eq!(shape_after_first, shape_after_second);
    assert_eq!(count_after_first, cfg.instruction_count());
}
