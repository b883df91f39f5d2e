//! The constant-propagation rewrite engine.
//!
//! [`Transform::apply`] consumes the fixpoint analysis results and the
//! whole-program summary and rewrites one method's control-flow graph:
//!
//! - materializes known constants over moves and call-result bindings
//! - materializes constants for parameters proven constant on entry
//! - deletes field stores that provably store the field's permanent value
//! - deletes null checks over provably non-null registers
//! - truncates blocks that provably dereference null into throws
//! - rewrites statically-decided conditionals and switches into jumps
//! - forwards branch targets past skippable blocks
//!
//! # Two-phase protocol
//!
//! Every decision method only *stages* its edit into the engine's
//! buffers; nothing touches the graph until [`Transform::apply`] commits
//! all staged edits in a single final step. The decision phase therefore
//! reads a structure identical to the one the fixpoint analyzed — results
//! are keyed by block identity, and mutating mid-scan would invalidate
//! them. Commit runs exactly once per `apply` call.

use std::collections::{HashMap, HashSet};

use crate::{
    analysis::{
        AbstractValue, ConstantAnalysis, ConstantEnvironment, LivenessAnalysis, WholeProgramState,
    },
    cfg::{BlockId, ControlFlowGraph, EdgeId, EdgeKind, InsnId},
    ir::{Instruction, MethodContext, MethodRef, Opcode, Proto, Reg, TypeRef},
    modules::CrossModuleRefs,
    transform::{materialize_value, TransformConfig, TransformStats},
};

/// Outcome of visiting one instruction during the decision phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// Keep scanning the block.
    Continue,
    /// The rest of the block has been staged away; stop scanning it.
    Halt,
}

/// Returns the built-in set of recognized null-assertion helpers.
///
/// These are the platform null-check intrinsics emitted by the Kotlin
/// compiler. The membership rule is deliberately an explicit enumeration,
/// extensible through
/// [`TransformConfig::extra_null_check_methods`]; nothing is inferred
/// from naming conventions.
#[must_use]
pub fn default_null_assertions() -> HashSet<MethodRef> {
    let intrinsics = TypeRef::new("Lkotlin/jvm/internal/Intrinsics;");
    let object = TypeRef::new("Ljava/lang/Object;");
    let string = TypeRef::new("Ljava/lang/String;");
    let void = TypeRef::new("V");
    let unary = Proto::new(void.clone(), vec![object.clone()]);
    let with_message = Proto::new(void, vec![object, string]);

    [
        MethodRef::new(intrinsics.clone(), "checkNotNull", unary),
        MethodRef::new(intrinsics.clone(), "checkNotNull", with_message.clone()),
        MethodRef::new(intrinsics.clone(), "checkNotNullParameter", with_message.clone()),
        MethodRef::new(
            intrinsics.clone(),
            "checkNotNullExpressionValue",
            with_message.clone(),
        ),
        MethodRef::new(intrinsics.clone(), "checkParameterIsNotNull", with_message.clone()),
        MethodRef::new(intrinsics, "checkExpressionValueIsNotNull", with_message),
    ]
    .into_iter()
    .collect()
}

/// The rewrite engine for one or more methods.
///
/// One instance processes one graph at a time; the cumulative
/// [`stats`](Transform::stats) add up across `apply` calls. Engines share
/// no mutable state, so an outer scheduler may run one engine per worker
/// over disjoint methods against the same read-only
/// [`WholeProgramState`].
#[derive(Debug)]
pub struct Transform {
    config: TransformConfig,
    null_assertions: HashSet<MethodRef>,
    npe_type: TypeRef,
    npe_init: MethodRef,

    // staged edits, cleared at the start of every apply
    replacements: HashMap<InsnId, Vec<Instruction>>,
    deletes: HashSet<InsnId>,
    redundant_move_results: HashSet<InsnId>,
    added_param_values: Vec<Instruction>,
    edge_deletes: Vec<EdgeId>,
    edge_redirects: Vec<(EdgeId, BlockId)>,
    throw_temp: Option<Reg>,

    stats: TransformStats,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}

impl Transform {
    /// Creates an engine with the given configuration.
    ///
    /// The recognized null-assertion set is computed here, once, and held
    /// as engine state for the lifetime of the instance.
    #[must_use]
    pub fn new(config: TransformConfig) -> Self {
        let mut null_assertions = default_null_assertions();
        null_assertions.extend(config.extra_null_check_methods.iter().cloned());
        let npe_type = TypeRef::new("Ljava/lang/NullPointerException;");
        let npe_init = MethodRef::new(npe_type.clone(), "<init>", Proto::void());
        Self {
            config,
            null_assertions,
            npe_type,
            npe_init,
            replacements: HashMap::new(),
            deletes: HashSet::new(),
            redundant_move_results: HashSet::new(),
            added_param_values: Vec::new(),
            edge_deletes: Vec::new(),
            edge_redirects: Vec::new(),
            throw_temp: None,
            stats: TransformStats::default(),
        }
    }

    /// Returns the recognized null-assertion helper set.
    #[must_use]
    pub const fn null_assertions(&self) -> &HashSet<MethodRef> {
        &self.null_assertions
    }

    /// Returns the cumulative statistics over all `apply` calls.
    #[must_use]
    pub const fn stats(&self) -> &TransformStats {
        &self.stats
    }

    /// Applies all available transformations to `cfg`.
    ///
    /// `analysis` must have been run over this exact graph; the analysis
    /// is keyed by block identity and the caller must not modify the
    /// graph between running it and calling `apply`. May recompute the
    /// canonical exit block as a side effect of edge restructuring.
    pub fn apply(
        &mut self,
        analysis: &ConstantAnalysis<'_>,
        wps: &WholeProgramState,
        cfg: &mut ControlFlowGraph,
        xrefs: &CrossModuleRefs,
        method: &MethodContext,
    ) {
        self.clear_staging();
        self.apply_constants_and_prune(analysis, wps, cfg, xrefs, method);
        if !self.has_problematic_return(method, xrefs) {
            self.forward_targets(cfg);
        }
        self.apply_changes(cfg);
    }

    fn clear_staging(&mut self) {
        self.replacements.clear();
        self.deletes.clear();
        self.redundant_move_results.clear();
        self.added_param_values.clear();
        self.edge_deletes.clear();
        self.edge_redirects.clear();
        self.throw_temp = None;
    }

    // === decision phase ===================================================

    fn apply_constants_and_prune(
        &mut self,
        analysis: &ConstantAnalysis<'_>,
        wps: &WholeProgramState,
        cfg: &ControlFlowGraph,
        xrefs: &CrossModuleRefs,
        method: &MethodContext,
    ) {
        for block in cfg.block_ids().collect::<Vec<_>>() {
            let mut env = analysis.entry_state_at(block);
            if env.is_bottom() {
                // unreachable per the analysis: purged at commit, never rewritten
                continue;
            }
            let Some(b) = cfg.block(block) else { continue };
            let ids: Vec<InsnId> = b.instructions().to_vec();

            let mut halted = false;
            for (idx, id) in ids.iter().enumerate() {
                if env.is_bottom() {
                    break;
                }
                let Some(insn) = cfg.instruction(*id) else {
                    continue;
                };
                let visit =
                    self.simplify_instruction(wps, cfg, xrefs, method, block, &ids, idx, &env);
                if visit == Visit::Halt {
                    halted = true;
                    break;
                }
                analysis.analyze_instruction(insn, &mut env);
            }
            if halted || env.is_bottom() {
                continue;
            }

            if let Some((terminator_id, terminator)) = cfg.last_instruction(block) {
                if terminator.opcode() == Opcode::Switch {
                    self.remove_dead_switch(cfg, block, terminator_id, terminator, &env);
                } else if terminator.opcode().is_conditional_branch() {
                    self.eliminate_dead_branch(analysis, cfg, block, terminator_id, &env);
                }
            }
        }
    }

    /// Applies the first matching rewrite rule to one instruction; at
    /// most one rule fires per instruction per `apply` call.
    #[allow(clippy::too_many_arguments)]
    fn simplify_instruction(
        &mut self,
        wps: &WholeProgramState,
        cfg: &ControlFlowGraph,
        xrefs: &CrossModuleRefs,
        method: &MethodContext,
        block: BlockId,
        ids: &[InsnId],
        idx: usize,
        env: &ConstantEnvironment,
    ) -> Visit {
        let id = ids[idx];
        let Some(insn) = cfg.instruction(id) else {
            return Visit::Continue;
        };

        if self.replace_with_const(env, cfg, xrefs, method, ids, idx, insn) {
            return Visit::Continue;
        }
        if block == cfg.entry()
            && insn.opcode().is_load_param()
            && self.generate_const_param(env, cfg, xrefs, method, ids, insn)
        {
            return Visit::Continue;
        }
        if self.eliminate_redundant_put(env, wps, id, insn) {
            return Visit::Continue;
        }
        if self.eliminate_redundant_null_check(env, id, insn) {
            return Visit::Continue;
        }
        if self.replace_with_throw(env, cfg, block, ids, idx, insn) {
            return Visit::Halt;
        }
        Visit::Continue
    }

    /// Rule 1: replace an eligible value producer with a materialized
    /// constant.
    fn replace_with_const(
        &mut self,
        env: &ConstantEnvironment,
        cfg: &ControlFlowGraph,
        xrefs: &CrossModuleRefs,
        method: &MethodContext,
        ids: &[InsnId],
        idx: usize,
        insn: &Instruction,
    ) -> bool {
        let op = insn.opcode();

        if op.is_move() {
            if !self.config.replace_moves_with_consts {
                return false;
            }
            let (Some(dest), Some(src)) = (insn.dest(), insn.src(0)) else {
                return false;
            };
            let value = env.get(src);
            return self.stage_materialization(
                ids[idx],
                &value,
                dest,
                op == Opcode::MoveWide,
                xrefs,
                method,
            );
        }

        if op.is_result_binding() {
            let Some(dest) = insn.dest() else { return false };
            if idx == 0 {
                return false;
            }
            let producer_id = ids[idx - 1];
            let Some(producer) = cfg.instruction(producer_id) else {
                return false;
            };
            let eligible = match producer.opcode() {
                p if p.is_invoke() => {
                    self.config.replace_move_result_with_consts
                        || producer.method_ref().is_some_and(|m| {
                            self.config.getter_methods_for_immutable_fields.contains(m)
                        })
                }
                p if p.is_field_get() => self.config.replace_move_result_with_consts,
                // const-load producers are already materialized form
                _ => false,
            };
            if !eligible
                || self.deletes.contains(&producer_id)
                || self.replacements.contains_key(&producer_id)
            {
                return false;
            }
            let value = env.get(Reg::RESULT);
            if self.stage_materialization(
                producer_id,
                &value,
                dest,
                op == Opcode::MoveResultWide,
                xrefs,
                method,
            ) {
                self.redundant_move_results.insert(ids[idx]);
                return true;
            }
        }
        false
    }

    /// Rule 2: materialize constants for parameters proven constant on
    /// entry.
    fn generate_const_param(
        &mut self,
        env: &ConstantEnvironment,
        cfg: &ControlFlowGraph,
        xrefs: &CrossModuleRefs,
        method: &MethodContext,
        ids: &[InsnId],
        insn: &Instruction,
    ) -> bool {
        if !self.config.add_param_const {
            return false;
        }
        let Some(dest) = insn.dest() else { return false };
        let value = env.get(dest);
        if self.param_const_already_present(cfg, ids, dest, &value) {
            return false;
        }
        let seq = materialize_value(
            &value,
            dest,
            insn.opcode() == Opcode::LoadParamWide,
            xrefs,
            method.declaring_type(),
        );
        if seq.is_empty() {
            return false;
        }
        self.added_param_values.extend(seq);
        self.stats.added_param_consts += 1;
        true
    }

    /// Returns `true` if the constant-load prefix right after the
    /// parameter loads already materializes `value` into `param`.
    ///
    /// This is what keeps repeated `apply` calls from stacking duplicate
    /// parameter constants.
    fn param_const_already_present(
        &self,
        cfg: &ControlFlowGraph,
        ids: &[InsnId],
        param: Reg,
        value: &AbstractValue,
    ) -> bool {
        let mut insns = ids
            .iter()
            .filter_map(|id| cfg.instruction(*id))
            .skip_while(|i| i.opcode().is_load_param())
            .peekable();
        while let Some(insn) = insns.next() {
            match insn.opcode() {
                Opcode::Const | Opcode::ConstWide => {
                    if insn.dest() == Some(param) && insn.literal() == value.constant_int() {
                        return true;
                    }
                }
                Opcode::ConstString | Opcode::ConstClass => {
                    let Some(binding) = insns.peek() else { break };
                    if !binding.opcode().is_move_result_pseudo() {
                        break;
                    }
                    if binding.dest() == Some(param) {
                        let same = match insn.opcode() {
                            Opcode::ConstString => {
                                insn.string_ref().is_some() && insn.string_ref() == value.as_string()
                            }
                            _ => {
                                insn.type_ref().is_some()
                                    && insn.type_ref() == value.as_class_object()
                            }
                        };
                        if same {
                            return true;
                        }
                    }
                    insns.next();
                }
                op if op.is_move_result_pseudo() => {}
                _ => break,
            }
        }
        false
    }

    /// Rule 3: delete a field store that provably writes the value the
    /// field always holds.
    fn eliminate_redundant_put(
        &mut self,
        env: &ConstantEnvironment,
        wps: &WholeProgramState,
        id: InsnId,
        insn: &Instruction,
    ) -> bool {
        if !insn.opcode().is_field_put() {
            return false;
        }
        let Some(field) = insn.field_ref() else { return false };
        // during <clinit> of the owner, this store may be the one that
        // establishes the permanent value; it is not redundant
        if self.config.class_under_init.as_ref() == Some(field.owner()) {
            return false;
        }
        let Some(field_value) = wps.field_value(field) else {
            return false;
        };
        let Some(written_reg) = insn.src(0) else { return false };
        if env.get(written_reg).provably_equal(field_value) {
            self.deletes.insert(id);
            return true;
        }
        false
    }

    /// Rule 4: delete a null check over a provably non-null register.
    fn eliminate_redundant_null_check(
        &mut self,
        env: &ConstantEnvironment,
        id: InsnId,
        insn: &Instruction,
    ) -> bool {
        match insn.opcode() {
            Opcode::NullCheck => {
                let Some(reg) = insn.src(0) else { return false };
                if env.get(reg).is_provably_nonnull() {
                    self.deletes.insert(id);
                    self.stats.null_checks += 1;
                    return true;
                }
                false
            }
            op if op.is_invoke() => {
                let Some(method) = insn.method_ref() else {
                    return false;
                };
                if !self.null_assertions.contains(method) {
                    return false;
                }
                let Some(reg) = insn.src(0) else { return false };
                if env.get(reg).is_provably_nonnull() {
                    self.deletes.insert(id);
                    self.stats.null_check_method_calls += 1;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Rule 5: an operation that provably dereferences null can never
    /// complete; replace the rest of the block with a throw.
    fn replace_with_throw(
        &mut self,
        env: &ConstantEnvironment,
        cfg: &ControlFlowGraph,
        block: BlockId,
        ids: &[InsnId],
        idx: usize,
        insn: &Instruction,
    ) -> bool {
        let Some(reg) = self.checked_null_reg(insn) else {
            return false;
        };
        if !env.get(reg).is_exact_null() {
            return false;
        }
        let id = ids[idx];
        if self.replacements.contains_key(&id) || self.deletes.contains(&id) {
            return false;
        }

        let temp = self.alloc_throw_temp(cfg);
        self.replacements.insert(
            id,
            vec![
                Instruction::new(Opcode::NewInstance).with_type(self.npe_type.clone()),
                Instruction::new(Opcode::MoveResultPseudoObject).with_dest(temp),
                Instruction::new(Opcode::InvokeDirect)
                    .with_src(temp)
                    .with_method(self.npe_init.clone()),
                Instruction::new(Opcode::Throw).with_src(temp),
            ],
        );
        for rest in &ids[idx + 1..] {
            if !self.replacements.contains_key(rest) {
                self.deletes.insert(*rest);
            }
        }
        if let Some(b) = cfg.block(block) {
            self.edge_deletes.extend(b.succs().iter().copied());
        }
        self.stats.throws += 1;
        true
    }

    /// The register whose null-ness decides whether `insn` throws.
    fn checked_null_reg(&self, insn: &Instruction) -> Option<Reg> {
        if let Some(reg) = insn.dereferenced_reg() {
            return Some(reg);
        }
        // static null-assertion helpers dereference their first argument
        if insn.opcode() == Opcode::InvokeStatic
            && insn
                .method_ref()
                .is_some_and(|m| self.null_assertions.contains(m))
        {
            return insn.src(0);
        }
        None
    }

    fn alloc_throw_temp(&mut self, cfg: &ControlFlowGraph) -> Reg {
        *self
            .throw_temp
            .get_or_insert_with(|| Reg::new(cfg.register_count()))
    }

    fn stage_materialization(
        &mut self,
        key: InsnId,
        value: &AbstractValue,
        dest: Reg,
        wide: bool,
        xrefs: &CrossModuleRefs,
        method: &MethodContext,
    ) -> bool {
        let seq = materialize_value(value, dest, wide, xrefs, method.declaring_type());
        if seq.is_empty() {
            return false;
        }
        self.replacements.insert(key, seq);
        self.stats.materialized_consts += 1;
        true
    }

    // === dead branches and switches =======================================

    /// Rewrites a statically-decided conditional into a jump by deleting
    /// the terminator and its dead edge.
    fn eliminate_dead_branch(
        &mut self,
        analysis: &ConstantAnalysis<'_>,
        cfg: &ControlFlowGraph,
        block: BlockId,
        terminator_id: InsnId,
        exit_env: &ConstantEnvironment,
    ) {
        let Some(b) = cfg.block(block) else { return };
        let branch_edges: Vec<EdgeId> = b
            .succs()
            .iter()
            .copied()
            .filter(|e| cfg.edge(*e).is_some_and(|e| e.kind().is_conditional()))
            .collect();
        if branch_edges.len() != 2 {
            return;
        }

        let mut dead = None;
        for edge in branch_edges {
            if analysis.analyze_edge(cfg, edge, exit_env).is_bottom() {
                if dead.is_some() {
                    // both directions infeasible can only mean the block
                    // itself is unreachable; leave it to the purge
                    return;
                }
                dead = Some(edge);
            }
        }
        if let Some(edge) = dead {
            self.edge_deletes.push(edge);
            self.deletes.insert(terminator_id);
            self.stats.branches_removed += 1;
        }
    }

    /// Rewrites a switch with a provably constant selector into a jump to
    /// the matching case (or the default when no key matches).
    fn remove_dead_switch(
        &mut self,
        cfg: &ControlFlowGraph,
        block: BlockId,
        terminator_id: InsnId,
        insn: &Instruction,
        exit_env: &ConstantEnvironment,
    ) {
        if !self.config.remove_dead_switch {
            return;
        }
        let Some(selector) = insn.src(0) else { return };
        let Some(value) = exit_env.get(selector).constant_int() else {
            return;
        };
        let Some(b) = cfg.block(block) else { return };

        let mut matching = None;
        let mut default = None;
        for edge_id in b.succs() {
            let Some(edge) = cfg.edge(*edge_id) else { continue };
            match edge.kind() {
                EdgeKind::Case(key) if i64::from(key) == value => matching = Some(*edge_id),
                EdgeKind::Goto => default = Some(*edge_id),
                _ => {}
            }
        }
        let Some(keep) = matching.or(default) else {
            return;
        };

        let mut removed = 0;
        for edge_id in b.succs() {
            let Some(edge) = cfg.edge(*edge_id) else { continue };
            if *edge_id != keep && edge.kind() != EdgeKind::Throw {
                self.edge_deletes.push(*edge_id);
                removed += 1;
            }
        }
        self.deletes.insert(terminator_id);
        self.stats.branches_removed += removed;
    }

    // === branch target forwarding =========================================

    /// Redirects edges whose target block can be skipped, collapsing
    /// chains of unconditional jumps.
    fn forward_targets(&mut self, cfg: &ControlFlowGraph) {
        // the liveness guard is only computed if a candidate shows up
        let mut liveness: Option<LivenessAnalysis> = None;

        for block in cfg.block_ids().collect::<Vec<_>>() {
            let Some(b) = cfg.block(block) else { continue };
            for edge_id in b.succs() {
                let Some(edge) = cfg.edge(*edge_id) else { continue };
                // throw edges are never forwarded, and edges already
                // staged for deletion are not worth redirecting
                if edge.kind() == EdgeKind::Throw || self.edge_deletes.contains(edge_id) {
                    continue;
                }
                let first = edge.target();
                let mut target = first;
                let mut visited: HashSet<BlockId> = HashSet::from([first]);
                while let Some(next) = self.forwardable_target(cfg, target, &mut liveness) {
                    if !visited.insert(next) {
                        break;
                    }
                    target = next;
                }
                if target != first {
                    self.edge_redirects.push((*edge_id, target));
                    self.stats.branches_forwarded += 1;
                }
            }
        }
    }

    /// If `block` may be skipped, returns where its goto leads.
    ///
    /// A block is skippable when its only outgoing edge is a goto and all
    /// its instructions are side-effect-free with nothing they define
    /// live into the goto's target — skipping must not remove an
    /// observable definition.
    fn forwardable_target(
        &self,
        cfg: &ControlFlowGraph,
        block: BlockId,
        liveness: &mut Option<LivenessAnalysis>,
    ) -> Option<BlockId> {
        let b = cfg.block(block)?;
        if b.succs().len() != 1 {
            return None;
        }
        let edge = cfg.edge(b.succs()[0])?;
        if edge.kind() != EdgeKind::Goto || edge.target() == block {
            return None;
        }
        let next = edge.target();
        if b.is_empty() {
            return Some(next);
        }

        for id in b.instructions() {
            let insn = cfg.instruction(*id)?;
            if !insn.opcode().is_side_effect_free() {
                return None;
            }
        }
        let liveness = liveness.get_or_insert_with(|| LivenessAnalysis::run(cfg));
        for id in b.instructions() {
            let insn = cfg.instruction(*id)?;
            if let Some(dest) = insn.dest() {
                if liveness.is_live_in(next, dest) {
                    return None;
                }
            }
            if insn.opcode().writes_result_register() && liveness.is_live_in(next, Reg::RESULT) {
                return None;
            }
        }
        Some(next)
    }

    /// Returns `true` if target forwarding must be suppressed for this
    /// method.
    ///
    /// Forwarding can merge return paths in ways that materialize a
    /// reference to the declared return type; if that type (or the
    /// declaring type itself) is unavailable or lives in a different
    /// deployment module than the method body, the reference would be
    /// illegal to emit, so the whole pass is skipped for the method.
    fn has_problematic_return(&self, method: &MethodContext, xrefs: &CrossModuleRefs) -> bool {
        let declaring = method.declaring_type();
        if !xrefs.is_available(declaring) {
            return true;
        }
        let ret = method.proto().return_type();
        if ret.is_primitive() {
            return false;
        }
        !xrefs.is_available(ret) || xrefs.module_of(ret) != xrefs.module_of(declaring)
    }

    // === commit phase =====================================================

    /// Applies every staged buffer to the graph, exactly once per
    /// `apply` call.
    fn apply_changes(&mut self, cfg: &mut ControlFlowGraph) {
        // Staged handles were collected from this graph during this call,
        // so the primitives below cannot fail; results are discarded
        // rather than propagated to keep the engine infallible.

        if !self.added_param_values.is_empty() {
            let entry = cfg.entry();
            let prefix = cfg.block(entry).map_or(0, |b| {
                b.instructions()
                    .iter()
                    .take_while(|id| {
                        cfg.instruction(**id)
                            .is_some_and(|i| i.opcode().is_load_param())
                    })
                    .count()
            });
            let seq = std::mem::take(&mut self.added_param_values);
            let _ = cfg.insert_before(entry, prefix, seq);
        }

        if let Some(temp) = self.throw_temp.take() {
            cfg.ensure_register_capacity(temp.index() + 1);
        }

        for (id, seq) in std::mem::take(&mut self.replacements) {
            let _ = cfg.replace_instruction(id, seq);
        }
        for id in std::mem::take(&mut self.deletes) {
            let _ = cfg.delete_instruction(id);
        }
        for id in std::mem::take(&mut self.redundant_move_results) {
            let _ = cfg.delete_instruction(id);
        }

        for (edge, target) in std::mem::take(&mut self.edge_redirects) {
            let _ = cfg.redirect_edge(edge, target);
        }
        let mut touched = Vec::new();
        for edge in std::mem::take(&mut self.edge_deletes) {
            if let Some(e) = cfg.edge(edge) {
                touched.push(e.src());
            }
            let _ = cfg.delete_edge(edge);
        }
        for block in touched {
            cfg.simplify_terminator(block);
        }

        cfg.recompute_exit_block();
        self.stats.unreachable_instructions_removed += cfg.purge_unreachable();
    }
}
