//! Intraprocedural constant-propagation fixpoint.
//!
//! A forward worklist iteration over the control-flow graph. Block entry
//! environments are joined over the refined exit states of incoming
//! edges; iteration runs until no entry state changes. The iterator
//! stores only per-block **entry** states — consumers replay
//! [`analyze_instruction`](ConstantAnalysis::analyze_instruction) forward
//! within a block to recover per-instruction states, which keeps the
//! memory footprint linear in the block count rather than the
//! instruction count.
//!
//! # Contract
//!
//! Results are keyed by block identity. The graph must not be
//! structurally modified between [`ConstantAnalysis::run`] and the last
//! query against this analysis; the rewrite engine's two-phase
//! decide/commit protocol exists precisely to honor that.

use std::collections::{HashSet, VecDeque};

use crate::{
    analysis::{AnalysisContext, ConstantEnvironment, WholeProgramState},
    cfg::{BlockId, ControlFlowGraph, EdgeId, EdgeKind},
    ir::{Instruction, MethodRef, Opcode, TypeRef},
};

/// Forward constant-propagation analysis over one method's CFG.
///
/// # Example
///
/// ```rust,ignore
/// let mut analysis = ConstantAnalysis::new(&wps);
/// analysis.run(&cfg, ConstantEnvironment::top());
/// let entry_env = analysis.entry_state_at(block);
/// ```
#[derive(Debug)]
pub struct ConstantAnalysis<'a> {
    ctx: AnalysisContext<'a>,
    entry_states: Vec<ConstantEnvironment>,
}

impl<'a> ConstantAnalysis<'a> {
    /// Creates an analysis over the given whole-program summary.
    #[must_use]
    pub fn new(wps: &'a WholeProgramState) -> Self {
        Self {
            ctx: AnalysisContext::new(wps),
            entry_states: Vec::new(),
        }
    }

    /// Declares the type currently being statically initialized.
    ///
    /// See [`AnalysisContext::with_class_under_init`].
    #[must_use]
    pub fn with_class_under_init(mut self, ty: TypeRef) -> Self {
        self.ctx = self.ctx.with_class_under_init(ty);
        self
    }

    /// Sets the recognized null-assertion helper methods.
    #[must_use]
    pub fn with_null_assertions(mut self, methods: HashSet<MethodRef>) -> Self {
        self.ctx = self.ctx.with_null_assertions(methods);
        self
    }

    /// Returns the shared semantic context.
    #[must_use]
    pub const fn context(&self) -> &AnalysisContext<'a> {
        &self.ctx
    }

    /// Runs the fixpoint to completion.
    ///
    /// `entry_env` is the abstract state at method entry; callers with
    /// interprocedural knowledge may seed parameter registers with
    /// constants, everyone else passes [`ConstantEnvironment::top`].
    pub fn run(&mut self, cfg: &ControlFlowGraph, entry_env: ConstantEnvironment) {
        let capacity = cfg
            .block_ids()
            .map(|b| b.index() + 1)
            .max()
            .unwrap_or(0);
        self.entry_states = vec![ConstantEnvironment::bottom(); capacity];
        if capacity == 0 {
            return;
        }
        self.entry_states[cfg.entry().index()] = entry_env;

        let mut worklist: VecDeque<BlockId> = VecDeque::new();
        let mut queued = vec![false; capacity];
        for block in cfg.reverse_postorder() {
            worklist.push_back(block);
            queued[block.index()] = true;
        }

        while let Some(block) = worklist.pop_front() {
            queued[block.index()] = false;
            let exit = self.replay_block(cfg, block);
            if exit.is_bottom() {
                continue;
            }
            let Some(b) = cfg.block(block) else { continue };
            for edge in b.succs() {
                let edge_env = self.analyze_edge(cfg, *edge, &exit);
                let Some(target) = cfg.edge(*edge).map(|e| e.target()) else {
                    continue;
                };
                if self.entry_states[target.index()].join_with(&edge_env)
                    && !queued[target.index()]
                {
                    worklist.push_back(target);
                    queued[target.index()] = true;
                }
            }
        }
    }

    /// Returns the environment holding at entry of the given block.
    ///
    /// Blocks the fixpoint never reached — including blocks of a graph
    /// the analysis was not run over — answer bottom.
    #[must_use]
    pub fn entry_state_at(&self, block: BlockId) -> ConstantEnvironment {
        self.entry_states
            .get(block.index())
            .cloned()
            .unwrap_or_else(ConstantEnvironment::bottom)
    }

    /// Applies the abstract semantics of one instruction.
    ///
    /// Delegates to the shared [`AnalysisContext`]; exposed here so the
    /// rewrite engine replays states through the same semantics the
    /// fixpoint used.
    pub fn analyze_instruction(&self, insn: &Instruction, env: &mut ConstantEnvironment) {
        self.ctx.analyze_instruction(insn, env);
    }

    /// Computes the environment propagated along `edge`, given the exit
    /// state of the edge's source block.
    ///
    /// Conditional-branch edges refine through the branch predicate;
    /// switch-case edges meet the selector with the case key; a switch's
    /// default (goto) edge is unreachable when the selector provably
    /// equals some sibling case key. All other edges pass the state
    /// through unchanged.
    #[must_use]
    pub fn analyze_edge(
        &self,
        cfg: &ControlFlowGraph,
        edge: EdgeId,
        exit_state: &ConstantEnvironment,
    ) -> ConstantEnvironment {
        let mut env = exit_state.clone();
        let Some(e) = cfg.edge(edge) else { return env };
        let Some((_, last)) = cfg.last_instruction(e.src()) else {
            return env;
        };

        if last.opcode().is_conditional_branch() {
            match e.kind() {
                EdgeKind::BranchTrue => self.ctx.refine_conditional(last, true, &mut env),
                EdgeKind::BranchFalse => self.ctx.refine_conditional(last, false, &mut env),
                _ => {}
            }
            return env;
        }

        if last.opcode() == Opcode::Switch {
            let Some(selector) = last.src(0) else { return env };
            match e.kind() {
                EdgeKind::Case(key) => {
                    env.refine(selector, &crate::analysis::AbstractValue::exact(i64::from(key)));
                }
                EdgeKind::Goto => {
                    // default edge: dead when a sibling case key is the
                    // provable selector value
                    let value = env.get(selector);
                    if let Some(c) = value.constant_int() {
                        let matched = cfg.block(e.src()).is_some_and(|b| {
                            b.succs().iter().any(|sibling| {
                                cfg.edge(*sibling)
                                    .and_then(|s| s.kind().case_key())
                                    .is_some_and(|key| i64::from(key) == c)
                            })
                        });
                        if matched {
                            env.set_to_bottom();
                        }
                    }
                }
                _ => {}
            }
        }
        env
    }

    fn replay_block(&self, cfg: &ControlFlowGraph, block: BlockId) -> ConstantEnvironment {
        let mut env = self.entry_state_at(block);
        if env.is_bottom() {
            return env;
        }
        let Some(b) = cfg.block(block) else {
            return ConstantEnvironment::bottom();
        };
        for insn in b.instructions() {
            if let Some(insn) = cfg.instruction(*insn) {
                self.ctx.analyze_instruction(insn, &mut env);
            }
        }
        env
    }
}
