//! Backward register liveness.
//!
//! A register is live at a program point if some path from that point
//! reaches a use of the register before any redefinition. The rewrite
//! engine consults liveness exactly once, as the legality guard for
//! branch-target forwarding: a block may only be skipped if none of the
//! registers it defines are live where the skip lands.
//!
//! # Algorithm
//!
//! Classic backward may-analysis over per-block bit sets:
//!
//! - `USE[B]` — registers read in B before any definition
//! - `DEF[B]` — registers defined in B
//! - `OUT[B] = ∪ IN[S]` over successors S
//! - `IN[B] = USE[B] ∪ (OUT[B] − DEF[B])`
//!
//! The result pseudo-register participates like any other register (it is
//! read by result bindings and written by result-carrying producers); it
//! occupies the extra final bit of each set.

use crate::{
    cfg::{BlockId, ControlFlowGraph},
    ir::Reg,
};

/// A fixed-capacity register set backed by machine words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegSet {
    words: Vec<u64>,
    capacity: usize,
}

impl RegSet {
    const WORD_BITS: usize = 64;

    /// Creates an empty set able to hold `capacity` registers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::WORD_BITS)],
            capacity,
        }
    }

    /// Returns the capacity of the set.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts a register index. Out-of-range indices are ignored.
    pub fn insert(&mut self, index: usize) {
        if index < self.capacity {
            self.words[index / Self::WORD_BITS] |= 1 << (index % Self::WORD_BITS);
        }
    }

    /// Removes a register index.
    pub fn remove(&mut self, index: usize) {
        if index < self.capacity {
            self.words[index / Self::WORD_BITS] &= !(1 << (index % Self::WORD_BITS));
        }
    }

    /// Returns `true` if the register index is in the set.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity
            && self.words[index / Self::WORD_BITS] & (1 << (index % Self::WORD_BITS)) != 0
    }

    /// Returns the number of registers in the set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Unions another set into this one; returns `true` if this set grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (dst, src) in self.words.iter_mut().zip(&other.words) {
            let merged = *dst | *src;
            changed |= merged != *dst;
            *dst = merged;
        }
        changed
    }

    /// Removes every register of `other` from this set.
    pub fn difference_with(&mut self, other: &Self) {
        for (dst, src) in self.words.iter_mut().zip(&other.words) {
            *dst &= !*src;
        }
    }
}

/// Liveness results for every block of one graph.
///
/// Computed lazily by the engine on the first forwarding opportunity, and
/// only valid for the graph it was computed from, before any commit.
#[derive(Debug)]
pub struct LivenessAnalysis {
    live_in: Vec<RegSet>,
    slots: usize,
}

impl LivenessAnalysis {
    /// Computes liveness for the given graph.
    #[must_use]
    pub fn run(cfg: &ControlFlowGraph) -> Self {
        let slots = cfg.register_count() as usize + 1;
        let capacity = cfg
            .block_ids()
            .map(|b| b.index() + 1)
            .max()
            .unwrap_or(0);

        // per-block USE and DEF sets
        let mut use_sets = vec![RegSet::new(slots); capacity];
        let mut def_sets = vec![RegSet::new(slots); capacity];
        for block in cfg.block_ids() {
            let uses = &mut use_sets[block.index()];
            let defs = &mut def_sets[block.index()];
            let Some(b) = cfg.block(block) else { continue };
            for id in b.instructions() {
                let Some(insn) = cfg.instruction(*id) else {
                    continue;
                };
                for src in insn.srcs() {
                    let slot = Self::slot_of(*src, slots);
                    if !defs.contains(slot) {
                        uses.insert(slot);
                    }
                }
                if insn.opcode().is_result_binding() {
                    let slot = Self::slot_of(Reg::RESULT, slots);
                    if !defs.contains(slot) {
                        uses.insert(slot);
                    }
                }
                if let Some(dest) = insn.dest() {
                    defs.insert(Self::slot_of(dest, slots));
                }
                if insn.opcode().writes_result_register() {
                    defs.insert(Self::slot_of(Reg::RESULT, slots));
                }
            }
        }

        let mut live_in = vec![RegSet::new(slots); capacity];
        let mut worklist: Vec<BlockId> = cfg.reverse_postorder();
        worklist.reverse();
        let mut queued = vec![false; capacity];
        for b in &worklist {
            queued[b.index()] = true;
        }

        while let Some(block) = worklist.pop() {
            queued[block.index()] = false;

            // OUT = union of successor INs, IN = USE ∪ (OUT − DEF)
            let mut out = RegSet::new(slots);
            for succ in cfg.succs(block) {
                out.union_with(&live_in[succ.index()]);
            }
            out.difference_with(&def_sets[block.index()]);
            out.union_with(&use_sets[block.index()]);

            if out != live_in[block.index()] {
                live_in[block.index()] = out;
                for pred in cfg.preds(block) {
                    if !queued[pred.index()] {
                        worklist.push(pred);
                        queued[pred.index()] = true;
                    }
                }
            }
        }

        Self { live_in, slots }
    }

    /// Returns `true` if `reg` is live at entry of `block`.
    #[must_use]
    pub fn is_live_in(&self, block: BlockId, reg: Reg) -> bool {
        self.live_in
            .get(block.index())
            .is_some_and(|set| set.contains(Self::slot_of(reg, self.slots)))
    }

    /// Returns the live-in set of a block.
    #[must_use]
    pub fn live_in(&self, block: BlockId) -> Option<&RegSet> {
        self.live_in.get(block.index())
    }

    fn slot_of(reg: Reg, slots: usize) -> usize {
        if reg.is_result() {
            slots - 1
        } else {
            reg.index() as usize
        }
    }
}
