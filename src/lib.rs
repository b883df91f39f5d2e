// Copyright 2026 the dexopt contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # dexopt
//!
//! An ahead-of-time constant-propagation and rewrite engine for DEX-style
//! register bytecode, written in pure Rust. Given the results of an
//! abstract-interpretation fixpoint over a method's control-flow graph plus
//! a whole-program constant summary, `dexopt` applies a curated set of
//! semantics-preserving rewrites: constant materialization, dead-branch and
//! dead-switch elimination, redundant-store and redundant-null-check
//! elimination, provable-null-dereference-to-throw conversion, and branch
//! target forwarding.
//!
//! ## What this crate is not
//!
//! `dexopt` contains no instruction encoding or decoding and no container
//! file I/O. Methods enter as in-memory control-flow graphs and leave the
//! same way; reading and writing the packaging format, building the
//! whole-program summary, and scheduling methods across workers all belong
//! to the surrounding pipeline.
//!
//! ## Quick start
//!
//! ```rust
//! use dexopt::analysis::{ConstantAnalysis, ConstantEnvironment, WholeProgramState};
//! use dexopt::cfg::ControlFlowGraph;
//! use dexopt::ir::{Instruction, MethodAccess, MethodContext, Opcode, Proto, Reg, TypeRef};
//! use dexopt::modules::{CrossModuleRefs, ModuleId};
//! use dexopt::transform::{Transform, TransformConfig};
//!
//! // v0 = 42; v1 = v0  — the move will be rewritten to a constant load
//! let mut cfg = ControlFlowGraph::new(2);
//! let entry = cfg.entry();
//! cfg.append_instruction(
//!     entry,
//!     Instruction::new(Opcode::Const).with_dest(Reg::new(0)).with_literal(42),
//! )?;
//! cfg.append_instruction(
//!     entry,
//!     Instruction::new(Opcode::Move).with_dest(Reg::new(1)).with_src(Reg::new(0)),
//! )?;
//!
//! let wps = WholeProgramState::new();
//! let mut analysis = ConstantAnalysis::new(&wps);
//! analysis.run(&cfg, ConstantEnvironment::top());
//!
//! let declaring = TypeRef::new("Lcom/example/Main;");
//! let mut xrefs = CrossModuleRefs::new();
//! xrefs.assign(declaring.clone(), ModuleId::ROOT);
//! let method = MethodContext::new(
//!     declaring,
//!     "main",
//!     Proto::void(),
//!     MethodAccess::PUBLIC | MethodAccess::STATIC,
//! );
//!
//! let mut transform = Transform::new(TransformConfig::default());
//! transform.apply(&analysis, &wps, &mut cfg, &xrefs, &method);
//! assert_eq!(transform.stats().materialized_consts, 1);
//! # Ok::<(), dexopt::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ir`] — opcodes, registers, instructions, symbol references
//! - [`cfg`] — the arena-owned control-flow graph and its mutation
//!   primitives
//! - [`analysis`] — the constant domain, the intraprocedural fixpoint,
//!   instruction replay semantics, register liveness
//! - [`modules`] — the cross-module reference legality oracle
//! - [`transform`] — the two-phase (decide, then commit once) rewrite
//!   engine
//!
//! ## Concurrency model
//!
//! One engine instance processes one method at a time and shares no
//! mutable state. The only shared input, the
//! [`WholeProgramState`](analysis::WholeProgramState), is read-only during
//! rewriting, so an outer scheduler may freely run many engines across
//! disjoint methods in parallel.

pub mod analysis;
pub mod cfg;
pub mod ir;
pub mod modules;
pub mod transform;

mod error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use transform::{Transform, TransformConfig, TransformStats};
