//! The rewrite engine: configuration, statistics, materialization, and
//! the two-phase transform itself.
//!
//! The expected call sequence per method, driven by an outer scheduler:
//!
//! ```rust,ignore
//! let mut analysis = ConstantAnalysis::new(&wps)
//!     .with_null_assertions(default_null_assertions());
//! analysis.run(&cfg, ConstantEnvironment::top());
//!
//! let mut transform = Transform::new(TransformConfig::default());
//! transform.apply(&analysis, &wps, &mut cfg, &xrefs, &method);
//! let stats = transform.stats();
//! ```
//!
//! The analysis must be freshly computed for the graph passed to
//! [`Transform::apply`]; results are keyed by block identity and a graph
//! modified since the fixpoint ran would be silently misread.

mod config;
mod engine;
mod materialize;
mod stats;

pub use config::TransformConfig;
pub use engine::{default_null_assertions, Transform};
pub use materialize::materialize_value;
pub use stats::TransformStats;
