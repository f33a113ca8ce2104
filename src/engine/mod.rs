//! Query engine
//!
//! The public entry point. A `QueryEngine` owns a table cache and query
//! metrics and runs each query through the stages in `QueryStage`.

mod cache;
mod engine;
mod stage;

use serde::{Deserialize, Serialize};

use crate::executor::WhereMode;

pub use cache::{CacheStats, TableCache};
pub use engine::QueryEngine;
pub use stage::QueryStage;

/// Behavior switches for one engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// How WHERE connectives are interpreted
    #[serde(default)]
    pub where_mode: WhereMode,
}
