//! Query lifecycle stages

use std::fmt;

use serde::Serialize;

use crate::planner::{QueryForm, SelectQuery};

/// Stage a query passes through on its way to a result.
///
/// `Idle -> Parsing -> Fetching -> Filtering -> [Grouping] -> [Ordering]
/// -> [Limiting] -> [Projecting] -> Done`, with any stage able to move to
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStage {
    Idle,
    Parsing,
    Fetching,
    Filtering,
    Grouping,
    Ordering,
    Limiting,
    Projecting,
    Done,
    Failed,
}

impl QueryStage {
    /// Returns the string representation of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStage::Idle => "IDLE",
            QueryStage::Parsing => "PARSING",
            QueryStage::Fetching => "FETCHING",
            QueryStage::Filtering => "FILTERING",
            QueryStage::Grouping => "GROUPING",
            QueryStage::Ordering => "ORDERING",
            QueryStage::Limiting => "LIMITING",
            QueryStage::Projecting => "PROJECTING",
            QueryStage::Done => "DONE",
            QueryStage::Failed => "FAILED",
        }
    }

    /// Returns true for `Done` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryStage::Done | QueryStage::Failed)
    }

    /// Stages a successful run of `query` visits, in order
    pub fn plan_for(query: &SelectQuery) -> Vec<QueryStage> {
        let mut stages = vec![QueryStage::Parsing, QueryStage::Fetching];

        if query.form == QueryForm::Select {
            stages.push(QueryStage::Filtering);
            if query.group_by.is_some() {
                stages.push(QueryStage::Grouping);
            }
            if query.order_by.is_some() {
                stages.push(QueryStage::Ordering);
            }
            if query.limit.is_some() {
                stages.push(QueryStage::Limiting);
            }
            if query.needs_projection() {
                stages.push(QueryStage::Projecting);
            }
        }

        stages.push(QueryStage::Done);
        stages
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
