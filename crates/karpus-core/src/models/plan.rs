use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status given to a plan created without one.
pub const DEFAULT_PLAN_STATUS: &str = "Pendiente";

/// An improvement plan tracked by the director.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ImprovementPlan {
    pub id: u64,
    pub title: String,
    pub class: String,
    pub owner: String,
    #[serde(default)]
    pub actions: String,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    pub status: String,
}
