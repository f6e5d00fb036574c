use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Class value meaning "visible to every class".
pub const GENERAL_CLASS: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Notification {
    pub id: u64,
    pub class: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

impl Notification {
    /// Whether a member of `class` should see this notification.
    pub fn is_visible_to(&self, class: &str) -> bool {
        self.class == class || self.class == GENERAL_CLASS
    }
}
