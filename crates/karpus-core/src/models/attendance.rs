use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A daily attendance summary for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AttendanceRecord {
    pub id: u64,
    pub class: String,
    pub date: NaiveDate,
    pub present: u32,
    pub total: u32,
}

impl AttendanceRecord {
    /// Percentage of students present, `None` when the class is empty.
    pub fn rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(f64::from(self.present) * 100.0 / f64::from(self.total))
        }
    }

    pub fn absent(&self) -> u32 {
        self.total.saturating_sub(self.present)
    }

    pub fn rate_display(&self) -> String {
        match self.rate() {
            Some(rate) => format!("{:.0}%", rate),
            None => "N/A".to_string(),
        }
    }
}
