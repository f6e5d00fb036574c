use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::parse_numeric_grade;

/// A homework assignment for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Task {
    pub id: u64,
    pub class: String,
    pub title: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(rename = "publish")]
    pub publish_date: NaiveDate,
    #[serde(rename = "due")]
    pub due_date: NaiveDate,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Task {
    pub fn grade_for(&self, student: &str) -> Option<&Grade> {
        self.grades.iter().find(|g| g.student == student)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Attachment {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A file a parent uploaded with a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct FileRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub parent: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub files: Vec<FileRef>,
    pub date: DateTime<Utc>,
}

/// A grade for one student, unique by student name within a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Grade {
    pub student: String,
    pub grade: String,
    #[serde(default)]
    pub comment: String,
    pub date: DateTime<Utc>,
}

impl Grade {
    /// The grade as a number, `None` for letter grades.
    pub fn numeric(&self) -> Option<f64> {
        parse_numeric_grade(&self.grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            id: 1,
            class: "Pequeños".to_string(),
            title: "Colores".to_string(),
            description: String::new(),
            publish_date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 11, 8).unwrap(),
            attachments: vec![],
            submissions: vec![],
            grades: vec![],
        }
    }

    #[test]
    fn test_is_overdue() {
        let t = task();
        assert!(!t.is_overdue(NaiveDate::from_ymd_opt(2024, 11, 8).unwrap()));
        assert!(t.is_overdue(NaiveDate::from_ymd_opt(2024, 11, 9).unwrap()));
    }

    #[test]
    fn test_task_wire_names() {
        let out = serde_json::to_value(task()).unwrap();
        assert_eq!(out["desc"], "");
        assert_eq!(out["publish"], "2024-11-01");
        assert_eq!(out["due"], "2024-11-08");
    }

    #[test]
    fn test_grade_numeric() {
        let grade = Grade {
            student: "Ana".to_string(),
            grade: "A".to_string(),
            comment: String::new(),
            date: Utc::now(),
        };
        assert_eq!(grade.numeric(), None);
    }
}
