//! Aggregate views over payments and grades.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::models::{Payment, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total: usize,
    pub pagados: usize,
    /// `total - pagados`: every status other than paid counts here.
    pub pendientes: usize,
    pub amount_total: f64,
}

impl PaymentSummary {
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        let mut summary = Self::default();
        for payment in payments {
            summary.total += 1;
            if payment.status.is_paid() {
                summary.pagados += 1;
            }
            summary.amount_total += payment.amount;
        }
        summary.pendientes = summary.total - summary.pagados;
        summary
    }
}

/// Average of the numeric grades of a class; `NotAvailable` when it has none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageGrade {
    Value(f64),
    NotAvailable,
}

impl AverageGrade {
    pub fn value(&self) -> Option<f64> {
        match self {
            AverageGrade::Value(v) => Some(*v),
            AverageGrade::NotAvailable => None,
        }
    }
}

impl fmt::Display for AverageGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageGrade::Value(v) => write!(f, "{:.1}", v),
            AverageGrade::NotAvailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for AverageGrade {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAcademicSummary {
    pub class: String,
    pub average_grade: AverageGrade,
    /// Number of numeric grades across the class's tasks
    pub graded_tasks: usize,
    /// Distinct students with at least one numeric grade
    pub students: usize,
}

impl ClassAcademicSummary {
    pub fn for_class<'a>(class: &str, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut students = BTreeSet::new();

        for task in tasks.into_iter().filter(|t| t.class == class) {
            for grade in &task.grades {
                if let Some(value) = grade.numeric() {
                    sum += value;
                    count += 1;
                    students.insert(grade.student.as_str());
                }
            }
        }

        let average_grade = if count == 0 {
            AverageGrade::NotAvailable
        } else {
            AverageGrade::Value((sum / count as f64 * 10.0).round() / 10.0)
        };

        Self {
            class: class.to_string(),
            average_grade,
            graded_tasks: count,
            students: students.len(),
        }
    }
}
