use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Payment state as stored: `"pagado"`, `"pendiente"`, or any other text
/// the front end wrote. Anything but `Paid` counts as pending in summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Paid => "pagado",
            PaymentStatus::Pending => "pendiente",
            PaymentStatus::Other(s) => s.as_str(),
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pagado" => PaymentStatus::Paid,
            "pendiente" => PaymentStatus::Pending,
            _ => PaymentStatus::Other(s),
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(s: &str) -> Self {
        PaymentStatus::from(s.to_string())
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: u64,
    pub student: String,
    pub class: String,
    pub month: String,
    pub amount: f64,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: PaymentStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_string() {
        assert_eq!(PaymentStatus::from("pagado"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from("Pagado "), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from("pendiente"), PaymentStatus::Pending);
        assert_eq!(
            PaymentStatus::from("vencido"),
            PaymentStatus::Other("vencido".to_string())
        );
    }

    #[test]
    fn test_status_round_trips_unknown_values() {
        let status: PaymentStatus = serde_json::from_str("\"parcial\"").unwrap();
        assert!(!status.is_paid());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"parcial\"");
    }

    #[test]
    fn test_payment_wire_names() {
        let json = r#"{"id":1,"student":"Luis","class":"Pequeños","month":"Nov","amount":100,"status":"pagado","dueDate":"2024-11-10","paidDate":"2024-11-04","notes":""}"#;
        let payment: Payment = serde_json::from_str(json).unwrap();
        assert!(payment.status.is_paid());
        assert_eq!(payment.paid_date, NaiveDate::from_ymd_opt(2024, 11, 4));
        assert_eq!(payment.amount, 100.0);
    }
}
