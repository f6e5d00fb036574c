//! Typed inputs for store operations.
//!
//! Each struct lists every field a caller may provide. Fields left at their
//! `Default` get the store's defaults (ids, dates, statuses).

use chrono::NaiveDate;

use crate::models::{Attachment, FileRef, PaymentStatus};
use crate::utils::parse_amount;

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub class: String,
    pub teacher: String,
    pub text: String,
    pub photo: Option<String>,
    pub video: Option<String>,
    pub doc_url: Option<String>,
    pub doc_type: Option<String>,
}

impl NewPost {
    pub fn new(class: impl Into<String>, teacher: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            teacher: teacher.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo = Some(url.into());
        self
    }

    pub fn with_document(mut self, url: impl Into<String>, doc_type: impl Into<String>) -> Self {
        self.doc_url = Some(url.into());
        self.doc_type = Some(doc_type.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub author: String,
    pub text: String,
}

impl NewComment {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

/// `publish_date` defaults to today; `due_date` defaults to the publish date.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub class: String,
    pub title: String,
    pub description: String,
    pub publish_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub attachments: Vec<Attachment>,
}

impl NewTask {
    pub fn new(class: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }
}

/// Fields to overwrite on an existing task; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub class: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
    pub parent: String,
    pub comment: String,
    pub file_type: String,
    pub files: Vec<FileRef>,
}

impl NewSubmission {
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            ..Default::default()
        }
    }
}

/// `kind` defaults to "info" when empty.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub class: String,
    pub kind: String,
    pub text: String,
}

impl NewNotification {
    pub fn new(class: impl Into<String>, kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            kind: kind.into(),
            text: text.into(),
        }
    }
}

/// `date` defaults to today.
#[derive(Debug, Clone, Default)]
pub struct NewAttendance {
    pub class: String,
    pub present: u32,
    pub total: u32,
    pub date: Option<NaiveDate>,
}

impl NewAttendance {
    pub fn new(class: impl Into<String>, present: u32, total: u32) -> Self {
        Self {
            class: class.into(),
            present,
            total,
            date: None,
        }
    }
}

/// `status` defaults to "Pendiente".
#[derive(Debug, Clone, Default)]
pub struct NewImprovementPlan {
    pub title: String,
    pub class: String,
    pub owner: String,
    pub actions: String,
    pub due: Option<NaiveDate>,
    pub status: Option<String>,
}

/// `status` defaults to pending.
#[derive(Debug, Clone, Default)]
pub struct NewPayment {
    pub student: String,
    pub class: String,
    pub month: String,
    pub amount: f64,
    pub status: Option<PaymentStatus>,
    pub due_date: Option<NaiveDate>,
    pub notes: String,
}

impl NewPayment {
    pub fn new(
        student: impl Into<String>,
        class: impl Into<String>,
        month: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            student: student.into(),
            class: class.into(),
            month: month.into(),
            amount,
            ..Default::default()
        }
    }

    /// Set the amount from user-typed text; unparseable text becomes 0.
    pub fn amount_text(mut self, raw: &str) -> Self {
        self.amount = parse_amount(raw);
        self
    }

    pub fn status(mut self, status: impl Into<PaymentStatus>) -> Self {
        self.status = Some(status.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub from: String,
    pub text: String,
}

impl NewMessage {
    pub fn new(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            text: text.into(),
        }
    }
}
