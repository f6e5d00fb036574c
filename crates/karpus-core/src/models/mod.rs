//! Data models for Karpus Kids entities.
//!
//! This module contains the records held by the local store:
//!
//! - `Post`, `Comment`, `Reactions`: class feed entries
//! - `Task`, `Submission`, `Grade`: homework and grading
//! - `Notification`: class and school-wide notices
//! - `AttendanceRecord`: daily attendance summaries
//! - `ImprovementPlan`: director improvement plans
//! - `Payment`, `PaymentStatus`: tuition payments
//! - `Contact`, `ChatThread`, `ChatMessage`: private messaging
//!
//! All records serialize with camelCase field names, matching what the web
//! front end reads.

pub mod attendance;
pub mod chat;
pub mod notification;
pub mod payment;
pub mod plan;
pub mod post;
pub mod task;

pub use attendance::AttendanceRecord;
pub use chat::{ChatMessage, ChatThread, Contact, MessageStatus, ParticipantPair};
pub use notification::{Notification, GENERAL_CLASS};
pub use payment::{Payment, PaymentStatus};
pub use plan::{ImprovementPlan, DEFAULT_PLAN_STATUS};
pub use post::{Comment, Post, Reaction, Reactions};
pub use task::{Attachment, FileRef, Grade, Submission, Task};
