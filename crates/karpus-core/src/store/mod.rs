//! Local application store.
//!
//! `KarpusStore` holds the school's feed, tasks, notifications, attendance
//! summaries, improvement plans, payments and chat threads as one snapshot
//! in the shared storage (`karpus_store_v2`). Every mutation writes the
//! whole snapshot back immediately.
//!
//! On init the store reads the current snapshot, migrates a v1 snapshot if
//! that is all there is, and otherwise starts from a built-in dataset.

pub mod karpus;
pub mod requests;
pub mod seed;
pub mod snapshot;
pub mod summary;

pub use karpus::{KarpusStore, LoadSource, DEFAULT_TYPING_WINDOW_MS, TYPING_KEY_PREFIX};
pub use requests::{
    NewAttendance, NewComment, NewImprovementPlan, NewMessage, NewNotification, NewPayment,
    NewPost, NewSubmission, NewTask, TaskUpdate,
};
pub use snapshot::{NextIds, Snapshot, LEGACY_STORE_KEY, STORE_KEY};
pub use summary::{AverageGrade, ClassAcademicSummary, PaymentSummary};
