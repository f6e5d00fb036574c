use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::clock::{window_millis, SharedClock};
use crate::error::{StorageError, StoreResult};
use crate::models::{
    AttendanceRecord, ChatMessage, ChatThread, Comment, Contact, Grade, ImprovementPlan,
    MessageStatus, Notification, ParticipantPair, Payment, PaymentStatus, Post, Reaction,
    Submission, Task, DEFAULT_PLAN_STATUS,
};
use crate::storage::SharedStorage;

use super::requests::{
    NewAttendance, NewComment, NewImprovementPlan, NewMessage, NewNotification, NewPayment,
    NewPost, NewSubmission, NewTask, TaskUpdate,
};
use super::seed;
use super::snapshot::{bump, LegacySnapshot, Snapshot, LEGACY_STORE_KEY, STORE_KEY};
use super::summary::{ClassAcademicSummary, PaymentSummary};

/// Prefix of the ephemeral typing-indicator keys
pub const TYPING_KEY_PREFIX: &str = "karpus_typing";

/// How long a typing signal stays active after it was last set.
pub const DEFAULT_TYPING_WINDOW_MS: u64 = 3000;

/// Notification type emitted when a submission is graded
const GRADE_NOTIFICATION_KIND: &str = "grade";

/// Notification type used when a caller leaves it empty
const DEFAULT_NOTIFICATION_KIND: &str = "info";

/// Where the store's state came from at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Migrated,
    Seeded,
}

/// Local application store with write-through persistence.
///
/// Getters return owned copies; all mutation goes through the methods
/// below, each of which rewrites the snapshot to storage before returning.
/// Operations on an unknown id return `Ok(None)`.
pub struct KarpusStore {
    storage: SharedStorage,
    clock: SharedClock,
    state: Snapshot,
    source: LoadSource,
    typing_window_ms: i64,
}

impl KarpusStore {
    /// Load the store from storage, migrating or seeding as needed.
    ///
    /// Never fails: a missing or corrupt snapshot falls back to the seed
    /// dataset. A failure to write the initial snapshot is logged.
    pub fn init(storage: SharedStorage, clock: SharedClock) -> Self {
        let (state, source) = Self::load_state(&storage, &clock);
        info!(source = ?source, posts = state.posts.len(), tasks = state.tasks.len(), "Store loaded");

        let store = Self {
            storage,
            clock,
            state,
            source,
            typing_window_ms: window_millis(DEFAULT_TYPING_WINDOW_MS),
        };

        if source != LoadSource::Persisted {
            if let Err(e) = store.persist() {
                warn!(error = %e, "Failed to write initial store snapshot");
            }
        }
        store
    }

    pub fn with_typing_window(mut self, window_ms: u64) -> Self {
        self.typing_window_ms = window_millis(window_ms);
        self
    }

    fn load_state(storage: &SharedStorage, clock: &SharedClock) -> (Snapshot, LoadSource) {
        match storage.get_item(STORE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Snapshot>(&raw) {
                Ok(mut snapshot) => {
                    snapshot.repair_counters();
                    return (snapshot, LoadSource::Persisted);
                }
                Err(e) => {
                    warn!(error = %e, "Stored snapshot is corrupt, using default data");
                    return (seed::default_snapshot(clock.now()), LoadSource::Seeded);
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read stored snapshot, using default data");
                return (seed::default_snapshot(clock.now()), LoadSource::Seeded);
            }
        }

        match storage.get_item(LEGACY_STORE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<LegacySnapshot>(&raw) {
                Ok(legacy) => {
                    debug!("Migrating store from legacy schema");
                    (legacy.migrate(), LoadSource::Migrated)
                }
                Err(e) => {
                    warn!(error = %e, "Legacy snapshot is corrupt, using default data");
                    (seed::default_snapshot(clock.now()), LoadSource::Seeded)
                }
            },
            Ok(None) => (seed::default_snapshot(clock.now()), LoadSource::Seeded),
            Err(e) => {
                warn!(error = %e, "Failed to read legacy snapshot, using default data");
                (seed::default_snapshot(clock.now()), LoadSource::Seeded)
            }
        }
    }

    fn persist(&self) -> StoreResult<()> {
        let raw = serde_json::to_string(&self.state)?;
        self.storage.set_item(STORE_KEY, &raw).map_err(|e| {
            warn!(error = %e, "Failed to persist store snapshot");
            e
        })?;
        Ok(())
    }

    /// Replace everything with the seed dataset.
    pub fn reset(&mut self) -> StoreResult<()> {
        self.state = seed::default_snapshot(self.clock.now());
        self.source = LoadSource::Seeded;
        self.persist()
    }

    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// A copy of the whole entity graph.
    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    /// Today's date on the store's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.classes.clone()
    }

    // ===== Posts =====

    pub fn add_post(&mut self, new: NewPost) -> StoreResult<Post> {
        let post = Post {
            id: bump(&mut self.state.next_id.posts),
            class: new.class,
            teacher: new.teacher,
            date: self.clock.now(),
            text: new.text,
            photo: new.photo,
            video: new.video,
            doc_url: new.doc_url,
            doc_type: new.doc_type,
            comments: Vec::new(),
            reactions: Default::default(),
        };
        self.state.posts.insert(0, post.clone());
        self.persist()?;
        Ok(post)
    }

    pub fn add_comment(&mut self, post_id: u64, comment: NewComment) -> StoreResult<Option<Post>> {
        let date = self.clock.now();
        let Some(post) = self.state.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        post.comments.push(Comment {
            author: comment.author,
            text: comment.text,
            date,
        });
        let updated = post.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    pub fn react_to_post(&mut self, post_id: u64, reaction: Reaction) -> StoreResult<Option<Post>> {
        let Some(post) = self.state.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        post.reactions.apply(&reaction);
        let updated = post.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    pub fn get_posts(&self) -> Vec<Post> {
        self.state.posts.clone()
    }

    pub fn get_post(&self, id: u64) -> Option<Post> {
        self.state.posts.iter().find(|p| p.id == id).cloned()
    }

    /// Posts for `class`, most recent first.
    pub fn get_class_posts(&self, class: &str) -> Vec<Post> {
        self.state
            .posts
            .iter()
            .filter(|p| p.class == class)
            .cloned()
            .collect()
    }

    // ===== Tasks =====

    pub fn add_task(&mut self, new: NewTask) -> StoreResult<Task> {
        let publish_date = new.publish_date.unwrap_or_else(|| self.clock.today());
        let task = Task {
            id: bump(&mut self.state.next_id.tasks),
            class: new.class,
            title: new.title,
            description: new.description,
            publish_date,
            due_date: new.due_date.unwrap_or(publish_date),
            attachments: new.attachments,
            submissions: Vec::new(),
            grades: Vec::new(),
        };
        self.state.tasks.insert(0, task.clone());
        self.persist()?;
        Ok(task)
    }

    pub fn get_tasks(&self) -> Vec<Task> {
        self.state.tasks.clone()
    }

    pub fn get_tasks_for_class(&self, class: &str) -> Vec<Task> {
        self.state
            .tasks
            .iter()
            .filter(|t| t.class == class)
            .cloned()
            .collect()
    }

    pub fn get_task_by_id(&self, id: u64) -> Option<Task> {
        self.state.tasks.iter().find(|t| t.id == id).cloned()
    }

    fn task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.state.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn update_task(&mut self, id: u64, update: TaskUpdate) -> StoreResult<Option<Task>> {
        let Some(task) = self.task_mut(id) else {
            return Ok(None);
        };
        if let Some(class) = update.class {
            task.class = class;
        }
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(publish_date) = update.publish_date {
            task.publish_date = publish_date;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(attachments) = update.attachments {
            task.attachments = attachments;
        }
        let updated = task.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    pub fn submit_task(&mut self, task_id: u64, new: NewSubmission) -> StoreResult<Option<Task>> {
        let date = self.clock.now();
        let Some(task) = self.task_mut(task_id) else {
            return Ok(None);
        };
        task.submissions.push(Submission {
            parent: new.parent,
            comment: new.comment,
            file_type: new.file_type,
            files: new.files,
            date,
        });
        let updated = task.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    /// Record `grade` for `student`, replacing any earlier grade for the same
    /// student, and notify the task's class.
    pub fn grade_submission(
        &mut self,
        task_id: u64,
        student: &str,
        grade: &str,
        comment: &str,
    ) -> StoreResult<Option<Task>> {
        let date = self.clock.now();
        let Some(task) = self.task_mut(task_id) else {
            return Ok(None);
        };

        match task.grades.iter_mut().find(|g| g.student == student) {
            Some(existing) => {
                existing.grade = grade.to_string();
                existing.comment = comment.to_string();
                existing.date = date;
            }
            None => task.grades.push(Grade {
                student: student.to_string(),
                grade: grade.to_string(),
                comment: comment.to_string(),
                date,
            }),
        }
        let updated = task.clone();

        let notification = Notification {
            id: bump(&mut self.state.next_id.notifications),
            class: updated.class.clone(),
            kind: GRADE_NOTIFICATION_KIND.to_string(),
            text: format!(
                "Nueva calificación en \"{}\" para {}: {}",
                updated.title, student, grade
            ),
            date,
        };
        self.state.notifications.insert(0, notification);

        self.persist()?;
        Ok(Some(updated))
    }

    // ===== Notifications =====

    pub fn add_notification(&mut self, new: NewNotification) -> StoreResult<Notification> {
        let kind = if new.kind.is_empty() {
            DEFAULT_NOTIFICATION_KIND.to_string()
        } else {
            new.kind
        };
        let notification = Notification {
            id: bump(&mut self.state.next_id.notifications),
            class: new.class,
            kind,
            text: new.text,
            date: self.clock.now(),
        };
        self.state.notifications.insert(0, notification.clone());
        self.persist()?;
        Ok(notification)
    }

    pub fn get_notifications(&self) -> Vec<Notification> {
        self.state.notifications.clone()
    }

    /// Notifications for `class` plus the school-wide ones.
    pub fn get_notifications_for_class(&self, class: &str) -> Vec<Notification> {
        self.state
            .notifications
            .iter()
            .filter(|n| n.is_visible_to(class))
            .cloned()
            .collect()
    }

    // ===== Attendance =====

    /// Append a summary row. Its id is one past the last row's id.
    pub fn record_attendance(&mut self, new: NewAttendance) -> StoreResult<AttendanceRecord> {
        let id = self.state.attendance.last().map(|r| r.id + 1).unwrap_or(1);
        let record = AttendanceRecord {
            id,
            class: new.class,
            date: new.date.unwrap_or_else(|| self.clock.today()),
            present: new.present,
            total: new.total,
        };
        self.state.attendance.push(record.clone());
        self.persist()?;
        Ok(record)
    }

    pub fn get_attendance(&self, class: Option<&str>) -> Vec<AttendanceRecord> {
        self.state
            .attendance
            .iter()
            .filter(|r| class.map_or(true, |c| r.class == c))
            .cloned()
            .collect()
    }

    // ===== Improvement plans =====

    pub fn get_improvement_plans(&self) -> Vec<ImprovementPlan> {
        self.state.plans.clone()
    }

    pub fn add_improvement_plan(&mut self, new: NewImprovementPlan) -> StoreResult<ImprovementPlan> {
        let plan = ImprovementPlan {
            id: bump(&mut self.state.next_id.plans),
            title: new.title,
            class: new.class,
            owner: new.owner,
            actions: new.actions,
            due: new.due,
            status: new
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PLAN_STATUS.to_string()),
        };
        self.state.plans.insert(0, plan.clone());
        self.persist()?;
        Ok(plan)
    }

    pub fn set_plan_status(&mut self, id: u64, status: &str) -> StoreResult<Option<ImprovementPlan>> {
        let Some(plan) = self.state.plans.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        plan.status = status.to_string();
        let updated = plan.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    // ===== Payments =====

    pub fn add_payment(&mut self, new: NewPayment) -> StoreResult<Payment> {
        let status = new.status.unwrap_or_default();
        let paid_date = status.is_paid().then(|| self.clock.today());
        let payment = Payment {
            id: bump(&mut self.state.next_id.payments),
            student: new.student,
            class: new.class,
            month: new.month,
            amount: if new.amount.is_finite() { new.amount } else { 0.0 },
            status,
            due_date: new.due_date,
            paid_date,
            notes: new.notes,
        };
        self.state.payments.insert(0, payment.clone());
        self.persist()?;
        Ok(payment)
    }

    /// Set a payment's status. Paid stamps today's date, anything else
    /// clears the paid date.
    pub fn mark_payment_status(
        &mut self,
        id: u64,
        status: impl Into<PaymentStatus>,
    ) -> StoreResult<Option<Payment>> {
        let today = self.clock.today();
        let Some(payment) = self.state.payments.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        payment.status = status.into();
        payment.paid_date = payment.status.is_paid().then_some(today);
        let updated = payment.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    pub fn get_payments(&self) -> Vec<Payment> {
        self.state.payments.clone()
    }

    pub fn get_payments_by_class(&self, class: &str) -> Vec<Payment> {
        self.state
            .payments
            .iter()
            .filter(|p| p.class == class)
            .cloned()
            .collect()
    }

    /// Totals over one class's payments, or over all payments.
    pub fn get_payment_summary(&self, class: Option<&str>) -> PaymentSummary {
        PaymentSummary::from_payments(
            self.state
                .payments
                .iter()
                .filter(|p| class.map_or(true, |c| p.class == c)),
        )
    }

    // ===== Academic summary =====

    /// Known classes: the configured list, then any other class seen on a
    /// task, in first-seen order.
    fn known_classes(&self) -> Vec<String> {
        let mut classes = self.state.classes.clone();
        for task in &self.state.tasks {
            if !classes.contains(&task.class) {
                classes.push(task.class.clone());
            }
        }
        classes
    }

    pub fn get_academic_summary(&self) -> Vec<ClassAcademicSummary> {
        self.known_classes()
            .iter()
            .map(|class| ClassAcademicSummary::for_class(class, &self.state.tasks))
            .collect()
    }

    // ===== Contacts =====

    pub fn get_contacts(&self) -> Vec<Contact> {
        self.state.contacts.clone()
    }

    // ===== Chat =====

    fn thread_index(&self, participants: &ParticipantPair) -> Option<usize> {
        self.state
            .threads
            .iter()
            .position(|t| &t.participants == participants)
    }

    /// Index of the thread for `participants`, creating it if needed.
    /// Returns whether a thread was created.
    fn ensure_thread(&mut self, participants: &ParticipantPair) -> (usize, bool) {
        if let Some(index) = self.thread_index(participants) {
            return (index, false);
        }
        let thread = ChatThread {
            id: bump(&mut self.state.next_id.threads),
            participants: participants.clone(),
            messages: Vec::new(),
        };
        debug!(thread = thread.id, "Created chat thread");
        self.state.threads.push(thread);
        (self.state.threads.len() - 1, true)
    }

    /// The thread between two participants, created on first access.
    pub fn get_thread(&mut self, participants: &ParticipantPair) -> StoreResult<ChatThread> {
        let (index, created) = self.ensure_thread(participants);
        let thread = self.state.threads[index].clone();
        if created {
            self.persist()?;
        }
        Ok(thread)
    }

    /// Threads `user` takes part in, most recent activity first.
    pub fn get_threads_for(&self, user: &str) -> Vec<ChatThread> {
        let mut threads: Vec<ChatThread> = self
            .state
            .threads
            .iter()
            .filter(|t| t.participants.contains(user))
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        threads
    }

    pub fn send_message(
        &mut self,
        participants: &ParticipantPair,
        new: NewMessage,
    ) -> StoreResult<ChatThread> {
        let (index, _) = self.ensure_thread(participants);
        let message = ChatMessage {
            id: bump(&mut self.state.next_id.messages),
            from: new.from,
            text: new.text,
            date: self.clock.now(),
            status: MessageStatus::Sent,
            seen_at: None,
        };
        self.state.threads[index].messages.push(message);
        let thread = self.state.threads[index].clone();
        self.persist()?;
        Ok(thread)
    }

    /// Mark every message not written by `reader` as read. Only writes to
    /// storage when something changed. Returns the number of messages marked.
    pub fn mark_thread_read(
        &mut self,
        participants: &ParticipantPair,
        reader: &str,
    ) -> StoreResult<usize> {
        let now = self.clock.now();
        let Some(index) = self.thread_index(participants) else {
            return Ok(0);
        };

        let mut changed = 0;
        for message in &mut self.state.threads[index].messages {
            if message.is_unread_by(reader) {
                message.status = MessageStatus::Read;
                message.seen_at = Some(now);
                changed += 1;
            }
        }

        if changed > 0 {
            self.persist()?;
        }
        Ok(changed)
    }

    pub fn unread_count(&self, participants: &ParticipantPair, reader: &str) -> usize {
        self.thread_index(participants)
            .map(|i| self.state.threads[i].unread_count(reader))
            .unwrap_or(0)
    }

    // ===== Typing indicator =====

    fn typing_key(participants: &ParticipantPair, user: &str) -> String {
        format!("{}_{}_{}", TYPING_KEY_PREFIX, participants.key_fragment(), user)
    }

    /// Publish or clear the typing signal of `user` in a thread. Kept apart
    /// from the snapshot; callers may ignore the result.
    pub fn set_typing(
        &self,
        participants: &ParticipantPair,
        user: &str,
        is_typing: bool,
    ) -> Result<(), StorageError> {
        let value = if is_typing {
            self.clock.now_millis().to_string()
        } else {
            "0".to_string()
        };
        self.storage
            .set_item(&Self::typing_key(participants, user), &value)
            .map_err(|e| {
                debug!(user, error = %e, "Failed to write typing indicator");
                e
            })
    }

    /// Whether `user` signalled typing within the typing window.
    pub fn is_typing(&self, participants: &ParticipantPair, user: &str) -> bool {
        let raw = match self.storage.get_item(&Self::typing_key(participants, user)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                debug!(user, error = %e, "Failed to read typing indicator");
                return false;
            }
        };

        match raw.trim().parse::<i64>() {
            Ok(0) | Err(_) => false,
            Ok(ts) => {
                let elapsed = self.clock.now_millis().saturating_sub(ts);
                elapsed >= 0 && elapsed <= self.typing_window_ms
            }
        }
    }
}
