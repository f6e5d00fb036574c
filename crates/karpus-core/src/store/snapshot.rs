//! Persisted shape of the store and migration from the v1 schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    AttendanceRecord, ChatThread, Contact, ImprovementPlan, Notification, Payment, Post,
    Reactions, Task,
};

use super::seed;

/// Storage key of the current schema
pub const STORE_KEY: &str = "karpus_store_v2";

/// Storage key of the previous schema, read once for migration and never deleted
pub const LEGACY_STORE_KEY: &str = "karpus_store_v1";

/// Per-collection id counters. Each holds the next id to hand out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextIds {
    pub posts: u64,
    pub tasks: u64,
    pub notifications: u64,
    pub plans: u64,
    pub payments: u64,
    pub threads: u64,
    pub messages: u64,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            posts: 1,
            tasks: 1,
            notifications: 1,
            plans: 1,
            payments: 1,
            threads: 1,
            messages: 1,
        }
    }
}

/// Hand out the counter's value and advance it.
pub(crate) fn bump(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter += 1;
    id
}

fn after_max(counter: &mut u64, ids: impl Iterator<Item = u64>) {
    if let Some(max) = ids.max() {
        *counter = (*counter).max(max + 1);
    }
}

/// The whole entity graph as written to storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub posts: Vec<Post>,
    pub tasks: Vec<Task>,
    pub notifications: Vec<Notification>,
    pub attendance: Vec<AttendanceRecord>,
    pub plans: Vec<ImprovementPlan>,
    pub payments: Vec<Payment>,
    pub contacts: Vec<Contact>,
    pub threads: Vec<ChatThread>,
    pub classes: Vec<String>,
    pub next_id: NextIds,
}

impl Snapshot {
    /// Make every counter point past the largest id already in use.
    pub fn repair_counters(&mut self) {
        let ids = &mut self.next_id;
        after_max(&mut ids.posts, self.posts.iter().map(|p| p.id));
        after_max(&mut ids.tasks, self.tasks.iter().map(|t| t.id));
        after_max(&mut ids.notifications, self.notifications.iter().map(|n| n.id));
        after_max(&mut ids.plans, self.plans.iter().map(|p| p.id));
        after_max(&mut ids.payments, self.payments.iter().map(|p| p.id));
        after_max(&mut ids.threads, self.threads.iter().map(|t| t.id));
        after_max(
            &mut ids.messages,
            self.threads.iter().flat_map(|t| t.messages.iter().map(|m| m.id)),
        );
    }
}

// ============================================================================
// v1 schema
// ============================================================================

/// v1 posts kept a bare like counter and no comments or media besides a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyPost {
    pub id: u64,
    pub class: String,
    #[serde(default)]
    pub teacher: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub likes: u32,
}

/// v1 tasks had no attachments, submissions or grades.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyTask {
    pub id: u64,
    pub class: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    pub publish: NaiveDate,
    pub due: NaiveDate,
}

/// v1 notifications could omit their type.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyNotification {
    pub id: u64,
    pub class: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub text: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacySnapshot {
    pub posts: Vec<LegacyPost>,
    pub tasks: Vec<LegacyTask>,
    pub notifications: Vec<LegacyNotification>,
    pub attendance: Vec<AttendanceRecord>,
}

impl From<LegacyPost> for Post {
    fn from(old: LegacyPost) -> Self {
        Post {
            id: old.id,
            class: old.class,
            teacher: old.teacher,
            date: old.date,
            text: old.text,
            photo: old.photo,
            video: None,
            doc_url: None,
            doc_type: None,
            comments: Vec::new(),
            reactions: Reactions {
                likes: old.likes,
                ..Default::default()
            },
        }
    }
}

impl From<LegacyTask> for Task {
    fn from(old: LegacyTask) -> Self {
        Task {
            id: old.id,
            class: old.class,
            title: old.title,
            description: old.desc,
            publish_date: old.publish,
            due_date: old.due,
            attachments: Vec::new(),
            submissions: Vec::new(),
            grades: Vec::new(),
        }
    }
}

impl From<LegacyNotification> for Notification {
    fn from(old: LegacyNotification) -> Self {
        Notification {
            id: old.id,
            class: old.class,
            kind: old.kind.unwrap_or_else(|| "info".to_string()),
            text: old.text,
            date: old.date,
        }
    }
}

impl LegacySnapshot {
    /// Reshape v1 data into the current schema. Collections v1 did not have
    /// start empty, except contacts and classes which come from the seed.
    pub fn migrate(self) -> Snapshot {
        let mut snapshot = Snapshot {
            posts: self.posts.into_iter().map(Post::from).collect(),
            tasks: self.tasks.into_iter().map(Task::from).collect(),
            notifications: self.notifications.into_iter().map(Notification::from).collect(),
            attendance: self.attendance,
            contacts: seed::contacts(),
            classes: seed::classes(),
            ..Default::default()
        };
        snapshot.repair_counters();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump() {
        let mut counter = 5;
        assert_eq!(bump(&mut counter), 5);
        assert_eq!(bump(&mut counter), 6);
        assert_eq!(counter, 7);
    }

    #[test]
    fn test_snapshot_uses_next_id_key() {
        let out = serde_json::to_value(Snapshot::default()).unwrap();
        assert_eq!(out["nextId"]["posts"], 1);
        assert!(out["posts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_missing_counters_default() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"nextId":{"posts":9}}"#).unwrap();
        assert_eq!(snapshot.next_id.posts, 9);
        assert_eq!(snapshot.next_id.tasks, 1);
    }

    #[test]
    fn test_migrate_v1() {
        let json = r#"{
            "posts": [{"id": 4, "class": "Pequeños", "teacher": "Ana", "date": "2024-10-01T10:00:00Z", "text": "Hola", "likes": 3}],
            "tasks": [{"id": 7, "class": "Pequeños", "title": "Colores", "desc": "Pintar", "publish": "2024-10-01", "due": "2024-10-05"}],
            "notifications": [{"id": 2, "class": "General", "text": "Feriado", "date": "2024-10-01T10:00:00Z"}],
            "attendance": [{"id": 1, "class": "Pequeños", "date": "2024-10-01", "present": 10, "total": 12}]
        }"#;
        let legacy: LegacySnapshot = serde_json::from_str(json).unwrap();
        let snapshot = legacy.migrate();

        assert_eq!(snapshot.posts[0].reactions.likes, 3);
        assert!(snapshot.posts[0].comments.is_empty());
        assert_eq!(snapshot.tasks[0].description, "Pintar");
        assert!(snapshot.tasks[0].grades.is_empty());
        assert_eq!(snapshot.notifications[0].kind, "info");
        assert_eq!(snapshot.attendance.len(), 1);
        assert!(!snapshot.contacts.is_empty());

        assert_eq!(snapshot.next_id.posts, 5);
        assert_eq!(snapshot.next_id.tasks, 8);
        assert_eq!(snapshot.next_id.notifications, 3);
        assert_eq!(snapshot.next_id.payments, 1);
    }
}
