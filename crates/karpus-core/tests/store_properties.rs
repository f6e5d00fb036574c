//! Behavioural checks across the cache and the store, using the public API.

use std::sync::Arc;

use chrono::Duration;
use karpus_core::cache::{TtlCache, DEFAULT_TTL_MS};
use karpus_core::models::{MessageStatus, ParticipantPair, PaymentStatus};
use karpus_core::store::{
    AverageGrade, NewImprovementPlan, NewMessage, NewNotification, NewPayment, NewPost, NewTask,
    STORE_KEY,
};
use karpus_core::{Clock, FileStorage, KarpusStore, ManualClock, MemoryStorage, Storage};
use tempfile::TempDir;

fn memory_store() -> (Arc<MemoryStorage>, Arc<ManualClock>, KarpusStore) {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::fixed());
    let store = KarpusStore::init(storage.clone(), clock.clone());
    (storage, clock, store)
}

#[test]
fn cache_expires_after_ttl_and_removes_entry() {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::fixed());
    let cache = TtlCache::attendance(storage.clone(), clock.clone(), DEFAULT_TTL_MS);

    for (key, value) in [("hoy", 1), ("Pequeños", 2), ("", 3)] {
        cache.set(key, &value).unwrap();
        assert_eq!(cache.get::<i32>(key), Some(value));
    }

    clock.advance(Duration::minutes(5) + Duration::milliseconds(1));

    for key in ["hoy", "Pequeños", ""] {
        assert_eq!(cache.get::<i32>(key), None);
        let raw = storage.get_item(&format!("attendance_cache:{}", key)).unwrap();
        assert_eq!(raw, None);
    }
}

#[test]
fn cache_invalidate_all_leaves_store_alone() {
    let (storage, clock, mut store) = memory_store();
    let cache = TtlCache::attendance(storage.clone(), clock, DEFAULT_TTL_MS);

    cache.set("hoy", &vec!["Ana"]).unwrap();
    store.add_post(NewPost::new("Grandes", "T", "x")).unwrap();

    assert_eq!(cache.invalidate_all().unwrap(), 1);
    assert!(storage.get_item(STORE_KEY).unwrap().is_some());
    assert_eq!(store.get_posts()[0].text, "x");
}

#[test]
fn ids_are_strictly_increasing_per_collection() {
    let (_, _, mut store) = memory_store();

    let mut last_post = 0;
    let mut last_task = 0;
    let mut last_notification = 0;
    let mut last_plan = 0;
    let mut last_payment = 0;

    for i in 0..5 {
        let post = store.add_post(NewPost::new("Grandes", "T", format!("p{}", i))).unwrap();
        let task = store.add_task(NewTask::new("Grandes", format!("t{}", i))).unwrap();
        let notification = store
            .add_notification(NewNotification::new("Grandes", "info", "n"))
            .unwrap();
        let plan = store
            .add_improvement_plan(NewImprovementPlan {
                title: "plan".to_string(),
                ..Default::default()
            })
            .unwrap();
        let payment = store
            .add_payment(NewPayment::new("Ana", "Grandes", "Nov", 10.0))
            .unwrap();

        assert!(post.id > last_post);
        assert!(task.id > last_task);
        assert!(notification.id > last_notification);
        assert!(plan.id > last_plan);
        assert!(payment.id > last_payment);

        last_post = post.id;
        last_task = task.id;
        last_notification = notification.id;
        last_plan = plan.id;
        last_payment = payment.id;
    }

    let snapshot = store.snapshot();
    let mut post_ids: Vec<_> = snapshot.posts.iter().map(|p| p.id).collect();
    post_ids.sort_unstable();
    post_ids.dedup();
    assert_eq!(post_ids.len(), snapshot.posts.len());
}

#[test]
fn ids_stay_unique_across_reload() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::fixed());

    let first_id = {
        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let mut store = KarpusStore::init(storage, clock.clone());
        store.add_post(NewPost::new("Grandes", "T", "antes")).unwrap().id
    };

    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let mut store = KarpusStore::init(storage, clock);
    let second_id = store.add_post(NewPost::new("Grandes", "T", "después")).unwrap().id;
    assert!(second_id > first_id);
}

#[test]
fn grading_twice_keeps_one_entry() {
    let (_, _, mut store) = memory_store();
    let task = store.add_task(NewTask::new("Pequeños", "Colores")).unwrap();

    store.grade_submission(task.id, "Ana", "8", "good").unwrap();
    store.grade_submission(task.id, "Ana", "9", "good").unwrap();

    let task = store.get_task_by_id(task.id).unwrap();
    assert_eq!(task.grades.len(), 1);
    assert_eq!(task.grade_for("Ana").unwrap().grade, "9");
}

#[test]
fn chat_thread_is_symmetric() {
    let (_, _, mut store) = memory_store();
    let ab = ParticipantPair::from(("a", "b"));
    let ba = ParticipantPair::from(("b", "a"));

    let thread = store.send_message(&ab, NewMessage::new("a", "hola")).unwrap();
    assert_eq!(store.get_thread(&ba).unwrap(), thread);
}

#[test]
fn mark_read_only_flips_other_authors() {
    let (_, _, mut store) = memory_store();
    let pair = ParticipantPair::new("a", "b");
    store.send_message(&pair, NewMessage::new("a", "1")).unwrap();
    store.send_message(&pair, NewMessage::new("b", "2")).unwrap();

    store.mark_thread_read(&pair, "b").unwrap();

    let thread = store.get_thread(&pair).unwrap();
    assert!(thread
        .messages
        .iter()
        .filter(|m| m.from != "b")
        .all(|m| m.status == MessageStatus::Read));
    assert!(thread
        .messages
        .iter()
        .filter(|m| m.from == "b")
        .all(|m| m.status == MessageStatus::Sent));
}

#[test]
fn letter_grade_only_class_reports_na() {
    let (_, _, mut store) = memory_store();
    let task = store.add_task(NewTask::new("Medianos", "Letras")).unwrap();
    store.grade_submission(task.id, "Luis", "A", "").unwrap();

    let summary = store.get_academic_summary();
    let medianos = summary.iter().find(|s| s.class == "Medianos").unwrap();
    assert_eq!(medianos.graded_tasks, 0);
    assert_eq!(medianos.average_grade, AverageGrade::NotAvailable);
    assert_eq!(medianos.average_grade.to_string(), "N/A");
}

#[test]
fn payment_summary_follows_status_changes() {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::fixed());
    let mut store = KarpusStore::init(storage, clock.clone());
    // No seed payments in this class
    let class = "Sala Verde";

    let payment = store
        .add_payment(NewPayment::new("Luis", class, "Nov", 100.0).status("pendiente"))
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    let summary = store.get_payment_summary(Some(class));
    assert_eq!(
        (summary.total, summary.pagados, summary.pendientes, summary.amount_total),
        (1, 0, 1, 100.0)
    );

    let paid = store.mark_payment_status(payment.id, "pagado").unwrap().unwrap();
    assert_eq!(paid.paid_date, Some(clock.today()));

    let summary = store.get_payment_summary(Some(class));
    assert_eq!(
        (summary.total, summary.pagados, summary.pendientes, summary.amount_total),
        (1, 1, 0, 100.0)
    );
}

#[test]
fn typing_signal_expires() {
    let (_, clock, store) = memory_store();
    let pair = ParticipantPair::new("direccion", "padres");

    store.set_typing(&pair, "padres", true).unwrap();
    assert!(store.is_typing(&pair, "padres"));

    clock.advance(Duration::seconds(4));
    assert!(!store.is_typing(&pair, "padres"));
}

#[test]
fn storage_quota_does_not_crash_store() {
    let storage = Arc::new(MemoryStorage::with_quota(16));
    let mut store = KarpusStore::init(storage.clone(), Arc::new(ManualClock::fixed()));

    assert!(store.add_post(NewPost::new("Grandes", "T", "x")).is_err());
    assert_eq!(storage.get_item(STORE_KEY).unwrap(), None);
    assert!(store.set_typing(&ParticipantPair::new("a", "b"), "a", true).is_err());
    assert!(!store.is_typing(&ParticipantPair::new("a", "b"), "a"));
}
