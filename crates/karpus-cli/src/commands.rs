//! Command parsing and the text views printed for each command.

use std::io::Write;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use karpus_core::models::{AttendanceRecord, ParticipantPair};
use karpus_core::store::{NewAttendance, NewMessage};
use karpus_core::utils::{format_amount, truncate_string};
use karpus_core::{Config, KarpusStore, TtlCache};

/// Maximum characters of post text shown per feed line
const FEED_TEXT_WIDTH: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "karpus")]
#[command(about = "Karpus Kids - local school data from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Payment and academic overview
    Summary,

    /// List payments, optionally for one class
    Payments {
        class: Option<String>,
    },

    /// Set a payment status (pagado, pendiente, ...)
    Pay {
        id: u64,
        status: String,
    },

    /// Posts for a class
    Feed {
        class: String,
    },

    /// Tasks for a class, flagging the overdue ones
    Tasks {
        class: String,
    },

    /// Notifications visible to a class
    Notifications {
        class: String,
    },

    /// Attendance summaries (cached)
    Attendance {
        class: String,
    },

    /// Record a day's attendance for a class
    RecordAttendance {
        class: String,
        present: u32,
        total: u32,
    },

    /// Chat contacts
    Contacts,

    /// Show a thread and mark it read for the default user
    Chat {
        a: String,
        b: String,
    },

    /// Send a chat message
    Send {
        from: String,
        to: String,
        /// Message text (remaining words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Restore the built-in dataset
    Reset,
}

pub fn run(
    command: Command,
    store: &mut KarpusStore,
    cache: &TtlCache,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    debug!(?command, "Running command");

    match command {
        Command::Summary => summary(store, out),
        Command::Payments { class } => payments(store, class.as_deref(), out),
        Command::Pay { id, status } => match store.mark_payment_status(id, status.as_str())? {
            Some(payment) => {
                writeln!(
                    out,
                    "Payment #{} ({} {}) is now {}",
                    payment.id, payment.student, payment.month, payment.status
                )?;
                Ok(())
            }
            None => bail!("no payment with id {}", id),
        },
        Command::Feed { class } => feed(store, &class, out),
        Command::Tasks { class } => tasks(store, &class, out),
        Command::Notifications { class } => {
            for n in store.get_notifications_for_class(&class) {
                writeln!(
                    out,
                    "{}  [{}] {} ({})",
                    n.date.format("%Y-%m-%d"),
                    n.kind,
                    n.text,
                    n.class
                )?;
            }
            Ok(())
        }
        Command::Attendance { class } => attendance(store, cache, &class, out),
        Command::RecordAttendance {
            class,
            present,
            total,
        } => {
            let record = store.record_attendance(NewAttendance::new(&class, present, total))?;
            // The cached list for this class no longer matches the store
            let _ = cache.invalidate(&class);
            writeln!(
                out,
                "Recorded {}: {}/{} present ({})",
                record.class,
                record.present,
                record.total,
                record.rate_display()
            )?;
            Ok(())
        }
        Command::Contacts => {
            for contact in store.get_contacts() {
                writeln!(out, "{:<20} {}", contact.id, contact.name)?;
            }
            Ok(())
        }
        Command::Chat { a, b } => chat(store, config, ParticipantPair::new(a, b), out),
        Command::Send { from, to, text } => {
            let pair = ParticipantPair::new(from.as_str(), to.as_str());
            let thread = store.send_message(&pair, NewMessage::new(from.as_str(), text.join(" ")))?;
            let _ = store.set_typing(&pair, &from, false);
            writeln!(
                out,
                "Sent to {} (thread #{}, {} messages)",
                to,
                thread.id,
                thread.messages.len()
            )?;
            Ok(())
        }
        Command::Reset => {
            store.reset()?;
            let _ = cache.invalidate_all();
            writeln!(out, "Store restored to the built-in dataset")?;
            Ok(())
        }
    }
}

fn summary(store: &KarpusStore, out: &mut impl Write) -> Result<()> {
    let totals = store.get_payment_summary(None);
    writeln!(out, "Payments")?;
    writeln!(
        out,
        "  {} total, {} paid, {} pending, {}",
        totals.total,
        totals.pagados,
        totals.pendientes,
        format_amount(totals.amount_total)
    )?;

    writeln!(out, "Academics")?;
    for class in store.get_academic_summary() {
        writeln!(
            out,
            "  {:<12} average {:>4}  grades {:>3}  students {:>3}",
            class.class,
            class.average_grade.to_string(),
            class.graded_tasks,
            class.students
        )?;
    }
    Ok(())
}

fn payments(store: &KarpusStore, class: Option<&str>, out: &mut impl Write) -> Result<()> {
    let list = match class {
        Some(class) => store.get_payments_by_class(class),
        None => store.get_payments(),
    };
    for p in &list {
        let paid = p
            .paid_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "#{:<4} {:<12} {:<10} {:<10} {:>10} {:<10} {}",
            p.id,
            p.student,
            p.class,
            p.month,
            format_amount(p.amount),
            p.status.as_str(),
            paid
        )?;
    }

    let totals = store.get_payment_summary(class);
    writeln!(
        out,
        "{} payments, {} paid, {} pending, {}",
        totals.total,
        totals.pagados,
        totals.pendientes,
        format_amount(totals.amount_total)
    )?;
    Ok(())
}

fn feed(store: &KarpusStore, class: &str, out: &mut impl Write) -> Result<()> {
    let posts = store.get_class_posts(class);
    if posts.is_empty() {
        writeln!(out, "No posts for {}", class)?;
    }
    for post in posts {
        let media = if post.has_media() { " [media]" } else { "" };
        writeln!(
            out,
            "#{} {} {}: {}{}",
            post.id,
            post.date.format("%Y-%m-%d %H:%M"),
            post.teacher,
            truncate_string(&post.text, FEED_TEXT_WIDTH),
            media
        )?;
        writeln!(
            out,
            "    {} likes, {} reactions, {} comments",
            post.reactions.likes,
            post.reactions.total(),
            post.comments.len()
        )?;
    }
    Ok(())
}

fn tasks(store: &KarpusStore, class: &str, out: &mut impl Write) -> Result<()> {
    let today = store.today();
    let list = store.get_tasks_for_class(class);
    if list.is_empty() {
        writeln!(out, "No tasks for {}", class)?;
    }
    for task in &list {
        let overdue = if task.is_overdue(today) { " (overdue)" } else { "" };
        writeln!(
            out,
            "#{} {} due {}{}  {} submissions, {} grades",
            task.id,
            task.title,
            task.due_date,
            overdue,
            task.submissions.len(),
            task.grades.len()
        )?;
    }
    Ok(())
}

fn attendance(
    store: &KarpusStore,
    cache: &TtlCache,
    class: &str,
    out: &mut impl Write,
) -> Result<()> {
    let records: Vec<AttendanceRecord> = cache
        .get_or_fetch(class, || Ok::<_, anyhow::Error>(store.get_attendance(Some(class))))?;

    for record in &records {
        writeln!(
            out,
            "{}  {:>3}/{:<3} {:>4}  {} absent",
            record.date,
            record.present,
            record.total,
            record.rate_display(),
            record.absent()
        )?;
    }
    writeln!(
        out,
        "{} records (cached {})",
        records.len(),
        cache.age_display(class)
    )?;
    Ok(())
}

fn chat(
    store: &mut KarpusStore,
    config: &Config,
    pair: ParticipantPair,
    out: &mut impl Write,
) -> Result<()> {
    let thread = store.get_thread(&pair)?;
    for message in &thread.messages {
        writeln!(
            out,
            "{} {}: {} [{:?}]",
            message.date.format("%Y-%m-%d %H:%M"),
            message.from,
            message.text,
            message.status
        )?;
    }

    if let Some(reader) = config.default_user.as_deref().filter(|u| pair.contains(u)) {
        let marked = store.mark_thread_read(&pair, reader)?;
        debug!(reader, marked, "Marked thread read");
        if let Some(other) = pair.other(reader) {
            if store.is_typing(&pair, other) {
                writeln!(out, "{} is typing...", other)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use karpus_core::store::{NewPost, NewTask};
    use karpus_core::{ManualClock, MemoryStorage};
    use std::sync::Arc;

    fn parse(line: &str) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("karpus").chain(line.split_whitespace()))
            .map(|cli| cli.command)
    }

    fn setup() -> (KarpusStore, TtlCache) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::fixed());
        let store = KarpusStore::init(storage.clone(), clock.clone());
        let cache = TtlCache::attendance(storage, clock, 300_000);
        (store, cache)
    }

    fn run_to_string(command: Command, store: &mut KarpusStore, cache: &TtlCache) -> String {
        let mut out = Vec::new();
        run(command, store, cache, &Config::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("payments").unwrap(), Command::Payments { class: None });
        assert_eq!(
            parse("pay 3 pagado").unwrap(),
            Command::Pay {
                id: 3,
                status: "pagado".to_string()
            }
        );
        assert_eq!(
            parse("record-attendance Grandes 18 20").unwrap(),
            Command::RecordAttendance {
                class: "Grandes".to_string(),
                present: 18,
                total: 20
            }
        );
        assert_eq!(
            parse("send direccion padres Hola a todos").unwrap(),
            Command::Send {
                from: "direccion".to_string(),
                to: "padres".to_string(),
                text: vec!["Hola".to_string(), "a".to_string(), "todos".to_string()]
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("pay x pagado").is_err());
        assert!(parse("feed").is_err());
        assert!(parse("send a b").is_err());
        assert!(parse("dance").is_err());
    }

    #[test]
    fn test_send_joins_words() {
        let (mut store, cache) = setup();
        let command = parse("send direccion padres Hola a todos").unwrap();
        run_to_string(command, &mut store, &cache);

        let thread = store
            .get_thread(&ParticipantPair::new("direccion", "padres"))
            .unwrap();
        assert_eq!(thread.messages.last().unwrap().text, "Hola a todos");
    }

    #[test]
    fn test_feed_marks_posts_with_media() {
        let (mut store, cache) = setup();
        store
            .add_post(NewPost::new("Sala Azul", "Maestra", "Foto del paseo").with_photo("paseo.jpg"))
            .unwrap();
        store
            .add_post(NewPost::new("Sala Azul", "Maestra", "Solo texto"))
            .unwrap();

        let output = run_to_string(
            Command::Feed {
                class: "Sala Azul".to_string(),
            },
            &mut store,
            &cache,
        );
        let media: Vec<&str> = output.lines().filter(|l| l.contains("[media]")).collect();
        assert_eq!(media.len(), 1);
        assert!(media[0].contains("Foto del paseo"));
    }

    #[test]
    fn test_tasks_flags_overdue() {
        let (mut store, cache) = setup();
        let yesterday = store.today().pred_opt().unwrap();
        store
            .add_task(NewTask::new("Grandes", "Tarea vencida").due(yesterday))
            .unwrap();

        let output = run_to_string(
            Command::Tasks {
                class: "Grandes".to_string(),
            },
            &mut store,
            &cache,
        );
        let overdue: Vec<&str> = output.lines().filter(|l| l.contains("(overdue)")).collect();
        assert_eq!(overdue.len(), 1);
        assert!(overdue[0].contains("Tarea vencida"));
    }

    #[test]
    fn test_pay_updates_store() {
        let (mut store, cache) = setup();
        let id = store.get_payments()[0].id;

        let output = run_to_string(
            Command::Pay {
                id,
                status: "pagado".to_string(),
            },
            &mut store,
            &cache,
        );
        assert!(output.contains("is now pagado"));
        assert!(store.get_payments()[0].status.is_paid());
    }

    #[test]
    fn test_attendance_is_served_from_cache() {
        let (mut store, cache) = setup();
        store
            .record_attendance(NewAttendance::new("Grandes", 18, 20))
            .unwrap();

        let output = run_to_string(
            Command::Attendance {
                class: "Grandes".to_string(),
            },
            &mut store,
            &cache,
        );
        assert!(output.contains("90%"));
        assert!(output.contains("2 absent"));
        assert!(cache.get::<Vec<AttendanceRecord>>("Grandes").is_some());

        // Recording through the CLI drops the stale cached list
        run_to_string(
            Command::RecordAttendance {
                class: "Grandes".to_string(),
                present: 10,
                total: 20,
            },
            &mut store,
            &cache,
        );
        assert!(cache.get::<Vec<AttendanceRecord>>("Grandes").is_none());
    }

    #[test]
    fn test_summary_lists_classes() {
        let (mut store, cache) = setup();
        let output = run_to_string(Command::Summary, &mut store, &cache);
        assert!(output.contains("Pequeños"));
        assert!(output.contains("N/A"));
    }
}
