//! Default dataset used when nothing usable is in storage.

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    Comment, Contact, Grade, ImprovementPlan, Notification, Payment, PaymentStatus, Post,
    Reactions, Submission, Task, GENERAL_CLASS,
};

use super::snapshot::{NextIds, Snapshot};

pub fn classes() -> Vec<String> {
    ["Pequeños", "Medianos", "Grandes"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn contacts() -> Vec<Contact> {
    [
        ("direccion", "Dirección"),
        ("maestra_pequenos", "Maestra de Pequeños"),
        ("maestra_medianos", "Maestra de Medianos"),
        ("maestra_grandes", "Maestra de Grandes"),
        ("asistente", "Asistente"),
        ("padres", "Padres de familia"),
    ]
    .into_iter()
    .map(|(id, name)| Contact {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// Build the seed dataset with dates relative to `now`.
pub fn default_snapshot(now: DateTime<Utc>) -> Snapshot {
    let today = now.date_naive();

    let posts = vec![
        Post {
            id: 2,
            class: "Medianos".to_string(),
            teacher: "Maestra de Medianos".to_string(),
            date: now - Duration::hours(2),
            text: "Hoy aprendimos los colores primarios.".to_string(),
            photo: None,
            video: None,
            doc_url: None,
            doc_type: None,
            comments: vec![],
            reactions: Reactions::default(),
        },
        Post {
            id: 1,
            class: "Pequeños".to_string(),
            teacher: "Maestra de Pequeños".to_string(),
            date: now - Duration::days(1),
            text: "¡Bienvenidos a la semana de la lectura!".to_string(),
            photo: None,
            video: None,
            doc_url: None,
            doc_type: None,
            comments: vec![Comment {
                author: "Padres de familia".to_string(),
                text: "¡Gracias!".to_string(),
                date: now - Duration::hours(20),
            }],
            reactions: Reactions {
                likes: 3,
                ..Default::default()
            },
        },
    ];

    let tasks = vec![
        Task {
            id: 2,
            class: "Grandes".to_string(),
            title: "Cuento ilustrado".to_string(),
            description: "Dibujar la parte favorita del cuento de la semana.".to_string(),
            publish_date: today,
            due_date: today + Duration::days(5),
            attachments: vec![],
            submissions: vec![],
            grades: vec![],
        },
        Task {
            id: 1,
            class: "Pequeños".to_string(),
            title: "Figuras geométricas".to_string(),
            description: "Recortar y pegar tres figuras.".to_string(),
            publish_date: today - Duration::days(3),
            due_date: today + Duration::days(2),
            attachments: vec![],
            submissions: vec![Submission {
                parent: "Padres de familia".to_string(),
                comment: "Listo".to_string(),
                file_type: String::new(),
                files: vec![],
                date: now - Duration::days(1),
            }],
            grades: vec![Grade {
                student: "Ana".to_string(),
                grade: "9".to_string(),
                comment: "Muy bien".to_string(),
                date: now - Duration::hours(12),
            }],
        },
    ];

    let notifications = vec![
        Notification {
            id: 2,
            class: "Pequeños".to_string(),
            kind: "task".to_string(),
            text: "Nueva tarea: Figuras geométricas".to_string(),
            date: now - Duration::days(3),
        },
        Notification {
            id: 1,
            class: GENERAL_CLASS.to_string(),
            kind: "info".to_string(),
            text: "Reunión de padres el viernes a las 17:00".to_string(),
            date: now - Duration::days(4),
        },
    ];

    let plans = vec![ImprovementPlan {
        id: 1,
        title: "Rutina de lectura diaria".to_string(),
        class: "Pequeños".to_string(),
        owner: "Dirección".to_string(),
        actions: "Quince minutos de lectura guiada al inicio del día.".to_string(),
        due: Some(today + Duration::days(30)),
        status: "Pendiente".to_string(),
    }];

    let payments = vec![
        Payment {
            id: 2,
            student: "Luis".to_string(),
            class: "Medianos".to_string(),
            month: "Noviembre".to_string(),
            amount: 120.0,
            status: PaymentStatus::Pending,
            due_date: Some(today + Duration::days(10)),
            paid_date: None,
            notes: String::new(),
        },
        Payment {
            id: 1,
            student: "Ana".to_string(),
            class: "Pequeños".to_string(),
            month: "Noviembre".to_string(),
            amount: 120.0,
            status: PaymentStatus::Paid,
            due_date: Some(today + Duration::days(10)),
            paid_date: Some(today - Duration::days(1)),
            notes: String::new(),
        },
    ];

    Snapshot {
        posts,
        tasks,
        notifications,
        attendance: vec![],
        plans,
        payments,
        contacts: contacts(),
        threads: vec![],
        classes: classes(),
        next_id: NextIds {
            posts: 3,
            tasks: 3,
            notifications: 3,
            plans: 2,
            payments: 3,
            threads: 1,
            messages: 1,
        },
    }
}
