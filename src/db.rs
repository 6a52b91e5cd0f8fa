use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::models::{Collection, Course, CourseStatus, Instructor, Participant, Registration, Room};
use crate::snapshot::{CourseRow, InstructorRow, ParticipantRow, RegistrationRow, RoomRow};
use crate::source::DataService;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let courses = vec![
        (
            "65f0a1b2c3d4e5f601234501",
            "Rust for Backend Developers",
            Some("2026-02-02"),
            Some(890.0),
            "completed",
        ),
        (
            "65f0a1b2c3d4e5f601234502",
            "Data Visualisation Basics",
            Some("2026-03-16"),
            Some(450.0),
            "active",
        ),
        (
            "65f0a1b2c3d4e5f601234503",
            "Project Management Essentials",
            Some("2026-04-20"),
            Some(620.0),
            "planned",
        ),
        (
            "65f0a1b2c3d4e5f601234504",
            "Spanish A2 Evening Class",
            Some("2026-01-12"),
            Some(310.0),
            "cancelled",
        ),
        (
            "65f0a1b2c3d4e5f601234505",
            "Open Studio",
            None,
            None,
            "planned",
        ),
    ];

    for (id, title, start_date, price, status) in courses {
        sqlx::query(
            r#"
            INSERT INTO course_dashboard.courses (id, title, start_date, price, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, start_date = EXCLUDED.start_date,
                price = EXCLUDED.price, status = EXCLUDED.status
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(start_date)
        .bind(price)
        .bind(status)
        .execute(pool)
        .await?;
    }

    let instructors = vec![
        ("ins-001", "Dana Kowalski"),
        ("ins-002", "Miguel Ortega"),
    ];
    for (id, name) in instructors {
        sqlx::query(
            "INSERT INTO course_dashboard.instructors (id, name) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    }

    let participants = vec![
        ("par-001", "Avery Lee", "avery.lee@example.com"),
        ("par-002", "Jules Moreno", "jules.moreno@example.com"),
        ("par-003", "Kiara Patel", "kiara.patel@example.com"),
    ];
    for (id, name, email) in participants {
        sqlx::query(
            "INSERT INTO course_dashboard.participants (id, name, email) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(pool)
        .await?;
    }

    let rooms = vec![("room-a", "Room A", 24), ("room-b", "Lab B", 12)];
    for (id, name, capacity) in rooms {
        sqlx::query(
            "INSERT INTO course_dashboard.rooms (id, name, capacity) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, capacity = EXCLUDED.capacity",
        )
        .bind(id)
        .bind(name)
        .bind(capacity)
        .execute(pool)
        .await?;
    }

    let registrations = vec![
        ("reg-001", "par-001", "65f0a1b2c3d4e5f601234501", true),
        ("reg-002", "par-002", "65f0a1b2c3d4e5f601234502", true),
        ("reg-003", "par-003", "65f0a1b2c3d4e5f601234502", false),
        ("reg-004", "par-001", "65f0a1b2c3d4e5f601234503", true),
    ];
    for (id, participant, course_id, paid) in registrations {
        sqlx::query(
            r#"
            INSERT INTO course_dashboard.registrations (id, participant_ref, course_ref, paid)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET participant_ref = EXCLUDED.participant_ref,
                course_ref = EXCLUDED.course_ref, paid = EXCLUDED.paid
            "#,
        )
        .bind(id)
        .bind(participant)
        .bind(format!("courses/{course_id}"))
        .bind(paid)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Upserts every row of a CSV export into the matching table. Returns the number of
/// rows that were new.
pub async fn import_csv(
    pool: &PgPool,
    collection: Collection,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    macro_rules! upsert_all {
        ($row:ty, |$r:ident| $query:expr) => {
            for result in reader.deserialize::<$row>() {
                let $r = result?;
                let created: bool = $query.fetch_one(pool).await?.get("created");
                if created {
                    inserted += 1;
                }
            }
        };
    }

    match collection {
        Collection::Courses => upsert_all!(CourseRow, |row| sqlx::query(
            r#"
            INSERT INTO course_dashboard.courses (id, title, start_date, price, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, start_date = EXCLUDED.start_date,
                price = EXCLUDED.price, status = EXCLUDED.status
            RETURNING (xmax = 0) AS created
            "#,
        )
        .bind(row.id)
        .bind(row.title)
        .bind(row.start_date)
        .bind(row.price)
        .bind(row.status)),
        Collection::Instructors => upsert_all!(InstructorRow, |row| sqlx::query(
            "INSERT INTO course_dashboard.instructors (id, name) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name \
             RETURNING (xmax = 0) AS created",
        )
        .bind(row.id)
        .bind(row.name)),
        Collection::Participants => upsert_all!(ParticipantRow, |row| sqlx::query(
            "INSERT INTO course_dashboard.participants (id, name, email) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email \
             RETURNING (xmax = 0) AS created",
        )
        .bind(row.id)
        .bind(row.name)
        .bind(row.email)),
        Collection::Rooms => upsert_all!(RoomRow, |row| sqlx::query(
            "INSERT INTO course_dashboard.rooms (id, name, capacity) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, capacity = EXCLUDED.capacity \
             RETURNING (xmax = 0) AS created",
        )
        .bind(row.id)
        .bind(row.name)
        .bind(row.capacity)),
        Collection::Registrations => upsert_all!(RegistrationRow, |row| sqlx::query(
            r#"
            INSERT INTO course_dashboard.registrations (id, participant_ref, course_ref, paid)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET participant_ref = EXCLUDED.participant_ref,
                course_ref = EXCLUDED.course_ref, paid = EXCLUDED.paid
            RETURNING (xmax = 0) AS created
            "#,
        )
        .bind(row.id)
        .bind(row.participant_ref)
        .bind(row.course_ref)
        .bind(row.paid.unwrap_or(false))),
    }

    Ok(inserted)
}

/// Postgres-backed record store.
pub struct PgService {
    pool: PgPool,
}

impl PgService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataService for PgService {
    async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT id, title, start_date, price, status \
             FROM course_dashboard.courses ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let status: Option<String> = row.get("status");
            courses.push(Course {
                id: row.get("id"),
                title: row.get("title"),
                start_date: row.get("start_date"),
                price: row.get("price"),
                status: CourseStatus::parse(status.as_deref()),
            });
        }

        Ok(courses)
    }

    async fn fetch_instructors(&self) -> anyhow::Result<Vec<Instructor>> {
        let rows = sqlx::query("SELECT id, name FROM course_dashboard.instructors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Instructor {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn fetch_participants(&self) -> anyhow::Result<Vec<Participant>> {
        let rows =
            sqlx::query("SELECT id, name, email FROM course_dashboard.participants ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|row| Participant {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
            })
            .collect())
    }

    async fn fetch_rooms(&self) -> anyhow::Result<Vec<Room>> {
        let rows = sqlx::query("SELECT id, name, capacity FROM course_dashboard.rooms ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Room {
                id: row.get("id"),
                name: row.get("name"),
                capacity: row.get("capacity"),
            })
            .collect())
    }

    async fn fetch_registrations(&self) -> anyhow::Result<Vec<Registration>> {
        let rows = sqlx::query(
            "SELECT id, participant_ref, course_ref, paid \
             FROM course_dashboard.registrations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Registration {
                id: row.get("id"),
                participant_ref: row.get("participant_ref"),
                course_ref: row.get("course_ref"),
                paid: row.get("paid"),
            })
            .collect())
    }
}
