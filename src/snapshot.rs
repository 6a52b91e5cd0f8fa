use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{Course, CourseStatus, Instructor, Participant, Registration, Room};
use crate::source::DataService;

#[derive(Debug, Deserialize)]
pub struct CourseRow {
    pub id: String,
    pub title: Option<String>,
    pub start_date: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub price: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstructorRow {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantRow {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomRow {
    pub id: String,
    pub name: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationRow {
    pub id: String,
    pub participant_ref: Option<String>,
    pub course_ref: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub paid: Option<bool>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            title: row.title,
            start_date: row.start_date,
            price: row.price,
            status: CourseStatus::parse(row.status.as_deref()),
        }
    }
}

impl From<InstructorRow> for Instructor {
    fn from(row: InstructorRow) -> Self {
        Instructor {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            capacity: row.capacity,
        }
    }
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Registration {
            id: row.id,
            participant_ref: row.participant_ref,
            course_ref: row.course_ref,
            paid: row.paid.unwrap_or(false),
        }
    }
}

/// Directory of CSV exports, one file per collection.
pub struct CsvSnapshot {
    dir: PathBuf,
}

impl CsvSnapshot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read<R, T>(&self, file_name: &str) -> anyhow::Result<Vec<T>>
    where
        R: DeserializeOwned,
        T: From<R>,
    {
        read_csv::<R, T>(&self.dir.join(file_name))
    }
}

fn read_csv<R, T>(path: &Path) -> anyhow::Result<Vec<T>>
where
    R: DeserializeOwned,
    T: From<R>,
{
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();

    for result in reader.deserialize::<R>() {
        let row = result.with_context(|| format!("malformed row in {}", path.display()))?;
        records.push(T::from(row));
    }

    Ok(records)
}

#[async_trait]
impl DataService for CsvSnapshot {
    async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>> {
        self.read::<CourseRow, _>("courses.csv")
    }

    async fn fetch_instructors(&self) -> anyhow::Result<Vec<Instructor>> {
        self.read::<InstructorRow, _>("instructors.csv")
    }

    async fn fetch_participants(&self) -> anyhow::Result<Vec<Participant>> {
        self.read::<ParticipantRow, _>("participants.csv")
    }

    async fn fetch_rooms(&self) -> anyhow::Result<Vec<Room>> {
        self.read::<RoomRow, _>("rooms.csv")
    }

    async fn fetch_registrations(&self) -> anyhow::Result<Vec<Registration>> {
        self.read::<RegistrationRow, _>("registrations.csv")
    }
}
