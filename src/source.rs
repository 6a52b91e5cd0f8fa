use anyhow::Context;
use async_trait::async_trait;

use crate::models::{Course, Instructor, Participant, Registration, Room, Snapshot};

/// Read side of the record service the dashboard is built from. Every call fetches
/// one whole collection.
#[async_trait]
pub trait DataService: Send + Sync {
    async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>>;
    async fn fetch_instructors(&self) -> anyhow::Result<Vec<Instructor>>;
    async fn fetch_participants(&self) -> anyhow::Result<Vec<Participant>>;
    async fn fetch_rooms(&self) -> anyhow::Result<Vec<Room>>;
    async fn fetch_registrations(&self) -> anyhow::Result<Vec<Registration>>;
}

/// Fetches all five collections concurrently. The first failure fails the load.
pub async fn load_snapshot(service: &dyn DataService) -> anyhow::Result<Snapshot> {
    let (instructors, participants, rooms, courses, registrations) = tokio::try_join!(
        async { service.fetch_instructors().await.context("failed to fetch instructors") },
        async { service.fetch_participants().await.context("failed to fetch participants") },
        async { service.fetch_rooms().await.context("failed to fetch rooms") },
        async { service.fetch_courses().await.context("failed to fetch courses") },
        async { service.fetch_registrations().await.context("failed to fetch registrations") },
    )?;

    log::debug!(
        "fetched {} courses, {} instructors, {} participants, {} rooms, {} registrations",
        courses.len(),
        instructors.len(),
        participants.len(),
        rooms.len(),
        registrations.len()
    );

    Ok(Snapshot {
        courses,
        instructors,
        participants,
        rooms,
        registrations,
    })
}
