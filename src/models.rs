use serde::Serialize;

use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl CourseStatus {
    /// Display order of the status histogram.
    pub const ALL: [CourseStatus; 4] = [
        CourseStatus::Planned,
        CourseStatus::Active,
        CourseStatus::Completed,
        CourseStatus::Cancelled,
    ];

    /// Maps a raw status value onto a bucket. Matching is exact; the record service
    /// uses German keys, so both vocabularies are accepted. Anything else is `Planned`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("active" | "aktiv") => CourseStatus::Active,
            Some("completed" | "abgeschlossen") => CourseStatus::Completed,
            Some("cancelled" | "abgesagt") => CourseStatus::Cancelled,
            _ => CourseStatus::Planned,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CourseStatus::Planned => "planned",
            CourseStatus::Active => "active",
            CourseStatus::Completed => "completed",
            CourseStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CourseStatus::Planned => "Planned",
            CourseStatus::Active => "Active",
            CourseStatus::Completed => "Completed",
            CourseStatus::Cancelled => "Cancelled",
        }
    }

    /// Short label used on the chart axis.
    pub fn chart_label(self) -> &'static str {
        match self {
            CourseStatus::Completed => "Compl.",
            other => other.label(),
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            CourseStatus::Planned => "badge-planned",
            CourseStatus::Active => "badge-active",
            CourseStatus::Completed => "badge-completed",
            CourseStatus::Cancelled => "badge-cancelled",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            CourseStatus::Planned => '◷',
            CourseStatus::Active => '✔',
            CourseStatus::Completed => '☑',
            CourseStatus::Cancelled => '✘',
        }
    }
}

/// The five record collections of the course service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Collection {
    Courses,
    Instructors,
    Participants,
    Rooms,
    Registrations,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Courses => "courses",
            Collection::Instructors => "instructors",
            Collection::Participants => "participants",
            Collection::Rooms => "rooms",
            Collection::Registrations => "registrations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub price: Option<f64>,
    pub status: CourseStatus,
}

impl Course {
    /// Sort key for recency; undated courses compare as the empty string.
    pub fn date_key(&self) -> &str {
        self.start_date.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instructor {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: String,
    pub name: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub participant_ref: Option<String>,
    /// Reference string that embeds the course id as a trailing hex token.
    pub course_ref: Option<String>,
    pub paid: bool,
}

/// The five collections a dashboard load works from.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub participants: Vec<Participant>,
    pub rooms: Vec<Room>,
    pub registrations: Vec<Registration>,
}

impl Snapshot {
    pub fn aggregate(&self) -> DashboardOverview {
        stats::aggregate(
            &self.courses,
            &self.instructors,
            &self.participants,
            &self.rooms,
            &self.registrations,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub courses: usize,
    pub active_courses: usize,
    pub instructors: usize,
    pub participants: usize,
    pub rooms: usize,
    pub registrations: usize,
    pub paid_ratio: u8,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: CourseStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub summary: Summary,
    pub status_histogram: Vec<StatusCount>,
    pub recent_courses: Vec<Course>,
}

impl Default for DashboardOverview {
    fn default() -> Self {
        stats::aggregate(&[], &[], &[], &[], &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_both_vocabularies() {
        assert_eq!(CourseStatus::parse(Some("active")), CourseStatus::Active);
        assert_eq!(CourseStatus::parse(Some("aktiv")), CourseStatus::Active);
        assert_eq!(CourseStatus::parse(Some("abgesagt")), CourseStatus::Cancelled);
        assert_eq!(CourseStatus::parse(Some("completed")), CourseStatus::Completed);
    }

    #[test]
    fn status_parse_defaults_to_planned() {
        assert_eq!(CourseStatus::parse(None), CourseStatus::Planned);
        assert_eq!(CourseStatus::parse(Some("")), CourseStatus::Planned);
        assert_eq!(CourseStatus::parse(Some("Active")), CourseStatus::Planned);
        assert_eq!(CourseStatus::parse(Some("archived")), CourseStatus::Planned);
    }

    #[test]
    fn default_overview_is_all_zero() {
        let overview = DashboardOverview::default();
        assert_eq!(overview.summary, Summary::default());
        assert_eq!(overview.status_histogram.len(), 4);
        assert!(overview.status_histogram.iter().all(|entry| entry.count == 0));
        assert!(overview.recent_courses.is_empty());
    }
}
