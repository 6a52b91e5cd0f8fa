use crate::course_ref::extract_course_id;
use crate::models::{
    Course, CourseStatus, DashboardOverview, Instructor, Participant, Registration, Room,
    StatusCount, Summary,
};

pub const RECENT_COURSE_LIMIT: usize = 5;

pub fn aggregate(
    courses: &[Course],
    instructors: &[Instructor],
    participants: &[Participant],
    rooms: &[Room],
    registrations: &[Registration],
) -> DashboardOverview {
    let active_courses = courses
        .iter()
        .filter(|course| course.status == CourseStatus::Active)
        .count();
    let paid = registrations.iter().filter(|r| r.paid).count();

    let summary = Summary {
        courses: courses.len(),
        active_courses,
        instructors: instructors.len(),
        participants: participants.len(),
        rooms: rooms.len(),
        registrations: registrations.len(),
        paid_ratio: paid_ratio(paid, registrations.len()),
        revenue: paid_revenue(courses, registrations),
    };

    DashboardOverview {
        summary,
        status_histogram: status_histogram(courses),
        recent_courses: recent_courses(courses, RECENT_COURSE_LIMIT),
    }
}

/// Percentage of paid registrations, rounded half-up. Zero when there are none.
pub fn paid_ratio(paid: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let paid = paid.min(total) as u64;
    let total = total as u64;
    ((paid * 200 + total) / (total * 2)) as u8
}

/// Sums the course price once per paid registration that resolves to a priced course.
/// Two paid registrations for the same course count its price twice.
pub fn paid_revenue(courses: &[Course], registrations: &[Registration]) -> f64 {
    let mut revenue = 0.0;

    for registration in registrations.iter().filter(|r| r.paid) {
        let Some(course_id) = registration.course_ref.as_deref().and_then(extract_course_id)
        else {
            continue;
        };
        let Some(course) = courses.iter().find(|course| course.id == course_id) else {
            continue;
        };
        if let Some(price) = course.price.filter(|p| p.is_finite() && *p > 0.0) {
            revenue += price;
        }
    }

    revenue
}

pub fn status_histogram(courses: &[Course]) -> Vec<StatusCount> {
    let mut counts = [0usize; CourseStatus::ALL.len()];

    for course in courses {
        if let Some(slot) = CourseStatus::ALL.iter().position(|s| *s == course.status) {
            counts[slot] += 1;
        }
    }

    CourseStatus::ALL
        .iter()
        .zip(counts)
        .map(|(status, count)| StatusCount {
            status: *status,
            label: status.chart_label(),
            count,
        })
        .collect()
}

/// Latest courses by start date, undated ones last. The sort is stable so equal
/// dates keep their collection order.
pub fn recent_courses(courses: &[Course], limit: usize) -> Vec<Course> {
    let mut sorted = courses.to_vec();
    sorted.sort_by(|a, b| b.date_key().cmp(a.date_key()));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FIRST_ID: &str = "65a1b2c3d4e5f60718293a4b";
    const SECOND_ID: &str = "65a1b2c3d4e5f60718293a4c";
    const THIRD_ID: &str = "65a1b2c3d4e5f60718293a4d";

    fn course(id: &str, status: CourseStatus, start_date: Option<&str>, price: Option<f64>) -> Course {
        Course {
            id: id.to_string(),
            title: Some(format!("Course {id}")),
            start_date: start_date.map(str::to_string),
            price,
            status,
        }
    }

    fn registration(id: &str, course_ref: Option<&str>, paid: bool) -> Registration {
        Registration {
            id: id.to_string(),
            participant_ref: None,
            course_ref: course_ref.map(str::to_string),
            paid,
        }
    }

    fn course_url(id: &str) -> String {
        format!("https://records.example.com/rest/apps/courses/records/{id}")
    }

    fn histogram_counts(overview: &DashboardOverview) -> Vec<usize> {
        overview.status_histogram.iter().map(|e| e.count).collect()
    }

    #[test]
    fn empty_inputs_produce_zero_summary() {
        let overview = aggregate(&[], &[], &[], &[], &[]);
        assert_eq!(overview.summary, Summary::default());
        assert_eq!(histogram_counts(&overview), vec![0, 0, 0, 0]);
        assert!(overview.recent_courses.is_empty());
    }

    #[test]
    fn paid_registrations_double_count_shared_course() {
        let courses = vec![
            course(FIRST_ID, CourseStatus::Active, Some("2026-03-01"), Some(100.0)),
            course(SECOND_ID, CourseStatus::Active, Some("2026-04-01"), Some(250.0)),
            course(THIRD_ID, CourseStatus::Cancelled, None, Some(80.0)),
        ];
        let url = course_url(FIRST_ID);
        let registrations = vec![
            registration("r1", Some(&url), true),
            registration("r2", Some(&url), true),
        ];

        let overview = aggregate(&courses, &[], &[], &[], &registrations);
        assert_eq!(overview.summary.paid_ratio, 100);
        assert_eq!(overview.summary.revenue, 200.0);
        assert_eq!(overview.summary.active_courses, 2);
        assert_eq!(histogram_counts(&overview), vec![0, 2, 0, 1]);
    }

    #[test]
    fn unresolvable_references_contribute_nothing() {
        let courses = vec![course(FIRST_ID, CourseStatus::Active, None, Some(100.0))];
        let unknown = course_url("ffffffffffffffffffffffff");
        let registrations = vec![
            registration("r1", Some("course-1"), true),
            registration("r2", None, true),
            registration("r3", Some(&unknown), true),
        ];

        let overview = aggregate(&courses, &[], &[], &[], &registrations);
        assert_eq!(overview.summary.revenue, 0.0);
        assert_eq!(overview.summary.paid_ratio, 100);
    }

    #[test]
    fn unpaid_and_unpriced_registrations_are_skipped() {
        let courses = vec![
            course(FIRST_ID, CourseStatus::Planned, None, Some(100.0)),
            course(SECOND_ID, CourseStatus::Planned, None, None),
        ];
        let registrations = vec![
            registration("r1", Some(&course_url(FIRST_ID)), false),
            registration("r2", Some(&course_url(SECOND_ID)), true),
        ];

        let overview = aggregate(&courses, &[], &[], &[], &registrations);
        assert_eq!(overview.summary.revenue, 0.0);
        assert_eq!(overview.summary.paid_ratio, 50);
    }

    #[test]
    fn duplicate_course_ids_resolve_to_first_match() {
        let courses = vec![
            course(FIRST_ID, CourseStatus::Active, None, Some(40.0)),
            course(FIRST_ID, CourseStatus::Active, None, Some(900.0)),
        ];
        let registrations = vec![registration("r1", Some(FIRST_ID), true)];

        assert_eq!(paid_revenue(&courses, &registrations), 40.0);
    }

    #[test]
    fn recent_courses_keep_the_five_latest() {
        let courses: Vec<Course> = (1..=6)
            .map(|day| {
                course(
                    &format!("c{day}"),
                    CourseStatus::Planned,
                    Some(&format!("2026-05-0{day}")),
                    None,
                )
            })
            .collect();

        let overview = aggregate(&courses, &[], &[], &[], &[]);
        let dates: Vec<&str> = overview.recent_courses.iter().map(|c| c.date_key()).collect();
        assert_eq!(
            dates,
            vec!["2026-05-06", "2026-05-05", "2026-05-04", "2026-05-03", "2026-05-02"]
        );
    }

    #[test]
    fn undated_courses_sort_last_in_original_order() {
        let courses = vec![
            course("a", CourseStatus::Planned, None, None),
            course("b", CourseStatus::Planned, Some("2026-01-10"), None),
            course("c", CourseStatus::Planned, None, None),
            course("d", CourseStatus::Planned, Some("2026-01-10"), None),
        ];

        let ids: Vec<String> = recent_courses(&courses, 5).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn paid_ratio_rounds_half_up() {
        assert_eq!(paid_ratio(0, 0), 0);
        assert_eq!(paid_ratio(1, 8), 13);
        assert_eq!(paid_ratio(1, 3), 33);
        assert_eq!(paid_ratio(2, 3), 67);
        assert_eq!(paid_ratio(1, 200), 1);
        assert_eq!(paid_ratio(1, 201), 0);
    }

    fn arb_status() -> impl Strategy<Value = CourseStatus> {
        prop::sample::select(CourseStatus::ALL.to_vec())
    }

    fn arb_course() -> impl Strategy<Value = Course> {
        (
            "[a-f0-9]{24}",
            arb_status(),
            prop::option::of("2026-0[1-9]-[12][0-9]"),
            prop::option::of(0.0f64..5000.0),
        )
            .prop_map(|(id, status, start_date, price)| Course {
                id,
                title: None,
                start_date,
                price,
                status,
            })
    }

    proptest! {
        #[test]
        fn prop_paid_ratio_is_a_percentage(total in 0usize..10_000, paid_seed in 0usize..10_000) {
            let paid = if total == 0 { 0 } else { paid_seed % (total + 1) };
            let ratio = paid_ratio(paid, total);
            prop_assert!(ratio <= 100);
            if total == 0 {
                prop_assert_eq!(ratio, 0);
            }
        }

        #[test]
        fn prop_histogram_sums_to_course_count(courses in prop::collection::vec(arb_course(), 0..40)) {
            let histogram = status_histogram(&courses);
            prop_assert_eq!(histogram.len(), 4);
            prop_assert_eq!(histogram.iter().map(|e| e.count).sum::<usize>(), courses.len());
        }

        #[test]
        fn prop_recent_courses_are_bounded_and_descending(
            courses in prop::collection::vec(arb_course(), 0..20)
        ) {
            let recent = recent_courses(&courses, RECENT_COURSE_LIMIT);
            prop_assert!(recent.len() <= RECENT_COURSE_LIMIT);
            for pair in recent.windows(2) {
                prop_assert!(pair[0].date_key() >= pair[1].date_key());
            }
        }

        #[test]
        fn prop_aggregate_is_deterministic(
            courses in prop::collection::vec(arb_course(), 0..20),
            paid_flags in prop::collection::vec(any::<bool>(), 0..20)
        ) {
            let registrations: Vec<Registration> = paid_flags
                .iter()
                .enumerate()
                .map(|(i, paid)| Registration {
                    id: format!("r{i}"),
                    participant_ref: None,
                    course_ref: courses.get(i % courses.len().max(1)).map(|c| course_url(&c.id)),
                    paid: *paid,
                })
                .collect();

            let first = aggregate(&courses, &[], &[], &[], &registrations);
            let second = aggregate(&courses, &[], &[], &[], &registrations);
            prop_assert!(first.summary.revenue >= 0.0);
            prop_assert_eq!(first.summary.revenue.to_bits(), second.summary.revenue.to_bits());
            prop_assert_eq!(first, second);
        }
    }
}
