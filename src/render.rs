use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{Course, DashboardOverview};
use crate::view::DashboardView;

const PLACEHOLDER: &str = "–";
const BAR_WIDTH: usize = 30;
const GAUGE_WIDTH: usize = 20;

/// Formats an amount the way German invoices do: `1.234,5 €`.
pub fn format_euro(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = group_thousands(cents / 100);
    let fraction = cents % 100;

    if fraction == 0 {
        format!("{sign}{whole} €")
    } else {
        let decimals = format!("{fraction:02}");
        format!("{sign}{whole},{} €", decimals.trim_end_matches('0'))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// `2026-03-16` becomes `16. Mar 2026`. Values that are not ISO dates pass through.
pub fn format_start_date(raw: &str) -> String {
    let date_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%d. %b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn course_line(course: &Course) -> String {
    let title = course.title.as_deref().unwrap_or(PLACEHOLDER);
    let date = course
        .start_date
        .as_deref()
        .map(format_start_date)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let price = course
        .price
        .map(|p| format!(" · {}", format_euro(p)))
        .unwrap_or_default();
    format!(
        "{title}\n    {date}{price}  [{} {}]",
        course.status.glyph(),
        course.status.label()
    )
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(filled)
}

fn gauge(ratio: u8) -> String {
    let filled = usize::from(ratio) * GAUGE_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(GAUGE_WIDTH - filled))
}

/// Text rendering of the dashboard. Figures show a placeholder until a load succeeds.
pub fn render_dashboard(view: &DashboardView) -> String {
    let overview = &view.overview;
    let summary = &overview.summary;
    let placeholder = view.is_placeholder();
    let figure = |value: String| {
        if placeholder {
            PLACEHOLDER.to_string()
        } else {
            value
        }
    };

    let mut output = String::new();

    let _ = writeln!(output, "Course Overview");
    let _ = writeln!(output, "===============");
    let _ = writeln!(
        output,
        "{} courses total | {} currently active | {} paid revenue",
        figure(summary.courses.to_string()),
        figure(summary.active_courses.to_string()),
        figure(format_euro(summary.revenue))
    );
    let _ = writeln!(output);

    let cards = [
        ("Instructors", summary.instructors),
        ("Participants", summary.participants),
        ("Rooms", summary.rooms),
        ("Courses", summary.courses),
        ("Registrations", summary.registrations),
    ];
    for (label, value) in cards {
        let _ = writeln!(output, "{label:<14} {:>6}", figure(value.to_string()));
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Course status ({} courses)",
        figure(summary.courses.to_string())
    );
    if placeholder {
        let _ = writeln!(output, "  {PLACEHOLDER}");
    } else {
        let max = overview
            .status_histogram
            .iter()
            .map(|entry| entry.count)
            .max()
            .unwrap_or(0);
        for entry in &overview.status_histogram {
            let _ = writeln!(
                output,
                "  {:<10} {:>4} {}",
                entry.label,
                entry.count,
                bar(entry.count, max)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Payment ratio: {} of registrations paid",
        figure(format!("{}%", summary.paid_ratio))
    );
    if placeholder {
        let _ = writeln!(output, "  {PLACEHOLDER}");
    } else {
        let _ = writeln!(output, "  {} {}%", gauge(summary.paid_ratio), summary.paid_ratio);
    }
    let _ = writeln!(output, "  {} revenue", figure(format_euro(summary.revenue)));

    let _ = writeln!(output);
    let _ = writeln!(output, "Recent courses");
    if placeholder {
        let _ = writeln!(output, "  {PLACEHOLDER}");
    } else if overview.recent_courses.is_empty() {
        let _ = writeln!(output, "  No courses yet");
    } else {
        for course in &overview.recent_courses {
            let _ = writeln!(output, "- {}", course_line(course));
        }
    }

    output
}

pub fn build_report(overview: &DashboardOverview, generated_on: NaiveDate) -> String {
    let summary = &overview.summary;
    let mut output = String::new();

    let _ = writeln!(output, "# Course Dashboard Report");
    let _ = writeln!(output, "Generated on {generated_on}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(
        output,
        "- Courses: {} ({} active)",
        summary.courses, summary.active_courses
    );
    let _ = writeln!(output, "- Instructors: {}", summary.instructors);
    let _ = writeln!(output, "- Participants: {}", summary.participants);
    let _ = writeln!(output, "- Rooms: {}", summary.rooms);
    let _ = writeln!(
        output,
        "- Registrations: {} ({}% paid)",
        summary.registrations, summary.paid_ratio
    );
    let _ = writeln!(output, "- Paid revenue: {}", format_euro(summary.revenue));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Status");
    for entry in &overview.status_histogram {
        let _ = writeln!(output, "- {}: {}", entry.status.label(), entry.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Courses");
    if overview.recent_courses.is_empty() {
        let _ = writeln!(output, "No courses recorded yet.");
    } else {
        for course in &overview.recent_courses {
            let _ = writeln!(
                output,
                "- {} ({}) starting {}{} `{}`",
                course.title.as_deref().unwrap_or(PLACEHOLDER),
                course.status.key(),
                course
                    .start_date
                    .as_deref()
                    .map(format_start_date)
                    .unwrap_or_else(|| "date unknown".to_string()),
                course
                    .price
                    .map(|p| format!(", {}", format_euro(p)))
                    .unwrap_or_default(),
                course.status.badge_class()
            );
        }
    }

    output
}
