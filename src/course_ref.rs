use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_RECORD_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([a-f0-9]{24})$").expect("valid record id pattern"));

/// Pulls the course id out of a registration's course reference. References are URLs
/// or paths ending in the 24-hex-character record id of the course.
pub fn extract_course_id(reference: &str) -> Option<&str> {
    TRAILING_RECORD_ID
        .captures(reference)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trailing_token_from_url() {
        let reference = "https://records.example.com/rest/apps/5f1/records/65a1b2c3d4e5f60718293a4b";
        assert_eq!(extract_course_id(reference), Some("65a1b2c3d4e5f60718293a4b"));
    }

    #[test]
    fn bare_id_is_its_own_reference() {
        assert_eq!(
            extract_course_id("65A1B2C3D4E5F60718293A4B"),
            Some("65A1B2C3D4E5F60718293A4B")
        );
    }

    #[test]
    fn takes_last_24_of_longer_hex_run() {
        let reference = "records/ff65a1b2c3d4e5f60718293a4b";
        assert_eq!(extract_course_id(reference), Some("65a1b2c3d4e5f60718293a4b"));
    }

    #[test]
    fn rejects_references_without_trailing_token() {
        assert_eq!(extract_course_id(""), None);
        assert_eq!(extract_course_id("course-42"), None);
        assert_eq!(extract_course_id("65a1b2c3d4e5f60718293a4b/"), None);
        assert_eq!(extract_course_id("records/65a1b2c3d4e5f6071829"), None);
    }
}
