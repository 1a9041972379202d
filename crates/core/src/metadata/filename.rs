//! Filename pattern parsing (first resolution tier).

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::{FieldValue, MetadataRecord, Tier};

/// 13-digit book identifier starting with the `978` prefix.
static ISBN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"978\d{10}").unwrap());

/// `Author - Title`
static AUTHOR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s*-\s*(.*)$").unwrap());

/// `[Vol|Book] N - [year] - Title [{narrator}]`
static SERIES_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:vol\.?|volume|book)?\s*(\d+(?:\.\d+)?)\s*-\s*(\d{4})?\s*-\s*(.*?)\s*(\{[^}]*\})?\s*$")
        .unwrap()
});

/// Fields recognized in a bare filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameMetadata {
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub series_sequence: Option<String>,
    pub publish_year: Option<u32>,
    pub narrator: Option<String>,
}

impl FilenameMetadata {
    /// Copies every recognized field into the record.
    pub fn apply_to(self, record: &mut MetadataRecord) {
        let tier = Tier::Filename;
        record.fill_opt(self.isbn.map(FieldValue::Isbn), tier);
        record.fill_opt(self.author.map(FieldValue::Author), tier);
        record.fill_opt(self.title.map(FieldValue::Title), tier);
        record.fill_opt(self.series_sequence.map(FieldValue::SeriesSequence), tier);
        record.fill_opt(self.publish_year.map(FieldValue::PublishYear), tier);
        record.fill_opt(self.narrator.map(FieldValue::Narrator), tier);
    }
}

/// Extracts the first ISBN-13 found anywhere in the name.
pub fn parse_isbn(name: &str) -> Option<String> {
    ISBN_PATTERN.find(name).map(|m| m.as_str().to_string())
}

/// Parses a filename stem (extension already stripped).
///
/// A name with no recognizable separator yields no title; the bare stem is
/// only ever used as a lookup query, never as a resolved title.
pub fn parse_filename(stem: &str) -> FilenameMetadata {
    let mut parsed = FilenameMetadata {
        isbn: parse_isbn(stem),
        ..Default::default()
    };

    let cleaned = match &parsed.isbn {
        Some(isbn) => stem.replacen(isbn.as_str(), "", 1),
        None => stem.to_string(),
    };
    let cleaned = cleaned.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '_');

    if let Some(caps) = AUTHOR_PATTERN.captures(cleaned) {
        parsed.author = non_empty(caps.get(1).map(|m| m.as_str()));
        parsed.title = non_empty(caps.get(2).map(|m| m.as_str()));
    }

    if let Some(caps) = SERIES_PATTERN.captures(cleaned) {
        parsed.series_sequence = non_empty(caps.get(1).map(|m| m.as_str()));
        parsed.publish_year = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if let Some(title) = non_empty(caps.get(3).map(|m| m.as_str())) {
            parsed.title = Some(title);
        }
        parsed.narrator = caps
            .get(4)
            .map(|m| m.as_str().trim_matches(|c| c == '{' || c == '}'))
            .and_then(|n| non_empty(Some(n)));

        // "Book 3 - 2015 - Title" has no author part of its own
        if parsed.author.as_deref().is_some_and(is_sequence_token) {
            parsed.author = None;
        }
    }

    parsed
}

/// `"3"`, `"Book 3"`, `"Vol. 2.5"`
fn is_sequence_token(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    let rest = ["volume", "vol.", "vol", "book"]
        .iter()
        .find_map(|p| lower.strip_prefix(p))
        .unwrap_or(&lower)
        .trim();
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_title() {
        let parsed = parse_filename("Jane Doe - My Book");
        assert_eq!(parsed.author.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.title.as_deref(), Some("My Book"));
        assert!(parsed.series_sequence.is_none());
        assert!(parsed.isbn.is_none());
    }

    #[test]
    fn test_no_pattern_yields_no_title() {
        let parsed = parse_filename("untitled");
        assert_eq!(parsed, FilenameMetadata::default());
    }

    #[test]
    fn test_series_pattern() {
        let parsed = parse_filename("Jane Doe - Book 3 - 2015 - The Third One {Read by Sam}");
        assert_eq!(parsed.author.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.series_sequence.as_deref(), Some("3"));
        assert_eq!(parsed.publish_year, Some(2015));
        assert_eq!(parsed.title.as_deref(), Some("The Third One"));
        assert_eq!(parsed.narrator.as_deref(), Some("Read by Sam"));
    }

    #[test]
    fn test_series_without_year_or_author() {
        let parsed = parse_filename("Vol. 2.5 - - Interlude");
        assert_eq!(parsed.series_sequence.as_deref(), Some("2.5"));
        assert_eq!(parsed.publish_year, None);
        assert_eq!(parsed.title.as_deref(), Some("Interlude"));
        assert!(parsed.author.is_none());
    }

    #[test]
    fn test_isbn_is_extracted_and_stripped() {
        let parsed = parse_filename("9781234567897 - Jane Doe - My Book");
        assert_eq!(parsed.isbn.as_deref(), Some("9781234567897"));
        assert_eq!(parsed.author.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.title.as_deref(), Some("My Book"));
    }

    #[test]
    fn test_isbn_only() {
        let parsed = parse_filename("9781234567897");
        assert_eq!(parsed.isbn.as_deref(), Some("9781234567897"));
        assert!(parsed.title.is_none());
        assert!(parsed.author.is_none());
    }

    #[test]
    fn test_short_number_is_not_isbn() {
        assert_eq!(parse_isbn("978123"), None);
        assert_eq!(parse_isbn("x9781234567897y"), Some("9781234567897".to_string()));
    }

    #[test]
    fn test_apply_to_record_sets_filename_provenance() {
        let mut record = MetadataRecord::new();
        parse_filename("Jane Doe - My Book").apply_to(&mut record);
        assert_eq!(record.source_of(crate::metadata::Field::Author), Some(Tier::Filename));
        assert_eq!(record.source_of(crate::metadata::Field::Title), Some(Tier::Filename));
    }
}
