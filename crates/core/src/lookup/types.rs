use serde::{Deserialize, Serialize};

/// The first matching volume from a bibliographic search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMatch {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    /// Publication date as reported (YYYY, YYYY-MM or YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl BookMatch {
    pub fn new(title: impl Into<String>, authors: Vec<String>) -> Self {
        Self {
            title: title.into(),
            authors,
            published_date: None,
        }
    }

    /// The first listed author.
    pub fn primary_author(&self) -> Option<&str> {
        self.authors
            .iter()
            .map(|a| a.trim())
            .find(|a| !a.is_empty())
    }

    /// Year parsed from the publication date.
    pub fn year(&self) -> Option<u32> {
        self.published_date
            .as_ref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_author_skips_blank() {
        let m = BookMatch::new("T", vec![" ".to_string(), "Jane Doe".to_string()]);
        assert_eq!(m.primary_author(), Some("Jane Doe"));
        assert_eq!(BookMatch::new("T", vec![]).primary_author(), None);
    }

    #[test]
    fn test_year() {
        let mut m = BookMatch::new("T", vec![]);
        m.published_date = Some("2011-03-01".to_string());
        assert_eq!(m.year(), Some(2011));
        m.published_date = Some("unknown".to_string());
        assert_eq!(m.year(), None);
    }
}
