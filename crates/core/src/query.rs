//! The `lesson` query parameter, rewritten without disturbing other parameters.

use std::fmt;

use url::{Url, form_urlencoded};

pub const LESSON_PARAM: &str = "lesson";

/// Ordered query-string pairs of the page address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonQuery {
    pairs: Vec<(String, String)>,
}

impl LessonQuery {
    /// Parse a raw query string; a leading `?` is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes()).into_owned().collect(),
        }
    }

    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self {
            pairs: url.query_pairs().into_owned().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn lesson(&self) -> Option<&str> {
        self.get(LESSON_PARAM)
    }

    /// Replace the first `key` in place (dropping any repeats) or append it.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut i = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = i <= first || k != key;
                    i += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_owned(), value)),
        }
    }

    pub fn set_lesson(&mut self, index: usize) {
        self.set(LESSON_PARAM, index.to_string());
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }

    /// Write these pairs into `url`, replacing its query.
    pub fn apply_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.to_query_string()));
        }
    }
}

impl fmt::Display for LessonQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lesson_param() {
        let q = LessonQuery::parse("?tab=theory&lesson=4");
        assert_eq!(q.lesson(), Some("4"));
        assert_eq!(q.get("tab"), Some("theory"));
        assert_eq!(LessonQuery::parse("").lesson(), None);
    }

    #[test]
    fn set_lesson_preserves_other_params_and_order() {
        let mut q = LessonQuery::parse("a=1&lesson=2&b=x%20y&lesson=9");
        q.set_lesson(5);
        assert_eq!(q.to_query_string(), "a=1&lesson=5&b=x+y");
    }

    #[test]
    fn set_lesson_appends_when_absent() {
        let mut q = LessonQuery::parse("view=compact");
        q.set_lesson(0);
        assert_eq!(q.to_string(), "view=compact&lesson=0");
    }

    #[test]
    fn applies_to_full_url() {
        let mut url = Url::parse("https://lms.test/theory/signature?mode=dark").unwrap();
        let mut q = LessonQuery::from_url(&url);
        q.set_lesson(3);
        q.apply_to(&mut url);
        assert_eq!(url.as_str(), "https://lms.test/theory/signature?mode=dark&lesson=3");
    }
}
