//! Resolution of the current lesson index from the address bar and the
//! durable store.

/// Where the resolved index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Url,
    Store,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub index: usize,
    pub source: IndexSource,
}

impl Resolution {
    /// A stored position is copied into the URL so it becomes shareable.
    #[must_use]
    pub fn rewrites_url(&self) -> bool {
        self.source == IndexSource::Store
    }
}

/// Parse a string-encoded lesson index, accepting it only inside `[0, lesson_count)`.
#[must_use]
pub fn parse_index(raw: Option<&str>, lesson_count: usize) -> Option<usize> {
    raw?.trim()
        .parse::<usize>()
        .ok()
        .filter(|index| *index < lesson_count)
}

/// Pick the current index: a valid URL value first, then a valid stored
/// value, then `0`. Malformed or out-of-range sources fall through silently.
///
/// ```
/// # use learn_core::resolver::{resolve_index, IndexSource};
/// let r = resolve_index(Some("oops"), Some("4"), 12);
/// assert_eq!((r.index, r.source), (4, IndexSource::Store));
/// ```
#[must_use]
pub fn resolve_index(url: Option<&str>, stored: Option<&str>, lesson_count: usize) -> Resolution {
    if let Some(index) = parse_index(url, lesson_count) {
        return Resolution {
            index,
            source: IndexSource::Url,
        };
    }
    if let Some(index) = parse_index(stored, lesson_count) {
        return Resolution {
            index,
            source: IndexSource::Store,
        };
    }
    Resolution {
        index: 0,
        source: IndexSource::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_wins_when_valid() {
        let r = resolve_index(Some("3"), Some("7"), 12);
        assert_eq!(r.index, 3);
        assert_eq!(r.source, IndexSource::Url);
        assert!(!r.rewrites_url());
    }

    #[test]
    fn store_used_when_url_missing_or_invalid() {
        for url in [None, Some(""), Some("-1"), Some("12"), Some("2x")] {
            let r = resolve_index(url, Some("5"), 12);
            assert_eq!(r.index, 5, "url {url:?}");
            assert!(r.rewrites_url());
        }
    }

    #[test]
    fn falls_back_to_zero() {
        let r = resolve_index(None, None, 12);
        assert_eq!(r.index, 0);
        assert_eq!(r.source, IndexSource::Default);
        assert!(!r.rewrites_url());

        let r = resolve_index(Some("99"), Some("nope"), 12);
        assert_eq!(r.source, IndexSource::Default);
    }

    #[test]
    fn parse_index_bounds() {
        assert_eq!(parse_index(Some(" 0 "), 1), Some(0));
        assert_eq!(parse_index(Some("1"), 1), None);
        assert_eq!(parse_index(Some("0"), 0), None);
        assert_eq!(parse_index(None, 5), None);
    }
}
