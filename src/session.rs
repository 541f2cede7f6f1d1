//! Search session: the search term, the fetched segments and a cursor into them
//!
//! Every fetch the session asks for carries a [`RequestToken`]. Only the
//! response to the most recently issued token is applied, so a slow reply
//! for an old term can never overwrite the results for a newer one.

use std::fmt;
use tracing::{debug, warn};

use crate::client::FetchError;
use crate::segment::{Segment, Variant};

/// Identifies one issued fetch; later requests compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// A fetch the caller should perform on the session's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub token: RequestToken,
    pub term: String,
}

/// What applying a response did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The list was replaced and the cursor reset
    Replaced(usize),
    /// The failure switched the session to its error view
    Failed,
    /// The failure was dropped because the variant does not report errors
    Ignored,
    /// The response belonged to an outdated request
    Stale,
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    variant: Variant,
    term: String,
    segments: Vec<Segment>,
    cursor: usize,
    failed: bool,
    issued: u64,
}

impl SearchSession {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            term: String::new(),
            segments: Vec::new(),
            cursor: 0,
            failed: false,
            issued: 0,
        }
    }

    /// Record a new search term.
    ///
    /// Returns the fetch to perform, or `None` when the term is empty, has not
    /// changed, or the session is showing its error view.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> Option<SearchRequest> {
        if self.failed {
            return None;
        }

        let term = term.into();
        if term == self.term {
            return None;
        }
        self.term = term;

        if self.term.is_empty() {
            return None;
        }

        self.issued += 1;
        let request = SearchRequest {
            token: RequestToken(self.issued),
            term: self.term.clone(),
        };
        debug!("Issuing request {:?} for '{}'", request.token, request.term);
        Some(request)
    }

    /// Apply the result of a fetch issued by [`set_search_term`](Self::set_search_term)
    pub fn apply(&mut self, token: RequestToken, result: Result<Vec<Segment>, FetchError>) -> Outcome {
        if token != RequestToken(self.issued) {
            debug!("Dropping stale response {:?} (latest is {})", token, self.issued);
            return Outcome::Stale;
        }

        match result {
            Ok(segments) => {
                let count = segments.len();
                self.segments = segments;
                self.cursor = 0;
                Outcome::Replaced(count)
            }
            Err(e) if self.variant.reports_errors() => {
                warn!("Search for '{}' failed: {}", self.term, e);
                self.failed = true;
                Outcome::Failed
            }
            Err(e) => {
                debug!("Ignoring failed search for '{}': {}", self.term, e);
                Outcome::Ignored
            }
        }
    }

    /// Advance to the next segment, wrapping to the first past the end
    pub fn next(&mut self) {
        if self.failed || self.segments.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.segments.len();
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_error(&self) -> bool {
        self.failed
    }

    pub fn current(&self) -> Option<&Segment> {
        self.segments.get(self.cursor)
    }

    pub fn view(&self) -> View<'_> {
        if self.failed {
            return View::Error;
        }

        match self.current() {
            Some(segment) => View::Player {
                segment,
                position: self.cursor + 1,
                total: self.segments.len(),
                show_position: !self.term.is_empty(),
            },
            None => View::Prompt,
        }
    }
}

/// Renderable state of a session
#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    /// A fetch failed; nothing else is shown
    Error,
    /// No results to show yet
    Prompt,
    Player {
        segment: &'a Segment,
        /// 1-based
        position: usize,
        total: usize,
        /// The indicator is hidden while the search box is empty
        show_position: bool,
    },
}

impl View<'_> {
    pub fn indicator(&self) -> Option<String> {
        match self {
            View::Player {
                position,
                total,
                show_position: true,
                ..
            } => Some(format!("{} of {} videos", position, total)),
            _ => None,
        }
    }
}

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Error => writeln!(f, "An error occurred"),
            View::Prompt => {
                writeln!(f, "Try searching something")?;
                writeln!(f, "[Next]")
            }
            View::Player { segment, .. } => {
                if let Some(indicator) = self.indicator() {
                    writeln!(f, "{}", indicator)?;
                }
                writeln!(f, "▶ {}", segment.embed_url)?;
                writeln!(f, "{}", segment.caption)?;
                writeln!(f, "[Next]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(caption: &str, url: &str) -> Segment {
        Segment {
            caption: caption.to_string(),
            embed_url: url.to_string(),
        }
    }

    fn cats() -> Vec<Segment> {
        vec![
            seg("intro", "https://yt/embed/abc"),
            seg("outro", "https://yt/embed/def"),
        ]
    }

    fn malformed() -> FetchError {
        FetchError::Malformed(serde_json::from_str::<Vec<u8>>("{").unwrap_err())
    }

    #[test]
    fn test_empty_term_issues_no_request() {
        let mut session = SearchSession::new(Variant::Links);
        assert!(session.set_search_term("").is_none());
        assert_eq!(session.view(), View::Prompt);
    }

    #[test]
    fn test_each_change_issues_one_request() {
        let mut session = SearchSession::new(Variant::Links);
        let first = session.set_search_term("c").unwrap();
        assert_eq!(first.term, "c");
        assert!(session.set_search_term("c").is_none());

        let second = session.set_search_term("ca").unwrap();
        assert!(second.token > first.token);
    }

    #[test]
    fn test_cats_example() {
        let mut session = SearchSession::new(Variant::Links);
        let request = session.set_search_term("cats").unwrap();
        assert_eq!(session.apply(request.token, Ok(cats())), Outcome::Replaced(2));

        let view = session.view();
        assert_eq!(view.indicator().as_deref(), Some("1 of 2 videos"));
        assert_eq!(session.current().unwrap().embed_url, "https://yt/embed/abc");
        assert_eq!(session.current().unwrap().caption, "intro");

        session.next();
        assert_eq!(session.view().indicator().as_deref(), Some("2 of 2 videos"));
        session.next();
        assert_eq!(session.view().indicator().as_deref(), Some("1 of 2 videos"));
        assert_eq!(session.current().unwrap().caption, "intro");
    }

    #[test]
    fn test_new_response_resets_cursor() {
        let mut session = SearchSession::new(Variant::Links);
        let request = session.set_search_term("cats").unwrap();
        session.apply(request.token, Ok(cats()));
        session.next();
        assert_eq!(session.cursor(), 1);

        let request = session.set_search_term("dogs").unwrap();
        session.apply(request.token, Ok(vec![seg("woof", "u1"), seg("bark", "u2"), seg("arf", "u3")]));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.view().indicator().as_deref(), Some("1 of 3 videos"));
    }

    #[test]
    fn test_next_on_empty_list_stays_put() {
        let mut session = SearchSession::new(Variant::Links);
        session.next();
        assert_eq!(session.cursor(), 0);

        let request = session.set_search_term("none").unwrap();
        assert_eq!(session.apply(request.token, Ok(Vec::new())), Outcome::Replaced(0));
        session.next();
        assert_eq!(session.view(), View::Prompt);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut session = SearchSession::new(Variant::Links);
        let old = session.set_search_term("ca").unwrap();
        let new = session.set_search_term("cats").unwrap();

        assert_eq!(session.apply(new.token, Ok(cats())), Outcome::Replaced(2));
        assert_eq!(session.apply(old.token, Ok(vec![seg("stale", "x")])), Outcome::Stale);
        assert_eq!(session.current().unwrap().caption, "intro");

        assert_eq!(session.apply(old.token, Err(malformed())), Outcome::Stale);
        assert!(!session.has_error());
    }

    #[test]
    fn test_links_failure_shows_error_view() {
        let mut session = SearchSession::new(Variant::Links);
        let request = session.set_search_term("cats").unwrap();
        assert_eq!(session.apply(request.token, Err(malformed())), Outcome::Failed);

        assert_eq!(session.view(), View::Error);
        assert_eq!(session.view().to_string(), "An error occurred\n");
        assert!(session.set_search_term("dogs").is_none());
    }

    #[test]
    fn test_videos_failure_is_ignored() {
        let mut session = SearchSession::new(Variant::Videos);
        let request = session.set_search_term("cats").unwrap();
        session.apply(request.token, Ok(cats()));

        let request = session.set_search_term("dogs").unwrap();
        assert_eq!(session.apply(request.token, Err(malformed())), Outcome::Ignored);
        assert!(!session.has_error());
        assert_eq!(session.current().unwrap().caption, "intro");
    }

    #[test]
    fn test_clearing_term_hides_indicator_but_keeps_results() {
        let mut session = SearchSession::new(Variant::Links);
        let request = session.set_search_term("cats").unwrap();
        session.apply(request.token, Ok(cats()));

        assert!(session.set_search_term("").is_none());
        let view = session.view();
        assert!(view.indicator().is_none());
        assert!(matches!(view, View::Player { .. }));
    }

    #[test]
    fn test_player_rendering() {
        let mut session = SearchSession::new(Variant::Links);
        let request = session.set_search_term("cats").unwrap();
        session.apply(request.token, Ok(cats()));

        let rendered = session.view().to_string();
        assert_eq!(rendered, "1 of 2 videos\n▶ https://yt/embed/abc\nintro\n[Next]\n");
    }
}
