//! In-chat search.
//!
//! Search bypasses windowing: it scans the whole document in parse order and
//! returns a flat list of hits, each carrying the `original_index` needed to
//! jump back into the windowed view. Keystrokes are debounced so a query only
//! runs once typing pauses.

mod debounce;

pub use debounce::Debouncer;

use std::time::Instant;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::SearchConfig;
use crate::error::{Result, ViewerError};
use crate::model::{ChatDocument, Message};

/// A run of display text, either matching the query or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// The text.
    pub text: String,
    /// Whether it matched the query.
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Stable index of the matching message.
    pub original_index: usize,
    /// Sender name.
    pub sender: String,
    /// Header date.
    pub date: String,
    /// Header time.
    pub time: String,
    /// Whether the message carries an attachment.
    pub is_media: bool,
    /// Display text split into highlighted and plain runs.
    pub segments: Vec<Segment>,
}

/// Build the case-insensitive literal matcher for `query`.
pub fn matcher(query: &str) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| ViewerError::InvalidArgument {
            name: "query".to_string(),
            reason: e.to_string(),
        })
}

/// Find messages whose sender or body contains `query`, ignoring case.
///
/// Scans in parse order and stops after `cap` hits.
#[instrument(skip(doc), fields(messages = doc.len()))]
pub fn search(doc: &ChatDocument, query: &str, cap: usize) -> Result<Vec<SearchHit>> {
    let re = matcher(query)?;
    let hits: Vec<SearchHit> = doc
        .messages
        .iter()
        .filter(|m| re.is_match(&m.text) || re.is_match(&m.sender))
        .take(cap)
        .map(|m| to_hit(m, &re))
        .collect();

    debug!(hits = hits.len(), "Search complete");
    Ok(hits)
}

fn to_hit(msg: &Message, re: &Regex) -> SearchHit {
    // Captions of media messages are not highlighted
    let segments = if msg.is_media {
        vec![Segment::plain(msg.display_text())]
    } else {
        highlight(msg.display_text(), re)
    };

    SearchHit {
        original_index: msg.original_index,
        sender: msg.sender.clone(),
        date: msg.date.clone(),
        time: msg.time.clone(),
        is_media: msg.is_media,
        segments,
    }
}

/// Split `text` into matched and unmatched runs.
#[must_use]
pub fn highlight(text: &str, re: &Regex) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in re.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        if m.start() > last {
            segments.push(Segment::plain(&text[last..m.start()]));
        }
        segments.push(Segment {
            text: m.as_str().to_string(),
            matched: true,
        });
        last = m.end();
    }

    if last < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[last..]));
    }
    segments
}

/// What the viewer should do after a debounced query fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchUpdate {
    /// The query was emptied; leave search.
    Cleared,
    /// A query ran and produced this many hits.
    Results(usize),
}

/// Debounced search over the open chat.
#[derive(Debug, Clone)]
pub struct SearchController {
    config: SearchConfig,
    debouncer: Debouncer<String>,
    query: String,
    results: Vec<SearchHit>,
}

impl SearchController {
    /// Create a controller.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce()),
            config,
            query: String::new(),
            results: Vec::new(),
        }
    }

    /// Queue a query; it replaces any query still waiting.
    pub fn input(&mut self, query: impl Into<String>, now: Instant) {
        self.debouncer.push(query.into(), now);
    }

    /// Whether a query is waiting for the debounce to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Run the waiting query once its debounce has elapsed.
    pub fn poll(&mut self, now: Instant, doc: &ChatDocument) -> Result<Option<SearchUpdate>> {
        match self.debouncer.take_ready(now) {
            Some(query) => self.submit(query, doc).map(Some),
            None => Ok(None),
        }
    }

    /// Run `query` immediately.
    pub fn submit(&mut self, query: impl Into<String>, doc: &ChatDocument) -> Result<SearchUpdate> {
        self.debouncer.cancel();
        self.query = query.into();

        if self.query.is_empty() {
            self.results.clear();
            return Ok(SearchUpdate::Cleared);
        }

        self.results = search(doc, &self.query, self.config.max_results)?;
        Ok(SearchUpdate::Results(self.results.len()))
    }

    /// Drop the query, pending input and results.
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.query.clear();
        self.results.clear();
    }

    /// Last query that ran.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Hits of the last query.
    #[must_use]
    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_chat;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ten_messages() -> ChatDocument {
        let raw = [
            "[1/2/23, 09:00] Alice: Hi there",
            "[1/2/23, 09:01] Bob: hello",
            "[1/2/23, 09:02] Alice: how are you",
            "[1/2/23, 09:03] Bob: fine",
            "[1/2/23, 09:04] Alice: ok",
            "[1/2/23, 09:05] Bob: THIS is it",
            "[1/2/23, 09:06] Alice: bye",
            "[1/2/23, 09:07] Bob: later",
            "[1/2/23, 09:08] Alice: sure",
            "[1/2/23, 09:09] Bob: done",
        ]
        .join("\n");
        parse_chat(&raw, "chat", &[])
    }

    #[test]
    fn test_search_order_and_case() {
        let hits = search(&ten_messages(), "hi", 250).unwrap();
        let indexes: Vec<usize> = hits.iter().map(|h| h.original_index).collect();
        assert_eq!(indexes, vec![0, 5]);
    }

    #[test]
    fn test_search_matches_sender() {
        let hits = search(&ten_messages(), "bob", 250).unwrap();
        assert_eq!(hits.len(), 5);
    }

    #[test]
    fn test_search_is_capped() {
        let hits = search(&ten_messages(), "1/2", 250).unwrap();
        assert!(hits.is_empty());

        let hits = search(&ten_messages(), "e", 3).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_query_is_literal() {
        let doc = parse_chat("[1/2/23, 09:00] A: price (USD) is 5.00\n[1/2/23, 09:01] A: 5x00", "c", &[]);
        let hits = search(&doc, "5.00", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(search(&doc, "(usd", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_highlight_segments() {
        let re = matcher("hi").unwrap();
        let segments = highlight("Hi, this is HI", &re);
        let rendered: Vec<(String, bool)> = segments.into_iter().map(|s| (s.text, s.matched)).collect();
        assert_eq!(
            rendered,
            vec![
                ("Hi".to_string(), true),
                (", t".to_string(), false),
                ("hi".to_string(), true),
                ("s is ".to_string(), false),
                ("HI".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_media_caption_not_highlighted() {
        let doc = parse_chat("[1/2/23, 09:00] A: <attached: hi.jpg> hi", "c", &["hi.jpg".to_string()]);
        let hits = search(&doc, "hi", 10).unwrap();
        assert_eq!(hits[0].segments, vec![Segment::plain("hi")]);
    }

    #[test]
    fn test_debounced_controller() {
        let doc = ten_messages();
        let mut controller = SearchController::new(SearchConfig::default());
        let t0 = Instant::now();

        controller.input("h", t0);
        controller.input("hi", t0 + Duration::from_millis(100));
        assert_eq!(controller.poll(t0 + Duration::from_millis(350), &doc).unwrap(), None);

        let update = controller.poll(t0 + Duration::from_millis(400), &doc).unwrap();
        assert_eq!(update, Some(SearchUpdate::Results(2)));
        assert_eq!(controller.query(), "hi");
        assert!(!controller.is_pending());

        controller.input("", t0 + Duration::from_millis(500));
        let update = controller.poll(t0 + Duration::from_secs(1), &doc).unwrap();
        assert_eq!(update, Some(SearchUpdate::Cleared));
        assert!(controller.results().is_empty());
    }
}
