use chrono::{DateTime, TimeDelta, Utc};

use crate::Exercise;

pub const DEFAULT_SEARCH_DELAY_MS: u32 = 300;
pub const QUICK_SEARCH_LIMIT: usize = 10;
pub const MODAL_SEARCH_LIMIT: usize = 20;

/// A search that is due to be sent to the exercise repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: String,
    pub limit: usize,
}

/// Debounced exercise search.
///
/// A request is issued only after the input has been stable for the configured delay. Responses
/// to superseded requests are discarded, so results always belong to the current input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSearch {
    delay: TimeDelta,
    limit: usize,
    query: String,
    deadline: Option<DateTime<Utc>>,
    generation: u64,
    in_flight: Option<u64>,
    results: Vec<Exercise>,
    failed: bool,
}

impl QuickSearch {
    #[must_use]
    pub fn new(delay: TimeDelta, limit: usize) -> Self {
        Self {
            delay,
            limit,
            query: String::new(),
            deadline: None,
            generation: 0,
            in_flight: None,
            results: vec![],
            failed: false,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &[Exercise] {
        &self.results
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Point in time at which the pending input will be turned into a request.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn input(&mut self, query: &str, now: DateTime<Utc>) {
        self.query = query.to_string();
        self.generation += 1;
        self.failed = false;

        if query.trim().is_empty() {
            self.deadline = None;
            self.in_flight = None;
            self.results.clear();
        } else {
            self.deadline = Some(now + self.delay);
        }
    }

    /// Issue the pending request if the input has been stable long enough.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<SearchRequest> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.in_flight = Some(self.generation);
        Some(SearchRequest {
            generation: self.generation,
            query: self.query.trim().to_string(),
            limit: self.limit,
        })
    }

    /// Apply the response of a request. Returns `false` if the request has been superseded.
    pub fn complete(&mut self, request: &SearchRequest, results: Vec<Exercise>) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.in_flight = None;
        self.failed = false;
        self.results = results;
        self.results.truncate(self.limit);
        true
    }

    pub fn fail(&mut self, request: &SearchRequest) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.in_flight = None;
        self.failed = true;
        self.results.clear();
        true
    }

    pub fn clear(&mut self) {
        self.input("", DateTime::UNIX_EPOCH);
    }

    fn is_current(&self, request: &SearchRequest) -> bool {
        self.in_flight == Some(request.generation)
            && request.generation == self.generation
            && request.query == self.query.trim()
    }
}

impl Default for QuickSearch {
    fn default() -> Self {
        Self::new(
            TimeDelta::milliseconds(i64::from(DEFAULT_SEARCH_DELAY_MS)),
            QUICK_SEARCH_LIMIT,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn exercise(id: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: id.to_string(),
            name_en: String::new(),
            full_video_url: None,
            full_video_image_url: None,
            attributes: vec![],
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn test_default() {
        let search = QuickSearch::default();

        assert_eq!(search.limit(), QUICK_SEARCH_LIMIT);
        assert_eq!(search.query(), "");
        assert!(!search.is_loading());
    }

    #[rstest]
    #[case(0, None)]
    #[case(299, None)]
    #[case(300, Some("bench"))]
    #[case(1000, Some("bench"))]
    fn test_poll_after_delay(#[case] now: i64, #[case] expected: Option<&str>) {
        let mut search = QuickSearch::default();
        search.input("bench", at(0));

        assert_eq!(
            search.poll(at(now)).map(|r| r.query),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn test_poll_debounces_keystrokes() {
        let mut search = QuickSearch::default();
        search.input("be", at(0));
        search.input("ben", at(200));
        search.input("bench", at(400));

        assert_eq!(search.poll(at(600)), None);
        assert_eq!(
            search.poll(at(700)),
            Some(SearchRequest {
                generation: 3,
                query: "bench".to_string(),
                limit: QUICK_SEARCH_LIMIT,
            })
        );
        assert!(search.is_loading());
        assert_eq!(search.poll(at(800)), None);
    }

    #[test]
    fn test_complete() {
        let mut search = QuickSearch::default();
        search.input(" press ", at(0));
        let request = search.poll(at(300)).unwrap();

        assert_eq!(request.query, "press");
        assert!(search.complete(&request, vec![exercise("a"), exercise("b")]));
        assert_eq!(search.results(), &[exercise("a"), exercise("b")]);
        assert!(!search.is_loading());
    }

    #[test]
    fn test_complete_discards_stale_response() {
        let mut search = QuickSearch::default();
        search.input("pre", at(0));
        let stale = search.poll(at(300)).unwrap();
        search.input("press", at(400));
        let current = search.poll(at(700)).unwrap();

        assert!(search.complete(&current, vec![exercise("b")]));
        assert!(!search.complete(&stale, vec![exercise("a")]));
        assert_eq!(search.results(), &[exercise("b")]);
    }

    #[test]
    fn test_complete_discards_response_for_changed_input() {
        let mut search = QuickSearch::default();
        search.input("press", at(0));
        let request = search.poll(at(300)).unwrap();
        search.input("pressure", at(350));

        assert!(!search.complete(&request, vec![exercise("a")]));
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_complete_truncates_to_limit() {
        let mut search = QuickSearch::new(TimeDelta::zero(), 2);
        search.input("a", at(0));
        let request = search.poll(at(0)).unwrap();

        search.complete(&request, vec![exercise("a"), exercise("b"), exercise("c")]);

        assert_eq!(search.results().len(), 2);
    }

    #[test]
    fn test_fail() {
        let mut search = QuickSearch::default();
        search.input("row", at(0));
        let request = search.poll(at(300)).unwrap();
        search.complete(&request, vec![exercise("a")]);
        search.input("rows", at(400));
        let request = search.poll(at(700)).unwrap();

        assert!(search.fail(&request));
        assert!(search.has_failed());
        assert!(!search.is_loading());
        assert!(search.results().is_empty());

        search.input("rowing", at(800));

        assert!(!search.has_failed());
    }

    #[test]
    fn test_fail_ignores_stale_request() {
        let mut search = QuickSearch::default();
        search.input("row", at(0));
        let request = search.poll(at(300)).unwrap();
        search.input("rows", at(400));

        assert!(!search.fail(&request));
        assert!(!search.has_failed());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_input_clears_results(#[case] query: &str) {
        let mut search = QuickSearch::default();
        search.input("squat", at(0));
        let request = search.poll(at(300)).unwrap();
        search.complete(&request, vec![exercise("a")]);
        search.input("squa", at(400));

        search.input(query, at(500));

        assert!(search.results().is_empty());
        assert_eq!(search.deadline(), None);
        assert_eq!(search.poll(at(10_000)), None);
    }

    #[test]
    fn test_clear_cancels_in_flight_request() {
        let mut search = QuickSearch::default();
        search.input("squat", at(0));
        let request = search.poll(at(300)).unwrap();

        search.clear();

        assert_eq!(search.query(), "");
        assert!(!search.is_loading());
        assert!(!search.complete(&request, vec![exercise("a")]));
        assert!(search.results().is_empty());
    }
}
