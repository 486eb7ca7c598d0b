// src/tracker.rs
use crate::models::TestResult;

/// Results that appeared since the previous observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    pub results: Vec<TestResult>,
    /// Set when the observed list was shorter than the retained one, in which
    /// case `results` is the whole new list.
    pub reset: bool,
}

/// Remembers the last full result list and hands out only what is new.
#[derive(Debug, Default, Clone)]
pub struct DiffTracker {
    retained: Vec<TestResult>,
}

impl DiffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `full[previous_len..]` and retains `full`.
    pub fn observe(&mut self, full: Vec<TestResult>) -> Delta {
        let previous = self.retained.len();
        let reset = full.len() < previous;
        let start = if reset { 0 } else { previous };
        let results = full[start..].to_vec();
        self.retained = full;
        Delta { results, reset }
    }

    pub fn retained(&self) -> &[TestResult] {
        &self.retained
    }

    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    pub fn clear(&mut self) {
        self.retained.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestStatus;

    fn result(name: &str) -> TestResult {
        TestResult {
            duration: 1.0,
            errors: vec![],
            status: TestStatus::Pass,
            test_path: vec![name.to_string()],
        }
    }

    fn names(results: &[TestResult]) -> Vec<String> {
        results.iter().map(|r| r.test_path.join(" > ")).collect()
    }

    #[test]
    fn deltas_concatenate_to_the_latest_list() {
        let lists = [
            vec![result("a")],
            vec![result("a"), result("b"), result("c")],
            vec![result("a"), result("b"), result("c")],
            vec![result("a"), result("b"), result("c"), result("d")],
        ];

        let mut tracker = DiffTracker::new();
        let mut seen = Vec::new();
        for list in lists.iter() {
            let delta = tracker.observe(list.clone());
            assert!(!delta.reset);
            assert_eq!(tracker.len(), list.len());
            seen.extend(delta.results);
        }

        assert_eq!(names(&seen), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn unchanged_list_gives_empty_delta() {
        let mut tracker = DiffTracker::new();
        tracker.observe(vec![result("a")]);
        let delta = tracker.observe(vec![result("a")]);
        assert!(delta.results.is_empty());
    }

    #[test]
    fn shrinking_list_counts_as_reset() {
        let mut tracker = DiffTracker::new();
        tracker.observe(vec![result("a"), result("b")]);

        let delta = tracker.observe(vec![result("z")]);
        assert!(delta.reset);
        assert_eq!(names(&delta.results), vec!["z"]);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut tracker = DiffTracker::new();
        tracker.observe(vec![result("a")]);
        tracker.clear();
        assert!(tracker.is_empty());
        assert_eq!(names(&tracker.observe(vec![result("a")]).results), vec!["a"]);
    }
}
