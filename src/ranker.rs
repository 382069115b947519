//! Confidence ranking and disambiguation
//!
//! The model reports one confidence per known language. Downstream
//! consumers (editor heuristics, mode pickers) want a short, high-precision
//! answer, not the full distribution, so [`rank`] collapses near-tied
//! candidates into a single decision or a small tied group and discards
//! low-signal results entirely.
//!
//! Ranking is pure and synchronous: no suspension points, deterministic
//! for fixed input.

use std::collections::HashSet;

/// One language candidate scored by the model.
///
/// `confidence` is the engine-native score. The model in use emits
/// probability-like values, which is what the default threshold of 0.2
/// assumes; see `RankerConfig::threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub language_id: String,
    pub confidence: f32,
}

impl ScoredCandidate {
    pub fn new(language_id: impl Into<String>, confidence: f32) -> Self {
        Self {
            language_id: language_id.into(),
            confidence,
        }
    }
}

/// Sort candidates descending by confidence. Ties keep their relative
/// engine output order, so ordering is deterministic for a fixed engine.
pub fn sort_by_confidence(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// A set of unordered language-id pairs the heuristic deliberately does
/// not disambiguate from each other.
///
/// When a confidence gap would normally end the current plateau but the
/// two languages are a declared pair, the walk keeps accumulating instead.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceSet {
    pairs: HashSet<(String, String)>,
}

impl EquivalenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an unordered pair.
    pub fn insert(&mut self, a: impl Into<String>, b: impl Into<String>) {
        let (a, b) = Self::ordered(a.into(), b.into());
        self.pairs.insert((a, b));
    }

    /// Check whether two language ids are a declared pair.
    pub fn contains(&self, a: &str, b: &str) -> bool {
        let (a, b) = Self::ordered(a.to_owned(), b.to_owned());
        self.pairs.contains(&(a, b))
    }

    fn ordered(a: String, b: String) -> (String, String) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Configuration for the disambiguation walk.
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Relative confidence threshold. A top candidate below it means no
    /// result at all; candidates within it of each other are considered
    /// tied. The reference value 0.2 treats confidences as
    /// probability-like.
    pub threshold: f32,
    /// Language pairs never disambiguated from each other.
    pub equivalence: EquivalenceSet,
}

impl Default for RankerConfig {
    fn default() -> Self {
        let mut equivalence = EquivalenceSet::new();
        equivalence.insert("ts", "js");
        equivalence.insert("c", "cpp");
        Self {
            threshold: 0.2,
            equivalence,
        }
    }
}

/// Decide which language ids to report from one inference call's results.
///
/// `candidates` must already be sorted descending by confidence (as
/// returned by `ModelOperations::run_model`). The walk keeps a "plateau"
/// of candidates currently considered tied:
///
/// - a gap of at least `threshold` between the plateau's last member and
///   the next candidate drains the plateau into the result, then starts a
///   fresh plateau if the candidate itself clears the threshold;
/// - within the threshold (or across a declared equivalence pair), the
///   candidate joins the plateau as long as it clears the threshold;
/// - the first candidate below the threshold ends the walk.
///
/// Only drained plateaus are reported; a trailing plateau never confirmed
/// by a gap below it is dropped. The result is nothing, one language, or
/// a short tied group — never a long tail.
pub fn rank(candidates: &[ScoredCandidate], config: &RankerConfig) -> Vec<String> {
    let mut decided = Vec::new();

    let Some(first) = candidates.first() else {
        return decided;
    };
    if first.confidence < config.threshold {
        return decided;
    }

    let mut plateau: Vec<&ScoredCandidate> = vec![first];

    for current in &candidates[1..] {
        // plateau is never empty inside the loop
        let Some(last) = plateau.last() else {
            break;
        };

        let gap_exceeded = last.confidence - current.confidence >= config.threshold;
        let equivalent = config
            .equivalence
            .contains(&last.language_id, &current.language_id);

        if gap_exceeded && !equivalent {
            decided.extend(plateau.drain(..).map(|c| c.language_id.clone()));
            if current.confidence > config.threshold {
                plateau.push(current);
                continue;
            }
            return decided;
        }

        if current.confidence > config.threshold {
            plateau.push(current);
            continue;
        }
        return decided;
    }

    decided
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(pairs: &[(&str, f32)]) -> Vec<ScoredCandidate> {
        pairs
            .iter()
            .map(|(id, c)| ScoredCandidate::new(*id, *c))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(rank(&[], &RankerConfig::default()).is_empty());
    }

    #[test]
    fn test_low_top_confidence_yields_nothing() {
        let results = candidates(&[("py", 0.15), ("rb", 0.1)]);
        assert!(rank(&results, &RankerConfig::default()).is_empty());
    }

    #[test]
    fn test_equivalent_pair_reported_together() {
        let results = candidates(&[("ts", 0.9), ("js", 0.85), ("py", 0.3)]);
        let decided = rank(&results, &RankerConfig::default());
        assert_eq!(decided, vec!["ts".to_string(), "js".to_string()]);
    }

    #[test]
    fn test_clear_winner_with_weak_runner_up() {
        let results = candidates(&[("java", 0.9), ("c", 0.1)]);
        let decided = rank(&results, &RankerConfig::default());
        assert_eq!(decided, vec!["java".to_string()]);
    }

    #[test]
    fn test_gap_starts_new_plateau_which_is_dropped_without_confirmation() {
        // The gap below "a" drains it; "b" and "c" form a trailing plateau
        // that no later gap confirms, so only "a" is reported.
        let results = candidates(&[("a", 0.95), ("b", 0.5), ("c", 0.45)]);
        let decided = rank(&results, &RankerConfig::default());
        assert_eq!(decided, vec!["a".to_string()]);
    }

    #[test]
    fn test_second_plateau_confirmed_by_second_gap() {
        let results = candidates(&[("a", 0.95), ("b", 0.5), ("c", 0.45), ("d", 0.05)]);
        let decided = rank(&results, &RankerConfig::default());
        assert_eq!(
            decided,
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_equivalence_bridges_gap() {
        // Without the pair the 0.25 gap would drain {c}; with it, cpp joins
        // the plateau and both drain together at the drop to html.
        let results = candidates(&[("c", 0.7), ("cpp", 0.45), ("html", 0.05)]);
        let decided = rank(&results, &RankerConfig::default());
        assert_eq!(decided, vec!["c".to_string(), "cpp".to_string()]);
    }

    #[test]
    fn test_equivalence_does_not_rescue_below_threshold_candidate() {
        let results = candidates(&[("ts", 0.9), ("js", 0.15)]);
        let decided = rank(&results, &RankerConfig::default());
        assert!(decided.is_empty());
    }

    #[test]
    fn test_single_candidate_never_drained() {
        // One candidate forms a plateau that nothing below confirms.
        let results = candidates(&[("rs", 0.9)]);
        assert!(rank(&results, &RankerConfig::default()).is_empty());
    }

    #[test]
    fn test_custom_equivalence_pair() {
        let mut config = RankerConfig::default();
        config.equivalence.insert("kt", "java");
        let results = candidates(&[("kt", 0.8), ("java", 0.55), ("go", 0.1)]);
        let decided = rank(&results, &config);
        assert_eq!(decided, vec!["kt".to_string(), "java".to_string()]);
    }

    #[test]
    fn test_equivalence_set_is_unordered() {
        let mut set = EquivalenceSet::new();
        set.insert("ts", "js");
        assert!(set.contains("js", "ts"));
        assert!(set.contains("ts", "js"));
        assert!(!set.contains("ts", "py"));
    }

    #[test]
    fn test_sort_by_confidence_descending() {
        let mut results = candidates(&[("py", 0.2), ("rs", 0.7), ("go", 0.5)]);
        sort_by_confidence(&mut results);
        let ids: Vec<&str> = results.iter().map(|c| c.language_id.as_str()).collect();
        assert_eq!(ids, vec!["rs", "go", "py"]);
    }
}
