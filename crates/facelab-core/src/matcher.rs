//! Threshold matching policy.

use crate::types::{Embedding, KnownFaceEntry};

/// Default Euclidean distance cutoff for accepting a match.
pub const MATCH_THRESHOLD: f32 = 0.6;

/// Strategy for matching a probe embedding against the stored gallery.
pub trait Matcher {
    /// Return the store index of the matched entry, or `None`.
    fn first_match(
        &self,
        probe: &Embedding,
        gallery: &[KnownFaceEntry],
        threshold: f32,
    ) -> Option<usize>;
}

/// First-match-wins matcher: accepts the FIRST entry in store-insertion
/// order whose distance falls within the threshold.
///
/// Deliberately not nearest-neighbor. When two stored entries both fall
/// within threshold of a probe, the earlier-enrolled one wins regardless
/// of which is closer. This reproduces the established labeling behavior;
/// switching to best-match would change observable output and is tracked
/// as a possible future policy, not a silent fix.
pub struct FirstMatchMatcher;

impl Matcher for FirstMatchMatcher {
    fn first_match(
        &self,
        probe: &Embedding,
        gallery: &[KnownFaceEntry],
        threshold: f32,
    ) -> Option<usize> {
        gallery
            .iter()
            .position(|entry| probe.euclidean_distance(&entry.embedding) <= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, values: Vec<f32>) -> KnownFaceEntry {
        KnownFaceEntry { name: name.to_string(), embedding: Embedding::new(values) }
    }

    #[test]
    fn test_no_match_beyond_threshold() {
        let gallery = vec![entry("Alice", vec![10.0, 0.0])];
        let probe = Embedding::new(vec![0.0, 0.0]);
        assert_eq!(FirstMatchMatcher.first_match(&probe, &gallery, MATCH_THRESHOLD), None);
    }

    #[test]
    fn test_match_within_threshold() {
        let gallery = vec![entry("Alice", vec![0.1, 0.0])];
        let probe = Embedding::new(vec![0.0, 0.0]);
        assert_eq!(
            FirstMatchMatcher.first_match(&probe, &gallery, MATCH_THRESHOLD),
            Some(0)
        );
    }

    #[test]
    fn test_first_match_wins_over_closer_later_entry() {
        // Both entries within threshold; the second is strictly closer.
        // Insertion order still decides.
        let gallery = vec![
            entry("Alice", vec![0.5, 0.0]),
            entry("Bob", vec![0.01, 0.0]),
        ];
        let probe = Embedding::new(vec![0.0, 0.0]);
        assert_eq!(
            FirstMatchMatcher.first_match(&probe, &gallery, MATCH_THRESHOLD),
            Some(0)
        );
    }

    #[test]
    fn test_empty_gallery() {
        let probe = Embedding::new(vec![0.0]);
        assert_eq!(FirstMatchMatcher.first_match(&probe, &[], MATCH_THRESHOLD), None);
    }

    #[test]
    fn test_boundary_distance_is_a_match() {
        // Distance exactly equal to the threshold counts as a match.
        let gallery = vec![entry("Alice", vec![0.6, 0.0])];
        let probe = Embedding::new(vec![0.0, 0.0]);
        assert_eq!(FirstMatchMatcher.first_match(&probe, &gallery, 0.6), Some(0));
    }
}
