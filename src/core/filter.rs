//! Select threads by participant names.
//!
//! This module provides [`ThreadFilter`], which decides whether a thread is
//! recorded or skipped while an archive is parsed.
//!
//! # Matching Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Cardinality | The thread must have exactly as many participants as there are fragments |
//! | Fragment | A fragment matches a participant's full name or one whitespace-separated part of it |
//! | Coverage | Fragments and participants must pair up one to one |
//!
//! All comparisons are case-insensitive.
//!
//! # Examples
//!
//! ```
//! use fbchat_history::core::filter::ThreadFilter;
//!
//! let filter: ThreadFilter = "Jack, Billy Joel".parse().unwrap();
//!
//! assert!(filter.matches(&["Jack Stevenson", "Billy Joel"]));
//! assert!(filter.matches(&["Billy Joel", "Jack Jack"]));
//!
//! // Wrong number of participants
//! assert!(!filter.matches(&["Jack Stevenson"]));
//! // Nobody called Jack
//! assert!(!filter.matches(&["John Smith", "Billy Joel"]));
//! ```
//!
//! # Behavior Notes
//!
//! - An empty filter accepts every thread
//! - Runs of whitespace in the filter text collapse to a single space

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Participant filter applied to every thread in an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadFilter {
    fragments: Vec<String>,
}

impl ThreadFilter {
    /// Creates a filter from name fragments.
    ///
    /// Fragments are trimmed and lower-cased; empty fragments are dropped.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fragments = fragments
            .into_iter()
            .map(|f| normalize(f.as_ref()))
            .filter(|f| !f.is_empty())
            .collect();
        Self { fragments }
    }

    /// Returns the normalized fragments.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Returns `true` if the filter restricts anything.
    pub fn is_active(&self) -> bool {
        !self.fragments.is_empty()
    }

    /// Decides whether a thread with these participants should be recorded.
    ///
    /// `participants` must exclude the archive owner.
    pub fn matches<S: AsRef<str>>(&self, participants: &[S]) -> bool {
        if !self.is_active() {
            return true;
        }
        if participants.len() != self.fragments.len() {
            return false;
        }

        // candidates[f] lists the participants fragment f may stand for.
        let candidates: Vec<Vec<usize>> = self
            .fragments
            .iter()
            .map(|fragment| {
                participants
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| fragment_matches(fragment, p.as_ref()))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        if candidates.iter().any(Vec::is_empty) {
            return false;
        }

        let mut owner_of: Vec<Option<usize>> = vec![None; participants.len()];
        (0..candidates.len()).all(|f| {
            let mut visited = vec![false; participants.len()];
            augment(f, &candidates, &mut owner_of, &mut visited)
        })
    }
}

impl FromStr for ThreadFilter {
    type Err = Infallible;

    /// Parses a comma-separated list such as `"Billy,  Steve Smith"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.split(',')))
    }
}

fn normalize(fragment: &str) -> String {
    fragment
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn fragment_matches(fragment: &str, participant: &str) -> bool {
    let participant = participant.to_lowercase();
    participant == fragment || participant.split(' ').any(|token| token == fragment)
}

/// Kuhn's augmenting path step for bipartite matching.
fn augment(
    fragment: usize,
    candidates: &[Vec<usize>],
    owner_of: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &participant in &candidates[fragment] {
        if visited[participant] {
            continue;
        }
        visited[participant] = true;
        let free = match owner_of[participant] {
            None => true,
            Some(other) => augment(other, candidates, owner_of, visited),
        };
        if free {
            owner_of[participant] = Some(fragment);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(s: &str) -> ThreadFilter {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let f = filter("");
        assert!(!f.is_active());
        assert!(f.matches(&["Anyone"]));
        assert!(f.matches::<&str>(&[]));
    }

    #[test]
    fn test_parse_normalizes_whitespace_and_case() {
        let f = filter("Billy,  Steve   Smith ,");
        assert_eq!(f.fragments(), ["billy", "steve smith"]);
    }

    #[test]
    fn test_full_name_and_token_match() {
        let f = filter("Jack, Billy Joel");
        assert!(f.matches(&["Jack Stevenson", "Billy Joel"]));
        assert!(f.matches(&["Billy Joel", "Jack Stevens"]));
        assert!(f.matches(&["Jack Jenson", "Billy Joel"]));
        assert!(f.matches(&["Jack Jack", "Billy Joel"]));
    }

    #[test]
    fn test_cardinality_mismatch() {
        let f = filter("Jack, Billy Joel");
        assert!(!f.matches(&["Jack Stevenson", "Jack Jenson", "Billy Joel"]));
        assert!(!f.matches(&["Billy Joel"]));
    }

    #[test]
    fn test_unmatched_fragment_rejects() {
        let f = filter("Jack, Billy Joel");
        assert!(!f.matches(&["Jack Stevenson", "Jack Jenson"]));
        assert!(!f.matches(&["John Smith", "Billy Joel"]));
    }

    #[test]
    fn test_partial_token_does_not_match() {
        let f = filter("Jac");
        assert!(!f.matches(&["Jack Stevenson"]));
    }

    #[test]
    fn test_case_insensitive() {
        let f = filter("STEVENSON");
        assert!(f.matches(&["Jack Stevenson"]));
    }

    #[test]
    fn test_requires_one_to_one_pairing() {
        // Both fragments can only stand for the same participant.
        let f = filter("Jack, Stevenson");
        assert!(!f.matches(&["Jack Stevenson", "Billy Joel"]));

        // A pairing exists once the second fragment has somewhere else to go.
        let f = filter("Jack, Joel");
        assert!(f.matches(&["Jack Joel", "Jack Stevenson"]));
    }
}
