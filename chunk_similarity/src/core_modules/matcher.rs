// THEORY:
// The Similarity Matcher is the comparative half of the analyzer. The chunk module
// reduces windows to values; the matcher compares those values pairwise and
// collects every pair that is "close enough".
//
// Key architectural principles:
// 1.  **True absolute difference**: Chunk values are unsigned. `a - b` with `a < b`
//     wraps around to a huge number, which turns near neighbors into non-matches and
//     can turn far ones into matches. All comparisons go through `abs_diff`.
// 2.  **Unordered pairs**: `{i, j}` is stored once as a `ChunkPair` with
//     `first < second`. The predicate is symmetric, so the reverse pair carries no
//     extra information.
// 3.  **Quadratic scan**: Every pair is visited once. Chunk counts are small (tens to
//     low hundreds), so O(K^2) is the accepted cost. `parallel_pipeline` splits the
//     same scan across workers when K grows.
// 4.  **Deterministic output**: Results live in a `BTreeSet`, so iteration order is
//     the same no matter in which order pairs were discovered.

pub mod matcher {
    use crate::core_modules::chunk::chunk::ChunkValue;
    use crate::core_modules::threshold::threshold::SimilarityThreshold;
    use std::collections::BTreeSet;
    use std::fmt;

    pub type ChunkDelta = u16;

    /// Distance between two chunk values, computed without unsigned wraparound.
    #[inline]
    pub fn absolute_difference(a: ChunkValue, b: ChunkValue) -> ChunkDelta {
        a.abs_diff(b)
    }

    #[inline]
    pub fn is_similar(a: ChunkValue, b: ChunkValue, threshold: SimilarityThreshold) -> bool {
        absolute_difference(a, b) <= threshold
    }

    /// An unordered pair of chunk indices, normalized so that `first < second`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ChunkPair {
        pub first: usize,
        pub second: usize,
    }

    impl ChunkPair {
        /// Builds the pair `{a, b}`. Returns `None` when `a == b`.
        pub fn new(a: usize, b: usize) -> Option<Self> {
            match a.cmp(&b) {
                std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
                std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
                std::cmp::Ordering::Equal => None,
            }
        }

        pub fn contains(&self, index: usize) -> bool {
            self.first == index || self.second == index
        }

        /// The other member of the pair, if `index` is one of them.
        pub fn partner(&self, index: usize) -> Option<usize> {
            if self.first == index {
                Some(self.second)
            } else if self.second == index {
                Some(self.first)
            } else {
                None
            }
        }
    }

    impl fmt::Display for ChunkPair {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "c{} ≈ c{}", self.first, self.second)
        }
    }

    /// The set of chunk pairs whose values lie within the similarity threshold.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct MatchSet {
        pairs: BTreeSet<ChunkPair>,
    }

    impl MatchSet {
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds `{a, b}`. Self-pairs are ignored. Returns whether the pair was new.
        pub fn insert(&mut self, a: usize, b: usize) -> bool {
            match ChunkPair::new(a, b) {
                Some(pair) => self.pairs.insert(pair),
                None => false,
            }
        }

        /// Order-independent membership: `contains(i, j) == contains(j, i)`.
        pub fn contains(&self, a: usize, b: usize) -> bool {
            ChunkPair::new(a, b).is_some_and(|pair| self.pairs.contains(&pair))
        }

        /// Every chunk index matched with `index`, ascending.
        pub fn partners_of(&self, index: usize) -> Vec<usize> {
            let mut partners: Vec<usize> = self
                .pairs
                .iter()
                .filter_map(|pair| pair.partner(index))
                .collect();
            partners.sort_unstable();
            partners
        }

        pub fn len(&self) -> usize {
            self.pairs.len()
        }

        pub fn is_empty(&self) -> bool {
            self.pairs.is_empty()
        }

        /// Pairs in ascending `(first, second)` order.
        pub fn iter(&self) -> impl Iterator<Item = &ChunkPair> {
            self.pairs.iter()
        }

        pub(crate) fn merge(&mut self, other: MatchSet) {
            self.pairs.extend(other.pairs);
        }
    }

    impl FromIterator<ChunkPair> for MatchSet {
        fn from_iter<T: IntoIterator<Item = ChunkPair>>(iter: T) -> Self {
            Self {
                pairs: iter.into_iter().collect(),
            }
        }
    }

    impl<'a> IntoIterator for &'a MatchSet {
        type Item = &'a ChunkPair;
        type IntoIter = std::collections::btree_set::Iter<'a, ChunkPair>;

        fn into_iter(self) -> Self::IntoIter {
            self.pairs.iter()
        }
    }

    /// Matches every pair whose first index lies in `rows` against all later indices.
    ///
    /// `match_pairs` is `match_rows` over every row; the parallel matcher hands
    /// disjoint row ranges to separate workers.
    pub fn match_rows(
        chunks: &[ChunkValue],
        rows: std::ops::Range<usize>,
        threshold: SimilarityThreshold,
    ) -> MatchSet {
        let mut matches = MatchSet::new();
        for i in rows {
            for j in (i + 1)..chunks.len() {
                if is_similar(chunks[i], chunks[j], threshold) {
                    matches.pairs.insert(ChunkPair { first: i, second: j });
                }
            }
        }
        matches
    }

    /// Finds every unordered pair of chunks within `threshold` of each other.
    pub fn match_pairs(chunks: &[ChunkValue], threshold: SimilarityThreshold) -> MatchSet {
        match_rows(chunks, 0..chunks.len(), threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::matcher::*;

    #[test]
    fn absolute_difference_does_not_wrap() {
        assert_eq!(absolute_difference(4, 16), 12);
        assert_eq!(absolute_difference(16, 4), 12);
        // Wrapping subtraction would report 65_524 here.
        assert_ne!(4u16.wrapping_sub(16), absolute_difference(4, 16));
    }

    #[test]
    fn smaller_minus_larger_is_still_similar() {
        // With wrapping subtraction, c0 - c1 = 65_535 and the pair would be missed.
        let matches = match_pairs(&[10, 11], 1);
        assert!(matches.contains(0, 1));
    }

    #[test]
    fn pairs_are_unordered_and_unique() {
        let chunks = [5u16, 5, 5, 5];
        let matches = match_pairs(&chunks, 0);
        assert_eq!(matches.len(), 6); // 4 choose 2
        for pair in &matches {
            assert!(pair.first < pair.second);
        }
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(matches.contains(i, j), i != j);
                assert_eq!(matches.contains(i, j), matches.contains(j, i));
            }
        }
    }

    #[test]
    fn predicate_is_inclusive() {
        let matches = match_pairs(&[100, 106, 107], 6);
        assert!(matches.contains(0, 1));
        assert!(!matches.contains(0, 2));
        assert!(matches.contains(1, 2));
    }

    #[test]
    fn empty_and_singleton_have_no_matches() {
        assert!(match_pairs(&[], 765).is_empty());
        assert!(match_pairs(&[42], 765).is_empty());
    }

    #[test]
    fn partners_of_lists_both_sides() {
        let matches = match_pairs(&[10, 50, 12, 11], 2);
        assert_eq!(matches.partners_of(0), vec![2, 3]);
        assert_eq!(matches.partners_of(3), vec![0, 2]);
        assert!(matches.partners_of(1).is_empty());
    }

    #[test]
    fn self_pairs_are_rejected() {
        let mut matches = MatchSet::new();
        assert!(!matches.insert(3, 3));
        assert!(matches.insert(3, 1));
        assert!(!matches.insert(1, 3));
        assert_eq!(matches.iter().next(), ChunkPair::new(1, 3).as_ref());
        assert_eq!(ChunkPair::new(1, 3).unwrap().to_string(), "c1 ≈ c3");
    }

    #[test]
    fn row_ranges_partition_the_scan() {
        let chunks = [3u16, 9, 4, 8, 5, 7, 6];
        let mut split = match_rows(&chunks, 0..3, 2);
        split.merge(match_rows(&chunks, 3..chunks.len(), 2));
        assert_eq!(split, match_pairs(&chunks, 2));
    }
}
