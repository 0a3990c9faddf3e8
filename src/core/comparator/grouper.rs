//! Groups near-duplicate pairs into clusters using transitive relationships.
//!
//! If A matches B and B matches C, then {A, B, C} forms a single group
//! even if A doesn't directly match C.

use super::{DuplicateGroup, NearDuplicate};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Disjoint-set forest over dense ids `0..len`
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    /// `len` singleton sets
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `x`'s set, halving the path on the way up
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `a` and `b`; false if they were already joined
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        self.parent[root_b] = root_a;
        true
    }

    /// Every set as an ascending list of ids, ordered by smallest member
    pub fn sets(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: HashMap<usize, usize> = HashMap::new();
        let mut sets: Vec<Vec<usize>> = Vec::new();

        for id in 0..self.parent.len() {
            let root = self.find(id);
            let slot = *by_root.entry(root).or_insert_with(|| {
                sets.push(Vec::new());
                sets.len() - 1
            });
            sets[slot].push(id);
        }

        sets
    }
}

/// Groups near-duplicate pairs into clusters
#[derive(Debug, Default)]
pub struct TransitiveGrouper;

impl TransitiveGrouper {
    /// Create a new transitive grouper
    pub fn new() -> Self {
        Self
    }

    /// Cluster every image that appears in `matches`.
    ///
    /// Images never mentioned are not returned; no singleton groups exist.
    /// The partition is the same for any ordering of `matches`. Members are
    /// sorted by path and groups are ordered by their first member.
    pub fn group(&self, matches: &[NearDuplicate]) -> Vec<DuplicateGroup> {
        if matches.is_empty() {
            return Vec::new();
        }

        // Stable ids in path order
        let mut paths: Vec<&Path> = matches
            .iter()
            .flat_map(|m| [m.path_a.as_path(), m.path_b.as_path()])
            .collect();
        paths.sort_by(|x, y| x.as_os_str().cmp(y.as_os_str()));
        // Same key as the sort: `Path` equality would merge "/x//a" and "/x/a"
        paths.dedup_by(|x, y| x.as_os_str() == y.as_os_str());

        let ids: HashMap<&OsStr, usize> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_os_str(), i))
            .collect();
        let mut sets = DisjointSet::new(paths.len());

        let edges: Vec<(usize, usize, f64)> = matches
            .iter()
            .map(|m| {
                (
                    ids[m.path_a.as_os_str()],
                    ids[m.path_b.as_os_str()],
                    m.similarity,
                )
            })
            .collect();

        for &(a, b, _) in &edges {
            sets.union(a, b);
        }

        // Per-root similarity totals
        let mut totals: HashMap<usize, (f64, usize)> = HashMap::new();
        for &(a, _, similarity) in &edges {
            let entry = totals.entry(sets.find(a)).or_insert((0.0, 0));
            entry.0 += similarity;
            entry.1 += 1;
        }

        sets.sets()
            .into_iter()
            .map(|members| {
                let root = sets.find(members[0]);
                let (total, pair_count) = totals.get(&root).copied().unwrap_or((0.0, 0));

                // Ids ascend with path, so members are already sorted
                let photos: Vec<PathBuf> =
                    members.iter().map(|&id| paths[id].to_path_buf()).collect();

                DuplicateGroup {
                    photos,
                    pair_count,
                    average_similarity: if pair_count > 0 {
                        total / pair_count as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};

    fn pair(a: &str, b: &str, similarity: f64) -> NearDuplicate {
        NearDuplicate::new(PathBuf::from(a), PathBuf::from(b), 0, similarity)
    }

    fn partition(groups: &[DuplicateGroup]) -> BTreeSet<BTreeSet<PathBuf>> {
        groups
            .iter()
            .map(|g| g.photos.iter().cloned().collect())
            .collect()
    }

    #[test]
    fn disjoint_set_unions_transitively() {
        let mut sets = DisjointSet::new(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(1, 2));
        assert!(!sets.union(0, 2));

        assert_eq!(sets.find(2), sets.find(0));
        assert_ne!(sets.find(3), sets.find(0));
        assert_eq!(sets.sets(), vec![vec![0, 1, 2], vec![3], vec![4]]);
    }

    #[test]
    fn find_handles_long_chains() {
        let n = 100_000;
        let mut sets = DisjointSet::new(n);
        for i in 1..n {
            sets.union(i, i - 1);
        }
        let root = sets.find(0);
        assert_eq!(sets.find(n - 1), root);
    }

    #[test]
    fn empty_matches_returns_empty() {
        let grouper = TransitiveGrouper::new();
        assert!(grouper.group(&[]).is_empty());
    }

    #[test]
    fn single_pair_creates_single_group() {
        let groups = TransitiveGrouper::new().group(&[pair("/a.png", "/b.png", 1.0)]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].photos.len(), 2);
        assert_eq!(groups[0].pair_count, 1);
        assert_eq!(groups[0].average_similarity, 1.0);
    }

    #[test]
    fn transitive_grouping() {
        let groups = TransitiveGrouper::new().group(&[
            pair("/a.png", "/b.png", 0.95),
            pair("/b.png", "/c.png", 0.93),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].photos.len(), 3);
        assert!((groups[0].average_similarity - 0.94).abs() < 1e-9);
    }

    #[test]
    fn disjoint_pairs_create_separate_groups() {
        let groups = TransitiveGrouper::new().group(&[
            pair("/a.png", "/b.png", 1.0),
            pair("/c.png", "/d.png", 1.0),
        ]);

        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.photos.len() == 2));
    }

    #[test]
    fn grouping_is_a_partition_of_paths_in_pairs() {
        let matches = vec![
            pair("/a.png", "/b.png", 0.95),
            pair("/c.png", "/d.png", 0.91),
            pair("/e.png", "/d.png", 0.92),
            pair("/f.png", "/g.png", 0.99),
            pair("/g.png", "/a.png", 0.97),
        ];
        let groups = TransitiveGrouper::new().group(&matches);

        let mut seen = HashSet::new();
        for group in &groups {
            for photo in &group.photos {
                assert!(seen.insert(photo.clone()), "{:?} in two groups", photo);
            }
        }

        let in_pairs: HashSet<PathBuf> = matches
            .iter()
            .flat_map(|m| [m.path_a.clone(), m.path_b.clone()])
            .collect();
        assert_eq!(seen, in_pairs);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn grouping_ignores_pair_order() {
        let matches = vec![
            pair("/a.png", "/b.png", 0.95),
            pair("/c.png", "/d.png", 0.91),
            pair("/b.png", "/e.png", 0.92),
            pair("/f.png", "/c.png", 0.99),
            pair("/x.png", "/y.png", 0.97),
        ];
        let expected = partition(&TransitiveGrouper::new().group(&matches));

        // Every rotation, forwards and backwards
        for shift in 0..matches.len() {
            let mut shuffled = matches.clone();
            shuffled.rotate_left(shift);
            assert_eq!(partition(&TransitiveGrouper::new().group(&shuffled)), expected);

            shuffled.reverse();
            assert_eq!(partition(&TransitiveGrouper::new().group(&shuffled)), expected);
        }
    }

    #[test]
    fn repeated_pairs_do_not_duplicate_members() {
        let groups = TransitiveGrouper::new().group(&[
            pair("/a.png", "/b.png", 1.0),
            pair("/a.png", "/b.png", 1.0),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].photos, vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")]);
    }

    #[test]
    fn differently_spelled_paths_stay_distinct() {
        let groups = TransitiveGrouper::new().group(&[
            pair("/x//a.png", "/x/b.png", 1.0),
            pair("/x/a.png", "/x/c.png", 1.0),
        ]);

        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.photos.len() == 2));

        let mut seen = HashSet::new();
        for photo in groups.iter().flat_map(|g| &g.photos) {
            assert!(seen.insert(photo.as_os_str()), "{:?} in two groups", photo);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn groups_ordered_by_first_member() {
        let groups = TransitiveGrouper::new().group(&[
            pair("/m.png", "/n.png", 1.0),
            pair("/b.png", "/a.png", 1.0),
        ]);

        assert_eq!(groups[0].photos[0], PathBuf::from("/a.png"));
        assert_eq!(groups[1].photos[0], PathBuf::from("/m.png"));
    }
}
