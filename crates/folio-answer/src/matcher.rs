//! Longest-matching-blocks string similarity (Ratcliff/Obershelp as done by
//! a classic sequence matcher).
//!
//! The longest common contiguous block is found, then the search recurses on
//! the pieces left and right of it; the ratio is `2 * M / T` where `M` is the
//! total size of all blocks and `T` the combined length. The second sequence
//! gets the "popular element" treatment: when it has at least 200 elements,
//! characters occurring more than `1% + 1` times cannot seed a match.

use std::collections::HashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

/// Case-insensitive similarity in `[0.0, 1.0]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + std::hash::Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, idxs| idxs.len() <= ntest);
        }
        Self { a, b, b2j }
    }

    /// Longest block `(i, j, size)` with `a[i..i+size] == b[j..j+size]`
    /// inside the given bounds; earliest in `a`, then in `b`, on ties.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (a, b) = (self.a, self.b);
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, elt) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut new_j2len = HashMap::new();
            if let Some(js) = self.b2j.get(elt) {
                for &j in js {
                    if j < blo { continue; }
                    if j >= bhi { break; }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }
        // Popular elements never seed a block but may still extend one.
        while besti > alo && bestj > blo && a[besti - 1] == b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi && bestj + bestsize < bhi && a[besti + bestsize] == b[bestj + bestsize] {
            bestsize += 1;
        }
        (besti, bestj, bestsize)
    }

    /// All matching blocks, ordered by position.
    pub fn matching_blocks(&self) -> Vec<(usize, usize, usize)> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 { continue; }
            blocks.push((i, j, k));
            if alo < i && blo < j { queue.push((alo, i, blo, j)); }
            if i + k < ahi && j + k < bhi { queue.push((i + k, ahi, j + k, bhi)); }
        }
        blocks.sort_unstable();
        blocks
    }

    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 { return 1.0; }
        let matches: usize = self.matching_blocks().iter().map(|&(_, _, k)| k).sum();
        2.0 * matches as f64 / total as f64
    }
}
