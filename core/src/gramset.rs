//! Grammeme tag sets as bit-vectors.
//!
//! A [`GramSet`] records which grammemes (by numeric index, see
//! `grammeme::GramModel`) are present in a tag. The representation is a
//! packed `u64` word vector with no trailing zero words, so two sets with
//! equal content are equal and hash identically no matter how they were
//! built. That normalization is what makes the interning pool
//! (`intern::GramSetPool`) work: structural equality is the pool key.

use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 64;

/// A set of grammeme indices stored as a packed bit-vector.
///
/// # Example
/// ```
/// use libmorph_core::gramset::GramSet;
///
/// let mut tag = GramSet::new();
/// tag.set(3);
/// tag.set(70);
/// assert!(tag.contains(3));
/// assert!(!tag.contains(4));
/// assert_eq!(tag.iter_ones().collect::<Vec<_>>(), vec![3, 70]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GramSet {
    words: Vec<u64>,
}

impl GramSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Create a set with the given indices present.
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let mut s = Self::new();
        for i in indices {
            s.set(i);
        }
        s
    }

    /// Set the bit at `index`.
    pub fn set(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % WORD_BITS);
    }

    /// Clear the bit at `index` and re-normalize.
    pub fn clear(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word < self.words.len() {
            self.words[word] &= !(1u64 << (index % WORD_BITS));
            self.trim();
        }
    }

    /// Test the bit at `index`.
    pub fn contains(&self, index: usize) -> bool {
        let word = index / WORD_BITS;
        word < self.words.len() && self.words[word] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// True if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Union of `self` and `other` as a new set.
    pub fn union(&self, other: &GramSet) -> GramSet {
        let (longer, shorter) = if self.words.len() >= other.words.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut words = longer.words.clone();
        for (dst, src) in words.iter_mut().zip(shorter.words.iter()) {
            *dst |= src;
        }
        GramSet { words }
    }

    /// Merge `other` into `self`.
    pub fn union_with(&mut self, other: &GramSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst |= src;
        }
    }

    /// Intersection of `self` with a mask, as a new set.
    pub fn intersect(&self, mask: &GramSet) -> GramSet {
        let mut words: Vec<u64> = self
            .words
            .iter()
            .zip(mask.words.iter())
            .map(|(a, b)| a & b)
            .collect();
        while words.last() == Some(&0) {
            words.pop();
        }
        GramSet { words }
    }

    /// True if `self` and `other` share no bit.
    pub fn is_disjoint(&self, other: &GramSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// True if every bit of `self` is also set in `other`.
    ///
    /// # Example
    /// ```
    /// use libmorph_core::gramset::GramSet;
    ///
    /// let small = GramSet::from_indices([1, 5]);
    /// let big = GramSet::from_indices([1, 5, 9]);
    /// assert!(small.is_subset_of(&big));
    /// assert!(!big.is_subset_of(&small));
    /// ```
    pub fn is_subset_of(&self, other: &GramSet) -> bool {
        if self.words.len() > other.words.len() {
            return false;
        }
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & !b == 0)
    }

    /// Iterate set bit indices in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &w)| {
            (0..WORD_BITS).filter_map(move |b| {
                if w & (1u64 << b) != 0 {
                    Some(wi * WORD_BITS + b)
                } else {
                    None
                }
            })
        })
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_contains_across_words() {
        let mut s = GramSet::new();
        s.set(0);
        s.set(63);
        s.set(64);
        s.set(130);
        for i in [0, 63, 64, 130] {
            assert!(s.contains(i), "bit {} should be set", i);
        }
        assert!(!s.contains(1));
        assert!(!s.contains(129));
        assert_eq!(s.count_ones(), 4);
    }

    #[test]
    fn equal_content_equal_hash_regardless_of_history() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        // Build the same content two different ways; clearing a high bit must
        // not leave a trailing zero word behind.
        let a = GramSet::from_indices([2, 7]);
        let mut b = GramSet::from_indices([2, 7, 200]);
        b.clear(200);
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn union_and_intersect() {
        let a = GramSet::from_indices([1, 70]);
        let b = GramSet::from_indices([2, 70]);
        let u = a.union(&b);
        assert_eq!(u.iter_ones().collect::<Vec<_>>(), vec![1, 2, 70]);

        let mask = GramSet::from_indices([70, 99]);
        let i = u.intersect(&mask);
        assert_eq!(i.iter_ones().collect::<Vec<_>>(), vec![70]);

        // Intersection that clears the only high bit must normalize.
        let high = GramSet::from_indices([300]);
        let none = high.intersect(&GramSet::from_indices([1]));
        assert!(none.is_empty());
        assert_eq!(none, GramSet::new());
    }

    #[test]
    fn subset_and_disjoint() {
        let a = GramSet::from_indices([3, 65]);
        let b = GramSet::from_indices([3, 65, 100]);
        assert!(a.is_subset_of(&b));
        assert!(a.is_subset_of(&a));
        assert!(!b.is_subset_of(&a));
        assert!(a.is_disjoint(&GramSet::from_indices([4, 66])));
        assert!(!a.is_disjoint(&b));
    }
}
