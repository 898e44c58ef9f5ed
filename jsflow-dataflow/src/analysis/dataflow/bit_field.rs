use std::{
    fmt,
    ops::{BitOr, Sub},
};

use itertools::Itertools;

use crate::LatticeElement;

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-width set of small integers, one bit per member.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitField {
    words: Vec<u64>,
    width: usize,
}

impl BitField {
    /// An empty set able to hold the members `0..width`.
    pub fn empty(width: usize) -> BitField {
        BitField {
            words: vec![0; width.div_ceil(WORD_BITS)],
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn set(&mut self, idx: usize) {
        assert!(idx < self.width, "bit {idx} out of range for width {}", self.width);
        self.words[idx / WORD_BITS] |= 1u64 << (idx % WORD_BITS);
    }

    pub fn unset(&mut self, idx: usize) {
        assert!(idx < self.width, "bit {idx} out of range for width {}", self.width);
        self.words[idx / WORD_BITS] &= !(1u64 << (idx % WORD_BITS));
    }

    /// Is `idx` a member?  Indices beyond the width never are.
    pub fn get(&self, idx: usize) -> bool {
        idx < self.width && self.words[idx / WORD_BITS] & (1u64 << (idx % WORD_BITS)) != 0
    }

    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    pub fn union_with(&mut self, other: &BitField) {
        debug_assert_eq!(self.width, other.width);
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word |= other;
        }
    }

    pub fn subtract_with(&mut self, other: &BitField) {
        debug_assert_eq!(self.width, other.width);
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word &= !other;
        }
    }

    pub fn union(&self, other: &BitField) -> BitField {
        let mut res = self.clone();
        res.union_with(other);
        res
    }

    pub fn subtract(&self, other: &BitField) -> BitField {
        let mut res = self.clone();
        res.subtract_with(other);
        res
    }

    pub fn is_subset(&self, other: &BitField) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .all(|(word, other)| word & !other == 0)
    }

    /// Members in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width).filter(|idx| self.get(*idx))
    }
}

impl LatticeElement for BitField {}

impl Sub for BitField {
    type Output = BitField;

    fn sub(self, rhs: Self) -> Self::Output {
        self.subtract(&rhs)
    }
}

impl BitOr for BitField {
    type Output = BitField;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(&rhs)
    }
}

impl fmt::Display for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.iter_ones().join(", "))
    }
}

impl fmt::Debug for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
