//! # Alphabet
//!
//! The set of characters genomes are built from. The default printable
//! alphabet (line feed, carriage return and ASCII 32 through 126) is built once
//! and shared for the lifetime of the process; custom alphabets can be built
//! with [`Alphabet::new`].
//!
//! ```rust
//! use marmoset::alphabet::Alphabet;
//!
//! let printable = Alphabet::printable();
//! assert_eq!(printable.len(), 97);
//!
//! let binary = Alphabet::new("AB").unwrap();
//! assert!(binary.contains(b'A'));
//! assert!(!binary.contains(b'C'));
//! ```

use std::sync::{Arc, OnceLock};

use crate::{
    error::{GeneticError, Result},
    rng::RandomNumberGenerator,
};

const LINE_FEED: u8 = 10;
const CARRIAGE_RETURN: u8 = 13;
const FIRST_PRINTABLE: u8 = 32;
const LAST_PRINTABLE: u8 = 126;

/// An ordered, non-empty set of ASCII characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: Arc<[u8]>,
    members: [bool; 128],
    lowest: u8,
    highest: u8,
}

impl Alphabet {
    /// Builds an alphabet from the characters of `chars`, keeping their first
    /// occurrence order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `chars` is empty or contains a
    /// character outside ASCII.
    pub fn new(chars: &str) -> Result<Self> {
        if let Some(c) = chars.chars().find(|c| !c.is_ascii()) {
            return Err(GeneticError::Configuration(format!(
                "Alphabet character {:?} is not ASCII",
                c
            )));
        }
        Self::from_codes(chars.bytes())
    }

    /// Returns the process-wide printable alphabet.
    pub fn printable() -> &'static Alphabet {
        static PRINTABLE: OnceLock<Alphabet> = OnceLock::new();

        PRINTABLE.get_or_init(|| {
            let codes = [LINE_FEED, CARRIAGE_RETURN]
                .into_iter()
                .chain(FIRST_PRINTABLE..=LAST_PRINTABLE);
            let (chars, members) = Self::collect(codes);
            Self {
                chars: chars.into(),
                members,
                lowest: LINE_FEED,
                highest: LAST_PRINTABLE,
            }
        })
    }

    fn from_codes(codes: impl IntoIterator<Item = u8>) -> Result<Self> {
        let (chars, members) = Self::collect(codes);

        let (Some(&lowest), Some(&highest)) = (chars.iter().min(), chars.iter().max()) else {
            return Err(GeneticError::Configuration(
                "Alphabet must contain at least one character".to_string(),
            ));
        };

        Ok(Self {
            chars: chars.into(),
            members,
            lowest,
            highest,
        })
    }

    fn collect(codes: impl IntoIterator<Item = u8>) -> (Vec<u8>, [bool; 128]) {
        let mut members = [false; 128];
        let mut chars = Vec::new();

        for code in codes {
            if !members[code as usize] {
                members[code as usize] = true;
                chars.push(code);
            }
        }

        (chars, members)
    }

    /// Number of characters in the alphabet.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always `false`; an alphabet cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The characters in their defined order.
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn contains(&self, code: u8) -> bool {
        self.members.get(code as usize).copied().unwrap_or(false)
    }

    /// Draws one character uniformly.
    pub fn random_char(&self, rng: &mut RandomNumberGenerator) -> u8 {
        self.chars[rng.gen_index(self.chars.len())]
    }

    /// Moves `code` one step through the alphabet, to the nearest member above
    /// it when `upward` and below it otherwise.
    ///
    /// Gaps are skipped, so every step lands on an adjacent member. A step past
    /// the highest or lowest member stays there. Stepping down out of the
    /// printable run (from the space) wraps to the line feed when the alphabet
    /// holds one.
    pub fn step(&self, code: u8, upward: bool) -> u8 {
        if !upward && code == FIRST_PRINTABLE && self.contains(LINE_FEED) {
            return LINE_FEED;
        }

        let next = if upward {
            (code as usize + 1..self.members.len()).find(|&c| self.members[c])
        } else {
            (0..code as usize).rev().find(|&c| self.members[c])
        };

        match next {
            Some(c) => c as u8,
            None if upward => self.highest,
            None => self.lowest,
        }
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::printable().clone()
    }
}
