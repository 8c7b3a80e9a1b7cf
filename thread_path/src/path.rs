use std::{fmt, num::ParseIntError, ops::Deref, str::FromStr};

use serde::{Deserialize, Serialize};

/// Ordered nail indices visited by the thread. Always holds at least the start nail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>")]
pub struct NailPath(Vec<usize>);

impl NailPath {
    pub fn new(start: usize) -> Self {
        Self(vec![start])
    }

    pub(crate) fn push(&mut self, nail: usize) {
        self.0.push(nail);
    }

    /// Number of chords, one less than the number of visited nails.
    pub fn lines(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Consecutive `(from, to)` nail pairs in thread order.
    pub fn chords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for NailPath {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Comma-joined indices, the format written to path files.
impl fmt::Display for NailPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nails = self.0.iter();
        if let Some(first) = nails.next() {
            write!(f, "{first}")?;
        }
        for nail in nails {
            write!(f, ",{nail}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParsePathError {
    #[error("path is empty")]
    Empty,
    #[error("invalid nail index: {0}")]
    Nail(#[from] ParseIntError),
}

impl TryFrom<Vec<usize>> for NailPath {
    type Error = ParsePathError;

    fn try_from(nails: Vec<usize>) -> Result<Self, Self::Error> {
        if nails.is_empty() {
            return Err(ParsePathError::Empty);
        }
        Ok(Self(nails))
    }
}

impl FromStr for NailPath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParsePathError::Empty);
        }
        s.split(',')
            .map(|nail| nail.trim().parse())
            .collect::<Result<_, _>>()
            .map(NailPath)
            .map_err(ParsePathError::from)
    }
}
