use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    error::{Error, Result},
    grid::Grid,
    nails::NailSet,
};

/// In-bounds cell indexes of every chord between two distinct nails, rasterized
/// once per run. Stored as one flat buffer addressed by unordered nail pair.
#[derive(Clone, Debug)]
pub struct ChordTable {
    count: usize,
    offsets: Vec<usize>,
    indexes: Vec<u32>,
}

impl ChordTable {
    pub fn new(grid: Grid, nails: &NailSet) -> Result<Self> {
        if u32::try_from(grid.len()).is_err() {
            return Err(Error::GridTooLarge { grid });
        }
        let count = nails.len();
        let rows: Vec<(Vec<usize>, Vec<u32>)> = (0..count)
            .into_par_iter()
            .map(|a| {
                let mut lengths = Vec::with_capacity(count - a - 1);
                let mut cells = Vec::new();
                for b in a + 1..count {
                    let before = cells.len();
                    cells.extend(grid.indexes_in(nails.chord(a, b)).map(|index| index as u32));
                    lengths.push(cells.len() - before);
                }
                (lengths, cells)
            })
            .collect();

        let mut offsets = Vec::with_capacity(count * count.saturating_sub(1) / 2 + 1);
        let mut indexes = Vec::with_capacity(rows.iter().map(|(_, cells)| cells.len()).sum());
        let mut end = 0;
        offsets.push(end);
        for (lengths, cells) in rows {
            for length in lengths {
                end += length;
                offsets.push(end);
            }
            indexes.extend(cells);
        }
        Ok(Self {
            count,
            offsets,
            indexes,
        })
    }

    /// Number of nail pairs.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells of the chord between `a` and `b` in rasterization order. The order
    /// of the two nails does not matter; `a` must differ from `b`.
    pub fn indexes(&self, a: usize, b: usize) -> impl ExactSizeIterator<Item = usize> + '_ {
        let pair = self.pair(a, b);
        self.indexes[self.offsets[pair]..self.offsets[pair + 1]]
            .iter()
            .map(|&index| index as usize)
    }

    fn pair(&self, a: usize, b: usize) -> usize {
        debug_assert_ne!(a, b);
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        a * (2 * self.count - a - 1) / 2 + (b - a - 1)
    }
}
