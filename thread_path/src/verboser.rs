use crate::algorithm::Stop;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Message<S> {
    /// A chord to `nail` was placed as chord number `line` (1-based).
    Committed { line: usize, nail: usize, score: S },
    Finished { lines: usize, stop: Stop },
}

/// Progress sink polled by the search between iterations.
pub trait Verboser<S> {
    fn verbose(&mut self, message: Message<S>);

    /// Returning `true` stops the search before its next iteration.
    fn cancelled(&self) -> bool {
        false
    }
}

pub struct Silent;

impl<S> Verboser<S> for Silent {
    fn verbose(&mut self, _: Message<S>) {}
}
