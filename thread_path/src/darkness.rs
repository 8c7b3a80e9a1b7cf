use crate::Float;

/// Update applied to every residual cell a committed chord crosses.
pub trait Darkness<S>: Send + Sync {
    fn compute(&self, weight: S) -> S;
}

/// Subtracts a fixed amount of ink, keeping the result inside `[0, 255]`.
#[derive(Clone, Copy, Debug)]
pub struct FlatDarkness<S>(pub S);

impl<S: Float> Darkness<S> for FlatDarkness<S> {
    fn compute(&self, weight: S) -> S {
        (weight - self.0).max(S::ZERO).min(S::TWO_FIVE_FIVE)
    }
}
