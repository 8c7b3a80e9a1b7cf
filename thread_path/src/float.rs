use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{AddAssign, DivAssign, MulAssign, SubAssign},
};

use num_traits::{ConstOne, ConstZero};

/// Scalar used by the residual field, the weight mask and every score.
pub trait Float:
    'static
    + Debug
    + Display
    + Sync
    + Send
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + num_traits::Float
    + num_traits::NumCast
    + ConstZero
    + ConstOne
{
    const TWO_FIVE_FIVE: Self;
    /// Smallest bonus added to a contour score when the chord crosses exactly
    /// one dark run.
    const SINGLE_RUN_BONUS: Self;
}

impl Float for f32 {
    const TWO_FIVE_FIVE: Self = 255.0;
    const SINGLE_RUN_BONUS: Self = 10_000_000.0;
}

impl Float for f64 {
    const TWO_FIVE_FIVE: Self = 255.0;
    const SINGLE_RUN_BONUS: Self = 10_000_000.0;
}
