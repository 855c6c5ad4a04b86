use std::fmt::Debug;
use std::iter::Sum;
use std::ops::AddAssign;

use num_traits::{Float, NumCast};

/// Scalar bound shared by the sparse and dense algebra.
///
/// Anything `f32`/`f64`-like that can be summed in place and moved across
/// rayon worker threads qualifies.
pub trait FloatOps: Float + NumCast + AddAssign + Sum + Send + Sync + Debug + 'static {}

impl<T> FloatOps for T where T: Float + NumCast + AddAssign + Sum + Send + Sync + Debug + 'static {}
