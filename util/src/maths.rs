//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the range `[min, max]`.
///
/// A NaN value is returned unchanged, callers that can see NaN must deal with
/// it before clamping.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Return the arithmetic mean of the values, or `None` if there are none.
pub fn mean<T>(values: &[T]) -> Option<T>
where
    T: Float,
{
    if values.is_empty() {
        return None;
    }

    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);

    T::from(values.len()).map(|n| sum / n)
}

/// Exponentially blend a previous value towards a target.
///
/// Returns `prev * weight + target * (1 - weight)`. For `weight` in `[0, 1]`
/// the result is a convex combination of the two, so it always lies between
/// them.
pub fn exp_blend<T>(prev: T, target: T, weight: T) -> T
where
    T: Float,
{
    prev * weight + target * (T::one() - weight)
}
