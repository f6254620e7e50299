use num_traits::Float;

/// Converts a count to the planner's float type.
///
/// Counts are always representable by `f32` and `f64`, possibly rounded.
pub(crate) fn count_as<F: Float>(count: usize) -> F {
    F::from(count).unwrap_or_else(F::max_value)
}

/// Converts a uniform draw to the planner's float type.
pub(crate) fn draw_as<F: Float>(draw: f64) -> F {
    F::from(draw).unwrap_or_else(F::zero)
}
