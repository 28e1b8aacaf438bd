// Easing curves for the hover scale. All take and return t in [0, 1].

#[inline]
pub fn lerp(a: f32, b: f32, alpha: f32) -> f32 {
    a + alpha * (b - a)
}

#[inline]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

#[inline]
pub fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Blend of [`ease_in`] and [`ease_out`] weighted by `t` itself.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    lerp(ease_in(t), ease_out(t), t)
}
