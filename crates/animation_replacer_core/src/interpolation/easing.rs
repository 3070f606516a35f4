//! Easing curves over a normalized alpha.

use super::linear::InterpolateLinear;

pub fn ease_in(a: f32, b: f32, alpha: f32, exp: f32) -> f32 {
    a.interpolate_linear(&b, alpha.powf(exp))
}

pub fn ease_out(a: f32, b: f32, alpha: f32, exp: f32) -> f32 {
    a.interpolate_linear(&b, 1. - (1. - alpha).powf(exp))
}

/// Eases in over the first half of `alpha` and out over the second half.
pub fn ease_in_out(a: f32, b: f32, alpha: f32, exp: f32) -> f32 {
    let modified = if alpha < 0.5 {
        ease_in(0., 1., alpha * 2., exp) * 0.5
    } else {
        ease_out(0., 1., alpha * 2. - 1., exp) * 0.5 + 0.5
    };
    a.interpolate_linear(&b, modified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out_hits_endpoints_and_midpoint() {
        assert_eq!(ease_in_out(0., 1., 0., 2.), 0.);
        assert_eq!(ease_in_out(0., 1., 0.5, 2.), 0.5);
        assert_eq!(ease_in_out(0., 1., 1., 2.), 1.);
    }

    #[test]
    fn ease_in_out_is_quadratic_near_start() {
        // 0.25 -> ease_in(0.5)^2 * 0.5
        assert!((ease_in_out(0., 1., 0.25, 2.) - 0.125).abs() < 1e-6);
        assert!((ease_in_out(0., 1., 0.75, 2.) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn ease_in_out_is_monotonic() {
        let mut last = 0.;
        for i in 0..=100 {
            let v = ease_in_out(0., 1., i as f32 / 100., 2.);
            assert!(v >= last);
            last = v;
        }
    }
}
