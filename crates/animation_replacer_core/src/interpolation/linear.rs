use bevy::prelude::*;

use crate::pose::Pose;

pub trait InterpolateLinear {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self;
}

impl InterpolateLinear for f32 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self + (other - self) * f
    }
}

impl InterpolateLinear for Vec3 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.lerp(*other, f)
    }
}

impl InterpolateLinear for Quat {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.slerp(*other, f)
    }
}

impl InterpolateLinear for Transform {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        Transform {
            translation: self.translation.interpolate_linear(&other.translation, f),
            rotation: self.rotation.interpolate_linear(&other.rotation, f),
            scale: self.scale.interpolate_linear(&other.scale, f),
        }
    }
}

/// Tracks present in only one of the poses are taken from that pose as-is.
impl InterpolateLinear for Pose {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        Pose {
            transforms: zip_longest(&self.transforms, &other.transforms, f),
            floats: zip_longest(&self.floats, &other.floats, f),
            timestamp: self.timestamp,
        }
    }
}

fn zip_longest<T: InterpolateLinear + Clone>(a: &[T], b: &[T], f: f32) -> Vec<T> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| match (a.get(i), b.get(i)) {
            (Some(a), Some(b)) => a.interpolate_linear(b, f),
            (Some(a), None) => a.clone(),
            (None, Some(b)) => b.clone(),
            (None, None) => unreachable!(),
        })
        .collect()
}

/// Blends the first `count` transforms of `from` towards `to`, writing the result into `to`.
///
/// `f == 0` leaves `to` equal to `from`, `f == 1` leaves `to` untouched. `count` is clamped to
/// the length of both slices.
pub fn blend_poses(count: usize, from: &[Transform], to: &mut [Transform], f: f32) {
    let count = count.min(from.len()).min(to.len());
    for (dst, src) in to[..count].iter_mut().zip(&from[..count]) {
        *dst = src.interpolate_linear(dst, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Transform {
        Transform::from_xyz(x, 0., 0.)
    }

    #[test]
    fn blend_poses_respects_factor_endpoints() {
        let from = [at(0.), at(10.)];

        let mut to = [at(4.), at(20.)];
        blend_poses(2, &from, &mut to, 0.);
        assert_eq!(to, from);

        let mut to = [at(4.), at(20.)];
        blend_poses(2, &from, &mut to, 1.);
        assert_eq!(to, [at(4.), at(20.)]);

        let mut to = [at(4.), at(20.)];
        blend_poses(2, &from, &mut to, 0.5);
        assert_eq!(to, [at(2.), at(15.)]);
    }

    #[test]
    fn blend_poses_clamps_track_count() {
        let from = [at(0.)];
        let mut to = [at(4.), at(8.), at(12.)];
        blend_poses(3, &from, &mut to, 0.);
        assert_eq!(to, [at(0.), at(8.), at(12.)]);
    }

    #[test]
    fn pose_interpolation_keeps_unmatched_tracks() {
        let a = Pose::new(vec![at(0.), at(2.)], vec![0.], 1.);
        let b = Pose::new(vec![at(4.)], vec![1., 5.], 2.);
        let mixed = a.interpolate_linear(&b, 0.5);
        assert_eq!(mixed.transforms, vec![at(2.), at(2.)]);
        assert_eq!(mixed.floats, vec![0.5, 5.]);
        assert_eq!(mixed.timestamp, 1.);
    }
}
