use std::sync::Arc;

use bevy::{reflect::prelude::*, transform::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{id::BindingIndex, interpolation::linear::InterpolateLinear, pose::Pose};

/// Keyframed values of a single track, sorted by time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframes<T> {
    times: Vec<f32>,
    values: Vec<T>,
}

impl<T: InterpolateLinear + Clone + Default> Keyframes<T> {
    /// Builds a track from `(time, value)` pairs. Pairs are sorted by time.
    pub fn new(mut keyframes: Vec<(f32, T)>) -> Self {
        keyframes.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        let (times, values) = keyframes.into_iter().unzip();
        Self { times, values }
    }

    pub fn constant(value: T) -> Self {
        Self {
            times: vec![0.],
            values: vec![value],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.)
    }

    /// Linearly samples the track. Times before the first or after the last keyframe clamp to
    /// that keyframe's value.
    pub fn sample_linear_at(&self, time: f32) -> T {
        let Some(last) = self.times.len().checked_sub(1) else {
            return T::default();
        };

        let next = self.times.partition_point(|t| *t <= time);
        if next == 0 {
            return self.values[0].clone();
        }
        if next > last {
            return self.values[last].clone();
        }

        let prev = next - 1;
        let (prev_time, next_time) = (self.times[prev], self.times[next]);
        let f = if prev_time == next_time {
            0.
        } else {
            (time - prev_time) / (next_time - prev_time)
        };

        self.values[prev].interpolate_linear(&self.values[next], f)
    }
}

/// Animation data: one keyframed transform track per animated bone plus a set of float
/// tracks.
#[derive(Reflect, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    #[reflect(ignore)]
    pub transform_tracks: Vec<Keyframes<Transform>>,
    #[reflect(ignore)]
    pub float_tracks: Vec<Keyframes<f32>>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Default::default()
        }
    }

    pub fn with_transform_track(mut self, track: Keyframes<Transform>) -> Self {
        self.transform_tracks.push(track);
        self
    }

    pub fn with_float_track(mut self, track: Keyframes<f32>) -> Self {
        self.float_tracks.push(track);
        self
    }

    pub fn num_transform_tracks(&self) -> usize {
        self.transform_tracks.len()
    }

    pub fn num_float_tracks(&self) -> usize {
        self.float_tracks.len()
    }

    /// Samples at most `max_transform_tracks` transform tracks and `max_float_tracks` float
    /// tracks at `time`.
    pub fn sample_partial_tracks(
        &self,
        time: f32,
        max_transform_tracks: usize,
        max_float_tracks: usize,
    ) -> Pose {
        let time = time.clamp(0., self.duration.max(0.));
        Pose {
            transforms: self
                .transform_tracks
                .iter()
                .take(max_transform_tracks)
                .map(|track| track.sample_linear_at(time))
                .collect(),
            floats: self
                .float_tracks
                .iter()
                .take(max_float_tracks)
                .map(|track| track.sample_linear_at(time))
                .collect(),
            timestamp: time,
        }
    }

    pub fn sample(&self, time: f32) -> Pose {
        self.sample_partial_tracks(time, self.num_transform_tracks(), self.num_float_tracks())
    }
}

/// Ties a binding index to the animation loaded for it.
#[derive(Clone, Debug)]
pub struct AnimationBinding {
    pub index: BindingIndex,
    pub animation: Option<Arc<AnimationClip>>,
}

/// Playback handle the engine creates when a clip generator is activated. Deactivating a
/// clip generator releases its handle, so anything that must keep sampling the animation
/// afterwards has to take the handle first.
#[derive(Clone, Debug)]
pub struct AnimationControl {
    pub binding: Option<AnimationBinding>,
}

impl AnimationControl {
    pub fn new(binding: AnimationBinding) -> Self {
        Self {
            binding: Some(binding),
        }
    }

    pub fn animation(&self) -> Option<&Arc<AnimationClip>> {
        self.binding.as_ref().and_then(|b| b.animation.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframes_sample_between_and_outside() {
        let track = Keyframes::new(vec![(1., 10.), (0., 0.)]);
        assert_eq!(track.sample_linear_at(-1.), 0.);
        assert_eq!(track.sample_linear_at(0.5), 5.);
        assert_eq!(track.sample_linear_at(1.), 10.);
        assert_eq!(track.sample_linear_at(2.), 10.);
        assert_eq!(track.last_time(), 1.);
    }

    #[test]
    fn empty_keyframes_sample_default() {
        let track: Keyframes<f32> = Keyframes::new(vec![]);
        assert!(track.is_empty());
        assert_eq!(track.sample_linear_at(3.), 0.);
    }

    #[test]
    fn partial_sampling_limits_tracks() {
        let clip = AnimationClip::new("walk", 1.)
            .with_transform_track(Keyframes::constant(Transform::from_xyz(1., 0., 0.)))
            .with_transform_track(Keyframes::constant(Transform::from_xyz(2., 0., 0.)))
            .with_float_track(Keyframes::new(vec![(0., 0.), (1., 1.)]));

        let pose = clip.sample_partial_tracks(0.25, 1, 1);
        assert_eq!(pose.transforms, vec![Transform::from_xyz(1., 0., 0.)]);
        assert_eq!(pose.floats, vec![0.25]);

        let pose = clip.sample(5.);
        assert_eq!(pose.transforms.len(), 2);
        assert_eq!(pose.floats, vec![1.]);
        assert_eq!(pose.timestamp, 1.);
    }
}
