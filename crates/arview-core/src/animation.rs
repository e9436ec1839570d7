//! Animation clip data and playback.
//!
//! Clips carry per-node TRS keyframe channels sampled on the CPU; a
//! [`ClipAction`] owns the playback cursor for one instance and advances
//! only from the explicit per-frame `advance` call.

use glam::{Mat4, Quat, Vec3};

use crate::error::ArViewError;

/// Local translation/rotation/scale of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePose {
    /// Local translation.
    pub translation: Vec3,
    /// Local rotation.
    pub rotation: Quat,
    /// Local scale.
    pub scale: Vec3,
}

impl NodePose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// The pose as a local transform matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for NodePose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Keyframe values of one channel.
#[derive(Debug, Clone)]
pub enum ChannelOutput {
    /// Translation keyframes.
    Translations(Vec<Vec3>),
    /// Rotation keyframes.
    Rotations(Vec<Quat>),
    /// Scale keyframes.
    Scales(Vec<Vec3>),
}

impl ChannelOutput {
    fn len(&self) -> usize {
        match self {
            ChannelOutput::Translations(v) | ChannelOutput::Scales(v) => v.len(),
            ChannelOutput::Rotations(v) => v.len(),
        }
    }
}

/// One animated property of one node.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    /// Index of the target node in the bundle's node list.
    pub node: usize,
    /// Keyframe times in seconds, sorted ascending.
    pub times: Vec<f32>,
    /// Keyframe values, one per time.
    pub output: ChannelOutput,
}

impl AnimationChannel {
    /// End time of the channel.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples the channel at `t`, writing the animated property into
    /// `pose`. Out-of-range times clamp to the first/last keyframe.
    pub fn sample(&self, t: f32, pose: &mut NodePose) {
        let count = self.times.len().min(self.output.len());
        if count == 0 {
            return;
        }

        let (lower, upper, alpha) = if t <= self.times[0] {
            (0, 0, 0.0)
        } else if t >= self.times[count - 1] {
            (count - 1, count - 1, 0.0)
        } else {
            let upper = self.times[..count].partition_point(|&key| key <= t);
            let lower = upper - 1;
            let span = self.times[upper] - self.times[lower];
            let alpha = if span > 0.0 {
                (t - self.times[lower]) / span
            } else {
                0.0
            };
            (lower, upper, alpha)
        };

        match &self.output {
            ChannelOutput::Translations(values) => {
                pose.translation = values[lower].lerp(values[upper], alpha);
            }
            ChannelOutput::Rotations(values) => {
                pose.rotation = values[lower].slerp(values[upper], alpha);
            }
            ChannelOutput::Scales(values) => {
                pose.scale = values[lower].lerp(values[upper], alpha);
            }
        }
    }
}

/// A named animation sequence within a bundle.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Clip name as authored.
    pub name: String,
    /// Clip duration in seconds.
    pub duration: f32,
    /// Animated channels.
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    /// Creates a clip; the duration is the latest keyframe across all
    /// channels.
    pub fn new(name: impl Into<String>, channels: Vec<AnimationChannel>) -> Self {
        let duration = channels
            .iter()
            .map(AnimationChannel::duration)
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Samples every channel at `t` into the per-node pose slice.
    /// Channels targeting nodes outside the slice are skipped.
    pub fn sample_into(&self, t: f32, poses: &mut [NodePose]) {
        for channel in &self.channels {
            if let Some(pose) = poses.get_mut(channel.node) {
                channel.sample(t, pose);
            }
        }
    }
}

/// Resolves a requested clip index against the bundle's clip count.
///
/// Out-of-range requests fall back to clip 0 with a logged warning;
/// callers must only invoke this when at least one clip exists.
#[must_use]
pub fn select_clip(requested: usize, available: usize) -> usize {
    if requested < available {
        requested
    } else {
        log::warn!(
            "{}",
            ArViewError::AnimationClipIndexInvalid {
                requested,
                available,
            }
        );
        0
    }
}

/// Playback state for one clip on one instance.
///
/// On creation the action is reset to time zero and fades its weight in
/// over the configured duration, then loops indefinitely.
#[derive(Debug, Clone)]
pub struct ClipAction {
    clip_index: usize,
    time: f32,
    weight: f32,
    fade_in_seconds: f32,
    playing: bool,
}

impl ClipAction {
    /// Creates a freshly reset action for the given clip.
    #[must_use]
    pub fn new(clip_index: usize, fade_in_seconds: f32) -> Self {
        Self {
            clip_index,
            time: 0.0,
            weight: if fade_in_seconds > 0.0 { 0.0 } else { 1.0 },
            fade_in_seconds,
            playing: true,
        }
    }

    /// Index of the clip this action plays.
    #[must_use]
    pub fn clip_index(&self) -> usize {
        self.clip_index
    }

    /// Current playback time within the clip.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current fade weight in `[0, 1]`.
    #[must_use]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Whether playback is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Pauses playback.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Resumes playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Advances the cursor by `dt` seconds, wrapping at `clip_duration`.
    pub fn advance(&mut self, dt: f32, clip_duration: f32) {
        if !self.playing {
            return;
        }
        if self.fade_in_seconds > 0.0 {
            self.weight = (self.weight + dt / self.fade_in_seconds).min(1.0);
        }
        self.time += dt;
        if clip_duration > 0.0 {
            self.time %= clip_duration;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation_clip() -> AnimationClip {
        AnimationClip::new(
            "slide",
            vec![AnimationChannel {
                node: 0,
                times: vec![0.0, 1.0, 2.0],
                output: ChannelOutput::Translations(vec![
                    Vec3::ZERO,
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 2.0, 0.0),
                ]),
            }],
        )
    }

    #[test]
    fn test_clip_duration_is_latest_keyframe() {
        assert_eq!(translation_clip().duration, 2.0);
        assert_eq!(AnimationClip::new("empty", vec![]).duration, 0.0);
    }

    #[test]
    fn test_sampling_interpolates_and_clamps() {
        let clip = translation_clip();
        let mut poses = [NodePose::IDENTITY];

        clip.sample_into(0.5, &mut poses);
        assert!((poses[0].translation - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);

        clip.sample_into(1.5, &mut poses);
        assert!((poses[0].translation - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);

        // Before the first and after the last keyframe clamp.
        clip.sample_into(-1.0, &mut poses);
        assert_eq!(poses[0].translation, Vec3::ZERO);
        clip.sample_into(10.0, &mut poses);
        assert_eq!(poses[0].translation, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_rotation_sampling_slerps() {
        let clip = AnimationClip::new(
            "turn",
            vec![AnimationChannel {
                node: 0,
                times: vec![0.0, 1.0],
                output: ChannelOutput::Rotations(vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ]),
            }],
        );
        let mut poses = [NodePose::IDENTITY];
        clip.sample_into(0.5, &mut poses);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(poses[0].rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_select_clip_in_range_and_fallback() {
        assert_eq!(select_clip(1, 3), 1);
        assert_eq!(select_clip(0, 1), 0);
        // Out of range falls back to 0, never panics.
        assert_eq!(select_clip(7, 3), 0);
    }

    #[test]
    fn test_action_fades_in_and_loops() {
        let mut action = ClipAction::new(0, 0.5);
        assert_eq!(action.weight(), 0.0);

        action.advance(0.25, 2.0);
        assert!((action.weight() - 0.5).abs() < 1e-6);
        assert!((action.time() - 0.25).abs() < 1e-6);

        action.advance(0.25, 2.0);
        assert_eq!(action.weight(), 1.0);

        // Weight saturates, time wraps at the clip duration.
        action.advance(2.0, 2.0);
        assert_eq!(action.weight(), 1.0);
        assert!((action.time() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_fade_starts_at_full_weight() {
        let action = ClipAction::new(0, 0.0);
        assert_eq!(action.weight(), 1.0);
    }

    #[test]
    fn test_paused_action_holds_still() {
        let mut action = ClipAction::new(0, 0.5);
        action.pause();
        action.advance(1.0, 2.0);
        assert_eq!(action.time(), 0.0);
        assert_eq!(action.weight(), 0.0);
        action.play();
        action.advance(0.1, 2.0);
        assert!(action.time() > 0.0);
    }
}
