//! Keyframe animation clips.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens when playback reaches the end of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationRepeatMode {
    /// Play once and return to the start.
    PlayOnce,
    /// Loop forever.
    #[default]
    LoopInfinite,
    /// Play once and hold the last frame.
    PlayOnceHold,
}

/// Which node property a channel animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationProperty {
    /// Translation `[x, y, z, _]`.
    Translation,
    /// Rotation quaternion `[x, y, z, w]`.
    Rotation,
    /// Scale `[x, y, z, _]`.
    Scale,
}

/// One sample of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time since clip start, in seconds.
    pub time: f32,
    pub value: [f32; 4],
}

/// Keyframes for one property of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationChannel {
    /// Name of the animated node.
    pub target: String,
    pub property: AnimationProperty,
    pub keyframes: Vec<Keyframe>,
}

impl AnimationChannel {
    /// Drop keyframes whose value equals both neighbours.
    ///
    /// The first and last keyframes are always kept. Returns how many
    /// keyframes were dropped.
    pub fn optimize(&mut self) -> usize {
        let before = self.keyframes.len();
        if before <= 2 {
            return 0;
        }

        let mut kept: Vec<Keyframe> = Vec::with_capacity(before);
        kept.push(self.keyframes[0]);
        for window in self.keyframes.windows(3) {
            let (prev, current, next) = (&window[0], &window[1], &window[2]);
            if !(prev.value == current.value && current.value == next.value) {
                kept.push(*current);
            }
        }
        kept.push(self.keyframes[before - 1]);

        self.keyframes = kept;
        before - self.keyframes.len()
    }
}

/// A named keyframe animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: Duration,
    #[serde(default)]
    pub repeat_mode: AnimationRepeatMode,
    #[serde(default)]
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    /// Optimize every channel; returns the total number of dropped keyframes.
    pub fn optimize(&mut self) -> usize {
        self.channels.iter_mut().map(AnimationChannel::optimize).sum()
    }
}
