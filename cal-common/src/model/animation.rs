//! Skeletal and morph animation clips.
//!
//! Both clip types own their keyframes outright. Decoders never reject a clip
//! because of bad keyframe numbers; [`Animation::retain_valid_keyframes`] and
//! [`MorphAnimation::retain_valid_keyframes`] strip them afterwards.

use glam::{Quat, Vec3};

use super::Tolerance;

// ============================================================================
// Skeletal
// ============================================================================

/// Smallest squared length a rotation may have and still be normalized.
const MIN_ROTATION_LENGTH_SQUARED: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    /// `None` when the owning track does not require translation
    pub translation: Option<Vec3>,
    pub rotation: Quat,
}

impl Keyframe {
    /// Finite numbers, non-negative time, normalizable rotation.
    pub fn is_valid(&self) -> bool {
        self.time.is_finite()
            && self.time >= 0.0
            && self.translation.is_none_or(|t| t.is_finite())
            && self.rotation.is_finite()
            && self.rotation.length_squared() > MIN_ROTATION_LENGTH_SQUARED
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub bone_id: u32,
    pub translation_required: bool,
    /// When false, keyframes after the first may inherit the previous translation
    pub translation_is_dynamic: bool,
    pub high_range_required: bool,
    pub keyframes: Vec<Keyframe>,
}

impl Track {
    /// A track with every flag at its backwards-compatible default.
    pub fn new(bone_id: u32) -> Self {
        Self {
            bone_id,
            translation_required: true,
            translation_is_dynamic: true,
            high_range_required: true,
            keyframes: Vec::new(),
        }
    }

    /// Whether keyframe `index` must carry its translation when written.
    ///
    /// A keyframe that is omitted inherits the previous keyframe's translation
    /// on load, so only the first keyframe and keyframes that differ from their
    /// predecessor need it.
    pub fn writes_translation(&self, index: usize) -> bool {
        let Some(current) = self.keyframes[index].translation else {
            return false;
        };
        if index == 0 || !self.translation_required {
            return true;
        }
        match self.keyframes[index - 1].translation {
            Some(previous) => self.translation_is_dynamic || previous != current,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// Seconds, always positive
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl Animation {
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(|t| t.keyframes.len()).sum()
    }

    /// Drop invalid keyframes, then drop tracks left empty.
    ///
    /// Returns the number of keyframes removed.
    pub fn retain_valid_keyframes(&mut self) -> usize {
        let before = self.keyframe_count();
        for track in &mut self.tracks {
            track.keyframes.retain(Keyframe::is_valid);
        }
        self.tracks.retain(|track| !track.keyframes.is_empty());
        before - self.keyframe_count()
    }

    pub fn approx_eq(&self, other: &Animation, tol: Tolerance) -> bool {
        tol.scalar(self.duration, other.duration)
            && self.tracks.len() == other.tracks.len()
            && self.tracks.iter().zip(&other.tracks).all(|(a, b)| {
                a.bone_id == b.bone_id
                    && a.translation_required == b.translation_required
                    && a.translation_is_dynamic == b.translation_is_dynamic
                    && a.high_range_required == b.high_range_required
                    && a.keyframes.len() == b.keyframes.len()
                    && a.keyframes.iter().zip(&b.keyframes).all(|(x, y)| {
                        tol.scalar(x.time, y.time)
                            && tol.quat(x.rotation, y.rotation)
                            && match (x.translation, y.translation) {
                                (None, None) => true,
                                (Some(p), Some(q)) => tol.vec3(p, q),
                                _ => false,
                            }
                    })
            })
    }
}

// ============================================================================
// Morph
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphKeyframe {
    pub time: f32,
    pub weight: f32,
}

impl MorphKeyframe {
    pub fn is_valid(&self) -> bool {
        self.time.is_finite() && self.time >= 0.0 && self.weight.is_finite()
    }
}

/// Weight curve for one named morph target. May be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphTrack {
    pub morph_name: String,
    pub keyframes: Vec<MorphKeyframe>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphAnimation {
    pub duration: f32,
    pub tracks: Vec<MorphTrack>,
}

impl MorphAnimation {
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(|t| t.keyframes.len()).sum()
    }

    /// Drop invalid keyframes. Tracks are kept even when emptied, since empty
    /// morph tracks are legal.
    pub fn retain_valid_keyframes(&mut self) -> usize {
        let before = self.keyframe_count();
        for track in &mut self.tracks {
            track.keyframes.retain(MorphKeyframe::is_valid);
        }
        before - self.keyframe_count()
    }

    pub fn approx_eq(&self, other: &MorphAnimation, tol: Tolerance) -> bool {
        tol.scalar(self.duration, other.duration)
            && self.tracks.len() == other.tracks.len()
            && self.tracks.iter().zip(&other.tracks).all(|(a, b)| {
                a.morph_name == b.morph_name
                    && a.keyframes.len() == b.keyframes.len()
                    && a.keyframes
                        .iter()
                        .zip(&b.keyframes)
                        .all(|(x, y)| tol.scalar(x.time, y.time) && tol.scalar(x.weight, y.weight))
            })
    }
}
