//! Xform (transform) schema state.
//!
//! A transform sample is stored decomposed into translation, rotation and
//! scale. [`XformState`] caches the last sample and exposes it with the
//! handedness convention applied: positions and rotation axes get X
//! negated and rotation angles flip sign when mirroring.

use std::sync::Arc;

use crate::core::{SampleSelector, XformReader};
use crate::util::{mirror_x, Mat4, Quat, Result, Vec3};

/// Decomposed transform sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XformSample {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Whether this xform inherits from parent.
    pub inherits: bool,
}

impl Default for XformSample {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            inherits: true,
        }
    }
}

impl XformSample {
    /// Create identity xform.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build from translation, axis/angle rotation (degrees) and scale.
    pub fn from_axis_angle(translation: Vec3, axis: Vec3, angle_degrees: f32, scale: Vec3) -> Self {
        let rotation = match axis.try_normalize() {
            Some(axis) => Quat::from_axis_angle(axis, angle_degrees.to_radians()),
            None => Quat::IDENTITY,
        };
        Self { translation, rotation, scale, ..Self::default() }
    }

    /// Rotation as unit axis and angle in degrees.
    pub fn axis_angle(&self) -> (Vec3, f32) {
        let (axis, angle) = self.rotation.to_axis_angle();
        (axis, angle.to_degrees())
    }

    /// Compose scale, then rotation, then translation.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Transform schema state owned by a geometry object.
pub struct XformState {
    reader: Arc<dyn XformReader>,
    sample: XformSample,
    mirror_x: bool,
}

impl XformState {
    /// Wrap a schema reader. The sample is identity until the first refresh.
    pub fn new(reader: Arc<dyn XformReader>) -> Self {
        Self { reader, sample: XformSample::identity(), mirror_x: false }
    }

    /// Negate X on the exposed values.
    pub fn set_mirror_x(&mut self, mirror: bool) {
        self.mirror_x = mirror;
    }

    /// Read the sample at `selector`. The cached sample is kept on error.
    pub fn refresh(&mut self, selector: SampleSelector) -> Result<()> {
        self.sample = self.reader.get(selector)?;
        Ok(())
    }

    /// Raw cached sample.
    pub fn sample(&self) -> &XformSample {
        &self.sample
    }

    /// Whether this xform inherits from parent.
    pub fn inherits(&self) -> bool {
        self.sample.inherits
    }

    /// Translation, X negated when mirroring.
    pub fn position(&self) -> Vec3 {
        if self.mirror_x { mirror_x(self.sample.translation) } else { self.sample.translation }
    }

    /// Rotation axis, X negated when mirroring.
    pub fn axis(&self) -> Vec3 {
        let (axis, _) = self.sample.axis_angle();
        if self.mirror_x { mirror_x(axis) } else { axis }
    }

    /// Rotation angle in degrees, negated when mirroring.
    pub fn angle(&self) -> f32 {
        let (_, angle) = self.sample.axis_angle();
        if self.mirror_x { -angle } else { angle }
    }

    /// Scale, never mirrored.
    pub fn scale(&self) -> Vec3 {
        self.sample.scale
    }

    /// Local matrix of the raw sample.
    pub fn matrix(&self) -> Mat4 {
        self.sample.matrix()
    }
}
