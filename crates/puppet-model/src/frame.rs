//! The complete puppet frame.
//!
//! A [`PuppetFrame`] always carries every field. Producers may send partial
//! frames (see [`crate::patch`]); those are repaired by merging before they
//! ever become a `PuppetFrame`.
//!
//! Bone angles are global angles in degrees around the Z axis, increasing
//! clockwise as in a Y-down coordinate system.

use serde::{Deserialize, Serialize};

use crate::vector::Vec3;

/// Eye openness strictly below this value counts as a blink.
pub const BLINK_OPENNESS_THRESHOLD: f64 = 0.4;

/// All five fingers extended.
pub const ALL_FINGERS: u32 = 0b11111;

/// One full snapshot of puppet pose data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuppetFrame {
    pub face: Face,
    pub bones: Bones,
    pub hand_left: Hand,
    pub hand_right: Hand,
}

/// Face puppetry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    pub orientation: Orientation,
    pub eyes: Eyes,
    pub mouth: Mouth,
}

/// Basis vectors of the head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orientation {
    pub look: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eyes {
    pub left: Eye,
    pub right: Eye,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eye {
    /// 1.0 = fully open, 0.0 = closed. Not clamped.
    pub openness: f64,
    pub iris: Iris,
    /// Derived from `openness`; never taken from producer input.
    pub blink: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Iris {
    /// Rotation of the iris around the negative Y axis of the eye.
    pub theta_x: f64,
    /// Rotation of the iris around the positive X axis of the eye.
    pub theta_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mouth {
    /// 1.0 = fully smiling, 0.0 = neutral, -1.0 = fully frowning.
    pub smileness: f64,
    pub openness: f64,
}

/// Bone angles plus a rotation-axis reference per bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bones {
    pub body: f64,
    pub head: f64,
    pub arm_left: f64,
    pub elbow_left: f64,
    pub wrist_left: f64,
    pub arm_right: f64,
    pub elbow_right: f64,
    pub wrist_right: f64,

    pub u_body: Vec3,
    pub u_head: Vec3,
    pub u_arm_left: Vec3,
    pub u_elbow_left: Vec3,
    pub u_wrist_left: Vec3,
    pub u_arm_right: Vec3,
    pub u_elbow_right: Vec3,
    pub u_wrist_right: Vec3,
}

/// Hand puppetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hand {
    /// Extended-finger bitmask, pinky in the high bit down to thumb in bit 0.
    pub fingers: u32,
    /// Rotation around the wrist axis: 1.0 = palm forward, -1.0 = palm backward.
    pub roll: f64,
}

impl Eye {
    /// Whether an eye with the given openness is blinking.
    pub fn is_blinking(openness: f64) -> bool {
        openness < BLINK_OPENNESS_THRESHOLD
    }
}

impl PuppetFrame {
    /// Recompute every derived field from its source fields.
    pub fn derive_fields(&mut self) {
        for eye in [&mut self.face.eyes.left, &mut self.face.eyes.right] {
            eye.blink = Eye::is_blinking(eye.openness);
        }
    }

    /// Copy of this frame with derived fields recomputed.
    pub fn with_derived_fields(mut self) -> Self {
        self.derive_fields();
        self
    }
}

impl Default for PuppetFrame {
    /// The neutral pose every relay is seeded with.
    fn default() -> Self {
        Self {
            face: Face::default(),
            bones: Bones::default(),
            hand_left: Hand::default(),
            hand_right: Hand::default(),
        }
        .with_derived_fields()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            look: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, -1.0, 0.0),
            right: Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

impl Default for Eye {
    fn default() -> Self {
        Self {
            openness: 1.0,
            iris: Iris::default(),
            blink: Eye::is_blinking(1.0),
        }
    }
}

impl Default for Bones {
    fn default() -> Self {
        Self {
            body: 0.0,
            head: 0.0,
            arm_left: 110.0,
            elbow_left: -180.0,
            wrist_left: -180.0,
            arm_right: 70.0,
            elbow_right: 0.0,
            wrist_right: 0.0,
            u_body: Vec3::UNIT_Z,
            u_head: Vec3::UNIT_Z,
            u_arm_left: Vec3::UNIT_Z,
            u_elbow_left: Vec3::UNIT_Z,
            u_wrist_left: Vec3::UNIT_Z,
            u_arm_right: Vec3::UNIT_Z,
            u_elbow_right: Vec3::UNIT_Z,
            u_wrist_right: Vec3::UNIT_Z,
        }
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self {
            fingers: ALL_FINGERS,
            roll: 0.0,
        }
    }
}
