//! Partial frames as sent by producers, and the merge that completes them.
//!
//! Every field of a [`FramePatch`] is optional. Values of the wrong JSON type
//! or shape are logged and treated as missing, so a single bad leaf never
//! rejects the rest of a payload. Derived fields (`blink`) have no patch
//! counterpart; if a producer sends one it is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use vpupper_common::config::MergeGranularity;

use crate::frame::{Bones, Eye, Eyes, Face, Hand, Iris, Mouth, Orientation, PuppetFrame};
use crate::vector::Vec3;

/// A possibly partial puppet frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub face: Option<FacePatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub bones: Option<BonesPatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hand_left: Option<HandPatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hand_right: Option<HandPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacePatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationPatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub eyes: Option<EyesPatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mouth: Option<MouthPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub look: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub up: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub right: Option<Vec3>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyesPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub left: Option<EyePatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub right: Option<EyePatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyePatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub openness: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub iris: Option<IrisPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrisPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub theta_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub theta_y: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouthPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub smileness: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub openness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonesPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub body: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub head: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub arm_left: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub elbow_left: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub wrist_left: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub arm_right: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub elbow_right: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub wrist_right: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_body: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_head: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_arm_left: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_elbow_left: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_wrist_left: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_arm_right: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_elbow_right: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub u_wrist_right: Option<Vec3>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fingers: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
}

/// Decode an optional field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match serde_json::from_value::<T>(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(
                expected = std::any::type_name::<T>(),
                error = %e,
                "Ignoring malformed puppet field"
            );
            None
        }
    }))
}

/// A partial value that can be completed against a full one.
pub trait Patch {
    type Target: Clone;

    /// Fill every absent field from `base`.
    fn resolve(self, base: &Self::Target) -> Self::Target;
}

fn resolve_nested<P: Patch>(patch: Option<P>, base: &P::Target) -> P::Target {
    match patch {
        Some(patch) => patch.resolve(base),
        None => base.clone(),
    }
}

impl Patch for FacePatch {
    type Target = Face;

    fn resolve(self, base: &Face) -> Face {
        Face {
            orientation: resolve_nested(self.orientation, &base.orientation),
            eyes: resolve_nested(self.eyes, &base.eyes),
            mouth: resolve_nested(self.mouth, &base.mouth),
        }
    }
}

impl Patch for OrientationPatch {
    type Target = Orientation;

    fn resolve(self, base: &Orientation) -> Orientation {
        Orientation {
            look: self.look.unwrap_or(base.look),
            up: self.up.unwrap_or(base.up),
            right: self.right.unwrap_or(base.right),
        }
    }
}

impl Patch for EyesPatch {
    type Target = Eyes;

    fn resolve(self, base: &Eyes) -> Eyes {
        Eyes {
            left: resolve_nested(self.left, &base.left),
            right: resolve_nested(self.right, &base.right),
        }
    }
}

impl Patch for EyePatch {
    type Target = Eye;

    fn resolve(self, base: &Eye) -> Eye {
        Eye {
            openness: self.openness.unwrap_or(base.openness),
            iris: resolve_nested(self.iris, &base.iris),
            blink: base.blink,
        }
    }
}

impl Patch for IrisPatch {
    type Target = Iris;

    fn resolve(self, base: &Iris) -> Iris {
        Iris {
            theta_x: self.theta_x.unwrap_or(base.theta_x),
            theta_y: self.theta_y.unwrap_or(base.theta_y),
        }
    }
}

impl Patch for MouthPatch {
    type Target = Mouth;

    fn resolve(self, base: &Mouth) -> Mouth {
        Mouth {
            smileness: self.smileness.unwrap_or(base.smileness),
            openness: self.openness.unwrap_or(base.openness),
        }
    }
}

impl Patch for BonesPatch {
    type Target = Bones;

    fn resolve(self, base: &Bones) -> Bones {
        Bones {
            body: self.body.unwrap_or(base.body),
            head: self.head.unwrap_or(base.head),
            arm_left: self.arm_left.unwrap_or(base.arm_left),
            elbow_left: self.elbow_left.unwrap_or(base.elbow_left),
            wrist_left: self.wrist_left.unwrap_or(base.wrist_left),
            arm_right: self.arm_right.unwrap_or(base.arm_right),
            elbow_right: self.elbow_right.unwrap_or(base.elbow_right),
            wrist_right: self.wrist_right.unwrap_or(base.wrist_right),
            u_body: self.u_body.unwrap_or(base.u_body),
            u_head: self.u_head.unwrap_or(base.u_head),
            u_arm_left: self.u_arm_left.unwrap_or(base.u_arm_left),
            u_elbow_left: self.u_elbow_left.unwrap_or(base.u_elbow_left),
            u_wrist_left: self.u_wrist_left.unwrap_or(base.u_wrist_left),
            u_arm_right: self.u_arm_right.unwrap_or(base.u_arm_right),
            u_elbow_right: self.u_elbow_right.unwrap_or(base.u_elbow_right),
            u_wrist_right: self.u_wrist_right.unwrap_or(base.u_wrist_right),
        }
    }
}

impl Patch for HandPatch {
    type Target = Hand;

    fn resolve(self, base: &Hand) -> Hand {
        Hand {
            fingers: self.fingers.unwrap_or(base.fingers),
            roll: self.roll.unwrap_or(base.roll),
        }
    }
}

impl FramePatch {
    /// Complete this patch into a full frame.
    ///
    /// A top-level section the patch omits is copied whole from `last`.
    /// Fields missing inside a section the patch does supply come from `seed`
    /// under [`MergeGranularity::Section`] and from `last` under
    /// [`MergeGranularity::Leaf`].
    ///
    /// Derived fields are carried over untouched; callers recompute them.
    pub fn merge(
        self,
        last: &PuppetFrame,
        seed: &PuppetFrame,
        granularity: MergeGranularity,
    ) -> PuppetFrame {
        let base = match granularity {
            MergeGranularity::Section => seed,
            MergeGranularity::Leaf => last,
        };

        PuppetFrame {
            face: merge_section(self.face, &last.face, &base.face),
            bones: merge_section(self.bones, &last.bones, &base.bones),
            hand_left: merge_section(self.hand_left, &last.hand_left, &base.hand_left),
            hand_right: merge_section(self.hand_right, &last.hand_right, &base.hand_right),
        }
    }

    /// Names of the top-level sections present in this patch.
    pub fn sections(&self) -> Vec<&'static str> {
        let mut present = Vec::with_capacity(4);
        if self.face.is_some() {
            present.push("face");
        }
        if self.bones.is_some() {
            present.push("bones");
        }
        if self.hand_left.is_some() {
            present.push("handLeft");
        }
        if self.hand_right.is_some() {
            present.push("handRight");
        }
        present
    }
}

fn merge_section<P: Patch>(patch: Option<P>, last: &P::Target, base: &P::Target) -> P::Target {
    match patch {
        Some(patch) => patch.resolve(base),
        None => last.clone(),
    }
}
