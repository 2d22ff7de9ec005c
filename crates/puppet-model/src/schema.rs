//! Declarative field table for [`PuppetFrame`].
//!
//! Every leaf of the frame is listed exactly once with its wire path, how it
//! behaves under smoothing, and a typed accessor pair. Algorithms that work
//! field by field iterate [`FIELDS`] instead of reaching into the record by
//! name, so adding a field to the schema means adding one row here.

use crate::frame::PuppetFrame;
use crate::vector::Vec3;

/// How a field behaves when frames are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Numeric value averaged across the history window.
    Smoothed,
    /// Value whose average is meaningless (bitmasks). Always the newest value.
    Categorical,
    /// Reference geometry held as sent. Always the newest value.
    Structural,
    /// Computed from other fields; never read from producer input.
    Derived,
}

/// Typed accessor pair for one leaf.
#[derive(Clone, Copy)]
pub enum Slot {
    Scalar {
        get: fn(&PuppetFrame) -> f64,
        set: fn(&mut PuppetFrame, f64),
    },
    Vector {
        get: fn(&PuppetFrame) -> Vec3,
        set: fn(&mut PuppetFrame, Vec3),
    },
    Mask {
        get: fn(&PuppetFrame) -> u32,
        set: fn(&mut PuppetFrame, u32),
    },
    Flag {
        get: fn(&PuppetFrame) -> bool,
        set: fn(&mut PuppetFrame, bool),
    },
}

/// One row of the field table.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    /// Dotted wire path, e.g. `face.eyes.left.iris.thetaX`.
    pub path: &'static str,
    pub kind: FieldKind,
    pub slot: Slot,
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

macro_rules! field {
    ($path:literal, $kind:ident, Scalar, $($field:ident).+) => {{
        fn get(frame: &PuppetFrame) -> f64 {
            frame.$($field).+
        }
        fn set(frame: &mut PuppetFrame, value: f64) {
            frame.$($field).+ = value;
        }
        FieldSpec {
            path: $path,
            kind: FieldKind::$kind,
            slot: Slot::Scalar { get, set },
        }
    }};
    ($path:literal, $kind:ident, Vector, $($field:ident).+) => {{
        fn get(frame: &PuppetFrame) -> Vec3 {
            frame.$($field).+
        }
        fn set(frame: &mut PuppetFrame, value: Vec3) {
            frame.$($field).+ = value;
        }
        FieldSpec {
            path: $path,
            kind: FieldKind::$kind,
            slot: Slot::Vector { get, set },
        }
    }};
    ($path:literal, $kind:ident, Mask, $($field:ident).+) => {{
        fn get(frame: &PuppetFrame) -> u32 {
            frame.$($field).+
        }
        fn set(frame: &mut PuppetFrame, value: u32) {
            frame.$($field).+ = value;
        }
        FieldSpec {
            path: $path,
            kind: FieldKind::$kind,
            slot: Slot::Mask { get, set },
        }
    }};
    ($path:literal, $kind:ident, Flag, $($field:ident).+) => {{
        fn get(frame: &PuppetFrame) -> bool {
            frame.$($field).+
        }
        fn set(frame: &mut PuppetFrame, value: bool) {
            frame.$($field).+ = value;
        }
        FieldSpec {
            path: $path,
            kind: FieldKind::$kind,
            slot: Slot::Flag { get, set },
        }
    }};
}

/// Every leaf of [`PuppetFrame`].
pub const FIELDS: &[FieldSpec] = &[
    // face
    field!("face.orientation.look", Smoothed, Vector, face.orientation.look),
    field!("face.orientation.up", Smoothed, Vector, face.orientation.up),
    field!("face.orientation.right", Smoothed, Vector, face.orientation.right),
    field!("face.eyes.left.openness", Smoothed, Scalar, face.eyes.left.openness),
    field!("face.eyes.left.iris.thetaX", Smoothed, Scalar, face.eyes.left.iris.theta_x),
    field!("face.eyes.left.iris.thetaY", Smoothed, Scalar, face.eyes.left.iris.theta_y),
    field!("face.eyes.left.blink", Derived, Flag, face.eyes.left.blink),
    field!("face.eyes.right.openness", Smoothed, Scalar, face.eyes.right.openness),
    field!("face.eyes.right.iris.thetaX", Smoothed, Scalar, face.eyes.right.iris.theta_x),
    field!("face.eyes.right.iris.thetaY", Smoothed, Scalar, face.eyes.right.iris.theta_y),
    field!("face.eyes.right.blink", Derived, Flag, face.eyes.right.blink),
    field!("face.mouth.smileness", Smoothed, Scalar, face.mouth.smileness),
    field!("face.mouth.openness", Smoothed, Scalar, face.mouth.openness),
    // bones
    field!("bones.body", Smoothed, Scalar, bones.body),
    field!("bones.head", Smoothed, Scalar, bones.head),
    field!("bones.armLeft", Smoothed, Scalar, bones.arm_left),
    field!("bones.elbowLeft", Smoothed, Scalar, bones.elbow_left),
    field!("bones.wristLeft", Smoothed, Scalar, bones.wrist_left),
    field!("bones.armRight", Smoothed, Scalar, bones.arm_right),
    field!("bones.elbowRight", Smoothed, Scalar, bones.elbow_right),
    field!("bones.wristRight", Smoothed, Scalar, bones.wrist_right),
    field!("bones.uBody", Structural, Vector, bones.u_body),
    field!("bones.uHead", Structural, Vector, bones.u_head),
    field!("bones.uArmLeft", Structural, Vector, bones.u_arm_left),
    field!("bones.uElbowLeft", Structural, Vector, bones.u_elbow_left),
    field!("bones.uWristLeft", Structural, Vector, bones.u_wrist_left),
    field!("bones.uArmRight", Structural, Vector, bones.u_arm_right),
    field!("bones.uElbowRight", Structural, Vector, bones.u_elbow_right),
    field!("bones.uWristRight", Structural, Vector, bones.u_wrist_right),
    // hands
    field!("handLeft.fingers", Categorical, Mask, hand_left.fingers),
    field!("handLeft.roll", Smoothed, Scalar, hand_left.roll),
    field!("handRight.fingers", Categorical, Mask, hand_right.fingers),
    field!("handRight.roll", Smoothed, Scalar, hand_right.roll),
];

/// Fields of the given kind.
pub fn fields_of_kind(kind: FieldKind) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |spec| spec.kind == kind)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn leaf_paths(value: &serde_json::Value, prefix: &str, out: &mut BTreeSet<String>) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    leaf_paths(child, &path, out);
                }
            }
            _ => {
                out.insert(prefix.to_string());
            }
        }
    }

    #[test]
    fn test_table_covers_every_serialized_leaf() {
        let json = serde_json::to_value(PuppetFrame::default()).unwrap();
        let mut serialized = BTreeSet::new();
        leaf_paths(&json, "", &mut serialized);

        let table: BTreeSet<String> = FIELDS.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(table.len(), FIELDS.len(), "duplicate path in field table");
        assert_eq!(table, serialized);
    }

    fn field(path: &str) -> &'static FieldSpec {
        FIELDS.iter().find(|f| f.path == path).unwrap()
    }

    #[test]
    fn test_accessors_hit_the_named_field() {
        let mut frame = PuppetFrame::default();
        match field("face.eyes.right.iris.thetaY").slot {
            Slot::Scalar { get, set } => {
                set(&mut frame, 12.5);
                assert_eq!(get(&frame), 12.5);
            }
            _ => panic!("thetaY should be a scalar"),
        }
        assert_eq!(frame.face.eyes.right.iris.theta_y, 12.5);
        assert_eq!(frame.face.eyes.left.iris.theta_y, 0.0);
    }

    #[test]
    fn test_mask_accessor_touches_one_hand() {
        let mut frame = PuppetFrame::default();
        match field("handRight.fingers").slot {
            Slot::Mask { set, .. } => set(&mut frame, 0b00110),
            _ => panic!("fingers should be a mask"),
        }
        assert_eq!(frame.hand_right.fingers, 0b00110);
        assert_eq!(frame.hand_left.fingers, 0b11111);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(fields_of_kind(FieldKind::Derived).count(), 2);
        assert_eq!(fields_of_kind(FieldKind::Categorical).count(), 2);
        assert_eq!(fields_of_kind(FieldKind::Structural).count(), 8);
        assert_eq!(fields_of_kind(FieldKind::Smoothed).count(), 21);
        assert!(fields_of_kind(FieldKind::Categorical).all(|f| matches!(f.slot, Slot::Mask { .. })));
        assert!(fields_of_kind(FieldKind::Structural).all(|f| f.path.starts_with("bones.u")));
    }
}
