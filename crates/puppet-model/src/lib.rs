//! VPupper Puppet Model
//!
//! Defines the data contracts for puppet pose relaying:
//! - **Frame:** The complete, typed puppet frame and its neutral default pose
//! - **Patch:** Partial producer payloads and the merge that completes them
//! - **Schema:** A declarative table of every leaf field and how it smooths
//!
//! Field names on the wire are camelCase; 3-vectors are `[x, y, z]` arrays.

pub mod frame;
pub mod patch;
pub mod schema;
pub mod vector;

pub use frame::*;
pub use patch::{FramePatch, Patch};
pub use schema::{FieldKind, FieldSpec, Slot, FIELDS};
pub use vector::Vec3;
