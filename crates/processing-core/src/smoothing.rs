//! Output frame computation.
//!
//! Turns the retained frame history into the single frame served to
//! consumers. Two modes are supported:
//!
//! - **Latest:** adopt the newest merged frame as-is.
//! - **Average:** arithmetic mean of every smoothed field across the window.
//!
//! In both modes derived fields are recomputed last, from the output's own
//! values. Results are never clamped.

use vpupper_common::config::SmoothingMode;
use vpupper_puppet_model::schema::{fields_of_kind, FieldKind, Slot};
use vpupper_puppet_model::{PuppetFrame, Vec3};

use crate::frame_store::FrameStore;

/// Smoothing engine.
#[derive(Debug, Clone, Copy)]
pub struct FrameSmoother {
    mode: SmoothingMode,
}

impl FrameSmoother {
    /// Create a smoother for the given mode.
    pub fn new(mode: SmoothingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SmoothingMode {
        self.mode
    }

    /// Compute the output frame for the current store contents.
    pub fn smooth(&self, store: &FrameStore) -> PuppetFrame {
        match self.mode {
            SmoothingMode::Latest => store.last_complete().clone().with_derived_fields(),
            SmoothingMode::Average => average_window(store),
        }
    }
}

impl Default for FrameSmoother {
    fn default() -> Self {
        Self::new(SmoothingMode::default())
    }
}

/// Average every smoothed field across the store's frames.
///
/// Categorical and structural fields are taken from the newest frame. The
/// denominator is the number of frames actually held, so a window that has
/// not filled yet is averaged over fewer entries.
pub fn average_window(store: &FrameStore) -> PuppetFrame {
    let count = store.len() as f64;
    let mut output = store.last_complete().clone();

    for field in fields_of_kind(FieldKind::Smoothed) {
        match field.slot {
            Slot::Scalar { get, set } => {
                let sum: f64 = store.frames().map(get).sum();
                set(&mut output, sum / count);
            }
            Slot::Vector { get, set } => {
                if let Some(mean) = Vec3::mean(store.frames().map(get)) {
                    set(&mut output, mean);
                }
            }
            Slot::Mask { .. } | Slot::Flag { .. } => {
                tracing::warn!(path = field.path, "Non-numeric field marked as smoothed; keeping newest value");
            }
        }
    }

    output.with_derived_fields()
}
