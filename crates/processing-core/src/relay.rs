//! Relay state shared between the producer and consumer endpoints.
//!
//! Each ingest builds a brand-new output frame and publishes it with one swap
//! of the shared `Arc`, so a reader sees either the previous output or the
//! next one in full.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use vpupper_common::config::{MergeGranularity, SmoothingConfig, SmoothingMode};
use vpupper_common::error::VpupperResult;
use vpupper_puppet_model::{FramePatch, PuppetFrame};

use crate::frame_store::FrameStore;
use crate::smoothing::FrameSmoother;

/// Owns the frame history and the published output frame.
#[derive(Debug)]
pub struct PuppetRelay {
    seed: Arc<PuppetFrame>,
    merge: MergeGranularity,
    smoother: FrameSmoother,
    store: Mutex<FrameStore>,
    output: RwLock<Arc<PuppetFrame>>,
}

impl PuppetRelay {
    /// Build a relay seeded with the default frame.
    pub fn new(config: &SmoothingConfig) -> VpupperResult<Self> {
        config.validate()?;

        let seed = Arc::new(PuppetFrame::default());
        let store = FrameStore::for_mode(config.mode, config.window, (*seed).clone())?;

        Ok(Self {
            merge: config.merge,
            smoother: FrameSmoother::new(config.mode),
            store: Mutex::new(store),
            output: RwLock::new(Arc::clone(&seed)),
            seed,
        })
    }

    /// Relay with the default configuration.
    pub fn with_defaults() -> Self {
        let seed = Arc::new(PuppetFrame::default());
        Self {
            merge: MergeGranularity::default(),
            smoother: FrameSmoother::new(SmoothingMode::Latest),
            store: Mutex::new(FrameStore::latest((*seed).clone())),
            output: RwLock::new(Arc::clone(&seed)),
            seed,
        }
    }

    /// Merge a producer frame into the history and publish the new output.
    pub fn ingest(&self, patch: FramePatch) -> Arc<PuppetFrame> {
        let sections = patch.sections();
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);

        let merged = patch
            .merge(store.last_complete(), &self.seed, self.merge)
            .with_derived_fields();
        store.record_frame(merged);

        let output = Arc::new(self.smoother.smooth(&store));
        *self.output.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&output);

        tracing::debug!(
            mode = %self.smoother.mode(),
            sections = ?sections,
            window = store.len(),
            capacity = store.capacity(),
            recorded = store.frames_recorded(),
            "Updated puppet data"
        );
        tracing::trace!(frame = ?output, "Smoothed puppet data");

        output
    }

    /// The most recently published output frame.
    pub fn current(&self) -> Arc<PuppetFrame> {
        Arc::clone(&self.output.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The frame every relay starts from.
    pub fn default_frame(&self) -> &PuppetFrame {
        &self.seed
    }

    pub fn mode(&self) -> SmoothingMode {
        self.smoother.mode()
    }

    pub fn merge_granularity(&self) -> MergeGranularity {
        self.merge
    }

    /// Total frames ingested since startup.
    pub fn frames_received(&self) -> u64 {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .frames_recorded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: &str) -> FramePatch {
        serde_json::from_str(json).unwrap()
    }

    fn relay(mode: SmoothingMode) -> PuppetRelay {
        PuppetRelay::new(&SmoothingConfig {
            mode,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_current_before_ingest_is_seed() {
        let relay = PuppetRelay::with_defaults();
        assert_eq!(*relay.current(), PuppetFrame::default());
        assert_eq!(relay.frames_received(), 0);
    }

    #[test]
    fn test_ingest_publishes_output() {
        let relay = relay(SmoothingMode::Latest);
        let published = relay.ingest(patch(r#"{ "bones": { "head": 25 } }"#));
        assert_eq!(published.bones.head, 25.0);
        assert!(Arc::ptr_eq(&published, &relay.current()));
        assert_eq!(relay.frames_received(), 1);
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let relay = relay(SmoothingMode::Latest);
        let before = relay.current();
        relay.ingest(patch(r#"{ "handLeft": { "roll": 0.5 } }"#));
        assert_eq!(before.hand_left.roll, 0.0);
        assert_eq!(relay.current().hand_left.roll, 0.5);
    }

    #[test]
    fn test_fallback_is_last_complete_frame() {
        let relay = relay(SmoothingMode::Latest);
        relay.ingest(patch(r#"{ "handRight": { "fingers": 3, "roll": 0.7 } }"#));
        let output = relay.ingest(patch(r#"{ "bones": { "body": 4 } }"#));
        assert_eq!(output.hand_right.roll, 0.7);
        assert_eq!(output.hand_right.fingers, 3);
        assert_eq!(output.bones.body, 4.0);
    }

    #[test]
    fn test_zero_window_accepted_in_latest_mode() {
        let config = SmoothingConfig {
            mode: SmoothingMode::Latest,
            window: 0,
            ..Default::default()
        };
        let relay = PuppetRelay::new(&config).unwrap();
        let output = relay.ingest(patch(r#"{ "bones": { "head": 7 } }"#));
        assert_eq!(output.bones.head, 7.0);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = SmoothingConfig {
            mode: SmoothingMode::Average,
            window: 0,
            ..Default::default()
        };
        assert!(PuppetRelay::new(&config).is_err());
    }

    #[test]
    fn test_concurrent_readers_see_whole_frames() {
        let relay = Arc::new(relay(SmoothingMode::Latest));
        let writer = {
            let relay = Arc::clone(&relay);
            std::thread::spawn(move || {
                for i in 1..=200 {
                    let v = i as f64;
                    relay.ingest(patch(&format!(
                        r#"{{ "bones": {{ "body": {v}, "head": {v} }}, "handLeft": {{ "roll": {v} }} }}"#
                    )));
                }
            })
        };

        for _ in 0..200 {
            let frame = relay.current();
            if frame.bones.body != 0.0 {
                assert_eq!(frame.bones.body, frame.bones.head);
                assert_eq!(frame.bones.body, frame.hand_left.roll);
            }
        }
        writer.join().unwrap();
        assert_eq!(relay.current().bones.body, 200.0);
    }
}
