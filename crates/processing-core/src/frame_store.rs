//! Retained frame history.
//!
//! The store always holds at least one complete frame. It starts out holding
//! only the seed frame; the first recorded frame displaces the seed, and from
//! then on the store keeps the newest `capacity` frames in arrival order,
//! dropping the oldest first.

use std::collections::VecDeque;

use vpupper_common::config::SmoothingMode;
use vpupper_common::error::{VpupperError, VpupperResult};
use vpupper_puppet_model::PuppetFrame;

/// Bounded FIFO history of complete frames.
#[derive(Debug, Clone)]
pub struct FrameStore {
    /// Frames older than `newest`, oldest first.
    older: VecDeque<PuppetFrame>,
    newest: PuppetFrame,
    capacity: usize,
    holding_seed: bool,
    recorded: u64,
}

impl FrameStore {
    /// A store retaining up to `capacity` frames.
    pub fn windowed(capacity: usize, seed: PuppetFrame) -> VpupperResult<Self> {
        if capacity == 0 {
            return Err(VpupperError::config(
                "frame store capacity must be at least 1",
            ));
        }
        Ok(Self {
            older: VecDeque::with_capacity(capacity - 1),
            newest: seed,
            capacity,
            holding_seed: true,
            recorded: 0,
        })
    }

    /// A store retaining only the current frame.
    pub fn latest(seed: PuppetFrame) -> Self {
        Self {
            older: VecDeque::new(),
            newest: seed,
            capacity: 1,
            holding_seed: true,
            recorded: 0,
        }
    }

    /// The store a smoothing mode needs. `window` only matters for
    /// [`SmoothingMode::Average`].
    pub fn for_mode(mode: SmoothingMode, window: usize, seed: PuppetFrame) -> VpupperResult<Self> {
        match mode {
            SmoothingMode::Latest => Ok(Self::latest(seed)),
            SmoothingMode::Average => Self::windowed(window, seed),
        }
    }

    /// Retain a complete frame, evicting the oldest past capacity.
    pub fn record_frame(&mut self, frame: PuppetFrame) {
        self.recorded += 1;
        if self.holding_seed {
            self.newest = frame;
            self.holding_seed = false;
            return;
        }

        let previous = std::mem::replace(&mut self.newest, frame);
        self.older.push_back(previous);
        while self.older.len() >= self.capacity {
            self.older.pop_front();
        }
    }

    /// The most recent complete frame: the fallback for the next partial frame.
    pub fn last_complete(&self) -> &PuppetFrame {
        &self.newest
    }

    /// Retained frames, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &PuppetFrame> + Clone {
        self.older.iter().chain(std::iter::once(&self.newest))
    }

    /// Number of retained frames. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.older.len() + 1
    }

    /// Maximum number of retained frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total frames recorded, including evicted ones.
    pub fn frames_recorded(&self) -> u64 {
        self.recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_body(body: f64) -> PuppetFrame {
        let mut frame = PuppetFrame::default();
        frame.bones.body = body;
        frame
    }

    fn bodies(store: &FrameStore) -> Vec<f64> {
        store.frames().map(|f| f.bones.body).collect()
    }

    #[test]
    fn test_starts_with_seed() {
        let store = FrameStore::windowed(4, PuppetFrame::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.frames_recorded(), 0);
        assert_eq!(store.last_complete(), &PuppetFrame::default());
    }

    #[test]
    fn test_first_frame_displaces_seed() {
        let mut store = FrameStore::windowed(4, PuppetFrame::default()).unwrap();
        store.record_frame(frame_with_body(5.0));
        assert_eq!(bodies(&store), vec![5.0]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.frames_recorded(), 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut store = FrameStore::windowed(4, PuppetFrame::default()).unwrap();
        for body in 1..=6 {
            store.record_frame(frame_with_body(body as f64));
        }
        assert_eq!(store.len(), 4);
        assert_eq!(bodies(&store), vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(store.last_complete().bones.body, 6.0);
        assert_eq!(store.frames_recorded(), 6);
    }

    #[test]
    fn test_latest_keeps_one_frame() {
        let mut store = FrameStore::latest(PuppetFrame::default());
        store.record_frame(frame_with_body(1.0));
        store.record_frame(frame_with_body(2.0));
        assert_eq!(store.capacity(), 1);
        assert_eq!(bodies(&store), vec![2.0]);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(FrameStore::windowed(0, PuppetFrame::default()).is_err());
    }

    #[test]
    fn test_for_mode() {
        let store = FrameStore::for_mode(SmoothingMode::Average, 3, PuppetFrame::default()).unwrap();
        assert_eq!(store.capacity(), 3);
        let store = FrameStore::for_mode(SmoothingMode::Latest, 0, PuppetFrame::default()).unwrap();
        assert_eq!(store.capacity(), 1);
    }
}
