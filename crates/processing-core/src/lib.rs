//! VPupper Processing Core
//!
//! Turns a stream of noisy, possibly partial puppet frames into a stable
//! output frame:
//! - **Frame Store:** Bounded FIFO history seeded with the default pose
//! - **Smoothing:** Latest-frame adoption or windowed averaging, plus derived fields
//! - **Relay:** Merge, record, smooth, and atomically publish each update
//!
//! No I/O happens here; the HTTP layer owns a [`PuppetRelay`] and calls into it.

pub mod frame_store;
pub mod relay;
pub mod smoothing;

pub use frame_store::FrameStore;
pub use relay::PuppetRelay;
pub use smoothing::FrameSmoother;
