//! # Frame Sampler
//!
//! Copies the current video frame into an addressable pixel buffer at the
//! stream's native resolution.
//!
//! ## Buffer Sizing Guarantee
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  acquire ──► first sample: buffer resized to negotiated resolution     │
//! │          ──► every later sample: same buffer, pixels overwritten       │
//! │                                                                         │
//! │  Two consecutive samples never observe a buffer smaller than the       │
//! │  negotiated resolution. Resizing happens once per acquisition; the     │
//! │  session resets the sampler whenever it re-acquires.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `sample()` fails with `NotReady` until the stream reports usable
//! dimensions; the continuous scan loop treats that as an idle cycle.

use tracing::debug;

use scanline_vision::Frame;

use crate::device::DeviceStreamManager;
use crate::error::{CaptureError, CaptureResult};

// =============================================================================
// Frame Sampler
// =============================================================================

/// Samples frames from the active stream into a reused pixel buffer.
#[derive(Debug, Default)]
pub struct FrameSampler {
    frame: Frame,
    sized: bool,
    counter: u64,
}

impl FrameSampler {
    /// Creates a sampler with an unsized buffer.
    pub fn new() -> Self {
        FrameSampler::default()
    }

    /// Forgets the negotiated size. Called once per stream acquisition so
    /// the next sample re-sizes against the new stream.
    pub fn reset(&mut self) {
        self.sized = false;
    }

    /// Copies the current frame out of the stream.
    ///
    /// Returns an owned `Frame` carrying a monotonically increasing sample
    /// index. Fails with [`CaptureError::NotReady`] before the stream
    /// reports usable dimensions.
    pub fn sample(&mut self, manager: &mut DeviceStreamManager) -> CaptureResult<Frame> {
        let (width, height) = manager.dimensions().ok_or(CaptureError::NotReady)?;
        if width == 0 || height == 0 {
            return Err(CaptureError::NotReady);
        }

        if !self.sized {
            self.frame.resize(width, height);
            self.sized = true;
            debug!(width, height, "Sample buffer sized to stream resolution");
        }

        manager.read_into(&mut self.frame)?;
        self.counter += 1;
        self.frame.set_index(self.counter);
        Ok(self.frame.clone())
    }

    /// Total number of frames sampled over the sampler's lifetime.
    #[inline]
    pub fn samples_taken(&self) -> u64 {
        self.counter
    }
}

// =============================================================================
// Camera Pipeline
// =============================================================================

/// The stream manager and its sampler, bundled so the session controller
/// and the continuous scan loop can share one exclusively-owned camera
/// behind a single lock.
pub struct CameraPipeline {
    manager: DeviceStreamManager,
    sampler: FrameSampler,
}

impl CameraPipeline {
    /// Creates a pipeline over the given backend.
    pub fn new(manager: DeviceStreamManager) -> Self {
        CameraPipeline {
            manager,
            sampler: FrameSampler::new(),
        }
    }

    /// Acquires a stream and re-arms the sampler for the new resolution.
    pub async fn acquire(
        &mut self,
        constraints: &crate::device::StreamConstraints,
    ) -> CaptureResult<()> {
        self.manager.acquire(constraints).await?;
        self.sampler.reset();
        Ok(())
    }

    /// Samples one frame from the active stream.
    pub fn sample(&mut self) -> CaptureResult<Frame> {
        self.sampler.sample(&mut self.manager)
    }

    /// Releases the stream. Idempotent.
    pub fn release(&mut self) {
        self.manager.release();
    }

    /// Applies an illumination constraint to the active stream.
    pub fn set_torch(&mut self, enabled: bool) -> CaptureResult<crate::device::TorchSupport> {
        self.manager.set_torch(enabled)
    }

    /// Returns true while a stream is held.
    pub fn is_active(&self) -> bool {
        self.manager.is_active()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
