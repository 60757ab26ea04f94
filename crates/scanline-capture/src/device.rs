//! # Device Stream Manager
//!
//! Exclusive owner of the camera video stream for one session.
//!
//! ## Stream Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stream Ownership Rules                            │
//! │                                                                         │
//! │  • At most one active stream per manager                               │
//! │  • acquire() releases any prior stream before opening the next         │
//! │  • release() stops all tracks and is idempotent                        │
//! │  • Drop releases as a last resort (normal paths call release())        │
//! │                                                                         │
//! │  Torch control is a capability PROBE, not a hard call:                 │
//! │  set_torch() on a device without the capability returns                │
//! │  TorchSupport::Unsupported, never an error, and the manager's          │
//! │  torch flag stays off.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The camera itself is abstracted behind [`CameraBackend`]; the default
//! build ships a deterministic stub (see [`crate::backends`]), real hardware
//! lives behind the `camera-nokhwa` feature.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use scanline_vision::Frame;

use crate::config::{CaptureConfig, FacingMode};
use crate::error::{CaptureError, CaptureResult};

// =============================================================================
// Stream Constraints
// =============================================================================

/// Preferred properties for a camera stream. "Ideal" semantics: the device
/// may negotiate different actual dimensions, which the stream reports back
/// through [`CameraStream::dimensions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Preferred camera facing mode.
    pub facing: FacingMode,

    /// Ideal stream width.
    pub ideal_width: u32,

    /// Ideal stream height.
    pub ideal_height: u32,

    /// Requested frame rate.
    pub frame_rate: u32,
}

impl StreamConstraints {
    /// The high-detail profile used by explicit single/multi-frame capture.
    pub fn capture_profile(config: &CaptureConfig) -> Self {
        StreamConstraints {
            facing: config.camera.facing,
            ideal_width: config.camera.capture_width,
            ideal_height: config.camera.capture_height,
            frame_rate: config.camera.frame_rate,
        }
    }

    /// The lighter profile used by the continuous scan loop.
    pub fn scan_profile(config: &CaptureConfig) -> Self {
        StreamConstraints {
            facing: config.camera.facing,
            ideal_width: config.camera.scan_width,
            ideal_height: config.camera.scan_height,
            frame_rate: config.camera.frame_rate,
        }
    }
}

// =============================================================================
// Torch Capability
// =============================================================================

/// Outcome of a torch constraint application.
///
/// Unsupported is a first-class outcome, not an error: callers detect it
/// without catching anything and flip their feature-availability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchSupport {
    /// The device applied the illumination constraint.
    Applied,

    /// The active device does not expose the capability.
    Unsupported,
}

// =============================================================================
// Camera Abstraction
// =============================================================================

/// An open camera stream.
///
/// Streams are exclusively owned by one [`DeviceStreamManager`]; all methods
/// take `&mut self` and no handle ever escapes the manager.
pub trait CameraStream: Send {
    /// Negotiated stream dimensions, `None` until the device reports them.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Copies the current visible frame into `frame`'s pixel buffer.
    /// The buffer must already be sized to the negotiated dimensions.
    fn read_into(&mut self, frame: &mut Frame) -> CaptureResult<()>;

    /// Applies an illumination constraint. Probing semantics: a device
    /// without the capability reports [`TorchSupport::Unsupported`].
    fn set_torch(&mut self, enabled: bool) -> CaptureResult<TorchSupport>;

    /// Stops all tracks. Called exactly once, by the manager's release.
    fn stop(&mut self);
}

/// A source of camera streams.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Requests a stream satisfying the given constraints.
    ///
    /// Fails with [`CaptureError::PermissionDenied`] or
    /// [`CaptureError::DeviceUnavailable`]; acquisition is the first of the
    /// pipeline's suspension points.
    async fn acquire(&self, constraints: &StreamConstraints)
        -> CaptureResult<Box<dyn CameraStream>>;
}

// =============================================================================
// Device Stream Manager
// =============================================================================

/// Acquires and releases the camera stream, and owns it for the session.
pub struct DeviceStreamManager {
    backend: Arc<dyn CameraBackend>,
    stream: Option<Box<dyn CameraStream>>,
    torch_on: bool,
}

impl DeviceStreamManager {
    /// Creates a manager over the given backend. No hardware is touched
    /// until [`acquire`](Self::acquire).
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        DeviceStreamManager {
            backend,
            stream: None,
            torch_on: false,
        }
    }

    /// Acquires a stream satisfying `constraints`.
    ///
    /// Any prior stream is released first: release happens-before the next
    /// acquisition within a session.
    pub async fn acquire(&mut self, constraints: &StreamConstraints) -> CaptureResult<()> {
        self.release();

        let stream = self.backend.acquire(constraints).await?;
        info!(
            facing = %constraints.facing,
            ideal_width = constraints.ideal_width,
            ideal_height = constraints.ideal_height,
            "Camera stream acquired"
        );
        self.stream = Some(stream);
        self.torch_on = false;
        Ok(())
    }

    /// Stops and drops the active stream. Idempotent: safe on an
    /// already-released or never-acquired manager.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            self.torch_on = false;
            debug!("Camera stream released");
        }
    }

    /// Returns true while a stream is held.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Negotiated dimensions of the active stream, if known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.stream.as_ref().and_then(|s| s.dimensions())
    }

    /// Copies the current frame into `frame`'s buffer.
    pub fn read_into(&mut self, frame: &mut Frame) -> CaptureResult<()> {
        match self.stream.as_mut() {
            Some(stream) => stream.read_into(frame),
            None => Err(CaptureError::NotReady),
        }
    }

    /// Applies an illumination constraint to the active stream.
    ///
    /// The torch flag only moves when the device actually applied the
    /// constraint; an unsupported probe leaves it off.
    pub fn set_torch(&mut self, enabled: bool) -> CaptureResult<TorchSupport> {
        let stream = self.stream.as_mut().ok_or(CaptureError::NotReady)?;
        match stream.set_torch(enabled)? {
            TorchSupport::Applied => {
                self.torch_on = enabled;
                debug!(enabled, "Torch constraint applied");
                Ok(TorchSupport::Applied)
            }
            TorchSupport::Unsupported => {
                debug!("Torch capability not supported by active device");
                Ok(TorchSupport::Unsupported)
            }
        }
    }

    /// Whether the torch is currently on.
    pub fn torch_on(&self) -> bool {
        self.torch_on
    }
}

impl Drop for DeviceStreamManager {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
