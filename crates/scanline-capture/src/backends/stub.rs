//! # Stub Camera Backend
//!
//! A deterministic in-memory camera. Streams a synthetic test pattern at a
//! fixed native resolution, optionally with a barcode-shaped bright bar so
//! the region heuristic has something to find.
//!
//! Failure injection covers the acquisition error taxonomy so session and
//! manager tests can exercise every path without hardware.

use async_trait::async_trait;

use scanline_vision::Frame;

use crate::device::{CameraBackend, CameraStream, StreamConstraints, TorchSupport};
use crate::error::{CaptureError, CaptureResult};

/// What the stub stream paints into sampled frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestPattern {
    /// Uniform mid-gray. Yields no candidate regions.
    Flat,

    /// A bright 200x40 bar on black: area 8000 px², aspect 5.0, inside the
    /// barcode silhouette gates.
    Bar,
}

/// Which acquisition failure to inject, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InjectedFailure {
    None,
    PermissionDenied,
    DeviceUnavailable,
}

// =============================================================================
// Backend
// =============================================================================

/// Deterministic camera backend for tests and camera-less hosts.
#[derive(Debug, Clone)]
pub struct StubCameraBackend {
    width: u32,
    height: u32,
    torch_supported: bool,
    pattern: TestPattern,
    failure: InjectedFailure,
}

impl StubCameraBackend {
    /// Creates a backend whose streams negotiate the given native
    /// resolution regardless of the requested ideal.
    pub fn new(width: u32, height: u32) -> Self {
        StubCameraBackend {
            width,
            height,
            torch_supported: false,
            pattern: TestPattern::Flat,
            failure: InjectedFailure::None,
        }
    }

    /// Streams report torch as a supported capability.
    pub fn with_torch(mut self) -> Self {
        self.torch_supported = true;
        self
    }

    /// Streams paint a barcode-shaped bright bar into every frame.
    pub fn with_bar_pattern(mut self) -> Self {
        self.pattern = TestPattern::Bar;
        self
    }

    /// Every acquisition fails with `PermissionDenied`.
    pub fn deny_permission(mut self) -> Self {
        self.failure = InjectedFailure::PermissionDenied;
        self
    }

    /// Every acquisition fails with `DeviceUnavailable`.
    pub fn unavailable(mut self) -> Self {
        self.failure = InjectedFailure::DeviceUnavailable;
        self
    }
}

#[async_trait]
impl CameraBackend for StubCameraBackend {
    async fn acquire(
        &self,
        _constraints: &StreamConstraints,
    ) -> CaptureResult<Box<dyn CameraStream>> {
        match self.failure {
            InjectedFailure::PermissionDenied => {
                return Err(CaptureError::PermissionDenied(
                    "camera access was denied".into(),
                ))
            }
            InjectedFailure::DeviceUnavailable => {
                return Err(CaptureError::DeviceUnavailable(
                    "no camera device present".into(),
                ))
            }
            InjectedFailure::None => {}
        }

        Ok(Box::new(StubCameraStream {
            width: self.width,
            height: self.height,
            torch_supported: self.torch_supported,
            pattern: self.pattern,
            stopped: false,
        }))
    }
}

// =============================================================================
// Stream
// =============================================================================

struct StubCameraStream {
    width: u32,
    height: u32,
    torch_supported: bool,
    pattern: TestPattern,
    stopped: bool,
}

impl CameraStream for StubCameraStream {
    fn dimensions(&self) -> Option<(u32, u32)> {
        if self.stopped {
            None
        } else {
            Some((self.width, self.height))
        }
    }

    fn read_into(&mut self, frame: &mut Frame) -> CaptureResult<()> {
        if self.stopped {
            return Err(CaptureError::DeviceUnavailable("stream stopped".into()));
        }
        if frame.dimensions() != (self.width, self.height) {
            return Err(CaptureError::NotReady);
        }

        match self.pattern {
            TestPattern::Flat => {
                for px in frame.pixels_mut().chunks_exact_mut(4) {
                    px.copy_from_slice(&[128, 128, 128, 255]);
                }
            }
            TestPattern::Bar => paint_bar(frame, self.width, self.height),
        }
        Ok(())
    }

    fn set_torch(&mut self, _enabled: bool) -> CaptureResult<TorchSupport> {
        if self.stopped {
            return Err(CaptureError::DeviceUnavailable("stream stopped".into()));
        }
        if self.torch_supported {
            Ok(TorchSupport::Applied)
        } else {
            Ok(TorchSupport::Unsupported)
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Paints a centered 200x40 white bar on black.
fn paint_bar(frame: &mut Frame, width: u32, height: u32) {
    let bar_w = 200u32.min(width);
    let bar_h = 40u32.min(height);
    let x0 = (width - bar_w) / 2;
    let y0 = (height - bar_h) / 2;

    let pixels = frame.pixels_mut();
    for y in 0..height {
        for x in 0..width {
            let offset = ((y * width + x) * 4) as usize;
            let inside = x >= x0 && x < x0 + bar_w && y >= y0 && y < y0 + bar_h;
            let v = if inside { 255 } else { 0 };
            pixels[offset] = v;
            pixels[offset + 1] = v;
            pixels[offset + 2] = v;
            pixels[offset + 3] = 255;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
