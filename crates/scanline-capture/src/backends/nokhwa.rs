//! # Nokhwa Camera Backend
//!
//! Real camera hardware via the `nokhwa` crate. Compiled only with the
//! `camera-nokhwa` feature; everything else in the crate runs against the
//! deterministic stub.
//!
//! Torch control is reported as unsupported: `nokhwa` exposes no
//! illumination constraint, and the probe contract makes that a first-class
//! outcome rather than an error.

use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use tracing::{info, warn};

use scanline_vision::Frame;

use crate::device::{CameraBackend, CameraStream, StreamConstraints, TorchSupport};
use crate::error::{CaptureError, CaptureResult};

/// Camera backend over the first native capture device.
#[derive(Debug, Clone, Default)]
pub struct NokhwaCameraBackend {
    /// Device index to open (0 is the platform default camera).
    pub device_index: u32,
}

impl NokhwaCameraBackend {
    /// Creates a backend for the given device index.
    pub fn new(device_index: u32) -> Self {
        NokhwaCameraBackend { device_index }
    }
}

#[async_trait]
impl CameraBackend for NokhwaCameraBackend {
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> CaptureResult<Box<dyn CameraStream>> {
        let format = CameraFormat::new(
            Resolution::new(constraints.ideal_width, constraints.ideal_height),
            FrameFormat::MJPEG,
            constraints.frame_rate,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));
        let index = CameraIndex::Index(self.device_index);

        // Device negotiation is blocking in nokhwa; keep it off the runtime.
        let stream = tokio::task::spawn_blocking(move || -> CaptureResult<NokhwaCameraStream> {
            let mut camera = Camera::new(index, requested)
                .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
            camera
                .open_stream()
                .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

            let resolution = camera.resolution();
            info!(
                width = resolution.width(),
                height = resolution.height(),
                "Opened native camera stream"
            );
            Ok(NokhwaCameraStream {
                camera,
                width: resolution.width(),
                height: resolution.height(),
                stopped: false,
            })
        })
        .await
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))??;

        Ok(Box::new(stream))
    }
}

struct NokhwaCameraStream {
    camera: Camera,
    width: u32,
    height: u32,
    stopped: bool,
}

impl CameraStream for NokhwaCameraStream {
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

        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        let rgb = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let pixels = frame.pixels_mut();
        for (i, px) in rgb.pixels().enumerate() {
            let offset = i * 4;
            pixels[offset] = px[0];
            pixels[offset + 1] = px[1];
            pixels[offset + 2] = px[2];
            pixels[offset + 3] = 255;
        }
        Ok(())
    }

    fn set_torch(&mut self, _enabled: bool) -> CaptureResult<TorchSupport> {
        Ok(TorchSupport::Unsupported)
    }

    fn stop(&mut self) {
        if !self.stopped {
            if let Err(e) = self.camera.stop_stream() {
                warn!(error = %e, "Failed to stop camera stream cleanly");
            }
            self.stopped = true;
        }
    }
}
