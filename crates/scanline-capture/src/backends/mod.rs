//! # Camera Backends
//!
//! Implementations of [`crate::device::CameraBackend`].
//!
//! - [`stub`] - deterministic in-memory camera, always compiled. Drives the
//!   test suite and any host without camera hardware.
//! - `nokhwa` - real hardware via the `nokhwa` crate, behind the
//!   `camera-nokhwa` feature.

pub mod stub;

#[cfg(feature = "camera-nokhwa")]
pub mod nokhwa;

pub use stub::StubCameraBackend;

#[cfg(feature = "camera-nokhwa")]
pub use self::nokhwa::NokhwaCameraBackend;
