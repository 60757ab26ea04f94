//! # Error Types
//!
//! Domain-specific error types for scanline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  scanline-core errors (this file)                                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  scanline-vision errors (separate crate)                               │
//! │  └── VisionError      - Buffer/encoding failures                       │
//! │                                                                         │
//! │  scanline-capture errors (separate crate)                              │
//! │  └── CaptureError     - Device, transport and session failures         │
//! │                                                                         │
//! │  Flow: ValidationError → CaptureError → session events                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value, limit)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a scanned or typed value doesn't meet requirements.
/// Used for early validation before any collaborator lookup runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., disallowed characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");

        let err = ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        };
        assert_eq!(err.to_string(), "barcode must be at most 64 characters");

        let err = ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "spaces are not allowed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "barcode has invalid format: spaces are not allowed"
        );
    }
}
