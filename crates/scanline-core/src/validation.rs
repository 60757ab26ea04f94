//! # Validation Module
//!
//! Input validation for values entering the pipeline.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Detection service                                            │
//! │  └── Only emits values it actually decoded                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any collaborator lookup)                 │
//! │  ├── Empty / overlong / garbage values rejected early                  │
//! │  └── Saves a network round trip on obviously bad input                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Inventory collaborator                                       │
//! │  └── Authoritative uniqueness checks                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_BARCODE_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Barcode Validation
// =============================================================================

/// Validates a barcode value before reconciliation.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_BARCODE_LEN`] characters
/// - Must contain only ASCII alphanumerics, hyphens, underscores
///
/// ## Example
/// ```rust
/// use scanline_core::validation::validate_barcode;
///
/// assert!(validate_barcode("4006381333931").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("abc def").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if !barcode
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "only alphanumeric characters, hyphens and underscores allowed".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_barcodes() {
        assert!(validate_barcode("4006381333931").is_ok());
        assert!(validate_barcode("ABC-123_x").is_ok());
        assert!(validate_barcode("  123  ").is_ok()); // trimmed
    }

    #[test]
    fn test_empty_barcode_rejected() {
        assert!(matches!(
            validate_barcode(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_barcode("   "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_overlong_barcode_rejected() {
        let long = "9".repeat(MAX_BARCODE_LEN + 1);
        assert!(matches!(
            validate_barcode(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_garbage_characters_rejected() {
        assert!(matches!(
            validate_barcode("123 456"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_barcode("Ω123"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
