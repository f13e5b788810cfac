//! Schedule error types
//!
//! Every failure here is a deterministic input problem: nothing is retryable,
//! and nothing has side effects to unwind. Errors convert to an agent-friendly
//! envelope with a recovery action for MCP tool responses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

// ============================================================================
// Structured Error Response (Agent-Friendly)
// ============================================================================

/// Structured error response for MCP tools.
///
/// # Example Response
/// ```json
/// {
///   "code": "FIELD_OVERFLOW",
///   "message": "mps 16777216 at phase 0 exceeds 24-bit max (16777215)",
///   "recovery_action": "Reduce mps at phase 0 to at most 16777215",
///   "context": {
///     "field": "mps",
///     "phase_index": 0
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code (e.g., "INVALID_SCHEDULE", "FIELD_OVERFLOW")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Actionable recovery instruction for the caller
    pub recovery_action: String,

    /// Relevant context for debugging and recovery
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,

    /// Whether this error is retryable (always false for schedule errors)
    #[serde(default)]
    pub retryable: bool,
}

impl StructuredError {
    /// Create a new structured error
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        recovery_action: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            recovery_action: recovery_action.into(),
            context: HashMap::new(),
            retryable: false,
        }
    }

    /// Add context key-value pair
    pub fn with_context(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for StructuredError {}

/// Packed field that failed a bit-width check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseField {
    #[serde(rename = "mps")]
    Rate,
    #[serde(rename = "blockDelta")]
    Duration,
}

impl PhaseField {
    /// Name of the field as it appears in the JSON schedule
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rate => "mps",
            Self::Duration => "blockDelta",
        }
    }
}

impl std::fmt::Display for PhaseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while generating, encoding or decoding a schedule
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Generated schedule does not emit exactly the target supply
    #[error(
        "Schedule totals {total} MPS, expected {expected}. \
         Try reducing round_to_nearest or adjusting num_steps to avoid zero-duration blocks."
    )]
    InvalidSchedule { total: u128, expected: u64 },

    /// A phase field does not fit its packed bit width
    #[error("{field} {value} at phase {phase_index} exceeds {bits}-bit max ({max})")]
    FieldOverflow {
        field: PhaseField,
        phase_index: usize,
        value: u64,
        max: u64,
        bits: u32,
    },

    /// A generation parameter is out of range
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Encoded bytes cannot be unpacked into phases
    #[error("Malformed encoded schedule: {message}")]
    MalformedEncoding { message: String },
}

impl ScheduleError {
    /// Create an invalid schedule error
    pub fn invalid_schedule(total: u128, expected: u64) -> Self {
        Self::InvalidSchedule { total, expected }
    }

    /// Create a field overflow error for the given bit width
    pub fn field_overflow(field: PhaseField, phase_index: usize, value: u64, bits: u32) -> Self {
        Self::FieldOverflow {
            field,
            phase_index,
            value,
            max: (1u64 << bits) - 1,
            bits,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a malformed encoding error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            message: message.into(),
        }
    }

    /// Convert to structured error for MCP tool responses
    pub fn to_structured(&self) -> StructuredError {
        match self {
            Self::InvalidSchedule { total, expected } => StructuredError::new(
                "INVALID_SCHEDULE",
                self.to_string(),
                "Reduce round_to_nearest or num_steps so every main step keeps a non-zero duration",
            )
            .with_context("total_mps", total.to_string())
            .with_context("target_mps", *expected),
            Self::FieldOverflow {
                field,
                phase_index,
                value,
                max,
                bits,
            } => StructuredError::new(
                "FIELD_OVERFLOW",
                self.to_string(),
                format!(
                    "Reduce {} at phase {} to at most {}",
                    field, phase_index, max
                ),
            )
            .with_context("field", field.as_str())
            .with_context("phase_index", *phase_index)
            .with_context("value", *value)
            .with_context("max", *max)
            .with_context("bits", *bits),
            Self::InvalidParameter { name, message } => StructuredError::new(
                "INVALID_PARAMETER",
                self.to_string(),
                format!("Fix '{}': {}", name, message),
            )
            .with_context("parameter", name.clone()),
            Self::MalformedEncoding { .. } => StructuredError::new(
                "MALFORMED_ENCODING",
                self.to_string(),
                "Pass the 0x-prefixed hex string returned by encode_supply_schedule",
            ),
        }
    }

    /// Convert to structured JSON string for MCP tool responses
    pub fn to_structured_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_structured())
            .unwrap_or_else(|_| format!(r#"{{"code":"SERIALIZATION_ERROR","message":"{}"}}"#, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_overflow_message() {
        let err = ScheduleError::field_overflow(PhaseField::Rate, 0, 1 << 24, 24);
        assert_eq!(
            err.to_string(),
            "mps 16777216 at phase 0 exceeds 24-bit max (16777215)"
        );

        let err = ScheduleError::field_overflow(PhaseField::Duration, 3, 1 << 40, 40);
        assert!(err.to_string().contains("exceeds 40-bit max (1099511627775)"));
        assert!(err.to_string().starts_with("blockDelta"));
    }

    #[test]
    fn test_invalid_schedule_message() {
        let err = ScheduleError::invalid_schedule(10_000_500, 10_000_000);
        let msg = err.to_string();
        assert!(msg.contains("10000500"));
        assert!(msg.contains("expected 10000000"));
        assert!(msg.contains("round_to_nearest"));
    }

    #[test]
    fn test_structured_overflow_context() {
        let err = ScheduleError::field_overflow(PhaseField::Duration, 2, 1 << 40, 40);
        let structured = err.to_structured();
        assert_eq!(structured.code, "FIELD_OVERFLOW");
        assert!(!structured.retryable);
        assert_eq!(structured.context["field"], "blockDelta");
        assert_eq!(structured.context["phase_index"], 2);
        assert_eq!(structured.context["max"], 1_099_511_627_775u64);
    }

    #[test]
    fn test_structured_json_roundtrip() {
        let err = ScheduleError::invalid_parameter("alpha", "must be positive");
        let json = err.to_structured_json();
        let parsed: StructuredError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code, "INVALID_PARAMETER");
        assert_eq!(parsed.context["parameter"], "alpha");
        assert!(parsed.recovery_action.contains("alpha"));
    }

    #[test]
    fn test_structured_display() {
        let structured = ScheduleError::malformed("odd length").to_structured();
        assert_eq!(
            structured.to_string(),
            "[MALFORMED_ENCODING] Malformed encoded schedule: odd length"
        );
    }
}
