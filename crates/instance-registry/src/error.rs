//! Error types for the instance registry

use std::error::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by registry operations and constructor resolution
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Negative slot id passed to an operation that requires a valid one
    #[error("slot id cannot be smaller than 0 (got {0})")]
    InvalidSlot(i32),

    /// No declared constructor matches the supplied argument list
    #[error("no suitable constructor found for type {type_name} with the specified arguments {arg_types}")]
    NoMatchingConstructor {
        /// Display name of the target type
        type_name: String,
        /// Formatted runtime argument types, e.g. `(alloc::string::String,null)`
        arg_types: String,
    },

    /// A matching constructor was found but its invocation failed
    #[error("construction of {type_name} failed")]
    ConstructionFailed {
        /// Display name of the target type
        type_name: String,
        /// Underlying cause
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_slot_display() {
        let err = RegistryError::InvalidSlot(-1);
        assert_eq!(err.to_string(), "slot id cannot be smaller than 0 (got -1)");
    }

    #[test]
    fn test_no_matching_constructor_display() {
        let err = RegistryError::NoMatchingConstructor {
            type_name: "Widget".to_string(),
            arg_types: "(i32,null)".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Widget"));
        assert!(msg.contains("(i32,null)"));
    }

    #[test]
    fn test_construction_failed_carries_source() {
        let err = RegistryError::ConstructionFailed {
            type_name: "Widget".to_string(),
            source: "label must not be empty".into(),
        };
        assert_eq!(err.to_string(), "construction of Widget failed");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("label must not be empty"));
    }
}
