//! Error codes for the Sopwright diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Markup errors (the input is not a BPMN document)
//! - `E1xx` - Content errors (the document holds nothing to convert)
//! - `E2xx` - Structural errors (references and required structure)
//! - `W3xx` - Partial content warnings

use std::fmt;

/// Error taxonomy a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The markup cannot be interpreted at all.
    MalformedInput,
    /// The markup parses but lacks required structure.
    StructuralError,
    /// A recoverable condition; the pipeline continues.
    PartialContent,
}

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Markup Errors (E0xx)
    // =========================================================================
    /// Malformed XML.
    ///
    /// The input is not well-formed XML.
    E001,

    /// Not a BPMN document.
    ///
    /// The root element is not `definitions` in the BPMN 2.0 model namespace.
    E002,

    // =========================================================================
    // Content Errors (E1xx)
    // =========================================================================
    /// No process definition.
    ///
    /// The document declares no `process` element.
    E100,

    /// No flow elements.
    ///
    /// The processes contain no tasks, events or gateways.
    E101,

    // =========================================================================
    // Structural Errors (E2xx)
    // =========================================================================
    /// Duplicate identifier.
    ///
    /// Two elements or flows share the same `id`.
    E200,

    /// Unknown flow endpoint.
    ///
    /// A sequence flow's `sourceRef` or `targetRef` names no element.
    E201,

    /// Missing required attribute.
    ///
    /// An element lacks an attribute it cannot be interpreted without.
    E202,

    /// No start event.
    ///
    /// The diagram has no start event to begin the procedure from.
    E203,

    /// Unknown boundary host.
    ///
    /// A boundary event's `attachedToRef` names no element.
    E204,

    // =========================================================================
    // Partial Content Warnings (W3xx)
    // =========================================================================
    /// Unsupported element.
    ///
    /// The element is kept as a pass-through step.
    W300,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::W300 => "W300",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed XML",
            ErrorCode::E002 => "not a BPMN document",
            ErrorCode::E100 => "no process definition",
            ErrorCode::E101 => "no flow elements",
            ErrorCode::E200 => "duplicate identifier",
            ErrorCode::E201 => "flow references unknown element",
            ErrorCode::E202 => "missing required attribute",
            ErrorCode::E203 => "no start event found",
            ErrorCode::E204 => "boundary event attached to unknown element",
            ErrorCode::W300 => "unsupported element",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::E001 | ErrorCode::E002 | ErrorCode::E100 | ErrorCode::E101 => {
                ErrorCategory::MalformedInput
            }
            ErrorCode::E200
            | ErrorCode::E201
            | ErrorCode::E202
            | ErrorCode::E203
            | ErrorCode::E204 => ErrorCategory::StructuralError,
            ErrorCode::W300 => ErrorCategory::PartialContent,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E201.to_string(), "E201");
        assert_eq!(ErrorCode::W300.to_string(), "W300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E201.description(), "flow references unknown element");
        assert_eq!(ErrorCode::E203.description(), "no start event found");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::E001.category(), ErrorCategory::MalformedInput);
        assert_eq!(ErrorCode::E101.category(), ErrorCategory::MalformedInput);
        assert_eq!(ErrorCode::E203.category(), ErrorCategory::StructuralError);
        assert_eq!(ErrorCode::W300.category(), ErrorCategory::PartialContent);
    }
}
