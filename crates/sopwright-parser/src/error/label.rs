//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the diagram markup.
///
/// A diagnostic normally carries one primary label marking the offending
/// construct. Secondary labels point at related definitions, such as the
/// first element that used a duplicated identifier.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let primary = Label::primary(Span::new(10..20), "not defined");
        let secondary = Label::secondary(Span::new(5..15), "flow declared here");

        assert_eq!(primary.span().start(), 10);
        assert_eq!(primary.message(), "not defined");
        assert!(primary.is_primary());
        assert!(secondary.is_secondary());
        assert_eq!(secondary.span().end(), 15);
    }
}
