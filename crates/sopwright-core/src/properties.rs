//! Process metadata declared inside the diagram itself.

/// Metadata the diagram author attached to the process or its pool.
///
/// Every value is optional; the document synthesis stage falls back to
/// templated defaults for anything left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessProperties {
    name: Option<String>,
    code: Option<String>,
    purpose: Option<String>,
    scope: Option<String>,
    policies: Vec<String>,
    abbreviations: Vec<(String, String)>,
}

impl ProcessProperties {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_blank(name.into());
        self
    }

    /// Sets the process code, typically a version tag.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = non_blank(code.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = non_blank(purpose.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = non_blank(scope.into());
        self
    }

    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        if let Some(policy) = non_blank(policy.into()) {
            self.policies.push(policy);
        }
        self
    }

    /// Declares an abbreviation. A later declaration of the same term wins.
    pub fn with_abbreviation(mut self, term: impl Into<String>, definition: impl Into<String>) -> Self {
        let term = term.into();
        let definition = definition.into();
        if term.trim().is_empty() {
            return self;
        }
        match self.abbreviations.iter_mut().find(|(t, _)| *t == term) {
            Some(entry) => entry.1 = definition,
            None => self.abbreviations.push((term, definition)),
        }
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn policies(&self) -> &[String] {
        &self.policies
    }

    /// Declared `(term, definition)` pairs in declaration order.
    pub fn abbreviations(&self) -> &[(String, String)] {
        &self.abbreviations
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_ignored() {
        let props = ProcessProperties::default()
            .with_name("  ")
            .with_scope("")
            .with_policy(" ");

        assert_eq!(props.name(), None);
        assert_eq!(props.scope(), None);
        assert!(props.policies().is_empty());
    }

    #[test]
    fn test_abbreviation_redeclaration_replaces_definition() {
        let props = ProcessProperties::default()
            .with_abbreviation("PO", "Purchase Order")
            .with_abbreviation("HR", "Human Resources")
            .with_abbreviation("PO", "Process Owner");

        assert_eq!(
            props.abbreviations(),
            &[
                ("PO".to_string(), "Process Owner".to_string()),
                ("HR".to_string(), "Human Resources".to_string()),
            ]
        );
    }
}
