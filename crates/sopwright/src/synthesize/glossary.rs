//! Known abbreviations and abbreviation detection.

use std::sync::OnceLock;

use regex::Regex;

/// Definition used for detected terms missing from [`GLOSSARY`].
pub const DEFINITION_REQUIRED: &str = "[Definition required]";

/// Terms the generated document itself uses.
pub(super) const SEED_TERMS: &[&str] = &["SOP", "RACI", "SLA"];

/// Definitions of common business abbreviations, sorted by term.
pub(super) const GLOSSARY: &[(&str, &str)] = &[
    ("AP", "Accounts Payable"),
    ("AR", "Accounts Receivable"),
    ("CEO", "Chief Executive Officer"),
    ("CFO", "Chief Financial Officer"),
    ("CRM", "Customer Relationship Management"),
    ("ERP", "Enterprise Resource Planning"),
    ("GRN", "Goods Received Note"),
    ("HR", "Human Resources"),
    ("IT", "Information Technology"),
    ("KPI", "Key Performance Indicator"),
    ("PO", "Purchase Order"),
    ("PR", "Purchase Request"),
    ("QA", "Quality Assurance"),
    ("RACI", "Responsible, Accountable, Consulted, Informed"),
    ("RFQ", "Request for Quotation"),
    ("SLA", "Service Level Agreement"),
    ("SOP", "Standard Operating Procedure"),
];

fn abbreviation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][A-Z0-9&]{1,7}\b").expect("Abbreviation pattern is valid"))
}

/// Looks up the glossary definition of `term`, ignoring case.
pub(super) fn definition(term: &str) -> Option<&'static str> {
    GLOSSARY
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(term))
        .map(|(_, definition)| *definition)
}

/// Abbreviation-like words in `text`, in order of appearance.
pub(super) fn detect(text: &str) -> impl Iterator<Item = &str> {
    abbreviation_pattern().find_iter(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_abbreviations() {
        let found: Vec<_> = detect("Raise PO in ERP and notify HR").collect();
        assert_eq!(found, ["PO", "ERP", "HR"]);
    }

    #[test]
    fn test_detect_ignores_words_and_single_letters() {
        assert_eq!(detect("Approve Request A").count(), 0);
        assert_eq!(detect("Check R&D budget").collect::<Vec<_>>(), ["R&D"]);
    }

    #[test]
    fn test_glossary_is_sorted() {
        assert!(GLOSSARY.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_definition_lookup() {
        assert_eq!(definition("po"), Some("Purchase Order"));
        assert_eq!(definition("XYZ"), None);
    }
}
