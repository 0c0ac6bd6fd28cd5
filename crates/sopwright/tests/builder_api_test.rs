//! Integration tests for the SopBuilder API
//!
//! These tests drive the ingest, metadata and finalize stages end to end and
//! inspect the produced `.docx` package.

use std::io::{Cursor, Read};

use sopwright::{
    SopBuilder, SopError,
    config::AppConfig,
    document::ReferencedDocument,
    step::{BranchKind, StepKind},
    synthesize::UserEdits,
};

const PURCHASE_REQUEST: &str = include_str!("../../../demos/purchase_request.bpmn");
const LEAVE_APPROVAL: &str = include_str!("../../../demos/leave_approval.bpmn");
const INCIDENT_ESCALATION: &str = include_str!("../../../demos/incident_escalation.bpmn");

/// Extracts `word/document.xml` from a rendered package.
fn document_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Output is a zip package");
    let mut part = archive
        .by_name("word/document.xml")
        .expect("Package has a main document");
    let mut xml = String::new();
    part.read_to_string(&mut xml).expect("Main document is UTF-8");
    xml
}

#[test]
fn test_builder_api_exists() {
    let _builder = SopBuilder::default();
    let _builder = SopBuilder::new(AppConfig::default());
}

#[test]
fn test_purchase_request_end_to_end() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(PURCHASE_REQUEST).expect("Failed to parse");

    let context = builder
        .context(&graph, &UserEdits::new())
        .expect("Failed to build context");
    assert_eq!(context.field("process_name"), Some("Purchase Request"));
    assert_eq!(context.field("process_code"), Some("PR-001"));

    let top: Vec<_> = context.steps().iter().filter(|s| s.depth() == 0).collect();
    assert_eq!(top.len(), 5);
    assert_eq!(*top[0].kind(), StepKind::Start);
    assert!(top[2].kind().is_decision());
    assert_eq!(
        *top[3].kind(),
        StepKind::Branch {
            kind: BranchKind::Exclusive,
            label: "Approved".to_string()
        }
    );
    assert_eq!(
        *top[4].kind(),
        StepKind::Branch {
            kind: BranchKind::Exclusive,
            label: "Rejected".to_string()
        }
    );

    let lanes: Vec<_> = context.references().iter().filter_map(|r| r.lane()).collect();
    assert_eq!(lanes, ["Approver", "Requester"]);

    let document = builder
        .finalize(&graph, &UserEdits::new())
        .expect("Failed to render");
    let xml = document_xml(document.bytes());
    assert!(xml.contains("Purchase Request"));
    assert!(xml.contains("Submit Request"));
    assert!(xml.contains("2 business days"));
    assert!(!xml.contains("{{"), "Placeholders left in output");
}

#[test]
fn test_finalize_is_deterministic() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(LEAVE_APPROVAL).expect("Failed to parse");
    let edits = UserEdits::new().with_field("release_date", "2026-01-01");

    let first = builder.finalize(&graph, &edits).expect("Failed to render");
    let second = builder.finalize(&graph, &edits).expect("Failed to render");

    assert_eq!(first.bytes(), second.bytes());
}

#[test]
fn test_metadata_defaults_come_from_the_diagram() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(PURCHASE_REQUEST).expect("Failed to parse");

    let metadata = builder.extract_metadata(&graph);

    assert_eq!(metadata["process_name"], "Purchase Request");
    assert!(metadata["purpose"].starts_with("This document defines how employees request"));
    assert_eq!(
        metadata["scope"],
        "This procedure applies to all purchases below the tender threshold."
    );
    assert_eq!(metadata["issued_by"], "Business Excellence");
}

#[test]
fn test_user_edits_take_precedence() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(PURCHASE_REQUEST).expect("Failed to parse");
    let edits = UserEdits::new()
        .with_field("process_name", "Procurement Request")
        .with_field("purpose", "Explains how to buy things.");

    let context = builder.context(&graph, &edits).expect("Failed to build context");

    assert_eq!(context.field("process_name"), Some("Procurement Request"));
    assert_eq!(context.field("purpose"), Some("Explains how to buy things."));
    assert!(
        context
            .field("scope")
            .is_some_and(|scope| scope.contains("tender threshold")),
        "Diagram scope is kept"
    );
}

#[test]
fn test_empty_references_drop_the_section() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(PURCHASE_REQUEST).expect("Failed to parse");

    let with_references = builder
        .finalize(&graph, &UserEdits::new())
        .expect("Failed to render");
    assert!(document_xml(with_references.bytes()).contains("Referenced Documents"));

    let edits = UserEdits::new().with_references(Vec::new());
    let without_references = builder.finalize(&graph, &edits).expect("Failed to render");
    let xml = document_xml(without_references.bytes());

    assert!(!xml.contains("Referenced Documents"));
    assert!(xml.contains("Process Description"));
}

#[test]
fn test_one_row_per_reference() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(PURCHASE_REQUEST).expect("Failed to parse");
    let edits = UserEdits::new().with_references(vec![
        ReferencedDocument::new("FIN-POL-01", "Procurement Policy"),
        ReferencedDocument::new("FIN-FRM-07", "Purchase Request Form"),
        ReferencedDocument::new("FIN-MAT-02", "Delegation of Authority Matrix"),
    ]);

    let document = builder.finalize(&graph, &edits).expect("Failed to render");
    let xml = document_xml(document.bytes());

    for id in ["FIN-POL-01", "FIN-FRM-07", "FIN-MAT-02"] {
        assert_eq!(xml.matches(id).count(), 1, "{id} appears once");
    }
    assert!(!xml.contains("Approver Approval"));
}

#[test]
fn test_boundary_events_and_subprocesses_render() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(INCIDENT_ESCALATION).expect("Failed to parse");

    let context = builder
        .context(&graph, &UserEdits::new())
        .expect("Failed to build context");
    assert_eq!(context.field("process_code"), Some("IT-INC-004"));
    assert!(context.steps().iter().any(|s| matches!(
        s.kind(),
        StepKind::Branch {
            kind: BranchKind::Exception,
            ..
        }
    )));
    assert!(
        context
            .steps()
            .iter()
            .any(|s| *s.kind() == StepKind::SubProcess)
    );

    let document = builder
        .finalize(&graph, &UserEdits::new())
        .expect("Failed to render");
    let xml = document_xml(document.bytes());
    assert!(xml.contains("8 business hours"));
    assert!(xml.contains("ITSM"));
}

#[test]
fn test_loops_become_routing_markers() {
    let builder = SopBuilder::default();
    let graph = builder.ingest(LEAVE_APPROVAL).expect("Failed to parse");

    let context = builder
        .context(&graph, &UserEdits::new())
        .expect("Failed to build context");

    assert!(
        context
            .steps()
            .iter()
            .any(|s| matches!(s.kind(), StepKind::LoopBack { .. }))
    );
    assert_eq!(context.policies().len(), 2);
}

#[test]
fn test_invalid_diagram_returns_parse_error() {
    let builder = SopBuilder::default();
    let result = builder.ingest("<definitions");

    match result {
        Err(SopError::Parse { err, src }) => {
            assert!(!err.diagnostics().is_empty());
            assert_eq!(src, "<definitions");
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_builder_reusability() {
    let builder = SopBuilder::default();

    for markup in [PURCHASE_REQUEST, LEAVE_APPROVAL, INCIDENT_ESCALATION] {
        let graph = builder.ingest(markup).expect("Failed to parse");
        let document = builder
            .finalize(&graph, &UserEdits::new())
            .expect("Failed to render");
        assert!(!document.bytes().is_empty());
    }
}
