//! # Sopwright Parser
//!
//! Reader for BPMN 2.0 process diagrams. This crate turns BPMN XML into the
//! [`ProcessGraph`] model used by the Sopwright pipeline, reporting every
//! structural problem it finds as a located [`Diagnostic`](error::Diagnostic).
//!
//! ## Usage
//!
//! ```
//! # use sopwright_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         <definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
//!           <process id="p">
//!             <startEvent id="start"/>
//!             <task id="t" name="Submit Request"/>
//!             <endEvent id="end"/>
//!             <sequenceFlow id="f1" sourceRef="start" targetRef="t"/>
//!             <sequenceFlow id="f2" sourceRef="t" targetRef="end"/>
//!           </process>
//!         </definitions>
//!     "#;
//!
//!     let graph = parse(source)?;
//!     assert_eq!(graph.elements_count(), 3);
//!     Ok(())
//! }
//! ```

pub mod error;
mod kind;
mod reader;
mod shapes;
mod span;
mod text;

pub use span::Span;

use sopwright_core::graph::ProcessGraph;

use error::ParseError;

/// Parse BPMN XML into a process graph.
///
/// Every `process` in the document contributes its flow nodes, sequence
/// flows and lanes. Pools of a `collaboration` that reference one of those
/// processes supply the process name and purpose.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying one diagnostic per problem found:
///
/// * malformed XML, or a root that is not BPMN `definitions`
/// * no process, or a process without flow elements
/// * duplicate identifiers, missing required attributes, flows whose
///   endpoints do not exist, boundary events attached to missing hosts
/// * no start event
///
/// Unsupported BPMN elements with an `id` are kept as pass-through nodes and
/// only produce warnings.
pub fn parse(source: &str) -> Result<ProcessGraph, ParseError> {
    reader::read(source)
}
