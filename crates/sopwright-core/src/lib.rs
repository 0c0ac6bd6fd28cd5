//! Sopwright Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Sopwright
//! pipeline. It includes:
//!
//! - **Elements**: Diagram nodes, sequence flows and lanes ([`element`] module)
//! - **Graph**: The immutable process graph and its builder ([`graph`] module)
//! - **Properties**: Diagram-declared process metadata ([`properties`] module)
//! - **Steps**: The linearized procedure model ([`step`] module)
//! - **Document**: The render-ready document context ([`document`] module)

pub mod document;
pub mod element;
pub mod graph;
pub mod properties;
pub mod step;
