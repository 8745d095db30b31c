//! Sextant Core Types and Definitions
//!
//! This crate provides the foundational types for the Sextant diagram
//! quality engine. It includes:
//!
//! - **Geometry**: Points, sizes, rectangles, and the pure predicates the
//!   analyzer is built on ([`geometry`] module)
//! - **Model**: Diagram nodes, edges, and hierarchy resolution
//!   ([`model`] module)
//! - **Metrics**: Violation records and the quality result record
//!   ([`metrics`] module)
//! - **Weights**: Per-criterion weight vectors with level overrides
//!   ([`weights`] module)
//!
//! Everything here is pure data and pure computation: no I/O, no clocks,
//! no randomness. Analysis of identical input is bit-identical.

pub mod geometry;
pub mod metrics;
pub mod model;
pub mod weights;
