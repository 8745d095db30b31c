//! Sextant - diagram quality scoring and layout selection.
//!
//! Sextant measures the geometric quality of an automatically laid-out
//! node-link diagram (boxes, nested boxes, routed connectors) and turns
//! the measurement into decisions:
//!
//! - [`analyzer::analyze`] scores a positioned snapshot, producing
//!   itemized violations and a weighted 0-100 score
//! - [`rules::select_layout_config`] picks a layout configuration from
//!   structural context *before* layout runs
//! - [`audit::audit_layout`] pulls a snapshot from a live rendered page,
//!   scores it, and renders human-readable findings
//! - [`memory::MemoryBank`] remembers layouts that scored well, as
//!   few-shot examples for a generation step
//!
//! The analyzer, scoring engine, and rule selector are synchronous pure
//! functions over immutable inputs, safe to call concurrently. The auditor
//! is async over an injected [`audit::PageDriver`]; the memory bank does
//! synchronous file I/O and assumes a single writer.
//!
//! # Examples
//!
//! ```rust
//! use sextant::analyzer::analyze;
//! use sextant::config::AnalysisConfig;
//! use sextant_core::geometry::Size;
//! use sextant_core::model::DiagramNode;
//!
//! let nodes = vec![
//!     DiagramNode::new("web", 0.0, 0.0, 200.0, 120.0),
//!     DiagramNode::new("api", 400.0, 0.0, 200.0, 120.0),
//! ];
//! let metrics = analyze(
//!     &nodes,
//!     &[],
//!     Size::new(1920.0, 1080.0),
//!     None,
//!     None,
//!     &AnalysisConfig::default(),
//! );
//! assert!(metrics.overlapping_nodes.is_empty());
//! ```

pub mod analyzer;
pub mod audit;
pub mod config;
pub mod memory;
pub mod rules;
pub mod scoring;

pub use sextant_core::{geometry, metrics, model, weights};

pub use analyzer::analyze;
pub use audit::{AuditError, AuditOptions, AuditResult, PageDriver, audit_layout};
pub use config::AnalysisConfig;
pub use memory::{MemoryBank, MemoryBankConfig, SuccessfulLayout};
pub use rules::{LayoutConfig, LayoutRule, merge_layout_rules, select_layout_config};
pub use scoring::composite_objective;
