//! Layout auditing against a live rendered diagram.
//!
//! The auditor bridges a rendered page, reachable only through a browser
//! automation handle, to the analyzer. The handle is abstracted behind the
//! [`PageDriver`] trait so audits are testable with an in-memory fake; no
//! global page state is consulted.
//!
//! # Wait Protocol
//!
//! 1. Best-effort wait for the loading indicator to disappear, within half
//!    the timeout budget. Failure here is swallowed: the indicator is an
//!    optional element.
//! 2. Mandatory wait for the diagram container, within the remaining half.
//!    Failure here is a hard error: the container is a required element.
//! 3. Poll the exposed graph object until it appears, up to the full
//!    timeout. A graph that never appears is a [`AuditError::ReadinessTimeout`];
//!    a graph that appears with zero nodes is a *valid* score-0 result.
//! 4. One fixed settling delay for any final layout animation.
//!
//! The distinction in step 3 matters to callers: "no diagram appeared" is
//! a process failure to surface, "an empty diagram appeared" is a finding.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::{Instant, sleep};

use sextant_core::geometry::Size;
use sextant_core::metrics::{ContainmentKind, DiagramQualityMetrics};
use sextant_core::model::{DiagramEdge, DiagramLevel, DiagramNode};
use sextant_core::weights::QualityWeights;

use crate::analyzer;
use crate::config::AnalysisConfig;

/// Failure inside the automation handle.
#[derive(Debug, Error)]
#[error("page driver error: {0}")]
pub struct PageError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl PageError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }

    /// Wraps a plain message
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// Errors the auditor can surface.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The page never exposed a diagram within the deadline. This is a
    /// hard failure the caller must treat as a process error, distinct
    /// from a diagram that rendered with zero nodes.
    #[error("diagram did not become ready within {waited:?}")]
    ReadinessTimeout { waited: Duration },

    #[error(transparent)]
    Page(#[from] PageError),
}

/// The live node/edge graph pulled from a rendered page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<DiagramNode>,
    #[serde(default)]
    pub edges: Vec<DiagramEdge>,
}

/// The surface the auditor needs from a browser automation handle.
///
/// Implementations wrap a real page handle; tests use an in-memory fake.
/// One audit runs per handle at a time; the underlying handle is not
/// assumed reentrant.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Waits until the element matching `selector` is gone or hidden.
    async fn wait_for_hidden(&self, selector: &str, timeout: Duration) -> Result<(), PageError>;

    /// Waits until the element matching `selector` exists and is visible.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<(), PageError>;

    /// Number of nodes the page's exposed graph object currently reports,
    /// or `None` while the graph object is not yet exposed.
    async fn node_count(&self) -> Result<Option<usize>, PageError>;

    /// Pulls the current node/edge snapshot through the scripting bridge.
    async fn snapshot(&self) -> Result<GraphSnapshot, PageError>;

    /// Current viewport dimensions.
    async fn viewport_size(&self) -> Result<Size, PageError>;

    /// Captures a full-page screenshot to the given path.
    async fn screenshot(&self, path: &std::path::Path) -> Result<(), PageError>;
}

/// Audit configuration with documented defaults.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Overall readiness budget; wait steps derive their deadlines from it
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Settling delay after readiness, letting layout animation finish
    pub settle_delay: Duration,
    /// Optional loading indicator; its wait never fails the audit
    pub loading_selector: String,
    /// Required diagram container element
    pub container_selector: String,
    /// Capture a screenshot when violations are found
    pub capture_screenshots: bool,
    pub screenshot_dir: PathBuf,
    /// Weight vector; `None` selects the table for `level`
    pub weights: Option<QualityWeights>,
    pub level: Option<DiagramLevel>,
    pub analysis: AnalysisConfig,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(300),
            loading_selector: "[data-diagram-loading]".to_owned(),
            container_selector: "[data-diagram-root]".to_owned(),
            capture_screenshots: true,
            screenshot_dir: PathBuf::from("audit-screenshots"),
            weights: None,
            level: None,
            analysis: AnalysisConfig::default(),
        }
    }
}

/// The outcome of one audit.
#[derive(Debug, Clone)]
pub struct AuditResult {
    /// 0.0–1.0; capped at 0.5 when containment or overlap is broken
    pub score: f32,
    /// Human-readable violations, most severe first
    pub violations: Vec<String>,
    pub screenshot_path: Option<PathBuf>,
    pub metrics: DiagramQualityMetrics,
}

/// Audits the diagram currently rendered on `page`.
///
/// Returns a fully-populated [`AuditResult`] on the happy and zero-node
/// paths; only a readiness timeout (or a failing automation handle)
/// produces an error.
pub async fn audit_layout<P: PageDriver>(
    page: &P,
    options: &AuditOptions,
) -> Result<AuditResult, AuditError> {
    let half_budget = options.timeout / 2;

    // Phase 1: optional loading indicator; swallow its timeout
    info!(selector = options.loading_selector.as_str(); "Waiting for loading indicator to clear");
    if let Err(err) = page
        .wait_for_hidden(&options.loading_selector, half_budget)
        .await
    {
        debug!(err:? = err; "Loading indicator wait failed; continuing");
    }

    // Phase 2: required container
    info!(selector = options.container_selector.as_str(); "Waiting for diagram container");
    page.wait_for_visible(&options.container_selector, half_budget)
        .await?;

    // Phase 3: poll the exposed graph object
    let poll_start = Instant::now();
    let mut graph_seen = false;
    loop {
        match page.node_count().await? {
            Some(count) if count > 0 => {
                debug!(node_count = count; "Graph ready");
                break;
            }
            Some(_) => graph_seen = true,
            None => {}
        }
        if poll_start.elapsed() >= options.timeout {
            if graph_seen {
                // The graph object exists but stayed empty: that is a
                // finding, not a process failure
                break;
            }
            warn!(waited:? = options.timeout; "Diagram never became ready");
            return Err(AuditError::ReadinessTimeout {
                waited: options.timeout,
            });
        }
        sleep(options.poll_interval).await;
    }

    // Phase 4: settle
    sleep(options.settle_delay).await;

    let snapshot = page.snapshot().await?;
    if snapshot.nodes.is_empty() {
        info!("Diagram rendered with zero nodes");
        return Ok(AuditResult {
            score: 0.0,
            violations: vec![
                "CRITICAL: diagram rendered with zero nodes; nothing to analyze".to_owned(),
            ],
            screenshot_path: None,
            metrics: DiagramQualityMetrics::default(),
        });
    }

    let viewport = page.viewport_size().await?;
    let metrics = analyzer::analyze(
        &snapshot.nodes,
        &snapshot.edges,
        viewport,
        options.weights.as_ref(),
        options.level,
        &options.analysis,
    );

    let violations = render_violations(&metrics);
    let score = derive_score(&metrics);

    let screenshot_path = if !violations.is_empty() && options.capture_screenshots {
        capture_screenshot(page, options).await
    } else {
        None
    };

    info!(
        score,
        violation_count = violations.len(),
        weighted_score = metrics.weighted_score;
        "Audit complete"
    );

    Ok(AuditResult {
        score,
        violations,
        screenshot_path,
        metrics,
    })
}

/// Maps the 0–100 weighted score to the 0.0–1.0 audit score.
///
/// Containment or overlap violations cap the result at 0.5 and subtract a
/// flat 0.2, so a structurally-broken diagram can never pass an
/// acceptance threshold near 1.0.
fn derive_score(metrics: &DiagramQualityMetrics) -> f32 {
    let base = metrics.weighted_score / 100.0;
    if metrics.parent_child_containment.is_empty() && metrics.overlapping_nodes.is_empty() {
        base.min(1.0)
    } else {
        (base - 0.2).min(0.5).max(0.0)
    }
}

/// Renders metrics into ordered, severity-tagged messages.
fn render_violations(metrics: &DiagramQualityMetrics) -> Vec<String> {
    let mut messages = Vec::new();

    for overlap in &metrics.overlapping_nodes {
        messages.push(format!(
            "CRITICAL: nodes '{}' and '{}' overlap by {:.0}% of the smaller node",
            overlap.node_a, overlap.node_b, overlap.overlap_percentage
        ));
    }
    for containment in &metrics.parent_child_containment {
        if containment.violation == ContainmentKind::Outside {
            messages.push(format!(
                "CRITICAL: '{}' renders outside its parent '{}'",
                containment.child, containment.parent
            ));
        }
    }
    for containment in &metrics.parent_child_containment {
        let detail = containment.details.describe();
        match containment.violation {
            ContainmentKind::Outside => messages.push(format!(
                "CONSTRAINT: '{}' overflows '{}' {}",
                containment.child, containment.parent, detail
            )),
            ContainmentKind::TooCloseToEdge => messages.push(format!(
                "CONSTRAINT: '{}' violates the padding of '{}' {}",
                containment.child, containment.parent, detail
            )),
        }
    }

    for spacing in &metrics.spacing_violations {
        messages.push(format!(
            "WARNING: '{}' and '{}' are {:.0} units apart (minimum {:.0})",
            spacing.node_a, spacing.node_b, spacing.distance, spacing.required
        ));
    }
    if metrics.edge_crossings > 0 {
        messages.push(format!(
            "WARNING: {} edge crossing(s)",
            metrics.edge_crossings
        ));
    }
    if metrics.edges_over_nodes > 0 {
        messages.push(format!(
            "WARNING: {} edge(s) routed over unrelated nodes",
            metrics.edges_over_nodes
        ));
    }

    if metrics.clipped_node_labels > 0 {
        messages.push(format!(
            "INFO: {} node label(s) likely clipped",
            metrics.clipped_node_labels
        ));
    }
    if metrics.edge_label_overlaps > 0 {
        messages.push(format!(
            "INFO: {} edge label(s) overlap nodes",
            metrics.edge_label_overlaps
        ));
    }

    messages
}

/// Best-effort screenshot capture; failures are logged, never fatal.
async fn capture_screenshot<P: PageDriver>(
    page: &P,
    options: &AuditOptions,
) -> Option<PathBuf> {
    if let Err(err) = std::fs::create_dir_all(&options.screenshot_dir) {
        warn!(err:? = err, dir:? = options.screenshot_dir; "Could not create screenshot directory");
        return None;
    }
    let filename = format!(
        "layout-audit-{}.png",
        Utc::now().format("%Y%m%dT%H%M%S%3f")
    );
    let path = options.screenshot_dir.join(filename);
    match page.screenshot(&path).await {
        Ok(()) => {
            debug!(path:? = path; "Screenshot captured");
            Some(path)
        }
        Err(err) => {
            warn!(err:? = err; "Screenshot capture failed");
            None
        }
    }
}
