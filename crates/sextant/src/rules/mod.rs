//! Layout configuration selection.
//!
//! A small rules engine that runs *before* layout: given the structural
//! context of a diagram (counts, density, hierarchy), it picks a
//! [`LayoutConfig`] to hand to the external layout algorithm. Rules are an
//! explicit ordered list of condition→action pairs where the
//! highest-priority matching rule wins. Callers can extend or shadow the
//! built-ins by id via [`merge_layout_rules`].
//!
//! After rule selection, the chosen config is augmented with deterministic
//! tie-breaking (label-sorted order hints, same-rank groups, rank pinning)
//! so repeated layout runs on identical input produce identical node
//! ordering.

mod context;
mod defaults;

pub use context::{Complexity, LayoutContext};
pub use defaults::*;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use sextant_core::model::{DiagramEdge, DiagramLevel, DiagramNode, NodeKind};

/// Which layout engine the external algorithm should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutEngine {
    #[default]
    Layered,
    Force,
}

/// Primary flow direction of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Down,
    Right,
    Left,
    Up,
}

/// How edges should be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeRouting {
    #[default]
    Polyline,
    Orthogonal,
}

/// Spacing and routing hints for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Minimum spacing between sibling nodes, in units
    pub node_spacing: f32,
    /// Spacing between layers, in units
    pub rank_spacing: f32,
    pub edge_routing: EdgeRouting,
}

/// The configuration handed to the external layout algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub engine: LayoutEngine,
    pub direction: Direction,
    pub options: LayoutOptions,
    /// Deterministic left-to-right ordering hint per node id
    pub order_hint: IndexMap<String, usize>,
    /// Forced layer assignment per node id
    pub rank_of: IndexMap<String, i32>,
    /// Groups of node ids that must render on the same layer
    pub same_rank: Vec<Vec<String>>,
}

impl LayoutConfig {
    /// A layered top-down config with the given spacing and no structural
    /// constraints yet.
    pub fn with_spacing(node_spacing: f32, rank_spacing: f32) -> Self {
        Self {
            engine: LayoutEngine::Layered,
            direction: Direction::Down,
            options: LayoutOptions {
                node_spacing,
                rank_spacing,
                edge_routing: EdgeRouting::Polyline,
            },
            order_hint: IndexMap::new(),
            rank_of: IndexMap::new(),
            same_rank: Vec::new(),
        }
    }
}

/// One condition→action rule.
///
/// Rules are pure and stateless: the condition inspects the derived
/// [`LayoutContext`] and the action builds a config from it. Both run at
/// most once per selection call.
pub struct LayoutRule {
    id: String,
    name: String,
    priority: i32,
    condition: Box<dyn Fn(&LayoutContext) -> bool + Send + Sync>,
    action: Box<dyn Fn(&LayoutContext) -> LayoutConfig + Send + Sync>,
}

impl std::fmt::Debug for LayoutRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl LayoutRule {
    /// Creates a rule. Higher priorities are evaluated first; custom rules
    /// shadow built-ins that share their `id` when merged.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        priority: i32,
        condition: impl Fn(&LayoutContext) -> bool + Send + Sync + 'static,
        action: impl Fn(&LayoutContext) -> LayoutConfig + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority,
            condition: Box::new(condition),
            action: Box::new(action),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Evaluates the rule's condition against a context
    pub fn matches(&self, context: &LayoutContext) -> bool {
        (self.condition)(context)
    }

    /// Runs the rule's action, producing a base config
    pub fn apply(&self, context: &LayoutContext) -> LayoutConfig {
        (self.action)(context)
    }
}

/// Merges custom rules over a base set, deduplicating by id.
///
/// A custom rule sharing an id with a base rule replaces it, letting
/// callers shadow built-ins. The result is sorted by descending priority,
/// ready for first-match evaluation.
pub fn merge_layout_rules(base: Vec<LayoutRule>, custom: Vec<LayoutRule>) -> Vec<LayoutRule> {
    let mut merged: IndexMap<String, LayoutRule> = base
        .into_iter()
        .map(|rule| (rule.id.clone(), rule))
        .collect();
    for rule in custom {
        merged.insert(rule.id.clone(), rule);
    }
    let mut rules: Vec<LayoutRule> = merged.into_values().collect();
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
}

/// Selection parameters beyond the node/edge lists.
#[derive(Debug, Clone, Default)]
pub struct SelectionOptions {
    pub level: Option<DiagramLevel>,
    /// System whose contents the view is focused on, if any
    pub focused_system: Option<String>,
    /// Container whose contents the view is focused on, if any
    pub focused_container: Option<String>,
    /// Node ids currently expanded to show their internals
    pub expanded_nodes: Vec<String>,
}

/// Selects a layout configuration using the built-in rule set.
pub fn select_layout_config(
    nodes: &[DiagramNode],
    edges: &[DiagramEdge],
    options: &SelectionOptions,
) -> LayoutConfig {
    select_layout_config_with_rules(nodes, edges, options, &default_rules())
}

/// Selects a layout configuration using a caller-supplied rule set.
///
/// Rules are evaluated in descending priority order; the first match
/// supplies the base config, which is then augmented with deterministic
/// ordering constraints. Pass the output of [`merge_layout_rules`] to
/// combine custom rules with the defaults.
pub fn select_layout_config_with_rules(
    nodes: &[DiagramNode],
    edges: &[DiagramEdge],
    options: &SelectionOptions,
    rules: &[LayoutRule],
) -> LayoutConfig {
    let context = LayoutContext::derive(
        nodes,
        edges,
        options.level,
        options.focused_system.as_deref(),
        options.focused_container.as_deref(),
        &options.expanded_nodes,
    );

    let mut ordered: Vec<&LayoutRule> = rules.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut config = ordered
        .iter()
        .find(|rule| rule.matches(&context))
        .map(|rule| {
            debug!(rule_id = rule.id(), priority = rule.priority(); "Layout rule selected");
            rule.apply(&context)
        })
        .unwrap_or_else(|| {
            // Only reachable with a caller-supplied rule set that has no
            // catch-all
            debug!("No layout rule matched; using fallback spacing");
            LayoutConfig::with_spacing(SIMPLE_NODE_SPACING, SIMPLE_RANK_SPACING)
        });

    augment_config(&mut config, nodes, &context);
    config
}

/// Adds deterministic tie-breaking to a selected config.
///
/// The external layout algorithm breaks ordering ties nondeterministically
/// without these hints, producing different left-right orders across runs
/// on identical input.
fn augment_config(config: &mut LayoutConfig, nodes: &[DiagramNode], context: &LayoutContext) {
    let scope = scope_nodes(nodes, context);

    // Label-sorted order hints
    let mut ordered: Vec<&DiagramNode> = scope.clone();
    ordered.sort_by_key(|node| {
        node.label
            .as_deref()
            .unwrap_or(node.id.as_str())
            .to_lowercase()
    });
    for (index, node) in ordered.iter().enumerate() {
        config.order_hint.insert(node.id.clone(), index);
    }

    // Same-typed groups render on one layer
    let persons: Vec<String> = ordered
        .iter()
        .filter(|node| node.kind == NodeKind::Person)
        .map(|node| node.id.clone())
        .collect();
    if persons.len() >= 2 {
        config.same_rank.push(persons);
    }
    let storage: Vec<String> = ordered
        .iter()
        .filter(|node| node.kind.is_storage())
        .map(|node| node.id.clone())
        .collect();
    if storage.len() >= 2 {
        config.same_rank.push(storage);
    }

    // Runs of same-kind siblings under one parent
    let mut sibling_groups: IndexMap<(Option<&str>, NodeKind), Vec<String>> = IndexMap::new();
    for node in &ordered {
        sibling_groups
            .entry((node.parent_id.as_deref(), node.kind))
            .or_default()
            .push(node.id.clone());
    }
    for ((_, kind), group) in sibling_groups {
        if group.len() >= 3 && kind != NodeKind::Person && !kind.is_storage() {
            config.same_rank.push(group);
        }
    }

    // Pin actors to the top and storage to the bottom on context and
    // container views
    if matches!(
        context.level,
        Some(DiagramLevel::L1) | Some(DiagramLevel::L2)
    ) {
        for node in &ordered {
            if node.kind == NodeKind::Person {
                config.rank_of.insert(node.id.clone(), 0);
            } else if node.kind.is_storage() {
                config.rank_of.insert(node.id.clone(), 100);
            }
        }
    }
}

/// The nodes the ordering constraints apply to: the children of the
/// focused container or system when one is set, else the roots.
fn scope_nodes<'a>(nodes: &'a [DiagramNode], context: &LayoutContext) -> Vec<&'a DiagramNode> {
    let focus = context
        .focused_container
        .as_deref()
        .or(context.focused_system.as_deref());
    match focus {
        Some(focus) if nodes.iter().any(|node| node.id == focus) => nodes
            .iter()
            .filter(|node| node.parent_id.as_deref() == Some(focus))
            .collect(),
        _ => nodes
            .iter()
            .filter(|node| node.parent_id.is_none())
            .collect(),
    }
}
