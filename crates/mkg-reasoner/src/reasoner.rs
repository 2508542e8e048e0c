//! Confidence-weighted multi-hop reasoning over a `GraphStore`.

use mkg_core::GraphStore;
use std::collections::HashSet;

/// Two-hop relatedness is damped relative to one-hop by this factor.
pub const TWO_HOP_DECAY: f64 = 0.5;

/// Minimum per-edge confidence a 2-hop path must clear on both legs to be
/// considered at all, independent of the caller's `mu` threshold.
const TWO_HOP_EDGE_FLOOR: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub node: String,
    pub relation: String,
    pub confidence: f64,
    pub evidence: String,
}

/// One hop of a multi-hop path: the relation taken and the node arrived at.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub from: String,
    pub relation: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub steps: Vec<PathStep>,
    pub confidence: f64,
}

impl Path {
    pub fn final_node(&self) -> Option<&str> {
        self.steps.last().map(|s| s.to.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Related {
    pub node: String,
    pub score: f64,
}

/// Outgoing parallel edges from `n` whose confidence is at least `tau`, in
/// the multigraph's insertion order.
pub fn neighbors(graph: &GraphStore, n: &str, tau: f64) -> Vec<Neighbor> {
    graph
        .out_edges(n)
        .into_iter()
        .filter(|e| e.confidence >= tau)
        .map(|e| Neighbor {
            node: e.target.clone(),
            relation: e.relation.as_str().to_string(),
            confidence: e.confidence,
            evidence: e.evidence.clone(),
        })
        .collect()
}

/// Bounded-depth DFS from `start`, emitting every path of length ≥ 1 whose
/// multiplicatively-decayed confidence stays ≥ `tau` at every step. The
/// visited set is path-scoped (added on descent, removed on ascent), so a
/// node can appear in more than one emitted path but never twice within one.
pub fn explore_paths(graph: &GraphStore, start: &str, depth: u32, tau: f64) -> Vec<Path> {
    let mut paths = Vec::new();
    let mut visited = HashSet::new();
    let mut steps = Vec::new();
    dfs(graph, start, depth, tau, 1.0, &mut steps, &mut visited, &mut paths);
    tracing::debug!(start, depth, paths = paths.len(), "explored paths");
    paths
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    graph: &GraphStore,
    node: &str,
    remaining_depth: u32,
    tau: f64,
    accumulated: f64,
    steps: &mut Vec<PathStep>,
    visited: &mut HashSet<String>,
    out: &mut Vec<Path>,
) {
    visited.insert(node.to_string());

    if !steps.is_empty() {
        out.push(Path {
            steps: steps.clone(),
            confidence: accumulated,
        });
    }

    if remaining_depth > 0 {
        for n in neighbors(graph, node, tau) {
            if visited.contains(&n.node) {
                continue;
            }
            let next_confidence = accumulated * n.confidence;
            if next_confidence < tau {
                continue;
            }
            steps.push(PathStep {
                from: node.to_string(),
                relation: n.relation.clone(),
                to: n.node.clone(),
            });
            dfs(graph, &n.node, remaining_depth - 1, tau, next_confidence, steps, visited, out);
            steps.pop();
        }
    }

    visited.remove(node);
}

/// Top-`k` entities related to `e` by 1-hop and 2-hop confidence-weighted
/// score. Ties broken by insertion order of the score table.
pub fn related(graph: &GraphStore, e: &str, k: usize, mu: f64) -> Vec<Related> {
    let mut order = Vec::new();
    let mut scores: std::collections::HashMap<String, f64> = std::collections::HashMap::new();
    let mut one_hop: HashSet<String> = HashSet::new();

    for n in neighbors(graph, e, mu) {
        one_hop.insert(n.node.clone());
        let entry = scores.entry(n.node.clone()).or_insert_with(|| {
            order.push(n.node.clone());
            0.0
        });
        *entry += n.confidence;
    }

    for n1 in graph.out_edges(e) {
        if n1.confidence < TWO_HOP_EDGE_FLOOR {
            continue;
        }
        for n2 in graph.out_edges(&n1.target) {
            if n2.confidence < TWO_HOP_EDGE_FLOOR {
                continue;
            }
            let y = &n2.target;
            if y == e || one_hop.contains(y) {
                continue;
            }
            let score = n1.confidence * n2.confidence * TWO_HOP_DECAY;
            if score < mu {
                continue;
            }
            let entry = scores.entry(y.clone()).or_insert_with(|| {
                order.push(y.clone());
                0.0
            });
            *entry += score;
        }
    }

    let mut ranked: Vec<Related> = order
        .into_iter()
        .map(|node| {
            let score = scores[&node];
            Related { node, score }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);
    ranked
}
