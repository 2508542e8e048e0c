//! Graph Store: a directed multigraph with typed nodes and
//! parallel typed edges, owning all node/edge state exclusively.

use crate::error::GraphError;
use crate::normalize::normalize;
use crate::types::{Edge, Node, ObservedEntity, ObservedRelation, RelationType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStore {
    nodes: HashMap<String, Node>,
    edges: Vec<Edge>,
    out_adj: HashMap<String, Vec<usize>>,
    in_adj: HashMap<String, Vec<usize>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn get_node(&self, normalized_name: &str) -> Option<&Node> {
        self.nodes.get(normalized_name)
    }

    pub fn has_node(&self, normalized_name: &str) -> bool {
        self.nodes.contains_key(normalized_name)
    }

    /// Inserts `e`, or merges into the existing node at the same normalized
    /// name: entity type and description only ever upgrade from UNKNOWN to
    /// known, confidence only ever rises, and pages/chunks accumulate.
    pub fn add_entity(&mut self, e: &ObservedEntity, page: u32, chunk: u32) -> &str {
        let norm = normalize(&e.name);
        let confidence = (e.relevance_score as f64 / 10.0).min(1.0);

        if let Some(node) = self.nodes.get_mut(&norm) {
            if node.entity_type.is_unknown() && !e.entity_type.is_unknown() {
                node.entity_type = e.entity_type;
                node.display_label = e.name.clone();
                node.description = e.description.clone();
            }
            if confidence > node.confidence {
                node.confidence = confidence;
                if !node.entity_type.is_unknown() {
                    node.description = e.description.clone();
                }
            }
            if !node.pages.contains(&page) {
                node.pages.push(page);
            }
            if !node.chunks.contains(&chunk) {
                node.chunks.push(chunk);
            }
        } else {
            self.nodes.insert(
                norm.clone(),
                Node {
                    normalized_name: norm.clone(),
                    display_label: e.name.clone(),
                    entity_type: e.entity_type,
                    description: e.description.clone(),
                    confidence,
                    relevance_score: e.relevance_score,
                    pages: vec![page],
                    chunks: vec![chunk],
                },
            );
        }

        // SAFETY for callers: the key we just inserted/updated is always `norm`.
        self.nodes.get_key_value(&norm).map(|(k, _)| k.as_str()).unwrap()
    }

    fn ensure_node(&mut self, display_label: &str, normalized_name: &str, page: u32, chunk: u32) {
        self.nodes
            .entry(normalized_name.to_string())
            .or_insert_with(|| Node::placeholder(display_label, normalized_name, page, chunk));
    }

    /// Scans all parallel edges between `(src, tgt)` for one matching both
    /// `rel_type` and `chunk`.
    pub fn edge_exists(&self, src: &str, tgt: &str, rel_type: RelationType, chunk: u32) -> bool {
        self.out_adj
            .get(src)
            .into_iter()
            .flatten()
            .any(|&idx| {
                let edge = &self.edges[idx];
                edge.target == tgt && edge.relation == rel_type && edge.chunk == chunk
            })
    }

    /// Normalizes endpoints, fabricates UNKNOWN placeholders for missing
    /// endpoints, and suppresses duplicate edges sharing the same
    /// `(source, target, relation, chunk)`. Returns an error (without
    /// mutating) if the endpoints coincide after normalization, regardless
    /// of whether the caller already ran the validator.
    pub fn add_relation(
        &mut self,
        r: &ObservedRelation,
        page: u32,
        chunk: u32,
    ) -> Result<(), GraphError> {
        let src = normalize(&r.source_name);
        let tgt = normalize(&r.target_name);
        if src == tgt {
            return Err(GraphError::SelfLoop(src));
        }

        self.ensure_node(&r.source_name, &src, page, chunk);
        self.ensure_node(&r.target_name, &tgt, page, chunk);

        if self.edge_exists(&src, &tgt, r.relation, chunk) {
            return Ok(());
        }

        let edge = Edge {
            source: src.clone(),
            target: tgt.clone(),
            relation: r.relation,
            confidence: (r.confidence_score as f64 / 10.0).min(1.0),
            evidence: r.evidence.clone(),
            page,
            chunk,
        };

        let idx = self.edges.len();
        self.edges.push(edge);
        self.out_adj.entry(src).or_default().push(idx);
        self.in_adj.entry(tgt).or_default().push(idx);
        Ok(())
    }

    /// Parallel outgoing edges in insertion order.
    pub fn out_edges(&self, n: &str) -> Vec<&Edge> {
        self.out_adj
            .get(n)
            .into_iter()
            .flatten()
            .map(|&idx| &self.edges[idx])
            .collect()
    }

    /// Parallel incoming edges in insertion order.
    pub fn in_edges(&self, n: &str) -> Vec<&Edge> {
        self.in_adj
            .get(n)
            .into_iter()
            .flatten()
            .map(|&idx| &self.edges[idx])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityType;

    fn entity(name: &str, ty: EntityType, relevance: u8) -> ObservedEntity {
        ObservedEntity {
            name: name.to_string(),
            entity_type: ty,
            description: "desc".to_string(),
            relevance_score: relevance,
        }
    }

    fn relation(src: &str, tgt: &str, rel: RelationType, conf: u8) -> ObservedRelation {
        ObservedRelation {
            source_name: src.to_string(),
            target_name: tgt.to_string(),
            relation: rel,
            confidence_score: conf,
            evidence: "evidence".to_string(),
        }
    }

    #[test]
    fn add_entity_creates_node() {
        let mut g = GraphStore::new();
        g.add_entity(&entity("eGFR", EntityType::Test, 9), 1, 0);
        assert_eq!(g.num_nodes(), 1);
        let node = g.get_node(&normalize("eGFR")).unwrap();
        assert_eq!(node.entity_type, EntityType::Test);
        assert!((node.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn placeholder_upgrades_to_typed_and_keeps_edges() {
        let mut g = GraphStore::new();
        g.add_relation(&relation("Tiểu đường", "Bệnh thận mạn", RelationType::Causes, 8), 1, 0)
            .unwrap();
        let key = normalize("Tiểu đường");
        assert_eq!(g.get_node(&key).unwrap().entity_type, EntityType::Unknown);

        g.add_entity(&entity("Tiểu đường", EntityType::Disease, 9), 2, 1);
        let node = g.get_node(&key).unwrap();
        assert_eq!(node.entity_type, EntityType::Disease);
        assert!((node.confidence - 0.9).abs() < 1e-9);
        assert_eq!(g.out_edges(&key).len(), 1);
    }

    #[test]
    fn duplicate_edge_in_same_chunk_is_suppressed() {
        let mut g = GraphStore::new();
        g.add_relation(&relation("A", "B", RelationType::Causes, 8), 1, 0)
            .unwrap();
        g.add_relation(&relation("A", "B", RelationType::Causes, 8), 1, 0)
            .unwrap();
        assert_eq!(g.out_edges("A").len(), 1);
    }

    #[test]
    fn parallel_edges_across_relations_are_preserved() {
        let mut g = GraphStore::new();
        g.add_relation(&relation("A", "B", RelationType::Causes, 8), 0, 0)
            .unwrap();
        g.add_relation(&relation("A", "B", RelationType::Treats, 8), 0, 1)
            .unwrap();
        assert_eq!(g.out_edges("A").len(), 2);
    }

    #[test]
    fn self_loop_is_rejected() {
        let mut g = GraphStore::new();
        let err = g
            .add_relation(&relation("A", "A", RelationType::Causes, 8), 0, 0)
            .unwrap_err();
        assert!(matches!(err, GraphError::SelfLoop(_)));
        assert_eq!(g.num_nodes(), 0);
    }

    #[test]
    fn confidence_is_monotonic() {
        let mut g = GraphStore::new();
        g.add_entity(&entity("A", EntityType::Disease, 5), 0, 0);
        g.add_entity(&entity("A", EntityType::Disease, 3), 0, 1);
        assert!((g.get_node("A").unwrap().confidence - 0.5).abs() < 1e-9);
    }
}
