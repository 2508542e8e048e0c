//! Inverse Synthesizer: derives the converse of a validated
//! forward relation so the graph carries both directions without the
//! extractor having to say everything twice.

use mkg_core::validate::CONFIDENCE_FLOOR;
use mkg_core::{ObservedRelation, RelationType};

/// Synthesizes the inverse of `r`, or `None` if `r.relation` is symmetric
/// (INTERACTS_WITH, RELATED_TO) and therefore has no distinct inverse.
pub fn synthesize_inverse(r: &ObservedRelation) -> Option<ObservedRelation> {
    let inverse_type = r.relation.inverse()?;
    let confidence = r.confidence_score.saturating_sub(1).max(CONFIDENCE_FLOOR);
    Some(ObservedRelation {
        source_name: r.target_name.clone(),
        target_name: r.source_name.clone(),
        relation: inverse_type,
        confidence_score: confidence,
        evidence: format!("Inverse of: {}", r.evidence),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(rel: RelationType, confidence: u8) -> ObservedRelation {
        ObservedRelation {
            source_name: "A".to_string(),
            target_name: "B".to_string(),
            relation: rel,
            confidence_score: confidence,
            evidence: "seen in chunk".to_string(),
        }
    }

    #[test]
    fn swaps_endpoints_and_damps_confidence() {
        let inv = synthesize_inverse(&relation(RelationType::Causes, 9)).unwrap();
        assert_eq!(inv.source_name, "B");
        assert_eq!(inv.target_name, "A");
        assert_eq!(inv.relation, RelationType::CausedBy);
        assert_eq!(inv.confidence_score, 8);
        assert!(inv.evidence.starts_with("Inverse of:"));
    }

    #[test]
    fn damping_never_drops_below_floor() {
        let inv = synthesize_inverse(&relation(RelationType::Causes, 6)).unwrap();
        assert_eq!(inv.confidence_score, CONFIDENCE_FLOOR);
    }

    #[test]
    fn symmetric_relations_have_no_inverse() {
        assert!(synthesize_inverse(&relation(RelationType::InteractsWith, 9)).is_none());
        assert!(synthesize_inverse(&relation(RelationType::RelatedTo, 9)).is_none());
    }
}
