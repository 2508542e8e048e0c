//! Validator: rejects malformed entities/relations before they
//! reach the graph store.

use crate::normalize::normalize;
use crate::types::{ObservedEntity, ObservedRelation};
use regex::Regex;
use std::sync::OnceLock;

/// Relation confidence below this (on the 1..10 LLM scale) is rejected.
pub const CONFIDENCE_FLOOR: u8 = 6;

fn admin_noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)quyết định|văn bản|bộ y tế|trang\s*\d+|điều\s*\d+|khoản\s*\d+|mục\s*\d+|phụ lục",
        )
        .unwrap()
    })
}

/// Rejects an entity too short to be meaningful or that reads as
/// administrative boilerplate rather than clinical content.
pub fn entity_ok(e: &ObservedEntity) -> bool {
    if e.name.trim().chars().count() < 2 {
        return false;
    }
    if admin_noise_re().is_match(&e.name) {
        return false;
    }
    // EntityType::parse already rejects anything outside the typed
    // vocabulary at deserialization time, so reaching here with a value of
    // this type is sufficient to satisfy the "type in vocabulary" clause.
    true
}

/// Rejects a relation below the confidence floor or whose endpoints are too
/// short to be meaningful. The relation-type whitelist clause is enforced
/// structurally: `RelationType` only has variants for the forward and
/// inverse types it supports, so any value of this type is already in the
/// whitelist.
pub fn relation_ok(r: &ObservedRelation) -> bool {
    if r.confidence_score < CONFIDENCE_FLOOR {
        return false;
    }
    if r.source_name.trim().chars().count() < 2 || r.target_name.trim().chars().count() < 2 {
        return false;
    }
    if normalize(&r.source_name) == normalize(&r.target_name) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityType, RelationType};

    fn entity(name: &str) -> ObservedEntity {
        ObservedEntity {
            name: name.to_string(),
            entity_type: EntityType::Disease,
            description: String::new(),
            relevance_score: 8,
        }
    }

    fn relation(source: &str, target: &str, confidence: u8) -> ObservedRelation {
        ObservedRelation {
            source_name: source.to_string(),
            target_name: target.to_string(),
            relation: RelationType::Causes,
            confidence_score: confidence,
            evidence: "evidence".to_string(),
        }
    }

    #[test]
    fn rejects_short_names() {
        assert!(!entity_ok(&entity("A")));
    }

    #[test]
    fn rejects_administrative_noise() {
        assert!(!entity_ok(&entity("Quyết định 123/QĐ-BYT")));
        assert!(!entity_ok(&entity("Phụ lục 2")));
    }

    #[test]
    fn accepts_plausible_entity() {
        assert!(entity_ok(&entity("Đái tháo đường")));
    }

    #[test]
    fn rejects_low_confidence_relation() {
        assert!(!relation_ok(&relation("A", "B", 5)));
    }

    #[test]
    fn rejects_self_loop_after_normalization() {
        assert!(!relation_ok(&relation("Tiểu đường", "Đái tháo đường", 8)));
    }

    #[test]
    fn accepts_plausible_relation() {
        assert!(relation_ok(&relation("A", "B", 8)));
    }
}
