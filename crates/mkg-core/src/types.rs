//! Data model: entities, relations, and the typed vocabularies they draw from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Disease,
    Drug,
    Symptom,
    Test,
    Anatomy,
    Treatment,
    Procedure,
    RiskFactor,
    LabValue,
    Unknown,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Disease => "DISEASE",
            EntityType::Drug => "DRUG",
            EntityType::Symptom => "SYMPTOM",
            EntityType::Test => "TEST",
            EntityType::Anatomy => "ANATOMY",
            EntityType::Treatment => "TREATMENT",
            EntityType::Procedure => "PROCEDURE",
            EntityType::RiskFactor => "RISK_FACTOR",
            EntityType::LabValue => "LAB_VALUE",
            EntityType::Unknown => "UNKNOWN",
        }
    }

    /// Parses a case-insensitive type name. Unknown strings map to `None`
    /// (the caller decides whether that is a validation failure).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DISEASE" => Some(EntityType::Disease),
            "DRUG" => Some(EntityType::Drug),
            "SYMPTOM" => Some(EntityType::Symptom),
            "TEST" => Some(EntityType::Test),
            "ANATOMY" => Some(EntityType::Anatomy),
            "TREATMENT" => Some(EntityType::Treatment),
            "PROCEDURE" => Some(EntityType::Procedure),
            "RISK_FACTOR" => Some(EntityType::RiskFactor),
            "LAB_VALUE" => Some(EntityType::LabValue),
            "UNKNOWN" => Some(EntityType::Unknown),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, EntityType::Unknown)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward relation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    Causes,
    Treats,
    Prevents,
    Diagnoses,
    SymptomOf,
    ComplicationOf,
    SideEffectOf,
    IncreasesRisk,
    InteractsWith,
    Worsens,
    Indicates,
    RelatedTo,
    CausedBy,
    TreatedBy,
    PreventedBy,
    DiagnosedBy,
    HasSymptom,
    HasComplication,
    HasSideEffect,
    RiskIncreasedBy,
    WorsenedBy,
    IndicatedBy,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Causes => "CAUSES",
            RelationType::Treats => "TREATS",
            RelationType::Prevents => "PREVENTS",
            RelationType::Diagnoses => "DIAGNOSES",
            RelationType::SymptomOf => "SYMPTOM_OF",
            RelationType::ComplicationOf => "COMPLICATION_OF",
            RelationType::SideEffectOf => "SIDE_EFFECT_OF",
            RelationType::IncreasesRisk => "INCREASES_RISK",
            RelationType::InteractsWith => "INTERACTS_WITH",
            RelationType::Worsens => "WORSENS",
            RelationType::Indicates => "INDICATES",
            RelationType::RelatedTo => "RELATED_TO",
            RelationType::CausedBy => "CAUSED_BY",
            RelationType::TreatedBy => "TREATED_BY",
            RelationType::PreventedBy => "PREVENTED_BY",
            RelationType::DiagnosedBy => "DIAGNOSED_BY",
            RelationType::HasSymptom => "HAS_SYMPTOM",
            RelationType::HasComplication => "HAS_COMPLICATION",
            RelationType::HasSideEffect => "HAS_SIDE_EFFECT",
            RelationType::RiskIncreasedBy => "RISK_INCREASED_BY",
            RelationType::WorsenedBy => "WORSENED_BY",
            RelationType::IndicatedBy => "INDICATED_BY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CAUSES" => Some(RelationType::Causes),
            "TREATS" => Some(RelationType::Treats),
            "PREVENTS" => Some(RelationType::Prevents),
            "DIAGNOSES" => Some(RelationType::Diagnoses),
            "SYMPTOM_OF" => Some(RelationType::SymptomOf),
            "COMPLICATION_OF" => Some(RelationType::ComplicationOf),
            "SIDE_EFFECT_OF" => Some(RelationType::SideEffectOf),
            "INCREASES_RISK" => Some(RelationType::IncreasesRisk),
            "INTERACTS_WITH" => Some(RelationType::InteractsWith),
            "WORSENS" => Some(RelationType::Worsens),
            "INDICATES" => Some(RelationType::Indicates),
            "RELATED_TO" => Some(RelationType::RelatedTo),
            "CAUSED_BY" => Some(RelationType::CausedBy),
            "TREATED_BY" => Some(RelationType::TreatedBy),
            "PREVENTED_BY" => Some(RelationType::PreventedBy),
            "DIAGNOSED_BY" => Some(RelationType::DiagnosedBy),
            "HAS_SYMPTOM" => Some(RelationType::HasSymptom),
            "HAS_COMPLICATION" => Some(RelationType::HasComplication),
            "HAS_SIDE_EFFECT" => Some(RelationType::HasSideEffect),
            "RISK_INCREASED_BY" => Some(RelationType::RiskIncreasedBy),
            "WORSENED_BY" => Some(RelationType::WorsenedBy),
            "INDICATED_BY" => Some(RelationType::IndicatedBy),
            _ => None,
        }
    }

    /// The semantic inverse of a forward relation, or `None` if `self` is
    /// symmetric (INTERACTS_WITH, RELATED_TO) or is itself already an inverse.
    pub fn inverse(&self) -> Option<RelationType> {
        match self {
            RelationType::Causes => Some(RelationType::CausedBy),
            RelationType::Treats => Some(RelationType::TreatedBy),
            RelationType::Prevents => Some(RelationType::PreventedBy),
            RelationType::Diagnoses => Some(RelationType::DiagnosedBy),
            RelationType::SymptomOf => Some(RelationType::HasSymptom),
            RelationType::ComplicationOf => Some(RelationType::HasComplication),
            RelationType::SideEffectOf => Some(RelationType::HasSideEffect),
            RelationType::IncreasesRisk => Some(RelationType::RiskIncreasedBy),
            RelationType::Worsens => Some(RelationType::WorsenedBy),
            RelationType::Indicates => Some(RelationType::IndicatedBy),
            RelationType::InteractsWith | RelationType::RelatedTo => None,
            _ => None,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity as observed at a single extraction site, prior to graph insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedEntity {
    pub name: String,
    pub entity_type: EntityType,
    pub description: String,
    /// LLM-assigned salience, 1..10.
    pub relevance_score: u8,
}

/// A relation as observed at a single extraction site, prior to graph insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedRelation {
    pub source_name: String,
    pub target_name: String,
    pub relation: RelationType,
    /// LLM-assigned confidence, 1..10.
    pub confidence_score: u8,
    pub evidence: String,
}

/// A node in the graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub normalized_name: String,
    pub display_label: String,
    pub entity_type: EntityType,
    pub description: String,
    /// Monotonic: the max of all observed confidences, in [0, 1].
    pub confidence: f64,
    pub relevance_score: u8,
    pub pages: Vec<u32>,
    pub chunks: Vec<u32>,
}

impl Node {
    pub fn placeholder(display_label: &str, normalized_name: &str, page: u32, chunk: u32) -> Self {
        Node {
            normalized_name: normalized_name.to_string(),
            display_label: display_label.to_string(),
            entity_type: EntityType::Unknown,
            description: String::new(),
            confidence: 0.5,
            relevance_score: 0,
            pages: vec![page],
            chunks: vec![chunk],
        }
    }
}

/// An edge in the graph store. Multiple edges may exist between the same
/// ordered pair of nodes provided `relation` or `chunk` differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: RelationType,
    pub confidence: f64,
    pub evidence: String,
    pub page: u32,
    pub chunk: u32,
}
