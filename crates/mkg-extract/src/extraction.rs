//! LLM Extractor: turns a chunk of clinical text into a
//! structured `Extraction` by prompting an `LlmBackend` and parsing its
//! JSON response.

use crate::backend::{extract_json_object, LlmBackend};
use crate::error::ExtractError;
use mkg_core::{EntityType, ObservedEntity, ObservedRelation, RelationType};
use serde::{Deserialize, Serialize};

/// Entities and relations observed in one chunk, prior to validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(default)]
    pub entities: Vec<ObservedEntity>,
    #[serde(default)]
    pub relations: Vec<ObservedRelation>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }
}

/// Wire shapes the model is asked to emit. Kept distinct from
/// `ObservedEntity`/`ObservedRelation` so a model naming its type/relation
/// loosely doesn't fail deserialization outright; we resolve through
/// `EntityType::parse`/`RelationType::parse` and drop anything that doesn't
/// map, rather than erroring the whole chunk.
#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    entities: Vec<RawEntity>,
    #[serde(default)]
    relations: Vec<RawRelation>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    name: String,
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default)]
    description: String,
    relevance_score: u8,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    source_name: String,
    target_name: String,
    relation: String,
    confidence_score: u8,
    #[serde(default)]
    evidence: String,
}

const SYSTEM_PROMPT: &str = r#"Bạn là chuyên gia trích xuất Knowledge Graph y tế từ văn bản lâm sàng tiếng Việt.

Trích xuất các thực thể (entities) và quan hệ (relations) từ đoạn văn bản được cung cấp, trả về đúng một đối tượng JSON với hai trường "entities" và "relations".

Loại thực thể (entity types):
- DISEASE (vd: Đái tháo đường, Bệnh thận mạn)
- DRUG (vd: Metformin, Insulin)
- SYMPTOM (vd: Khát nước, Mệt mỏi)
- TEST (vd: eGFR, HbA1c)
- ANATOMY (vd: Thận, Tụy)
- TREATMENT (vd: Lọc máu, Chế độ ăn kiêng)
- PROCEDURE (vd: Sinh thiết thận)
- RISK_FACTOR (vd: Béo phì, Hút thuốc lá)
- LAB_VALUE (vd: Creatinine huyết thanh tăng)

Loại quan hệ (relation types), theo tầng ngữ nghĩa:
- Core: CAUSES, TREATS, PREVENTS, DIAGNOSES
- Clinical: SYMPTOM_OF, COMPLICATION_OF, SIDE_EFFECT_OF
- Risk: INCREASES_RISK
- Pharmacological: INTERACTS_WITH
- Severity: WORSENS
- Structural: INDICATES
- Catch-all (dùng khi không loại nào khác phù hợp): RELATED_TO

Ưu tiên loại quan hệ cụ thể nhất; chỉ dùng RELATED_TO khi thực sự không có loại nào khác áp dụng được.

Thang điểm relevance_score (độ nổi bật của thực thể, 1-10) và confidence_score (độ tin cậy của quan hệ, 1-10): 1-3 không chắc chắn/gợi ý gián tiếp, 4-6 được đề cập rõ ràng nhưng không phải trọng tâm, 7-8 trọng tâm của đoạn văn, 9-10 khẳng định trực tiếp, lặp lại hoặc nhấn mạnh.

Không trích xuất nội dung hành chính: số quyết định, tên văn bản pháp luật, số trang, số điều/khoản/mục, tên phụ lục. Ví dụ nội dung KHÔNG trích xuất: "Quyết định 123/QĐ-BYT", "Điều 5", "Phụ lục 2".

Ví dụ 1:
Văn bản: "Đái tháo đường týp 2 không kiểm soát tốt có thể dẫn đến bệnh thận mạn. Metformin là thuốc điều trị đầu tay."
JSON: {"entities":[{"name":"Đái tháo đường týp 2","type":"DISEASE","description":"Bệnh chuyển hóa mạn tính","relevance_score":9},{"name":"Bệnh thận mạn","type":"DISEASE","description":"Biến chứng thận","relevance_score":7},{"name":"Metformin","type":"DRUG","description":"Thuốc điều trị đầu tay","relevance_score":8}],"relations":[{"source_name":"Đái tháo đường týp 2","target_name":"Bệnh thận mạn","relation":"CAUSES","confidence_score":8,"evidence":"không kiểm soát tốt có thể dẫn đến bệnh thận mạn"},{"source_name":"Metformin","target_name":"Đái tháo đường týp 2","relation":"TREATS","confidence_score":8,"evidence":"là thuốc điều trị đầu tay"}]}

Ví dụ 2:
Văn bản: "Khát nước nhiều và tiểu nhiều là triệu chứng thường gặp của đái tháo đường."
JSON: {"entities":[{"name":"Khát nước nhiều","type":"SYMPTOM","description":"Triệu chứng","relevance_score":7},{"name":"Tiểu nhiều","type":"SYMPTOM","description":"Triệu chứng","relevance_score":7},{"name":"Đái tháo đường","type":"DISEASE","description":"Bệnh nền","relevance_score":8}],"relations":[{"source_name":"Khát nước nhiều","target_name":"Đái tháo đường","relation":"SYMPTOM_OF","confidence_score":7,"evidence":"là triệu chứng thường gặp của đái tháo đường"},{"source_name":"Tiểu nhiều","target_name":"Đái tháo đường","relation":"SYMPTOM_OF","confidence_score":7,"evidence":"là triệu chứng thường gặp của đái tháo đường"}]}

Ví dụ 3 (không có nội dung y tế để trích xuất):
Văn bản: "Quyết định 4858/QĐ-BYT ngày 10 tháng 11 năm 2020, Điều 3, Phụ lục 2."
JSON: {"entities":[],"relations":[]}

Chỉ trả về JSON, không thêm giải thích."#;

pub struct Extractor<B: LlmBackend> {
    backend: B,
}

impl<B: LlmBackend> Extractor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Extracts entities/relations from `chunk_text`. Parse
    /// failures and backend errors both degrade to an empty extraction
    /// rather than propagating; the one exception is
    /// `ExtractError::RateLimited`, which the driver must see so it can
    /// rotate keys and retry.
    pub async fn extract(&self, chunk_text: &str) -> Result<Extraction, ExtractError> {
        let raw = match self.backend.complete(SYSTEM_PROMPT, chunk_text).await {
            Ok(text) => text,
            Err(e) => {
                if is_rate_limit(&e) {
                    return Err(ExtractError::RateLimited);
                }
                tracing::warn!(error = %e, "extractor backend call failed; treating as empty extraction");
                return Ok(Extraction::default());
            }
        };

        match parse_extraction(&raw) {
            Ok(extraction) => Ok(extraction),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse LLM output; treating as empty extraction");
                Ok(Extraction::default())
            }
        }
    }
}

fn is_rate_limit(e: &crate::backend::BackendError) -> bool {
    let msg = e.to_string().to_lowercase();
    msg.contains("429") || msg.contains("rate limit") || msg.contains("too many requests")
}

fn parse_extraction(text: &str) -> Result<Extraction, ExtractError> {
    let candidate = extract_json_object(text).unwrap_or(text);
    let raw: RawExtraction = serde_json::from_str(candidate)?;

    let entities = raw
        .entities
        .into_iter()
        .filter_map(|e| {
            let entity_type = EntityType::parse(&e.entity_type)?;
            Some(ObservedEntity {
                name: e.name,
                entity_type,
                description: e.description,
                relevance_score: e.relevance_score,
            })
        })
        .collect();

    let relations = raw
        .relations
        .into_iter()
        .filter_map(|r| {
            let relation = RelationType::parse(&r.relation)?;
            Some(ObservedRelation {
                source_name: r.source_name,
                target_name: r.target_name,
                relation,
                confidence_score: r.confidence_score,
                evidence: r.evidence,
            })
        })
        .collect();

    Ok(Extraction { entities, relations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    #[tokio::test]
    async fn extracts_entities_and_relations_from_well_formed_json() {
        let response = r#"{"entities":[{"name":"Đái tháo đường","type":"DISEASE","description":"d","relevance_score":8}],"relations":[{"source_name":"A","target_name":"B","relation":"CAUSES","confidence_score":7,"evidence":"e"}]}"#;
        let extractor = Extractor::new(MockBackend::new(vec![response.to_string()]));
        let extraction = extractor.extract("some text").await.unwrap();
        assert_eq!(extraction.entities.len(), 1);
        assert_eq!(extraction.relations.len(), 1);
    }

    #[tokio::test]
    async fn malformed_json_degrades_to_empty_extraction() {
        let extractor = Extractor::new(MockBackend::new(vec!["not json at all".to_string()]));
        let extraction = extractor.extract("some text").await.unwrap();
        assert!(extraction.is_empty());
    }

    #[tokio::test]
    async fn unparseable_type_is_dropped_not_fatal() {
        let response = r#"{"entities":[{"name":"X","type":"NOT_A_TYPE","description":"","relevance_score":5}],"relations":[]}"#;
        let extractor = Extractor::new(MockBackend::new(vec![response.to_string()]));
        let extraction = extractor.extract("text").await.unwrap();
        assert!(extraction.entities.is_empty());
    }

    #[tokio::test]
    async fn prose_wrapped_json_is_still_parsed() {
        let response = "Here is the JSON:\n{\"entities\":[],\"relations\":[]}\nDone.";
        let extractor = Extractor::new(MockBackend::new(vec![response.to_string()]));
        let extraction = extractor.extract("text").await.unwrap();
        assert!(extraction.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_empty_extraction() {
        let extractor = Extractor::new(MockBackend::new(vec![]));
        let extraction = extractor.extract("text").await.unwrap();
        assert!(extraction.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn parse_extraction_never_panics_on_arbitrary_text(text in "\\PC*") {
            let _ = parse_extraction(&text);
        }
    }
}
