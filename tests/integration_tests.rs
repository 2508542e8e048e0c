//! End-to-end exercise of the full pipeline: chunk -> extract -> validate ->
//! graph -> checkpoint -> reason, without touching any real LLM backend or
//! real PDF file.

use mkg_core::{entity_ok, relation_ok, CheckpointManager, GraphStore};
use mkg_extract::{synthesize_inverse, Extractor, MockBackend};
use mkg_ingest::{PdfDocument, PdfMetadata, PdfPage, PdfParser};

fn sample_document() -> PdfDocument {
    PdfDocument {
        metadata: PdfMetadata::default(),
        pages: vec![PdfPage {
            number: 1,
            text: "Đái tháo đường týp 2 không kiểm soát tốt có thể dẫn đến bệnh thận mạn. \
                   Metformin là thuốc điều trị đầu tay cho đái tháo đường."
                .to_string(),
        }],
        text: String::new(),
    }
}

const MODEL_RESPONSE: &str = r#"{
  "entities": [
    {"name": "Đái tháo đường týp 2", "type": "DISEASE", "description": "Bệnh chuyển hóa mạn tính", "relevance_score": 9},
    {"name": "Bệnh thận mạn", "type": "DISEASE", "description": "Biến chứng thận", "relevance_score": 7},
    {"name": "Metformin", "type": "DRUG", "description": "Thuốc điều trị đầu tay", "relevance_score": 8}
  ],
  "relations": [
    {"source_name": "Đái tháo đường týp 2", "target_name": "Bệnh thận mạn", "relation": "CAUSES", "confidence_score": 8, "evidence": "có thể dẫn đến bệnh thận mạn"},
    {"source_name": "Metformin", "target_name": "Đái tháo đường týp 2", "relation": "TREATS", "confidence_score": 8, "evidence": "là thuốc điều trị đầu tay"}
  ]
}"#;

#[tokio::test]
async fn full_pipeline_ingest_extract_validate_graph_checkpoint_reason() {
    let parser = PdfParser::new().with_chunk_size(512).with_overlap(50);
    let chunks = parser.create_chunks(&sample_document());
    assert_eq!(chunks.len(), 1);

    let extractor = Extractor::new(MockBackend::new(vec![MODEL_RESPONSE.to_string()]));
    let extraction = extractor.extract(&chunks[0].text).await.unwrap();
    assert!(!extraction.is_empty());

    let mut graph = GraphStore::new();
    for entity in &extraction.entities {
        assert!(entity_ok(entity));
        graph.add_entity(entity, chunks[0].page_number as u32, chunks[0].id as u32);
    }
    for relation in &extraction.relations {
        assert!(relation_ok(relation));
        graph
            .add_relation(relation, chunks[0].page_number as u32, chunks[0].id as u32)
            .unwrap();
        if let Some(inverse) = synthesize_inverse(relation) {
            assert!(relation_ok(&inverse));
            graph
                .add_relation(&inverse, chunks[0].page_number as u32, chunks[0].id as u32)
                .unwrap();
        }
    }

    // Forward + synthesized inverse for both relations.
    assert_eq!(graph.num_edges(), 4);
    assert_eq!(graph.num_nodes(), 3);

    let dir = tempfile::tempdir().unwrap();
    let mgr = CheckpointManager::new(dir.path()).unwrap();
    let fingerprint = mkg_core::fingerprint("doc.pdf", 512, "llama3");
    mgr.save(&graph, 0, 1, &fingerprint).unwrap();

    let (loaded, last_chunk_id) = mgr.load().unwrap();
    let loaded = loaded.unwrap();
    assert_eq!(last_chunk_id, Some(0));
    assert_eq!(loaded.num_nodes(), 3);

    let key = mkg_core::normalize("Đái tháo đường týp 2");
    let context = mkg_reasoner::render_context(&loaded, &key, 2);
    assert!(context.contains("CAUSES"));
    assert!(context.contains("Reasoning Paths"));

    // Out-edges of this entity: the forward CAUSES relation, plus the
    // synthesized TREATED_BY inverse of the incoming TREATS relation.
    let neighbors = mkg_reasoner::neighbors(&loaded, &key, 0.5);
    assert_eq!(neighbors.len(), 2);
    assert_eq!(neighbors[0].relation, "CAUSES");
}

#[tokio::test]
async fn resume_from_checkpoint_skips_already_processed_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = CheckpointManager::new(dir.path()).unwrap();

    let mut graph = GraphStore::new();
    graph.add_entity(
        &mkg_core::ObservedEntity {
            name: "Đái tháo đường".to_string(),
            entity_type: mkg_core::EntityType::Disease,
            description: "d".to_string(),
            relevance_score: 8,
        },
        1,
        0,
    );
    let fingerprint = mkg_core::fingerprint("doc.pdf", 512, "llama3");
    mgr.save(&graph, 0, 5, &fingerprint).unwrap();

    let (loaded, last_chunk_id) = mgr.load().unwrap();
    assert_eq!(last_chunk_id, Some(0));
    let start_chunk = last_chunk_id.unwrap() + 1;
    assert_eq!(start_chunk, 1);
    assert_eq!(loaded.unwrap().num_nodes(), 1);
}
