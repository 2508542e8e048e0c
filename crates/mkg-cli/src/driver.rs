//! Extraction Driver: the top-level sequential chunk loop that
//! ties ingestion, extraction, validation, inverse synthesis, the graph
//! store, and checkpointing together.

use anyhow::Result;
use mkg_core::{entity_ok, relation_ok, CheckpointManager, GraphStore};
use mkg_extract::{
    synthesize_inverse, ApiKeyPool, BackendError, ExtractError, Extraction, Extractor, LlmBackend,
    PipelineConfig,
};
use mkg_ingest::TextChunk;
use std::path::Path;

/// Runs extraction over `chunks` from wherever the checkpoint in
/// `checkpoint_dir` left off, persisting progress every `config.checkpoint_every`
/// chunks and unconditionally once more at the end.
///
/// `make_extractor` rebuilds the backend bound to a given API key; the
/// driver calls it again whenever the pool rotates, mirroring the
/// reference system's "re-materialize the client on key change" contract.
/// Its own failure (e.g. the HTTP client can't be built) is just another
/// backend error: logged and treated as an empty extraction for that chunk,
/// never propagated out of the loop.
pub async fn run_extraction<B, F>(
    chunks: &[TextChunk],
    mut make_extractor: F,
    pool: &mut ApiKeyPool,
    checkpoint_dir: &Path,
    document_path: &str,
    llm_model_name: &str,
    config: &PipelineConfig,
) -> Result<GraphStore>
where
    B: LlmBackend,
    F: FnMut(&str) -> Result<Extractor<B>, BackendError>,
{
    let mgr = CheckpointManager::new(checkpoint_dir)?;
    let fingerprint = mkg_core::fingerprint(document_path, config.chunk_size, llm_model_name);
    mgr.check_fingerprint(&fingerprint)?;

    let (loaded_graph, last_chunk_id) = mgr.load()?;
    let mut graph = loaded_graph.unwrap_or_default();
    let start = last_chunk_id.map(|c| c + 1).unwrap_or(0) as usize;
    let mut last_processed = last_chunk_id.unwrap_or(-1);
    let total = chunks.len() as i64;

    for (i, chunk) in chunks.iter().enumerate().skip(start) {
        let i = i as i64;
        let extraction = extract_with_retries(&mut make_extractor, pool, chunk, config).await;

        // Must check BOTH entities and relations empty, not either: a
        // chunk that yields only entities (or only relations) is still
        // progress and must advance last_processed.
        if extraction.is_empty() {
            tracing::info!(chunk_id = i, "no extraction for chunk");
            continue;
        }

        for entity in &extraction.entities {
            if entity_ok(entity) {
                graph.add_entity(entity, chunk.page_number as u32, i as u32);
            }
        }
        for relation in &extraction.relations {
            if !relation_ok(relation) {
                continue;
            }
            let _ = graph.add_relation(relation, chunk.page_number as u32, i as u32);
            if let Some(inverse) = synthesize_inverse(relation) {
                if relation_ok(&inverse) {
                    let _ = graph.add_relation(&inverse, chunk.page_number as u32, i as u32);
                }
            }
        }

        last_processed = i;

        if (i + 1) % config.checkpoint_every as i64 == 0 {
            mgr.save(&graph, last_processed, total, &fingerprint)?;
        }
    }

    // Unconditional final checkpoint with the TRUE last processed chunk id:
    // never `total` when the tail was all-empty, never `start - 1` when
    // nothing in this run was processed.
    mgr.save(&graph, last_processed, total, &fingerprint)?;
    Ok(graph)
}

async fn extract_with_retries<B, F>(
    make_extractor: &mut F,
    pool: &mut ApiKeyPool,
    chunk: &TextChunk,
    config: &PipelineConfig,
) -> Extraction
where
    B: LlmBackend,
    F: FnMut(&str) -> Result<Extractor<B>, BackendError>,
{
    let mut extractor = match make_extractor(pool.current_key()) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(chunk_id = chunk.id, error = %e, "failed to build extractor backend; treating chunk as empty");
            return Extraction::default();
        }
    };
    let mut attempts = 0u32;
    loop {
        match extractor.extract(&chunk.text).await {
            Ok(extraction) => return extraction,
            Err(ExtractError::RateLimited) => {
                attempts += 1;
                if attempts > config.max_retries {
                    tracing::warn!(chunk_id = chunk.id, "max retries exceeded; treating chunk as empty");
                    return Extraction::default();
                }
                if !pool.rotate() {
                    tracing::warn!("all API keys exhausted; cooling down");
                    tokio::time::sleep(pool.cooldown()).await;
                    pool.reset_failed();
                }
                extractor = match make_extractor(pool.current_key()) {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(chunk_id = chunk.id, error = %e, "failed to rebuild extractor backend after rotation; treating chunk as empty");
                        return Extraction::default();
                    }
                };
            }
            Err(e) => {
                tracing::warn!(chunk_id = chunk.id, error = %e, "extraction error; treating as empty");
                return Extraction::default();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkg_extract::MockBackend;

    fn chunk(id: usize, text: &str) -> TextChunk {
        TextChunk {
            id,
            text: text.to_string(),
            page_number: 1,
        }
    }

    #[tokio::test]
    async fn skip_on_empty_does_not_advance_last_processed() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = vec![
            chunk(0, "administrative text only"),
            chunk(1, "Đái tháo đường gây ra bệnh thận mạn."),
        ];
        let responses_first = vec!["{\"entities\":[],\"relations\":[]}".to_string()];
        let responses_second = vec![r#"{"entities":[{"name":"Đái tháo đường","type":"DISEASE","description":"d","relevance_score":9},{"name":"Bệnh thận mạn","type":"DISEASE","description":"d","relevance_score":8}],"relations":[{"source_name":"Đái tháo đường","target_name":"Bệnh thận mạn","relation":"CAUSES","confidence_score":8,"evidence":"gây ra"}]}"#.to_string()];

        let mut pool = ApiKeyPool::new(vec!["k1".to_string()], 60).unwrap();
        let call_idx = std::cell::RefCell::new(0usize);
        let responses = vec![responses_first, responses_second];
        let make_extractor = |_key: &str| {
            let mut idx = call_idx.borrow_mut();
            let backend = MockBackend::new(responses[*idx].clone());
            *idx += 1;
            Ok(Extractor::new(backend))
        };

        let config = PipelineConfig::default();
        let graph = run_extraction(
            &chunks,
            make_extractor,
            &mut pool,
            dir.path(),
            "doc.pdf",
            "llama3",
            &config,
        )
        .await
        .unwrap();

        assert_eq!(graph.num_nodes(), 2);

        let mgr = CheckpointManager::new(dir.path()).unwrap();
        let (_, last_chunk_id) = mgr.load().unwrap();
        // Chunk 0 produced nothing; last_processed must be 1, not 0 or 2.
        assert_eq!(last_chunk_id, Some(1));
    }
}
