//! Recognition pipeline: normalize, cache, extract, enrich.
//!
//! One inbound text fragment flows through here per call. Every failure
//! mode inside the pipeline degrades to an empty fragment; callers always
//! get a valid shape back and never an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::core::cache::ExtractionCache;
use crate::core::enricher::ReferenceEnricher;
use crate::core::extractor::FieldExtractor;
use crate::core::jargon::JargonDictionary;
use crate::core::order::ExtractionFragment;

/// Trimmed texts shorter than this are noise: no cache write, no extractor
/// call, empty fragment back.
pub const MIN_TEXT_CHARS: usize = 2;

/// Running extractor-call counters, diagnostic only.
#[derive(Debug, Default)]
pub struct PipelineStats {
    total_calls: AtomicU64,
    total_time_ms: AtomicU64,
}

impl PipelineStats {
    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::Relaxed)
    }

    pub fn average_latency_ms(&self) -> f64 {
        let calls = self.total_calls.load(Ordering::Relaxed);
        if calls == 0 {
            return 0.0;
        }
        self.total_time_ms.load(Ordering::Relaxed) as f64 / calls as f64
    }

    fn record(&self, elapsed: Duration) -> (u64, f64) {
        let calls = self.total_calls.fetch_add(1, Ordering::Relaxed) + 1;
        let total =
            self.total_time_ms.fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed)
                + elapsed.as_millis() as u64;
        (calls, total as f64 / calls as f64)
    }
}

pub struct RecognitionPipeline {
    dictionary: Arc<JargonDictionary>,
    cache: Arc<ExtractionCache>,
    extractor: Arc<dyn FieldExtractor>,
    enricher: ReferenceEnricher,
    extraction_timeout: Option<Duration>,
    stats: PipelineStats,
}

impl RecognitionPipeline {
    pub fn new(
        dictionary: Arc<JargonDictionary>,
        cache: Arc<ExtractionCache>,
        extractor: Arc<dyn FieldExtractor>,
        enricher: ReferenceEnricher,
        extraction_timeout: Option<Duration>,
    ) -> Self {
        Self {
            dictionary,
            cache,
            extractor,
            enricher,
            extraction_timeout,
            stats: PipelineStats::default(),
        }
    }

    /// Run one recognition cycle and return the enriched fragment.
    ///
    /// Stateless with respect to sessions: the caller decides whether to
    /// merge the result into a draft.
    pub async fn process(&self, raw_text: &str) -> ExtractionFragment {
        let trimmed = raw_text.trim();
        if trimmed.chars().count() < MIN_TEXT_CHARS {
            debug!("text empty or too short, skipping: {:?}", trimmed);
            return ExtractionFragment::empty();
        }

        let normalized = self.dictionary.translate(trimmed);
        debug!("normalized recognition text: {}", normalized);

        if let Some(cached) = self.cache.get(&normalized) {
            return cached;
        }

        let start = Instant::now();
        let extracted = match self.invoke_extractor(&normalized).await {
            Some(fragment) => fragment,
            // Failures are not cached so the next identical message retries.
            None => return ExtractionFragment::empty(),
        };

        let (calls, avg_ms) = self.stats.record(start.elapsed());
        info!(
            "extractor call done in {}ms (calls: {}, avg: {:.2}ms): {}",
            start.elapsed().as_millis(),
            calls,
            avg_ms,
            normalized
        );

        let mut fragment = extracted;
        self.enricher.enrich(&mut fragment).await;

        self.cache.put(normalized, fragment.clone());
        fragment
    }

    async fn invoke_extractor(&self, text: &str) -> Option<ExtractionFragment> {
        let call = self.extractor.extract(text);
        let result = match self.extraction_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("extractor call timed out after {:?}: {}", limit, text);
                    return None;
                }
            },
            None => call.await,
        };

        match result {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                error!("extractor call failed: {e}");
                None
            }
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::core::cache::ExtractionCache;
    use crate::core::directory::InMemoryDirectory;
    use crate::core::extractor::ExtractError;
    use crate::core::jargon::{JargonDictionary, JargonEntry, JargonSource};
    use crate::core::order::ProductInfo;

    struct EmptySource;

    #[async_trait]
    impl JargonSource for EmptySource {
        async fn list_entries(&self) -> anyhow::Result<Vec<JargonEntry>> {
            Ok(Vec::new())
        }
    }

    /// Extractor stub that records every invocation.
    struct RecordingExtractor {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingExtractor {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl FieldExtractor for RecordingExtractor {
        async fn extract(&self, text: &str) -> Result<ExtractionFragment, ExtractError> {
            self.calls.lock().push(text.to_string());
            if self.fail {
                return Err(ExtractError::Request("model unavailable".to_string()));
            }
            Ok(ExtractionFragment {
                product: Some(ProductInfo {
                    name: Some(text.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }
    }

    fn pipeline_with(
        extractor: Arc<dyn FieldExtractor>,
        cache: Arc<ExtractionCache>,
    ) -> RecognitionPipeline {
        RecognitionPipeline::new(
            Arc::new(JargonDictionary::new(Arc::new(EmptySource))),
            cache,
            extractor,
            ReferenceEnricher::new(Arc::new(InMemoryDirectory::new())),
            None,
        )
    }

    #[tokio::test]
    async fn short_text_skips_cache_and_extractor() {
        let extractor = RecordingExtractor::new(false);
        let cache = Arc::new(ExtractionCache::default());
        let pipeline = pipeline_with(extractor.clone(), cache.clone());

        for text in ["", " ", "苹", "  好  "] {
            let fragment = pipeline.process(text).await;
            assert!(fragment.is_empty());
        }

        assert_eq!(extractor.call_count(), 0);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn second_identical_message_is_served_from_cache() {
        let extractor = RecordingExtractor::new(false);
        let cache = Arc::new(ExtractionCache::default());
        let pipeline = pipeline_with(extractor.clone(), cache.clone());

        let first = pipeline.process("五箱苹果").await;
        let second = pipeline.process("五箱苹果").await;

        assert_eq!(first, second);
        assert_eq!(extractor.call_count(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(pipeline.stats().total_calls(), 1);
    }

    #[tokio::test]
    async fn extractor_failure_degrades_and_is_not_cached() {
        let extractor = RecordingExtractor::new(true);
        let cache = Arc::new(ExtractionCache::default());
        let pipeline = pipeline_with(extractor.clone(), cache.clone());

        assert!(pipeline.process("五箱苹果").await.is_empty());
        assert_eq!(cache.len(), 0);

        // Not cached, so the same text retries the extractor.
        assert!(pipeline.process("五箱苹果").await.is_empty());
        assert_eq!(extractor.call_count(), 2);
    }

    #[tokio::test]
    async fn timed_out_extraction_degrades_to_empty() {
        struct StallingExtractor;

        #[async_trait]
        impl FieldExtractor for StallingExtractor {
            async fn extract(&self, _: &str) -> Result<ExtractionFragment, ExtractError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(ExtractionFragment::empty())
            }
        }

        let pipeline = RecognitionPipeline::new(
            Arc::new(JargonDictionary::new(Arc::new(EmptySource))),
            Arc::new(ExtractionCache::default()),
            Arc::new(StallingExtractor),
            ReferenceEnricher::new(Arc::new(InMemoryDirectory::new())),
            Some(Duration::from_millis(20)),
        );

        let fragment = pipeline.process("五箱苹果").await;
        assert!(fragment.is_empty());
        assert_eq!(pipeline.cache().len(), 0);
    }

    #[tokio::test]
    async fn jargon_translation_runs_before_cache_and_extraction() {
        struct OneEntry;

        #[async_trait]
        impl JargonSource for OneEntry {
            async fn list_entries(&self) -> anyhow::Result<Vec<JargonEntry>> {
                Ok(vec![JargonEntry {
                    id: 1,
                    slang_term: "红富士".to_string(),
                    canonical_term: "苹果".to_string(),
                }])
            }
        }

        let dictionary = Arc::new(JargonDictionary::new(Arc::new(OneEntry)));
        dictionary.reload().await;

        let extractor = RecordingExtractor::new(false);
        let cache = Arc::new(ExtractionCache::default());
        let pipeline = RecognitionPipeline::new(
            dictionary,
            cache.clone(),
            extractor.clone(),
            ReferenceEnricher::new(Arc::new(InMemoryDirectory::new())),
            None,
        );

        pipeline.process("两箱红富士").await;
        assert_eq!(extractor.calls.lock().as_slice(), &["两箱苹果".to_string()]);

        // Slang and canonical spellings of the same request share one key.
        pipeline.process("两箱苹果").await;
        assert_eq!(extractor.call_count(), 1);
        assert_eq!(cache.len(), 1);
    }
}
