//! Per-connection session registry and merge serialization.
//!
//! One draft per live connection, created on open and dropped on close.
//! Messages within one session are serialized by holding the session's
//! async mutex across the whole pipeline run, so a slow extractor call
//! stalls only that session's next message. Sessions never share drafts,
//! so different sessions run fully concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::order::OrderDraft;
use crate::core::pipeline::RecognitionPipeline;

struct Session {
    draft: Mutex<OrderDraft>,
}

pub struct SessionRegistry {
    pipeline: Arc<RecognitionPipeline>,
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(pipeline: Arc<RecognitionPipeline>) -> Self {
        Self {
            pipeline,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty draft for a new connection.
    pub fn open(&self, session_id: &str) {
        info!("session opened: {}", session_id);
        self.sessions.write().insert(
            session_id.to_string(),
            Arc::new(Session {
                draft: Mutex::new(OrderDraft::default()),
            }),
        );
    }

    /// Run the full pipeline for one inbound message and return the merged
    /// draft.
    ///
    /// The session lock is held across the pipeline await, so merges for
    /// one session happen in strict arrival order with the prior draft as
    /// the base. A message for an unknown session recreates the entry.
    pub async fn handle_message(&self, session_id: &str, raw_text: &str) -> OrderDraft {
        let session = self.get_or_create(session_id);
        let mut draft = session.draft.lock().await;

        let fragment = self.pipeline.process(raw_text).await;
        draft.merge(fragment);
        draft.clone()
    }

    /// Discard the session's draft. No state may survive a close.
    pub fn close(&self, session_id: &str) {
        info!("session closed: {}", session_id);
        self.sessions.write().remove(session_id);
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().len()
    }

    fn get_or_create(&self, session_id: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().get(session_id) {
            return Arc::clone(session);
        }
        debug!("message for unknown session {}, recreating", session_id);
        let mut sessions = self.sessions.write();
        Arc::clone(sessions.entry(session_id.to_string()).or_insert_with(|| {
            Arc::new(Session {
                draft: Mutex::new(OrderDraft::default()),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    use crate::core::cache::ExtractionCache;
    use crate::core::directory::InMemoryDirectory;
    use crate::core::enricher::ReferenceEnricher;
    use crate::core::extractor::{ExtractError, FieldExtractor};
    use crate::core::jargon::{JargonDictionary, JargonEntry, JargonSource};
    use crate::core::order::{CustomerInfo, ExtractionFragment};

    struct EmptySource;

    #[async_trait]
    impl JargonSource for EmptySource {
        async fn list_entries(&self) -> anyhow::Result<Vec<JargonEntry>> {
            Ok(Vec::new())
        }
    }

    /// Names every customer after the input text, after a short delay.
    struct SlowEchoExtractor;

    #[async_trait]
    impl FieldExtractor for SlowEchoExtractor {
        async fn extract(&self, text: &str) -> Result<ExtractionFragment, ExtractError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(ExtractionFragment {
                customer: Some(CustomerInfo {
                    name: Some(text.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }
    }

    fn registry() -> Arc<SessionRegistry> {
        let pipeline = Arc::new(RecognitionPipeline::new(
            Arc::new(JargonDictionary::new(Arc::new(EmptySource))),
            Arc::new(ExtractionCache::default()),
            Arc::new(SlowEchoExtractor),
            ReferenceEnricher::new(Arc::new(InMemoryDirectory::new())),
            None,
        ));
        Arc::new(SessionRegistry::new(pipeline))
    }

    #[tokio::test]
    async fn open_message_close_lifecycle() {
        let registry = registry();
        registry.open("s1");
        assert_eq!(registry.active_sessions(), 1);

        let draft = registry.handle_message("s1", "客户张三").await;
        assert_eq!(draft.customer.name.as_deref(), Some("客户张三"));

        registry.close("s1");
        assert_eq!(registry.active_sessions(), 0);

        // A fresh session with the same id starts from an empty draft.
        registry.open("s1");
        let draft = registry.handle_message("s1", "随便说点").await;
        assert_eq!(draft.customer.name.as_deref(), Some("随便说点"));
    }

    #[tokio::test]
    async fn sessions_do_not_share_drafts() {
        let registry = registry();
        registry.open("a");
        registry.open("b");

        let draft_a = registry.handle_message("a", "客户张三").await;
        let draft_b = registry.handle_message("b", "客户李四").await;

        assert_eq!(draft_a.customer.name.as_deref(), Some("客户张三"));
        assert_eq!(draft_b.customer.name.as_deref(), Some("客户李四"));
    }

    #[tokio::test]
    async fn unknown_session_is_recreated() {
        let registry = registry();
        let draft = registry.handle_message("ghost", "客户张三").await;
        assert_eq!(draft.customer.name.as_deref(), Some("客户张三"));
        assert_eq!(registry.active_sessions(), 1);
    }

    #[tokio::test]
    async fn concurrent_messages_on_one_session_are_serialized() {
        let registry = registry();
        registry.open("s1");

        // Two concurrent messages; each reply must reflect a complete merge
        // of its own fragment over whatever came before it.
        let first = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.handle_message("s1", "客户张三").await })
        };
        let second = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.handle_message("s1", "客户李四").await })
        };

        let first = first.await.unwrap();
        let second = second.await.unwrap();

        // Order between the two tasks is not fixed, but neither reply may
        // carry a torn or empty customer.
        for draft in [&first, &second] {
            let name = draft.customer.name.as_deref().unwrap();
            assert!(name == "客户张三" || name == "客户李四");
        }
    }
}
