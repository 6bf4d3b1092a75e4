//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::cache::ExtractionCache;
use crate::core::directory::{InMemoryDirectory, ReferenceDirectory, ReferenceSeed};
use crate::core::enricher::ReferenceEnricher;
use crate::core::extractor::{FieldExtractor, OpenAiExtractor};
use crate::core::jargon::{InMemoryJargonStore, JargonDictionary, JargonSource};
use crate::core::pipeline::RecognitionPipeline;
use crate::core::session::SessionRegistry;

/// Jargon mutation notification. Any variant triggers a full dictionary
/// reload; the id is logged only.
#[derive(Debug, Clone, Copy)]
pub enum JargonEvent {
    Created(i64),
    Updated(i64),
    Deleted(i64),
}

const JARGON_EVENT_BUFFER: usize = 64;

/// Application state that can be shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub pipeline: Arc<RecognitionPipeline>,
    pub sessions: Arc<SessionRegistry>,
    pub jargon_store: Arc<InMemoryJargonStore>,
    jargon_events: broadcast::Sender<JargonEvent>,
}

impl AppState {
    /// Build state from config with the production extractor and empty
    /// in-memory reference data (optionally seeded from a JSON file).
    pub async fn from_config(config: ServerConfig) -> anyhow::Result<Arc<Self>> {
        let extractor: Arc<dyn FieldExtractor> = Arc::new(OpenAiExtractor::from_config(&config));
        let directory = Arc::new(InMemoryDirectory::new());
        let jargon_store = Arc::new(InMemoryJargonStore::new());

        if let Some(path) = &config.reference_data_path {
            let raw = tokio::fs::read_to_string(path).await?;
            let seed: ReferenceSeed = serde_json::from_str(&raw)?;
            info!(
                "seeding reference data: {} customers, {} products, {} drivers, {} jargon entries",
                seed.customers.len(),
                seed.products.len(),
                seed.drivers.len(),
                seed.jargon.len()
            );
            directory.load_seed(&seed);
            for entry in seed.jargon {
                jargon_store.insert(entry);
            }
        }

        Ok(Self::new(config, extractor, directory, jargon_store).await)
    }

    /// Assemble state from explicit collaborators. Tests inject stub
    /// extractors and pre-filled directories through here.
    pub async fn new(
        config: ServerConfig,
        extractor: Arc<dyn FieldExtractor>,
        directory: Arc<dyn ReferenceDirectory>,
        jargon_store: Arc<InMemoryJargonStore>,
    ) -> Arc<Self> {
        let dictionary = Arc::new(JargonDictionary::new(
            Arc::clone(&jargon_store) as Arc<dyn JargonSource>
        ));
        dictionary.reload().await;

        let pipeline = Arc::new(RecognitionPipeline::new(
            Arc::clone(&dictionary),
            Arc::new(ExtractionCache::new(config.cache_capacity)),
            extractor,
            ReferenceEnricher::new(directory),
            config.extraction_timeout_seconds.map(Duration::from_secs),
        ));
        let sessions = Arc::new(SessionRegistry::new(Arc::clone(&pipeline)));

        let (jargon_events, event_rx) = broadcast::channel(JARGON_EVENT_BUFFER);
        spawn_jargon_reload_task(Arc::clone(&dictionary), event_rx);

        Arc::new(Self {
            config,
            pipeline,
            sessions,
            jargon_store,
            jargon_events,
        })
    }

    /// Publish a jargon mutation; the reload task picks it up.
    pub fn notify_jargon_changed(&self, event: JargonEvent) {
        if self.jargon_events.send(event).is_err() {
            warn!("jargon reload task gone, event dropped: {:?}", event);
        }
    }
}

/// Reloads the dictionary whenever a mutation event arrives. Lagged
/// receivers are fine: a reload after the latest event covers every missed
/// one.
fn spawn_jargon_reload_task(
    dictionary: Arc<JargonDictionary>,
    mut events: broadcast::Receiver<JargonEvent>,
) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    info!("jargon mutation received, reloading dictionary: {:?}", event);
                    dictionary.reload().await;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("jargon events lagged by {}, reloading once", missed);
                    dictionary.reload().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
