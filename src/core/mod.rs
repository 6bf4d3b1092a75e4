//! Core recognition engine: jargon dictionary, extraction cache, pipeline,
//! enrichment and per-session draft accumulation.

pub mod cache;
pub mod directory;
pub mod enricher;
pub mod extractor;
pub mod jargon;
pub mod order;
pub mod pipeline;
pub mod session;

pub use cache::ExtractionCache;
pub use directory::{InMemoryDirectory, ReferenceDirectory, ReferenceSeed};
pub use enricher::ReferenceEnricher;
pub use extractor::{FieldExtractor, OpenAiExtractor};
pub use jargon::{InMemoryJargonStore, JargonDictionary, JargonEntry, JargonSource};
pub use order::{CustomerInfo, DriverInfo, ExtractionFragment, OrderDraft, ProductInfo};
pub use pipeline::RecognitionPipeline;
pub use session::SessionRegistry;
