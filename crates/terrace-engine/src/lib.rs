//! Annotation pipeline, search and aggregation over batches of fan comments.

pub mod error;
pub mod loader;
pub mod pipeline;
pub mod scoring;
pub mod search;
pub mod session;
pub mod stats;
pub mod table;

pub use error::{DataFormatError, EngineError};
pub use loader::{clean_text, load_comments, LoadedComments, MIN_TEXT_CHARS};
pub use pipeline::{AnnotatedBatch, Pipeline, PipelineOptions, Stage, FALLBACK_EMOTION};
pub use scoring::{opinion_scores, ScoreColumns, ScoringPolicy};
pub use search::SearchQuery;
pub use session::{Session, Snapshot};
pub use stats::{batch_summary, BatchSummary, LabelCount, Statistics};
