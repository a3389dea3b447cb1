//! Shared domain types and configuration for Terrace.

pub mod annotations;
pub mod app_config;
pub mod comments;
pub mod config;
pub mod lexicon;

pub use annotations::{
    AnnotatedComment, EmotionScore, EntityMention, EntityMentions, OpinionStrength,
    SentimentLabel, TopicInfo,
};
pub use app_config::AppConfig;
pub use comments::CommentRecord;
pub use config::{load_app_config, load_app_config_from_env};
pub use lexicon::{load_lexicon, parse_lexicon, LexiconFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read lexicon file {path}: {source}")]
    LexiconFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon file: {0}")]
    LexiconFileParse(#[source] serde_yaml::Error),

    #[error("lexicon validation failed: {0}")]
    Validation(String),
}
