use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sentiment_url: String,
    pub emotion_url: String,
    pub ner_url: String,
    pub tei_url: String,
    pub lexicon_path: Option<PathBuf>,
    pub provider_batch_size: usize,
    pub provider_concurrency: usize,
    pub provider_timeout_secs: u64,
    pub emotion_top_k: usize,
    pub emotion_threshold: f64,
    pub polarity_cutoff: f64,
    pub topic_count: usize,
    pub min_topic_size: usize,
    pub engagement_cap: f64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Inference endpoints can embed credentials in the userinfo part.
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sentiment_url", &redact_userinfo(&self.sentiment_url))
            .field("emotion_url", &redact_userinfo(&self.emotion_url))
            .field("ner_url", &redact_userinfo(&self.ner_url))
            .field("tei_url", &redact_userinfo(&self.tei_url))
            .field("lexicon_path", &self.lexicon_path)
            .field("provider_batch_size", &self.provider_batch_size)
            .field("provider_concurrency", &self.provider_concurrency)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("emotion_top_k", &self.emotion_top_k)
            .field("emotion_threshold", &self.emotion_threshold)
            .field("polarity_cutoff", &self.polarity_cutoff)
            .field("topic_count", &self.topic_count)
            .field("min_topic_size", &self.min_topic_size)
            .field("engagement_cap", &self.engagement_cap)
            .finish()
    }
}

/// Replace `user:pass@` in a URL with `[redacted]@`.
fn redact_userinfo(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://[redacted]@{}", &rest[at + 1..]),
        None => url.to_string(),
    }
}
