//! Read-only aggregates over an annotated table.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use terrace_core::{AnnotatedComment, SentimentLabel, TopicInfo};

const TOP_N: usize = 10;
const SUMMARY_TOP_EMOTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_comments: usize,
    pub unique_posts: usize,
    pub unique_authors: usize,
    /// Classifier sentiment counts; every label is present.
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub top_emotions: Vec<LabelCount>,
    pub average_opinion_score: f64,
    pub average_intensity: f64,
    pub most_mentioned_players: Vec<LabelCount>,
    pub most_mentioned_teams: Vec<LabelCount>,
}

/// Aggregate counts reported after a batch completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed_comments: usize,
    pub unique_posts: usize,
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub top_emotions: Vec<LabelCount>,
    pub skipped_records: usize,
    /// Discovered topics, excluding the outlier bucket.
    pub topic_count: usize,
}

#[must_use]
pub(crate) fn compute_statistics(comments: &[AnnotatedComment]) -> Statistics {
    let players = comments
        .iter()
        .flat_map(|c| c.entities.persons.iter().map(String::as_str));
    let teams = comments
        .iter()
        .flat_map(|c| c.entities.organizations.iter().map(String::as_str));

    Statistics {
        total_comments: comments.len(),
        unique_posts: unique_posts(comments),
        unique_authors: comments
            .iter()
            .map(|c| c.record.author.as_str())
            .collect::<HashSet<_>>()
            .len(),
        sentiment_distribution: sentiment_distribution(comments),
        top_emotions: top_counts(comments.iter().map(|c| c.primary_emotion.as_str()), TOP_N),
        average_opinion_score: mean(comments.iter().map(|c| c.opinion_score)),
        average_intensity: mean(comments.iter().map(|c| c.opinion_intensity)),
        most_mentioned_players: top_counts(players, TOP_N),
        most_mentioned_teams: top_counts(teams, TOP_N),
    }
}

#[must_use]
pub fn batch_summary(
    comments: &[AnnotatedComment],
    topics: &[TopicInfo],
    skipped_records: usize,
) -> BatchSummary {
    BatchSummary {
        processed_comments: comments.len(),
        unique_posts: unique_posts(comments),
        sentiment_distribution: sentiment_distribution(comments),
        top_emotions: top_counts(
            comments.iter().map(|c| c.primary_emotion.as_str()),
            SUMMARY_TOP_EMOTIONS,
        ),
        skipped_records,
        topic_count: topics.iter().filter(|t| t.topic_id >= 0).count(),
    }
}

fn unique_posts(comments: &[AnnotatedComment]) -> usize {
    comments
        .iter()
        .map(|c| c.record.post_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn sentiment_distribution(comments: &[AnnotatedComment]) -> BTreeMap<String, usize> {
    let mut distribution: BTreeMap<String, usize> = SentimentLabel::ALL
        .iter()
        .map(|l| (l.as_str().to_string(), 0))
        .collect();
    for comment in comments {
        *distribution
            .entry(comment.sentiment_a.as_str().to_string())
            .or_default() += 1;
    }
    distribution
}

/// Most frequent labels, descending; ties go to the label seen first.
fn top_counts<'a>(labels: impl Iterator<Item = &'a str>, n: usize) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, label) in labels.enumerate() {
        counts.entry(label).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(label, (count, first))| (label, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(n)
        .map(|(label, count, _)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = count as f64;
    sum / count
}
