//! Plain-text rendering for CLI output.

use terrace_core::{AnnotatedComment, TopicInfo};
use terrace_engine::{BatchSummary, LabelCount, Statistics};

const TEXT_WIDTH: usize = 60;

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub(crate) fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn format_counts(counts: &[LabelCount]) -> String {
    if counts.is_empty() {
        return "-".to_string();
    }
    counts
        .iter()
        .map(|c| format!("{} ({})", c.label, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn opinion_row(comment: &AnnotatedComment) -> String {
    format!(
        "{:<12}{:<10}{:<16}{:>7.3}  {}",
        comment.record.comment_id,
        comment.sentiment_a.as_str(),
        comment.primary_emotion,
        comment.opinion_score,
        truncate_text(&comment.record.text, TEXT_WIDTH)
    )
}

pub(crate) fn print_opinions(hits: &[AnnotatedComment]) {
    if hits.is_empty() {
        println!("no matching opinions");
        return;
    }
    println!(
        "{:<12}{:<10}{:<16}{:>7}  TEXT",
        "COMMENT", "SENTIMENT", "EMOTION", "SCORE"
    );
    for comment in hits {
        println!("{}", opinion_row(comment));
    }
}

pub(crate) fn print_summary(summary: &BatchSummary) {
    println!("processed comments: {}", summary.processed_comments);
    println!("unique posts:       {}", summary.unique_posts);
    println!("skipped records:    {}", summary.skipped_records);
    println!("topics:             {}", summary.topic_count);
    for (label, count) in &summary.sentiment_distribution {
        println!("  {label:<10}{count}");
    }
    println!("top emotions: {}", format_counts(&summary.top_emotions));
}

pub(crate) fn print_statistics(stats: &Statistics) {
    println!("comments:      {}", stats.total_comments);
    println!("posts:         {}", stats.unique_posts);
    println!("authors:       {}", stats.unique_authors);
    println!("avg score:     {:.3}", stats.average_opinion_score);
    println!("avg intensity: {:.3}", stats.average_intensity);
    for (label, count) in &stats.sentiment_distribution {
        println!("  {label:<10}{count}");
    }
    println!("top emotions:  {}", format_counts(&stats.top_emotions));
    println!("players:       {}", format_counts(&stats.most_mentioned_players));
    println!("teams:         {}", format_counts(&stats.most_mentioned_teams));
}

pub(crate) fn print_topics(topics: &[TopicInfo]) {
    if topics.is_empty() {
        println!("no topics discovered");
        return;
    }
    println!("{:<8}{:<8}NAME", "TOPIC", "COUNT");
    for topic in topics {
        println!("{:<8}{:<8}{}", topic.topic_id, topic.count, topic.name);
    }
}
