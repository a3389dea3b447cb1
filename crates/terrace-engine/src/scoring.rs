//! Composite opinion score.

use serde::{Deserialize, Serialize};

/// Weights and bounds for [`ScoringPolicy::opinion_score`].
///
/// ```text
/// score = compound_weight   * lexicon compound
///       + confidence_weight * classifier confidence
///       + engagement_weight * min(engagement / engagement_cap, 1.0)
///       + intensity_weight  * intensity
/// ```
///
/// Only engagement is clamped, and only from above; the score itself is
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub compound_weight: f64,
    pub confidence_weight: f64,
    pub engagement_weight: f64,
    pub intensity_weight: f64,
    pub engagement_cap: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            compound_weight: 0.5,
            confidence_weight: 0.2,
            engagement_weight: 0.2,
            intensity_weight: 0.1,
            engagement_cap: 100.0,
        }
    }
}

impl ScoringPolicy {
    /// Normalized engagement, capped at 1.0. Negative engagement stays negative.
    #[must_use]
    pub fn engagement_factor(&self, engagement: i64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let engagement = engagement as f64;
        (engagement / self.engagement_cap).min(1.0)
    }

    #[must_use]
    pub fn opinion_score(&self, compound: f64, confidence: f64, engagement: i64, intensity: f64) -> f64 {
        self.compound_weight * compound
            + self.confidence_weight * confidence
            + self.engagement_weight * self.engagement_factor(engagement)
            + self.intensity_weight * intensity
    }
}

/// Input columns for [`opinion_scores`]; all must have the same length.
pub struct ScoreColumns<'a> {
    pub compound: &'a [f64],
    pub confidence: &'a [f64],
    pub engagement: &'a [i64],
    pub intensity: &'a [f64],
}

/// Score a whole batch column-wise. Output length equals input length.
#[must_use]
pub fn opinion_scores(policy: &ScoringPolicy, columns: &ScoreColumns<'_>) -> Vec<f64> {
    debug_assert!(
        columns.confidence.len() == columns.compound.len()
            && columns.engagement.len() == columns.compound.len()
            && columns.intensity.len() == columns.compound.len()
    );
    columns
        .compound
        .iter()
        .zip(columns.confidence)
        .zip(columns.engagement)
        .zip(columns.intensity)
        .map(|(((&compound, &confidence), &engagement), &intensity)| {
            policy.opinion_score(compound, confidence, engagement, intensity)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn default_weights() {
        let policy = ScoringPolicy::default();
        let score = policy.opinion_score(0.8, 0.9, 50, 0.8);
        // 0.4 + 0.18 + 0.1 + 0.08
        assert!(close(score, 0.76), "got {score}");
    }

    #[test]
    fn engagement_is_capped_above() {
        let policy = ScoringPolicy::default();
        assert!(close(policy.engagement_factor(100), 1.0));
        assert!(close(policy.engagement_factor(250), 1.0));
        assert!(close(
            policy.opinion_score(0.1, 0.5, 250, 0.1),
            policy.opinion_score(0.1, 0.5, 100, 0.1)
        ));
    }

    #[test]
    fn negative_engagement_is_not_clamped() {
        let policy = ScoringPolicy::default();
        let with_negative = policy.opinion_score(0.0, 0.0, -50, 0.0);
        assert!(close(with_negative, -0.1), "got {with_negative}");
    }

    #[test]
    fn score_can_exceed_one() {
        let policy = ScoringPolicy {
            compound_weight: 2.0,
            ..ScoringPolicy::default()
        };
        assert!(policy.opinion_score(1.0, 1.0, 100, 1.0) > 1.0);
    }

    #[test]
    fn columnar_matches_row_wise() {
        let policy = ScoringPolicy::default();
        let columns = ScoreColumns {
            compound: &[0.5, -0.3, 0.0],
            confidence: &[0.9, 0.6, 0.5],
            engagement: &[10, 300, -20],
            intensity: &[0.5, 0.3, 0.0],
        };
        let scores = opinion_scores(&policy, &columns);
        assert_eq!(scores.len(), 3);
        assert!(close(scores[1], policy.opinion_score(-0.3, 0.6, 300, 0.3)));
        assert!(close(scores[2], policy.opinion_score(0.0, 0.5, -20, 0.0)));
    }
}
