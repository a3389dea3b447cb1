//! Embedding-based topic discovery.
//!
//! Texts are embedded through TEI, clustered with spherical k-means, and each
//! cluster is described by class-based TF-IDF terms. Topic ids are only
//! meaningful within one [`TopicModel::fit_transform`] call.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use async_trait::async_trait;
use ndarray::{Array1, Array2, Axis};
use terrace_core::TopicInfo;

use crate::embeddings::TeiClient;
use crate::error::ProviderError;
use crate::types::TopicAssignment;
use crate::TopicModel;

const PROVIDER: &str = "topics";

/// Topic id for texts that belong to no topic.
pub const OUTLIER_TOPIC: i32 = -1;

const MAX_ITERATIONS: usize = 50;
const NAME_TERMS: usize = 4;
const REPRESENTATIVE_TERMS: usize = 10;
const REPRESENTATIVE_TEXTS: usize = 3;

/// Words too common in match threads to say anything about a topic.
const DOMAIN_STOP_WORDS: &[&str] = &["game", "match", "play", "playing", "player", "team"];

static STOP_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    stop_words::get(stop_words::LANGUAGE::English)
        .iter()
        .map(ToString::to_string)
        .chain(DOMAIN_STOP_WORDS.iter().map(ToString::to_string))
        .collect()
});

#[derive(Debug, Clone)]
pub struct TopicOptions {
    /// Upper bound on discovered topics.
    pub n_topics: usize,
    /// Clusters smaller than this become outliers.
    pub min_topic_size: usize,
}

impl Default for TopicOptions {
    fn default() -> Self {
        Self {
            n_topics: 10,
            min_topic_size: 5,
        }
    }
}

/// Topic model backed by a TEI embeddings service.
pub struct EmbeddingTopicModel {
    tei: TeiClient,
    options: TopicOptions,
}

impl EmbeddingTopicModel {
    #[must_use]
    pub fn new(tei: TeiClient, options: TopicOptions) -> Self {
        Self { tei, options }
    }
}

#[async_trait]
impl TopicModel for EmbeddingTopicModel {
    async fn fit_transform(&self, texts: &[String]) -> Result<TopicAssignment, ProviderError> {
        if texts.is_empty() {
            return Ok(TopicAssignment::default());
        }
        let embeddings = self.tei.embed(texts).await?;
        let assignment = cluster_topics(texts, &embeddings, &self.options)?;
        tracing::info!(
            texts = texts.len(),
            topics = assignment.summary.iter().filter(|t| t.topic_id >= 0).count(),
            "topic discovery complete"
        );
        Ok(assignment)
    }
}

/// Cluster pre-computed embeddings into topics.
///
/// Deterministic for fixed inputs.
///
/// # Errors
///
/// Returns [`ProviderError::ShapeMismatch`] when `embeddings` and `texts`
/// differ in length, or [`ProviderError::Response`] when the vectors do not
/// share one dimension.
pub fn cluster_topics(
    texts: &[String],
    embeddings: &[Vec<f32>],
    options: &TopicOptions,
) -> Result<TopicAssignment, ProviderError> {
    if embeddings.len() != texts.len() {
        return Err(ProviderError::ShapeMismatch {
            provider: PROVIDER,
            expected: texts.len(),
            got: embeddings.len(),
        });
    }
    if texts.is_empty() {
        return Ok(TopicAssignment::default());
    }
    let dim = embeddings[0].len();
    if embeddings.iter().any(|e| e.len() != dim) {
        return Err(ProviderError::Response {
            provider: PROVIDER,
            reason: "embeddings have inconsistent dimensions".to_string(),
        });
    }

    let vectors = unit_rows(embeddings, dim);
    let k = options
        .n_topics
        .min(texts.len() / options.min_topic_size.max(1));

    let (topic_ids, probabilities) = if k == 0 {
        (vec![OUTLIER_TOPIC; texts.len()], vec![0.0; texts.len()])
    } else {
        let (assignments, centroids) = spherical_kmeans(&vectors, k);
        relabel(&vectors, &assignments, &centroids, options.min_topic_size)
    };

    let summary = summarize(texts, &topic_ids, &probabilities);

    Ok(TopicAssignment {
        topic_ids,
        probabilities,
        summary,
    })
}

/// One L2-normalized row per embedding. Zero vectors stay zero.
fn unit_rows(embeddings: &[Vec<f32>], dim: usize) -> Array2<f64> {
    let mut vectors =
        Array2::from_shape_fn((embeddings.len(), dim), |(i, j)| f64::from(embeddings[i][j]));
    for mut row in vectors.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    vectors
}

/// Index of the most similar centroid per row; the lowest index wins a tie.
fn nearest(similarities: &Array2<f64>) -> Vec<usize> {
    similarities
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (i, &sim) in row.iter().enumerate() {
                if sim > row[best] {
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// Farthest-point seeding starting from the first vector.
fn init_centroids(vectors: &Array2<f64>, k: usize) -> Array2<f64> {
    let distance_to = |seed: usize| -> Array1<f64> {
        vectors.dot(&vectors.row(seed)).mapv(|sim| 1.0 - sim)
    };

    let mut seeds = vec![0];
    let mut closest = distance_to(0);
    while seeds.len() < k {
        let mut pick = 0;
        for (i, &d) in closest.iter().enumerate() {
            if d > closest[pick] {
                pick = i;
            }
        }
        closest.zip_mut_with(&distance_to(pick), |c, &d| *c = c.min(d));
        seeds.push(pick);
    }
    vectors.select(Axis(0), &seeds)
}

fn spherical_kmeans(vectors: &Array2<f64>, k: usize) -> (Vec<usize>, Array2<f64>) {
    let mut centroids = init_centroids(vectors, k);
    let mut assignments = nearest(&vectors.dot(&centroids.t()));

    for _ in 0..MAX_ITERATIONS {
        for c in 0..k {
            let members: Vec<usize> = assignments
                .iter()
                .enumerate()
                .filter(|(_, a)| **a == c)
                .map(|(i, _)| i)
                .collect();
            // An empty cluster keeps its previous centroid.
            let Some(mean) = vectors.select(Axis(0), &members).mean_axis(Axis(0)) else {
                continue;
            };
            let norm = mean.dot(&mean).sqrt();
            if norm > 0.0 {
                centroids.row_mut(c).assign(&(mean / norm));
            }
        }

        let next = nearest(&vectors.dot(&centroids.t()));
        if next == assignments {
            break;
        }
        assignments = next;
    }

    (assignments, centroids)
}

/// Drop undersized clusters to the outlier bucket and renumber the rest by
/// size, largest first.
fn relabel(
    vectors: &Array2<f64>,
    assignments: &[usize],
    centroids: &Array2<f64>,
    min_topic_size: usize,
) -> (Vec<i32>, Vec<f64>) {
    let k = centroids.nrows();
    let mut sizes = vec![0usize; k];
    for &a in assignments {
        sizes[a] += 1;
    }

    let mut kept: Vec<usize> = (0..k)
        .filter(|&c| sizes[c] >= min_topic_size.max(1))
        .collect();
    kept.sort_by(|a, b| sizes[*b].cmp(&sizes[*a]).then(a.cmp(b)));

    let mut new_id: HashMap<usize, i32> = HashMap::new();
    for (rank, &cluster) in kept.iter().enumerate() {
        let id = i32::try_from(rank).unwrap_or(i32::MAX);
        new_id.insert(cluster, id);
    }

    let similarities = vectors.dot(&centroids.t());
    assignments
        .iter()
        .enumerate()
        .map(|(i, a)| match new_id.get(a) {
            Some(&id) => (id, similarities[[i, *a]].clamp(0.0, 1.0)),
            None => (OUTLIER_TOPIC, 0.0),
        })
        .unzip()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| {
            t.chars().count() > 2
                && !t.chars().all(|c| c.is_ascii_digit())
                && !STOP_WORDS.contains(t)
        })
        .collect()
}

/// Class-based TF-IDF: `tf(t, c) * ln(1 + A / f(t))`, where `A` is the mean
/// token count per class and `f(t)` the frequency of `t` over all classes.
fn class_terms(class_tokens: &BTreeMap<i32, Vec<String>>) -> BTreeMap<i32, Vec<String>> {
    let mut class_tf: BTreeMap<i32, HashMap<&str, usize>> = BTreeMap::new();
    let mut global_tf: HashMap<&str, usize> = HashMap::new();
    let mut total_tokens = 0usize;

    for (&topic, tokens) in class_tokens {
        let tf = class_tf.entry(topic).or_default();
        for token in tokens {
            *tf.entry(token.as_str()).or_default() += 1;
            *global_tf.entry(token.as_str()).or_default() += 1;
        }
        total_tokens += tokens.len();
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_tokens = total_tokens as f64 / class_tokens.len().max(1) as f64;

    class_tf
        .into_iter()
        .map(|(topic, tf)| {
            #[allow(clippy::cast_precision_loss)]
            let mut weighted: Vec<(&str, f64)> = tf
                .into_iter()
                .map(|(term, count)| {
                    let f_t = global_tf.get(term).copied().unwrap_or(1) as f64;
                    (term, count as f64 * (1.0 + avg_tokens / f_t).ln())
                })
                .collect();
            weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(b.0)));
            let terms = weighted
                .into_iter()
                .take(REPRESENTATIVE_TERMS)
                .map(|(term, _)| term.to_string())
                .collect();
            (topic, terms)
        })
        .collect()
}

fn summarize(texts: &[String], topic_ids: &[i32], probabilities: &[f64]) -> Vec<TopicInfo> {
    let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, &topic) in topic_ids.iter().enumerate() {
        members.entry(topic).or_default().push(i);
    }

    let class_tokens: BTreeMap<i32, Vec<String>> = members
        .iter()
        .map(|(&topic, idx)| (topic, idx.iter().flat_map(|&i| tokenize(&texts[i])).collect()))
        .collect();
    let mut terms = class_terms(&class_tokens);

    members
        .into_iter()
        .map(|(topic_id, mut idx)| {
            let representative_terms = terms.remove(&topic_id).unwrap_or_default();
            let name = std::iter::once(topic_id.to_string())
                .chain(representative_terms.iter().take(NAME_TERMS).cloned())
                .collect::<Vec<_>>()
                .join("_");

            let count = idx.len();
            idx.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]).then(a.cmp(&b)));
            let representative_texts = idx
                .into_iter()
                .take(REPRESENTATIVE_TEXTS)
                .map(|i| texts[i].clone())
                .collect();

            TopicInfo {
                topic_id,
                count,
                name,
                representative_terms,
                representative_texts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn options(n_topics: usize, min_topic_size: usize) -> TopicOptions {
        TopicOptions {
            n_topics,
            min_topic_size,
        }
    }

    #[test]
    fn two_clear_clusters() {
        let docs = texts(&[
            "haaland scored another hattrick",
            "haaland hattrick again tonight",
            "that haaland finish was unreal",
            "referee missed the penalty call",
            "var penalty decision was a joke",
            "penalty should never stand, referee blind",
        ]);
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.95, 0.05],
            vec![0.0, 1.0],
            vec![0.1, 0.9],
            vec![0.05, 0.95],
        ];

        let result = cluster_topics(&docs, &embeddings, &options(10, 3)).unwrap();

        assert_eq!(result.topic_ids.len(), 6);
        assert_eq!(result.topic_ids[0], 0);
        assert_eq!(result.topic_ids[0], result.topic_ids[1]);
        assert_eq!(result.topic_ids[1], result.topic_ids[2]);
        assert_eq!(result.topic_ids[3], result.topic_ids[4]);
        assert_ne!(result.topic_ids[0], result.topic_ids[3]);
        assert!(result
            .probabilities
            .iter()
            .all(|p| (0.0..=1.0).contains(p)));

        let haaland = result
            .summary
            .iter()
            .find(|t| t.topic_id == result.topic_ids[0])
            .unwrap();
        assert_eq!(haaland.count, 3);
        assert_eq!(haaland.representative_terms[0], "haaland");
        assert!(haaland.name.starts_with(&format!("{}_haaland", haaland.topic_id)));
        assert_eq!(haaland.representative_texts.len(), 3);
    }

    #[test]
    fn largest_cluster_gets_id_zero() {
        let docs = texts(&["bbb one", "bbb two", "aaa one", "aaa two", "aaa three"]);
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ];

        let result = cluster_topics(&docs, &embeddings, &options(2, 2)).unwrap();
        assert_eq!(result.topic_ids, vec![1, 1, 0, 0, 0]);
        assert_eq!(result.summary[0].count, 3);
    }

    #[test]
    fn too_few_texts_are_all_outliers() {
        let docs = texts(&["just one comment here", "and a second one"]);
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

        let result = cluster_topics(&docs, &embeddings, &options(10, 5)).unwrap();
        assert_eq!(result.topic_ids, vec![OUTLIER_TOPIC, OUTLIER_TOPIC]);
        assert_eq!(result.probabilities, vec![0.0, 0.0]);
        assert_eq!(result.summary.len(), 1);
        assert_eq!(result.summary[0].topic_id, OUTLIER_TOPIC);
        assert_eq!(result.summary[0].count, 2);
    }

    #[test]
    fn undersized_cluster_becomes_outliers() {
        let docs = texts(&["aaa", "aaa", "aaa", "bbb"]);
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ];

        let result = cluster_topics(&docs, &embeddings, &options(2, 2)).unwrap();
        assert_eq!(result.topic_ids, vec![0, 0, 0, OUTLIER_TOPIC]);
        assert_eq!(result.probabilities[3], 0.0);
        assert_eq!(result.summary[0].topic_id, OUTLIER_TOPIC);
        assert_eq!(result.summary[1].topic_id, 0);
    }

    #[test]
    fn deterministic_for_fixed_input() {
        let docs = texts(&["a1 x", "a2 x", "b1 y", "b2 y", "c1 z", "c2 z"]);
        let embeddings = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.1, 0.9, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.1, 0.9],
        ];
        let first = cluster_topics(&docs, &embeddings, &options(3, 2)).unwrap();
        let second = cluster_topics(&docs, &embeddings, &options(3, 2)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_length_mismatch() {
        let docs = texts(&["one text only"]);
        let err = cluster_topics(&docs, &[], &TopicOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ShapeMismatch {
                expected: 1,
                got: 0,
                ..
            }
        ));
    }

    #[test]
    fn rejects_ragged_embeddings() {
        let docs = texts(&["first text", "second text"]);
        let embeddings = vec![vec![1.0, 0.0], vec![1.0]];
        let err = cluster_topics(&docs, &embeddings, &TopicOptions::default()).unwrap_err();
        assert!(matches!(err, ProviderError::Response { .. }));
    }

    #[test]
    fn unit_rows_normalizes_and_keeps_zero_vectors() {
        let vectors = unit_rows(&[vec![3.0, 4.0], vec![0.0, 0.0]], 2);
        assert!((vectors[[0, 0]] - 0.6).abs() < 1e-12);
        assert!((vectors[[0, 1]] - 0.8).abs() < 1e-12);
        assert_eq!(vectors.row(1).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn farthest_point_seeds_are_spread_out() {
        let vectors = unit_rows(
            &[vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0], vec![0.1, 0.9]],
            2,
        );
        let centroids = init_centroids(&vectors, 2);
        assert_eq!(centroids.row(0), vectors.row(0));
        assert_eq!(centroids.row(1), vectors.row(2));
    }

    #[test]
    fn tokenize_drops_stop_words_and_numbers() {
        let tokens = tokenize("The team played a great match in 2024, Saka was the player");
        assert!(tokens.contains(&"saka".to_string()));
        assert!(!tokens.contains(&"team".to_string()));
        assert!(!tokens.contains(&"match".to_string()));
        assert!(!tokens.contains(&"player".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"2024".to_string()));
    }
}
