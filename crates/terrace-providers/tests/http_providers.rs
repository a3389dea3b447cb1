//! Integration tests for the HTTP providers using wiremock HTTP mocks.

use std::time::Duration;

use serde_json::json;
use terrace_core::SentimentLabel;
use terrace_providers::{
    EmbeddingTopicModel, EmotionClassifier, EntityExtractor, HttpEmotionClassifier,
    HttpEntityExtractor, HttpOptions, HttpSentimentClassifier, ProviderError,
    SentimentClassifier, TeiClient, TopicModel, TopicOptions,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(batch_size: usize) -> HttpOptions {
    HttpOptions {
        batch_size,
        concurrency: 2,
        timeout: Duration::from_secs(5),
    }
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn three_class(neg: f64, neu: f64, pos: f64) -> serde_json::Value {
    json!([
        { "label": "positive", "score": pos },
        { "label": "neutral", "score": neu },
        { "label": "negative", "score": neg }
    ])
}

#[tokio::test]
async fn sentiment_predictions_preserve_order_across_sub_batches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({
            "inputs": ["what a goal", "awful defending"],
            "truncate": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            three_class(0.05, 0.15, 0.8),
            three_class(0.9, 0.05, 0.05)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({
            "inputs": ["kickoff at three"],
            "truncate": true
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([three_class(0.1, 0.7, 0.2)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let classifier = HttpSentimentClassifier::new(&server.uri(), options(2)).unwrap();
    let predictions = classifier
        .predict(&texts(&["what a goal", "awful defending", "kickoff at three"]))
        .await
        .expect("should classify");

    let labels: Vec<SentimentLabel> = predictions.iter().map(|p| p.label).collect();
    assert_eq!(
        labels,
        vec![
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral
        ]
    );
    assert!((predictions[0].confidence - 0.8).abs() < 1e-9);
    assert_eq!(predictions[2].scores, [0.1, 0.7, 0.2]);
}

#[tokio::test]
async fn emotion_predictions_keep_top_k() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            { "label": "excitement", "score": 0.55 },
            { "label": "admiration", "score": 0.72 },
            { "label": "joy", "score": 0.31 },
            { "label": "neutral", "score": 0.02 }
        ]])))
        .mount(&server)
        .await;

    let classifier = HttpEmotionClassifier::new(&server.uri(), options(32)).unwrap();
    let predictions = classifier
        .predict(&texts(&["Saka is world class"]), 2)
        .await
        .expect("should classify");

    assert_eq!(predictions.len(), 1);
    let prediction = &predictions[0];
    assert_eq!(prediction.primary_label, "admiration");
    assert_eq!(prediction.top_emotions.len(), 2);
    assert_eq!(prediction.top_emotions[1].label, "excitement");
    assert_eq!(prediction.all_scores.len(), 4);
}

#[tokio::test]
async fn entities_are_grouped_by_label() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_json(json!({ "texts": ["Haaland scored for City", "no names"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entities": [
                { "text": "Haaland", "label": "PERSON" },
                { "text": "City", "label": "ORG" }
            ] },
            { "entities": [] }
        ])))
        .mount(&server)
        .await;

    let extractor = HttpEntityExtractor::new(&server.uri(), options(32)).unwrap();
    let mentions = extractor
        .extract(&texts(&["Haaland scored for City", "no names"]))
        .await
        .expect("should extract");

    assert_eq!(mentions.len(), 2);
    assert_eq!(mentions[0].persons, vec!["Haaland"]);
    assert_eq!(mentions[0].organizations, vec!["City"]);
    assert!(mentions[1].all_entities.is_empty());
}

#[tokio::test]
async fn topic_model_clusters_tei_embeddings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            [1.0, 0.0],
            [0.98, 0.02],
            [0.0, 1.0],
            [0.03, 0.97]
        ])))
        .mount(&server)
        .await;

    let tei = TeiClient::new(&server.uri(), options(32)).unwrap();
    let model = EmbeddingTopicModel::new(
        tei,
        TopicOptions {
            n_topics: 10,
            min_topic_size: 2,
        },
    );
    let assignment = model
        .fit_transform(&texts(&[
            "penalty shootout drama",
            "penalty shootout again",
            "transfer window rumours",
            "transfer window deadline",
        ]))
        .await
        .expect("should cluster");

    assert_eq!(assignment.topic_ids, vec![0, 0, 1, 1]);
    assert_eq!(assignment.probabilities.len(), 4);
    assert_eq!(assignment.summary.len(), 2);
    assert_eq!(assignment.summary[0].count, 2);
}

#[tokio::test]
async fn non_success_status_is_a_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let classifier = HttpSentimentClassifier::new(&server.uri(), options(32)).unwrap();
    let err = classifier
        .predict(&texts(&["model is down"]))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            ProviderError::UnexpectedStatus {
                provider: "sentiment",
                status: 503,
                ..
            }
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn result_count_mismatch_is_a_shape_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "entities": [] }])))
        .mount(&server)
        .await;

    let extractor = HttpEntityExtractor::new(&server.uri(), options(32)).unwrap();
    let err = extractor
        .extract(&texts(&["first text", "second text"]))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            ProviderError::ShapeMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_a_response_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let tei = TeiClient::new(&server.uri(), options(32)).unwrap();
    let err = tei.embed(&texts(&["anything"])).await.unwrap_err();

    assert!(matches!(err, ProviderError::Response { .. }), "got: {err:?}");
}
