use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["terrace"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_analyze_with_output() {
    let cli = Cli::try_parse_from(["terrace", "analyze", "batch.json", "-o", "snap.json"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            ref input,
            output: Some(ref out),
        }) if input.as_path() == Path::new("batch.json") && out.as_path() == Path::new("snap.json")
    ));
}

#[test]
fn analyze_output_defaults_to_stdout() {
    let cli = Cli::try_parse_from(["terrace", "analyze", "batch.json"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { output: None, .. })
    ));
}

#[test]
fn search_defaults() {
    let cli = Cli::try_parse_from(["terrace", "search", "snap.json"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            query: None,
            sentiment: None,
            emotion: None,
            limit: 10,
            ..
        })
    ));
}

#[test]
fn search_parses_filters() {
    let cli = Cli::try_parse_from([
        "terrace",
        "search",
        "snap.json",
        "--query",
        "penalty",
        "--sentiment",
        "Negative",
        "--emotion",
        "anger",
        "--min-intensity",
        "0.4",
        "--limit",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            query: Some(ref q),
            sentiment: Some(SentimentLabel::Negative),
            emotion: Some(ref e),
            limit: 5,
            ..
        }) if q == "penalty" && e == "anger"
    ));
}

#[test]
fn search_rejects_unknown_sentiment() {
    let result = Cli::try_parse_from(["terrace", "search", "snap.json", "--sentiment", "smug"]);
    assert!(result.is_err());
}

#[test]
fn stats_and_topics_take_a_snapshot_path() {
    let cli = Cli::try_parse_from(["terrace", "stats", "snap.json"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Stats { .. })));

    let cli = Cli::try_parse_from(["terrace", "topics", "snap.json"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Topics { .. })));
}

#[test]
fn truncate_text_marks_cut() {
    assert_eq!(report::truncate_text("short", 10), "short");
    assert_eq!(report::truncate_text("abcdefghijkl", 8), "abcde...");
}

#[test]
fn load_snapshot_rejects_missing_file() {
    let Err(err) = load_snapshot(Path::new("/nonexistent/terrace-snapshot.json")) else {
        panic!("missing file should not load");
    };
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn empty_snapshot_is_not_ready_for_queries() {
    let path = std::env::temp_dir().join(format!("terrace-empty-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{
            "version": 1,
            "batch_id": "00000000-0000-0000-0000-000000000000",
            "completed_at": "2024-01-01T00:00:00Z",
            "comments": [],
            "topics": [],
            "skipped_records": 3
        }"#,
    )
    .unwrap();

    let session = load_snapshot(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        session.search(&SearchQuery::default()),
        Err(terrace_engine::EngineError::NotReady)
    ));
    assert!(matches!(
        session.statistics(),
        Err(terrace_engine::EngineError::NotReady)
    ));
    assert!(matches!(
        session.topics(),
        Err(terrace_engine::EngineError::NotReady)
    ));
}
