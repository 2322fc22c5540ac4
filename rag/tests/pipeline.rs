mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{
    DownGenerator, ExtractiveGenerator, FlakyEmbedder, GREETING, HashEmbedder, pdf_with_pages,
};
use pdfqa_rag::{
    FixedSizeChunker, INDEX_UNAVAILABLE_MESSAGE, IndexState, IngestionStatus, Rag, RagError,
    RetryConfig, SourceFile,
};
use tempfile::tempdir;

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
    }
}

fn rag_at(dir: &std::path::Path) -> Rag<HashEmbedder, ExtractiveGenerator> {
    Rag::builder(HashEmbedder::default(), ExtractiveGenerator::default())
        .index_dir(dir)
        .retry(fast_retry())
        .build()
        .unwrap()
}

#[tokio::test]
async fn certificate_question_answered_from_pdf() {
    let dir = tempdir().unwrap();
    let rag = rag_at(dir.path());

    let pdf = SourceFile::new("cert.pdf", pdf_with_pages(&["The certificate expires in 2026."]));
    let report = rag.ingest(vec![pdf]).await.unwrap();
    assert_eq!(report.status, IngestionStatus::Complete);
    assert_eq!(report.filenames, ["cert.pdf"]);
    assert_eq!(report.total_chunks, 1);

    let reply = rag.ask("When does the certificate expire?").await.unwrap();
    assert!(reply.contains("2026"), "reply was {reply:?}");
}

#[tokio::test]
async fn asking_before_ingest_returns_sentinel() {
    let dir = tempdir().unwrap();
    let generator = ExtractiveGenerator::default();
    let rag = Rag::builder(HashEmbedder::default(), generator.clone())
        .index_dir(dir.path().join("never-created"))
        .build()
        .unwrap();

    let reply = rag.ask("Anything?").await.unwrap();
    assert_eq!(
        reply,
        "Error: index does not exist. Please ingest documents first."
    );
    assert_eq!(reply, INDEX_UNAVAILABLE_MESSAGE);
    assert!(generator.prompts().is_empty());
    assert_eq!(rag.embedder().calls.load(Ordering::SeqCst), 0);

    assert!(matches!(
        rag.answer("Anything?").await,
        Err(RagError::IndexUnavailable)
    ));
}

#[tokio::test]
async fn reingest_replaces_previous_corpus() {
    let dir = tempdir().unwrap();
    let rag = Rag::builder(HashEmbedder::default(), ExtractiveGenerator::default())
        .index_dir(dir.path())
        .similarity_threshold(-1.0)
        .top_k(10)
        .build()
        .unwrap();

    rag.ingest(vec![
        SourceFile::new("fruit.txt", "apples and oranges"),
        SourceFile::new("veg.txt", "carrots and peas"),
    ])
    .await
    .unwrap();
    assert!(matches!(
        rag.status().unwrap(),
        IndexState::Ready { chunks: 2, .. }
    ));

    let report = rag
        .ingest(vec![SourceFile::new("berries.txt", "cherries and plums")])
        .await
        .unwrap();
    assert_eq!(report.total_chunks, 1);

    let results = rag.search("apples and carrots").await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.iter().all(|r| r.chunk.source_id == "berries.txt"));
}

#[tokio::test]
async fn chunk_totals_follow_formula_and_are_deterministic() {
    let dir = tempdir().unwrap();
    let rag = rag_at(dir.path());
    let chunker = FixedSizeChunker::default();

    let long: String = (0..2_500).map(|i| if i % 7 == 6 { ' ' } else { 'w' }).collect();
    let files = || {
        vec![
            SourceFile::new("long.txt", long.clone()),
            SourceFile::new("pages.pdf", pdf_with_pages(&["first page", "second page"])),
        ]
    };

    let first = rag.ingest(files()).await.unwrap();
    let second = rag.ingest(files()).await.unwrap();

    assert_eq!(first.total_chunks, chunker.chunk_count(2_500) + 2);
    assert_eq!(first.total_chunks, 5);
    assert_eq!(first, second);
}

#[tokio::test]
async fn reopened_index_gives_identical_results() {
    let dir = tempdir().unwrap();
    let question = "which planet has rings";
    let files = vec![
        SourceFile::new("saturn.txt", "Saturn is the planet with the most visible rings."),
        SourceFile::new("mars.txt", "Mars is a red planet with two small moons."),
        SourceFile::new("venus.txt", "Venus has a thick atmosphere and no moons."),
    ];

    let before = {
        let rag = rag_at(dir.path());
        rag.ingest(files).await.unwrap();
        rag.search(question).await.unwrap()
    };

    let reopened = rag_at(dir.path());
    let after = reopened.search(question).await.unwrap();

    assert!(!before.is_empty());
    assert_eq!(before, after);
    assert_eq!(after[0].chunk.source_id, "saturn.txt");
}

#[tokio::test]
async fn search_results_bounded_and_sorted() {
    let dir = tempdir().unwrap();
    let rag = Rag::builder(HashEmbedder::default(), ExtractiveGenerator::default())
        .index_dir(dir.path())
        .top_k(3)
        .similarity_threshold(0.2)
        .build()
        .unwrap();

    let files = (0..8)
        .map(|i| {
            SourceFile::new(
                format!("note{i}.txt"),
                format!("note {i} mentions invoices {} times", "invoice ".repeat(i)),
            )
        })
        .collect();
    rag.ingest(files).await.unwrap();

    let results = rag.search("invoice totals").await.unwrap();
    assert!(results.len() <= 3);
    assert!(results.iter().all(|r| r.score >= 0.2));
    assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn partial_batch_reports_failures() {
    let dir = tempdir().unwrap();
    let rag = rag_at(dir.path());

    let report = rag
        .ingest(vec![
            SourceFile::new("good.pdf", pdf_with_pages(&["valid content"])),
            SourceFile::new("broken.pdf", b"%PDF-1.7 truncated".to_vec()),
            SourceFile::new("table.xlsx", vec![0x50, 0x4b, 0x03, 0x04]),
        ])
        .await
        .unwrap();

    assert_eq!(report.status, IngestionStatus::Partial);
    assert_eq!(report.filenames, ["good.pdf"]);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(failed, ["broken.pdf", "table.xlsx"]);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["status"], "Partially Uploaded");
    assert_eq!(json["total_chunks"], 1);
}

#[tokio::test]
async fn small_talk_reaches_generator_with_empty_context() {
    let dir = tempdir().unwrap();
    let generator = ExtractiveGenerator::default();
    let rag = Rag::builder(HashEmbedder::default(), generator.clone())
        .index_dir(dir.path())
        .build()
        .unwrap();
    rag.ingest(vec![SourceFile::new("manual.txt", "Press the red button to reset.")])
        .await
        .unwrap();

    let answer = rag.answer("Hi").await.unwrap();
    assert!(answer.sources.is_empty());
    assert_eq!(answer.context, "");
    assert_eq!(answer.text, GREETING);
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn transient_embedding_failures_are_retried() {
    let dir = tempdir().unwrap();
    let rag = Rag::builder(FlakyEmbedder::new(2), ExtractiveGenerator::default())
        .index_dir(dir.path())
        .retry(fast_retry())
        .build()
        .unwrap();

    let report = rag
        .ingest(vec![SourceFile::new("a.txt", "retry me")])
        .await
        .unwrap();
    assert_eq!(report.total_chunks, 1);
    assert_eq!(rag.embedder().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_generation_is_provider_unavailable() {
    let dir = tempdir().unwrap();
    let rag = Rag::builder(HashEmbedder::default(), DownGenerator::default())
        .index_dir(dir.path())
        .retry(fast_retry())
        .build()
        .unwrap();
    rag.ingest(vec![SourceFile::new("a.txt", "some text")])
        .await
        .unwrap();

    let err = rag.ask("some text?").await.unwrap_err();
    assert!(matches!(
        err,
        RagError::ProviderUnavailable {
            operation: "generation",
            attempts: 4,
            ..
        }
    ));
    assert_eq!(rag.generator().calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn failed_embedding_keeps_previous_index() {
    let dir = tempdir().unwrap();
    rag_at(dir.path())
        .ingest(vec![SourceFile::new("old.txt", "old corpus")])
        .await
        .unwrap();

    let failing = Rag::builder(FlakyEmbedder::new(usize::MAX), ExtractiveGenerator::default())
        .index_dir(dir.path())
        .retry(RetryConfig::none())
        .build()
        .unwrap();
    let err = failing
        .ingest(vec![SourceFile::new("new.txt", "new corpus")])
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::ProviderUnavailable { .. }));

    let results = rag_at(dir.path()).search("old corpus").await.unwrap();
    assert_eq!(results[0].chunk.source_id, "old.txt");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_ingests_are_serialised() {
    let dir = tempdir().unwrap();
    let rag = rag_at(dir.path());

    let (a, b) = tokio::join!(
        rag.ingest(vec![SourceFile::new("a.txt", "alpha")]),
        rag.ingest(vec![
            SourceFile::new("b.txt", "beta"),
            SourceFile::new("c.txt", "gamma"),
        ]),
    );
    a.unwrap();
    b.unwrap();

    match rag.status().unwrap() {
        IndexState::Ready { chunks, .. } => assert!(chunks == 1 || chunks == 2),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn directory_ingest_uses_relative_names() {
    let data = tempdir().unwrap();
    std::fs::create_dir(data.path().join("reports")).unwrap();
    std::fs::write(
        data.path().join("reports").join("q1.pdf"),
        pdf_with_pages(&["Revenue grew in the first quarter."]),
    )
    .unwrap();
    std::fs::write(data.path().join("readme.md"), "Quarterly reports live here.").unwrap();

    let dir = tempdir().unwrap();
    let report = rag_at(dir.path())
        .ingest_directory(data.path())
        .await
        .unwrap();

    let expected_pdf = std::path::Path::new("reports")
        .join("q1.pdf")
        .to_string_lossy()
        .into_owned();
    assert_eq!(report.filenames, ["readme.md".to_string(), expected_pdf]);
}

#[cfg(unix)]
#[tokio::test]
async fn dangling_entry_in_directory_is_reported() {
    let data = tempdir().unwrap();
    std::fs::write(data.path().join("a.txt"), "alpha notes").unwrap();
    std::os::unix::fs::symlink(data.path().join("missing.pdf"), data.path().join("broken.pdf"))
        .unwrap();

    let dir = tempdir().unwrap();
    let report = rag_at(dir.path())
        .ingest_directory(data.path())
        .await
        .unwrap();

    assert_eq!(report.status, IngestionStatus::Partial);
    assert_eq!(report.filenames, ["a.txt"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].filename, "broken.pdf");
}

#[tokio::test]
async fn unreadable_path_does_not_abort_batch() {
    let data = tempdir().unwrap();
    let good = data.path().join("good.txt");
    std::fs::write(&good, "readable content").unwrap();
    let missing = data.path().join("missing.txt");

    let dir = tempdir().unwrap();
    let rag = rag_at(dir.path());
    let mut skipped = Vec::new();
    let report = rag
        .ingest_paths_with_progress(vec![good, missing.clone()], |progress| {
            if let pdfqa_rag::IngestStage::Skipped { .. } = progress.stage {
                skipped.extend(progress.current_file);
            }
        })
        .await
        .unwrap();

    let missing_name = missing.display().to_string();
    assert_eq!(report.status, IngestionStatus::Partial);
    assert_eq!(report.filenames, ["good.txt"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].filename, missing_name);
    assert_eq!(skipped, [missing_name]);

    let err = rag
        .ingest_paths_with_progress(vec![data.path().join("nope.txt")], |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::IngestionFailed { .. }));
    assert!(matches!(
        rag.status().unwrap(),
        IndexState::Ready { chunks: 1, .. }
    ));
}
