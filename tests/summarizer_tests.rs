//! Bounded summarization against the filesystem artifact store.

mod common;

use common::mocks::MockLLMClient;
use deep_research::artifacts::{ArtifactKind, ArtifactStore, FsArtifactStore};
use deep_research::summarize::{
    word_count, BoundedSummarizer, LlmCondenser, SummaryMode, NO_CONTENT_SENTINEL,
};
use rstest::rstest;
use std::sync::Arc;
use tempfile::TempDir;

const ARTICLE: &str = "Sodium-ion batteries replace lithium with sodium, an element that is \
    abundant in seawater. Their energy density trails lithium iron phosphate, but costs \
    per kilowatt hour are expected to fall below it by the end of the decade. Several \
    manufacturers announced gigawatt-scale lines in 2024, mostly aimed at stationary \
    storage and two-wheelers.";

fn fs_store() -> (TempDir, Arc<dyn ArtifactStore>) {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
    (dir, store)
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(7)]
#[case(40)]
#[case(10_000)]
#[tokio::test]
async fn test_digest_never_exceeds_budget(#[case] budget: usize) {
    let (_dir, store) = fs_store();
    let summarizer = BoundedSummarizer::new(store.clone());

    let summary = summarizer
        .summarize(ArtifactKind::ScrapeResult, ARTICLE, budget, "web_scrape")
        .await
        .unwrap();

    assert!(word_count(&summary.digest) <= budget);
    assert_eq!(summary.mode, SummaryMode::Truncate);
    assert_eq!(store.read(summary.full_reference.as_str()).await.unwrap(), ARTICLE);
}

#[tokio::test]
async fn test_full_text_lands_on_disk_under_namespace() {
    let (dir, store) = fs_store();
    let summarizer = BoundedSummarizer::new(store);

    let summary = summarizer
        .summarize(ArtifactKind::ScrapeResult, ARTICLE, 5, "web_scrape")
        .await
        .unwrap();

    assert_eq!(summary.digest, "Sodium - ion batteries replace");
    let reference = summary.full_reference.as_str();
    assert!(reference.starts_with("scrape_results/"));
    assert!(reference.ends_with(".txt"));

    let on_disk = std::fs::read_to_string(dir.path().join(reference)).unwrap();
    assert_eq!(on_disk, ARTICLE);
}

#[rstest]
#[case("")]
#[case("   \n\t  ")]
#[tokio::test]
async fn test_empty_content_yields_sentinel(#[case] text: &str) {
    let (_dir, store) = fs_store();
    let summarizer = BoundedSummarizer::new(store.clone());

    let summary = summarizer
        .summarize(ArtifactKind::ScrapeResult, text, 50, "web_scrape")
        .await
        .unwrap();

    assert_eq!(summary.digest, NO_CONTENT_SENTINEL);
    assert_eq!(store.read(summary.full_reference.as_str()).await.unwrap(), text);
}

#[tokio::test]
async fn test_llm_condenser_output_is_bounded() {
    let (_dir, store) = fs_store();
    let llm = Arc::new(MockLLMClient::new(
        "Sodium-ion cells are cheaper than lithium iron phosphate but less energy dense, \
         and large production lines are coming online for grid storage.",
    ));
    let summarizer = BoundedSummarizer::with_condenser(store, Arc::new(LlmCondenser::new(llm)));

    let summary = summarizer
        .summarize(ArtifactKind::ScrapeResult, ARTICLE, 6, "web_scrape")
        .await
        .unwrap();

    assert_eq!(summary.mode, SummaryMode::Abstractive);
    assert_eq!(summary.digest, "Sodium - ion cells are cheaper");
}

#[tokio::test]
async fn test_failing_condenser_falls_back_to_truncation() {
    let (_dir, store) = fs_store();
    let llm = Arc::new(MockLLMClient::failing());
    let summarizer = BoundedSummarizer::with_condenser(store.clone(), Arc::new(LlmCondenser::new(llm)));

    let summary = summarizer
        .summarize(ArtifactKind::SearchResult, ARTICLE, 3, "web_search")
        .await
        .unwrap();

    assert_eq!(summary.mode, SummaryMode::Truncate);
    assert_eq!(summary.digest, "Sodium - ion");
    assert_eq!(store.read(summary.full_reference.as_str()).await.unwrap(), ARTICLE);
}

#[tokio::test]
async fn test_explicit_truncate_mode_skips_condenser() {
    let (_dir, store) = fs_store();
    let llm = Arc::new(MockLLMClient::new("should never be used"));
    let summarizer =
        BoundedSummarizer::with_condenser(store, Arc::new(LlmCondenser::new(llm)));

    let summary = summarizer
        .summarize_with(
            SummaryMode::Truncate,
            ArtifactKind::ScrapeResult,
            ARTICLE,
            4,
            "web_scrape",
        )
        .await
        .unwrap();

    assert_eq!(summary.mode, SummaryMode::Truncate);
    assert!(!summary.digest.contains("never"));
}
