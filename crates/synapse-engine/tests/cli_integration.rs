//! Integration tests that invoke a real LLM command-line tool.
//!
//! These tests are `#[ignore]` by default. They need the `claude` CLI on PATH
//! with working credentials.
//!
//! Run explicitly with:
//! ```bash
//! cargo test -p synapse-engine --test cli_integration -- --ignored
//! ```

use std::time::Duration;

use synapse_engine::llm_cli::{check_cli_available, LlmCliConfig};
use synapse_engine::{CliReasoner, Reasoner};

fn config() -> LlmCliConfig {
    LlmCliConfig {
        timeout: Duration::from_secs(30),
        ..LlmCliConfig::default()
    }
}

#[tokio::test]
#[ignore]
async fn cli_is_available() {
    assert!(
        check_cli_available(&config().command).await,
        "LLM CLI not found on PATH"
    );
}

/// Catches output-format drift that would otherwise only show up as
/// fallback options in production.
#[tokio::test]
#[ignore]
async fn cli_options_are_parseable() {
    if !check_cli_available(&config().command).await {
        eprintln!("Skipping: LLM CLI not available");
        return;
    }

    let reasoner = CliReasoner::new(config());
    let options = reasoner
        .suggest_options(
            "Major accident on Highway 1 affects 5 active deliveries",
            "proactive_rerouting plan for a traffic disruption affecting 5 deliveries",
        )
        .await
        .expect("options call failed");

    assert!((2..=3).contains(&options.len()));
    for option in &options {
        assert!(!option.label.is_empty());
        assert!(!option.action_tag.is_empty());
    }
}

#[tokio::test]
#[ignore]
async fn cli_explanation_is_bounded() {
    if !check_cli_available(&config().command).await {
        eprintln!("Skipping: LLM CLI not available");
        return;
    }

    let reasoner = CliReasoner::new(config());
    let text = reasoner
        .explain(
            "Heavy rain downtown",
            "innovation_focused plan for a environmental affecting 2 deliveries",
        )
        .await
        .expect("explanation call failed");

    assert!(!text.trim().is_empty());
    assert!(text.split_whitespace().count() <= 100);
}
