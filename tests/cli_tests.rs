use std::sync::Arc;

use toolcall::cli::{simulate, summarize, SimulateOptions};
use toolcall::{
    CatalogFormatter, MemoryStore, MessageText, SerializedToolInvocation, Settings, SnapshotStore,
};

#[tokio::test]
async fn simulate_auto_confirmed_run() -> anyhow::Result<()> {
    let options = SimulateOptions {
        steps: 2,
        result_message: Some("Echoed twice".to_string()),
        ..SimulateOptions::default()
    };
    let report = simulate(options, Arc::new(CatalogFormatter::default())).await?;

    assert_eq!(report.progress.len(), 2);
    assert_eq!(report.progress[1].progress, 2.0);
    assert!(report.snapshot.is_complete);
    assert_eq!(report.snapshot.is_confirmed, Some(true));
    assert_eq!(
        report.snapshot.past_tense_message,
        Some(MessageText::plain("Echoed twice"))
    );
    Ok(())
}

#[tokio::test]
async fn simulate_denied_run_skips_work() -> anyhow::Result<()> {
    let options = SimulateOptions {
        confirmation: Some("Run echo?".to_string()),
        deny: true,
        ..SimulateOptions::default()
    };
    let report = simulate(options, Arc::new(CatalogFormatter::default())).await?;

    assert!(report.progress.is_empty());
    assert_eq!(report.snapshot.is_confirmed, Some(false));
    assert!(report.snapshot.is_complete);
    assert_eq!(
        report.snapshot.past_tense_message,
        Some(MessageText::plain("Skipped \"Echo\""))
    );
    Ok(())
}

#[tokio::test]
async fn inspect_summarizes_stored_snapshot() -> anyhow::Result<()> {
    let report = simulate(
        SimulateOptions::default(),
        Arc::new(CatalogFormatter::default()),
    )
    .await?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, report.snapshot.to_json_string(true)?)?;

    let restored = SerializedToolInvocation::from_json_str(&std::fs::read_to_string(&path)?)?;
    let summary = summarize(&restored);
    assert!(summary.contains("call-1"));
    assert!(summary.contains("confirmed / complete"));
    assert!(summary.contains("Ran \"Echo\""));
    assert!(summary.contains("completed 3 steps"));
    Ok(())
}

#[tokio::test]
async fn simulate_records_under_configured_prefix() -> anyhow::Result<()> {
    std::env::set_var("TOOLCALL_TRANSCRIPT_PREFIX", "cli-audit");
    let settings = Settings::from_env();
    std::env::remove_var("TOOLCALL_TRANSCRIPT_PREFIX");
    assert_eq!(settings.transcript_prefix, "cli-audit");

    let store = Arc::new(MemoryStore::new());
    let transcript = settings.transcript(store.clone());
    let options = SimulateOptions {
        tool_call_id: "call-9".to_string(),
        transcript: Some(transcript.clone()),
        ..SimulateOptions::default()
    };
    let report = simulate(options, settings.formatter()).await?;

    assert_eq!(store.keys("").await?, vec!["cli-audit:call-9".to_string()]);
    let recorded = transcript.load("call-9").await?.expect("recorded");
    assert_eq!(recorded, report.snapshot);
    Ok(())
}
