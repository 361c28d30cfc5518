//! Example: Two camera-like event sources aggregated into one "main" record per cycle
//!
//! Writes two event files, replays them through JsonEventSources and prints every output batch.
//! The aggregation mapping and flags can be overridden through FILTER_* variables, e.g.
//!   FILTER_AGGREGATIONS='{"meta.pressure": "max"}' FILTER_FORWARD_UPSTREAM_DATA=false
//!
//! Run with: RUST_LOG=info cargo run --example multi_source_aggregate

use frame_aggregator::prelude::*;
use serde_json::json;
use std::time::Duration;

const CYCLES: usize = 6;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .try_init()
        .ok();

    let temp_dir = tempfile::tempdir()?;
    let events_1 = temp_dir.path().join("events_1.json");
    let events_2 = temp_dir.path().join("events_2.json");

    // ─── Sample data ───
    tokio::fs::write(
        &events_1,
        serde_json::to_vec_pretty(&json!([
            {"id": "1", "sheeps": 4, "states": "open", "temperature": 25.5, "pressure": 1000, "valid": true},
            {"id": "2", "sheeps": 5, "states": "closed", "temperature": 26.0, "pressure": 1100, "valid": true},
            {"id": "3", "sheeps": 3, "states": "open", "temperature": 24.8, "pressure": 950, "valid": false},
            {"id": "4", "sheeps": 6, "states": "closed", "temperature": 25.2, "pressure": 1050, "valid": true}
        ]))?,
    )
    .await?;
    tokio::fs::write(
        &events_2,
        serde_json::to_vec_pretty(&json!([
            {"id": "5", "sheeps": 2, "states": "open", "temperature": 23.0, "pressure": 900, "valid": true},
            {"id": "6", "sheeps": 7, "states": "closed", "temperature": 27.5, "pressure": 1200, "valid": true},
            {"id": "7", "sheeps": 1, "states": "open", "temperature": 22.0, "pressure": 850, "valid": false},
            {"id": "8", "sheeps": 8, "states": "closed", "temperature": 28.0, "pressure": 1300, "valid": true}
        ]))?,
    )
    .await?;

    // ─── Configure: defaults first, environment on top ───
    let mut raw = RawConfig::new().with(
        "aggregations",
        json!({"meta.sheeps": "sum", "meta.states": "distinct", "meta.temperature": "avg"}),
    );
    raw.extend(RawConfig::from_env());
    let aggregator = Aggregator::new().configure(&raw)?;
    println!(
        "=== Configuration ===\n{}\n",
        serde_json::to_string_pretty(aggregator.config())?
    );

    // ─── Run ───
    let runner = CycleRunner::new(std::sync::Arc::new(aggregator), Duration::from_secs(2))
        .with_source(JsonEventSource::load("cam_1", &events_1).await?.with_interval(Duration::from_millis(200)))
        .with_source(JsonEventSource::load("cam_2", &events_2).await?.with_interval(Duration::from_millis(200)));
    let cancel = runner.cancel_token();
    let (sender, mut receiver) = tokio::sync::mpsc::channel::<OutputBatch>(4);
    let handle = tokio::spawn(runner.run(sender));

    let mut seen = 0;
    while let Some(output) = receiver.recv().await {
        seen += 1;
        println!("=== Cycle {seen} ===\n{}\n", serde_json::to_string_pretty(&output)?);
        if seen == CYCLES {
            cancel.cancel();
            break;
        }
    }
    drop(receiver);

    let produced = handle.await?;
    println!("Produced {produced} output batches");
    Ok(())
}
