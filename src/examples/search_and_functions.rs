//! Search and Saved Functions Example
//!
//! Run with: EKODB_URL=http://localhost:8080 EKODB_API_KEY=... cargo run --example search_and_functions

use ekodb_rs::*;
use serde_json::{json, Map};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = telemetry::init_telemetry(None)?;

    let client = Client::new(ClientConfig::from_env()).await?;
    let collection = "articles";

    let articles = vec![
        ("Ownership", "Every value in Rust has a single owner."),
        ("Borrowing", "References let you use a value without taking ownership."),
        ("Lifetimes", "Lifetimes describe how long references stay valid."),
    ];
    let records = articles
        .into_iter()
        .map(|(title, body)| {
            let mut record = Record::new();
            record.insert("title".to_string(), json!(title));
            record.insert("body".to_string(), json!(body));
            record
        })
        .collect();
    let ids = client
        .batch_insert(collection, records, BatchOptions::default())
        .await?;
    println!("📝 Inserted {} articles\n", ids.len());

    // Full-text search with scores
    let query = SearchQueryBuilder::new("ownership")
        .fields("title,body")
        .fuzzy(true)
        .limit(5)
        .build();
    let response = client.search(collection, &query).await?;
    println!("🔍 {} hits for 'ownership':", response.total);
    for (i, hit) in response.results.iter().enumerate() {
        println!("   {}. {:?} (score: {:.4})", i + 1, hit.record.get("title"), hit.score);
    }

    // Hybrid search with a server-computed embedding
    let vector = client.embed("who owns a value", "text-embedding-3-small").await?;
    let hybrid = client.hybrid_search(collection, "owner", vector, 3).await?;
    println!("\n🧭 Hybrid search returned {} records", hybrid.len());

    // Saved function with a parameter
    let function = SavedFunction::new("titles_only", "Article titles")
        .with_stage(FunctionStage::find_all(collection))
        .with_stage(FunctionStage::project(["title"]));
    let function_id = client.save_function(&function).await?;

    let result = client.call_function("titles_only", Some(Map::new())).await?;
    println!(
        "\n⚙️  {} returned {} records in {}ms",
        function_id,
        result.records.len(),
        result.stats.execution_time_ms
    );

    client.delete_function("titles_only").await?;
    client
        .batch_delete(collection, ids, BatchOptions::default())
        .await?;

    // WebSocket read
    let ws_url = client.config().trimmed_base_url().replacen("http", "ws", 1);
    let mut ws = client.websocket(&ws_url).await?;
    println!("\n📡 {} records over WebSocket", ws.find_all(collection).await?.len());
    ws.close().await?;

    Ok(())
}
