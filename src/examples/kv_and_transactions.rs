//! Key-Value and Transactions Example
//!
//! Run with: EKODB_URL=http://localhost:8080 EKODB_API_KEY=... cargo run --example kv_and_transactions

use ekodb_rs::*;
use serde_json::json;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = telemetry::init_telemetry(Some(Path::new("./logs")))?;

    let client = Client::new(ClientConfig::from_env().with_retries(true, 5)).await?;

    // Key-value store
    client
        .kv_set_with_ttl("session:42", json!({"user": "ada", "role": "admin"}), 300)
        .await?;
    println!("🔑 session:42 = {}", client.kv_get("session:42").await?);

    let entries = vec![
        KvEntry::new("counter:a", json!(1)).with_ttl(60),
        KvEntry::new("counter:b", json!(2)),
    ];
    client.kv_batch_set(&entries).await?;
    for entry in client.kv_find(Some("counter:.*"), false).await? {
        println!("   found {:?}", entry.get("key"));
    }

    client
        .kv_batch_delete(vec!["counter:a".into(), "counter:b".into()])
        .await?;
    client.kv_delete("session:42").await?;
    println!("   session:42 still there: {}\n", client.kv_exists("session:42").await?);

    // Transactions
    let level: IsolationLevel = "READ_COMMITTED".parse()?;
    let tx = client.begin_transaction(level).await?;
    println!("💳 Transaction {} started", tx);

    let options = InsertOptions {
        transaction_id: Some(tx.clone()),
        ..Default::default()
    };
    let mut transfer = Record::new();
    transfer.insert("amount".to_string(), field::decimal("125.50"));
    transfer.insert("at".to_string(), field::date_time(chrono::Utc::now()));

    match client.insert("transfers", transfer, options).await {
        Ok(_) => {
            client.commit_transaction(&tx).await?;
            println!("   committed");
        }
        Err(err) => {
            println!("   insert failed ({}), rolling back", err);
            client.rollback_transaction(&tx).await?;
        }
    }

    Ok(())
}
