//! Quickstart Example
//!
//! Connects to a running ekoDB server, creates a collection and works with a
//! few records.
//!
//! Run with: EKODB_URL=http://localhost:8080 EKODB_API_KEY=... cargo run --example quickstart

use ekodb_rs::*;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = telemetry::init_telemetry(None)?;

    let client = Client::new(ClientConfig::from_env()).await?;
    client.health().await?;
    println!("✅ Connected to {}\n", client.config().trimmed_base_url());

    let collection = "quickstart_users";
    let schema = SchemaBuilder::new()
        .add_field("email", FieldTypeSchemaBuilder::new("String").required().unique().build())
        .add_field("age", FieldTypeSchemaBuilder::new("Integer").range(0, 150).build())
        .build();
    client.create_collection(collection, &schema).await?;

    let mut ada = Record::new();
    ada.insert("name".to_string(), field::string("Ada"));
    ada.insert("email".to_string(), json!("ada@example.com"));
    ada.insert("age".to_string(), field::integer(36));
    let stored = client.insert(collection, ada, InsertOptions::default()).await?;
    let id = stored
        .get("id")
        .and_then(field::get_string_value)
        .unwrap_or_default()
        .to_string();
    println!("📝 Inserted record {}", id);

    let mut changes = Record::new();
    changes.insert("age".to_string(), field::integer(37));
    client
        .update(collection, &id, &changes, UpdateOptions::default())
        .await?;

    let query = QueryBuilder::new().gte("age", 18).sort_asc("name").limit(10).build();
    println!("🔍 Adults:");
    for record in client.find(collection, &query).await? {
        let plain = field::extract_record(&record);
        println!("   {}", serde_json::to_string(&plain)?);
    }

    println!("\nExists before delete: {}", client.exists(collection, &id).await?);
    client.delete(collection, &id, DeleteOptions::default()).await?;
    println!("Exists after delete:  {}", client.exists(collection, &id).await?);

    if let Some(info) = client.rate_limit_info() {
        println!(
            "\n📊 Rate limit: {}/{} remaining ({:.1}%)",
            info.remaining,
            info.limit,
            info.remaining_percentage()
        );
    }

    client.delete_collection(collection).await?;
    Ok(())
}
