//! Typed operations: request shapes, encodings and convenience semantics

mod common;

use common::{decode_msgpack, msgpack_response, TestServer};
use ekodb_rs::{
    BatchOptions, ClientError, DeleteOptions, InsertOptions, IsolationLevel, KvEntry,
    QueryBuilder, Record, UpdateOptions, UpsertOptions,
};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, ResponseTemplate};

fn record(value: Value) -> Record {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_insert_uses_msgpack_and_query_params() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/insert/users"))
        .and(header("content-type", "application/msgpack"))
        .and(header("accept", "application/msgpack"))
        .and(query_param("transaction_id", "tx-9"))
        .and(query_param("bypass_ripple", "true"))
        .respond_with(msgpack_response(&json!({"id": "u1", "name": "Ada"})))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let options = InsertOptions {
        ttl: Some("1h".to_string()),
        bypass_ripple: Some(true),
        transaction_id: Some("tx-9".to_string()),
        bypass_cache: None,
    };
    let stored = client
        .insert("users", record(json!({"name": "Ada"})), options)
        .await
        .unwrap();
    assert_eq!(stored["id"], "u1");

    let sent = test.requests_to("/api/insert/users").await;
    let body = decode_msgpack(&sent[0]);
    assert_eq!(body, json!({"name": "Ada", "ttl": "1h"}));
}

#[tokio::test]
async fn test_text_endpoints_use_json() {
    let test = TestServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/collections"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"collections": ["a", "b"]})))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    assert_eq!(client.list_collections().await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_undecodable_response_is_decode_error() {
    let test = TestServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/find/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\":\"msgpack\"}"))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let err = client.find_by_id("users", "u1").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn test_find_sends_query_body() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/find/users"))
        .respond_with(msgpack_response(&json!([{"id": "1"}, {"id": "2"}])))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let query = QueryBuilder::new().gte("age", 18).sort_desc("age").limit(2).build();
    let found = client.find("users", &query).await.unwrap();
    assert_eq!(found.len(), 2);

    let sent = test.requests_to("/api/find/users").await;
    let body = decode_msgpack(&sent[0]);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["filter"]["type"], "Condition");
    assert_eq!(body["filter"]["content"]["operator"], "Gte");
    assert_eq!(body["sort"][0], json!({"field": "age", "ascending": false}));
}

#[tokio::test]
async fn test_exists_maps_404_to_false() {
    let test = TestServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/find/users/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&test.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/find/users/present"))
        .respond_with(msgpack_response(&json!({"id": "present"})))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    assert!(!client.exists("users", "missing").await.unwrap());
    assert!(client.exists("users", "present").await.unwrap());

    let err = client.find_by_id("users", "missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_exists_propagates_other_errors() {
    let test = TestServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/find/users/u1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad id"))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let err = client.exists("users", "u1").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_upsert_falls_back_to_insert() {
    let test = TestServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/update/users/u1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/insert/users"))
        .respond_with(msgpack_response(&json!({"id": "u1", "name": "Ada"})))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let stored = client
        .upsert("users", "u1", record(json!({"name": "Ada"})), UpsertOptions::default())
        .await
        .unwrap();
    assert_eq!(stored["name"], "Ada");

    let sent = test.requests_to("/api/insert/users").await;
    assert_eq!(decode_msgpack(&sent[0])["id"], "u1");
}

#[tokio::test]
async fn test_upsert_does_not_insert_on_other_errors() {
    let test = TestServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/update/users/u1"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/insert/users"))
        .respond_with(msgpack_response(&json!({})))
        .expect(0)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let err = client
        .upsert("users", "u1", Record::new(), UpsertOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn test_update_sends_repeated_projection_params() {
    let test = TestServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/update/users/u1"))
        .respond_with(msgpack_response(&json!({"id": "u1", "name": "Grace"})))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let options = UpdateOptions {
        select_fields: vec!["name".to_string(), "email".to_string()],
        ..Default::default()
    };
    client
        .update("users", "u1", &record(json!({"name": "Grace"})), options)
        .await
        .unwrap();

    let sent = test.requests_to("/api/update/users/u1").await;
    assert_eq!(sent[0].url.query(), Some("select_fields=name&select_fields=email"));
}

#[tokio::test]
async fn test_projection_lookup_with_no_match_is_not_found() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/find/users"))
        .respond_with(msgpack_response(&Vec::<Value>::new()))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let err = client
        .find_by_id_with_projection("users", "ghost", &["name".to_string()], &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let sent = test.requests_to("/api/find/users").await;
    let body = decode_msgpack(&sent[0]);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["select_fields"], json!(["name"]));
}

#[tokio::test]
async fn test_batch_operations() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/insert/users"))
        .and(query_param("transaction_id", "tx-1"))
        .respond_with(msgpack_response(&json!({"successful": ["a", "b"], "failed": []})))
        .mount(&test.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/batch/delete/users"))
        .respond_with(msgpack_response(&json!({"successful": ["a", "b", "c"]})))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let options = BatchOptions {
        bypass_ripple: Some(true),
        transaction_id: Some("tx-1".to_string()),
    };
    let ids = client
        .batch_insert(
            "users",
            vec![record(json!({"n": 1})), record(json!({"n": 2}))],
            options,
        )
        .await
        .unwrap();
    assert_eq!(ids, vec!["a", "b"]);

    let sent = test.requests_to("/api/batch/insert/users").await;
    let body = decode_msgpack(&sent[0]);
    assert_eq!(body["inserts"][0], json!({"data": {"n": 1}, "bypass_ripple": true}));

    let removed = client
        .batch_delete(
            "users",
            vec!["a".into(), "b".into(), "c".into()],
            BatchOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(removed, 3);
}

#[tokio::test]
async fn test_delete_with_empty_response_body() {
    let test = TestServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/delete/users/u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    client
        .delete("users", "u1", DeleteOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_paginate_rejects_zero_without_request() {
    let test = TestServer::start().await;
    let client = test.client().await;

    let err = client.paginate("users", 0, 10).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    let err = client.paginate("users", 1, 0).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    let err = client.paginate("users", usize::MAX, 2).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));

    assert!(test.requests_to("/api/find/users").await.is_empty());
}

#[tokio::test]
async fn test_paginate_is_one_indexed() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/find/users"))
        .respond_with(msgpack_response(&Vec::<Value>::new()))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    client.paginate("users", 3, 20).await.unwrap();

    let sent = test.requests_to("/api/find/users").await;
    let body = decode_msgpack(&sent[0]);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["skip"], 40);
}

#[tokio::test]
async fn test_kv_operations() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/kv/set/session%3A1"))
        .and(body_json(json!({"value": {"user": "ada"}, "ttl": 60})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/kv/get/session%3A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": {"user": "ada"}})))
        .mount(&test.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/kv/get/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/kv/batch/set"))
        .and(body_json(json!({"keys": ["a", "b"], "values": [1, 2], "ttl": 30})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([true, true])))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    client
        .kv_set_with_ttl("session:1", json!({"user": "ada"}), 60)
        .await
        .unwrap();
    assert_eq!(
        client.kv_get("session:1").await.unwrap(),
        json!({"user": "ada"})
    );
    assert!(client.kv_exists("session:1").await.unwrap());
    assert!(!client.kv_exists("gone").await.unwrap());

    let entries = vec![
        KvEntry::new("a", json!(1)),
        KvEntry::new("b", json!(2)).with_ttl(30),
    ];
    assert_eq!(client.kv_batch_set(&entries).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_transaction_lifecycle() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transactions"))
        .and(body_json(json!({"isolation_level": "Serializable"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"transaction_id": "tx-42"})))
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transactions/tx-42/commit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let level: IsolationLevel = "SERIALIZABLE".parse().unwrap();
    let tx = client.begin_transaction(level).await.unwrap();
    assert_eq!(tx, "tx-42");
    client.commit_transaction(&tx).await.unwrap();

    let bad: Result<IsolationLevel, _> = "SNAPSHOT".parse();
    let err: ClientError = bad.unwrap_err().into();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_call_function_sends_empty_object_without_params() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/functions/top_users"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"name": "Ada"}],
            "stats": {"input_count": 0, "output_count": 1, "execution_time_ms": 3, "stages_executed": 1, "stage_stats": []}
        })))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let result = client.call_function("top_users", None).await.unwrap();
    assert_eq!(result.records[0]["name"], "Ada");
}

#[tokio::test]
async fn test_call_function_forwards_params() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/functions/by_age"))
        .and(body_json(json!({"min_age": 30})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let mut params = Map::new();
    params.insert("min_age".to_string(), json!(30));
    let result = client.call_function("by_age", Some(params)).await.unwrap();
    assert!(result.records.is_empty());
}

#[tokio::test]
async fn test_embed_cleans_up_temporary_resources() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/api/insert/embed_temp_[0-9a-f]+$"))
        .respond_with(msgpack_response(&json!({"id": "tmp"})))
        .expect(1)
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/functions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "fn-1"})))
        .expect(1)
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/functions/fn-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"text": "hello", "embedding": [0.25, 0.5, 1.0]}]
        })))
        .expect(1)
        .mount(&test.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/functions/fn-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/collections/embed_temp_[0-9a-f]+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let vector = client.embed("hello", "text-embedding-3-small").await.unwrap();
    assert_eq!(vector, vec![0.25, 0.5, 1.0]);

    let saved = test.requests_to("/api/functions").await;
    let function: Value = serde_json::from_slice(&saved[0].body).unwrap();
    assert_eq!(function["pipeline"][0]["type"], "FindAll");
    assert_eq!(function["pipeline"][1]["type"], "Embed");
    assert_eq!(function["pipeline"][1]["model"], "text-embedding-3-small");
}

#[tokio::test]
async fn test_embed_removes_collection_when_function_call_fails() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/api/insert/embed_temp_[0-9a-f]+$"))
        .respond_with(msgpack_response(&json!({"id": "tmp"})))
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/functions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "fn-2"})))
        .mount(&test.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/functions/fn-2"))
        .respond_with(ResponseTemplate::new(400).set_body_string("no model"))
        .mount(&test.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/functions/fn-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/collections/embed_temp_[0-9a-f]+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let err = client.embed("hello", "m").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_health() {
    let test = TestServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_restore_collection_returns_count() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/trash/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "restored", "collection": "users", "records_restored": 7
        })))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    assert_eq!(client.restore_collection("users").await.unwrap(), 7);
}

#[tokio::test]
async fn test_text_search_returns_records() {
    let test = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/articles"))
        .and(body_json(json!({"query": "rust", "limit": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"record": {"title": "Ownership"}, "score": 0.9, "matched_fields": ["title"]}],
            "total": 1
        })))
        .mount(&test.server)
        .await;

    let client = test.client().await;
    let records = client.text_search("articles", "rust", 5).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["title"], "Ownership");
}

#[tokio::test]
async fn test_toggle_forgotten_uses_patch() {
    let test = TestServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/chat/s1/messages/m1/forgotten"))
        .and(body_json(json!({"forgotten": true})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.server)
        .await;

    let client = test.client().await;
    client
        .toggle_forgotten_message("s1", "m1", true)
        .await
        .unwrap();
}

#[test]
fn test_core_modules_are_reachable_through_the_client_crate() {
    let list = ekodb_rs::chat::ListQuery {
        limit: Some(5),
        ..Default::default()
    };
    assert_eq!(list.query_pairs(), vec![("limit", "5".to_string())]);

    let query = ekodb_rs::search::SearchQueryBuilder::new("rust").build();
    assert_eq!(query.query, "rust");

    let stage = ekodb_rs::functions::FunctionStage::find_all("users");
    assert_eq!(serde_json::to_value(&stage).unwrap()["type"], "FindAll");
}
