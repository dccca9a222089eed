mod common;

use std::collections::HashSet;

use arboretum::client::{ClientError, Variant};
use arboretum::contract::{api, ErrorResponse};
use arboretum::types::NewTree;
use common::TestServer;
use serde_json::{json, Value};

#[tokio::test]
async fn e2e_catalog_lifecycle() {
    let server = TestServer::start().await;
    let (client, cache, mut notifications) = server.client();

    assert!(client.list_trees().await.unwrap().is_empty());

    let oak = client
        .create_tree(&NewTree::new("Oak", "Yard").with_height(10.0))
        .await
        .unwrap();
    assert!(!oak.is_favorite);
    assert_eq!(oak.scientific_name, None);
    assert_eq!(notifications.recv().await.unwrap().variant, Variant::Default);
    assert!(!cache.contains(api::LIST_TREES.path));

    let cherry = client
        .create_tree(
            &NewTree::new("Japanese Cherry", "Botanical Garden")
                .with_scientific_name("Prunus serrulata")
                .with_height(15.0)
                .with_description("Beautiful pink blossoms in spring.")
                .favorite(true),
        )
        .await
        .unwrap();
    let _ = notifications.recv().await;

    assert_eq!(client.get_tree(oak.id).await.unwrap(), Some(oak.clone()));
    assert_eq!(client.get_tree(cherry.id).await.unwrap(), Some(cherry.clone()));

    let listed = client.list_trees().await.unwrap();
    assert_eq!(listed, vec![oak.clone(), cherry.clone()]);
    assert!(cache.contains(api::LIST_TREES.path));

    client.delete_tree(oak.id).await.unwrap();
    assert_eq!(notifications.recv().await.unwrap().title, "Tree Removed");
    assert_eq!(client.get_tree(oak.id).await.unwrap(), None);
    assert_eq!(client.list_trees().await.unwrap(), vec![cherry]);

    // deleting again is not an error
    client.delete_tree(oak.id).await.unwrap();

    server.stop().await;
}

#[tokio::test]
async fn e2e_ids_are_unique_and_counts_track_deletes() {
    let server = TestServer::start().await;
    let (client, _cache, _rx) = server.client();

    let mut ids = HashSet::new();
    for i in 0..6 {
        let tree = client
            .create_tree(&NewTree::new(format!("Tree {i}"), "Orchard"))
            .await
            .unwrap();
        assert!(ids.insert(tree.id));
    }

    let doomed: Vec<_> = ids.iter().copied().take(2).collect();
    for id in &doomed {
        client.delete_tree(*id).await.unwrap();
    }

    let remaining = client.list_trees().await.unwrap();
    assert_eq!(remaining.len(), 4);
    assert!(remaining.iter().all(|t| !doomed.contains(&t.id)));

    server.stop().await;
}

#[tokio::test]
async fn e2e_invalid_payloads_are_rejected_with_field_messages() {
    let server = TestServer::start().await;
    let (client, _cache, mut notifications) = server.client();

    let err = client
        .create_tree(&NewTree::new("", "Yard"))
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::Validation("commonName is required".into()));
    assert_eq!(
        notifications.recv().await.unwrap().variant,
        Variant::Destructive
    );

    let err = client
        .create_tree(&NewTree::new("Oak", ""))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("location"));

    let err = client
        .create_tree(&NewTree::new("Oak", "Yard").with_height(-4.0))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("height"));

    assert!(client.list_trees().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn e2e_raw_http_matches_the_contract() {
    let server = TestServer::start().await;
    let http = reqwest::Client::new();
    let url = |path: String| server.base_url.join(&path).unwrap();

    let res = http
        .post(url(api::CREATE_TREE.path.to_string()))
        .json(&json!({ "commonName": "Oak", "location": "Yard", "height": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert!(body["id"].is_i64());
    assert_eq!(body["isFavorite"], false);
    assert!(body["scientificName"].is_null());

    let res = http
        .post(url(api::CREATE_TREE.path.to_string()))
        .json(&json!({ "commonName": "", "location": "Yard" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: ErrorResponse = res.json().await.unwrap();
    assert!(error.message.contains("commonName"));

    let res = http
        .get(url(api::GET_TREE.url(&[("id", "999999")])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    let error: ErrorResponse = res.json().await.unwrap();
    assert_eq!(error.message, "Tree not found");

    let res = http
        .delete(url(api::DELETE_TREE.url(&[("id", "999999")])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    server.stop().await;
}
