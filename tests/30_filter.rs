mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn list(server: &common::TestServer, query: &str) -> Result<(StatusCode, Value)> {
    let res = server
        .client
        .get(server.url(&format!("/api/v1/contacts{}", query)))
        .send()
        .await?;
    Ok((res.status(), res.json::<Value>().await?))
}

async fn seed(server: &common::TestServer) -> Result<()> {
    let people = [
        ("Alice Anders", true),
        ("Bob Brown", false),
        ("Carol Alvarez", true),
        ("Dave Davis", false),
        ("Eve Evans", false),
        ("Frank Alba", true),
        ("Grace Green", false),
    ];
    for (name, favorite) in people {
        server.create(json!({ "name": name, "favorite": favorite })).await?;
    }
    Ok(())
}

#[tokio::test]
async fn default_page_is_five_ordered_by_id() -> Result<()> {
    let server = common::spawn_server().await?;
    seed(&server).await?;

    let (status, body) = list(&server, "").await?;
    assert_eq!(status, StatusCode::OK);

    let contacts = body["data"]["contacts"].as_array().cloned().unwrap_or_default();
    assert_eq!(contacts.len(), 5);
    let ids: Vec<i64> = contacts.iter().filter_map(|c| c["id"].as_i64()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "not ordered by id: {:?}", ids);

    assert_eq!(
        body["data"]["metadata"],
        json!({ "totalRecords": 7, "firstPage": 1, "lastPage": 2, "page": 1, "limit": 5 })
    );
    Ok(())
}

#[tokio::test]
async fn second_page_holds_the_rest() -> Result<()> {
    let server = common::spawn_server().await?;
    seed(&server).await?;

    let (_, body) = list(&server, "?page=2&limit=5").await?;
    let contacts = body["data"]["contacts"].as_array().cloned().unwrap_or_default();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0]["name"], "Frank Alba");
    assert_eq!(body["data"]["metadata"]["page"], 2);
    Ok(())
}

#[tokio::test]
async fn name_filter_is_case_insensitive_substring() -> Result<()> {
    let server = common::spawn_server().await?;
    seed(&server).await?;

    let (_, body) = list(&server, "?name=AL").await?;
    let names: Vec<&str> = body["data"]["contacts"]
        .as_array()
        .map(|a| a.iter().filter_map(|c| c["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Alice Anders", "Carol Alvarez", "Frank Alba"]);
    assert_eq!(body["data"]["metadata"]["totalRecords"], 3);
    Ok(())
}

#[tokio::test]
async fn favorite_filter_matches_exactly() -> Result<()> {
    let server = common::spawn_server().await?;
    seed(&server).await?;

    let (_, body) = list(&server, "?favorite=true&limit=10").await?;
    let contacts = body["data"]["contacts"].as_array().cloned().unwrap_or_default();
    assert_eq!(contacts.len(), 3);
    assert!(contacts.iter().all(|c| c["favorite"] == true));

    let (_, body) = list(&server, "?favorite=false&name=e").await?;
    let contacts = body["data"]["contacts"].as_array().cloned().unwrap_or_default();
    assert!(contacts.iter().all(|c| c["favorite"] == false));
    assert_eq!(body["data"]["metadata"]["totalRecords"], 3);
    Ok(())
}

#[tokio::test]
async fn empty_store_reports_one_page() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = list(&server, "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "contacts": [],
            "metadata": { "totalRecords": 0, "firstPage": 1, "lastPage": 1, "page": 1, "limit": 5 }
        })
    );
    Ok(())
}

#[tokio::test]
async fn invalid_paging_values_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    for query in ["?page=0", "?page=abc", "?limit=-1", "?favorite=perhaps"] {
        let (status, body) = list(&server, query).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
        assert_eq!(body["status"], "fail");
    }
    Ok(())
}
