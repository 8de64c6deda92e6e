mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

fn avatar_part(bytes: &[u8], file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("valid mime")
}

#[tokio::test]
async fn uploaded_avatar_is_stored_and_served() -> Result<()> {
    let server = common::spawn_server().await?;

    let form = Form::new()
        .text("name", "Alice")
        .text("favorite", "true")
        .part("avatarFile", avatar_part(PNG_BYTES, "alice.png", "image/png"));
    let res = server.client.post(server.url("/api/v1/contacts")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let contact = res.json::<Value>().await?["data"]["contact"].clone();
    assert_eq!(contact["favorite"], true);
    let avatar = contact["avatar"].as_str().expect("avatar path").to_string();
    assert!(avatar.starts_with("/public/uploads/") && avatar.ends_with(".png"), "avatar {}", avatar);

    let res = server.client.get(server.url(&avatar)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await?.as_ref(), PNG_BYTES);
    Ok(())
}

#[tokio::test]
async fn update_replaces_avatar_reference() -> Result<()> {
    let server = common::spawn_server().await?;
    let created = server.create(serde_json::json!({ "name": "Bob" })).await?;
    assert!(created["avatar"].is_null());

    let form = Form::new().part("avatar", avatar_part(PNG_BYTES, "bob.jpg", "image/jpeg"));
    let res = server
        .client
        .put(server.url(&format!("/api/v1/contacts/{}", created["id"])))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let contact = res.json::<Value>().await?["data"]["contact"].clone();
    assert_eq!(contact["name"], "Bob");
    assert!(contact["avatar"].as_str().unwrap_or_default().ends_with(".jpg"));
    assert_eq!(server.uploaded_files(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_create_leaves_no_file_behind() -> Result<()> {
    let server = common::spawn_server().await?;

    // No name: the avatar is stored during extraction, then rejected with the request
    let form = Form::new().part("avatarFile", avatar_part(PNG_BYTES, "ghost.png", "image/png"));
    let res = server.client.post(server.url("/api/v1/contacts")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Name is required");

    assert_eq!(server.uploaded_files(), 0);
    Ok(())
}

#[tokio::test]
async fn update_of_missing_contact_discards_upload() -> Result<()> {
    let server = common::spawn_server().await?;

    let form = Form::new().part("avatarFile", avatar_part(PNG_BYTES, "ghost.png", "image/png"));
    let res = server.client.put(server.url("/api/v1/contacts/999")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.uploaded_files(), 0);
    Ok(())
}

#[tokio::test]
async fn non_image_uploads_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    let form = Form::new()
        .text("name", "Mallory")
        .part("avatarFile", avatar_part(b"#!/bin/sh\necho hi\n", "run.sh", "text/x-shellscript"));
    let res = server.client.post(server.url("/api/v1/contacts")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["status"], "fail");
    assert_eq!(server.uploaded_files(), 0);
    Ok(())
}

#[tokio::test]
async fn only_one_file_is_accepted() -> Result<()> {
    let server = common::spawn_server().await?;

    let form = Form::new()
        .text("name", "Twin")
        .part("avatarFile", avatar_part(PNG_BYTES, "one.png", "image/png"))
        .part("avatar", avatar_part(PNG_BYTES, "two.png", "image/png"));
    let res = server.client.post(server.url("/api/v1/contacts")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.uploaded_files(), 0);
    Ok(())
}
