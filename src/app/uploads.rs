use std::path::Path as FsPath;

use anyhow::Context as _;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use serde_json::json;

use super::response::{ApiError, ApiResult, with_status};
use super::state::AppState;
use crate::model::{CatalogEntry, new_id};

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];

/// Stores an uploaded dish photo and creates a curated catalog entry for it.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Response> {
    let mut title = String::new();
    let mut description = String::new();
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("image") => {
                let name = field.file_name().map(sanitize_file_name).unwrap_or_default();
                if !has_allowed_extension(&name) {
                    return Err(ApiError::bad_request(
                        "Only .jpeg, .jpg and .png images are allowed",
                    ));
                }
                image = Some((name, field.bytes().await?));
            }
            Some("title") => title = field.text().await?.trim().to_owned(),
            Some("description") => description = field.text().await?.trim().to_owned(),
            _ => {}
        }
    }

    let Some((name, bytes)) = image else {
        return Err(ApiError::bad_request("Image file is required"));
    };
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }

    let file_name = format!("{}-{name}", Utc::now().timestamp_millis());
    tokio::fs::create_dir_all(&state.images_dir)
        .await
        .with_context(|| format!("create images dir: {}", state.images_dir.display()))?;
    let path = state.images_dir.join(&file_name);
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("write image: {}", path.display()))?;

    let entry = CatalogEntry {
        id: new_id(),
        title,
        description,
        image_url: format!("/images/{file_name}"),
        likes: 0,
        created_at: Utc::now(),
    };
    state.store.insert_catalog_entry(&entry).await?;
    tracing::info!(entry_id = %entry.id, file = %file_name, bytes = bytes.len(), "image uploaded");

    with_status(StatusCode::CREATED, json!({ "data": entry }))
}

/// Keeps only the final path component and replaces anything outside
/// `[A-Za-z0-9._-]`.
fn sanitize_file_name(raw: &str) -> String {
    let base = FsPath::new(raw.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn has_allowed_extension(name: &str) -> bool {
    FsPath::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}
