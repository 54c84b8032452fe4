//! Raw sheet access: read, overwrite and append cell values.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::sheets::Rows;

/// Range used when the query has none.
pub const DEFAULT_RANGE: &str = "Sheet1!A1:Z1000";

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValuesResponse {
    pub values: Rows,
}

/// Body of both write endpoints. Fields are optional so that a missing one
/// is reported as a 400 rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub range: Option<String>,
    pub values: Option<Rows>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn parse_write(
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> Result<(String, Rows), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    match (request.range, request.values) {
        (Some(range), Some(values)) if !range.is_empty() => Ok((range, values)),
        _ => Err(ApiError::BadRequest(
            "Range and values are required".to_string(),
        )),
    }
}

pub async fn get_values(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ValuesResponse>, ApiError> {
    let range = params
        .range
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_RANGE.to_string());

    let values = state.store.get(&range).await.map_err(|e| {
        tracing::error!("Fetching {} failed: {}", range, e);
        ApiError::Internal("Failed to fetch data from the sheet".to_string())
    })?;

    Ok(Json(ValuesResponse { values }))
}

pub async fn update_values(
    State(state): State<AppState>,
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (range, values) = parse_write(payload)?;

    state.store.update(&range, values).await.map_err(|e| {
        tracing::error!("Updating {} failed: {}", range, e);
        ApiError::Internal("Failed to update data in the sheet".to_string())
    })?;

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn append_values(
    State(state): State<AppState>,
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (range, values) = parse_write(payload)?;

    state.store.append(&range, values).await.map_err(|e| {
        tracing::error!("Appending to {} failed: {}", range, e);
        ApiError::Internal("Failed to append data to the sheet".to_string())
    })?;

    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{app, get_json, post_json, send};
    use crate::models::Hand;
    use crate::sheets::testing::FlakySheet;
    use crate::sheets::{MemorySheet, SheetStore};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_get_values() {
        let sheet = MemorySheet::with_rows("Sheet1", vec![row(&["a", "b"]), row(&["c"])]);
        let (app, _) = app(Arc::new(sheet), Hand::Rock);

        let (status, json) = get_json(app, "/sheets?range=Sheet1!A1:B2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "values": [["a", "b"], ["c"]] }));
    }

    #[tokio::test]
    async fn test_get_values_default_range() {
        let sheet = MemorySheet::with_rows("Sheet1", vec![row(&["x"])]);
        let (app, _) = app(Arc::new(sheet), Hand::Rock);

        let (status, json) = get_json(app, "/sheets").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["values"][0][0], "x");
    }

    #[tokio::test]
    async fn test_get_values_empty_sheet() {
        let (app, _) = app(Arc::new(MemorySheet::new()), Hand::Rock);
        let (status, json) = get_json(app, "/sheets?range=sheet1!A1:E1000").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "values": [] }));
    }

    #[tokio::test]
    async fn test_get_values_upstream_failure() {
        let store = Arc::new(FlakySheet::default());
        store.fail_reads(true);
        let (app, _) = app(store, Hand::Rock);

        let (status, json) = get_json(app, "/sheets?range=Sheet1!A1:B2").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_update_values() {
        let store = Arc::new(MemorySheet::new());
        let (app, _) = app(store.clone(), Hand::Rock);

        let (status, json) = post_json(
            app,
            "/sheets",
            json!({ "range": "Sheet1!A1:B1", "values": [["h1", "h2"]] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "success": true }));
        assert_eq!(
            store.get("Sheet1!A1:B1").await.unwrap(),
            vec![row(&["h1", "h2"])]
        );
    }

    #[tokio::test]
    async fn test_append_values() {
        let store = Arc::new(MemorySheet::with_rows("Sheet1", vec![row(&["first"])]));
        let (app, _) = app(store.clone(), Hand::Rock);

        let (status, _) = post_json(
            app,
            "/sheets/append",
            json!({ "range": "Sheet1!A:E", "values": [["second"]] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            store.get("Sheet1!A1:A5").await.unwrap(),
            vec![row(&["first"]), row(&["second"])]
        );
    }

    #[tokio::test]
    async fn test_write_requires_range_and_values() {
        let store = Arc::new(FlakySheet::default());
        let (app, _) = app(store.clone(), Hand::Rock);

        let bodies = [
            json!({ "values": [["a"]] }),
            json!({ "range": "Sheet1!A1" }),
            json!({ "range": "", "values": [["a"]] }),
        ];
        for body in bodies {
            let (status, json) = post_json(app.clone(), "/sheets", body.clone()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"]["code"], "BAD_REQUEST");

            let (status, _) = post_json(app.clone(), "/sheets/append", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        assert_eq!(store.append_calls(), 0);
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_write_rejects_malformed_json() {
        let (app, _) = app(Arc::new(MemorySheet::new()), Hand::Rock);
        let request = Request::builder()
            .method("POST")
            .uri("/sheets/append")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_write_past_row_limit_is_error_response() {
        let store = Arc::new(MemorySheet::new());
        let (app, _) = app(store.clone(), Hand::Rock);

        for uri in ["/sheets", "/sheets/append"] {
            let (status, json) = post_json(
                app.clone(),
                uri,
                json!({ "range": "Sheet1!A18446744073709551615", "values": [["x"]] }),
            )
            .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        }

        assert!(store.get("Sheet1!A1:E10").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_upstream_failure() {
        let store = Arc::new(FlakySheet::default());
        store.fail_writes(true);
        let (app, _) = app(store, Hand::Rock);

        let (status, _) = post_json(
            app,
            "/sheets/append",
            json!({ "range": "Sheet1!A:E", "values": [["x"]] }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
