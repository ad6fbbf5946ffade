//! HTTP handlers and response envelopes.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ExtractError;
use crate::grocery::{GroceryStore, ItemUpdate};
use crate::orchestrator::Extractor;
use crate::payment::{PaymentClient, PaymentError};
use crate::schema::{ExtractBody, ExtractionRequest, ExtractionResult, GroceryItem, Ingredient};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    pub payments: Arc<PaymentClient>,
    pub groceries: GroceryStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract-ingredients", post(extract_ingredients))
        .route("/verify-payment", post(verify_payment))
        .route("/grocery-list", get(list_groceries).post(add_groceries))
        .route("/grocery-list/clear-completed", post(clear_completed))
        .route("/grocery-list/:id", patch(update_grocery).delete(delete_grocery))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // base64 photos
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Last-resort 500 for a handler that panicked.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", details);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "details": details })),
    )
        .into_response()
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}

/// Extract a shopping list from recipe text or a photo.
pub async fn extract_ingredients(
    State(state): State<AppState>,
    payload: Result<Json<ExtractBody>, JsonRejection>,
) -> Result<Json<ExtractionResult>, ExtractError> {
    let Json(body) = payload.map_err(|e| {
        warn!("Rejected extraction body: {}", e);
        ExtractError::BadRequest("Invalid JSON in request body".to_string())
    })?;
    let request = ExtractionRequest::try_from(body)?;

    match state.extractor.extract(&request).await {
        Ok(result) => {
            info!(
                "Extracted {} ingredients via {}",
                result.ingredients.len(),
                result.analysis_method
            );
            Ok(Json(result))
        }
        Err(e) => {
            error!("Extraction failed ({}): {}", e.status(), e);
            Err(e)
        }
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Deserialize)]
pub struct VerifyPaymentBody {
    #[serde(default)]
    reference: String,
}

fn payment_failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "success": false, "message": message.into() }))).into_response()
}

pub async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPaymentBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return payment_failure(StatusCode::BAD_REQUEST, "Invalid JSON in request body");
    };

    match state.payments.verify(&body.reference).await {
        Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
        Err(e @ PaymentError::Rejected(_)) => payment_failure(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            error!("Payment verification failed: {}", e);
            payment_failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Grocery list
// ============================================================================

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Missing x-user-id header"))
}

pub async fn list_groceries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<GroceryItem>>, ApiError> {
    let user = user_id(&headers)?;
    Ok(Json(state.groceries.list(&user)))
}

pub async fn add_groceries(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Vec<Ingredient>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<GroceryItem>>), ApiError> {
    let user = user_id(&headers)?;
    let Json(items) =
        payload.map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid JSON in request body"))?;
    Ok((StatusCode::CREATED, Json(state.groceries.add(&user, &items))))
}

pub async fn update_grocery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    payload: Result<Json<ItemUpdate>, JsonRejection>,
) -> Result<Json<GroceryItem>, ApiError> {
    let user = user_id(&headers)?;
    let Json(update) =
        payload.map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid JSON in request body"))?;
    state
        .groceries
        .update(&user, id, update)
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Item not found"))
}

pub async fn delete_grocery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user = user_id(&headers)?;
    if state.groceries.remove(&user, id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, "Item not found"))
    }
}

pub async fn clear_completed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = user_id(&headers)?;
    let removed = state.groceries.clear_completed(&user);
    Ok(Json(json!({ "removed": removed })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentConfig;
    use crate::orchestrator::Providers;

    fn state() -> AppState {
        AppState {
            extractor: Arc::new(Extractor::new(Providers::default())),
            payments: Arc::new(PaymentClient::new(
                reqwest::Client::new(),
                PaymentConfig {
                    secret_key: None,
                    url: "http://127.0.0.1:9".into(),
                    min_amount: 100_000,
                },
            )),
            groceries: GroceryStore::new(),
        }
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Serve the full router on an ephemeral port.
    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state())).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn user_headers(user: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, user.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_extract_requires_input() {
        let body = ExtractBody {
            recipe_text: Some("   ".into()),
            ..Default::default()
        };
        let resp = extract_ingredients(State(state()), Ok(Json(body)))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_without_providers_is_server_error() {
        let body = ExtractBody {
            recipe_text: Some("2 cups rice, 1 onion".into()),
            ..Default::default()
        };
        let resp = extract_ingredients(State(state()), Ok(Json(body)))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_verify_payment_not_configured() {
        let body = VerifyPaymentBody { reference: "ref_1".into() };
        let resp = verify_payment(State(state()), Ok(Json(body))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_grocery_requires_user() {
        let err = list_groceries(State(state()), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_grocery_flow() {
        let state = state();
        let (status, Json(added)) = add_groceries(
            State(state.clone()),
            user_headers("u1"),
            Ok(Json(vec![Ingredient::new("rice", "2 cups")])),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let id = added[0].id;

        let Json(item) = update_grocery(
            State(state.clone()),
            user_headers("u1"),
            Path(id),
            Ok(Json(ItemUpdate { completed: Some(true), frequent: None })),
        )
        .await
        .unwrap();
        assert!(item.completed);

        let Json(cleared) = clear_completed(State(state.clone()), user_headers("u1"))
            .await
            .unwrap();
        assert_eq!(cleared["removed"], 1);

        let err = delete_grocery(State(state.clone()), user_headers("u1"), Path(id))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let Json(list) = list_groceries(State(state), user_headers("u1")).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_through_router() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{}/extract-ingredients", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Invalid JSON in request body" }));

        let resp = client
            .post(format!("{}/extract-ingredients", base))
            .json(&json!({ "recipeText": "" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Either an image or recipe text is required" }));

        let resp = client.get(format!("{}/health", base)).send().await.unwrap();
        assert_eq!(resp.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_malformed_patch_body_is_json_error() {
        let base = spawn_server().await;
        let resp = reqwest::Client::new()
            .patch(format!("{}/grocery-list/{}", base, Uuid::new_v4()))
            .header(USER_ID_HEADER, "u1")
            .header("content-type", "application/json")
            .body("{\"completed\": maybe}")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Invalid JSON in request body" }));
    }

    #[tokio::test]
    async fn test_panic_response_body() {
        let resp = panic_response(Box::new("store exploded"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            json!({ "error": "Internal server error", "details": "store exploded" })
        );

        let resp = panic_response(Box::new(format!("index {} out of range", 3)));
        assert_eq!(body_json(resp).await["details"], "index 3 out of range");
    }

    #[tokio::test]
    async fn test_payment_failure_body() {
        let body = VerifyPaymentBody { reference: "ref_1".into() };
        let resp = verify_payment(State(state()), Ok(Json(body))).await;
        assert_eq!(
            body_json(resp).await,
            json!({ "success": false, "message": "Payment verification is not configured" })
        );
    }
}
