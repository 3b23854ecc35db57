//! API Routes
//!
//! Route definitions for the JIA API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let enable_cors = state.config.enable_cors;

    let mut router = Router::new()
        // Health
        .route("/health", get(health_check))
        // AFE endpoints
        .route("/afes", post(create_afe))
        .route("/afes/:afe_id", get(get_afe))
        .route("/afes/:afe_id/submit", post(submit_afe))
        .route("/afes/:afe_id/approve", post(approve_afe_level))
        .route("/afes/:afe_id/reject", post(reject_afe_level))
        .route("/afes/:afe_id/expenses", post(record_expense))
        .route(
            "/afes/:afe_id/expenses/:expense_id/approve",
            post(approve_expense),
        )
        .route("/afes/:afe_id/close", post(close_afe))
        .route("/afes/:afe_id/variances", post(request_variance))
        .route(
            "/afes/:afe_id/variances/:variance_id/approve",
            post(approve_variance),
        )
        .route(
            "/afes/:afe_id/variances/:variance_id/reject",
            post(reject_variance),
        )
        // Billing endpoints
        .route("/jib/cycles", post(create_cycle))
        .route("/jib/cycles/:jib_id", get(get_cycle))
        .route("/jib/cycles/:jib_id/send", post(send_cycle))
        .route("/jib/cycles/:jib_id/status", post(set_cycle_status))
        .route(
            "/jib/cycles/:jib_id/shares/:share_id/invoice",
            post(invoice_share),
        )
        .route(
            "/jib/cycles/:jib_id/shares/:share_id/payment",
            post(record_payment),
        )
        .route(
            "/jib/cycles/:jib_id/shares/:share_id/dispute",
            post(open_dispute),
        )
        .route(
            "/jib/cycles/:jib_id/shares/:share_id/resolve",
            post(resolve_dispute),
        )
        // Cash call endpoints
        .route("/cash-calls", post(create_cash_call))
        .route("/cash-calls/:call_id", get(get_cash_call))
        .route("/cash-calls/:call_id/send", post(send_cash_call))
        .route(
            "/cash-calls/:call_id/responses/:response_id/funding",
            post(record_funding),
        )
        .with_state(state);

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.layer(TraceLayer::new_for_http())
}

/// Create a router for the V1 API with /api/v1 prefix
pub fn create_v1_router(state: Arc<AppState>) -> Router {
    Router::new().nest("/api/v1", create_router(state))
}

/// Build the full application router
pub fn build_app(state: AppState) -> Router {
    let state = Arc::new(state);

    let root_router = Router::new().route("/", get(|| async { "JIA API Service" }));

    let health_router = Router::new()
        .route("/healthz", get(health_check))
        .with_state(state.clone());

    root_router
        .merge(health_router)
        .merge(create_v1_router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use jia_core::types::{ContractId, PartyId, UserId, WorkingParty};
    use jia_executor::{FixedIdentity, JiaExecutor, StaticPartyRegistry};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn test_state() -> AppState {
        let registry = StaticPartyRegistry::new();
        registry
            .register(
                ContractId::new("contract:perm-12"),
                vec![
                    WorkingParty {
                        party_id: PartyId::new("party:operator"),
                        name: "Permian Operating LLC".to_string(),
                        working_interest: Decimal::new(60, 0),
                        is_operator: true,
                    },
                    WorkingParty {
                        party_id: PartyId::new("party:basin"),
                        name: "Basin Partners LP".to_string(),
                        working_interest: Decimal::new(40, 0),
                        is_operator: false,
                    },
                ],
            )
            .await;
        let executor = JiaExecutor::in_memory(Arc::new(registry));
        let identity = Arc::new(FixedIdentity::new(UserId::new("user:system")));
        AppState::new(executor, identity)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_app(test_state().await);
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_afe_returns_404() {
        let app = build_app(test_state().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/afes/afe:missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_afe_create_submit_and_out_of_order_approval() {
        let app = build_app(test_state().await);

        let create = json!({
            "afe_id": "afe:http-1",
            "code": "AFE-2024-001",
            "title": "Infill well",
            "afe_type": "drilling",
            "contract_ref": "contract:perm-12",
            "estimated_cost": "2500000.00",
            "currency": "USD",
            "required_approval_level": 2,
            "categories": [
                {"code": "DRL", "description": "Drilling", "estimated_amount": "1800000.00"},
                {"code": "CMP", "description": "Completion", "estimated_amount": "700000.00"}
            ],
            "actor": "user:ops-eng"
        });
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/afes", create))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["afe"]["status"], "draft");

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/afes/afe:http-1/submit",
                json!({"actor": "user:ops-eng"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["afe"]["status"], "pending");
        assert_eq!(body["approvals"].as_array().unwrap().len(), 2);

        // Level 2 before level 1 must be refused with the domain code
        let response = app
            .oneshot(post_json(
                "/api/v1/afes/afe:http-1/approve",
                json!({"level": 2, "actor": "user:vp-ops"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["code"], "JIA-APPR-002");
    }

    #[tokio::test]
    async fn test_cycle_rejects_invalid_month() {
        let app = build_app(test_state().await);
        let response = app
            .oneshot(post_json(
                "/api/v1/jib/cycles",
                json!({
                    "code": "JIB-2024-13",
                    "contract_ref": "contract:perm-12",
                    "month": 13,
                    "year": 2024,
                    "currency": "USD",
                    "line_items": [
                        {
                            "cost_category": "LOE",
                            "description": "Lease operating",
                            "amount": "1000.00",
                            "quantity": "1",
                            "unit_price": "1000.00"
                        }
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cash_call_funding_roundtrip() {
        let app = build_app(test_state().await);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/cash-calls",
                json!({
                    "call_id": "call:http-1",
                    "code": "CC-2024-07",
                    "contract_ref": "contract:perm-12",
                    "purpose": "Frac spread mobilization",
                    "total_amount": "200000.00",
                    "currency": "USD",
                    "call_date": "2024-07-01",
                    "actor": "user:treasury"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let responses = body["responses"].as_array().unwrap();
        assert_eq!(responses.len(), 2);
        let response_id = responses
            .iter()
            .find(|r| r["requested_amount"] == "80000.00")
            .unwrap()["response_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/cash-calls/call:http-1/send",
                json!({"actor": "user:treasury"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json(
                &format!("/api/v1/cash-calls/call:http-1/responses/{response_id}/funding"),
                json!({
                    "amount": "80000.00",
                    "funded_date": "2024-07-10",
                    "payment_reference": "WIRE-9911",
                    "actor": "user:treasury"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["call"]["status"], "partially_funded");
        assert_eq!(body["call"]["funded_amount"], "80000.00");
    }
}
