//! JIA API - HTTP Interface Layer
//!
//! HTTP interface over the JIA orchestration layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 JIA API                     │
//! │  ┌─────────────────────────────────────┐    │
//! │  │            HTTP Routes              │    │
//! │  │   /afes, /jib/cycles, /cash-calls   │    │
//! │  └─────────────────────────────────────┘    │
//! │           │              │          │       │
//! │           ▼              ▼          ▼       │
//! │  ┌─────────────┐ ┌─────────────┐ ┌───────┐  │
//! │  │  Handlers   │ │    DTOs     │ │ State │  │
//! │  └─────────────┘ └─────────────┘ └───────┘  │
//! └─────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!                  jia-executor
//! ```
//!
//! # Endpoints
//!
//! ## Health
//! - `GET /health` - Service health check
//!
//! ## AFE
//! - `POST /afes` - Draft an AFE with category estimates
//! - `GET /afes/:id` - Fetch an AFE aggregate
//! - `POST /afes/:id/submit` - Submit for approval
//! - `POST /afes/:id/approve` - Approve one level
//! - `POST /afes/:id/reject` - Reject one level
//! - `POST /afes/:id/expenses` - Record a field expense
//! - `POST /afes/:id/expenses/:expense_id/approve` - Approve an expense
//! - `POST /afes/:id/close` - Close against final cost
//! - `POST /afes/:id/variances` - Raise a variance
//! - `POST /afes/:id/variances/:variance_id/approve` - Approve a variance
//! - `POST /afes/:id/variances/:variance_id/reject` - Reject a variance
//!
//! ## Joint Interest Billing
//! - `POST /jib/cycles` - Draft a billing cycle
//! - `GET /jib/cycles/:id` - Fetch a cycle aggregate
//! - `POST /jib/cycles/:id/send` - Send to the partners
//! - `POST /jib/cycles/:id/status` - Move to an explicit status
//! - `POST /jib/cycles/:id/shares/:share_id/invoice` - Attach an invoice ref
//! - `POST /jib/cycles/:id/shares/:share_id/payment` - Record a payment
//! - `POST /jib/cycles/:id/shares/:share_id/dispute` - Open a dispute
//! - `POST /jib/cycles/:id/shares/:share_id/resolve` - Resolve a dispute
//!
//! ## Cash Calls
//! - `POST /cash-calls` - Draft a cash call
//! - `GET /cash-calls/:id` - Fetch a call aggregate
//! - `POST /cash-calls/:id/send` - Send to the partners
//! - `POST /cash-calls/:id/responses/:response_id/funding` - Record funding
//!
//! # Usage Example
//!
//! ```ignore
//! use jia_api::{ApiConfig, AppState, build_app};
//! use jia_core::types::UserId;
//! use jia_executor::{FixedIdentity, JiaExecutor, StaticPartyRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(StaticPartyRegistry::new());
//!     let executor = JiaExecutor::in_memory(registry);
//!     let identity = Arc::new(FixedIdentity::new(UserId::new("user:system")));
//!
//!     let state = AppState::new(executor, identity);
//!     jia_api::start_server(state).await.unwrap();
//! }
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export main types
pub use dto::*;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::{build_app, create_router, create_v1_router};
pub use state::{ApiConfig, AppState};

/// JIA API version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API port
pub const DEFAULT_PORT: u16 = 3000;

/// Start the API server with the state's configured listen address
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.listen_addr.clone();
    let app = build_app(state);

    tracing::info!("Starting JIA API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jia_core::types::UserId;
    use jia_executor::{FixedIdentity, JiaExecutor, StaticPartyRegistry};
    use std::sync::Arc;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_build_app() {
        let executor = JiaExecutor::in_memory(Arc::new(StaticPartyRegistry::new()));
        let identity = Arc::new(FixedIdentity::new(UserId::new("user:system")));
        let _app = build_app(AppState::new(executor, identity));
    }
}
