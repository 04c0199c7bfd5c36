pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::extract::Request;
use axum::handler::Handler;
use axum::middleware::{from_fn, Next};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::permissions::{
    COMMISSIONS, LEAD_CREATE, LEAD_LABELS, LEAD_VIEW, MOVE_LEAD, PAY_COMMISSION, PHONEBOOK,
};
use crate::middleware::permission;

/// Build the full application router
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_public_routes())
        // Protected API behind the JWT layer
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new().route("/auth/login", post(auth::login))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(request_routes())
        .merge(label_routes())
        .merge(commission_routes())
        .merge(phonebook_routes())
        .merge(lead_routes())
        // Added last so it runs first: every /api route sees AuthUser
        .route_layer(from_fn(middleware::jwt_auth_middleware))
}

fn auth_routes() -> Router {
    use handlers::protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::whoami))
}

fn request_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::requests;

    let move_gate =
        |req: Request, next: Next| permission::require_any(&[MOVE_LEAD], req, next);

    Router::new()
        // Creating a request proposes a move, so it needs the move capability;
        // acting on one only needs to be a listed receiver or the sender,
        // which the workflow itself enforces.
        .route("/api/request", post(requests::create.layer(from_fn(move_gate))))
        .route("/api/request/my-requests", get(requests::my_requests))
        .route("/api/request/counts", get(requests::counts))
        .route("/api/request/change-action/:id", put(requests::change_action))
        .route("/api/request/mark-read/:id", put(requests::mark_read))
}

fn label_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::labels;

    let gate = |req: Request, next: Next| permission::require_any(&[LEAD_LABELS], req, next);

    Router::new()
        .route(
            "/api/labels/pipeline/:pipeline",
            get(labels::by_pipeline.layer(from_fn(gate))),
        )
        .route("/api/labels/create", post(labels::create.layer(from_fn(gate))))
        .route("/api/labels/all", get(labels::all))
        .route(
            "/api/labels/:id",
            get(labels::get_by_id)
                .put(labels::update.layer(from_fn(gate)))
                .delete(labels::delete),
        )
}

fn commission_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::commissions;

    let view_gate =
        |req: Request, next: Next| permission::require_any(&[COMMISSIONS], req, next);
    let pay_gate =
        |req: Request, next: Next| permission::require_any(&[PAY_COMMISSION], req, next);

    Router::new()
        .route(
            "/api/commission/store-commissions",
            post(commissions::store.layer(from_fn(view_gate))),
        )
        .route(
            "/api/commission/commissions/pay",
            put(commissions::pay.layer(from_fn(pay_gate))),
        )
        .route(
            "/api/commission/commissions",
            get(commissions::list_all.layer(from_fn(view_gate))),
        )
        .route(
            "/api/commission/commissions/deal/:deal_id",
            get(commissions::list_by_deal.layer(from_fn(view_gate))),
        )
        .route(
            "/api/commission/commissions/user/:user_id",
            get(commissions::list_by_user.layer(from_fn(view_gate))),
        )
}

fn phonebook_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::phonebook;

    Router::new()
        .route("/api/phonebook/create", post(phonebook::create))
        .route("/api/phonebook/get-all-phonebook", get(phonebook::get_all))
        .route("/api/phonebook/get-blocked-numbers", get(phonebook::get_blocked))
        .route(
            "/api/phonebook/update-calstatus/:id",
            put(phonebook::update_calstatus),
        )
        .route("/api/phonebook/add-comment", post(phonebook::add_comment))
        .route_layer(from_fn(|req: Request, next: Next| {
            permission::require_any(&[PHONEBOOK], req, next)
        }))
}

fn lead_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::leads;

    let create_gate =
        |req: Request, next: Next| permission::require_any(&[LEAD_CREATE], req, next);
    let view_gate = |req: Request, next: Next| permission::require_any(&[LEAD_VIEW], req, next);

    Router::new()
        .route(
            "/api/leads",
            post(leads::create.layer(from_fn(create_gate)))
                .get(leads::list.layer(from_fn(view_gate))),
        )
        .route(
            "/api/leads/:id",
            get(leads::get_by_id.layer(from_fn(view_gate))),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "CRM API (Rust)",
            "version": version,
            "description": "Lead/CRM management backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "auth": "/api/auth/whoami (protected)",
                "request": "/api/request[...] (protected - lead reassignment workflow)",
                "labels": "/api/labels/... (protected)",
                "commission": "/api/commission/... (protected)",
                "phonebook": "/api/phonebook/... (protected)",
                "leads": "/api/leads[/:id] (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
