use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, Method},
    routing::{get, get_service},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::api::CONTACTS_PATH;
use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{contacts, fallback, system};
use crate::services::{AvatarStorage, ContactService};

/// Build the full route table with its middleware stack
pub fn app(service: Arc<ContactService>, storage: Arc<AvatarStorage>, config: &AppConfig) -> Router {
    let public_prefix = format!("/{}", config.upload.public_url_prefix.trim_matches('/'));

    let mut router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Contacts API
        .merge(contact_routes())
        // Uploaded avatars
        .nest_service(&public_prefix, avatar_files(config))
        .fallback(fallback::resource_not_found)
        .layer(Extension(service))
        .layer(Extension(storage))
        .layer(DefaultBodyLimit::max(config.upload.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }

    router.layer(TraceLayer::new_for_http())
}

/// Static avatar files; misses and non-GET methods answer with the usual envelope
fn avatar_files(config: &AppConfig) -> axum::routing::MethodRouter {
    let files = ServeDir::new(&config.upload.public_dir)
        .not_found_service(fallback::resource_not_found.into_service());
    get_service(files).fallback(fallback::method_not_allowed)
}

fn contact_routes() -> Router {
    Router::new()
        // Collection
        .route(
            CONTACTS_PATH,
            get(contacts::collection_get)
                .post(contacts::collection_post)
                .delete(contacts::collection_delete)
                .fallback(fallback::method_not_allowed),
        )
        // Single contact
        .route(
            &format!("{}/:id", CONTACTS_PATH),
            get(contacts::item_get)
                .put(contacts::item_put)
                .delete(contacts::item_delete)
                .fallback(fallback::method_not_allowed),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([header::LOCATION])
}
