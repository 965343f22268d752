use axum::{
    Json, Router,
    extract::FromRef,
    middleware,
    routing::{get, patch, post},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::config::AppConfig;
use crate::cookies::{CookieSettings, SESSION_COOKIE};
use crate::error::{ApiError, ErrorResponse};
use crate::handlers::{
    auth_handlers, category_handlers, concept_handlers, health_check, payment_handlers,
    state_handlers,
};
use crate::middleware::auth_middleware::{AccessGuard, auth_middleware};
use crate::models::{
    Category, CategoryResponse, Concept, ConceptResponse, CreateCategoryRequest,
    CreateConceptRequest, CreatePaymentRequest, MeResponse, OkResponse, Payment, PaymentResponse,
    RenameCategoryRequest, SessionUser, StateSnapshot, UpdateConceptRequest,
    UpdatePaymentRequest,
};
use crate::repositories::{
    SqliteCategoryRepository, SqliteConceptRepository, SqlitePaymentRepository,
    SqliteStateRepository,
};
use crate::services::{
    CategoryService, CategoryServiceImpl, ConceptService, ConceptServiceImpl,
    GoogleIdentityProvider, IdentityProvider, JwtSessionService, OAuthService, OAuthServiceImpl,
    PaymentService, PaymentServiceImpl, SessionService, StateService, StateServiceImpl,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::google_begin_handler,
        auth_handlers::google_callback_handler,
        auth_handlers::logout_handler,
        auth_handlers::me_handler,
        state_handlers::get_state_handler,
        category_handlers::create_category_handler,
        category_handlers::rename_category_handler,
        category_handlers::delete_category_handler,
        concept_handlers::create_concept_handler,
        concept_handlers::update_concept_handler,
        concept_handlers::delete_concept_handler,
        payment_handlers::create_payment_handler,
        payment_handlers::update_payment_handler,
        payment_handlers::delete_payment_handler,
    ),
    components(
        schemas(
            Category, CategoryResponse, CreateCategoryRequest, RenameCategoryRequest,
            Concept, ConceptResponse, CreateConceptRequest, UpdateConceptRequest,
            Payment, PaymentResponse, CreatePaymentRequest, UpdatePaymentRequest,
            StateSnapshot, OkResponse, SessionUser, MeResponse, ErrorResponse
        )
    ),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "auth", description = "Google sign-in and session endpoints"),
        (name = "state", description = "Full data snapshot"),
        (name = "categories", description = "Category management"),
        (name = "concepts", description = "Concept management"),
        (name = "payments", description = "Payment management")
    ),
    info(
        title = "Pagos Tracker API",
        version = "0.1.0",
        description = "REST API for tracking recurring payments",
    )
)]
pub struct ApiDoc;

struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// Shared handler state; each service is extracted on its own via `FromRef`
#[derive(Clone, FromRef)]
pub struct AppState {
    pub session_service: Arc<dyn SessionService>,
    pub oauth_service: Arc<dyn OAuthService>,
    pub guard: AccessGuard,
    pub cookies: CookieSettings,
    pub state_service: Arc<dyn StateService>,
    pub category_service: Arc<dyn CategoryService>,
    pub concept_service: Arc<dyn ConceptService>,
    pub payment_service: Arc<dyn PaymentService>,
}

impl AppState {
    /// Wires the SQLite repositories and the Google provider from configuration
    pub fn from_config(config: &AppConfig, pool: SqlitePool) -> Result<Self, ApiError> {
        let provider: Arc<dyn IdentityProvider> =
            Arc::new(GoogleIdentityProvider::new(config.google.clone())?);
        Ok(Self::with_provider(config, pool, provider))
    }

    /// Same as `from_config` with an explicit identity provider
    pub fn with_provider(
        config: &AppConfig,
        pool: SqlitePool,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let allowlist = Arc::new(config.allowed_emails.clone());

        // Initialize repositories
        let category_repository = Arc::new(SqliteCategoryRepository::new(pool.clone()));
        let concept_repository = Arc::new(SqliteConceptRepository::new(pool.clone()));
        let payment_repository = Arc::new(SqlitePaymentRepository::new(pool.clone()));
        let state_repository = Arc::new(SqliteStateRepository::new(pool));

        // Initialize services
        let session_service: Arc<dyn SessionService> =
            Arc::new(JwtSessionService::new(&config.auth_secret));
        let oauth_service: Arc<dyn OAuthService> =
            Arc::new(OAuthServiceImpl::new(provider, allowlist.clone()));

        Self {
            guard: AccessGuard::new(session_service.clone(), allowlist),
            session_service,
            oauth_service,
            cookies: CookieSettings::new(config.production),
            state_service: Arc::new(StateServiceImpl::new(state_repository)),
            category_service: Arc::new(CategoryServiceImpl::new(category_repository.clone())),
            concept_service: Arc::new(ConceptServiceImpl::new(
                concept_repository.clone(),
                category_repository,
            )),
            payment_service: Arc::new(PaymentServiceImpl::new(
                payment_repository,
                concept_repository,
            )),
        }
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    // Everything touching the data store or the current user sits behind the guard
    let protected = Router::new()
        .route("/api/auth/me", get(auth_handlers::me_handler))
        .route("/api/state", get(state_handlers::get_state_handler))
        .route(
            "/api/categories",
            post(category_handlers::create_category_handler),
        )
        .route(
            "/api/categories/{id}",
            patch(category_handlers::rename_category_handler)
                .delete(category_handlers::delete_category_handler),
        )
        .route(
            "/api/concepts",
            post(concept_handlers::create_concept_handler),
        )
        .route(
            "/api/concepts/{id}",
            patch(concept_handlers::update_concept_handler)
                .delete(concept_handlers::delete_concept_handler),
        )
        .route(
            "/api/payments",
            post(payment_handlers::create_payment_handler),
        )
        .route(
            "/api/payments/{id}",
            patch(payment_handlers::update_payment_handler)
                .delete(payment_handlers::delete_payment_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/google", get(auth_handlers::google_begin_handler))
        .route(
            "/api/auth/google/callback",
            get(auth_handlers::google_callback_handler),
        )
        .route("/api/auth/logout", post(auth_handlers::logout_handler))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
