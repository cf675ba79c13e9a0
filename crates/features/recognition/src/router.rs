use crate::handlers;
use ocrhub_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `GET /`, `POST /process`, and `GET /status`.
pub fn recognition_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::index_handler))
        .routes(routes!(handlers::process_handler))
        .routes(routes!(handlers::status_handler))
}
