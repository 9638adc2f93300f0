use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Bookflix API",
        version = "0.1.0",
        description = "Book catalog with LLM-reranked semantic recommendations"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/books", api = domain_books::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
