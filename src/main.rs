use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use transaction_ledger::handlers::ErrorResponse;
use transaction_ledger::models::category::{Category, CategoryRequest};
use transaction_ledger::models::transaction::{
    PersonType, Transaction, TransactionRequest, TransactionStatus, TransactionType,
};
use transaction_ledger::repositories::category_repository::PostgresCategoryRepository;
use transaction_ledger::repositories::transaction_repository::PostgresTransactionRepository;
use transaction_ledger::routes::api_router;
use transaction_ledger::services::category_service::{CategoryService, CategoryServiceImpl};
use transaction_ledger::services::report_service::{ReportService, ReportServiceImpl};
use transaction_ledger::services::transaction_service::{
    TransactionService, TransactionServiceImpl,
};
use transaction_ledger::state::AppState;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        transaction_ledger::handlers::transaction_handlers::create_transaction_handler,
        transaction_ledger::handlers::transaction_handlers::search_transactions_handler,
        transaction_ledger::handlers::transaction_handlers::get_transaction_handler,
        transaction_ledger::handlers::transaction_handlers::update_transaction_handler,
        transaction_ledger::handlers::transaction_handlers::delete_transaction_handler,
        transaction_ledger::handlers::category_handlers::create_category_handler,
        transaction_ledger::handlers::category_handlers::list_categories_handler,
        transaction_ledger::handlers::category_handlers::update_category_handler,
        transaction_ledger::handlers::category_handlers::delete_category_handler,
        transaction_ledger::handlers::report_handlers::export_pdf_handler,
        transaction_ledger::handlers::report_handlers::export_excel_handler,
    ),
    components(
        schemas(
            Transaction,
            TransactionRequest,
            TransactionStatus,
            TransactionType,
            PersonType,
            Category,
            CategoryRequest,
            ErrorResponse
        )
    ),
    tags(
        (name = "transactions", description = "Transaction management endpoints"),
        (name = "categories", description = "Category management endpoints"),
        (name = "reports", description = "Report export endpoints")
    ),
    info(
        title = "Transaction Ledger API",
        version = "0.1.0",
        description = "REST API for financial transaction bookkeeping",
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Structured logs; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transaction_ledger=info,tower_http=info".into()),
        )
        .init();

    // Get configuration from environment
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("migrations completed");

    // Initialize repositories
    let transaction_repository = Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let category_repository = Arc::new(PostgresCategoryRepository::new(pool));

    // Initialize services
    let transaction_service: Arc<dyn TransactionService> =
        Arc::new(TransactionServiceImpl::new(transaction_repository));
    let category_service: Arc<dyn CategoryService> =
        Arc::new(CategoryServiceImpl::new(category_repository));
    let report_service: Arc<dyn ReportService> = Arc::new(ReportServiceImpl::new());

    let state = AppState::new(transaction_service, category_service, report_service);

    // Build router with routes, Swagger UI and middleware
    let app = api_router(state)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("server running on http://{}", addr);
    tracing::info!("api docs at http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
