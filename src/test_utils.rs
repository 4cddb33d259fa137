#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use moka::future::Cache;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, with two seeded users in distinct
    /// tenants and a third without a tenant.
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        let alpha_user = model::entities::user::ActiveModel {
            id: Set("user-alpha".to_string()),
            email: Set("alpha@hillvalley.edu".to_string()),
            tenant_id: Set(Some("tenant-alpha".to_string())),
            ..Default::default()
        };

        let beta_user = model::entities::user::ActiveModel {
            id: Set("user-beta".to_string()),
            email: Set("beta@rivercity.edu".to_string()),
            tenant_id: Set(Some("tenant-beta".to_string())),
            ..Default::default()
        };

        let drifter_user = model::entities::user::ActiveModel {
            id: Set("user-drifter".to_string()),
            email: Set("drifter@example.com".to_string()),
            tenant_id: Set(None),
            ..Default::default()
        };

        alpha_user
            .insert(&db)
            .await
            .expect("Failed to create alpha test user");
        beta_user
            .insert(&db)
            .await
            .expect("Failed to create beta test user");
        drifter_user
            .insert(&db)
            .await
            .expect("Failed to create drifter test user");

        let cache = Cache::new(100);

        AppState { db, cache }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }
}
