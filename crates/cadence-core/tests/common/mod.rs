use cadence_core::{params::CreateConnection, Connection, Engine, EngineBuilder};
use tempfile::TempDir;

/// Helper function to create a test engine backed by a temp database
pub async fn create_test_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let engine = EngineBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create engine");
    (temp_dir, engine)
}

/// Helper function to seed a connection with defaults
#[allow(dead_code)]
pub async fn seed_connection(engine: &Engine) -> Connection {
    engine
        .add_connection(&CreateConnection {
            user_id: "test-user".to_string(),
            ..Default::default()
        })
        .await
        .expect("Failed to add connection")
}
