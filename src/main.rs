//! Payroll engine HTTP server.
//!
//! Environment:
//! - `PAYROLL_CONFIG_DIR`: statutory configuration directory (default `./config/br`)
//! - `PAYROLL_BIND_ADDR`: listen address (default `127.0.0.1:3000`)
//! - `PAYROLL_EMPLOYEES_FILE`: optional YAML list of employees served to `/batch` by id

use std::sync::Arc;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::models::{EmployeeCompensationInput, InMemoryDirectory};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config_dir = std::env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| "./config/br".to_string());
    let bind_addr =
        std::env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let loader = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        version = %loader.metadata().version,
        table_sets = loader.config().tables().len(),
        "Statutory configuration loaded"
    );

    let mut state = AppState::new(loader);
    if let Ok(path) = std::env::var("PAYROLL_EMPLOYEES_FILE") {
        let content = std::fs::read_to_string(&path)?;
        let employees: Vec<EmployeeCompensationInput> = serde_yaml::from_str(&content)?;
        let directory: InMemoryDirectory = employees.into_iter().collect();
        info!(path = %path, employees = directory.len(), "Employee directory loaded");
        state = state.with_directory(Arc::new(directory));
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Payroll engine listening");

    axum::serve(listener, app).await?;

    Ok(())
}
