// src/handlers/dashboard.rs

use serde_json::Value;

use crate::{common::error::AppError, config::AppState};

// agro dashboard [--modo local|servidor]
pub async fn get_dashboard(app_state: &AppState) -> Result<Value, AppError> {
    let dashboard = app_state.store.refresh_dashboard().await?;
    serde_json::to_value(&dashboard)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Falha ao serializar o dashboard: {}", e)))
}
