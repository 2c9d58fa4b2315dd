// src/handlers/produtores.rs

use std::path::Path;

use anyhow::Context;
use serde_json::{Value, json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::produtor::Producer,
    services::form_service::FormSession,
};

// Arquivo ausente ou inválido vira erro de validação, com o motivo
async fn read_producer_file(path: &Path) -> Result<Producer, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Validation(format!("Falha ao ler o arquivo {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::Validation(format!(
            "O arquivo {} não contém um produtor válido: {}",
            path.display(),
            e
        ))
    })
}

fn to_value<T: serde::Serialize>(data: &T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(data).context("Falha ao serializar a resposta")?)
}

// agro produtores listar
pub async fn list_producers(app_state: &AppState) -> Result<Value, AppError> {
    let producers = app_state.store.fetch_producers().await?;
    to_value(&producers)
}

// agro produtores obter <ID>
pub async fn get_producer(app_state: &AppState, id: i64) -> Result<Value, AppError> {
    let producer = app_state.store.fetch_producer(id).await?;
    to_value(&producer)
}

// agro produtores buscar <CPF_CNPJ>
pub async fn find_by_cpf_cnpj(app_state: &AppState, cpf_cnpj: &str) -> Result<Value, AppError> {
    match app_state.store.fetch_producer_by_cpf_cnpj(cpf_cnpj).await? {
        Some(producer) => to_value(&producer),
        None => Err(AppError::NotFound),
    }
}

// agro produtores cadastrar --arquivo <JSON>
pub async fn register_producer(app_state: &AppState, path: &Path) -> Result<Value, AppError> {
    let draft = read_producer_file(path).await?;

    let mut session = FormSession::new();
    session.start_new_with(&draft)?;
    let result = app_state.form_service.submit(&mut session).await?;

    Ok(json!({
        "mensagem": result.outcome.message(),
        "resultado": result.outcome,
        "produtor": result.producer,
    }))
}

// agro produtores editar <ID> --arquivo <JSON>
pub async fn edit_producer(app_state: &AppState, id: i64, path: &Path) -> Result<Value, AppError> {
    let mut data = read_producer_file(path).await?;
    data.id = Some(id);

    let mut session = FormSession::new();
    session.start_edit(&data)?;
    let result = app_state.form_service.submit(&mut session).await?;

    Ok(json!({
        "mensagem": result.outcome.message(),
        "resultado": result.outcome,
        "produtor": result.producer,
    }))
}

// agro produtores excluir <ID>
pub async fn delete_producer(app_state: &AppState, id: i64) -> Result<Value, AppError> {
    app_state.store.delete_producer(id).await?;
    Ok(json!({ "mensagem": "Produtor excluído com sucesso", "id": id }))
}
