use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    // Validação local do formulário. Nenhuma requisição é feita.
    #[error("{0}")]
    Validation(String),

    // O backend respondeu com status de erro.
    // `message` é o `detail` do corpo quando existir, senão a mensagem genérica da operação.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Produtor não encontrado")]
    NotFound,

    // Falha de transporte (conexão, DNS, corpo inválido...)
    #[error("Falha de comunicação com o servidor: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Tempo limite de {0:?} excedido")]
    Timeout(Duration),

    #[error("Operação cancelada")]
    Cancelled,

    #[error("Transição inválida do formulário: {0}")]
    InvalidTransition(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Mensagem exibida ao usuário (a "mensagem inline" do formulário e da lista).
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::NotFound => "Produtor não encontrado.".to_string(),
            AppError::Transport(_) => "Não foi possível comunicar com o servidor.".to_string(),
            AppError::Timeout(_) => "O servidor demorou demais para responder.".to_string(),
            AppError::Cancelled => "Operação cancelada.".to_string(),
            AppError::InvalidTransition(msg) => msg.clone(),
            AppError::Internal(_) => "Ocorreu um erro inesperado.".to_string(),
        }
    }
}

// Corpo de erro do backend. O FastAPI manda `detail` como string nos erros de negócio
// e como lista nos erros de validação do schema, por isso `Value`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Extrai a mensagem `detail` de um corpo de erro, se for uma string.
pub fn detail_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.as_str().map(str::to_string))
        .filter(|d| !d.trim().is_empty())
}
