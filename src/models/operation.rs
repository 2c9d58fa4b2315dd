// src/models/operation.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identificador de uma execução de operação da store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    FetchProducers,
    FetchProducer,
    FetchProducerByCpfCnpj,
    CreateProducer,
    UpdateProducer,
    DeleteProducer,
    RefreshDashboard,
}

impl OperationKind {
    // Mensagem usada quando o backend não manda `detail`
    pub fn generic_error(&self) -> &'static str {
        match self {
            OperationKind::FetchProducers => "Falha ao buscar a lista de produtores.",
            OperationKind::FetchProducer => "Falha ao buscar o produtor.",
            OperationKind::FetchProducerByCpfCnpj => "Falha ao buscar produtor por CPF/CNPJ.",
            OperationKind::CreateProducer => "Falha ao cadastrar produtor.",
            OperationKind::UpdateProducer => "Falha ao atualizar produtor.",
            OperationKind::DeleteProducer => "Falha ao excluir produtor.",
            OperationKind::RefreshDashboard => "Erro ao buscar dados do dashboard.",
        }
    }
}

/// Resultado de uma execução. Cada operação tem o seu; não há flag global.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Succeeded,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationRecord {
    pub id: OperationId,
    pub kind: OperationKind,
    #[serde(flatten)]
    pub status: OperationStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl OperationRecord {
    pub fn pending(id: OperationId, kind: OperationKind) -> Self {
        Self {
            id,
            kind,
            status: OperationStatus::Pending,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.status, OperationStatus::Pending)
    }

    pub fn finish(&mut self, status: OperationStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}
