// src/services/producer_store.rs

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    api::ProducerApi,
    common::{cancel::CancelToken, error::AppError},
    models::{
        dashboard::DashboardData,
        operation::{OperationId, OperationKind, OperationRecord, OperationStatus},
        produtor::Producer,
    },
    services::dashboard_service::DashboardSource,
};

/// Quantos registros de operações já terminadas ficam no histórico.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

#[derive(Default)]
struct StoreState {
    producers: Vec<Producer>,
    dashboard: Option<DashboardData>,
    // Um registro por execução, na ordem em que começaram
    operations: IndexMap<OperationId, OperationRecord>,
    in_flight: HashMap<OperationId, CancelToken>,
}

/// Cópia do estado da store num instante.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub producers: Vec<Producer>,
    pub dashboard: Option<DashboardData>,
    pub operations: Vec<OperationRecord>,
}

// A store de produtores. Clonar é barato: os clones compartilham o mesmo estado.
#[derive(Clone)]
pub struct ProducerStore {
    api: ProducerApi,
    dashboard_source: Arc<dyn DashboardSource>,
    timeout: Duration,
    history_limit: usize,
    state: Arc<RwLock<StoreState>>,
}

// Descarta os registros terminados mais antigos além de `keep`. Pendentes nunca saem.
fn prune_finished(operations: &mut IndexMap<OperationId, OperationRecord>, keep: usize) {
    let finished = operations.values().filter(|r| r.is_finished()).count();
    let mut excess = finished.saturating_sub(keep);
    if excess == 0 {
        return;
    }
    operations.retain(|_, r| {
        if excess > 0 && r.is_finished() {
            excess -= 1;
            false
        } else {
            true
        }
    });
}

impl ProducerStore {
    pub fn new(api: ProducerApi, dashboard_source: Arc<dyn DashboardSource>, timeout: Duration) -> Self {
        Self {
            api,
            dashboard_source,
            timeout,
            history_limit: DEFAULT_HISTORY_LIMIT,
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    // =========================================================================
    //  CICLO DE VIDA DAS OPERAÇÕES
    // =========================================================================

    async fn begin(&self, kind: OperationKind) -> (OperationId, CancelToken) {
        let id = OperationId::new();
        let token = CancelToken::new();

        let mut state = self.state.write().await;
        state.operations.insert(id, OperationRecord::pending(id, kind));
        state.in_flight.insert(id, token.clone());
        tracing::debug!("Operação {} ({:?}) iniciada", id, kind);

        (id, token)
    }

    // Executa a chamada de rede com tempo limite e cancelamento
    async fn run<T, F>(&self, kind: OperationKind, call: F) -> (OperationId, Result<T, AppError>)
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let (id, token) = self.begin(kind).await;

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(AppError::Cancelled),
            res = tokio::time::timeout(self.timeout, call) => {
                res.unwrap_or_else(|_| Err(AppError::Timeout(self.timeout)))
            }
        };

        (id, outcome)
    }

    // Aplica o resultado ao estado e fecha o registro da operação, sob o mesmo lock
    async fn settle<T>(
        &self,
        id: OperationId,
        outcome: &Result<T, AppError>,
        apply: impl FnOnce(&mut StoreState, &T),
    ) {
        let mut state = self.state.write().await;
        state.in_flight.remove(&id);

        let Some(kind) = state.operations.get(&id).map(|r| r.kind) else {
            return;
        };
        let status = match outcome {
            Ok(value) => {
                apply(&mut *state, value);
                tracing::info!("✅ Operação {:?} concluída", kind);
                OperationStatus::Succeeded
            }
            Err(e) => {
                tracing::error!("🔥 Operação {:?} falhou: {:?}", kind, e);
                OperationStatus::Failed {
                    message: e.user_message(),
                }
            }
        };

        if let Some(record) = state.operations.get_mut(&id) {
            record.finish(status);
        }
        prune_finished(&mut state.operations, self.history_limit);
    }

    /// Cancela uma operação em andamento. Retorna `false` se ela já terminou.
    pub async fn cancel(&self, id: OperationId) -> bool {
        let state = self.state.read().await;
        match state.in_flight.get(&id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn cancel_all(&self) -> usize {
        let state = self.state.read().await;
        for token in state.in_flight.values() {
            token.cancel();
        }
        state.in_flight.len()
    }

    // =========================================================================
    //  LEITURA DO ESTADO
    // =========================================================================

    pub async fn producers(&self) -> Vec<Producer> {
        self.state.read().await.producers.clone()
    }

    pub async fn dashboard(&self) -> Option<DashboardData> {
        self.state.read().await.dashboard.clone()
    }

    pub async fn operation(&self, id: OperationId) -> Option<OperationRecord> {
        self.state.read().await.operations.get(&id).cloned()
    }

    pub async fn operations(&self) -> Vec<OperationRecord> {
        self.state.read().await.operations.values().cloned().collect()
    }

    /// Operações ainda pendentes, por tipo.
    pub async fn in_flight(&self) -> Vec<(OperationId, OperationKind)> {
        let state = self.state.read().await;
        state
            .operations
            .values()
            .filter(|r| !r.is_finished())
            .map(|r| (r.id, r.kind))
            .collect()
    }

    /// Remove do histórico as operações que já terminaram.
    pub async fn clear_finished(&self) {
        self.state.write().await.operations.retain(|_, r| !r.is_finished());
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            producers: state.producers.clone(),
            dashboard: state.dashboard.clone(),
            operations: state.operations.values().cloned().collect(),
        }
    }

    // =========================================================================
    //  OPERAÇÕES
    // =========================================================================

    pub async fn fetch_producers(&self) -> Result<Vec<Producer>, AppError> {
        let (id, outcome) = self.run(OperationKind::FetchProducers, self.api.list()).await;
        // Em caso de falha a lista anterior fica intacta
        self.settle(id, &outcome, |state, list| state.producers = list.clone()).await;
        outcome
    }

    pub async fn fetch_producer(&self, producer_id: i64) -> Result<Producer, AppError> {
        let (id, outcome) = self.run(OperationKind::FetchProducer, self.api.get(producer_id)).await;
        self.settle(id, &outcome, |_, _| {}).await;
        outcome
    }

    /// Primeiro produtor com esse CPF/CNPJ, ou `None`.
    pub async fn fetch_producer_by_cpf_cnpj(&self, cpf_cnpj: &str) -> Result<Option<Producer>, AppError> {
        let (id, outcome) = self
            .run(OperationKind::FetchProducerByCpfCnpj, self.api.find_by_cpf_cnpj(cpf_cnpj))
            .await;
        self.settle(id, &outcome, |_, _| {}).await;
        outcome
    }

    pub async fn create_producer(&self, data: &Producer) -> Result<Producer, AppError> {
        let (id, outcome) = self.run(OperationKind::CreateProducer, self.api.create(data)).await;
        self.settle(id, &outcome, |_, _| {}).await;

        if let Ok(created) = &outcome {
            tracing::info!("Produtor criado com sucesso, ID: {:?}", created.id);
            self.refresh_after_mutation(true).await;
        }
        outcome
    }

    pub async fn update_producer(&self, producer_id: i64, data: &Producer) -> Result<Producer, AppError> {
        let (id, outcome) = self
            .run(OperationKind::UpdateProducer, self.api.update(producer_id, data))
            .await;
        self.settle(id, &outcome, |_, _| {}).await;

        if outcome.is_ok() {
            tracing::info!("Produtor com ID {} atualizado com sucesso", producer_id);
            self.refresh_after_mutation(false).await;
        }
        outcome
    }

    pub async fn delete_producer(&self, producer_id: i64) -> Result<(), AppError> {
        let (id, outcome) = self
            .run(OperationKind::DeleteProducer, self.api.delete(producer_id))
            .await;
        // Sai da lista na hora, sem esperar o refetch
        self.settle(id, &outcome, |state, _| {
            state.producers.retain(|p| p.id != Some(producer_id));
        })
        .await;

        if outcome.is_ok() {
            tracing::info!("Produtor com ID {} deletado com sucesso", producer_id);
            self.refresh_after_mutation(true).await;
        }
        outcome
    }

    pub async fn refresh_dashboard(&self) -> Result<DashboardData, AppError> {
        let source = Arc::clone(&self.dashboard_source);
        tracing::debug!("Atualizando dashboard (fonte: {})", source.name());

        let (id, outcome) = self.run(OperationKind::RefreshDashboard, source.load()).await;
        self.settle(id, &outcome, |state, data| state.dashboard = Some(data.clone())).await;
        outcome
    }

    // Efeitos colaterais das mutações, aguardados antes de a mutação retornar.
    // Cada um tem seu próprio registro de operação; se falharem, a operação que
    // os disparou continua bem-sucedida.
    async fn refresh_after_mutation(&self, with_dashboard: bool) {
        if with_dashboard {
            if let Err(e) = self.refresh_dashboard().await {
                tracing::warn!("Dashboard não foi atualizado: {}", e);
            }
        }
        if let Err(e) = self.fetch_producers().await {
            tracing::warn!("Lista de produtores não foi recarregada: {}", e);
        }
    }
}
