// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, bail};
use reqwest::Client;

use crate::{
    api::{DashboardApi, ProducerApi, produtor_api::PAGE_SIZE},
    services::{DashboardSource, FormService, LocalDashboard, ProducerStore, ServerDashboard},
};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// De onde o dashboard é calculado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardMode {
    // Busca todos os produtores e agrega no cliente
    #[default]
    Local,
    // Usa os endpoints /dashboard/* do backend
    Server,
}

impl FromStr for DashboardMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(DashboardMode::Local),
            "server" | "servidor" => Ok(DashboardMode::Server),
            other => bail!("DASHBOARD_MODE inválido: '{}' (use 'local' ou 'server')", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub dashboard_mode: DashboardMode,
    // Produtores por página na listagem
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dashboard_mode: DashboardMode::Local,
            page_size: PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Lê a configuração do ambiente (e do `.env`, se existir).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("API_BASE_URL") {
            config.api_base_url = url;
        }

        if let Some(secs) = lookup("API_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("API_TIMEOUT_SECS deve ser um número inteiro: '{}'", secs))?;
            if secs == 0 {
                bail!("API_TIMEOUT_SECS deve ser maior que zero");
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(size) = lookup("API_PAGE_SIZE") {
            let size: usize = size
                .trim()
                .parse()
                .with_context(|| format!("API_PAGE_SIZE deve ser um número inteiro: '{}'", size))?;
            if size == 0 {
                bail!("API_PAGE_SIZE deve ser maior que zero");
            }
            config.page_size = size;
        }

        if let Some(mode) = lookup("DASHBOARD_MODE") {
            config.dashboard_mode = mode.parse()?;
        }

        Ok(config)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: ProducerStore,
    pub form_service: FormService,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .context("Falha ao criar o cliente HTTP")?;

        // --- Monta o gráfico de dependências ---
        let producer_api =
            ProducerApi::new(client.clone(), config.api_base_url.clone()).with_page_size(config.page_size);
        let dashboard_source: Arc<dyn DashboardSource> = match config.dashboard_mode {
            DashboardMode::Local => Arc::new(LocalDashboard::new(producer_api.clone())),
            DashboardMode::Server => Arc::new(ServerDashboard::new(DashboardApi::new(
                client,
                config.api_base_url.clone(),
            ))),
        };
        let store = ProducerStore::new(producer_api, dashboard_source, config.request_timeout);
        let form_service = FormService::new(store.clone());

        tracing::info!(
            "✅ Cliente configurado para {} (dashboard: {:?})",
            config.api_base_url,
            config.dashboard_mode
        );

        Ok(Self {
            config,
            store,
            form_service,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(AppConfig::from_env()?)
    }
}
