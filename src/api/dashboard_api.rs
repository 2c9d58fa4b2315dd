// src/api/dashboard_api.rs

use reqwest::Client;

use crate::{
    api::produtor_api::read_json,
    common::error::AppError,
    models::{
        dashboard::{
            CulturaCount, DashboardData, EstadoCount, TotalFazendasResponse,
            TotalHectaresResponse, UsoSolo,
        },
        operation::OperationKind,
    },
};

// Endpoints pré-agregados do backend (/dashboard/*)
#[derive(Clone)]
pub struct DashboardApi {
    client: Client,
    base_url: String,
}

impl DashboardApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}/dashboard/{}", self.base_url, path);
        let response = self.client.get(url).send().await?;
        read_json(response, OperationKind::RefreshDashboard).await
    }

    pub async fn total_fazendas(&self) -> Result<u64, AppError> {
        let body: TotalFazendasResponse = self.get("total_fazendas").await?;
        Ok(body.total_fazendas)
    }

    pub async fn total_hectares(&self) -> Result<f64, AppError> {
        let body: TotalHectaresResponse = self.get("total_hectares").await?;
        Ok(body.total_hectares.unwrap_or(0.0))
    }

    pub async fn por_estado(&self) -> Result<Vec<EstadoCount>, AppError> {
        self.get("por_estado").await
    }

    pub async fn por_cultura(&self) -> Result<Vec<CulturaCount>, AppError> {
        self.get("por_cultura").await
    }

    pub async fn por_uso_solo(&self) -> Result<UsoSolo, AppError> {
        self.get("por_uso_solo").await
    }

    /// Busca os cinco endpoints em paralelo e monta o resumo, sem normalizar.
    pub async fn fetch_all(&self) -> Result<DashboardData, AppError> {
        let (total_fazendas, total_hectares, por_estado, por_cultura, por_uso_solo) = tokio::try_join!(
            self.total_fazendas(),
            self.total_hectares(),
            self.por_estado(),
            self.por_cultura(),
            self.por_uso_solo(),
        )?;

        Ok(DashboardData {
            total_fazendas,
            total_hectares,
            por_estado,
            por_cultura,
            por_uso_solo,
        })
    }
}
