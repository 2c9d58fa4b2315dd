// src/api/produtor_api.rs

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{AppError, detail_from_body},
    models::{operation::OperationKind, produtor::Producer},
};

/// Tamanho de página padrão do backend para `GET /produtores/`.
pub const PAGE_SIZE: usize = 100;

// O "repositório" de produtores: todas as interações com /produtores/ no backend
#[derive(Clone)]
pub struct ProducerApi {
    client: Client,
    base_url: String,
    page_size: usize,
}

/// Converte status de erro em `AppError::Api`, usando o `detail` do corpo quando houver.
pub(crate) async fn ensure_success(
    response: Response,
    kind: OperationKind,
) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = detail_from_body(&body).unwrap_or_else(|| kind.generic_error().to_string());
    tracing::debug!("Backend respondeu {} para {:?}: {}", status, kind, body);

    Err(AppError::Api {
        status: status.as_u16(),
        message,
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    kind: OperationKind,
) -> Result<T, AppError> {
    let response = ensure_success(response, kind).await?;
    Ok(response.json::<T>().await?)
}

impl ProducerApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/produtores/", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/produtores/{}", self.base_url, id)
    }

    // GET /produtores/?skip=..&limit=..  (pede páginas até vir uma incompleta)
    pub async fn list(&self) -> Result<Vec<Producer>, AppError> {
        let mut producers = Vec::new();
        loop {
            let response = self
                .client
                .get(self.collection_url())
                .query(&[("skip", producers.len()), ("limit", self.page_size)])
                .send()
                .await?;
            let page: Vec<Producer> = read_json(response, OperationKind::FetchProducers).await?;

            let last = page.len() != self.page_size;
            producers.extend(page);
            if last {
                break;
            }
            tracing::debug!("Buscando próxima página de produtores (skip={})", producers.len());
        }
        Ok(producers)
    }

    // GET /produtores/{id}
    pub async fn get(&self, id: i64) -> Result<Producer, AppError> {
        let response = self.client.get(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }
        read_json(response, OperationKind::FetchProducer).await
    }

    // GET /produtores/?cpf_cnpj=...  (o filtro é responsabilidade do backend)
    pub async fn find_by_cpf_cnpj(&self, cpf_cnpj: &str) -> Result<Option<Producer>, AppError> {
        let response = self
            .client
            .get(self.collection_url())
            .query(&[("cpf_cnpj", cpf_cnpj)])
            .send()
            .await?;

        let found: Vec<Producer> = read_json(response, OperationKind::FetchProducerByCpfCnpj).await?;
        Ok(found.into_iter().next())
    }

    // POST /produtores/
    pub async fn create(&self, data: &Producer) -> Result<Producer, AppError> {
        let response = self.client.post(self.collection_url()).json(data).send().await?;
        read_json(response, OperationKind::CreateProducer).await
    }

    // PUT /produtores/{id}  (substitui a estrutura inteira, fazendas e culturas incluídas)
    pub async fn update(&self, id: i64, data: &Producer) -> Result<Producer, AppError> {
        let response = self.client.put(self.item_url(id)).json(data).send().await?;
        read_json(response, OperationKind::UpdateProducer).await
    }

    // DELETE /produtores/{id}  (o corpo da resposta é ignorado)
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        ensure_success(response, OperationKind::DeleteProducer).await?;
        Ok(())
    }
}
