// src/services/dashboard_service.rs

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::{
    api::{DashboardApi, ProducerApi},
    common::error::AppError,
    models::{
        dashboard::{CulturaCount, DashboardData, EstadoCount},
        produtor::Producer,
    },
};

// Nome por extenso (já em maiúsculas) -> sigla da UF
fn state_abbreviation(name: &str) -> Option<&'static str> {
    let uf = match name {
        "ACRE" => "AC",
        "ALAGOAS" => "AL",
        "AMAPÁ" => "AP",
        "AMAZONAS" => "AM",
        "BAHIA" => "BA",
        "CEARÁ" => "CE",
        "DISTRITO FEDERAL" => "DF",
        "ESPÍRITO SANTO" => "ES",
        "GOIÁS" => "GO",
        "MARANHÃO" => "MA",
        "MATO GROSSO" => "MT",
        "MATO GROSSO DO SUL" => "MS",
        "MINAS GERAIS" => "MG",
        "PARÁ" => "PA",
        "PARAÍBA" => "PB",
        "PARANÁ" => "PR",
        "PERNAMBUCO" => "PE",
        "PIAUÍ" => "PI",
        "RIO DE JANEIRO" => "RJ",
        "RIO GRANDE DO NORTE" => "RN",
        "RIO GRANDE DO SUL" => "RS",
        "RONDÔNIA" => "RO",
        "RORAIMA" => "RR",
        "SANTA CATARINA" => "SC",
        "SÃO PAULO" => "SP",
        "SERGIPE" => "SE",
        "TOCANTINS" => "TO",
        _ => return None,
    };
    Some(uf)
}

/// "  são paulo " -> "SP"; "sp" -> "SP"; nomes desconhecidos só ficam em maiúsculas.
pub fn normalize_estado(estado: &str) -> String {
    let upper = estado.trim().to_uppercase();
    match state_abbreviation(&upper) {
        Some(uf) => uf.to_string(),
        None => upper,
    }
}

pub fn normalize_cultura(cultura: &str) -> String {
    cultura.trim().to_uppercase()
}

// Contagem agrupada, na ordem da primeira ocorrência
fn bump(groups: &mut IndexMap<String, u64>, key: String, by: u64) {
    *groups.entry(key).or_insert(0) += by;
}

/// Calcula o resumo do dashboard a partir da lista completa de produtores.
pub fn aggregate(producers: &[Producer]) -> DashboardData {
    let mut data = DashboardData::default();
    let mut por_estado: IndexMap<String, u64> = IndexMap::new();
    let mut por_cultura: IndexMap<String, u64> = IndexMap::new();

    for propriedade in producers.iter().flat_map(|p| &p.propriedades) {
        data.total_fazendas += 1;
        data.total_hectares += propriedade.area_total_ha;
        data.por_uso_solo.area_agricultavel += propriedade.area_agricultavel_ha;
        data.por_uso_solo.area_vegetacao += propriedade.area_vegetacao_ha;

        bump(&mut por_estado, normalize_estado(&propriedade.estado), 1);

        // Cada ocorrência conta, mesmo repetida na mesma fazenda
        for cultura in &propriedade.culturas {
            bump(&mut por_cultura, normalize_cultura(&cultura.nome_cultura), 1);
        }
    }

    data.por_estado = por_estado
        .into_iter()
        .map(|(estado, count)| EstadoCount { estado, count })
        .collect();
    data.por_cultura = por_cultura
        .into_iter()
        .map(|(cultura, count)| CulturaCount { cultura, count })
        .collect();
    data
}

/// Reagrupa dados vindos do backend com a mesma normalização do cálculo local
/// (o backend agrupa pelo texto cru: "SP", "sp" e "São Paulo" viriam separados).
pub fn normalize(data: DashboardData) -> DashboardData {
    let mut por_estado: IndexMap<String, u64> = IndexMap::new();
    for e in data.por_estado {
        bump(&mut por_estado, normalize_estado(&e.estado), e.count);
    }

    let mut por_cultura: IndexMap<String, u64> = IndexMap::new();
    for c in data.por_cultura {
        bump(&mut por_cultura, normalize_cultura(&c.cultura), c.count);
    }

    DashboardData {
        total_fazendas: data.total_fazendas,
        total_hectares: data.total_hectares,
        por_estado: por_estado
            .into_iter()
            .map(|(estado, count)| EstadoCount { estado, count })
            .collect(),
        por_cultura: por_cultura
            .into_iter()
            .map(|(cultura, count)| CulturaCount { cultura, count })
            .collect(),
        por_uso_solo: data.por_uso_solo,
    }
}

/// De onde vem o dashboard. A store não sabe se é cálculo local ou do servidor.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn load(&self) -> Result<DashboardData, AppError>;

    fn name(&self) -> &'static str;
}

// Cálculo local: busca todos os produtores e agrega no cliente
#[derive(Clone)]
pub struct LocalDashboard {
    api: ProducerApi,
}

impl LocalDashboard {
    pub fn new(api: ProducerApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DashboardSource for LocalDashboard {
    async fn load(&self) -> Result<DashboardData, AppError> {
        let producers = self.api.list().await?;
        if producers.is_empty() {
            tracing::warn!("Nenhum produtor encontrado. O dashboard será exibido com zeros.");
        }
        Ok(aggregate(&producers))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

// Agregação feita pelo backend nos endpoints /dashboard/*
#[derive(Clone)]
pub struct ServerDashboard {
    api: DashboardApi,
}

impl ServerDashboard {
    pub fn new(api: DashboardApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DashboardSource for ServerDashboard {
    async fn load(&self) -> Result<DashboardData, AppError> {
        let raw = self.api.fetch_all().await?;
        Ok(normalize(raw))
    }

    fn name(&self) -> &'static str {
        "server"
    }
}
