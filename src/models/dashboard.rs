// src/models/dashboard.rs

use serde::{Deserialize, Serialize};

// Resumo do dashboard. Nunca é persistido; é recalculado a cada busca.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub total_fazendas: u64,
    pub total_hectares: f64,
    pub por_estado: Vec<EstadoCount>,
    pub por_cultura: Vec<CulturaCount>,
    pub por_uso_solo: UsoSolo,
}

// Gráfico de pizza por estado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstadoCount {
    pub estado: String,
    pub count: u64,
}

// Gráfico de pizza por cultura
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturaCount {
    pub cultura: String,
    pub count: u64,
}

// Uso do solo (agricultável x vegetação)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsoSolo {
    pub area_agricultavel: f64,
    pub area_vegetacao: f64,
}

// --- Respostas individuais dos endpoints /dashboard/* ---

#[derive(Debug, Deserialize)]
pub struct TotalFazendasResponse {
    pub total_fazendas: u64,
}

#[derive(Debug, Deserialize)]
pub struct TotalHectaresResponse {
    // O backend devolve `null` quando não há fazendas
    #[serde(default)]
    pub total_hectares: Option<f64>,
}

impl DashboardData {
    pub fn count_for_estado(&self, estado: &str) -> Option<u64> {
        self.por_estado.iter().find(|e| e.estado == estado).map(|e| e.count)
    }

    pub fn count_for_cultura(&self, cultura: &str) -> Option<u64> {
        self.por_cultura.iter().find(|c| c.cultura == cultura).map(|c| c.count)
    }
}
