// src/models/produtor.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

// --- CULTURA PLANTADA ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Crop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[validate(length(min = 1, message = "Informe o nome da cultura."))]
    pub nome_cultura: String, // Ex: "Soja"
    #[validate(length(min = 1, message = "Informe a safra da cultura."))]
    pub safra: String, // Ex: "Safra 2024"
}

// --- PROPRIEDADE RURAL (FAZENDA) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub nome_fazenda: String,
    pub cidade: String,
    pub estado: String, // Texto livre: "SP", "sp", "São Paulo"...

    pub area_total_ha: f64,
    pub area_agricultavel_ha: f64,
    pub area_vegetacao_ha: f64,

    // A fazenda é dona das suas culturas (ordem preservada)
    #[serde(default)]
    pub culturas: Vec<Crop>,
}

impl Property {
    /// Agricultável + vegetação cabe na área total (igualdade é permitida).
    pub fn areas_fit(&self) -> bool {
        self.area_agricultavel_ha + self.area_vegetacao_ha <= self.area_total_ha
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

// --- PRODUTOR RURAL ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub nome_produtor: String,
    pub cpf_cnpj: String,

    #[serde(default)]
    pub propriedades: Vec<Property>,
}

impl Producer {
    /// Anexa ao produtor apenas as propriedades que ainda não foram persistidas.
    /// É o "merge" usado quando o CPF/CNPJ enviado já existe no backend.
    pub fn merged_with_new_properties(&self, submitted: &[Property]) -> Producer {
        let mut merged = self.clone();
        merged.propriedades.extend(
            submitted
                .iter()
                .filter(|p| !p.is_persisted())
                .cloned(),
        );
        merged
    }
}
