// src/models/form.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::cpf_cnpj::validate_cpf_cnpj,
    common::error::AppError,
    models::produtor::{Crop, Producer, Property},
};

// --- ESTADO DO FORMULÁRIO (máquina de estados) ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormState {
    Empty,
    EditingNew,
    EditingExisting { id: i64 },
    Submitting,
    Succeeded { message: String },
    Failed { message: String },
}

// --- DADOS DO FORMULÁRIO ---
// As áreas ficam como texto, do jeito que o usuário digitou, até a submissão.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_property_areas"))]
pub struct PropertyForm {
    // Id temporário, usado para identificar a fazenda antes de ter `id`
    pub local_id: String,
    pub id: Option<i64>,
    #[validate(length(min = 1, message = "Informe o nome da fazenda."))]
    pub nome_fazenda: String,
    #[validate(length(min = 1, message = "Informe a cidade."))]
    pub cidade: String,
    #[validate(length(min = 1, message = "Informe o estado."))]
    pub estado: String,
    #[validate(length(min = 1, message = "Informe a Área Total (ha)."))]
    pub area_total_ha: String,
    #[validate(length(min = 1, message = "Informe a Área Agricultável (ha)."))]
    pub area_agricultavel_ha: String,
    #[validate(length(min = 1, message = "Informe a Área de Vegetação (ha)."))]
    pub area_vegetacao_ha: String,
    #[validate(nested)]
    pub culturas: Vec<Crop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProducerForm {
    pub id: Option<i64>,
    #[validate(length(min = 1, message = "Informe o nome do produtor."))]
    pub nome_produtor: String,
    #[validate(
        length(min = 1, message = "Informe o CPF ou CNPJ."),
        custom(function = "validate_cpf_cnpj")
    )]
    pub cpf_cnpj: String,
    pub propriedades: Vec<PropertyForm>,
}

// Campos obrigatórios da fazenda, na ordem em que aparecem no formulário
const CAMPOS_OBRIGATORIOS_FAZENDA: [&str; 6] = [
    "nome_fazenda",
    "cidade",
    "estado",
    "area_total_ha",
    "area_agricultavel_ha",
    "area_vegetacao_ha",
];

/// Campo editável de uma propriedade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    NomeFazenda,
    Cidade,
    Estado,
    AreaTotal,
    AreaAgricultavel,
    AreaVegetacao,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropField {
    NomeCultura,
    Safra,
}

pub const MSG_MINIMO_UMA_PROPRIEDADE: &str = "O produtor deve ter pelo menos uma propriedade.";

/// Converte o texto digitado em hectares. Aceita vírgula como separador decimal.
pub fn parse_area(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn area_error(message: String) -> ValidationError {
    ValidationError::new("area").with_message(message.into())
}

// Regra de área da fazenda: valores numéricos, não negativos,
// e agricultável + vegetação <= total.
fn validate_property_areas(prop: &PropertyForm) -> Result<(), ValidationError> {
    let label = prop.label();
    let parse = |text: &str, campo: &str| {
        parse_area(text).ok_or_else(|| {
            area_error(format!("Informe um valor numérico para {campo} na fazenda \"{label}\"."))
        })
    };

    let total = parse(&prop.area_total_ha, "Área Total (ha)")?;
    let agricultavel = parse(&prop.area_agricultavel_ha, "Área Agricultável (ha)")?;
    let vegetacao = parse(&prop.area_vegetacao_ha, "Área de Vegetação (ha)")?;

    if total < 0.0 || agricultavel < 0.0 || vegetacao < 0.0 {
        return Err(area_error(format!(
            "As áreas não podem ser negativas (fazenda \"{label}\")."
        )));
    }

    if agricultavel + vegetacao > total {
        return Err(area_error(format!(
            "A soma de Área Agricultável e Área de Vegetação (ha) na fazenda \"{label}\" não pode ser maior que a Área Total (ha)."
        )));
    }
    Ok(())
}

// Mensagem do erro `code` no campo `field`, se houver
fn message_for(errors: &ValidationErrors, field: &str, code: &str) -> Option<String> {
    errors
        .field_errors()
        .get(field)?
        .iter()
        .find(|e| e.code == code)
        .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string()))
}

fn required_message(errors: &ValidationErrors, field: &str) -> Option<String> {
    message_for(errors, field, "length")
}

// Pega a primeira mensagem de um ValidationErrors
fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Um ou mais campos são inválidos.".to_string())
}

impl PropertyForm {
    pub fn blank() -> Self {
        Self {
            local_id: Uuid::new_v4().to_string(),
            id: None,
            nome_fazenda: String::new(),
            cidade: String::new(),
            estado: String::new(),
            area_total_ha: String::new(),
            area_agricultavel_ha: String::new(),
            area_vegetacao_ha: String::new(),
            culturas: Vec::new(),
        }
    }

    pub fn from_property(prop: &Property) -> Self {
        Self {
            local_id: prop
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            id: prop.id,
            nome_fazenda: prop.nome_fazenda.clone(),
            cidade: prop.cidade.clone(),
            estado: prop.estado.clone(),
            area_total_ha: prop.area_total_ha.to_string(),
            area_agricultavel_ha: prop.area_agricultavel_ha.to_string(),
            area_vegetacao_ha: prop.area_vegetacao_ha.to_string(),
            culturas: prop.culturas.clone(),
        }
    }

    /// Nome da fazenda, ou o id local quando o nome ainda está em branco.
    pub fn label(&self) -> &str {
        if self.nome_fazenda.trim().is_empty() {
            &self.local_id
        } else {
            &self.nome_fazenda
        }
    }

    pub fn set(&mut self, field: PropertyField, value: impl Into<String>) {
        let value = value.into();
        match field {
            PropertyField::NomeFazenda => self.nome_fazenda = value,
            PropertyField::Cidade => self.cidade = value,
            PropertyField::Estado => self.estado = value,
            PropertyField::AreaTotal => self.area_total_ha = value,
            PropertyField::AreaAgricultavel => self.area_agricultavel_ha = value,
            PropertyField::AreaVegetacao => self.area_vegetacao_ha = value,
        }
    }

    fn to_property(&self) -> Result<Property, AppError> {
        let area = |text: &str| {
            parse_area(text).ok_or_else(|| {
                AppError::Validation(format!("Área inválida na fazenda \"{}\".", self.label()))
            })
        };
        Ok(Property {
            id: self.id,
            nome_fazenda: self.nome_fazenda.clone(),
            cidade: self.cidade.clone(),
            estado: self.estado.clone(),
            area_total_ha: area(&self.area_total_ha)?,
            area_agricultavel_ha: area(&self.area_agricultavel_ha)?,
            area_vegetacao_ha: area(&self.area_vegetacao_ha)?,
            culturas: self.culturas.clone(),
        })
    }
}

impl ProducerForm {
    /// Formulário em branco: uma fazenda vazia, nenhuma cultura.
    pub fn blank() -> Self {
        Self {
            id: None,
            nome_produtor: String::new(),
            cpf_cnpj: String::new(),
            propriedades: vec![PropertyForm::blank()],
        }
    }

    pub fn from_producer(producer: &Producer) -> Self {
        let mut propriedades: Vec<PropertyForm> =
            producer.propriedades.iter().map(PropertyForm::from_property).collect();
        if propriedades.is_empty() {
            propriedades.push(PropertyForm::blank());
        }
        Self {
            id: producer.id,
            nome_produtor: producer.nome_produtor.clone(),
            cpf_cnpj: producer.cpf_cnpj.clone(),
            propriedades,
        }
    }

    pub fn property_mut(&mut self, local_id: &str) -> Result<&mut PropertyForm, AppError> {
        self.propriedades
            .iter_mut()
            .find(|p| p.local_id == local_id)
            .ok_or_else(|| AppError::Validation(format!("Fazenda \"{local_id}\" não encontrada no formulário.")))
    }

    /// Regras da submissão, na ordem: campos obrigatórios (na ordem do formulário),
    /// CPF/CNPJ, depois a área de cada fazenda. Para no primeiro defeito.
    pub fn check(&self) -> Result<(), AppError> {
        self.check_required()?;

        if let Err(errors) = self.validate() {
            if let Some(msg) = message_for(&errors, "cpf_cnpj", "cpf_cnpj") {
                return Err(AppError::Validation(msg));
            }
            return Err(AppError::Validation(first_message(&errors)));
        }

        for prop in &self.propriedades {
            if let Err(errors) = prop.validate() {
                return Err(AppError::Validation(first_message(&errors)));
            }
        }
        Ok(())
    }

    fn check_required(&self) -> Result<(), AppError> {
        if let Err(errors) = self.validate() {
            for field in ["nome_produtor", "cpf_cnpj"] {
                if let Some(msg) = required_message(&errors, field) {
                    return Err(AppError::Validation(msg));
                }
            }
        }

        for prop in &self.propriedades {
            let in_fazenda = |msg: String| AppError::Validation(format!("{msg} (fazenda \"{}\")", prop.label()));

            if let Err(errors) = prop.validate() {
                for field in CAMPOS_OBRIGATORIOS_FAZENDA {
                    if let Some(msg) = required_message(&errors, field) {
                        return Err(in_fazenda(msg));
                    }
                }
            }
            for crop in &prop.culturas {
                if let Err(errors) = crop.validate() {
                    for field in ["nome_cultura", "safra"] {
                        if let Some(msg) = required_message(&errors, field) {
                            return Err(in_fazenda(msg));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Converte o formulário no payload da API (áreas em número).
    pub fn to_producer(&self) -> Result<Producer, AppError> {
        let propriedades = self
            .propriedades
            .iter()
            .map(PropertyForm::to_property)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Producer {
            id: self.id,
            nome_produtor: self.nome_produtor.clone(),
            cpf_cnpj: self.cpf_cnpj.clone(),
            propriedades,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_areas(total: &str, agri: &str, veg: &str) -> ProducerForm {
        let mut form = ProducerForm::blank();
        form.nome_produtor = "José".to_string();
        form.cpf_cnpj = "529.982.247-25".to_string();
        let prop = &mut form.propriedades[0];
        prop.nome_fazenda = "Fazenda Esperança".to_string();
        prop.cidade = "Sorriso".to_string();
        prop.estado = "MT".to_string();
        prop.area_total_ha = total.to_string();
        prop.area_agricultavel_ha = agri.to_string();
        prop.area_vegetacao_ha = veg.to_string();
        form
    }

    #[test]
    fn area_sum_over_total_is_rejected() {
        let form = form_with_areas("100", "60", "50");
        let err = form.check().unwrap_err();
        assert!(matches!(&err, AppError::Validation(msg) if msg.contains("Fazenda Esperança")));
    }

    #[test]
    fn area_sum_equal_to_total_is_accepted() {
        let form = form_with_areas("100", "60", "40");
        assert!(form.check().is_ok());

        let producer = form.to_producer().unwrap();
        assert_eq!(producer.propriedades[0].area_total_ha, 100.0);
        assert_eq!(producer.propriedades[0].area_vegetacao_ha, 40.0);
    }

    #[test]
    fn tax_id_is_checked_before_areas() {
        let mut form = form_with_areas("100", "60", "50");
        form.cpf_cnpj = "111.111.111-11".to_string();
        let err = form.check().unwrap_err();
        assert_eq!(err.user_message(), "CPF inválido.");
    }

    #[test]
    fn unnamed_property_is_reported_by_local_id() {
        let mut form = form_with_areas("100", "10", "10");
        let mut second = PropertyForm::blank();
        second.cidade = "Sinop".to_string();
        second.estado = "MT".to_string();
        second.area_total_ha = "5".to_string();
        second.area_agricultavel_ha = "5".to_string();
        second.area_vegetacao_ha = "1".to_string();
        let local_id = second.local_id.clone();
        form.propriedades.push(second);

        let msg = form.check().unwrap_err().user_message();
        assert!(msg.starts_with("Informe o nome da fazenda."), "{msg}");
        assert!(msg.contains(&local_id), "{msg}");
    }

    #[test]
    fn required_fields_come_first_in_form_order() {
        let mut form = form_with_areas("100", "60", "50");
        form.nome_produtor.clear();
        form.cpf_cnpj = "111.111.111-11".to_string();
        form.propriedades[0].estado.clear();
        assert_eq!(form.check().unwrap_err().user_message(), "Informe o nome do produtor.");

        form.nome_produtor = "José".to_string();
        assert_eq!(
            form.check().unwrap_err().user_message(),
            "Informe o estado. (fazenda \"Fazenda Esperança\")"
        );

        form.propriedades[0].estado = "MT".to_string();
        form.propriedades[0].culturas.push(Crop {
            id: None,
            nome_cultura: "Soja".to_string(),
            safra: String::new(),
        });
        assert_eq!(
            form.check().unwrap_err().user_message(),
            "Informe a safra da cultura. (fazenda \"Fazenda Esperança\")"
        );

        // Com tudo preenchido, volta a valer a ordem CPF/CNPJ -> áreas
        form.propriedades[0].culturas[0].safra = "2024".to_string();
        assert_eq!(form.check().unwrap_err().user_message(), "CPF inválido.");
    }

    #[test]
    fn blank_tax_id_is_a_required_field() {
        let mut form = form_with_areas("100", "60", "40");
        form.cpf_cnpj.clear();
        assert_eq!(form.check().unwrap_err().user_message(), "Informe o CPF ou CNPJ.");
    }

    #[test]
    fn unparseable_and_negative_areas_are_rejected() {
        assert!(form_with_areas("", "0", "0").check().is_err());
        assert!(form_with_areas("abc", "0", "0").check().is_err());
        assert!(form_with_areas("100", "-1", "0").check().is_err());
        assert!(form_with_areas("10,5", "5,25", "5,25").check().is_ok());
    }

    #[test]
    fn from_producer_keeps_ids_as_local_ids() {
        let producer = Producer {
            id: Some(4),
            nome_produtor: "Ana".to_string(),
            cpf_cnpj: "52998224725".to_string(),
            propriedades: vec![Property {
                id: Some(9),
                nome_fazenda: "Sol".to_string(),
                cidade: "Londrina".to_string(),
                estado: "PR".to_string(),
                area_total_ha: 12.5,
                area_agricultavel_ha: 10.0,
                area_vegetacao_ha: 2.5,
                culturas: vec![],
            }],
        };
        let form = ProducerForm::from_producer(&producer);
        assert_eq!(form.propriedades[0].local_id, "9");
        assert_eq!(form.to_producer().unwrap(), producer);
    }
}
