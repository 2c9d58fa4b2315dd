// src/services/form_service.rs

use serde::Serialize;

use crate::{
    common::error::AppError,
    models::{
        form::{CropField, FormState, MSG_MINIMO_UMA_PROPRIEDADE, ProducerForm, PropertyField, PropertyForm},
        produtor::{Crop, Producer},
    },
    services::producer_store::ProducerStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    New,
    Existing(i64),
}

/// O que a submissão fez no backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Created,
    // CPF/CNPJ já existia: as fazendas novas foram anexadas ao produtor existente
    Merged,
    Updated,
}

impl SubmitOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubmitOutcome::Created => "Produtor cadastrado com sucesso!",
            SubmitOutcome::Merged => "Novas propriedades adicionadas ao produtor existente com sucesso!",
            SubmitOutcome::Updated => "Produtor atualizado com sucesso!",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    pub outcome: SubmitOutcome,
    pub producer: Producer,
}

// =============================================================================
//  SESSÃO DO FORMULÁRIO (máquina de estados)
// =============================================================================

#[derive(Debug, Clone)]
pub struct FormSession {
    state: FormState,
    mode: Option<Mode>,
    form: ProducerForm,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self {
            state: FormState::Empty,
            mode: None,
            form: ProducerForm::blank(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn form(&self) -> &ProducerForm {
        &self.form
    }

    fn invalid(&self, action: &str) -> AppError {
        AppError::InvalidTransition(format!("não é possível {} no estado {:?}", action, self.state))
    }

    fn editing_state(mode: Mode) -> FormState {
        match mode {
            Mode::New => FormState::EditingNew,
            Mode::Existing(id) => FormState::EditingExisting { id },
        }
    }

    /// Começa um cadastro novo com um formulário em branco.
    pub fn start_new(&mut self) -> Result<(), AppError> {
        if self.state == FormState::Submitting {
            return Err(self.invalid("iniciar um cadastro"));
        }
        self.mode = Some(Mode::New);
        self.form = ProducerForm::blank();
        self.state = FormState::EditingNew;
        Ok(())
    }

    /// Cadastro novo já preenchido (ex.: vindo de um arquivo JSON).
    pub fn start_new_with(&mut self, draft: &Producer) -> Result<(), AppError> {
        self.start_new()?;
        self.form = ProducerForm::from_producer(draft);
        self.form.id = None;
        Ok(())
    }

    /// Carrega um produtor já persistido para edição.
    pub fn start_edit(&mut self, producer: &Producer) -> Result<(), AppError> {
        if self.state == FormState::Submitting {
            return Err(self.invalid("editar um produtor"));
        }
        let id = producer.id.ok_or_else(|| {
            AppError::InvalidTransition("só é possível editar um produtor já cadastrado".to_string())
        })?;

        self.mode = Some(Mode::Existing(id));
        self.form = ProducerForm::from_producer(producer);
        self.state = FormState::EditingExisting { id };
        Ok(())
    }

    // Edições só valem em modo de edição; depois de sucesso/falha voltam a editar
    fn edit(&mut self) -> Result<&mut ProducerForm, AppError> {
        let resume = match (&self.state, self.mode) {
            (FormState::EditingNew | FormState::EditingExisting { .. }, _) => None,
            (FormState::Succeeded { .. } | FormState::Failed { .. }, Some(mode)) => Some(mode),
            _ => return Err(self.invalid("editar o formulário")),
        };
        if let Some(mode) = resume {
            self.state = Self::editing_state(mode);
        }
        Ok(&mut self.form)
    }

    pub fn set_nome_produtor(&mut self, value: impl Into<String>) -> Result<(), AppError> {
        self.edit()?.nome_produtor = value.into();
        Ok(())
    }

    pub fn set_cpf_cnpj(&mut self, value: impl Into<String>) -> Result<(), AppError> {
        self.edit()?.cpf_cnpj = value.into();
        Ok(())
    }

    pub fn set_property_field(
        &mut self,
        local_id: &str,
        field: PropertyField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        self.edit()?.property_mut(local_id)?.set(field, value);
        Ok(())
    }

    /// Adiciona uma fazenda em branco e devolve o seu id local.
    pub fn add_property(&mut self) -> Result<String, AppError> {
        let prop = PropertyForm::blank();
        let local_id = prop.local_id.clone();
        self.edit()?.propriedades.push(prop);
        Ok(local_id)
    }

    pub fn remove_property(&mut self, local_id: &str) -> Result<(), AppError> {
        let form = self.edit()?;
        if form.propriedades.len() <= 1 {
            return Err(AppError::Validation(MSG_MINIMO_UMA_PROPRIEDADE.to_string()));
        }
        form.property_mut(local_id)?;
        form.propriedades.retain(|p| p.local_id != local_id);
        Ok(())
    }

    /// Adiciona uma cultura vazia à fazenda e devolve o índice dela.
    pub fn add_crop(&mut self, local_id: &str) -> Result<usize, AppError> {
        let prop = self.edit()?.property_mut(local_id)?;
        prop.culturas.push(Crop {
            id: None,
            nome_cultura: String::new(),
            safra: String::new(),
        });
        Ok(prop.culturas.len() - 1)
    }

    pub fn set_crop_field(
        &mut self,
        local_id: &str,
        index: usize,
        field: CropField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        let prop = self.edit()?.property_mut(local_id)?;
        let crop = prop
            .culturas
            .get_mut(index)
            .ok_or_else(|| AppError::Validation(format!("Cultura {index} não existe nesta fazenda.")))?;
        match field {
            CropField::NomeCultura => crop.nome_cultura = value.into(),
            CropField::Safra => crop.safra = value.into(),
        }
        Ok(())
    }

    pub fn remove_crop(&mut self, local_id: &str, index: usize) -> Result<(), AppError> {
        let prop = self.edit()?.property_mut(local_id)?;
        if index >= prop.culturas.len() {
            return Err(AppError::Validation(format!("Cultura {index} não existe nesta fazenda.")));
        }
        prop.culturas.remove(index);
        Ok(())
    }

    fn begin_submit(&mut self) -> Result<Mode, AppError> {
        let mode = match (&self.state, self.mode) {
            (FormState::EditingNew | FormState::EditingExisting { .. } | FormState::Failed { .. }, Some(mode)) => mode,
            _ => return Err(self.invalid("enviar o formulário")),
        };
        self.state = FormState::Submitting;
        Ok(mode)
    }

    fn finish(&mut self, mode: Mode, result: &Result<SubmitResult, AppError>) {
        self.state = match result {
            Ok(done) => {
                if mode == Mode::New {
                    self.form = ProducerForm::blank();
                }
                FormState::Succeeded {
                    message: done.outcome.message().to_string(),
                }
            }
            Err(e) => FormState::Failed {
                message: e.user_message(),
            },
        };
    }
}

// =============================================================================
//  SUBMISSÃO
// =============================================================================

#[derive(Clone)]
pub struct FormService {
    store: ProducerStore,
}

impl FormService {
    pub fn new(store: ProducerStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ProducerStore {
        &self.store
    }

    /// Valida e envia o formulário.
    ///
    /// Edição vira `PUT`. Cadastro novo consulta o CPF/CNPJ antes: se já existir,
    /// só as fazendas sem `id` são anexadas ao produtor existente (`PUT`);
    /// senão é um `POST`.
    pub async fn submit(&self, session: &mut FormSession) -> Result<SubmitResult, AppError> {
        let mode = session.begin_submit()?;
        let result = self.send(mode, &session.form).await;
        session.finish(mode, &result);
        result
    }

    async fn send(&self, mode: Mode, form: &ProducerForm) -> Result<SubmitResult, AppError> {
        // Validação local: se falhar, nenhuma requisição é feita
        form.check()?;
        let data = form.to_producer()?;

        match mode {
            Mode::Existing(id) => {
                let producer = self.store.update_producer(id, &data).await?;
                Ok(SubmitResult {
                    outcome: SubmitOutcome::Updated,
                    producer,
                })
            }
            Mode::New => match self.store.fetch_producer_by_cpf_cnpj(&data.cpf_cnpj).await? {
                Some(existing) => {
                    let id = existing
                        .id
                        .ok_or_else(|| anyhow::anyhow!("Produtor retornado pelo backend sem id"))?;
                    let merged = existing.merged_with_new_properties(&data.propriedades);
                    tracing::info!(
                        "CPF/CNPJ já cadastrado (produtor {}). Anexando {} fazenda(s) nova(s).",
                        id,
                        merged.propriedades.len() - existing.propriedades.len()
                    );

                    let producer = self.store.update_producer(id, &merged).await?;
                    Ok(SubmitResult {
                        outcome: SubmitOutcome::Merged,
                        producer,
                    })
                }
                None => {
                    let producer = self.store.create_producer(&data).await?;
                    Ok(SubmitResult {
                        outcome: SubmitOutcome::Created,
                        producer,
                    })
                }
            },
        }
    }
}
