// Backend falso (axum) que imita a API de produtores para os testes de integração.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use agro_produtores::{
    AppConfig, AppState, DashboardMode,
    models::produtor::{Crop, Producer, Property},
};

#[derive(Default)]
pub struct BackendState {
    pub producers: Vec<Producer>,
    pub next_id: i64,
    // "MÉTODO /caminho" de cada requisição recebida
    pub requests: Vec<String>,
    pub delay: Option<Duration>,
    pub fail_list: bool,
}

type Shared = Arc<Mutex<BackendState>>;

// Mesmo padrão do backend: skip=0, limit=100
pub const BACKEND_PAGE_LIMIT: usize = 100;

pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn producers(&self) -> Vec<Producer> {
        self.state.lock().unwrap().producers.clone()
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    /// Cadastra direto no backend, como o POST faria.
    pub fn seed(&self, producer: Producer) -> Producer {
        let mut state = self.state.lock().unwrap();
        let stored = assign_ids(&mut state, producer);
        state.producers.push(stored.clone());
        stored
    }

    pub fn app_state(&self, mode: DashboardMode, timeout: Duration) -> AppState {
        self.app_state_with_page_size(mode, timeout, BACKEND_PAGE_LIMIT)
    }

    pub fn app_state_with_page_size(&self, mode: DashboardMode, timeout: Duration, page_size: usize) -> AppState {
        AppState::new(AppConfig {
            api_base_url: self.base_url.clone(),
            request_timeout: timeout,
            dashboard_mode: mode,
            page_size,
        })
        .unwrap()
    }
}

fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn next_id(state: &mut BackendState) -> i64 {
    state.next_id += 1;
    state.next_id
}

fn assign_ids(state: &mut BackendState, mut producer: Producer) -> Producer {
    if producer.id.is_none() {
        producer.id = Some(next_id(state));
    }
    producer.cpf_cnpj = digits(&producer.cpf_cnpj);
    for prop in &mut producer.propriedades {
        if prop.id.is_none() {
            prop.id = Some(next_id(state));
        }
        for crop in &mut prop.culturas {
            if crop.id.is_none() {
                crop.id = Some(next_id(state));
            }
        }
    }
    producer
}

// Registra a requisição e aplica o atraso configurado (sem segurar o lock)
async fn enter(state: &Shared, line: String) {
    let delay = {
        let mut s = state.lock().unwrap();
        s.requests.push(line);
        s.delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Produtor não encontrado" }))).into_response()
}

async fn list_producers(State(state): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Response {
    enter(&state, "GET /produtores/".to_string()).await;
    let s = state.lock().unwrap();
    if s.fail_list {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    let param = |name: &str, default: usize| {
        query.get(name).and_then(|v| v.parse::<usize>().ok()).unwrap_or(default)
    };
    let skip = param("skip", 0);
    let limit = param("limit", BACKEND_PAGE_LIMIT);

    let found: Vec<Producer> = s
        .producers
        .iter()
        .filter(|p| query.get("cpf_cnpj").is_none_or(|cpf| p.cpf_cnpj == digits(cpf)))
        .skip(skip)
        .take(limit)
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn create_producer(State(state): State<Shared>, Json(body): Json<Producer>) -> Response {
    enter(&state, "POST /produtores/".to_string()).await;
    let mut s = state.lock().unwrap();
    if s.producers.iter().any(|p| p.cpf_cnpj == digits(&body.cpf_cnpj)) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "CPF/CNPJ já cadastrado." }))).into_response();
    }
    let stored = assign_ids(&mut s, body);
    s.producers.push(stored.clone());
    (StatusCode::CREATED, Json(stored)).into_response()
}

async fn get_producer(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    enter(&state, format!("GET /produtores/{id}")).await;
    let s = state.lock().unwrap();
    match s.producers.iter().find(|p| p.id == Some(id)) {
        Some(p) => Json(p.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_producer(State(state): State<Shared>, Path(id): Path<i64>, Json(mut body): Json<Producer>) -> Response {
    enter(&state, format!("PUT /produtores/{id}")).await;
    let mut s = state.lock().unwrap();
    let Some(pos) = s.producers.iter().position(|p| p.id == Some(id)) else {
        return not_found();
    };
    body.id = Some(id);
    let stored = assign_ids(&mut s, body);
    s.producers[pos] = stored.clone();
    Json(stored).into_response()
}

async fn delete_producer(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    enter(&state, format!("DELETE /produtores/{id}")).await;
    let mut s = state.lock().unwrap();
    let before = s.producers.len();
    s.producers.retain(|p| p.id != Some(id));
    if s.producers.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn all_properties(s: &BackendState) -> Vec<Property> {
    s.producers.iter().flat_map(|p| p.propriedades.clone()).collect()
}

async fn total_fazendas(State(state): State<Shared>) -> Response {
    enter(&state, "GET /dashboard/total_fazendas".to_string()).await;
    let s = state.lock().unwrap();
    Json(json!({ "total_fazendas": all_properties(&s).len() })).into_response()
}

async fn total_hectares(State(state): State<Shared>) -> Response {
    enter(&state, "GET /dashboard/total_hectares".to_string()).await;
    let s = state.lock().unwrap();
    let total: f64 = all_properties(&s).iter().map(|p| p.area_total_ha).sum();
    Json(json!({ "total_hectares": total })).into_response()
}

// Agrupa pelo texto cru, como o GROUP BY do backend
async fn por_estado(State(state): State<Shared>) -> Response {
    enter(&state, "GET /dashboard/por_estado".to_string()).await;
    let s = state.lock().unwrap();
    let mut groups: Vec<(String, u64)> = Vec::new();
    for prop in all_properties(&s) {
        match groups.iter_mut().find(|(e, _)| *e == prop.estado) {
            Some((_, count)) => *count += 1,
            None => groups.push((prop.estado.clone(), 1)),
        }
    }
    let body: Vec<_> = groups
        .into_iter()
        .map(|(estado, count)| json!({ "estado": estado, "count": count }))
        .collect();
    Json(body).into_response()
}

async fn por_cultura(State(state): State<Shared>) -> Response {
    enter(&state, "GET /dashboard/por_cultura".to_string()).await;
    let s = state.lock().unwrap();
    let mut groups: Vec<(String, u64)> = Vec::new();
    for crop in all_properties(&s).iter().flat_map(|p| p.culturas.clone()) {
        match groups.iter_mut().find(|(c, _)| *c == crop.nome_cultura) {
            Some((_, count)) => *count += 1,
            None => groups.push((crop.nome_cultura.clone(), 1)),
        }
    }
    let body: Vec<_> = groups
        .into_iter()
        .map(|(cultura, count)| json!({ "cultura": cultura, "count": count }))
        .collect();
    Json(body).into_response()
}

async fn por_uso_solo(State(state): State<Shared>) -> Response {
    enter(&state, "GET /dashboard/por_uso_solo".to_string()).await;
    let s = state.lock().unwrap();
    let props = all_properties(&s);
    Json(json!({
        "area_agricultavel": props.iter().map(|p| p.area_agricultavel_ha).sum::<f64>(),
        "area_vegetacao": props.iter().map(|p| p.area_vegetacao_ha).sum::<f64>(),
    }))
    .into_response()
}

pub async fn spawn_backend() -> MockBackend {
    let state: Shared = Arc::new(Mutex::new(BackendState::default()));

    let app = Router::new()
        .route("/produtores/", get(list_producers).post(create_producer))
        .route(
            "/produtores/{id}",
            get(get_producer).put(update_producer).delete(delete_producer),
        )
        .route("/dashboard/total_fazendas", get(total_fazendas))
        .route("/dashboard/total_hectares", get(total_hectares))
        .route("/dashboard/por_estado", get(por_estado))
        .route("/dashboard/por_cultura", get(por_cultura))
        .route("/dashboard/por_uso_solo", get(por_uso_solo))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: format!("http://{}", addr),
        state,
    }
}

// --- Fixtures ---

pub fn crop(nome: &str) -> Crop {
    Crop {
        id: None,
        nome_cultura: nome.to_string(),
        safra: "Safra 2024".to_string(),
    }
}

pub fn property(nome: &str, estado: &str, total: f64, agri: f64, veg: f64, culturas: Vec<Crop>) -> Property {
    Property {
        id: None,
        nome_fazenda: nome.to_string(),
        cidade: "Cidade".to_string(),
        estado: estado.to_string(),
        area_total_ha: total,
        area_agricultavel_ha: agri,
        area_vegetacao_ha: veg,
        culturas,
    }
}

pub fn producer(nome: &str, cpf_cnpj: &str, propriedades: Vec<Property>) -> Producer {
    Producer {
        id: None,
        nome_produtor: nome.to_string(),
        cpf_cnpj: cpf_cnpj.to_string(),
        propriedades,
    }
}

// Produtor numerado, com uma fazenda de 10 ha em SP
pub fn numbered_producer(n: usize) -> Producer {
    producer(
        &format!("Produtor {n}"),
        &format!("{n:011}"),
        vec![property(&format!("Fazenda {n}"), "SP", 10.0, 5.0, 5.0, vec![crop("Soja")])],
    )
}

pub const CPF_VALIDO: &str = "529.982.247-25";
pub const CNPJ_VALIDO: &str = "11.222.333/0001-81";
