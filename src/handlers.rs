pub mod dashboard;
pub mod produtores;
