pub mod produtor_api;
pub use produtor_api::ProducerApi;
pub mod dashboard_api;
pub use dashboard_api::DashboardApi;
