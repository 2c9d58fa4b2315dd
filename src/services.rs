pub mod dashboard_service;
pub use dashboard_service::{DashboardSource, LocalDashboard, ServerDashboard};
pub mod producer_store;
pub use producer_store::ProducerStore;
pub mod form_service;
pub use form_service::FormService;
