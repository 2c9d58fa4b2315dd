pub mod dashboard;
pub mod form;
pub mod operation;
pub mod produtor;
