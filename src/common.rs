pub mod cancel;
pub mod cpf_cnpj;
pub mod error;
