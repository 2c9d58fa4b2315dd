// src/common/cpf_cnpj.rs

use validator::ValidationError;

pub const MSG_CPF_INVALIDO: &str = "CPF inválido.";
pub const MSG_CNPJ_INVALIDO: &str = "CNPJ inválido.";
pub const MSG_TAMANHO_INVALIDO: &str = "CPF ou CNPJ deve ter 11 ou 14 dígitos.";

const FATORES_CNPJ_1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const FATORES_CNPJ_2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Remove tudo que não for dígito ("529.982.247-25" -> "52998224725").
pub fn only_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn to_digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

// Sequências como 111.111.111-11 passam no cálculo, mas não são documentos válidos.
fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

pub fn is_valid_cpf(value: &str) -> bool {
    let digits = to_digits(value);
    if digits.len() != 11 || all_same(&digits) {
        return false;
    }

    for i in 9..11 {
        let sum: u32 = (0..i).map(|n| digits[n] * ((i as u32 + 1) - n as u32)).sum();
        let check = ((sum * 10) % 11) % 10;
        if check != digits[i] {
            return false;
        }
    }
    true
}

fn cnpj_check_digit(values: &[u32], factors: &[u32]) -> u32 {
    let sum: u32 = values.iter().zip(factors).map(|(v, f)| v * f).sum();
    let rem = sum % 11;
    if rem < 2 { 0 } else { 11 - rem }
}

pub fn is_valid_cnpj(value: &str) -> bool {
    let digits = to_digits(value);
    if digits.len() != 14 || all_same(&digits) {
        return false;
    }

    cnpj_check_digit(&digits[..12], &FATORES_CNPJ_1) == digits[12]
        && cnpj_check_digit(&digits[..13], &FATORES_CNPJ_2) == digits[13]
}

/// Valida CPF (11 dígitos) ou CNPJ (14 dígitos), ignorando a máscara.
/// Retorna a mensagem do defeito encontrado.
pub fn check(value: &str) -> Result<(), &'static str> {
    let clean = only_digits(value);
    match clean.len() {
        11 if is_valid_cpf(&clean) => Ok(()),
        11 => Err(MSG_CPF_INVALIDO),
        14 if is_valid_cnpj(&clean) => Ok(()),
        14 => Err(MSG_CNPJ_INVALIDO),
        _ => Err(MSG_TAMANHO_INVALIDO),
    }
}

// Função usada pelo `#[validate(custom(...))]` do formulário
pub fn validate_cpf_cnpj(value: &str) -> Result<(), ValidationError> {
    check(value).map_err(|msg| ValidationError::new("cpf_cnpj").with_message(msg.into()))
}
