//! Field validation shared by every entity. Each helper returns the
//! normalized value or a `ModelError::Validation` naming the field.
use crate::errors::ModelError;

pub fn validate_required(field: &str, value: &str) -> Result<String, ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ModelError::invalid(field, "is required"));
    }
    Ok(v.to_string())
}

/// Blank optional text collapses to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn validate_email(field: &str, value: &str) -> Result<String, ModelError> {
    let v = validate_required(field, value)?.to_lowercase();
    let valid = match v.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || v.chars().any(char::is_whitespace) {
        return Err(ModelError::invalid(field, "invalid email address"));
    }
    Ok(v)
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn validate_document(field: &str, value: &str, len: usize) -> Result<String, ModelError> {
    validate_required(field, value)?;
    if value.chars().any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '/' | ' '))) {
        return Err(ModelError::invalid(field, format!("must contain {len} digits")));
    }
    let digits = digits_only(value);
    if digits.len() != len {
        return Err(ModelError::invalid(field, format!("must contain {len} digits")));
    }
    Ok(digits)
}

/// CPF: 11 digits, punctuation ignored. Returns the bare digits.
pub fn validate_cpf(value: &str) -> Result<String, ModelError> {
    validate_document("cpf", value, 11)
}

/// CNPJ: 14 digits, punctuation ignored. Returns the bare digits.
pub fn validate_cnpj(value: &str) -> Result<String, ModelError> {
    validate_document("cnpj", value, 14)
}

/// Accepts the old `ABC1234` and the Mercosul `ABC1D23` layouts.
pub fn validate_plate(value: &str) -> Result<String, ModelError> {
    let plate: String = value
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if plate.is_empty() {
        return Err(ModelError::invalid("plate", "is required"));
    }
    let b = plate.as_bytes();
    let ok = b.len() == 7
        && b[..3].iter().all(u8::is_ascii_uppercase)
        && b[3].is_ascii_digit()
        && (b[4].is_ascii_digit() || b[4].is_ascii_uppercase())
        && b[5..].iter().all(u8::is_ascii_digit);
    if !ok {
        return Err(ModelError::invalid("plate", "expected ABC1234 or ABC1D23"));
    }
    Ok(plate)
}

pub fn validate_year(year: i32, current_year: i32) -> Result<i32, ModelError> {
    if !(1886..=current_year + 1).contains(&year) {
        return Err(ModelError::invalid("year", format!("must be between 1886 and {}", current_year + 1)));
    }
    Ok(year)
}

pub fn validate_positive_price(field: &str, cents: i64) -> Result<i64, ModelError> {
    if cents <= 0 {
        return Err(ModelError::invalid(field, "must be greater than zero"));
    }
    Ok(cents)
}

pub fn validate_non_negative(field: &str, value: i64) -> Result<i64, ModelError> {
    if value < 0 {
        return Err(ModelError::invalid(field, "must not be negative"));
    }
    Ok(value)
}

pub fn validate_quantity(field: &str, qty: i32) -> Result<i32, ModelError> {
    if qty < 1 {
        return Err(ModelError::invalid(field, "must be at least 1"));
    }
    Ok(qty)
}
