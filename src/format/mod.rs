//! CPF/CNPJ identifier formatting.
//!
//! The canonical form (digits only) is what crosses the wire. The display form
//! is what the operator sees and edits.

use crate::models::AccountKind;

/// Digit count of a canonical CPF.
pub const CPF_LEN: usize = 11;
/// Digit count of a canonical CNPJ.
pub const CNPJ_LEN: usize = 14;

/// Strip every non-digit character.
pub fn unformat_identifier(display: &str) -> String {
    display.chars().filter(char::is_ascii_digit).collect()
}

/// Format a CPF as `DDD.DDD.DDD-DD`.
///
/// Absent or empty input yields `None`. Input that does not strip down to
/// exactly 11 digits comes back digits-only, without partial punctuation.
pub fn format_individual_identifier(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    Some(punctuate(&unformat_identifier(value), CPF_LEN, &[(3, '.'), (6, '.'), (9, '-')]))
}

/// Format a CNPJ as `DD.DDD.DDD/DDDD-DD`.
///
/// Same contract as [`format_individual_identifier`] with a 14-digit gate.
pub fn format_organization_identifier(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    Some(punctuate(
        &unformat_identifier(value),
        CNPJ_LEN,
        &[(2, '.'), (5, '.'), (8, '/'), (12, '-')],
    ))
}

/// Format whichever identifier belongs to `kind`.
pub fn format_identifier(kind: AccountKind, value: Option<&str>) -> Option<String> {
    match kind {
        AccountKind::Individual => format_individual_identifier(value),
        AccountKind::Organization => format_organization_identifier(value),
    }
}

/// Insert `marks` (digit offset, separator) when `digits` has exactly `len` digits.
fn punctuate(digits: &str, len: usize, marks: &[(usize, char)]) -> String {
    if digits.len() != len {
        return digits.to_string();
    }

    let mut out = String::with_capacity(len + marks.len());
    for (i, c) in digits.chars().enumerate() {
        if let Some((_, sep)) = marks.iter().find(|(at, _)| *at == i) {
            out.push(*sep);
        }
        out.push(c);
    }
    out
}
