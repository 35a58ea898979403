//! Candidate input validation.
//!
//! Each field of the student schema is declared once with its rule. Rules
//! are evaluated independently and every violation is collected, so a
//! caller sees all field errors from a single submission.

use serde_json::Value;

use crate::students::model::{FieldError, StudentInput};

/// Maximum length, in characters, of `nome` and `curso` after trimming.
pub const MAX_TEXT_CHARS: usize = 100;
/// Inclusive bounds for `idade`.
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 150;

/// A constraint over one JSON value, producing the normalized form.
trait Rule {
    type Output;

    fn check(&self, value: Option<&Value>) -> Result<Self::Output, String>;
}

/// A named field bound to its rule.
struct Field<R> {
    name: &'static str,
    rule: R,
}

impl<R: Rule> Field<R> {
    fn collect(&self, raw: &Value, errors: &mut Vec<FieldError>) -> Option<R::Output> {
        match self.rule.check(raw.get(self.name)) {
            Ok(value) => Some(value),
            Err(message) => {
                errors.push(FieldError::new(self.name, message));
                None
            }
        }
    }
}

/// Required text, trimmed, bounded length.
struct TrimmedText {
    label: &'static str,
    max_chars: usize,
}

impl Rule for TrimmedText {
    type Output = String;

    fn check(&self, value: Option<&Value>) -> Result<String, String> {
        let trimmed = match value.and_then(Value::as_str).map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return Err(format!("{} is required and must be valid text", self.label)),
        };
        if trimmed.chars().count() > self.max_chars {
            return Err(format!(
                "{} must be at most {} characters",
                self.label, self.max_chars
            ));
        }
        Ok(trimmed.to_string())
    }
}

/// Required whole number within an inclusive range.
struct WholeNumber {
    label: &'static str,
    min: i64,
    max: i64,
}

impl Rule for WholeNumber {
    type Output = i32;

    fn check(&self, value: Option<&Value>) -> Result<i32, String> {
        let number = value.and_then(as_whole_number).ok_or_else(|| {
            format!("{} is required and must be a whole number", self.label)
        })?;
        if number < self.min || number > self.max {
            return Err(format!(
                "{} must be between {} and {}",
                self.label, self.min, self.max
            ));
        }
        i32::try_from(number)
            .map_err(|_| format!("{} must be between {} and {}", self.label, self.min, self.max))
    }
}

fn as_whole_number(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    // Covers 20.0 as well as integers beyond i64, which fail the range check.
    number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// Required `local@domain.tld` address, trimmed and lowercased.
struct EmailAddress;

impl Rule for EmailAddress {
    type Output = String;

    fn check(&self, value: Option<&Value>) -> Result<String, String> {
        let text = value
            .and_then(Value::as_str)
            .ok_or_else(|| "Email is required".to_string())?;
        let trimmed = text.trim();
        if !has_email_shape(trimmed) {
            return Err("Email must be a valid address".to_string());
        }
        Ok(trimmed.to_lowercase())
    }
}

/// One `@`, no whitespace, a non-empty local part, and a domain with a dot
/// that has characters on both sides.
fn has_email_shape(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@');
    clean(local)
        && clean(domain)
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

const NOME: Field<TrimmedText> = Field {
    name: "nome",
    rule: TrimmedText { label: "Name", max_chars: MAX_TEXT_CHARS },
};

const IDADE: Field<WholeNumber> = Field {
    name: "idade",
    rule: WholeNumber { label: "Age", min: MIN_AGE, max: MAX_AGE },
};

const EMAIL: Field<EmailAddress> = Field {
    name: "email",
    rule: EmailAddress,
};

const CURSO: Field<TrimmedText> = Field {
    name: "curso",
    rule: TrimmedText { label: "Course", max_chars: MAX_TEXT_CHARS },
};

/// Validate a raw candidate submission.
///
/// Returns the normalized input, or every field error in schema order
/// (`nome`, `idade`, `email`, `curso`). Email uniqueness is not checked
/// here; the store enforces it.
pub fn validate(raw: &Value) -> Result<StudentInput, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = NOME.collect(raw, &mut errors);
    let age = IDADE.collect(raw, &mut errors);
    let email = EMAIL.collect(raw, &mut errors);
    let course = CURSO.collect(raw, &mut errors);

    match (name, age, email, course) {
        (Some(name), Some(age), Some(email), Some(course)) => Ok(StudentInput {
            name,
            age,
            email,
            course,
        }),
        _ => Err(errors),
    }
}
