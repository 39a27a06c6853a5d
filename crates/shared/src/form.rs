//! Form-level helpers for building employee payloads from raw user input.

use std::sync::LazyLock;

use regex::Regex;

use crate::{error::ValidationError, protocol::EmployeeInput};

pub const MOBILE_PREFIX: &str = "010";
pub const DEFAULT_EMAIL_DOMAIN: &str = "naver.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonePart {
    Middle,
    Last,
}

pub fn compose_email(local: &str, domain: &str) -> String {
    let (local, domain) = (local.trim(), domain.trim());
    if local.is_empty() || domain.is_empty() {
        return String::new();
    }
    format!("{local}@{domain}")
}

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Accepts `x@y.z` where no part contains whitespace or a second `@`.
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}

/// Digits only; the middle part is three digits long for non-mobile prefixes.
pub fn sanitize_phone_part(prefix: &str, part: PhonePart, raw: &str) -> String {
    let max_len = match part {
        PhonePart::Middle if prefix != MOBILE_PREFIX => 3,
        _ => 4,
    };
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(max_len)
        .collect()
}

pub fn validate_search_query(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(trimmed.to_string())
}

/// Raw register-form state. Every field is free text until [`EmployeeDraft::into_input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub employee_id: String,
    pub name: String,
    pub email_local: String,
    pub email_domain: String,
    pub department: String,
    pub gender: String,
    pub birth_date: String,
    pub phone_prefix: String,
    pub phone_middle: String,
    pub phone_last: String,
    pub zip_code: String,
    pub address1: String,
    pub address2: String,
    pub position: String,
}

impl Default for EmployeeDraft {
    fn default() -> Self {
        Self {
            employee_id: String::new(),
            name: String::new(),
            email_local: String::new(),
            email_domain: DEFAULT_EMAIL_DOMAIN.into(),
            department: String::new(),
            gender: String::new(),
            birth_date: String::new(),
            phone_prefix: MOBILE_PREFIX.into(),
            phone_middle: String::new(),
            phone_last: String::new(),
            zip_code: String::new(),
            address1: String::new(),
            address2: String::new(),
            position: String::new(),
        }
    }
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl EmployeeDraft {
    /// Switching prefixes invalidates the digits typed for the old one.
    pub fn set_phone_prefix(&mut self, prefix: impl Into<String>) {
        self.phone_prefix = prefix.into();
        self.phone_middle.clear();
        self.phone_last.clear();
    }

    pub fn set_phone_part(&mut self, part: PhonePart, raw: &str) {
        let digits = sanitize_phone_part(&self.phone_prefix, part, raw);
        match part {
            PhonePart::Middle => self.phone_middle = digits,
            PhonePart::Last => self.phone_last = digits,
        }
    }

    pub fn email(&self) -> String {
        compose_email(&self.email_local, &self.email_domain)
    }

    pub fn into_input(self) -> Result<EmployeeInput, ValidationError> {
        if self.employee_id.trim().is_empty() {
            return Err(ValidationError::MissingField("employeeId"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        let email = self.email();
        if !email.is_empty() && !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail(email));
        }

        let phone_middle = sanitize_phone_part(&self.phone_prefix, PhonePart::Middle, &self.phone_middle);
        let phone_last = sanitize_phone_part(&self.phone_prefix, PhonePart::Last, &self.phone_last);
        let has_email = !email.is_empty();

        Ok(EmployeeInput {
            employee_id: self.employee_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email_local: if has_email { optional(self.email_local) } else { None },
            email_domain: if has_email { optional(self.email_domain) } else { None },
            email: optional(email),
            department: optional(self.department),
            gender: optional(self.gender),
            birth_date: optional(self.birth_date),
            phone_prefix: if phone_middle.is_empty() && phone_last.is_empty() {
                None
            } else {
                optional(self.phone_prefix)
            },
            phone_middle: optional(phone_middle),
            phone_last: optional(phone_last),
            zip_code: optional(self.zip_code),
            address1: optional(self.address1),
            address2: optional(self.address2),
            position: optional(self.position),
        })
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
