//! Field-level input checks shared by all create/update inputs.
//!
//! A [`Validator`] collects every failure instead of stopping at the first,
//! so clients get the complete list in one round trip.

use std::fmt::Display;

use chrono::NaiveDate;

use crate::error::{AppError, FieldError};

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Value must contain at least one non-whitespace character.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
        self
    }

    /// Like [`required`](Self::required), but only when the value is submitted.
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.required(field, v);
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value
            && v.chars().count() > max
        {
            self.push(field, format!("must be at most {max} characters"));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value
            && !is_email(v)
        {
            self.push(field, "must be a valid email address");
        }
        self
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value
            && !is_phone(v)
        {
            self.push(field, "must be 8-15 digits, optionally prefixed with +");
        }
        self
    }

    /// Exactly `len` ASCII digits (NIK is 16, BPJS is 13).
    pub fn digits(&mut self, field: &str, value: Option<&str>, len: usize) -> &mut Self {
        if let Some(v) = value
            && (v.len() != len || !v.bytes().all(|b| b.is_ascii_digit()))
        {
            self.push(field, format!("must be exactly {len} digits"));
        }
        self
    }

    pub fn range<T>(&mut self, field: &str, value: Option<T>, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + Display + Copy,
    {
        if let Some(v) = value
            && (v < min || v > max)
        {
            self.push(field, format!("must be between {min} and {max}"));
        }
        self
    }

    pub fn not_future(&mut self, field: &str, value: Option<NaiveDate>, today: NaiveDate) -> &mut Self {
        if let Some(v) = value
            && v > today
        {
            self.push(field, "must not be in the future");
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) -> &mut Self {
        if let Some(v) = value
            && !allowed.contains(&v)
        {
            self.push(field, format!("must be one of: {}", allowed.join(", ")));
        }
        self
    }

    /// Case-insensitive; codes are stored uppercase.
    pub fn icd10(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value
            && !is_icd10(&v.trim().to_ascii_uppercase())
        {
            self.push(field, "must be an ICD-10 code such as A09 or J06.9");
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::from_field_errors(std::mem::take(&mut self.errors)))
        }
    }
}

pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

pub fn is_phone(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (8..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

/// ICD-10 shape: letter, two digits, optional `.` and 1-4 alphanumerics.
pub fn is_icd10(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 3 {
        return false;
    }
    let head_ok = bytes[0].is_ascii_uppercase()
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit();
    if !head_ok {
        return false;
    }
    match &value[3..] {
        "" => true,
        rest => rest.strip_prefix('.').is_some_and(|sub| {
            (1..=4).contains(&sub.len())
                && sub
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        }),
    }
}

/// Trim a submitted optional string and drop it when empty.
pub fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
