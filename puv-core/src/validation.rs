//! Typed form value objects and their validators.
//!
//! Every form implements [`Validatable`] and reports all failing fields at
//! once, one message per field, so the presentation layer can show them
//! next to the inputs.

use std::fmt;

use puv_catalog::VehicleType;
use puv_shared::Masked;
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.errors.iter().map(|e| e.field).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Capability shared by every submitted form.
pub trait Validatable {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Passenger,
    Driver,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: Masked<String>,
    pub user_type: UserType,
    #[serde(default)]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default)]
    pub plate_number: Option<String>,
    pub password: Masked<String>,
    pub confirm_password: Masked<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub phone: Masked<String>,
    pub username: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl Validatable for SignInForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email address");
        }
        check_password(&mut errors, "password", self.password.expose());
        errors.into_result()
    }
}

impl Validatable for SignUpForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.full_name.chars().count() < 3 {
            errors.add("full_name", "Full Name must be at least 3 characters");
        }
        if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email address");
        }

        let phone = self.phone_number.expose();
        if phone.chars().count() < MIN_PHONE_DIGITS {
            errors.add("phone_number", "Phone number must be at least 10 digits");
        } else if !phone.chars().all(|c| c.is_ascii_digit()) {
            errors.add("phone_number", "Phone number must contain only numbers");
        }

        check_password(&mut errors, "password", self.password.expose());
        if self.password.expose() != self.confirm_password.expose() {
            errors.add("confirm_password", "Passwords do not match");
        }

        if self.user_type == UserType::Driver {
            let has_plate = self
                .plate_number
                .as_deref()
                .is_some_and(|p| !p.trim().is_empty());
            if self.vehicle_type.is_none() || !has_plate {
                errors.add("vehicle_type", "Vehicle Type & Plate Number are required for Drivers");
            }
        }

        errors.into_result()
    }
}

impl Validatable for ProfileForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.full_name.chars().count() < 2 {
            errors.add("full_name", "Name must be at least 2 characters");
        }
        if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email format");
        }

        let phone = self.phone.expose();
        if phone.chars().count() < MIN_PHONE_DIGITS {
            errors.add("phone", "Phone number must be at least 10 digits");
        } else if !phone.chars().all(|c| c.is_ascii_digit()) {
            errors.add("phone", "Must contain only digits");
        }

        if self.username.chars().count() < 3 {
            errors.add("username", "Username must be at least 3 characters");
        } else if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.add("username", "Only letters, numbers and underscores allowed");
        }

        errors.into_result()
    }
}

impl Validatable for ForgotPasswordForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email address");
        }
        errors.into_result()
    }
}

fn check_password(errors: &mut ValidationErrors, field: &'static str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, "Password must be at least 6 characters");
    }
}

/// Structural check: `local@domain.tld`, no whitespace, no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
