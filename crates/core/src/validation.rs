//! Form validation rules
//!
//! A validation pass runs every rule and collects at most one issue per
//! field; callers stop the submit when the report is not empty.

use std::fmt;

use regex::Regex;

use crate::error::{Error, Result};

/// Input fields of the login and signup forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Email,
    Phone,
    Password,
    ConfirmPassword,
}

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    NameTooShort,
    EmailRequired,
    EmailInvalid,
    EmailTaken,
    PhoneInvalid,
    PasswordRequired,
    PasswordTooShort { min: usize },
    ConfirmRequired,
    PasswordMismatch,
    /// Form-level: not attached to an input
    TermsNotAccepted,
}

impl Issue {
    /// Input the issue is shown next to, `None` for form-level issues
    pub fn field(&self) -> Option<Field> {
        match self {
            Issue::NameTooShort => Some(Field::FullName),
            Issue::EmailRequired | Issue::EmailInvalid | Issue::EmailTaken => Some(Field::Email),
            Issue::PhoneInvalid => Some(Field::Phone),
            Issue::PasswordRequired | Issue::PasswordTooShort { .. } => Some(Field::Password),
            Issue::ConfirmRequired | Issue::PasswordMismatch => Some(Field::ConfirmPassword),
            Issue::TermsNotAccepted => None,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::NameTooShort => f.write_str("Please enter your full name"),
            Issue::EmailRequired => f.write_str("Email is required"),
            Issue::EmailInvalid => f.write_str("Please enter a valid email"),
            Issue::EmailTaken => f.write_str("This email is already registered"),
            Issue::PhoneInvalid => f.write_str("Please enter a valid Nepal phone number"),
            Issue::PasswordRequired => f.write_str("Password is required"),
            Issue::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
            Issue::ConfirmRequired => f.write_str("Please confirm your password"),
            Issue::PasswordMismatch => f.write_str("Passwords do not match"),
            Issue::TermsNotAccepted => f.write_str("Please agree to the Terms of Service"),
        }
    }
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn has(&self, issue: &Issue) -> bool {
        self.issues.contains(issue)
    }

    /// Record an issue unless its field already has one
    pub fn push(&mut self, issue: Issue) {
        if let Some(field) = issue.field() {
            if self.issues.iter().any(|i| i.field() == Some(field)) {
                return;
            }
        }
        self.issues.push(issue);
    }

    /// Inline message for a field
    pub fn message_for(&self, field: Field) -> Option<String> {
        self.issues
            .iter()
            .find(|i| i.field() == Some(field))
            .map(ToString::to_string)
    }

    /// Messages that belong to the form rather than an input
    pub fn form_messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .filter(|i| i.field().is_none())
            .map(ToString::to_string)
            .collect()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Tunable rule parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub min_password_len: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            min_password_len: 6,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_ok_and(|re| re.is_match(email))
}

/// Nepal mobile number, optional `+977` prefix, whitespace ignored.
/// An empty value is valid because the field is optional.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return true;
    }
    Regex::new(r"^(\+977)?[9][6-8]\d{8}$").is_ok_and(|re| re.is_match(&compact))
}

fn check_email(report: &mut ValidationReport, email: &str) {
    if email.is_empty() {
        report.push(Issue::EmailRequired);
    } else if !is_valid_email(email) {
        report.push(Issue::EmailInvalid);
    }
}

fn check_password(report: &mut ValidationReport, password: &str, rules: Rules) {
    if password.is_empty() {
        report.push(Issue::PasswordRequired);
    } else if password.chars().count() < rules.min_password_len {
        report.push(Issue::PasswordTooShort {
            min: rules.min_password_len,
        });
    }
}

fn name_is_valid(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

/// Email/password login form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self, rules: Rules) -> ValidationReport {
        let mut report = ValidationReport::default();
        check_email(&mut report, &self.email);
        check_password(&mut report, &self.password, rules);
        report
    }

    /// Whether a field is valid enough to clear its error while typing
    pub fn field_is_valid(&self, field: Field, rules: Rules) -> bool {
        match field {
            Field::Email => !self.email.is_empty() && is_valid_email(&self.email),
            Field::Password => self.password.chars().count() >= rules.min_password_len,
            _ => true,
        }
    }
}

/// Account registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub agreed_to_terms: bool,
}

impl SignupForm {
    /// Run every signup rule. `email_taken` comes from the record store.
    pub fn validate(&self, rules: Rules, email_taken: bool) -> ValidationReport {
        let mut report = ValidationReport::default();

        if !name_is_valid(&self.full_name) {
            report.push(Issue::NameTooShort);
        }

        check_email(&mut report, &self.email);
        if email_taken {
            report.push(Issue::EmailTaken);
        }

        if !is_valid_phone(&self.phone) {
            report.push(Issue::PhoneInvalid);
        }

        check_password(&mut report, &self.password, rules);

        if self.confirm_password.is_empty() {
            report.push(Issue::ConfirmRequired);
        } else if self.confirm_password != self.password {
            report.push(Issue::PasswordMismatch);
        }

        if !self.agreed_to_terms {
            report.push(Issue::TermsNotAccepted);
        }

        report
    }

    pub fn field_is_valid(&self, field: Field, rules: Rules) -> bool {
        match field {
            Field::FullName => name_is_valid(&self.full_name),
            Field::Email => !self.email.is_empty() && is_valid_email(&self.email),
            Field::Phone => is_valid_phone(&self.phone),
            Field::Password => self.password.chars().count() >= rules.min_password_len,
            Field::ConfirmPassword => self.confirm_password == self.password,
        }
    }

    /// Phone as stored: trimmed, `None` when left blank
    pub fn normalized_phone(&self) -> Option<String> {
        let phone = self.phone.trim();
        (!phone.is_empty()).then(|| phone.to_string())
    }
}
