// src/forms.rs
//! Input checks the screens run before touching a store. The stores
//! themselves accept anything, so every caller has to go through these.
use crate::error::{FormError, FormResult};
use crate::models::NewClient;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_NEW_CLIENT_DAYS: &str = "30";
const DEFAULT_NEW_CLIENT_NOTES: &str = "New client";

/// Day offsets offered as one-key shortcuts on the detail screen.
pub const QUICK_ADJUSTMENTS: [i64; 4] = [-7, -1, 7, 30];

pub fn validate_login(username: &str, password: &str) -> FormResult<()> {
    if username.is_empty() || password.is_empty() {
        return Err(FormError::MissingCredentials);
    }
    Ok(())
}

pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> FormResult<()> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(FormError::MissingPasswordFields);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    if new != confirm {
        return Err(FormError::PasswordMismatch);
    }
    if new == current {
        return Err(FormError::PasswordUnchanged);
    }
    Ok(())
}

pub fn parse_subscription_days(input: &str) -> FormResult<i64> {
    match input.trim().parse::<i64>() {
        Ok(days) if days >= 0 => Ok(days),
        _ => Err(FormError::InvalidDays),
    }
}

/// Applies a quick offset to the stored day count.
pub fn quick_adjust(stored_days: i64, offset: i64) -> FormResult<i64> {
    let adjusted = stored_days.saturating_add(offset);
    if adjusted < 0 {
        return Err(FormError::NegativeDays);
    }
    Ok(adjusted)
}

pub fn validate_message(message: &str) -> FormResult<()> {
    if message.trim().is_empty() {
        return Err(FormError::EmptyMessage);
    }
    Ok(())
}

/// Raw text of the add-client form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subscription_days: String,
    pub notes: String,
}

impl Default for NewClientForm {
    fn default() -> Self {
        NewClientForm {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            subscription_days: DEFAULT_NEW_CLIENT_DAYS.to_string(),
            notes: String::new(),
        }
    }
}

impl NewClientForm {
    pub fn validate(&self) -> FormResult<NewClient> {
        if self.name.is_empty() || self.email.is_empty() || self.phone.is_empty() {
            return Err(FormError::MissingClientFields);
        }
        if !is_plausible_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        let subscription_days = parse_subscription_days(&self.subscription_days)?;
        let notes = if self.notes.is_empty() {
            DEFAULT_NEW_CLIENT_NOTES.to_string()
        } else {
            self.notes.clone()
        };
        Ok(NewClient {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            subscription_days,
            notes,
        })
    }
}

/// `local@domain.tld`: no whitespace, one `@`, and at least one dot in the
/// domain with text on both sides.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
