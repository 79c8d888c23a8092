use serde::{Deserialize, Serialize};

use crate::error::{PmboardError, Result};

pub type UserId = i64;

/// An account as returned by the backend. This is also the shape persisted
/// by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(
        rename = "contactNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact: Option<String>,
    #[serde(rename = "isActive", default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(PmboardError::Validation(
                "Please fill in all fields".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "contactNumber", skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty()
        {
            return Err(PmboardError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial profile update. Only the fields that are `Some` are sent. The
/// email is the account's lookup key and cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "contactNumber", skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none() && self.contact.is_none()
    }
}
