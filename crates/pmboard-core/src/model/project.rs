use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::user::UserId;
use crate::error::{PmboardError, Result};

pub type ProjectId = i64;

pub const DEFAULT_PROJECT_STATUS: &str = "ACTIVE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "projectId")]
    pub id: ProjectId,
    #[serde(rename = "projectName")]
    pub name: String,
    #[serde(rename = "projectDescription", default)]
    pub description: Option<String>,
    #[serde(
        rename = "projectStartDate",
        default,
        with = "super::time::date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "projectStatus", default)]
    pub status: String,
    #[serde(rename = "createdBy", default)]
    pub owner_id: Option<UserId>,
    #[serde(rename = "creatorEmail", default, skip_serializing_if = "Option::is_none")]
    pub creator_email: Option<String>,
}

/// Body for creating or updating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDraft {
    #[serde(rename = "projectName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "projectDescription", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "projectStartDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "projectStatus", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            status: Some(DEFAULT_PROJECT_STATUS.to_string()),
            ..Default::default()
        }
    }

    /// A new project needs a name; everything else is optional.
    pub fn validate_create(&self) -> Result<()> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(PmboardError::Validation(
                "Project name is required".to_string(),
            )),
        }
    }
}

/// Project-scoped permission level.
///
/// The backend stores roles as free strings and has historically written
/// both English and French spellings. They are folded into these three
/// variants on receipt; anything else is treated as "no role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Member,
    Observer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Member, Role::Observer];

    /// Case-sensitive match against the known spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ADMIN" | "ADMINISTRATEUR" => Some(Self::Admin),
            "MEMBER" | "MEMBRE" => Some(Self::Member),
            "OBSERVER" | "OBSERVATEUR" => Some(Self::Observer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
            Self::Observer => "OBSERVER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Lenient variant for user input on the command line.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(&s.trim().to_uppercase()).ok_or_else(|| format!("unknown role: {s}"))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, ser: S) -> std::result::Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_str())
    }
}

/// Decode an optional role string, mapping unknown spellings to `None`.
pub(crate) mod role_field {
    use super::*;

    pub fn deserialize<'de, D>(de: D) -> std::result::Result<Option<Role>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(de)?;
        Ok(raw.as_deref().and_then(Role::parse))
    }

    pub fn serialize<S>(value: &Option<Role>, ser: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(role) => role.serialize(ser),
            None => ser.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    #[serde(rename = "userId", default)]
    pub user_id: Option<UserId>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "role_field")]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: String,
    #[serde(
        rename = "joinedAt",
        default,
        with = "super::time::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteRequest {
    pub email: String,
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub role: Role,
    #[serde(rename = "invitedBy")]
    pub invited_by: String,
}

impl InviteRequest {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(PmboardError::Validation("Email is required".to_string()));
        }
        Ok(())
    }
}

/// Payload of the member-role lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleLookup {
    #[serde(default, with = "role_field")]
    pub role: Option<Role>,
}

/// Acknowledgement of a sent invitation. The membership stays `PENDING`
/// until the invitee accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub email: String,
    #[serde(default, with = "role_field")]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: String,
}
