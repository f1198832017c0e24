use serde::{Deserialize, Serialize};

/// How an account came into existence. `Requested` accounts wait in the
/// moderation queue; `Invited` accounts were created by a moderator and
/// get their activation email immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationMethod {
    SelfRegistered,
    Invited,
    Requested,
}

impl RegistrationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationMethod::SelfRegistered => "self-registered",
            RegistrationMethod::Invited => "invited",
            RegistrationMethod::Requested => "requested",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "self-registered" => Some(RegistrationMethod::SelfRegistered),
            "invited" => Some(RegistrationMethod::Invited),
            "requested" => Some(RegistrationMethod::Requested),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Empty until the account is activated; argon2id string afterwards.
    pub password_hash: String,
    pub activation_token: String,
    pub token_used: bool,
    pub is_active: bool,
    pub is_closed: bool,
    pub is_moderator: bool,
    pub registration_method: RegistrationMethod,
    pub application_comments: String,
    pub bio: String,
    pub roles: Vec<String>,
    pub applied_at: Option<chrono::DateTime<chrono::Utc>>,
    pub activated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub activation_token: String,
    pub registration_method: RegistrationMethod,
    pub application_comments: String,
    pub applied_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Field values committed by a successful activation. The store applies
/// them together with the active/token-used flags in a single conditional
/// update keyed on the token being unused.
#[derive(Debug, Clone)]
pub struct ActivationInput {
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillAssignment {
    pub account_id: String,
    pub skill: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAssignment {
    pub id: String,
    pub account_id: String,
    pub anchor: String,
    pub url: String,
    /// Set by the brand matcher when the URL's host matches a catalog
    /// entry exactly; never required to be present.
    pub brand_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkBrand {
    pub domain: String,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub account_id: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct AbuseReport {
    pub id: String,
    pub reporter_id: String,
    pub subject_id: String,
    pub comments: String,
    pub logged_at: chrono::DateTime<chrono::Utc>,
    pub resolution: Option<String>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone)]
pub struct ModerationLogEntry {
    pub id: String,
    pub moderator_id: String,
    pub target_id: String,
    pub action: String,
    pub comment: String,
    pub logged_at: chrono::DateTime<chrono::Utc>,
}
