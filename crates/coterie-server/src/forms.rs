use std::collections::BTreeMap;

use serde::Deserialize;

/// Field name -> human-readable problem. Empty map means the form passed.
pub type FieldErrors = BTreeMap<String, String>;

pub const PROFICIENCY_LEVELS: &[&str] = &["beginner", "intermediate", "advanced", "expert"];

/// One submitted skill row. Both fields empty marks an unfilled optional
/// slot and is dropped during validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillRow {
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub proficiency: String,
}

/// One submitted link row, same optional-slot convention as SkillRow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkRow {
    #[serde(default)]
    pub anchor: String,
    #[serde(default)]
    pub url: String,
}

/// Minimal well-formedness check: one '@', non-empty local part, and a
/// dotted domain. Deliverability is the mail system's problem.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn require(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "This field is required.".to_string());
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.insert("email".to_string(), "This field is required.".to_string());
    } else if !is_valid_email(email.trim()) {
        errors.insert(
            "email".to_string(),
            "Enter a valid email address.".to_string(),
        );
    }
}

fn check_password(errors: &mut FieldErrors, field: &str, password: &str, confirm: &str) {
    if password.len() < 8 {
        errors.insert(
            field.to_string(),
            "Password must be at least 8 characters.".to_string(),
        );
    } else if password != confirm {
        errors.insert(
            format!("confirm_{field}"),
            "Passwords do not match.".to_string(),
        );
    }
}

pub fn validate_request_invitation(
    email: &str,
    first_name: &str,
    last_name: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, email);
    require(&mut errors, "first_name", first_name);
    require(&mut errors, "last_name", last_name);
    errors
}

pub fn validate_activation(
    first_name: &str,
    last_name: &str,
    password: &str,
    confirm_password: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "first_name", first_name);
    require(&mut errors, "last_name", last_name);
    check_password(&mut errors, "password", password, confirm_password);
    errors
}

pub fn validate_account_settings(
    email: &str,
    new_password: Option<&str>,
    confirm_password: Option<&str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, email);
    if let Some(password) = new_password {
        check_password(
            &mut errors,
            "new_password",
            password,
            confirm_password.unwrap_or(""),
        );
    }
    errors
}

/// Validate skill rows and collect the surviving (skill, proficiency)
/// pairs. Fully-empty rows are dropped; a half-filled row, an unknown
/// proficiency, or a repeated skill fails the whole submission.
pub fn validate_skill_rows(rows: &[SkillRow], errors: &mut FieldErrors) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let skill = row.skill.trim();
        let proficiency = row.proficiency.trim();

        if skill.is_empty() && proficiency.is_empty() {
            continue;
        }
        if skill.is_empty() || proficiency.is_empty() {
            errors.insert(
                format!("skill-{i}"),
                "Both a skill and a proficiency are required.".to_string(),
            );
            continue;
        }
        if !PROFICIENCY_LEVELS.contains(&proficiency) {
            errors.insert(
                format!("skill-{i}-proficiency"),
                format!("Proficiency must be one of: {}.", PROFICIENCY_LEVELS.join(", ")),
            );
            continue;
        }
        if pairs.iter().any(|(s, _)| s == skill) {
            errors.insert(
                format!("skill-{i}-skill"),
                "Each skill may only be listed once.".to_string(),
            );
            continue;
        }
        pairs.push((skill.to_string(), proficiency.to_string()));
    }

    pairs
}

/// Validate link rows and collect the surviving (anchor, url) pairs.
/// Same policy as skills; URLs must parse and anchors/URLs must be unique.
pub fn validate_link_rows(rows: &[LinkRow], errors: &mut FieldErrors) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let anchor = row.anchor.trim();
        let url = row.url.trim();

        if anchor.is_empty() && url.is_empty() {
            continue;
        }
        if anchor.is_empty() || url.is_empty() {
            errors.insert(
                format!("link-{i}"),
                "Both an anchor and a URL are required.".to_string(),
            );
            continue;
        }
        if url::Url::parse(url).is_err() {
            errors.insert(format!("link-{i}-url"), "Enter a valid URL.".to_string());
            continue;
        }
        if pairs.iter().any(|(a, u)| a == anchor || u == url) {
            errors.insert(
                format!("link-{i}"),
                "Links must have unique anchors and URLs.".to_string(),
            );
            continue;
        }
        pairs.push((anchor.to_string(), url.to_string()));
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill_row(skill: &str, proficiency: &str) -> SkillRow {
        SkillRow {
            skill: skill.to_string(),
            proficiency: proficiency.to_string(),
        }
    }

    fn link_row(anchor: &str, url: &str) -> LinkRow {
        LinkRow {
            anchor: anchor.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn valid_emails_accepted() {
        assert!(is_valid_email("a@example.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn invalid_emails_rejected() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn request_invitation_requires_all_fields() {
        let errors = validate_request_invitation("", "", "");
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("first_name"));
        assert!(errors.contains_key("last_name"));

        assert!(validate_request_invitation("a@example.com", "A", "B").is_empty());
    }

    #[test]
    fn activation_rejects_short_or_mismatched_password() {
        let errors = validate_activation("A", "B", "short", "short");
        assert!(errors.contains_key("password"));

        let errors = validate_activation("A", "B", "long-enough", "different");
        assert!(errors.contains_key("confirm_password"));

        assert!(validate_activation("A", "B", "long-enough", "long-enough").is_empty());
    }

    #[test]
    fn empty_skill_row_is_dropped() {
        let mut errors = FieldErrors::new();
        let pairs = validate_skill_rows(
            &[skill_row("Go", "expert"), skill_row("", "")],
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(pairs, vec![("Go".to_string(), "expert".to_string())]);
    }

    #[test]
    fn half_filled_skill_row_fails_validation() {
        let mut errors = FieldErrors::new();
        let pairs = validate_skill_rows(&[skill_row("Go", "")], &mut errors);
        assert!(pairs.is_empty());
        assert!(errors.contains_key("skill-0"));
    }

    #[test]
    fn unknown_proficiency_fails_validation() {
        let mut errors = FieldErrors::new();
        validate_skill_rows(&[skill_row("Go", "wizard")], &mut errors);
        assert!(errors.contains_key("skill-0-proficiency"));
    }

    #[test]
    fn duplicate_skill_fails_validation() {
        let mut errors = FieldErrors::new();
        validate_skill_rows(
            &[skill_row("Go", "expert"), skill_row("Go", "beginner")],
            &mut errors,
        );
        assert!(errors.contains_key("skill-1-skill"));
    }

    #[test]
    fn malformed_url_fails_validation() {
        let mut errors = FieldErrors::new();
        validate_link_rows(&[link_row("site", "not a url")], &mut errors);
        assert!(errors.contains_key("link-0-url"));
    }

    #[test]
    fn half_filled_link_row_fails_validation() {
        let mut errors = FieldErrors::new();
        let pairs = validate_link_rows(&[link_row("", "http://example.com")], &mut errors);
        assert!(pairs.is_empty());
        assert!(errors.contains_key("link-0"));
    }
}
