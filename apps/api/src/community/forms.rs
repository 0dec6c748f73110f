//! Form validation for profile, project and event submissions.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::forms::{split_list, FieldError, FieldErrors};
use crate::models::event::Event;
use crate::models::project::Project;
use crate::models::user::UserPatch;
use crate::repository::seed::PLACEHOLDER_IMAGE;

/// `datetime-local` inputs arrive without an offset; they are read as UTC.
const LOCAL_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub availability: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

/// Returns the target user id and the patch to apply.
pub fn validate_profile(form: &ProfileForm) -> Result<(String, UserPatch), Vec<FieldError>> {
    let mut errors = FieldErrors::new();
    errors.require_min_len("id", &form.id, 1, "Profile id is required.");
    errors.require_min_len("name", &form.name, 2, "Full name must be at least 2 characters.");
    errors.require_min_len("headline", &form.headline, 3, "Headline is too short.");

    errors.finish((
        form.id.trim().to_string(),
        UserPatch {
            name: Some(form.name.trim().to_string()),
            headline: Some(form.headline.trim().to_string()),
            skills: Some(split_list(&form.skills)),
            interests: Some(split_list(&form.interests)),
            availability: Some(form.availability.trim().to_string()),
        },
    ))
}

pub fn validate_project(form: &ProjectForm) -> Result<Project, Vec<FieldError>> {
    let mut errors = FieldErrors::new();
    errors.require_min_len("title", &form.title, 1, "Title is required.");
    errors.require_min_len("description", &form.description, 1, "Description is required.");
    let skills = split_list(&form.skills);
    if skills.is_empty() {
        errors.push("skills", "Skills are required.");
    }

    errors.finish(Project {
        id: Uuid::new_v4().to_string(),
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        skills,
        image: PLACEHOLDER_IMAGE.to_string(),
        ai_hint: "new project".to_string(),
    })
}

pub fn validate_event(form: &EventForm) -> Result<Event, Vec<FieldError>> {
    let mut errors = FieldErrors::new();
    errors.require_min_len("title", &form.title, 1, "Title is required.");
    errors.require_min_len("location", &form.location, 1, "Location is required.");
    errors.require_min_len("description", &form.description, 1, "Description is required.");

    let date = parse_event_date(&form.date);
    if form.date.trim().is_empty() {
        errors.push("date", "Date is required.");
    } else if date.is_none() {
        errors.push("date", "Date must look like 2024-09-20T18:00.");
    }

    // A missing date always leaves an error behind, so the default never escapes.
    errors.finish(Event {
        id: Uuid::new_v4().to_string(),
        title: form.title.trim().to_string(),
        date: date.unwrap_or_default(),
        location: form.location.trim().to_string(),
        description: form.description.trim().to_string(),
        image: PLACEHOLDER_IMAGE.to_string(),
        ai_hint: "new event".to_string(),
    })
}

/// Accepts RFC 3339 or a bare `datetime-local` value.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
