use serde::{Deserialize, Serialize};

use crate::repository::Record;

/// A project a user has worked on, shown on their profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRole {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub ai_hint: String,
    pub headline: String,
    pub email: String,
    /// Never leaves the server.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub availability: String,
    pub projects: Vec<ProjectRole>,
}

/// Fields a user may change from the profile form.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub availability: Option<String>,
}

impl Record for User {
    type Patch = UserPatch;
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(headline) = patch.headline {
            self.headline = headline;
        }
        if let Some(skills) = patch.skills {
            self.skills = skills;
        }
        if let Some(interests) = patch.interests {
            self.interests = interests;
        }
        if let Some(availability) = patch.availability {
            self.availability = availability;
        }
    }
}

impl User {
    /// One-line summary used as the profile context for emphasis decisions.
    pub fn profile_summary(&self) -> String {
        format!(
            "{} ({}). Skills: {}. Interests: {}. Availability: {}",
            self.name,
            self.headline,
            self.skills.join(", "),
            self.interests.join(", "),
            self.availability
        )
    }
}
