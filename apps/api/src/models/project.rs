use serde::{Deserialize, Serialize};

use crate::repository::Record;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub image: String,
    pub ai_hint: String,
}

impl Record for Project {
    /// Projects are replaced wholesale; the id is preserved.
    type Patch = Project;
    const KIND: &'static str = "project";

    fn id(&self) -> &str {
        &self.id
    }

    /// Whole-record replacement required by `Repository::update`; no route edits projects yet.
    fn apply(&mut self, patch: Project) {
        let id = std::mem::take(&mut self.id);
        *self = Project { id, ..patch };
    }
}
