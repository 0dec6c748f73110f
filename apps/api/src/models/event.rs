use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Record;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub image: String,
    pub ai_hint: String,
}

impl Record for Event {
    type Patch = Event;
    const KIND: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }

    /// Whole-record replacement required by `Repository::update`; no route edits events yet.
    fn apply(&mut self, patch: Event) {
        let id = std::mem::take(&mut self.id);
        *self = Event { id, ..patch };
    }
}
