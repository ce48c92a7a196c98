//! A single itinerary step as stored in the `itinerary` collection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;
use crate::store::{Document, Fields};

/// One step of the trip. The document id doubles as the step's ordinal,
/// so `"3"` is the third step of the itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Document id; not stored as a field.
    #[serde(skip)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub is_unlocked: bool,
}

impl Step {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Step {
            id: id.into(),
            title: title.into(),
            location: None,
            is_unlocked: false,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn unlocked(mut self) -> Self {
        self.is_unlocked = true;
        self
    }

    /// Numeric position of this step, parsed from its id.
    pub fn ordinal(&self) -> Option<u64> {
        self.id.parse::<u64>().ok()
    }

    /// Builds a step from a raw store document.
    ///
    /// Fails if the id is not a decimal ordinal, the title is missing
    /// or blank, or a field has the wrong shape.
    pub fn from_document(doc: &Document) -> Result<Self, Error> {
        let mut step: Step = serde_json::from_value(Value::Object(doc.fields.clone()))
            .map_err(|e| Error::invalid_step(&doc.id, e.to_string()))?;
        step.id = doc.id.clone();
        if step.ordinal().is_none() {
            return Err(Error::invalid_step(&doc.id, "id is not a decimal ordinal"));
        }
        if step.title.trim().is_empty() {
            return Err(Error::invalid_step(&doc.id, "title is blank"));
        }
        Ok(step)
    }

    /// Store representation of this step, without the id.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), Value::String(self.title.clone()));
        if let Some(location) = &self.location {
            fields.insert("location".to_string(), Value::String(location.clone()));
        }
        fields.insert("isUnlocked".to_string(), Value::Bool(self.is_unlocked));
        fields
    }
}

/// Orders steps by ordinal, ascending. Ids are validated on ingest, so
/// non-numeric ids only show up for hand-edited stores; they sort last.
pub fn sort_by_ordinal(steps: &mut [Step]) {
    steps.sort_by_key(|s| s.ordinal().unwrap_or(u64::MAX));
}

/// Field update flipping only the lock flag, leaving the rest of the
/// document untouched.
pub fn unlock_fields(unlocked: bool) -> Fields {
    let mut fields = Fields::new();
    fields.insert("isUnlocked".to_string(), Value::Bool(unlocked));
    fields
}
