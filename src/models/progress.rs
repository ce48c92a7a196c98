//! Reveal progress persisted under `appState/progress`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Fields;

/// Points at the step most recently revealed by a draw. Written after
/// every commit; read once at startup to restore position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub last_drawn_step_id: String,
}

impl ProgressRecord {
    pub fn new(step_id: impl Into<String>) -> Self {
        ProgressRecord {
            last_drawn_step_id: step_id.into(),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(
            "lastDrawnStepId".to_string(),
            Value::String(self.last_drawn_step_id.clone()),
        );
        fields
    }
}
