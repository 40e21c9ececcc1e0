//! JSON export

use chrono::NaiveDate;
use linecrew_core::{AssignmentResult, RenderError, Renderer};
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(flatten)]
    result: &'a AssignmentResult,
}

/// Serialises the grouped result, optionally stamped with a date
#[derive(Clone, Debug)]
pub struct JsonRenderer {
    pub pretty: bool,
    pub date: Option<NaiveDate>,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self {
            pretty: true,
            date: None,
        }
    }
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line output
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, result: &AssignmentResult) -> Result<String, RenderError> {
        let envelope = Envelope {
            date: self.date,
            result,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&envelope)
        } else {
            serde_json::to_string(&envelope)
        };
        json.map_err(|e| RenderError::Format(e.to_string()))
    }
}
