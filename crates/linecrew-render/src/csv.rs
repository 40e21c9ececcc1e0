//! CSV export, one document per line group
//!
//! Columns are `Step` (raw task id) and `Assigned Operators`
//! (`Name (ID n)` entries joined by `, `). Fields are quoted per RFC 4180.

use linecrew_core::{AssignmentResult, LineGroup, RenderError, Renderer};
use serde::Serialize;

const HEADER: [&str; 2] = ["Step", "Assigned Operators"];

/// One CSV file's worth of output
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CsvDocument {
    pub group: LineGroup,
    /// Suggested file name, e.g. `line_2_schedule.csv`
    pub file_name: String,
    pub content: String,
}

/// CSV renderer
#[derive(Clone, Debug, Default)]
pub struct CsvRenderer {
    /// Skip groups without tasks
    pub skip_empty: bool,
}

impl CsvRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_empty(mut self) -> Self {
        self.skip_empty = true;
        self
    }

    /// File name for a group's document
    pub fn file_name(group: LineGroup) -> String {
        format!("{}_schedule.csv", group.label().to_lowercase().replace(' ', "_"))
    }

    /// Quote a field if it contains a delimiter, quote or line break
    fn escape(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn row(fields: &[&str]) -> String {
        let escaped: Vec<String> = fields.iter().map(|f| Self::escape(f)).collect();
        format!("{}\r\n", escaped.join(","))
    }
}

impl Renderer for CsvRenderer {
    type Output = Vec<CsvDocument>;

    fn render(&self, result: &AssignmentResult) -> Result<Vec<CsvDocument>, RenderError> {
        let mut documents = Vec::new();
        for group in LineGroup::ALL {
            let tasks = result.group(group);
            if self.skip_empty && tasks.is_empty() {
                continue;
            }

            let mut content = Self::row(&HEADER);
            for task in tasks {
                let workers: Vec<String> = task.workers.iter().map(|w| w.label()).collect();
                let assigned = workers.join(", ");
                content.push_str(&Self::row(&[task.task_id.as_str(), assigned.as_str()]));
            }
            documents.push(CsvDocument {
                group,
                file_name: Self::file_name(group),
                content,
            });
        }
        Ok(documents)
    }
}
