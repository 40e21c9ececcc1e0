//! Plain-text roster renderer
//!
//! ## Example Output
//!
//! ```text
//! Daily crew assignment - 2026-03-02
//!
//! == Line 2 ==
//!   1st Half
//!     Plasma: Ana (ID 1)
//!   2nd Half
//!     Plasma: Ben (ID 2)
//!   Full Day
//!     Coil: Ana (ID 1), Cy (ID 3)
//! ```

use chrono::NaiveDate;
use linecrew_core::{
    AssignmentResult, LineGroup, RenderError, Renderer, ShiftHalf, TaskAssignment, TaskNaming,
};

use crate::display::display_name_with;

/// Human-readable daily roster
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Heading printed above the roster
    pub title: String,
    /// Day the roster is for, appended to the title
    pub date: Option<NaiveDate>,
    /// Print raw task ids next to display names
    pub show_task_ids: bool,
    pub naming: TaskNaming,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            title: "Daily crew assignment".into(),
            date: None,
            show_task_ids: false,
            naming: TaskNaming::default(),
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn show_task_ids(mut self) -> Self {
        self.show_task_ids = true;
        self
    }

    /// Use custom naming tokens for display names
    pub fn naming(mut self, naming: TaskNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Halves shown for a group. General always lists its full-day tasks;
    /// line groups only when they have any.
    fn sections(group: LineGroup, tasks: &[TaskAssignment]) -> Vec<ShiftHalf> {
        let mut halves = vec![ShiftHalf::First, ShiftHalf::Second];
        let has_full_day = tasks
            .iter()
            .any(|t| ShiftHalf::of(&t.task_id) == ShiftHalf::FullDay);
        if group == LineGroup::General || has_full_day {
            halves.push(ShiftHalf::FullDay);
        }
        halves
    }

    fn format_row(&self, task: &TaskAssignment) -> String {
        let workers: Vec<String> = task.workers.iter().map(|w| w.label()).collect();
        let name = display_name_with(&self.naming, &task.task_id);
        if self.show_task_ids {
            format!("{} [{}]: {}", name, task.task_id, workers.join(", "))
        } else {
            format!("{}: {}", name, workers.join(", "))
        }
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, result: &AssignmentResult) -> Result<String, RenderError> {
        let mut output = String::new();

        match self.date {
            Some(date) => output.push_str(&format!("{} - {}\n", self.title, date.format("%Y-%m-%d"))),
            None => output.push_str(&format!("{}\n", self.title)),
        }

        for group in LineGroup::ALL {
            let tasks = result.group(group);
            output.push_str(&format!("\n== {} ==\n", group.label()));
            if tasks.is_empty() {
                output.push_str("  (no tasks)\n");
                continue;
            }

            for half in Self::sections(group, tasks) {
                output.push_str(&format!("  {}\n", half.label()));
                let rows: Vec<&TaskAssignment> = tasks
                    .iter()
                    .filter(|t| ShiftHalf::of(&t.task_id) == half)
                    .collect();
                if rows.is_empty() {
                    output.push_str("    -\n");
                }
                for task in rows {
                    output.push_str(&format!("    {}\n", self.format_row(task)));
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecrew_core::AssignedWorker;
    use pretty_assertions::assert_eq;

    fn task(id: &str, workers: &[(u32, &str)]) -> TaskAssignment {
        TaskAssignment {
            task_id: id.into(),
            required: workers.len() as u32,
            workers: workers
                .iter()
                .map(|(id, name)| AssignedWorker {
                    id: *id,
                    name: (*name).into(),
                })
                .collect(),
        }
    }

    #[test]
    fn full_day_section_for_line_groups_only_when_needed() {
        let halves = vec![task("line2_plasma_1st_half", &[(1, "Ana")])];
        assert_eq!(
            TextRenderer::sections(LineGroup::Line2, &halves),
            vec![ShiftHalf::First, ShiftHalf::Second]
        );
        assert_eq!(
            TextRenderer::sections(LineGroup::General, &halves).len(),
            3
        );

        let with_coil = vec![task("line2_coil", &[(1, "Ana")])];
        assert_eq!(
            TextRenderer::sections(LineGroup::Line2, &with_coil),
            vec![ShiftHalf::First, ShiftHalf::Second, ShiftHalf::FullDay]
        );
    }

    #[test]
    fn row_format() {
        let row = task("line3_leak_test_2nd_half", &[(4, "Dee"), (9, "Eli")]);
        let renderer = TextRenderer::new();
        assert_eq!(renderer.format_row(&row), "Leak Test: Dee (ID 4), Eli (ID 9)");

        let renderer = TextRenderer::new().show_task_ids();
        assert_eq!(
            renderer.format_row(&row),
            "Leak Test [line3_leak_test_2nd_half]: Dee (ID 4), Eli (ID 9)"
        );
    }

    #[test]
    fn renders_every_group() {
        let mut result = AssignmentResult::default();
        result.push(task("line2_plasma_1st_half", &[(1, "Ana")]));
        result.push(task("cml_2nd_half", &[(2, "Ben")]));

        let text = TextRenderer::new()
            .date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .render(&result)
            .unwrap();

        assert!(text.starts_with("Daily crew assignment - 2026-03-02\n"));
        assert!(text.contains("== Line 2 ==\n  1st Half\n    Plasma: Ana (ID 1)\n  2nd Half\n    -\n"));
        assert!(text.contains("== Line 3 ==\n  (no tasks)\n"));
        assert!(text.contains("    CML: Ben (ID 2)\n  Full Day\n    -\n"));
    }
}
