//! Renderers fed by real solver output

use chrono::NaiveDate;
use linecrew_core::{Assigner, AssignmentResult, LineGroup, Renderer, RunParameters, Task, Worker};
use linecrew_render::{CsvRenderer, JsonRenderer, TextRenderer};
use linecrew_solver::BacktrackSolver;
use pretty_assertions::assert_eq;

fn small_plant() -> AssignmentResult {
    let workers = vec![
        Worker::new(1, "Ana").qualify_all(["plasma", "coil"]),
        Worker::new(2, "Ben, Jr.").qualify_all(["plasma", "coil"]),
        Worker::new(3, "Cy").qualify_all(["ipm", "print_and_apply"]),
    ];
    let tasks = vec![
        Task::new("line2_plasma_1st_half", 1),
        Task::new("line2_plasma_2nd_half", 1),
        Task::new("line2_coil", 2),
        Task::new("ipm_1st_half", 1),
        Task::new("print_and_apply", 1),
    ];
    let params = RunParameters::all_available(&workers);
    let report = BacktrackSolver::new().assign(&workers, &tasks, &params).unwrap();
    report.outcome.assignment().cloned().unwrap()
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn text_roster_lists_every_task() {
    let text = TextRenderer::new()
        .date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        .render(&small_plant())
        .unwrap();

    assert!(text.starts_with("Daily crew assignment - 2026-10-19\n"));
    assert!(text.contains("== Line 2 =="));
    assert!(text.contains("== Line 3 ==\n  (no tasks)"));
    assert!(text.contains("== General =="));
    assert_eq!(text.matches("    Plasma: ").count(), 2);
    assert!(text.contains("  Full Day\n    Coil: Ana (ID 1), Ben, Jr. (ID 2)\n"));
    assert!(text.contains("    IPM: Cy (ID 3)\n"));
    assert!(text.contains("    Print & Apply: Cy (ID 3)\n"));
}

#[test]
fn custom_title() {
    let text = TextRenderer::new()
        .title("Top assembly")
        .render(&AssignmentResult::default())
        .unwrap();
    assert!(text.starts_with("Top assembly\n\n== Line 2 ==\n  (no tasks)\n"));
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn csv_per_group_with_quoting() {
    let docs = CsvRenderer::new().render(&small_plant()).unwrap();
    let groups: Vec<LineGroup> = docs.iter().map(|d| d.group).collect();
    assert_eq!(groups, LineGroup::ALL.to_vec());

    let line2 = &docs[0];
    assert_eq!(line2.file_name, "line_2_schedule.csv");
    let lines: Vec<&str> = line2.content.split("\r\n").collect();
    assert_eq!(lines[0], "Step,Assigned Operators");
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[3], "line2_coil,\"Ana (ID 1), Ben, Jr. (ID 2)\"");

    let general = &docs[2];
    assert_eq!(
        general.content,
        "Step,Assigned Operators\r\nipm_1st_half,Cy (ID 3)\r\nprint_and_apply,Cy (ID 3)\r\n"
    );
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn json_round_trips_the_result() {
    let result = small_plant();
    let json = JsonRenderer::new().render(&result).unwrap();

    let parsed: AssignmentResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, result);
}
