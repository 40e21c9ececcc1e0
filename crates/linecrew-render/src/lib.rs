//! # linecrew-render
//!
//! Output formats for linecrew assignments.
//!
//! This crate provides:
//! - Plain-text daily roster, grouped by line and shift half
//! - CSV export, one document per line group
//! - JSON export
//! - Display names for raw task ids
//!
//! ## Example
//!
//! ```rust
//! use linecrew_core::{AssignedWorker, AssignmentResult, Renderer, TaskAssignment};
//! use linecrew_render::{CsvRenderer, TextRenderer};
//!
//! let mut result = AssignmentResult::default();
//! result.push(TaskAssignment {
//!     task_id: "line2_plasma_1st_half".into(),
//!     required: 1,
//!     workers: vec![AssignedWorker { id: 1, name: "Ana".into() }],
//! });
//!
//! let text = TextRenderer::new().render(&result).unwrap();
//! assert!(text.contains("Plasma: Ana (ID 1)"));
//!
//! let csv = CsvRenderer::new().render(&result).unwrap();
//! assert_eq!(csv[0].file_name, "line_2_schedule.csv");
//! ```

pub mod csv;
pub mod display;
pub mod json;
pub mod text;

pub use csv::{CsvDocument, CsvRenderer};
pub use display::{display_name, display_name_with};
pub use json::JsonRenderer;
pub use text::TextRenderer;
