//! Task naming
//!
//! Raw task ids carry their placement: an optional line prefix (`line2_`,
//! `line3_`), an optional shift-half suffix (`_1st_half`, `_2nd_half`) and an
//! optional production-variant suffix (`_4blade`, `_3lam`). Stripping those
//! gives the canonical name, which is both the qualification key and the
//! same-family grouping key.

use serde::{Deserialize, Serialize};

/// Prefix and suffix tokens removed when deriving a canonical name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskNaming {
    pub line_prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl Default for TaskNaming {
    fn default() -> Self {
        Self {
            line_prefixes: vec!["line2_".into(), "line3_".into()],
            suffixes: vec![
                "_1st_half".into(),
                "_2nd_half".into(),
                "_4blade".into(),
                "_3lam".into(),
            ],
        }
    }
}

impl TaskNaming {
    /// Canonical name of a raw task id.
    ///
    /// Every occurrence of every configured token is removed, repeatedly,
    /// until the name stops changing. The result is therefore independent of
    /// token order and stable under re-application. A name that would become
    /// empty falls back to the raw id.
    pub fn canonical_name(&self, raw: &str) -> String {
        let mut base = raw.to_string();
        loop {
            let before = base.len();
            for token in self.line_prefixes.iter().chain(&self.suffixes) {
                if !token.is_empty() && base.contains(token.as_str()) {
                    base = base.replace(token.as_str(), "");
                }
            }
            if base.len() == before {
                break;
            }
        }

        if base.is_empty() {
            raw.to_string()
        } else {
            base
        }
    }
}

/// Canonical name using the default token set
pub fn canonical_name(raw: &str) -> String {
    TaskNaming::default().canonical_name(raw)
}

/// Production line a task belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LineGroup {
    Line2,
    Line3,
    General,
}

impl LineGroup {
    pub const ALL: [LineGroup; 3] = [LineGroup::Line2, LineGroup::Line3, LineGroup::General];

    /// `line2` wins over `line3` when a raw id carries both
    pub fn of(raw: &str) -> Self {
        if raw.contains("line2") {
            LineGroup::Line2
        } else if raw.contains("line3") {
            LineGroup::Line3
        } else {
            LineGroup::General
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LineGroup::Line2 => "Line 2",
            LineGroup::Line3 => "Line 3",
            LineGroup::General => "General",
        }
    }
}

impl std::fmt::Display for LineGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Part of the day a task covers
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftHalf {
    First,
    Second,
    FullDay,
}

impl ShiftHalf {
    pub fn of(raw: &str) -> Self {
        if raw.contains("1st_half") {
            ShiftHalf::First
        } else if raw.contains("2nd_half") {
            ShiftHalf::Second
        } else {
            ShiftHalf::FullDay
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShiftHalf::First => "1st Half",
            ShiftHalf::Second => "2nd Half",
            ShiftHalf::FullDay => "Full Day",
        }
    }
}

impl std::fmt::Display for ShiftHalf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_prefix_and_half_suffix() {
        assert_eq!(canonical_name("line2_plasma_1st_half"), "plasma");
        assert_eq!(canonical_name("line3_coating_feed_2nd_half"), "coating_feed");
        assert_eq!(canonical_name("ipm_1st_half"), "ipm");
    }

    #[test]
    fn strips_variant_markers() {
        assert_eq!(canonical_name("line2_form_fold_4blade"), "form_fold");
        assert_eq!(canonical_name("line3_form_fold_3lam_2nd_half"), "form_fold");
    }

    #[test]
    fn bare_name_is_unchanged() {
        assert_eq!(canonical_name("tote_cleaning"), "tote_cleaning");
        assert_eq!(canonical_name("print_and_apply"), "print_and_apply");
    }

    #[test]
    fn canonical_name_is_idempotent() {
        for raw in [
            "line2_plasma_1st_half",
            "line3_form_fold_4blade_2nd_half",
            "coil",
            "liline2_ne2_coil",
        ] {
            let once = canonical_name(raw);
            assert_eq!(canonical_name(&once), once, "not idempotent for {raw}");
        }
    }

    #[test]
    fn token_order_does_not_matter() {
        assert_eq!(
            canonical_name("line2_leak_test_4blade_1st_half"),
            canonical_name("line2_leak_test_1st_half_4blade")
        );
    }

    #[test]
    fn empty_result_falls_back_to_raw() {
        assert_eq!(canonical_name("_1st_half"), "_1st_half");
        assert_eq!(canonical_name("line2_"), "line2_");
    }

    #[test]
    fn custom_tokens() {
        let naming = TaskNaming {
            line_prefixes: vec!["cell_a_".into()],
            suffixes: vec!["_night".into()],
        };
        assert_eq!(naming.canonical_name("cell_a_weld_night"), "weld");
        assert_eq!(naming.canonical_name("line2_weld"), "line2_weld");
    }

    #[test]
    fn line_group_from_raw_id() {
        assert_eq!(LineGroup::of("line2_coil"), LineGroup::Line2);
        assert_eq!(LineGroup::of("line3_coil_1st_half"), LineGroup::Line3);
        assert_eq!(LineGroup::of("tote_cleaning"), LineGroup::General);
        assert_eq!(LineGroup::of("line2_line3_odd"), LineGroup::Line2);
    }

    #[test]
    fn shift_half_from_raw_id() {
        assert_eq!(ShiftHalf::of("ipm_1st_half"), ShiftHalf::First);
        assert_eq!(ShiftHalf::of("line3_cml_2nd_half"), ShiftHalf::Second);
        assert_eq!(ShiftHalf::of("coil"), ShiftHalf::FullDay);
        assert_eq!(ShiftHalf::FullDay.to_string(), "Full Day");
    }
}
