//! Assignment policy: qualification matching and the tunable rule set
//!
//! Qualification is a loose substring test. A worker qualifies for a task when
//! any of their tags *contains* the task's canonical name, so a tag such as
//! `precoating` also covers the `coating` family. That looseness is part of
//! the contract with the existing rosters and must not be tightened here.

use crate::naming::TaskNaming;
use crate::{Task, Worker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// True iff some qualification tag contains `canonical` as a substring
pub fn is_qualified(worker: &Worker, canonical: &str) -> bool {
    worker
        .qualifications
        .iter()
        .any(|tag| tag.contains(canonical))
}

/// Stricter sign-off for one sub-process while variant mode is on.
///
/// The rule applies to a task only when its raw id contains both `process`
/// and `marker`. Such a task then needs a tag containing `{process}_{marker}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRule {
    pub process: String,
    pub marker: String,
}

impl VariantRule {
    pub fn new(process: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            process: process.into(),
            marker: marker.into(),
        }
    }

    /// Tag a worker needs for tasks this rule covers
    pub fn token(&self) -> String {
        format!("{}_{}", self.process, self.marker)
    }

    pub fn applies_to(&self, raw_task_id: &str) -> bool {
        raw_task_id.contains(self.process.as_str()) && raw_task_id.contains(self.marker.as_str())
    }
}

/// Tunable rules for one plant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentPolicy {
    /// Maximum tasks per worker per day
    pub max_load: u32,
    /// Canonical names a worker may cover more than once
    pub exempt_families: BTreeSet<String>,
    /// Tokens stripped to obtain canonical names
    pub naming: TaskNaming,
    /// Rules enforced while variant mode is on.
    ///
    /// Only `form_fold` + `4blade` is on by default. Other 4-blade tasks such
    /// as `line2_plasma_4blade` need their own rule, e.g.
    /// `.variant_rule(VariantRule::new("plasma", "4blade"))` or a
    /// `[[policy.variant_rules]]` entry in `linecrew.toml`.
    pub variant_rules: Vec<VariantRule>,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            max_load: 3,
            exempt_families: ["ipm", "cml", "tote_cleaning", "print_and_apply"]
                .into_iter()
                .map(String::from)
                .collect(),
            naming: TaskNaming::default(),
            variant_rules: vec![VariantRule::new("form_fold", "4blade")],
        }
    }
}

impl AssignmentPolicy {
    /// Set the per-worker load cap
    pub fn max_load(mut self, max_load: u32) -> Self {
        self.max_load = max_load;
        self
    }

    /// Replace the exempt family set
    pub fn exempt(mut self, families: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exempt_families = families.into_iter().map(Into::into).collect();
        self
    }

    /// Add a variant rule
    pub fn variant_rule(mut self, rule: VariantRule) -> Self {
        self.variant_rules.push(rule);
        self
    }

    pub fn canonical_name(&self, raw: &str) -> String {
        self.naming.canonical_name(raw)
    }

    pub fn is_exempt(&self, canonical: &str) -> bool {
        self.exempt_families.contains(canonical)
    }

    /// Variant rules that restrict `task` in the current mode
    pub fn variant_tokens(&self, task: &Task, variant_mode: bool) -> Vec<String> {
        if !variant_mode {
            return Vec::new();
        }
        self.variant_rules
            .iter()
            .filter(|rule| rule.applies_to(&task.id))
            .map(VariantRule::token)
            .collect()
    }

    /// Whether `worker` may be placed on `task` at all.
    ///
    /// Combines the base qualification test on the canonical name with every
    /// variant rule that covers the task.
    pub fn is_eligible(&self, worker: &Worker, task: &Task, variant_mode: bool) -> bool {
        let canonical = self.canonical_name(&task.id);
        is_qualified(worker, &canonical)
            && self
                .variant_tokens(task, variant_mode)
                .iter()
                .all(|token| worker.qualifications.iter().any(|tag| tag.contains(token.as_str())))
    }
}
