//! Human-readable task names

use linecrew_core::TaskNaming;

/// Known families and their display names, matched by prefix
const DISPLAY_NAMES: [(&str, &str); 10] = [
    ("tote_cleaning", "Tote Cleaning"),
    ("ipm", "IPM"),
    ("cml", "CML"),
    ("plasma", "Plasma"),
    ("coating_feed", "Coating Feed"),
    ("coating_unload", "Coating Unload"),
    ("leak_test", "Leak Test"),
    ("form_fold", "Form Fold"),
    ("coil", "Coil"),
    ("print_and_apply", "Print & Apply"),
];

/// Display name of a raw task id using the default naming tokens
pub fn display_name(raw: &str) -> String {
    display_name_with(&TaskNaming::default(), raw)
}

/// Display name of a raw task id.
///
/// The canonical name is looked up in the known-family table by prefix;
/// anything else is title-cased with underscores as spaces.
pub fn display_name_with(naming: &TaskNaming, raw: &str) -> String {
    let base = naming.canonical_name(raw);
    DISPLAY_NAMES
        .iter()
        .find(|(key, _)| base.starts_with(key))
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| title_case(&base.replace('_', " ")))
}

/// Uppercase every letter that follows a non-letter, lowercase the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if after_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    out
}
