//! Rendering of the taxonomy into classifier instructions.

use std::fmt::Write;

use super::table::{TaxonomyEntry, ENTRIES};

/// Human-readable description of every category, in table order.
pub fn describe_for_prompt() -> String {
    let mut out = String::from("=== MAIN CATEGORIES ===\n");
    for entry in ENTRIES {
        out.push('\n');
        describe_entry(&mut out, entry);
    }
    out
}

fn describe_entry(out: &mut String, entry: &TaxonomyEntry) {
    let heading = entry.key.to_uppercase();
    // Writing to a String cannot fail
    let _ = match entry.subcategory_label {
        Some(label) => writeln!(out, "{} (Subcategory = {})", heading, label),
        None => writeln!(out, "{}", heading),
    };

    for line in entry.summary {
        let _ = writeln!(out, "- {}", line);
    }
    if let Some(subs) = entry.subcategories {
        let _ = writeln!(out, "- Subcategories: {}", subs.join(", "));
    }
    if entry.subcategory_label.is_none() {
        out.push_str("- No subcategory needed\n");
    }
    if let Some(example) = entry.example {
        let _ = writeln!(out, "- Example: {}", example);
    }
    for note in entry.notes {
        let _ = writeln!(out, "- Note: {}", note);
    }
}
