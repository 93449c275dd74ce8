//! Process name → stack parameter prefix.
//!
//! Stack templates name their parameters in UpperCamelCase derived from the
//! process name (`web` → `WebFormation`, `my-worker` → `MyWorkerDesiredCount`).
//! Every reader and writer of formation parameters must derive the prefix
//! through [`upper_name`] so that both sides agree on the key.

/// Convert a process name to its parameter-key prefix.
///
/// The first character and every character following a non-alphanumeric
/// separator are upper-cased; separators are dropped; everything else is
/// kept as-is.
pub fn upper_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut capitalize = true;

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            capitalize = true;
            continue;
        }
        if capitalize {
            out.push(c.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(c);
        }
    }

    out
}
