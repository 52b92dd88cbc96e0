//! Golden JSON files for tick-by-tick machine tests.
//!
//! Values are rendered as pretty JSON with every object's keys sorted, plus a
//! trailing newline, so goldens diff cleanly. Set `PW_UPDATE_SNAPSHOTS=1` to
//! rewrite goldens instead of comparing against them.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Environment variable that switches snapshot assertions into update mode.
pub const UPDATE_SNAPSHOTS_ENV: &str = "PW_UPDATE_SNAPSHOTS";

/// Compare `value` with the golden at `path`, or rewrite it in update mode.
///
/// On mismatch the error names the first differing line.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = render_json(value)?;

    if update_requested() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating snapshot dir {}", dir.display()))?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("writing snapshot {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "no snapshot at {} (set {}=1 to record it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    if let Some((line, want, got)) = first_difference(&expected, &actual) {
        bail!(
            "snapshot {} differs at line {}: expected `{}`, got `{}` (set {}=1 to update)",
            path.display(),
            line,
            want,
            got,
            UPDATE_SNAPSHOTS_ENV
        );
    }
    Ok(())
}

/// Render `value` the way goldens are stored.
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("serializing snapshot")?;
    let mut text =
        serde_json::to_string_pretty(&sort_keys(value)).context("formatting snapshot")?;
    text.push('\n');
    Ok(text)
}

fn update_requested() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, inner)| (key, sort_keys(inner)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn first_difference<'a>(expected: &'a str, actual: &'a str) -> Option<(usize, &'a str, &'a str)> {
    let mut want = expected.lines();
    let mut got = actual.lines();
    let mut line = 1;
    loop {
        match (want.next(), got.next()) {
            (None, None) => {
                return (expected != actual).then_some((line, "<eof>", "<eof>"));
            }
            (w, g) if w != g => return Some((line, w.unwrap_or("<eof>"), g.unwrap_or("<eof>"))),
            _ => line += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_at_every_depth() {
        let text = render_json(&json!({"b": 1, "a": {"z": true, "c": [ {"y": 0, "x": 1} ]}}))
            .expect("renders");
        let a = text.find("\"a\"").expect("a present");
        let b = text.find("\"b\"").expect("b present");
        assert!(a < b);
        assert!(text.find("\"x\"").expect("x") < text.find("\"y\"").expect("y"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn difference_reports_line() {
        assert_eq!(first_difference("a\nb\n", "a\nb\n"), None);
        assert_eq!(first_difference("a\nb\n", "a\nc\n"), Some((2, "b", "c")));
        assert_eq!(first_difference("a\n", "a\nb\n"), Some((2, "<eof>", "b")));
    }

    #[test]
    fn missing_golden_is_an_error() {
        if update_requested() {
            return;
        }
        let path = std::env::temp_dir().join("powerworks-testkit-missing-golden.json");
        let _ = fs::remove_file(&path);
        assert!(assert_json_snapshot(&path, &json!({"a": 1})).is_err());
    }
}
