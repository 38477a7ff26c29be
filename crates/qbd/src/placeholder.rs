//! Placeholder translation and renumbering.
//!
//! Callers always write conditions with the dialect-neutral `?` marker.
//! For the MySQL family that is already the wire format. For PostgreSQL every
//! marker becomes a numbered `$N`, where `N` continues from the number of
//! arguments already bound to the statement.
//!
//! The builder keeps fragments in `?` form and numbers them only when the
//! statement is rendered. [`shift_placeholders`] is for text that is already
//! numbered, such as a rendered fragment spliced into a larger statement; it
//! moves every `$N` by a fixed offset, including any inside string literals.

use crate::dialect::Dialect;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// The marker callers use in condition strings.
pub const MARKER: char = '?';

fn numbered_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(\d+)").expect("invalid built-in placeholder regex"))
}

/// Render a single placeholder at a 1-based position.
pub fn placeholder(dialect: Dialect, index: usize) -> String {
    if dialect.numbered_placeholders() {
        format!("${index}")
    } else {
        MARKER.to_string()
    }
}

/// Count `?` markers in a caller-supplied condition.
pub fn count_markers(condition: &str) -> usize {
    condition.matches(MARKER).count()
}

/// Translate the `?` markers in `condition` for `dialect`.
///
/// For PostgreSQL the first marker becomes `$start`, the next `$start + 1`,
/// and so on. For the MySQL family the text is returned unchanged.
pub fn translate_condition(dialect: Dialect, condition: &str, start: usize) -> String {
    if !dialect.numbered_placeholders() {
        return condition.to_string();
    }

    let mut out = String::with_capacity(condition.len() + 4);
    let mut idx = start;
    for c in condition.chars() {
        if c == MARKER {
            out.push('$');
            out.push_str(&idx.to_string());
            idx += 1;
        } else {
            out.push(c);
        }
    }
    out
}

/// `count` placeholders starting at `start`.
pub fn placeholder_list(dialect: Dialect, start: usize, count: usize) -> Vec<String> {
    (0..count).map(|i| placeholder(dialect, start + i)).collect()
}

/// `count` placeholders starting at `start`, joined with `", "`.
pub fn generate_placeholders(dialect: Dialect, start: usize, count: usize) -> String {
    placeholder_list(dialect, start, count).join(", ")
}

/// Add `offset` to every `$N` placeholder in an already-numbered fragment.
///
/// Indices are matched as whole digit runs, so `$9` and `$10` shifted by 3
/// become `$12` and `$13`.
pub fn shift_placeholders(condition: &str, offset: usize) -> String {
    if offset == 0 {
        return condition.to_string();
    }
    numbered_placeholder_re()
        .replace_all(condition, |caps: &Captures<'_>| match caps[1].parse::<usize>() {
            Ok(n) => format!("${}", n + offset),
            // Digit run too long for usize; leave it as written.
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_translation_is_identity() {
        let cond = "a = ? AND b IN (?, ?)";
        assert_eq!(translate_condition(Dialect::MySql, cond, 7), cond);
        assert_eq!(translate_condition(Dialect::MariaDb, cond, 1), cond);
    }

    #[test]
    fn postgres_translation_numbers_from_start() {
        assert_eq!(
            translate_condition(Dialect::Postgres, "a = ? AND b = ?", 1),
            "a = $1 AND b = $2"
        );
        assert_eq!(translate_condition(Dialect::Postgres, "c > ?", 4), "c > $4");
        assert_eq!(translate_condition(Dialect::Postgres, "d IS NULL", 4), "d IS NULL");
    }

    #[test]
    fn generates_lists() {
        assert_eq!(generate_placeholders(Dialect::Postgres, 3, 3), "$3, $4, $5");
        assert_eq!(generate_placeholders(Dialect::MySql, 3, 3), "?, ?, ?");
        assert_eq!(generate_placeholders(Dialect::Postgres, 1, 0), "");
        assert_eq!(placeholder_list(Dialect::Postgres, 9, 2), vec!["$9", "$10"]);
    }

    #[test]
    fn shift_handles_multi_digit_indices() {
        assert_eq!(shift_placeholders("a = $9 AND b = $10", 3), "a = $12 AND b = $13");
        assert_eq!(shift_placeholders("x IN ($1, $2, $11)", 10), "x IN ($11, $12, $21)");
        assert_eq!(shift_placeholders("$1$2", 1), "$2$3");
    }

    #[test]
    fn shift_leaves_other_text_alone() {
        assert_eq!(shift_placeholders("price > 100 AND tag = '$'", 2), "price > 100 AND tag = '$'");
        assert_eq!(shift_placeholders("a = $1", 0), "a = $1");
    }

    #[test]
    fn counts_markers() {
        assert_eq!(count_markers("a = ? OR b = ?"), 2);
        assert_eq!(count_markers("a IS NULL"), 0);
    }
}
