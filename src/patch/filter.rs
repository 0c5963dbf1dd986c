//! Read-path filters: allow-listed status lookups and wildcard searches.

use super::assemble::{AssembledStatement, Placeholder};
use super::error::PatchError;
use super::schema::Choices;
use super::value::SqlValue;

/// `SELECT * FROM <table> WHERE <column> = ? ORDER BY <order_by>` for an
/// allow-listed value.
pub fn by_status(
    table: &'static str,
    column: &'static str,
    choices: &Choices,
    raw: &str,
    order_by: &'static str,
    style: Placeholder,
) -> Result<AssembledStatement, PatchError> {
    let status = choices
        .normalize(raw)
        .ok_or_else(|| PatchError::UnknownStatus(raw.to_string()))?;

    let text = format!(
        "SELECT * FROM {} WHERE {} = {} ORDER BY {}",
        table,
        column,
        style.render(1),
        order_by
    );
    AssembledStatement::checked(text, vec![SqlValue::from(status)], style)
}

/// `SELECT * FROM <table> WHERE c1 LIKE ? ESCAPE '\' OR ... ORDER BY <order_by>`.
///
/// The term matches literally anywhere in any of `columns`; one argument is
/// bound per column.
pub fn search(
    table: &'static str,
    columns: &[&'static str],
    term: &str,
    order_by: &'static str,
    style: Placeholder,
) -> Result<AssembledStatement, PatchError> {
    let pattern = like_pattern(term);

    let mut predicates = Vec::with_capacity(columns.len());
    let mut args = Vec::with_capacity(columns.len());
    for column in columns {
        predicates.push(format!(
            "{} LIKE {} ESCAPE '\\'",
            column,
            style.render(args.len() + 1)
        ));
        args.push(SqlValue::from(pattern.clone()));
    }

    let text = format!(
        "SELECT * FROM {} WHERE {} ORDER BY {}",
        table,
        predicates.join(" OR "),
        order_by
    );
    AssembledStatement::checked(text, args, style)
}

/// Wrap `term` in `%` wildcards, escaping LIKE metacharacters inside it
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
