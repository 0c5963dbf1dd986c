use super::error::PatchError;
use super::resolve::FieldSet;
use super::value::SqlValue;

/// Positional placeholder syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` (MySQL, SQLite)
    #[default]
    Anonymous,
    /// `?1`, `?2`, ... (SQLite)
    Numbered,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
}

impl Placeholder {
    /// Render the placeholder for a 1-based argument position
    pub fn render(self, position: usize) -> String {
        match self {
            Placeholder::Anonymous => "?".to_string(),
            Placeholder::Numbered => format!("?{}", position),
            Placeholder::Dollar => format!("${}", position),
        }
    }

    /// Count the placeholders of this style in `text`.
    ///
    /// Numbered styles must run `1..=n` in order of appearance; anything else
    /// returns `None`.
    pub fn count(self, text: &str) -> Option<usize> {
        let bytes = text.as_bytes();
        let marker = match self {
            Placeholder::Anonymous | Placeholder::Numbered => b'?',
            Placeholder::Dollar => b'$',
        };

        let mut count = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != marker {
                i += 1;
                continue;
            }
            let digits_start = i + 1;
            let mut end = digits_start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }

            match self {
                Placeholder::Anonymous => {
                    if end != digits_start {
                        return None;
                    }
                }
                Placeholder::Numbered | Placeholder::Dollar => {
                    let position: usize = text[digits_start..end].parse().ok()?;
                    if position != count + 1 {
                        return None;
                    }
                }
            }
            count += 1;
            i = end;
        }
        Some(count)
    }
}

/// Statement text plus the arguments bound to its placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledStatement {
    text: String,
    args: Vec<SqlValue>,
}

impl AssembledStatement {
    /// Build a statement after checking that `args` lines up with the
    /// placeholders in `text`.
    pub fn checked(
        text: String,
        args: Vec<SqlValue>,
        style: Placeholder,
    ) -> Result<Self, PatchError> {
        match style.count(&text) {
            Some(placeholders) if placeholders == args.len() => Ok(Self { text, args }),
            counted => Err(PatchError::AssemblyInvariantViolation {
                placeholders: counted.unwrap_or(0),
                args: args.len(),
                text,
            }),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }
}

/// Build `UPDATE <table> SET f1 = ?, ... WHERE <key_column> = ?`.
///
/// `table` and `key_column` must be code-defined identifiers. Field values
/// are appended to the arguments in order, followed by `identity`.
pub fn assemble_update(
    table: &'static str,
    key_column: &'static str,
    fields: FieldSet,
    identity: SqlValue,
    style: Placeholder,
) -> Result<AssembledStatement, PatchError> {
    if fields.is_empty() {
        return Err(PatchError::EmptyPatch);
    }

    let mut assignments = Vec::with_capacity(fields.len());
    let mut args = Vec::with_capacity(fields.len() + 1);
    for (column, value) in fields.into_entries() {
        assignments.push(format!("{} = {}", column, style.render(args.len() + 1)));
        args.push(value);
    }
    let key_placeholder = style.render(args.len() + 1);
    args.push(identity);

    let text = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        table,
        assignments.join(", "),
        key_column,
        key_placeholder
    );
    AssembledStatement::checked(text, args, style)
}

/// Build `INSERT INTO <table> (a, b) VALUES (?, ?)`.
pub fn assemble_insert(
    table: &'static str,
    fields: FieldSet,
    style: Placeholder,
) -> Result<AssembledStatement, PatchError> {
    if fields.is_empty() {
        return Err(PatchError::EmptyPatch);
    }

    let mut columns = Vec::with_capacity(fields.len());
    let mut placeholders = Vec::with_capacity(fields.len());
    let mut args = Vec::with_capacity(fields.len());
    for (column, value) in fields.into_entries() {
        columns.push(column);
        placeholders.push(style.render(args.len() + 1));
        args.push(value);
    }

    let text = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );
    AssembledStatement::checked(text, args, style)
}
