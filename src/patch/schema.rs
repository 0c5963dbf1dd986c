use super::error::PatchError;
use super::value::SqlValue;
use serde_json::Value;

/// Letter case a [`Choices`] allow-list is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Upper,
    Lower,
}

/// Allow-list of recognised values for an enumerated column (e.g. a status)
#[derive(Debug, Clone, Copy)]
pub struct Choices {
    values: &'static [&'static str],
    case: Case,
}

impl Choices {
    pub const fn new(values: &'static [&'static str], case: Case) -> Self {
        Self { values, case }
    }

    pub fn values(&self) -> &'static [&'static str] {
        self.values
    }

    /// Map client input onto its canonical allow-listed spelling.
    ///
    /// Input is trimmed and case-normalised first, so `" approved"` matches
    /// `APPROVED` in an upper-case list.
    pub fn normalize(&self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        let normalized = match self.case {
            Case::Upper => input.to_uppercase(),
            Case::Lower => input.to_lowercase(),
        };
        self.values
            .iter()
            .copied()
            .find(|candidate| *candidate == normalized)
    }
}

/// How a JSON payload value is converted into a bound [`SqlValue`]
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Integer,
    /// Numbers, or strings that parse as numbers
    Decimal,
    Choice(&'static Choices),
    /// Any JSON value, stored as its serialized text
    Json,
}

impl FieldKind {
    /// Convert a payload value. Explicit `null` is accepted for every kind.
    pub fn convert(&self, field: &'static str, value: &Value) -> Result<SqlValue, PatchError> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }

        let invalid = |reason: &str| PatchError::InvalidValue {
            field,
            reason: reason.to_string(),
        };

        match self {
            FieldKind::Text => value
                .as_str()
                .map(SqlValue::from)
                .ok_or_else(|| invalid("expected a string")),
            FieldKind::Integer => value
                .as_i64()
                .map(SqlValue::Integer)
                .ok_or_else(|| invalid("expected an integer")),
            FieldKind::Decimal => match value {
                Value::Number(n) => n
                    .as_f64()
                    .map(SqlValue::Real)
                    .ok_or_else(|| invalid("expected a number")),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(SqlValue::Real)
                    .ok_or_else(|| invalid("expected a number")),
                _ => Err(invalid("expected a number")),
            },
            FieldKind::Choice(choices) => {
                let raw = value.as_str().ok_or_else(|| invalid("expected a string"))?;
                choices.normalize(raw).map(SqlValue::from).ok_or_else(|| {
                    invalid(&format!("expected one of {}", choices.values().join(", ")))
                })
            }
            FieldKind::Json => Ok(SqlValue::Text(value.to_string())),
        }
    }
}

/// Value used on create when a field is absent from the payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Text(&'static str),
    Integer(i64),
    Real(f64),
}

impl From<DefaultValue> for SqlValue {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Null => SqlValue::Null,
            DefaultValue::Text(s) => SqlValue::Text(s.to_string()),
            DefaultValue::Integer(i) => SqlValue::Integer(i),
            DefaultValue::Real(f) => SqlValue::Real(f),
        }
    }
}

/// One column eligible for dynamic create/update
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Absence on create is an error. Ignored for updates.
    pub required: bool,
    pub default_value: Option<DefaultValue>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default_value: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn decimal(name: &'static str) -> Self {
        Self::new(name, FieldKind::Decimal)
    }

    pub const fn choice(name: &'static str, choices: &'static Choices) -> Self {
        Self::new(name, FieldKind::Choice(choices))
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, FieldKind::Json)
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn default_value(self, value: DefaultValue) -> Self {
        Self {
            default_value: Some(value),
            ..self
        }
    }
}

/// Ordered allow-list of updatable columns.
///
/// Built in const context so schemas live in `static`s; a duplicate or empty
/// schema fails at compile time.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    fields: &'static [FieldSpec],
}

impl FieldSchema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        assert!(!fields.is_empty(), "field schema must not be empty");

        let mut i = 0;
        while i < fields.len() {
            let mut j = i + 1;
            while j < fields.len() {
                assert!(
                    !str_eq(fields[i].name, fields[j].name),
                    "field names must be unique within a schema"
                );
                j += 1;
            }
            i += 1;
        }

        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|spec| spec.name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
