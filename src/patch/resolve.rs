use super::Payload;
use super::error::PatchError;
use super::schema::FieldSchema;
use super::value::SqlValue;

/// Ordered `(column, value)` pairs resolved from a payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    entries: Vec<(&'static str, SqlValue)>,
}

impl FieldSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, SqlValue)> {
        self.entries.iter()
    }

    /// Append a server-managed column (generated id, timestamp).
    ///
    /// Managed columns never come from the payload and are placed after the
    /// resolved fields. An existing entry for the same column is replaced in place.
    pub fn push_managed(&mut self, column: &'static str, value: impl Into<SqlValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn into_entries(self) -> Vec<(&'static str, SqlValue)> {
        self.entries
    }
}

/// Resolve an update payload into the fields it sets, in declared order.
///
/// A field is present when its key is present; `null`, `""` and `0` all count.
pub fn resolve(schema: &FieldSchema, payload: &Payload) -> Result<FieldSet, PatchError> {
    reject_unknown(schema, payload)?;

    let mut fields = FieldSet::default();
    for spec in schema.iter() {
        if let Some(value) = payload.get(spec.name) {
            fields
                .entries
                .push((spec.name, spec.kind.convert(spec.name, value)?));
        }
    }

    if fields.is_empty() {
        return Err(PatchError::EmptyPatch);
    }
    Ok(fields)
}

/// Resolve a create payload, applying `required` and `default_value`.
///
/// Required fields must be present and non-null.
/// Absent optional fields without a default are left out so the database
/// default applies.
pub fn resolve_create(schema: &FieldSchema, payload: &Payload) -> Result<FieldSet, PatchError> {
    reject_unknown(schema, payload)?;

    let mut fields = FieldSet::default();
    for spec in schema.iter() {
        let value = match (payload.get(spec.name), spec.default_value) {
            (Some(serde_json::Value::Null), _) if spec.required => {
                return Err(PatchError::InvalidValue {
                    field: spec.name,
                    reason: "must not be null".to_string(),
                });
            }
            (Some(value), _) => spec.kind.convert(spec.name, value)?,
            (None, _) if spec.required => return Err(PatchError::MissingField(spec.name)),
            (None, Some(default)) => default.into(),
            (None, None) => continue,
        };
        fields.entries.push((spec.name, value));
    }

    Ok(fields)
}

fn reject_unknown(schema: &FieldSchema, payload: &Payload) -> Result<(), PatchError> {
    match payload.keys().find(|key| !schema.contains(key)) {
        Some(key) => Err(PatchError::UnknownField(key.clone())),
        None => Ok(()),
    }
}
