use super::Payload;
use super::assemble::{AssembledStatement, Placeholder, assemble_update};
use super::error::PatchError;
use super::resolve::{FieldSet, resolve};
use super::schema::FieldSchema;
use super::value::SqlValue;

/// One incoming partial update: the target row's identity and the fields to set.
///
/// Built at request entry and consumed by [`PatchRequest::assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatchRequest {
    identity: SqlValue,
    fields: FieldSet,
}

impl PatchRequest {
    /// Resolve `payload` against `schema` for the row identified by `identity`
    pub fn new(
        schema: &FieldSchema,
        identity: impl Into<SqlValue>,
        payload: &Payload,
    ) -> Result<Self, PatchError> {
        Ok(Self {
            identity: identity.into(),
            fields: resolve(schema, payload)?,
        })
    }

    /// Also set a server-managed column such as `updated_at`
    pub fn touch(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.fields.push_managed(column, value);
        self
    }

    pub fn identity(&self) -> &SqlValue {
        &self.identity
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn assemble(
        self,
        table: &'static str,
        key_column: &'static str,
        style: Placeholder,
    ) -> Result<AssembledStatement, PatchError> {
        assemble_update(table, key_column, self.fields, self.identity, style)
    }
}
