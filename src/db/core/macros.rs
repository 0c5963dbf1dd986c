/// Implement the Table trait for a row struct
///
/// Usage:
/// ```ignore
/// #[derive(Debug, Clone)]
/// pub struct Job {
///     pub job_no: String,
///     pub description: String,
/// }
///
/// impl_table!(Job, "erhadata", key = "jobNo", order = "jobNo", {
///     job_no: "jobNo",
///     description: "description",
/// });
/// ```
///
/// Each field is read by column name, so the struct's field order does not
/// need to match the table's column order.
#[macro_export]
macro_rules! impl_table {
    (
        $struct_name:ident,
        $table_name:expr,
        key = $key:expr,
        order = $order:expr,
        { $($field:ident: $column:expr),* $(,)? }
    ) => {
        impl $crate::db::core::table::Table for $struct_name {
            fn table_name() -> &'static str {
                $table_name
            }

            fn primary_key() -> &'static str {
                $key
            }

            fn default_order() -> &'static str {
                $order
            }

            fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
                Ok($struct_name {
                    $(
                        $field: row.get($column)?,
                    )*
                })
            }

            fn all_columns() -> &'static [&'static str] {
                &[
                    $(
                        $column,
                    )*
                ]
            }
        }
    };
}
