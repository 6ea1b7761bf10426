mod body;
mod query;
mod tag;

use std::fs;

use anyhow::{Context, Result, bail};

use parambind_lib::schema::{DynamicRecord, FieldSpec, Schema};

use crate::RecordArgs;

pub use body::cmd_body;
pub use query::cmd_query;
pub use tag::cmd_tag;

/// Build an empty record from `--schema` and `--field` declarations.
///
/// Schema file fields come first, inline fields are appended in order.
fn load_record(args: &RecordArgs) -> Result<DynamicRecord> {
  let mut schema = match &args.schema {
    Some(path) => {
      let json = fs::read_to_string(path).with_context(|| format!("Failed to read schema: {}", path.display()))?;
      Schema::from_json(&json).with_context(|| format!("Failed to parse schema: {}", path.display()))?
    }
    None => Schema::default(),
  };

  for spec in &args.fields {
    schema.push(FieldSpec::parse_inline(spec)?);
  }

  if schema.is_empty() {
    bail!("No fields declared. Use --field or --schema.");
  }
  schema.validate()?;

  Ok(DynamicRecord::new(schema))
}
