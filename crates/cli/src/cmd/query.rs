//! Implementation of the `parambind query` command.
//!
//! Parses a URL query string and binds it into the declared record.

use anyhow::Result;
use tracing::info;

use parambind_lib::{QueryValues, bind_query};

use super::load_record;
use crate::RecordArgs;
use crate::output::{print_json, print_record};

pub fn cmd_query(query: &str, args: &RecordArgs) -> Result<()> {
  let mut record = load_record(args)?;
  let values = QueryValues::parse(query);
  info!(params = values.len(), "parsed query string");

  bind_query(&values, &mut record)?;

  if args.format.is_json() {
    print_json(&serde_json::json!({ "fields": record.to_json() }))?;
  } else {
    print_record(&record);
  }

  Ok(())
}
