//! Implementation of the `parambind body` command.
//!
//! Reads a URL-encoded body from a file or stdin and binds it into the
//! declared record.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use parambind_lib::bind_body;

use super::load_record;
use crate::RecordArgs;
use crate::output::{format_bytes, print_json, print_record, print_stat};

pub fn cmd_body(file: &Path, args: &RecordArgs) -> Result<()> {
  let mut record = load_record(args)?;

  let raw = if file == Path::new("-") {
    bind_body(io::stdin().lock(), &mut record)?
  } else {
    let reader = File::open(file).with_context(|| format!("Failed to open body: {}", file.display()))?;
    bind_body(reader, &mut record)?
  };

  if args.format.is_json() {
    let json = serde_json::json!({
      "fields": record.to_json(),
      "raw_body": String::from_utf8_lossy(&raw),
    });
    print_json(&json)?;
  } else {
    print_record(&record);
    print_stat("Raw body", &format_bytes(raw.len() as u64));
  }

  Ok(())
}
