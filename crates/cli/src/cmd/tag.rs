//! Implementation of the `parambind tag` command.

use anyhow::Result;

use parambind_lib::FieldTag;

use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_tag(annotation: &str, format: OutputFormat) -> Result<()> {
  let tag = FieldTag::parse(annotation)?;

  if format.is_json() {
    let json = match &tag {
      FieldTag::Skip => serde_json::json!({ "skip": true }),
      FieldTag::Bind(d) => serde_json::json!({
        "skip": false,
        "omit_empty": d.omit_empty,
        "range": d.range,
      }),
    };
    return print_json(&json);
  }

  match tag {
    FieldTag::Skip => print_success("Field is skipped"),
    FieldTag::Bind(d) => {
      print_success(&format!("Valid annotation \"{d}\""));
      print_stat("omitempty", &d.omit_empty.to_string());
      print_stat("range", d.range.as_deref().unwrap_or("none"));
    }
  }

  Ok(())
}
