//! Rendering for the two output modes §6 requires: a single JSON
//! document on stdout (`--json`), or colored human-readable text.
//! Handlers build a `serde_json::Value` either way; only the final
//! print differs.

use colored::Colorize;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use serde::Serialize;
use serde_json::json;

pub fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) {
  if json {
    match serde_json::to_string(value) {
      Ok(rendered) => println!("{rendered}"),
      Err(e) => println!("{{\"error\": \"failed to render output: {e}\"}}"),
    }
  } else {
    human(value);
  }
}

/// §7: JSON mode prints `{"error": "<message>"}` to stdout; human
/// mode prints a single line to stderr. Both paths exit 1 — the
/// caller in `main` handles that part.
pub fn emit_error(json: bool, message: &str) {
  if json {
    println!("{}", json!({ "error": message }));
  } else {
    eprintln!("{} {message}", "error:".red().bold());
  }
}

pub fn table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
  let mut table = Table::new();
  table.load_preset(UTF8_FULL_CONDENSED);
  table.set_header(headers.to_vec());
  for row in rows {
    table.add_row(row);
  }
  table
}
