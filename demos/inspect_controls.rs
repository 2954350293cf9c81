//! Print the state of legacy form controls in an Excel workbook.
//!
//! # Usage
//!
//! List every named control:
//! ```sh
//! cargo run --example inspect_controls -- survey.xlsx --list
//! ```
//!
//! Query checkboxes and option buttons:
//! ```sh
//! cargo run --example inspect_controls -- survey.xlsx \
//!     --checkbox "Check Box 1" --checkbox "Check Box 2" \
//!     --radio Opt1 --radio Opt2
//! ```
//!
//! Set `RUST_LOG=formctl=debug` to trace extraction and resolution.

use clap::Parser;
use formctl::{ControlSession, SessionOptions};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

/// Inspect checkbox and option-button state in an .xlsx file
#[derive(Parser, Debug)]
#[command(name = "inspect_controls", version)]
struct Args {
    /// Workbook to inspect
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Checkbox to query (matches a fragment of the drawing name)
    #[arg(short, long, value_name = "NAME")]
    checkbox: Vec<String>,

    /// Option button to query (exact VML shape id)
    #[arg(short, long, value_name = "ID")]
    radio: Vec<String>,

    /// List the names of all drawing nodes
    #[arg(short, long)]
    list: bool,

    /// Directory to extract the workbook into
    #[arg(long, value_name = "DIR")]
    temp_root: Option<PathBuf>,

    /// Largest archive entry to extract, in bytes
    #[arg(long, value_name = "BYTES")]
    max_entry_size: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut options = SessionOptions::new();
    if let Some(root) = &args.temp_root {
        options = options.with_temp_root(root);
    }
    if let Some(limit) = args.max_entry_size {
        options = options.with_max_entry_size(limit);
    }

    let session = ControlSession::open_with_options(&args.input, options)?;

    if args.list {
        for name in session.control_names() {
            println!("{}", name);
        }
    }

    for name in &args.checkbox {
        match session.checkbox_state(name) {
            Ok(checked) => println!("checkbox {:<24} {}", name, if checked { "checked" } else { "unchecked" }),
            Err(e) => eprintln!("checkbox {:<24} error: {}", name, e),
        }
    }

    for name in &args.radio {
        match session.radio_button_state(name).await {
            Ok(selected) => println!("radio    {:<24} {}", name, if selected { "selected" } else { "clear" }),
            Err(e) => eprintln!("radio    {:<24} error: {}", name, e),
        }
    }

    session.close()?;
    Ok(())
}
