//! Interactive user prompting components
//!
//! Keeps CLI prompting separate from controller logic.

use std::io::{self, Write};

use crate::error::Result;

/// Prompt user for yes/no confirmation
///
/// Returns `true` only if the user answers 'y' or 'Y'.
///
/// ```no_run
/// # use scicure::commands::interactive::confirm;
/// if confirm("Delete article a1").unwrap() {
///     // proceed with deletion
/// }
/// ```
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{}? [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Read one line from stdin after printing `prompt`, without the trailing newline
pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim_end_matches(['\n', '\r']).to_string())
}
