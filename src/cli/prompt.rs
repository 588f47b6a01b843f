//! Interactive sprint selection.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};

use crate::jira::BasicSprint;

/// Asks the user to pick one sprint from a numbered list.
///
/// `is_terminal` and `reader` are injected so tests can drive the prompt
/// without blocking on real stdin. Returns `None` when the user quits or
/// stdin closes.
pub fn select_sprint<'a>(
    sprints: &'a [BasicSprint],
    is_terminal: bool,
    reader: &mut (dyn BufRead + Send),
) -> Result<Option<&'a BasicSprint>> {
    if !is_terminal {
        bail!("stdin is not interactive, cannot prompt for a sprint. Use --all or --sprint");
    }

    println!("\n📋 Choose a sprint:");
    for (index, sprint) in sprints.iter().enumerate() {
        println!("  {:>3}. {}", index + 1, sprint.name);
    }

    loop {
        print!("❓ Sprint number [1-{}] or [q]uit: ", sprints.len());
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes = reader.read_line(&mut input)?;
        if bytes == 0 {
            eprintln!("warning: stdin closed, no sprint selected");
            return Ok(None);
        }

        let choice = input.trim();
        if choice.eq_ignore_ascii_case("q") || choice.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }

        if let Some(sprint) = parse_choice(sprints, choice) {
            return Ok(Some(sprint));
        }

        println!(
            "Invalid choice. Enter a number between 1 and {}, a sprint name, or 'q' to quit.",
            sprints.len()
        );
    }
}

/// Accepts a 1-based index or an exact sprint name.
fn parse_choice<'a>(sprints: &'a [BasicSprint], choice: &str) -> Option<&'a BasicSprint> {
    match choice.parse::<usize>() {
        Ok(n) if n >= 1 => sprints.get(n - 1),
        Ok(_) => None,
        Err(_) => sprints.iter().find(|s| s.name == choice),
    }
}
