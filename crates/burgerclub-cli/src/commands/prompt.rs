use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use burgerclub_core::Confirmation;

use crate::cli::ConfirmArgs;

/// Ask a yes/no question on stdin. Anything but "y"/"yes" is a no.
pub fn ask(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Collect the two acknowledgements a delete needs. Each `--yes` skips one
/// prompt; a "no" stops asking and leaves the confirmation incomplete.
pub fn confirm_twice(args: ConfirmArgs, first: &str, second: &str) -> Result<Confirmation> {
    let mut confirmation = Confirmation::none();
    for _ in 0..args.yes {
        confirmation = confirmation.acknowledge();
    }
    for question in [first, second].into_iter().skip(args.yes as usize) {
        if !ask(question)? {
            break;
        }
        confirmation = confirmation.acknowledge();
    }
    Ok(confirmation)
}

pub fn password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}
