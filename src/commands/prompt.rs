// src/commands/prompt.rs
//! Yes/no questions on the terminal

use anyhow::Result;
use slackpick::{FailedAction, FailureHandler};
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Asks questions on stdin unless told to assume yes
pub struct StdinPrompt {
    assume_yes: bool,
}

impl StdinPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    /// Ask a `[y/N]` question; anything but `y` is no
    pub fn confirm(&self, question: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        let mut stdout = io::stdout();
        write!(stdout, "{} [y/N] ", question)?;
        stdout.flush()?;

        read_answer(&mut io::stdin().lock())
    }
}

impl FailureHandler for StdinPrompt {
    fn continue_after(&mut self, failure: &FailedAction) -> bool {
        println!("{}", failure);
        // Unattended runs stop at the first failure
        if self.assume_yes {
            return false;
        }
        answer_or_decline(self.confirm("An error occurred. Continue anyway?"))
    }
}

fn read_answer(input: &mut impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(is_yes(&line))
}

/// An unreadable answer counts as no
fn answer_or_decline(answer: Result<bool>) -> bool {
    answer.unwrap_or_else(|e| {
        warn!("Cannot read answer, stopping: {:#}", e);
        false
    })
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim(), "y" | "Y")
}
