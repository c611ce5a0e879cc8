//! Interactive terminal: line input shared by the REPL and the operator
//! prompt, plus a spinner while the backend is working.

use std::io::Write;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::models::{Decision, PendingConfirmation};
use crate::domain::ports::Operator;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Operator answers that count as acceptance. Anything else rejects.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub struct Terminal {
    lines: Mutex<Lines<BufReader<Stdin>>>,
    spinner: StdMutex<Option<ProgressBar>>,
    interactive: bool,
}

impl Terminal {
    /// `interactive` false hides spinners and moves prompts to stderr, so
    /// stdout carries only command output (JSON mode).
    pub fn new(interactive: bool) -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            spinner: StdMutex::new(None),
            interactive,
        }
    }

    /// Print `prompt` and read one line. `None` at end of input.
    pub async fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        if self.interactive {
            let mut stdout = std::io::stdout();
            write!(stdout, "{prompt}").context("Failed to write prompt")?;
            stdout.flush().context("Failed to flush stdout")?;
        } else {
            eprint!("{prompt}");
        }
        self.lines
            .lock()
            .await
            .next_line()
            .await
            .context("Failed to read from stdin")
    }

    pub fn start_activity(&self, message: &str) {
        if !self.interactive {
            return;
        }
        let style = ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS);
        let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    pub fn stop_activity(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }
}

#[async_trait]
impl Operator for Terminal {
    async fn review(&self, pending: &PendingConfirmation) -> Decision {
        self.stop_activity();
        if self.interactive {
            println!("\n{}", style(pending.render()).yellow());
        } else {
            eprintln!("{}", pending.render());
        }

        let decision = match self.read_line("Accept? [y/N] ").await {
            Ok(Some(answer)) if is_affirmative(&answer) => Decision::Accept,
            Ok(_) => Decision::Reject,
            Err(err) => {
                debug!(error = %err, "confirmation prompt failed, rejecting");
                Decision::Reject
            }
        };
        if decision == Decision::Accept {
            self.start_activity("Running...");
        }
        decision
    }
}
