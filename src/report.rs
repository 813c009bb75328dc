//! Colored terminal rendering of the event stream.
//!
//! Uses owo-colors for terminal colors and indicatif for the per-recipe
//! spinner. Pure presentation: feeding events through a [`Reporter`] never
//! affects executor semantics.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

use crate::event::{Event, Scope, StepStatus};

/// Print an action header (blue, bold)
/// Example: "==> Preserving inventory"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a detail line (dimmed)
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Create a spinner shown while a recipe runs
fn recipe_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn scope_name(scope: &Scope) -> String {
    scope.join("/")
}

/// Stateful renderer for a run's event stream.
///
/// Keeps a spinner alive between a recipe's `Begin` and its terminal event;
/// `Log`, `Declare`, and `Step` update the spinner message in place.
#[derive(Default)]
pub struct Reporter {
    spinner: Option<ProgressBar>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one event.
    pub fn handle(&mut self, event: &Event) {
        match event {
            Event::Begin { scope } => {
                action(&format!("Preserving {}", scope_name(scope)));
                self.spinner = Some(recipe_spinner("running"));
            }
            Event::Log { message, .. } => match &self.spinner {
                Some(pb) => pb.set_message(message.clone()),
                None => detail(message),
            },
            Event::Declare { step, .. } => {
                if let Some(pb) = &self.spinner {
                    pb.set_message(format!("{step} pending"));
                }
            }
            Event::Step { step, status, .. } => {
                let text = match status {
                    StepStatus::Running => format!("{step} running"),
                    StepStatus::Completed => format!("{step} done"),
                };
                match &self.spinner {
                    Some(pb) => pb.set_message(text),
                    None => detail(&text),
                }
            }
            Event::Succeed { scope, .. } => {
                if let Some(pb) = self.spinner.take() {
                    pb.finish_and_clear();
                }
                success(&format!("{} preserved", scope_name(scope)));
            }
            Event::Fail { scope, error: err } => {
                if let Some(pb) = self.spinner.take() {
                    pb.finish_and_clear();
                }
                error(&format!("{} failed: {}", scope_name(scope), err));
            }
        }
    }
}
