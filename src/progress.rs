//! Per-stage spinner on stderr.
//!
//! Hidden when stderr is not a terminal or when the caller asks for quiet
//! output, so logs and piped output stay clean.

use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

pub struct StageProgress {
    bar: ProgressBar,
    message: String,
}

impl StageProgress {
    /// Start a spinner for a stage over `total` repositories.
    pub fn start(message: &str, total: usize, visible: bool) -> Self {
        let bar = if visible && Term::stderr().is_term() {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        // The template is a literal; a parse failure leaves the default style.
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{pos}/{len}]")
        {
            bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        bar.set_length(total as u64);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            message: message.to_string(),
        }
    }

    /// Record one finished repository.
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn success(self) {
        self.bar.finish_with_message(format!("✓ {}", self.message));
    }

    pub fn error(self) {
        self.bar.abandon_with_message(format!("✗ {}", self.message));
    }
}
