//! Terminal spinner shown while long-running git operations are in flight.
//!
//! The spinner draws to stderr so stdout stays pipe-friendly, and it is
//! hidden entirely when stderr is not a terminal (CI jobs, redirected logs).

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Starts a spinner with `message`. Call [`ProgressBar::finish_and_clear`]
/// (or drop it) when the operation completes.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let target = if console::Term::stderr().is_term() {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    };

    let bar = ProgressBar::with_draw_target(None, target);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        bar.set_style(style);
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(TICK_INTERVAL);
    bar
}
