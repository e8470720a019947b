use crate::ui::icons::{CHECK, CLOCK, CROSS, RUNNING, SPARKLE};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Terminal UI for a provisioning run, rendered via `indicatif`.
///
/// Two bars are stacked vertically:
/// - Step bar, counting completed pipeline steps
/// - Activity spinner, showing what the current step is doing
pub struct PipelineUI {
    multi: MultiProgress,
    step_bar: ProgressBar,
    activity: ProgressBar,
    verbose: bool,
}

impl PipelineUI {
    /// Create the UI for a run of `total_steps` steps.
    pub fn new(total_steps: u64, verbose: bool) -> Self {
        Self::with_target(total_steps, verbose, ProgressDrawTarget::stderr())
    }

    /// A UI that draws nothing, for non-interactive runs and tests.
    pub fn hidden(total_steps: u64) -> Self {
        Self::with_target(total_steps, false, ProgressDrawTarget::hidden())
    }

    fn with_target(total_steps: u64, verbose: bool, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);

        let step_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");
        let step_bar = multi.add(ProgressBar::new(total_steps));
        step_bar.set_style(step_style);
        step_bar.set_prefix("Steps");

        let activity_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");
        let activity = multi.add(ProgressBar::new_spinner());
        activity.set_style(activity_style);
        activity.set_prefix("  Now");

        Self {
            multi,
            step_bar,
            activity,
            verbose,
        }
    }

    /// Print via `MultiProgress`, falling back to `eprintln!` if the bars can't draw.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn start_step(&self, name: &str, description: &str) {
        self.step_bar
            .set_message(format!("{}: {}", style(name).yellow(), description));
        self.activity
            .set_message(format!("{}{}", RUNNING, style(description).dim()));
        self.activity.enable_steady_tick(Duration::from_millis(100));
        if self.verbose {
            self.print_line(format!("{}{}", RUNNING, style(name).bold()));
        }
    }

    /// Update the spinner with a short status; echoed as a dim line in verbose mode.
    pub fn log_activity(&self, msg: &str) {
        self.activity.set_message(style(msg).dim().to_string());
        if self.verbose {
            self.print_line(format!("    {} {}", style("→").dim(), style(msg).dim()));
        }
    }

    pub fn waiting(&self, what: &str, duration: Duration) {
        self.log_activity(&format!("{}{} ({}s)", CLOCK, what, duration.as_secs()));
    }

    pub fn step_complete(&self, name: &str, elapsed: Duration) {
        self.step_bar.inc(1);
        self.print_line(format!(
            "{}{} {}",
            CHECK,
            style(name).green(),
            style(format_elapsed(elapsed)).dim()
        ));
    }

    pub fn step_failed(&self, name: &str, reason: &str) {
        self.activity.finish_and_clear();
        self.print_line(format!("{}{} failed: {}", CROSS, style(name).red().bold(), reason));
    }

    /// Stop both bars after the last step.
    pub fn finish(&self, success: bool) {
        self.activity.finish_and_clear();
        if success {
            self.step_bar
                .finish_with_message(format!("{}Instance provisioned", SPARKLE));
        } else {
            self.step_bar.abandon();
        }
    }

    pub fn completed_steps(&self) -> u64 {
        self.step_bar.position()
    }
}

/// `Xs`, or `Xm Ys` from one minute up.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_switches_to_minutes() {
        assert_eq!(format_elapsed(Duration::from_secs(42)), "42s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn hidden_ui_counts_completed_steps() {
        let ui = PipelineUI::hidden(7);
        ui.start_step("probe", "Waiting for the instance");
        ui.step_complete("probe", Duration::from_secs(1));
        ui.start_step("mint", "Minting API credentials");
        ui.step_failed("mint", "login failed");
        ui.finish(false);
        assert_eq!(ui.completed_steps(), 1);
    }
}
