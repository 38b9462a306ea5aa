//! Terminal output: download progress bars and the final result lists.

use std::sync::Mutex;

use console::style;
use geoip2_update::{FetchObserver, UpdateReport};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str =
    "  - Downloading {prefix:.green}: [{bar:40.cyan/blue}] {percent:>3}% {bytes}/{total_bytes}";
const SPINNER_TEMPLATE: &str = "  - Downloading {prefix:.green}: {spinner} {bytes}";

/// Shows one progress bar per download on stderr.
pub(crate) struct ProgressObserver {
    visible: bool,
    current: Mutex<Option<ProgressBar>>,
}

impl ProgressObserver {
    pub(crate) fn new(visible: bool) -> Self {
        Self {
            visible,
            current: Mutex::new(None),
        }
    }

    fn new_bar(&self, total_bytes: Option<u64>) -> ProgressBar {
        let target = if self.visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        match total_bytes {
            Some(total) => {
                let bar = ProgressBar::with_draw_target(Some(total), target);
                bar.set_style(
                    ProgressStyle::with_template(BAR_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=> "),
                );
                bar
            }
            None => {
                let bar = ProgressBar::with_draw_target(None, target);
                bar.set_style(
                    ProgressStyle::with_template(SPINNER_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        }
    }
}

impl FetchObserver for ProgressObserver {
    fn started(&self, edition: &str, total_bytes: Option<u64>) {
        let bar = self.new_bar(total_bytes);
        bar.set_prefix(edition.to_string());
        if let Ok(mut current) = self.current.lock()
            && let Some(previous) = current.replace(bar)
        {
            previous.finish_and_clear();
        }
    }

    fn advanced(&self, _edition: &str, downloaded_bytes: u64) {
        if let Ok(current) = self.current.lock()
            && let Some(bar) = current.as_ref()
        {
            bar.set_position(downloaded_bytes);
        }
    }

    fn finished(&self, _edition: &str) {
        if let Ok(mut current) = self.current.lock()
            && let Some(bar) = current.take()
        {
            bar.finish_and_clear();
        }
    }
}

/// Prints updated lines in green on stdout, then errors in red on stderr.
pub(crate) fn print_report(report: &UpdateReport, quiet: bool) {
    if !quiet {
        for line in report.updated() {
            println!("{}", style(line).green());
        }
    }
    for line in report.errors() {
        eprintln!("{}", style(line).red());
    }
}
