//! Progress bar driven by engine events

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use treecp_types::{CopyOutcome, CopyUnit, ProgressReporter, Summary};

const TEMPLATE: &str = "{spinner:.green} {msg} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})";

/// Progress reporter rendering an indicatif bar
///
/// The bar length grows as enumeration discovers units, so it is only an estimate
/// of the remaining work until the listing finishes.
#[derive(Debug)]
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    /// Create a reporter drawing to stderr
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Create a reporter around an existing bar
    pub fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Current position and length of the bar
    pub fn position(&self) -> (u64, Option<u64>) {
        (self.bar.position(), self.bar.length())
    }
}

impl Default for ProgressBarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn report_unit_discovered(&self, _unit: &CopyUnit) {
        self.bar.inc_length(1);
    }

    fn report_outcome(&self, outcome: &CopyOutcome) {
        let source = &outcome.unit.source;
        let name = source.file_name().map_or_else(
            || source.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        self.bar.set_message(format!("Copying: {name}"));
        self.bar.inc(1);
    }

    fn report_completion(&self, _summary: &Summary) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    #[test]
    fn test_bar_tracks_discovered_and_finished_units() {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        let reporter = ProgressBarReporter::with_bar(bar);

        for i in 0..3 {
            let unit = CopyUnit::file(format!("/s/{i}"), format!("/d/{i}"), 1);
            reporter.report_unit_discovered(&unit);
        }
        reporter.report_outcome(&CopyOutcome::copied(CopyUnit::file("/s/0", "/d/0", 1), 1));
        reporter.report_outcome(&CopyOutcome::skipped(CopyUnit::file("/s/1", "/d/1", 1)));

        assert_eq!(reporter.position(), (2, Some(3)));
        reporter.report_completion(&Summary::new());
        assert!(reporter.bar.is_finished());
    }
}
