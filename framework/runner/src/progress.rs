use indicatif::{ProgressBar, ProgressStyle};

/// Displays a progress bar while a scenario is running to show the user how many runs are left.
pub struct ScenarioProgress {
    bar: Option<ProgressBar>,
}

impl ScenarioProgress {
    pub fn start(name: &str, runs: usize) -> Self {
        let bar = ProgressBar::new(runs as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg:<6} [{wide_bar:.cyan/blue}] {pos}/{len} [{elapsed_precise}]",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(name.to_string());

        Self { bar: Some(bar) }
    }

    /// A progress tracker that draws nothing.
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Remove the bar so that it doesn't interleave with the scenario's summary line.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            log::trace!("Progress bar finished at {}", bar.position());
            bar.finish_and_clear();
        }
    }
}
