use indicatif::{ProgressBar, ProgressStyle};

/// Receives fractional progress events from a transfer or merge.
///
/// Implementations are infallible and must stay cheap: events arrive once
/// per chunk of the single in-flight operation.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, fraction: f64);
}

/// Observer that discards every event.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&self, _fraction: f64) {}
}

/// Observer rendering an indicatif bar, scaled to permille.
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(1000);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {percent:>3}% ({eta})")
                .unwrap()
                .progress_chars("=> "),
        );
        Self { bar }
    }

    /// Clear the bar once the operation it tracked has completed.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_progress(&self, fraction: f64) {
        self.bar.set_position((fraction.clamp(0.0, 1.0) * 1000.0) as u64);
    }
}
