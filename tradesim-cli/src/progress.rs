//! Terminal progress reporting for the engine loop.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tradesim_core::ProgressObserver;

/// Draws an indicatif bar that advances at every 10% milestone.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} trades ({percent}%)")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        self.bar = bar;
    }

    fn on_milestone(&mut self, completed: usize, _total: usize, _percent: u32) {
        self.bar.set_position(completed as u64);
    }

    fn on_finish(&mut self, _total: usize) {
        self.bar.finish_and_clear();
    }
}

/// Logs milestones at debug level; used when the bar is disabled, so a
/// plain run stays quiet unless `--verbose` or `RUST_LOG` asks for more.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_milestone(&mut self, completed: usize, total: usize, percent: u32) {
        debug!(completed, total, "progress: {percent}%");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn log_lines(level: &str) -> usize {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(level))
            .with_writer(out.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut obs = LogProgress;
            obs.on_start(100);
            for i in 1..=100 {
                if let Some(p) = tradesim_core::progress::milestone(i, 100) {
                    obs.on_milestone(i, 100, p);
                }
            }
            obs.on_finish(100);
        });
        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        text.lines().count()
    }

    #[test]
    fn log_progress_is_silent_at_info() {
        assert_eq!(log_lines("info"), 0);
    }

    #[test]
    fn log_progress_reports_each_decile_at_debug() {
        assert_eq!(log_lines("debug"), 10);
    }

    #[test]
    fn bar_progress_default_is_hidden() {
        let bar = BarProgress::default();
        assert!(bar.bar.is_hidden());
        let mut bar = BarProgress::new();
        bar.on_finish(0);
    }
}
