//! Terminal progress display using indicatif.
//!
//! [`ScanProgress`] renders [`ScanStatus`] snapshots polled from the
//! engine: a spinner counting discovered videos while walking, then a
//! bar over the files to hash while verifying.
//!
//! # Accessible Mode
//!
//! When accessible mode is enabled, progress reporting uses simplified output:
//! - No spinner animation
//! - ASCII bar characters
//! - Slower tick rate

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::engine::{ScanPhase, ScanStatus};

/// Progress renderer fed by status snapshots.
pub struct ScanProgress {
    multi: MultiProgress,
    walking: Option<ProgressBar>,
    verifying: Option<ProgressBar>,
    quiet: bool,
    accessible: bool,
}

impl ScanProgress {
    /// Create a renderer. With `quiet` nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use vidupe::progress::ScanProgress;
    ///
    /// let progress = ScanProgress::new(true);
    /// assert!(!progress.is_accessible());
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self::with_accessible(quiet, false)
    }

    /// Create a renderer with accessible mode.
    #[must_use]
    pub fn with_accessible(quiet: bool, accessible: bool) -> Self {
        let multi = MultiProgress::new();
        if quiet {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self {
            multi,
            walking: None,
            verifying: None,
            quiet,
            accessible,
        }
    }

    /// Check if accessible mode is enabled.
    #[must_use]
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Interval at which callers should poll the engine.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        if self.accessible {
            Duration::from_millis(500)
        } else {
            Duration::from_millis(100)
        }
    }

    fn walking_style(&self) -> ProgressStyle {
        if self.accessible {
            ProgressStyle::with_template("{msg} [{elapsed_precise}] {pos} videos")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
        } else {
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} videos")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        }
    }

    fn verifying_style(&self) -> ProgressStyle {
        if self.accessible {
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        } else {
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} {per_sec} (ETA: {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-")
        }
    }

    /// Render one status snapshot.
    pub fn update(&mut self, status: &ScanStatus) {
        if self.quiet {
            return;
        }

        match status.phase {
            Some(ScanPhase::Walking) => {
                let style = self.walking_style();
                let tick = self.poll_interval();
                let walking = self.walking.get_or_insert_with(|| {
                    let pb = self.multi.add(ProgressBar::new_spinner());
                    pb.set_style(style);
                    pb.set_message("Scanning");
                    pb.enable_steady_tick(tick);
                    pb
                });
                walking.set_position(status.total_files_seen as u64);
            }
            Some(ScanPhase::Verifying) => {
                if let Some(walking) = self.walking.take() {
                    walking.set_position(status.total_files_seen as u64);
                    walking.finish_with_message("Scanned");
                }
                let style = self.verifying_style();
                let verifying = self.verifying.get_or_insert_with(|| {
                    let pb = self.multi.add(ProgressBar::new(status.files_to_hash as u64));
                    pb.set_style(style);
                    pb.set_message("Hashing");
                    pb
                });
                verifying.set_length(status.files_to_hash as u64);
                verifying.set_position(status.files_hashed as u64);
            }
            None => {}
        }
    }

    /// Finish all bars, rendering the final snapshot.
    pub fn finish(&mut self, status: &ScanStatus) {
        if let Some(walking) = self.walking.take() {
            walking.set_position(status.total_files_seen as u64);
            walking.finish_with_message("Scanned");
        }
        if let Some(verifying) = self.verifying.take() {
            verifying.set_position(status.files_hashed as u64);
            verifying.finish_with_message("Hashed");
        }
    }
}
