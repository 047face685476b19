//! Progress reporting for long-running algorithms.
//!
//! Smoothing and partitioning accept a [`Progress`] so that the command-line
//! tool can draw a progress bar while library callers stay silent.
//!
//! # Example
//!
//! ```
//! use atrophy::algo::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 4, "Taubin smoothing");
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives the current step, the total number of steps and a
/// short description of the stage.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_callback_receives_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |c, t, m| {
            sink.lock().unwrap().push((c, t, m.to_string()));
        });
        progress.report(2, 5, "step");
        assert_eq!(seen.lock().unwrap().as_slice(), &[(2, 5, "step".to_string())]);
    }
}
