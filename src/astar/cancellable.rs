// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation token shared between a search and its caller.
///
/// Cloning produces a handle to the same flag, so one actor (usually a
/// foreground thread) can call [cancel](Cancellable::cancel) while a search
/// running elsewhere polls [is_cancelled](Cancellable::is_cancelled).
/// Cancellation is sticky: once set, the flag never clears.
#[derive(Debug, Clone, Default)]
pub struct Cancellable {
    cancelled: Arc<AtomicBool>,
}

impl Cancellable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let cancellable = Cancellable::new();
        let clone = cancellable.clone();
        assert!(!cancellable.is_cancelled());
        assert!(!clone.is_cancelled());

        clone.cancel();
        assert!(cancellable.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn cancel_from_another_thread() {
        let cancellable = Cancellable::new();
        let clone = cancellable.clone();
        std::thread::spawn(move || clone.cancel())
            .join()
            .expect("cancelling thread must not panic");
        assert!(cancellable.is_cancelled());
    }
}
