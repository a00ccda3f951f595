use std::time::{Duration, Instant};

/// Coalesces rapid updates into one emission after a quiet period.
///
/// Only the latest pushed value is kept. Each push reschedules the deadline;
/// [`poll`](Debouncer::poll) hands the value out once the deadline has passed.
/// Time is passed in by the caller, so the event loop drives it from its tick.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Buffers `value`, replacing any pending one and restarting the wait.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.quiet,
        });
    }

    /// Returns the buffered value if its quiet period elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if ready { self.flush() } else { None }
    }

    /// Returns the buffered value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn emits_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push("c", start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + QUIET), Some("c"));
        assert_eq!(debouncer.poll(start + QUIET * 2), None);
    }

    #[test]
    fn new_input_reschedules_and_keeps_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push("c", start);
        debouncer.push("ca", start + Duration::from_millis(200));
        debouncer.push("car", start + Duration::from_millis(400));

        assert_eq!(debouncer.poll(start + Duration::from_millis(600)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(700))
        );
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(700)),
            Some("car")
        );
    }

    #[test]
    fn flush_and_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push(1, start);
        assert_eq!(debouncer.flush(), Some(1));
        assert_eq!(debouncer.deadline(), None);

        debouncer.push(2, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + QUIET), None);
    }
}
