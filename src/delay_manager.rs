use std::time::Duration;
use std::thread;
use log::debug;

/// Fixed wait after submitting a query. The portal renders either the result
/// panel or the not-found notice with no completion event to wait on.
pub fn settle_delay(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    debug!("Waiting {} ms for the portal to settle...", delay.as_millis());
    thread::sleep(delay);
}

/// Pause between two polls of a bounded wait.
pub fn poll_pause(interval: Duration) {
    thread::sleep(interval);
}
