use std::time::Duration;

/// Delayed actions on a virtual clock advanced by render ticks.
///
/// Keys are delivered in due order (ties in scheduling order). Callers put a
/// state version into their keys and drop deliveries whose version no longer
/// matches, so work queued by a superseded transition can never land.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    now: Duration,
    seq: u64,
    pending: Vec<Pending<K>>,
}

#[derive(Debug, Clone)]
struct Pending<K> {
    due: Duration,
    seq: u64,
    key: K,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn after(&mut self, delay: Duration, key: K) {
        self.pending.push(Pending {
            due: self.now.saturating_add(delay),
            seq: self.seq,
            key,
        });
        self.seq += 1;
    }

    /// Time left until the earliest pending key, if any.
    pub fn until_next(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|p| p.due.saturating_sub(self.now))
            .min()
    }

    /// Move the clock forward and return every key that came due, in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<K> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.key).collect()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn delivers_in_due_order() {
        let mut s = Scheduler::new();
        s.after(MS * 30, "late");
        s.after(MS * 10, "early");
        s.after(MS * 10, "early-second");

        assert!(s.advance(MS * 5).is_empty());
        assert_eq!(s.until_next(), Some(MS * 5));
        assert_eq!(s.advance(MS * 100), vec!["early", "early-second", "late"]);
        assert!(s.is_empty());
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut s = Scheduler::new();
        s.after(Duration::ZERO, 1);
        assert_eq!(s.until_next(), Some(Duration::ZERO));
        assert_eq!(s.advance(Duration::ZERO), vec![1]);
    }

    #[test]
    fn cancel_all_drops_everything() {
        let mut s = Scheduler::new();
        s.after(MS, 'a');
        s.cancel_all();
        assert!(s.advance(MS * 10).is_empty());
        assert_eq!(s.now(), MS * 10);
    }
}
