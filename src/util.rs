/// Trailing-edge coalescer over explicit deadline state. Every `poke` re-arms
/// the deadline, so a burst of pokes fires once, `delay` seconds after the
/// last one. The owner polls `fire_due` from its frame loop.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    delay: f64,
    deadline: Option<f64>,
}

impl Debounce {
    pub const fn new(delay_seconds: f64) -> Self {
        Self {
            delay: delay_seconds,
            deadline: None,
        }
    }

    pub fn poke(&mut self, now: f64) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True at most once per arming, on the first poll at or past the
    /// deadline.
    pub fn fire_due(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_delay() {
        let mut debounce = Debounce::new(0.2);
        debounce.poke(1.0);
        assert!(!debounce.fire_due(1.1));
        assert!(debounce.fire_due(1.2));
        assert!(!debounce.fire_due(1.3));
        assert!(!debounce.is_armed());
    }

    #[test]
    fn pokes_push_the_deadline_back() {
        let mut debounce = Debounce::new(0.2);
        debounce.poke(1.0);
        debounce.poke(1.15);
        assert!(!debounce.fire_due(1.2));
        assert!(debounce.fire_due(1.35));
    }

    #[test]
    fn cancel_disarms() {
        let mut debounce = Debounce::new(0.2);
        debounce.poke(0.0);
        debounce.cancel();
        assert!(!debounce.fire_due(10.0));
    }
}
