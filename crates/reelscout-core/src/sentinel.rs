/// The infinite-scroll trigger: one long-lived sentinel that the feed attaches
/// while paginating and detaches otherwise. A visibility signal only counts
/// while attached and within `threshold` of the viewport.
#[derive(Debug, Clone)]
pub struct ScrollSentinel {
    threshold: u32,
    attached: bool,
}

impl ScrollSentinel {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            attached: false,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// `distance` is how far the sentinel is from entering the viewport.
    pub fn should_fire(&self, distance: u32) -> bool {
        self.attached && distance <= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_sentinel_never_fires() {
        let sentinel = ScrollSentinel::new(200);
        assert!(!sentinel.should_fire(0));
    }

    #[test]
    fn test_attached_sentinel_respects_threshold() {
        let mut sentinel = ScrollSentinel::new(200);
        sentinel.attach();
        assert!(sentinel.should_fire(200));
        assert!(!sentinel.should_fire(201));
        sentinel.detach();
        assert!(!sentinel.should_fire(0));
    }
}
