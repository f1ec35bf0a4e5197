/// Monotonic request-generation counter for one fetch family.
///
/// Every request takes a token from [`issue`](Self::issue); when its response
/// arrives it is applied only if the token is still [`is_current`](Self::is_current).
/// Responses that resolve out of order are thereby dropped instead of
/// overwriting newer state.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Make every outstanding token stale without starting a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_is_current() {
        let mut counter = GenerationCounter::new();
        let first = counter.issue();
        let second = counter.issue();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[test]
    fn test_invalidate_makes_outstanding_token_stale() {
        let mut counter = GenerationCounter::new();
        let token = counter.issue();
        counter.invalidate();
        assert!(!counter.is_current(token));
        assert!(counter.latest() > token);
    }
}
