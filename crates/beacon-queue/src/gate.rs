//! The "no send" switch.

use std::sync::atomic::{AtomicBool, Ordering};

/// A single flag consulted before every transport attempt.
///
/// While set, the dispatcher accepts and drains records without touching the
/// network.
#[derive(Debug, Default)]
pub struct SuppressionGate {
    suppressed: AtomicBool,
}

impl SuppressionGate {
    pub fn new(suppressed: bool) -> Self {
        Self {
            suppressed: AtomicBool::new(suppressed),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::SeqCst)
    }

    pub fn set(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let gate = SuppressionGate::default();
        assert!(!gate.is_suppressed());

        gate.set(true);
        assert!(gate.is_suppressed());

        gate.set(false);
        assert!(!gate.is_suppressed());
    }
}
