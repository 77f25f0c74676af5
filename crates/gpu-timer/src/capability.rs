//! Hardware capability probe.

/// Reports whether elapsed-time queries can be read back without blocking.
///
/// Consulted once per [`TimerService`](crate::TimerService); the answer is cached.
pub trait CapabilityGate {
    fn supported(&self) -> bool;
}

/// Gate with a fixed answer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FixedCapability(pub bool);

impl CapabilityGate for FixedCapability {
    fn supported(&self) -> bool {
        self.0
    }
}

impl<F> CapabilityGate for F
where
    F: Fn() -> bool,
{
    fn supported(&self) -> bool {
        self()
    }
}

/// Capability mode resolved from the gate and configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Capability {
    /// Hardware queries are used.
    Hardware,
    /// No hardware support; callbacks fire after a fixed delay.
    Unsupported,
    /// Profiling was switched off by configuration.
    Disabled,
}

impl Capability {
    pub fn resolve(gate: &dyn CapabilityGate, disabled: bool) -> Self {
        if disabled {
            Capability::Disabled
        } else if gate.supported() {
            Capability::Hardware
        } else {
            Capability::Unsupported
        }
    }

    #[inline]
    pub fn is_hardware(self) -> bool {
        self == Capability::Hardware
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fixed_and_closure_gates() {
        assert!(FixedCapability(true).supported());
        assert!(!FixedCapability(false).supported());
        assert!((|| true).supported());
    }

    #[test]
    fn disabled_does_not_consult_gate() {
        let probed = Cell::new(false);
        let gate = || {
            probed.set(true);
            true
        };
        assert_eq!(Capability::resolve(&gate, true), Capability::Disabled);
        assert!(!probed.get());
    }

    #[test]
    fn resolve_follows_gate() {
        assert_eq!(Capability::resolve(&FixedCapability(true), false), Capability::Hardware);
        assert_eq!(Capability::resolve(&FixedCapability(false), false), Capability::Unsupported);
    }
}
