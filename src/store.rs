//! The sequential memory store.
//!
//! [`SequentialMemory`] holds everything an evaluation needs to remember for
//! the next one: latch and flip-flop contents, the last clock level each
//! flip-flop saw, and the last settled outputs of gate-level feedback loops.
//! It is owned by the caller and passed into every evaluation, which hands
//! back the updated store; nothing is kept in process-global state.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::circuit::{ComponentId, PinId};
use crate::signal::Signal;

/// The remembered state of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Register {
    /// A level-sensitive latch.
    Latch {
        /// Stored value.
        q: Signal
    },
    /// An edge-triggered flip-flop.
    FlipFlop {
        /// Stored value.
        q: Signal,
        /// Clock level seen by the previous evaluation.
        prev_clock: Signal
    },
    /// A stateless component inside a feedback loop.
    Feedback {
        /// Last settled (definite) value of each output pin inside the loop.
        outputs: BTreeMap<PinId, Signal>
    },
}
impl Register {
    /// The stored value of a latch.
    pub(crate) fn latch_mut(&mut self) -> Option<&mut Signal> {
        match self {
            Register::Latch { q } => Some(q),
            _ => None,
        }
    }

    /// Whether two registers have the same shape (ignoring contents).
    fn same_kind(&self, other: &Register) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// The state carried between evaluations, keyed by component id.
///
/// ```
/// use circuitforge_engine::store::SequentialMemory;
///
/// let memory = SequentialMemory::new();
/// assert!(memory.is_empty());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequentialMemory {
    registers: HashMap<ComponentId, Register>,
}
impl SequentialMemory {
    /// Creates an empty store (every component at power-up).
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of components with remembered state.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// The remembered state of a component.
    pub fn get(&self, id: &str) -> Option<&Register> {
        self.registers.get(id)
    }

    /// Forgets a component's state, returning it.
    pub fn remove(&mut self, id: &str) -> Option<Register> {
        self.registers.remove(id)
    }

    /// Gets a component's register, creating it from `init` if it is missing
    /// or if the stored register has a different shape.
    pub(crate) fn register_mut(&mut self, id: &ComponentId, init: Register) -> &mut Register {
        let register = self.registers.entry(id.clone()).or_insert_with(|| init.clone());
        if !register.same_kind(&init) {
            *register = init;
        }
        register
    }

    /// The last settled value of a pin inside a feedback loop.
    pub(crate) fn feedback(&self, id: &ComponentId, pin: &PinId) -> Option<Signal> {
        match self.registers.get(id)? {
            Register::Feedback { outputs } => outputs.get(pin).copied(),
            _ => None,
        }
    }

    /// Records the settled loop outputs of a stateless component.
    ///
    /// Only definite values are remembered.
    pub(crate) fn record_feedback(&mut self, id: &ComponentId, values: impl IntoIterator<Item = (PinId, Signal)>) {
        let outputs: BTreeMap<_, _> = values.into_iter()
            .filter(|(_, s)| s.is_definite())
            .collect();

        if outputs.is_empty() {
            self.forget_feedback(id);
        } else {
            self.registers.insert(id.clone(), Register::Feedback { outputs });
        }
    }

    /// Forgets a component's feedback entry (other registers are kept).
    pub(crate) fn forget_feedback(&mut self, id: &ComponentId) {
        if let Some(Register::Feedback { .. }) = self.registers.get(id) {
            self.registers.remove(id);
        }
    }

    /// Drops every entry which the current circuit no longer reads.
    ///
    /// Latches and flip-flops are kept for the `stateful` components,
    /// feedback entries for the components inside a loop.
    /// Deleted components are in neither set.
    pub(crate) fn purge(&mut self, stateful: &HashSet<&ComponentId>, in_loop: &HashSet<&ComponentId>) {
        let before = self.registers.len();
        self.registers.retain(|id, reg| match reg {
            Register::Feedback { .. } => in_loop.contains(id),
            Register::Latch { .. } | Register::FlipFlop { .. } => stateful.contains(id),
        });

        let dropped = before - self.registers.len();
        if dropped > 0 {
            tracing::debug!(dropped, "purged stale sequential memory");
        }
    }
}
