//! Module which contains the signal table of a single solve.
//!
//! [`CircuitState`] only holds values of output pins. The value of an input
//! pin is always read through its driver, so it can never disagree with the
//! pin it is wired to.

use slotmap::SecondaryMap;

use crate::circuit::graph::{CircuitGraph, ComponentKey, Driver, PinKey};
use crate::func::PortType;
use crate::signal::Signal;

/// The value of every output pin during a solve.
#[derive(Default, Debug, Clone)]
pub struct CircuitState {
    pub(crate) values: SecondaryMap<PinKey, Signal>,
}
impl CircuitState {
    /// Creates a new state where every pin is UNDEFINED.
    pub fn new() -> Self {
        Default::default()
    }

    /// The value currently held by an output pin.
    pub fn value(&self, pin: PinKey) -> Signal {
        self.values.get(pin).copied().unwrap_or_default()
    }

    /// Sets an output pin's value, returning whether it changed.
    pub fn set(&mut self, pin: PinKey, value: Signal) -> bool {
        let old = self.values.insert(pin, value).unwrap_or_default();
        old != value
    }

    /// The value received by an input pin.
    ///
    /// An undriven input is UNDEFINED, and an input with conflicting drivers is an ERROR.
    pub fn input_value(&self, graph: &CircuitGraph, pin: PinKey) -> Signal {
        match graph.driver(pin) {
            Some(Driver::Wire(source)) => self.value(source),
            Some(Driver::Conflict) => Signal::Error,
            None => Signal::Undefined,
        }
    }

    /// The value seen at any pin (input or output).
    pub fn pin_value(&self, graph: &CircuitGraph, pin: PinKey) -> Signal {
        match graph[pin].ty {
            PortType::Input => self.input_value(graph, pin),
            PortType::Output => self.value(pin),
        }
    }

    /// The port values of a component, in the order of its port list.
    ///
    /// Ports without an attached pin are UNDEFINED.
    pub fn port_values(&self, graph: &CircuitGraph, key: ComponentKey) -> Vec<Signal> {
        graph[key].links.iter()
            .map(|&link| match link {
                Some(pin) => self.pin_value(graph, pin),
                None => Signal::Undefined,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{CircuitComponent, Wire};
    use crate::diagnostics::Diagnostics;
    use crate::func::{And, Switch};

    #[test]
    fn test_input_values() {
        let components = [
            CircuitComponent::new("s1", Switch::new(true)),
            CircuitComponent::new("s2", Switch::new(false)),
            CircuitComponent::new("g", And::new(3)),
        ];
        let wires = [
            Wire::new("w1", ("s1", "OUT"), ("g", "A")),
            Wire::new("w2", ("s1", "OUT"), ("g", "B")),
            Wire::new("w3", ("s2", "OUT"), ("g", "B")),
        ];
        let graph = CircuitGraph::build(&components, &wires, &mut Diagnostics::new());
        let (s1, g) = {
            let mut keys = graph.components.keys();
            (keys.next().unwrap(), keys.nth(1).unwrap())
        };

        let mut state = CircuitState::new();
        let out = graph[s1].links[0].unwrap();
        assert!(state.set(out, Signal::High));
        assert!(!state.set(out, Signal::High), "Setting the same value should not be a change");

        // A driven, B conflicting, C unconnected, Y not yet computed
        assert_eq!(
            state.port_values(&graph, g),
            [Signal::High, Signal::Error, Signal::Undefined, Signal::Undefined]
        );
    }
}
