//! The result of an evaluation, as handed to the rendering layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::circuit::graph::CircuitGraph;
use crate::circuit::state::CircuitState;
use crate::circuit::{ComponentId, PinId, WireId};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
use crate::signal::Signal;

/// Every pin and wire value of a circuit, with the diagnostics raised computing them.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalResult {
    /// The value of every pin, by component id then pin id.
    pub pin_states: HashMap<ComponentId, HashMap<PinId, Signal>>,
    /// The value of every wire (the value of its source pin).
    pub wire_states: HashMap<WireId, Signal>,
    /// Diagnostics, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether no error-severity diagnostic was raised.
    pub success: bool,
}
impl EvalResult {
    /// Collects the final values of a solve.
    pub(crate) fn project(graph: &CircuitGraph, state: &CircuitState, diagnostics: Diagnostics) -> Self {
        let pin_states = graph.components.iter()
            .map(|(_, node)| {
                let pins = node.pins.iter()
                    .map(|&pin| (graph[pin].id.clone(), state.pin_value(graph, pin)))
                    .collect();
                (node.id.clone(), pins)
            })
            .collect();

        let wire_states = graph.wires.iter()
            .map(|w| (w.id.clone(), w.source.map_or(Signal::Undefined, |pin| state.value(pin))))
            .collect();

        let success = !diagnostics.has_errors();
        Self { pin_states, wire_states, diagnostics: diagnostics.into_vec(), success }
    }

    /// The value of a pin, if the component and pin exist.
    pub fn pin(&self, component: &str, pin: &str) -> Option<Signal> {
        self.pin_states.get(component)?.get(pin).copied()
    }

    /// The value of a wire, if it exists.
    pub fn wire(&self, wire: &str) -> Option<Signal> {
        self.wire_states.get(wire).copied()
    }

    /// The error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}
