//! The evaluation entry point.
//!
//! An evaluation is a pure function of the circuit snapshot and the sequential
//! memory handed in: it resolves connectivity, solves the network, applies any
//! clock edges the solved network shows (re-solving after each), checks for
//! faults, and returns the projected result together with the updated memory.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::circuit::graph::CircuitGraph;
use crate::circuit::{CircuitComponent, ComponentId, Wire};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::func::{Component, PortType};
use crate::result::EvalResult;
use crate::solver::Solver;
use crate::store::SequentialMemory;

/// Default bound on relaxation passes per feedback loop (and clock-edge rounds per evaluation).
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Tunables of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of relaxation passes over a feedback loop before it is
    /// reported as oscillating. Also bounds the clock-edge rounds of one evaluation.
    pub max_iterations: usize,
    /// Whether unconnected input pins are reported (as informational diagnostics).
    pub report_floating_inputs: bool,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            report_floating_inputs: false,
        }
    }
}
impl EngineConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```
    /// use circuitforge_engine::EngineConfig;
    ///
    /// let config = EngineConfig::from_json(r#"{ "maxIterations": 20 }"#).unwrap();
    /// assert_eq!(config.max_iterations, 20);
    /// assert!(!config.report_floating_inputs);
    /// ```
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the iteration bound.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets whether unconnected input pins are reported.
    pub fn with_floating_inputs(mut self, report: bool) -> Self {
        self.report_floating_inputs = report;
        self
    }
}

/// The circuit evaluation engine.
#[derive(Debug, Default, Clone)]
pub struct Engine {
    config: EngineConfig,
}
impl Engine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates a circuit.
    ///
    /// Returns the value of every pin and wire along with any diagnostics, and
    /// the sequential memory to pass into the next evaluation.
    #[instrument(skip_all, fields(components = components.len(), wires = wires.len()))]
    pub fn evaluate(&self, components: &[CircuitComponent], wires: &[Wire], mut memory: SequentialMemory) -> (EvalResult, SequentialMemory) {
        let max_iterations = self.config.max_iterations.max(1);
        let mut diagnostics = Diagnostics::new();
        let graph = CircuitGraph::build(components, wires, &mut diagnostics);
        let solver = Solver::new(&graph, max_iterations);

        let stateful: HashSet<&ComponentId> = graph.components.values()
            .filter(|n| n.func.initialize_register().is_some())
            .map(|n| &n.id)
            .collect();
        let in_loop: HashSet<&ComponentId> = solver.loop_components().into_iter().map(|k| &graph[k].id).collect();
        memory.purge(&stateful, &in_loop);

        let mut solution = solver.solve(&mut memory);
        let mut rounds = 0;
        while let Some(key) = solver.clock_edges(&solution.state, &mut memory) {
            rounds += 1;
            solution = solver.solve(&mut memory);
            if rounds >= max_iterations {
                warn!(component = %graph[key].id, rounds, "clocked registers did not settle");
                solver.poison(&mut solution.state, key);
                solution.oscillating.push(key);
                break;
            }
        }
        debug!(rounds, "network solved");

        if self.config.report_floating_inputs {
            for (pin, node) in &graph.pins {
                if node.ty == PortType::Input && graph.driver(pin).is_none() {
                    diagnostics.push({
                        Diagnostic::new(DiagnosticKind::FloatingInput, graph[node.owner].id.clone())
                            .with_pin(node.id.clone())
                    });
                }
            }
        }
        for (key, node) in &graph.components {
            let ports = solution.state.port_values(&graph, key);
            if let Some(kind) = node.func.fault(&ports) {
                diagnostics.push(Diagnostic::new(kind, node.id.clone()));
            }
        }
        for &key in &solution.oscillating {
            diagnostics.push(Diagnostic::new(DiagnosticKind::Oscillation, graph[key].id.clone()));
        }

        (EvalResult::project(&graph, &solution.state, diagnostics), memory)
    }
}

/// Evaluates a circuit with the default configuration.
///
/// See [`Engine::evaluate`].
pub fn evaluate(components: &[CircuitComponent], wires: &[Wire], memory: SequentialMemory) -> (EvalResult, SequentialMemory) {
    Engine::default().evaluate(components, wires, memory)
}
