//! The network solver.
//!
//! Output pins are ordered by their combinational dependencies: an output
//! depends on the sources of its component's inputs, unless the component is
//! registered (its outputs come from memory or properties). The strongly
//! connected components of that dependency graph are then evaluated in
//! topological order:
//! - a lone output is computed once, from values that are already final
//! - a feedback loop is relaxed pass by pass until no pin changes, bounded by
//!   the configured iteration limit
//!
//! A loop is seeded from the values it settled on in the previous evaluation.
//! If it settles with UNDEFINED pins even though everything entering it is
//! definite, the UNDEFINED pins are given a power-up level of LOW and the loop
//! is relaxed again, so a bistable loop picks a reproducible state. A loop
//! which never settles has all of its pins forced to ERROR.

use std::collections::HashSet;

use petgraph::algo::kosaraju_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, trace, warn};

use crate::circuit::graph::{CircuitGraph, ComponentKey, Driver, PinKey};
use crate::circuit::state::CircuitState;
use crate::func::{Component, PortType, PortUpdate, RunContext};
use crate::signal::Signal;
use crate::store::SequentialMemory;

/// The outcome of a single solve.
#[derive(Debug)]
pub(crate) struct Solution {
    /// The value of every output pin.
    pub(crate) state: CircuitState,
    /// One component per feedback loop which failed to settle.
    pub(crate) oscillating: Vec<ComponentKey>,
}

/// Builds the dependency graph between output pins.
fn dependency_graph(graph: &CircuitGraph) -> DiGraphMap<PinKey, ()> {
    let mut deps = DiGraphMap::new();
    for (_, node) in &graph.components {
        for (_, out) in node.outputs() {
            deps.add_node(out);
        }
    }
    for (_, node) in &graph.components {
        if node.func.is_registered() { continue; }

        for input in node.inputs().flatten() {
            let Some(Driver::Wire(source)) = graph.driver(input) else { continue };
            for (_, out) in node.outputs() {
                deps.add_edge(source, out, ());
            }
        }
    }
    deps
}

/// Solver for the signal values of a circuit graph.
pub(crate) struct Solver<'g> {
    graph: &'g CircuitGraph,
    max_iterations: usize,
    deps: DiGraphMap<PinKey, ()>,
    /// Strongly connected components of `deps`, in evaluation order.
    order: Vec<Vec<PinKey>>,
}
impl<'g> Solver<'g> {
    /// Creates a solver for a graph, computing its evaluation order.
    pub(crate) fn new(graph: &'g CircuitGraph, max_iterations: usize) -> Self {
        let deps = dependency_graph(graph);
        // kosaraju_scc lists SCCs in reverse topological order
        let mut order = kosaraju_scc(&deps);
        order.reverse();

        let loops = order.iter().filter(|scc| scc.len() > 1).count();
        debug!(pins = deps.node_count(), sccs = order.len(), loops, "evaluation order computed");

        Self { graph, max_iterations, deps, order }
    }

    fn is_loop(&self, scc: &[PinKey]) -> bool {
        scc.len() > 1 || self.deps.contains_edge(scc[0], scc[0])
    }

    /// Components with an output inside a feedback loop.
    pub(crate) fn loop_components(&self) -> HashSet<ComponentKey> {
        self.order.iter()
            .filter(|scc| self.is_loop(scc))
            .flatten()
            .map(|&pin| self.graph[pin].owner)
            .collect()
    }

    /// Computes the value of every output pin.
    pub(crate) fn solve(&self, memory: &mut SequentialMemory) -> Solution {
        let mut state = CircuitState::new();
        let mut oscillating = vec![];

        for scc in &self.order {
            if self.is_loop(scc) {
                if let Err(key) = self.relax(&mut state, memory, scc) {
                    oscillating.push(key);
                }
            } else {
                let pin = scc[0];
                self.apply(&mut state, memory, self.graph[pin].owner, scc);
            }
        }

        Solution { state, oscillating }
    }

    /// Runs a component, writing those of its outputs which are in `scope`.
    ///
    /// Returns whether any written output changed.
    fn apply(&self, state: &mut CircuitState, memory: &mut SequentialMemory, key: ComponentKey, scope: &[PinKey]) -> bool {
        let node = &self.graph[key];
        let ports = state.port_values(self.graph, key);
        let register = node.func.initialize_register()
            .map(|init| memory.register_mut(&node.id, init));

        let mut changed = false;
        for PortUpdate { index, value } in node.func.run(RunContext { ports: &ports, register }) {
            debug_assert!(node.port_props[index].ty == PortType::Output, "Input port cannot be updated");
            let Some(pin) = node.links[index] else { continue };
            if scope.contains(&pin) {
                changed |= state.set(pin, value);
            }
        }
        changed
    }

    /// Relaxes a feedback loop until it settles.
    ///
    /// On failure, returns the first component (in snapshot order) of the loop.
    fn relax(&self, state: &mut CircuitState, memory: &mut SequentialMemory, scc: &[PinKey]) -> Result<(), ComponentKey> {
        let mut members: Vec<_> = scc.iter().map(|&pin| self.graph[pin].owner).collect();
        members.sort();
        members.dedup();

        for &pin in scc {
            let owner = &self.graph[self.graph[pin].owner];
            let seed = memory.feedback(&owner.id, &self.graph[pin].id).unwrap_or_default();
            state.set(pin, seed);
        }

        let mut settled = self.settle(state, memory, &members, scc);
        if settled
            && scc.iter().any(|&pin| state.value(pin) == Signal::Undefined)
            && self.inputs_determined(state, &members, scc)
        {
            debug!(component = %self.graph[members[0]].id, "feedback loop undetermined, applying power-up levels");
            for &pin in scc {
                if state.value(pin) == Signal::Undefined {
                    state.set(pin, Signal::Low);
                }
            }
            settled = self.settle(state, memory, &members, scc);
        }

        if !settled {
            let culprit = members[0];
            warn!(component = %self.graph[culprit].id, pins = scc.len(), "feedback loop did not settle");
            for &pin in scc {
                state.set(pin, Signal::Error);
            }
            for &key in &members {
                memory.forget_feedback(&self.graph[key].id);
            }
            return Err(culprit);
        }

        for &key in &members {
            let node = &self.graph[key];
            if node.func.initialize_register().is_some() { continue; }

            let outputs = node.outputs()
                .filter(|(_, pin)| scc.contains(pin))
                .map(|(_, pin)| (self.graph[pin].id.clone(), state.value(pin)));
            memory.record_feedback(&node.id, outputs);
        }
        Ok(())
    }

    /// Runs passes over a loop's components until a pass changes nothing.
    ///
    /// Returns false if the iteration limit is hit first.
    fn settle(&self, state: &mut CircuitState, memory: &mut SequentialMemory, members: &[ComponentKey], scc: &[PinKey]) -> bool {
        for iteration in 0..self.max_iterations {
            let mut changed = false;
            for &key in members {
                changed |= self.apply(state, memory, key, scc);
            }
            trace!(iteration, changed, "relaxation pass");
            if !changed {
                return true;
            }
        }
        false
    }

    /// Whether every input entering the loop from outside is definite.
    fn inputs_determined(&self, state: &CircuitState, members: &[ComponentKey], scc: &[PinKey]) -> bool {
        members.iter().all(|&key| {
            let node = &self.graph[key];
            node.func.is_registered() || node.inputs().all(|input| {
                match input.and_then(|pin| self.graph.driver(pin)) {
                    Some(Driver::Wire(source)) => scc.contains(&source) || state.value(source).is_definite(),
                    _ => false,
                }
            })
        })
    }

    /// Applies the clock levels seen in `state` to every edge-triggered register.
    ///
    /// Returns the last component whose stored value changed, if any did.
    pub(crate) fn clock_edges(&self, state: &CircuitState, memory: &mut SequentialMemory) -> Option<ComponentKey> {
        let mut changed = None;
        for (key, node) in &self.graph.components {
            let Some(init) = node.func.initialize_register() else { continue };

            let ports = state.port_values(self.graph, key);
            if node.func.clock(&ports, memory.register_mut(&node.id, init)) {
                trace!(component = %node.id, "register latched");
                changed = Some(key);
            }
        }
        changed
    }

    /// Forces every output of a component to ERROR.
    pub(crate) fn poison(&self, state: &mut CircuitState, key: ComponentKey) {
        for (_, pin) in self.graph[key].outputs() {
            state.set(pin, Signal::Error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{CircuitComponent, Wire};
    use crate::diagnostics::Diagnostics;
    use crate::func::{Nand, Not, Switch};
    use crate::store::Register;

    fn build(components: &[CircuitComponent], wires: &[Wire]) -> CircuitGraph {
        CircuitGraph::build(components, wires, &mut Diagnostics::new())
    }

    fn output(graph: &CircuitGraph, state: &CircuitState, component: &str) -> Signal {
        let (_, node) = graph.components.iter()
            .find(|(_, n)| n.id.as_str() == component)
            .unwrap();
        let (_, pin) = node.outputs().last().unwrap();
        state.value(pin)
    }

    #[test]
    fn test_order_independent_of_listing() {
        // s -> n1 -> n2 -> n3, listed backwards
        let components = [
            CircuitComponent::new("n3", Not),
            CircuitComponent::new("n2", Not),
            CircuitComponent::new("n1", Not),
            CircuitComponent::new("s", Switch::new(true)),
        ];
        let wires = [
            Wire::new("w1", ("s", "OUT"), ("n1", "A")),
            Wire::new("w2", ("n1", "Y"), ("n2", "A")),
            Wire::new("w3", ("n2", "Y"), ("n3", "A")),
        ];
        let graph = build(&components, &wires);
        let solver = Solver::new(&graph, 100);
        let solution = solver.solve(&mut SequentialMemory::new());

        assert!(solution.oscillating.is_empty());
        assert!(solver.loop_components().is_empty());
        assert_eq!(output(&graph, &solution.state, "n1"), Signal::Low);
        assert_eq!(output(&graph, &solution.state, "n2"), Signal::High);
        assert_eq!(output(&graph, &solution.state, "n3"), Signal::Low);
    }

    #[test]
    fn test_self_loop_oscillates() {
        let components = [CircuitComponent::new("inv", Not)];
        let wires = [Wire::new("w1", ("inv", "Y"), ("inv", "A"))];
        let graph = build(&components, &wires);
        let solver = Solver::new(&graph, 100);
        let mut memory = SequentialMemory::new();
        let solution = solver.solve(&mut memory);

        assert_eq!(solution.oscillating.len(), 1);
        assert_eq!(output(&graph, &solution.state, "inv"), Signal::Error);
        assert!(memory.is_empty(), "An unsettled loop should not be remembered");
    }

    #[test]
    fn test_bistable_loop_remembered() {
        // two inverters in a ring settle on a power-up state
        let components = [
            CircuitComponent::new("a", Not),
            CircuitComponent::new("b", Not),
        ];
        let wires = [
            Wire::new("w1", ("a", "Y"), ("b", "A")),
            Wire::new("w2", ("b", "Y"), ("a", "A")),
        ];
        let graph = build(&components, &wires);
        let solver = Solver::new(&graph, 100);
        let mut memory = SequentialMemory::new();
        let solution = solver.solve(&mut memory);

        assert!(solution.oscillating.is_empty());
        let (a, b) = (output(&graph, &solution.state, "a"), output(&graph, &solution.state, "b"));
        assert!(a.is_definite() && b == !a, "Ring should settle on complementary levels, got {a} and {b}");
        assert_eq!(solver.loop_components().len(), 2);
        assert!(matches!(memory.get("a"), Some(Register::Feedback { .. })));

        // the remembered state is reproduced
        let again = solver.solve(&mut memory);
        assert_eq!(output(&graph, &again.state, "a"), a);
        assert_eq!(output(&graph, &again.state, "b"), b);
    }

    #[test]
    fn test_loop_with_undefined_input_stays_undefined() {
        // NAND latch with an unconnected input
        let components = [
            CircuitComponent::new("s", Switch::new(true)),
            CircuitComponent::new("g1", Nand::new(2)),
            CircuitComponent::new("g2", Nand::new(2)),
        ];
        let wires = [
            Wire::new("w1", ("s", "OUT"), ("g1", "A")),
            Wire::new("w2", ("g1", "Y"), ("g2", "B")),
            Wire::new("w3", ("g2", "Y"), ("g1", "B")),
        ];
        let graph = build(&components, &wires);
        let solution = Solver::new(&graph, 100).solve(&mut SequentialMemory::new());

        assert!(solution.oscillating.is_empty());
        assert_eq!(output(&graph, &solution.state, "g1"), Signal::Undefined);
        assert_eq!(output(&graph, &solution.state, "g2"), Signal::Undefined);
    }
}
