//! The engine's arena view of a circuit snapshot.
//!
//! This module notably includes:
//! - [`CircuitGraph`]: The components and pins of a snapshot, with resolved connectivity
//! - [`ComponentNode`]: A component, with its pins attached to its kind's ports
//! - [`PinNode`]: A pin
//!
//! Building the graph is where wires are checked: every input pin ends up with
//! at most one [`Driver`], and wires that cannot be honored are reported and skipped.

use std::collections::HashMap;
use std::ops::Index;

use slotmap::{SecondaryMap, SlotMap, new_key_type};
use tracing::{trace, warn};

use crate::circuit::{CircuitComponent, ComponentId, PinId, Wire, WireId};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::func::{Component, ComponentFn, PortProperties, PortType};

new_key_type! {
    /// Key type for maps to components.
    pub struct ComponentKey;
    /// Key type for maps to pins.
    pub struct PinKey;
}

/// A pin of a component.
#[derive(Debug)]
pub struct PinNode {
    /// The pin's id.
    pub(crate) id: PinId,
    /// The pin's direction.
    pub(crate) ty: PortType,
    /// The component owning the pin.
    pub(crate) owner: ComponentKey,
}

/// A component of the circuit.
#[derive(Debug)]
pub struct ComponentNode {
    /// The component's id.
    pub(crate) id: ComponentId,
    /// The component's evaluation rule.
    pub(crate) func: ComponentFn,
    /// The properties of the rule's ports.
    pub(crate) port_props: Vec<PortProperties>,
    /// The pin attached to each port (if one was found).
    pub(crate) links: Vec<Option<PinKey>>,
    /// All pins of the component, in snapshot order.
    pub(crate) pins: Vec<PinKey>,
}
impl ComponentNode {
    /// Creates a component node without any pins attached.
    fn new(id: ComponentId, func: ComponentFn) -> Self {
        let port_props = func.ports();
        let links = vec![None; port_props.len()];

        Self { id, func, port_props, links, pins: vec![] }
    }

    /// Attaches a pin to the port it names, if there is one.
    fn attach_pin(&mut self, key: PinKey, id: &PinId, name: &str, ty: PortType) {
        let found = self.port_props.iter().position(|p| p.name == name)
            .or_else(|| self.port_props.iter().position(|p| p.name == id.as_str()));

        match found {
            Some(i) if self.port_props[i].ty == ty && self.links[i].is_none() => self.links[i] = Some(key),
            Some(_) => warn!(component = %self.id, pin = %id, "pin does not fit the port it names"),
            None => trace!(component = %self.id, pin = %id, "pin has no matching port"),
        }
    }

    /// The output pins attached to a port, along with their port index.
    pub(crate) fn outputs(&self) -> impl Iterator<Item = (usize, PinKey)> + '_ {
        self.links.iter()
            .zip(&self.port_props)
            .enumerate()
            .filter(|(_, (_, p))| p.ty == PortType::Output)
            .filter_map(|(i, (&link, _))| Some((i, link?)))
    }

    /// The input pins attached to a port.
    pub(crate) fn inputs(&self) -> impl Iterator<Item = Option<PinKey>> + '_ {
        self.links.iter()
            .zip(&self.port_props)
            .filter(|(_, p)| p.ty == PortType::Input)
            .map(|(&link, _)| link)
    }
}

/// What an input pin receives its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Exactly one wire, from this output pin.
    Wire(PinKey),
    /// More than one wire.
    Conflict,
}

/// A wire of the snapshot, with its source pin if the wire is usable.
#[derive(Debug)]
pub(crate) struct WireLink {
    pub(crate) id: WireId,
    pub(crate) source: Option<PinKey>,
}

type PinLookup<'c> = HashMap<&'c str, HashMap<&'c str, PinKey>>;

fn find_pin(lookup: &PinLookup<'_>, component: &ComponentId, pin: &PinId) -> Option<PinKey> {
    lookup.get(component.as_str())?.get(pin.as_str()).copied()
}

/// A circuit structure, built from a snapshot.
#[derive(Default, Debug)]
pub struct CircuitGraph {
    /// All components, in snapshot order.
    pub(crate) components: SlotMap<ComponentKey, ComponentNode>,
    /// All pins.
    pub(crate) pins: SlotMap<PinKey, PinNode>,
    /// The driver of every driven input pin.
    pub(crate) drivers: SecondaryMap<PinKey, Driver>,
    /// All wires, in snapshot order.
    pub(crate) wires: Vec<WireLink>,
}
impl CircuitGraph {
    /// Builds the graph of a snapshot, reporting connectivity problems.
    pub fn build(components: &[CircuitComponent], wires: &[Wire], diagnostics: &mut Diagnostics) -> Self {
        let mut graph = Self::default();
        let mut lookup = PinLookup::new();

        for component in components {
            if lookup.contains_key(component.id.as_str()) {
                warn!(component = %component.id, "duplicate component id, ignoring");
                continue;
            }
            if let ComponentFn::Unknown(u) = &component.func {
                warn!(component = %component.id, type_name = u.type_name(), "unknown component type");
                diagnostics.push(Diagnostic::new(DiagnosticKind::UnknownComponentType, component.id.clone()));
            }
            graph.add_component(component, &mut lookup);
        }
        for wire in wires {
            graph.add_wire(wire, &lookup, diagnostics);
        }

        graph
    }

    /// Adds a component node and its pins.
    fn add_component<'c>(&mut self, component: &'c CircuitComponent, lookup: &mut PinLookup<'c>) -> ComponentKey {
        let key = self.components.insert(ComponentNode::new(component.id.clone(), component.func.clone()));
        let pin_lookup = lookup.entry(component.id.as_str()).or_default();

        for pin in &component.pins {
            if pin_lookup.contains_key(pin.id.as_str()) {
                warn!(component = %component.id, pin = %pin.id, "duplicate pin id, ignoring");
                continue;
            }
            let pin_key = self.pins.insert(PinNode { id: pin.id.clone(), ty: pin.ty, owner: key });
            pin_lookup.insert(pin.id.as_str(), pin_key);

            let node = &mut self.components[key];
            node.pins.push(pin_key);
            node.attach_pin(pin_key, &pin.id, &pin.name, pin.ty);
        }

        key
    }

    /// Resolves a wire, updating the driver of its destination pin.
    fn add_wire(&mut self, wire: &Wire, lookup: &PinLookup<'_>, diagnostics: &mut Diagnostics) {
        let source = find_pin(lookup, &wire.from_component_id, &wire.from_pin_id);
        let sink = find_pin(lookup, &wire.to_component_id, &wire.to_pin_id);

        let (source, sink) = match (source, sink) {
            (Some(source), Some(sink)) => (source, sink),
            (None, _) => {
                warn!(wire = %wire.id, "wire source does not exist");
                self.skip_wire(wire, DiagnosticKind::StaleWire, &wire.from_component_id, &wire.from_pin_id, diagnostics);
                return;
            },
            (_, None) => {
                warn!(wire = %wire.id, "wire destination does not exist");
                self.skip_wire(wire, DiagnosticKind::StaleWire, &wire.to_component_id, &wire.to_pin_id, diagnostics);
                return;
            },
        };

        if self.pins[source].ty != PortType::Output {
            self.skip_wire(wire, DiagnosticKind::MisdirectedWire, &wire.from_component_id, &wire.from_pin_id, diagnostics);
            return;
        }
        if self.pins[sink].ty != PortType::Input {
            self.skip_wire(wire, DiagnosticKind::MisdirectedWire, &wire.to_component_id, &wire.to_pin_id, diagnostics);
            return;
        }

        self.wires.push(WireLink { id: wire.id.clone(), source: Some(source) });
        match self.driver(sink) {
            None => {
                self.drivers.insert(sink, Driver::Wire(source));
            },
            Some(Driver::Wire(_)) => {
                self.drivers.insert(sink, Driver::Conflict);
                diagnostics.push({
                    Diagnostic::new(DiagnosticKind::ConflictingDriver, wire.to_component_id.clone())
                        .with_pin(wire.to_pin_id.clone())
                });
            },
            // already reported
            Some(Driver::Conflict) => {},
        }
    }

    /// Records a wire which takes no part in propagation.
    fn skip_wire(&mut self, wire: &Wire, kind: DiagnosticKind, component: &ComponentId, pin: &PinId, diagnostics: &mut Diagnostics) {
        self.wires.push(WireLink { id: wire.id.clone(), source: None });
        diagnostics.push({
            Diagnostic::new(kind, component.clone())
                .with_pin(pin.clone())
                .with_wire(wire.id.clone())
        });
    }

    /// The driver of an input pin, if it has one.
    pub fn driver(&self, pin: PinKey) -> Option<Driver> {
        self.drivers.get(pin).copied()
    }
}

impl Index<ComponentKey> for CircuitGraph {
    type Output = ComponentNode;

    fn index(&self, index: ComponentKey) -> &Self::Output {
        &self.components[index]
    }
}
impl Index<PinKey> for CircuitGraph {
    type Output = PinNode;

    fn index(&self, index: PinKey) -> &Self::Output {
        &self.pins[index]
    }
}
