//! The circuit data model handed to the engine.
//!
//! A circuit is a list of [`CircuitComponent`]s, each owning a set of [`Pin`]s,
//! and a list of directed [`Wire`]s from an output pin to an input pin.
//! Everything is referred to by caller-chosen string ids.
//!
//! The engine's internal views of a circuit live in the submodules:
//! - [`graph`]: the arena built from a snapshot and its resolved connectivity
//! - [`state`]: the per-pin signal table used while solving

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::func::{Component, ComponentFn, PortType};

pub mod graph;
pub mod state;

macro_rules! string_ids {
    ($($(#[$m:meta])* $Id:ident),*$(,)?) => {
        $(
            $(#[$m])*
            #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $Id(pub String);
            impl $Id {
                /// The id as a string slice.
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
            impl std::fmt::Display for $Id {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }
            impl Borrow<str> for $Id {
                fn borrow(&self) -> &str {
                    &self.0
                }
            }
            impl From<&str> for $Id {
                fn from(value: &str) -> Self {
                    Self(value.to_owned())
                }
            }
            impl From<String> for $Id {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }
        )*
    }
}

string_ids! {
    /// Identifier of a component, unique within a circuit.
    ComponentId,
    /// Identifier of a pin, unique within its component.
    PinId,
    /// Identifier of a wire, unique within a circuit.
    WireId,
}

/// A connection point on a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// The pin's id.
    pub id: PinId,
    /// The pin's name, matched against the port names of the component's kind.
    pub name: String,
    /// Whether the pin receives or produces a signal.
    #[serde(rename = "type")]
    pub ty: PortType,
}
impl Pin {
    /// Creates a pin.
    pub fn new(id: impl Into<PinId>, name: impl Into<String>, ty: PortType) -> Self {
        Self { id: id.into(), name: name.into(), ty }
    }
}

/// A component placed in the circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitComponent {
    /// The component's id.
    pub id: ComponentId,
    /// The component's kind, along with its runtime properties.
    pub func: ComponentFn,
    /// The component's pins.
    pub pins: Vec<Pin>,
}
impl CircuitComponent {
    /// Creates a component whose pins are exactly the ports of its kind,
    /// with each pin's id and name set to the port name.
    ///
    /// ```
    /// use circuitforge_engine::circuit::CircuitComponent;
    /// use circuitforge_engine::func::And;
    ///
    /// let gate = CircuitComponent::new("and1", And::new(2));
    /// let names: Vec<_> = gate.pins.iter().map(|p| p.name.as_str()).collect();
    /// assert_eq!(names, ["A", "B", "Y"]);
    /// ```
    pub fn new(id: impl Into<ComponentId>, func: impl Into<ComponentFn>) -> Self {
        let func = func.into();
        let pins = func.ports().into_iter()
            .map(|p| Pin::new(p.name, p.name, p.ty))
            .collect();

        Self { id: id.into(), func, pins }
    }

    /// Creates a component with an explicit pin list.
    pub fn with_pins(id: impl Into<ComponentId>, func: impl Into<ComponentFn>, pins: Vec<Pin>) -> Self {
        Self { id: id.into(), func: func.into(), pins }
    }
}

/// A directed connection from one component's output pin to another's input pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    /// The wire's id.
    pub id: WireId,
    /// Component owning the source pin.
    #[serde(alias = "from_component_id")]
    pub from_component_id: ComponentId,
    /// Source pin (expected to be an output).
    #[serde(alias = "from_pin_id")]
    pub from_pin_id: PinId,
    /// Component owning the destination pin.
    #[serde(alias = "to_component_id")]
    pub to_component_id: ComponentId,
    /// Destination pin (expected to be an input).
    #[serde(alias = "to_pin_id")]
    pub to_pin_id: PinId,
}
impl Wire {
    /// Creates a wire from `(component, pin)` to `(component, pin)`.
    pub fn new(id: impl Into<WireId>, from: (&str, &str), to: (&str, &str)) -> Self {
        Self {
            id: id.into(),
            from_component_id: from.0.into(),
            from_pin_id: from.1.into(),
            to_component_id: to.0.into(),
            to_pin_id: to.1.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_accepts_both_spellings() {
        let camel: Wire = serde_json::from_str(r#"{
            "id": "w1", "fromComponentId": "a", "fromPinId": "Y",
            "toComponentId": "b", "toPinId": "A", "points": []
        }"#).unwrap();
        let snake: Wire = serde_json::from_str(r#"{
            "id": "w1", "from_component_id": "a", "from_pin_id": "Y",
            "to_component_id": "b", "to_pin_id": "A"
        }"#).unwrap();

        assert_eq!(camel, snake);
        assert_eq!(camel, Wire::new("w1", ("a", "Y"), ("b", "A")));
    }

    #[test]
    fn test_pin_direction_field() {
        let pin: Pin = serde_json::from_str(r#"{"id": "p1", "name": "A", "type": "input"}"#).unwrap();
        assert_eq!(pin, Pin::new("p1", "A", PortType::Input));
    }
}
