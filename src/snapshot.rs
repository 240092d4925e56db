//! Loading circuits from the editor's JSON snapshots.
//!
//! Snapshots name component kinds with string tags and carry an open-ended
//! property bag. Both are resolved here, once, into a [`ComponentFn`]; the
//! evaluator never looks at a tag again.
//!
//! ```
//! use circuitforge_engine::snapshot::Snapshot;
//! use circuitforge_engine::{evaluate, SequentialMemory, Signal};
//!
//! let snapshot = Snapshot::from_json(r#"{
//!     "components": [
//!         { "id": "sw", "type": "SWITCH_TOGGLE", "properties": { "state": true },
//!           "pins": [{ "id": "sw-out", "name": "OUT", "type": "output" }] },
//!         { "id": "led", "type": "LED_RED",
//!           "pins": [{ "id": "led-in", "name": "IN", "type": "input" }] }
//!     ],
//!     "wires": [
//!         { "id": "w1", "fromComponentId": "sw", "fromPinId": "sw-out",
//!           "toComponentId": "led", "toPinId": "led-in" }
//!     ]
//! }"#).unwrap();
//!
//! let components = snapshot.load().unwrap();
//! let (result, _memory) = evaluate(&components, &snapshot.wires, SequentialMemory::new());
//! assert_eq!(result.pin("led", "led-in"), Some(Signal::High));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::circuit::{CircuitComponent, ComponentId, Pin, Wire};
use crate::error::{LoadError, Result};
use crate::func::ComponentFn;

/// A component as stored by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComponent {
    /// The component's id.
    pub id: ComponentId,
    /// The component's type tag (e.g. `"AND_2"`).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Runtime properties (switch position, clock phase, ...).
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// The component's pins.
    #[serde(default)]
    pub pins: Vec<Pin>,
}
impl RawComponent {
    /// Resolves the type tag and properties into a component.
    pub fn resolve(&self) -> Result<CircuitComponent> {
        let func = ComponentFn::from_type(&self.type_name, &self.properties)
            .map_err(|source| LoadError::InvalidProperties { component: self.id.clone(), source })?;

        Ok(CircuitComponent::with_pins(self.id.clone(), func, self.pins.clone()))
    }
}

/// A circuit as stored by the editor.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All components.
    #[serde(default)]
    pub components: Vec<RawComponent>,
    /// All wires.
    #[serde(default)]
    pub wires: Vec<Wire>,
}
impl Snapshot {
    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves every component of the snapshot.
    pub fn load(&self) -> Result<Vec<CircuitComponent>> {
        self.components.iter()
            .map(RawComponent::resolve)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::{Clock, Unknown};

    #[test]
    fn test_load_resolves_tags() {
        let snapshot = Snapshot::from_json(r#"{
            "components": [
                { "id": "clk", "type": "CLOCK", "properties": { "phase": 5 }, "position": { "x": 1, "y": 2 } },
                { "id": "x", "type": "WARP_CORE" }
            ]
        }"#).unwrap();
        let components = snapshot.load().unwrap();

        assert_eq!(components[0].func, Clock::new(5).into());
        assert_eq!(components[1].func, Unknown::new("WARP_CORE").into());
        assert!(snapshot.wires.is_empty());
    }

    #[test]
    fn test_invalid_property_names_component() {
        let snapshot = Snapshot::from_json(r#"{
            "components": [{ "id": "sw", "type": "SWITCH_TOGGLE", "properties": { "state": "on" } }]
        }"#).unwrap();

        match snapshot.load() {
            Err(LoadError::InvalidProperties { component, .. }) => assert_eq!(component.as_str(), "sw"),
            other => panic!("Expected an invalid property error, got {other:?}"),
        }
    }

    #[test]
    fn test_supply_rail_and_sensor() {
        let snapshot = Snapshot::from_json(r#"{
            "components": [
                { "id": "vcc", "type": "VCC_5V", "pins": [{ "id": "VCC", "name": "VCC", "type": "output" }] },
                { "id": "led", "type": "LED_RED", "pins": [{ "id": "IN", "name": "IN", "type": "input" }] },
                { "id": "ldr", "type": "SENSOR_LIGHT", "properties": { "lux": 300 } }
            ],
            "wires": [
                { "id": "w1", "fromComponentId": "vcc", "fromPinId": "VCC", "toComponentId": "led", "toPinId": "IN" }
            ]
        }"#).unwrap();
        let components = snapshot.load().unwrap();
        let (result, _) = crate::evaluate(&components, &snapshot.wires, crate::SequentialMemory::new());

        assert!(result.diagnostics.is_empty(), "Unexpected diagnostics: {:?}", result.diagnostics);
        assert_eq!(result.pin("vcc", "VCC"), Some(crate::Signal::High));
        assert_eq!(result.pin("led", "IN"), Some(crate::Signal::High));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Snapshot::from_json("{ not json"), Err(LoadError::Json(_))));
    }
}
