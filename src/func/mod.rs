//! Evaluation rules for every kind of component the engine understands.
//!
//! This module notably consists of:
//! - **[`Component`]**: The interface every component kind implements: its port list,
//!   how it maps input signals to output signals, and (for stateful kinds) how it
//!   latches on a clock edge.
//! - **[`PortType`] and [`PortProperties`]**: The direction and name of each port.
//! - **[`PortUpdate`]**: An output value produced by a component.
//! - **[`ComponentFn`]**: The closed set of component kinds, resolved once from a
//!   snapshot's string type tag by [`ComponentFn::from_type`].
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::DiagnosticKind;
use crate::signal::Signal;
use crate::store::Register;

use enum_dispatch::enum_dispatch;
pub use arithmetic::*;
pub use gates::*;
pub use memory::*;
pub use muxes::*;
pub use wiring::*;

mod arithmetic;
mod gates;
mod memory;
mod muxes;
mod wiring;

/// The direction of a port (and of the pin attached to it).
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// A port which receives a signal from a wire.
    Input,
    /// A port which drives a signal onto its wires.
    Output,
}

/// The properties of a port for a component.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
pub struct PortProperties {
    /// Direction of the port.
    pub ty: PortType,
    /// Name of the port. Pins are attached to ports by this name.
    pub name: &'static str,
}

/// A struct representing an update to an output port's value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PortUpdate {
    /// Index of the port being updated.
    ///
    /// For example, this is an index of 0 when referring
    /// to the first port in a component's port list.
    pub index: usize,
    /// The new value of the port.
    pub value: Signal,
}

/// The interface defining how a component evaluates.
#[enum_dispatch]
pub trait Component {
    /// Returns the properties of all ports of the component, in a fixed order.
    ///
    /// The port values handed to [`Component::run`] follow this order.
    fn ports(&self) -> Vec<PortProperties>;

    /// The register this component keeps in the sequential memory store,
    /// in its power-up state.
    ///
    /// Stateless components return `None`.
    fn initialize_register(&self) -> Option<Register> {
        None
    }

    /// Whether the outputs of this component are independent of its inputs
    /// within a single solve (they only change through [`Component::clock`]
    /// or through the component's properties).
    fn is_registered(&self) -> bool {
        false
    }

    /// "Runs" the component's rule on the current port values,
    /// returning the new values of its output ports.
    ///
    /// This may panic if the port values of [`RunContext`] do not match
    /// the port list given by [`Component::ports`].
    #[must_use]
    fn run(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        self.validate_ports(ctx.ports);
        self.run_inner(ctx)
    }

    /// Inner run function, wrapped by [`Component::run`] to validate its input.
    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate>;

    /// Applies a clock update to the component's register, given the
    /// port values resolved by the last solve.
    ///
    /// Returns whether the stored value changed.
    fn clock(&self, _ports: &[Signal], _register: &mut Register) -> bool {
        false
    }

    /// Reports a fault condition visible on the component's resolved ports.
    fn fault(&self, _ports: &[Signal]) -> Option<DiagnosticKind> {
        None
    }

    /// Validates that the port values match the port list.
    fn validate_ports(&self, ports: &[Signal]) {
        // Only run in debug mode
        if cfg!(debug_assertions) {
            debug_assert_eq!(ports.len(), self.ports().len(), "Expected correct number of ports");
        }
    }
}

/// An enum that represents all supported component kinds.
#[enum_dispatch(Component)]
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
#[allow(missing_docs)]
pub enum ComponentFn {
    // Gates
    And, Or, Xor, Nand, Nor, Xnor, Not, Buffer,
    // Sources, sinks and wiring
    Switch, Constant, Clock, DipSwitch, Junction, PassThrough, Sink, Unmodeled, Unknown,
    // Combinational blocks
    Mux, Demux, Decoder, Adder, Comparator, BcdTo7Seg,
    // Memory
    SrLatch, DFlipFlop, JkFlipFlop, TFlipFlop, Counter, ShiftRegister,
}

/// The clock transitions an edge-triggered component responds to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensitivity {
    /// Triggered on a rising edge (LOW to HIGH).
    #[default]
    #[serde(rename = "rising")]
    Posedge,
    /// Triggered on a falling edge (HIGH to LOW).
    #[serde(rename = "falling")]
    Negedge,
}
impl Sensitivity {
    /// Checks whether the change between the old and new clock level
    /// would create a trigger based on this sensitivity.
    ///
    /// Only a transition between the two definite levels is an edge.
    ///
    /// ```
    /// use circuitforge_engine::func::Sensitivity;
    /// use circuitforge_engine::signal::Signal;
    ///
    /// assert!(Sensitivity::Posedge.activated(Signal::Low, Signal::High));
    /// assert!(Sensitivity::Negedge.activated(Signal::High, Signal::Low));
    /// assert!(!Sensitivity::Posedge.activated(Signal::Undefined, Signal::High));
    /// ```
    pub fn activated(self, old: Signal, new: Signal) -> bool {
        match self {
            Sensitivity::Posedge => old == Signal::Low && new == Signal::High,
            Sensitivity::Negedge => old == Signal::High && new == Signal::Low,
        }
    }
}

/// All properties available when running a component.
pub struct RunContext<'a> {
    /// The resolved value of every port (inputs from their wires,
    /// outputs from the current solve).
    pub ports: &'a [Signal],
    /// The component's register, for components which keep one.
    pub register: Option<&'a mut Register>,
}

/// Helper function to more easily define port lists (for [`Component::ports`]).
fn port_list(config: &[(PortType, &[&'static str])]) -> Vec<PortProperties> {
    config.iter()
        .flat_map(|&(ty, names)| names.iter().map(move |&name| PortProperties { ty, name }))
        .collect()
}

/// Builds the output updates for consecutive ports starting at `start`.
fn updates_from(start: usize, values: impl IntoIterator<Item = Signal>) -> Vec<PortUpdate> {
    values.into_iter()
        .enumerate()
        .map(|(i, value)| PortUpdate { index: start + i, value })
        .collect()
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SwitchProps {
    state: bool,
    pressed: Option<bool>,
}
#[derive(Deserialize, Default)]
#[serde(default)]
struct ClockProps {
    phase: u64,
}
#[derive(Deserialize, Default)]
#[serde(default)]
struct ValueProps {
    #[serde(alias = "reg")]
    value: u64,
}
#[derive(Deserialize, Default)]
#[serde(default)]
struct CounterProps {
    count: u64,
}
#[derive(Deserialize, Default)]
#[serde(default)]
struct EdgeProps {
    edge: Sensitivity,
}

/// Decodes the part of a property bag a component kind cares about.
fn props<T: DeserializeOwned>(bag: &Map<String, Value>) -> serde_json::Result<T> {
    serde_json::from_value(Value::Object(bag.clone()))
}

impl ComponentFn {
    /// Resolves a snapshot's type tag and property bag into a component kind.
    ///
    /// Unrecognized tags resolve to [`Unknown`]. This only fails if a property
    /// the kind reads has the wrong JSON type.
    ///
    /// ```
    /// use circuitforge_engine::func::{Clock, ComponentFn};
    ///
    /// let bag = serde_json::json!({ "phase": 3 });
    /// let func = ComponentFn::from_type("CLOCK", bag.as_object().unwrap()).unwrap();
    /// assert_eq!(func, ComponentFn::from(Clock::new(3)));
    /// ```
    pub fn from_type(type_name: &str, bag: &Map<String, Value>) -> serde_json::Result<Self> {
        let func = match type_name {
            // Gates
            "AND_2" => And::new(2).into(),
            "AND_3" => And::new(3).into(),
            "AND_4" => And::new(4).into(),
            "OR_2"  => Or::new(2).into(),
            "OR_3"  => Or::new(3).into(),
            "OR_4"  => Or::new(4).into(),
            "NAND_2" => Nand::new(2).into(),
            "NAND_3" => Nand::new(3).into(),
            "NOR_2" => Nor::new(2).into(),
            "NOR_3" => Nor::new(3).into(),
            "XOR_2" => Xor::new(2).into(),
            "XNOR_2" => Xnor::new(2).into(),
            "NOT" => Not.into(),
            "BUFFER" => Buffer.into(),

            // Sources
            "SWITCH_TOGGLE" | "PIN_INPUT" => {
                let p: SwitchProps = props(bag)?;
                Switch::new(p.state).into()
            },
            "SWITCH_PUSH" => {
                let p: SwitchProps = props(bag)?;
                // either flag closes the switch
                Switch::new(p.pressed.unwrap_or(false) || p.state).into()
            },
            "CONST_HIGH" => Constant::new(Signal::High).into(),
            "VCC_5V" | "VCC_3V3" => Constant::named(Signal::High, "VCC").into(),
            "CONST_LOW" => Constant::new(Signal::Low).into(),
            "CLOCK" => Clock::new(props::<ClockProps>(bag)?.phase).into(),
            "DIP_SWITCH_4" | "NUMERIC_INPUT" => DipSwitch::new(props::<ValueProps>(bag)?.value).into(),

            // Sinks
            "LED_RED" | "LED_GREEN" | "LED_YELLOW" | "LED_BLUE"
                | "BUZZER" | "PROBE" | "PIN_OUTPUT" => Sink::new(&["IN"]).into(),
            "LED_RGB" => Sink::new(&["R", "G", "B"]).into(),
            "DISPLAY_7SEG" => Sink::new(&SEGMENTS).into(),
            "MOTOR_DC" => Sink::new(&["FWD", "REV"]).into(),
            "GROUND" => Sink::new(&["GND"]).into(),

            // Passives and connectors
            "RESISTOR" | "INDUCTOR" => PassThrough::new("IN", "OUT").into(),
            "DIODE" | "ZENER" => PassThrough::new("A", "K").into(),
            "JUNCTION" => Junction.into(),
            "CAPACITOR" => Unmodeled::new(&["IN"], &["OUT"]).into(),
            "TRANSISTOR_NPN" | "TRANSISTOR_PNP" | "POTENTIOMETER" | "BATTERY"
                | "SENSOR_LIGHT" | "SENSOR_TEMP" | "SENSOR_PROXIMITY" | "SENSOR_ULTRASONIC"
                | "MOTOR_SERVO" | "MOTOR_STEPPER" | "DISPLAY_LCD" | "BUS_4BIT" | "BUS_8BIT"
                => Unmodeled::default().into(),

            // Combinational blocks
            "MUX_2TO1" => Mux::two().into(),
            "MUX_4TO1" => Mux::four().into(),
            "DEMUX_1TO2" => Demux.into(),
            "DECODER_2TO4" => Decoder.into(),
            "ADDER_4BIT" => Adder.into(),
            "COMPARATOR_4BIT" => Comparator.into(),
            "BCD_TO_7SEG" => BcdTo7Seg.into(),

            // Memory
            "SR_LATCH" => SrLatch.into(),
            "D_FLIPFLOP" => DFlipFlop::new(props::<EdgeProps>(bag)?.edge).into(),
            "JK_FLIPFLOP" => JkFlipFlop::new(props::<EdgeProps>(bag)?.edge).into(),
            "T_FLIPFLOP" => TFlipFlop::new(props::<EdgeProps>(bag)?.edge).into(),
            "COUNTER_4BIT" => Counter::new(props::<CounterProps>(bag)?.count).into(),
            "SHIFT_REGISTER_8BIT" => ShiftRegister::new(props::<ValueProps>(bag)?.value).into(),

            other => Unknown::new(other).into(),
        };
        Ok(func)
    }
}

/// Test helper which runs a stateless component on the given port values.
#[cfg(test)]
fn run_with(func: &impl Component, ports: &[Signal]) -> Vec<PortUpdate> {
    func.run(RunContext { ports, register: None })
}

/// Test helper which pads `inputs` with UNDEFINED output ports.
#[cfg(test)]
fn with_outputs(func: &impl Component, inputs: &[Signal]) -> Vec<Signal> {
    let mut ports = inputs.to_vec();
    ports.resize(func.ports().len(), Signal::Undefined);
    ports
}
