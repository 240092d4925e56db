use crate::func::{Component, PortProperties, PortType, PortUpdate, RunContext, port_list, updates_from};
use crate::signal::{unpack_bits, Signal};

/// Output port names of a 4-bit source.
const NIBBLE_OUTPUTS: [&str; 4] = ["Q0", "Q1", "Q2", "Q3"];

/// A toggle or push switch, driving its position onto `OUT`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Switch {
    on: bool
}
impl Switch {
    /// Creates a switch in the given position.
    pub fn new(on: bool) -> Self {
        Self { on }
    }
}
impl Component for Switch {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[(PortType::Output, &["OUT"])])
    }

    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![PortUpdate { index: 0, value: Signal::from(self.on) }]
    }
}

/// A constant source (tie-high, tie-low, supply rails).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Constant {
    value: Signal,
    port: &'static str
}
impl Constant {
    /// Creates a new constant with the given value, driven onto `OUT`.
    pub fn new(value: Signal) -> Self {
        Self::named(value, "OUT")
    }
    /// Creates a new constant driven onto the named port (e.g. `VCC` on a supply rail).
    pub fn named(value: Signal, port: &'static str) -> Self {
        Self { value, port }
    }
}
impl Component for Constant {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[(PortType::Output, std::slice::from_ref(&self.port))])
    }

    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![PortUpdate { index: 0, value: self.value }]
    }
}

/// A clock source.
///
/// The phase counter is advanced by whoever drives time;
/// even phases are LOW, odd phases are HIGH.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Clock {
    phase: u64
}
impl Clock {
    /// Creates a clock at the given phase.
    pub fn new(phase: u64) -> Self {
        Self { phase }
    }
    /// The current phase.
    pub fn phase(&self) -> u64 {
        self.phase
    }
}
impl Component for Clock {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[(PortType::Output, &["CLK"])])
    }

    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![PortUpdate { index: 0, value: Signal::from(self.phase % 2 == 1) }]
    }
}

/// A 4-bit source (DIP switch bank or numeric entry), driving `Q0..Q3`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct DipSwitch {
    value: u8
}
impl DipSwitch {
    /// Creates a source holding the low 4 bits of `value`.
    pub fn new(value: u64) -> Self {
        Self { value: (value & 0xF) as u8 }
    }
}
impl Component for DipSwitch {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[(PortType::Output, &NIBBLE_OUTPUTS)])
    }

    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        updates_from(0, unpack_bits(u64::from(self.value), NIBBLE_OUTPUTS.len()))
    }
}

/// A wire junction, fanning `IN` out to `OUT1` and `OUT2`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Junction;
impl Component for Junction {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["IN"]),
            (PortType::Output, &["OUT1", "OUT2"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        updates_from(1, [ctx.ports[0]; 2])
    }
}

/// A two-terminal part which is transparent to logic levels
/// (resistors, inductors, diodes).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct PassThrough {
    input: &'static str,
    output: &'static str
}
impl PassThrough {
    /// Creates a pass-through from the port named `input` to the port named `output`.
    pub fn new(input: &'static str, output: &'static str) -> Self {
        Self { input, output }
    }
}
impl Component for PassThrough {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, std::slice::from_ref(&self.input)),
            (PortType::Output, std::slice::from_ref(&self.output)),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![PortUpdate { index: 1, value: ctx.ports[0] }]
    }
}

/// An indicator or actuator which only observes its inputs (LEDs, displays, motors).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Sink {
    inputs: &'static [&'static str]
}
impl Sink {
    /// Creates a sink with the given input ports.
    pub fn new(inputs: &'static [&'static str]) -> Self {
        Self { inputs }
    }
}
impl Component for Sink {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[(PortType::Input, self.inputs)])
    }

    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![]
    }
}

/// A recognized part with no logic-level model (analog parts, buses).
///
/// Its ports are known so the editor's pins attach, but its outputs stay UNDEFINED.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Unmodeled {
    inputs: &'static [&'static str],
    outputs: &'static [&'static str]
}
impl Unmodeled {
    /// Creates an unmodeled part with the given ports.
    pub fn new(inputs: &'static [&'static str], outputs: &'static [&'static str]) -> Self {
        Self { inputs, outputs }
    }
}
impl Component for Unmodeled {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, self.inputs),
            (PortType::Output, self.outputs),
        ])
    }

    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![]
    }
}

/// A component whose type tag is not recognized.
///
/// Behaves like [`Unmodeled`], but is reported by the engine.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Unknown {
    type_name: String
}
impl Unknown {
    /// Creates a placeholder for the given type tag.
    pub fn new(type_name: &str) -> Self {
        Self { type_name: type_name.to_owned() }
    }
    /// The unrecognized type tag.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}
impl Component for Unknown {
    fn ports(&self) -> Vec<PortProperties> {
        vec![]
    }

    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![]
    }
}
