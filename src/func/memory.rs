use crate::diagnostics::DiagnosticKind;
use crate::func::{Component, PortProperties, PortType, PortUpdate, RunContext, Sensitivity, port_list, updates_from};
use crate::signal::{unpack_bits, Signal};
use crate::store::Register;

/// Output port names of single-bit memory elements.
const Q_OUTPUTS: [&str; 2] = ["Q", "Q'"];

/// Drives `Q` and `Q'` from a flip-flop's stored value.
fn stored_outputs(start: usize, register: Option<&mut Register>) -> Vec<PortUpdate> {
    let q = match register {
        Some(Register::FlipFlop { q, .. }) => *q,
        _ => Signal::Undefined,
    };
    updates_from(start, [q, !q])
}

/// Applies a clock level to a flip-flop register, latching `next(q)` on an active edge.
///
/// Returns whether the stored value changed.
fn clock_register(trigger: Sensitivity, clk: Signal, register: &mut Register, next: impl FnOnce(Signal) -> Signal) -> bool {
    let Register::FlipFlop { q, prev_clock } = register else { return false };
    let fired = trigger.activated(*prev_clock, clk);
    *prev_clock = clk.settled();
    if !fired { return false; }

    let new_q = next(*q).settled();
    std::mem::replace(q, new_q) != new_q
}

/// The power-up register of an edge-triggered flip-flop.
fn flip_flop_register() -> Option<Register> {
    Some(Register::FlipFlop { q: Signal::Low, prev_clock: Signal::Low })
}

/// A level-sensitive SR latch.
///
/// Setting both `S` and `R` is invalid: both outputs become ERROR
/// and the stored value is lost.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct SrLatch;
impl Component for SrLatch {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["S", "R"]),
            (PortType::Output, &Q_OUTPUTS),
        ])
    }
    fn initialize_register(&self) -> Option<Register> {
        Some(Register::Latch { q: Signal::Low })
    }
    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        let Some(q) = ctx.register.and_then(Register::latch_mut) else {
            return updates_from(2, [Signal::Undefined; 2]);
        };
        match (ctx.ports[0], ctx.ports[1]) {
            (Signal::Error, _) | (_, Signal::Error) => return updates_from(2, [Signal::Error; 2]),
            (Signal::High, Signal::High) => {
                *q = Signal::Undefined;
                return updates_from(2, [Signal::Error; 2]);
            },
            (Signal::High, Signal::Low) => *q = Signal::High,
            (Signal::Low, Signal::High) => *q = Signal::Low,
            (Signal::Low, Signal::Low) => {},
            _ => return updates_from(2, [Signal::Undefined; 2]),
        }
        updates_from(2, [*q, !*q])
    }
    fn fault(&self, ports: &[Signal]) -> Option<DiagnosticKind> {
        (ports[0] == Signal::High && ports[1] == Signal::High).then_some(DiagnosticKind::InvalidState)
    }
}

/// An edge-triggered D flip-flop.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct DFlipFlop {
    trigger: Sensitivity
}
impl DFlipFlop {
    /// Creates a D flip-flop which latches on the given clock edge.
    pub fn new(trigger: Sensitivity) -> Self {
        Self { trigger }
    }
}
impl Component for DFlipFlop {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["D", "CLK"]),
            (PortType::Output, &Q_OUTPUTS),
        ])
    }
    fn initialize_register(&self) -> Option<Register> {
        flip_flop_register()
    }
    fn is_registered(&self) -> bool {
        true
    }
    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        stored_outputs(2, ctx.register)
    }
    fn clock(&self, ports: &[Signal], register: &mut Register) -> bool {
        let d = ports[0];
        clock_register(self.trigger, ports[1], register, |_| d)
    }
}

/// An edge-triggered JK flip-flop.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct JkFlipFlop {
    trigger: Sensitivity
}
impl JkFlipFlop {
    /// Creates a JK flip-flop which latches on the given clock edge.
    pub fn new(trigger: Sensitivity) -> Self {
        Self { trigger }
    }
}
impl Component for JkFlipFlop {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["J", "CLK", "K"]),
            (PortType::Output, &Q_OUTPUTS),
        ])
    }
    fn initialize_register(&self) -> Option<Register> {
        flip_flop_register()
    }
    fn is_registered(&self) -> bool {
        true
    }
    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        stored_outputs(3, ctx.register)
    }
    fn clock(&self, ports: &[Signal], register: &mut Register) -> bool {
        let (j, k) = (ports[0], ports[2]);
        clock_register(self.trigger, ports[1], register, |q| match (j, k) {
            (Signal::High, Signal::High) => !q,
            (Signal::High, Signal::Low) => Signal::High,
            (Signal::Low, Signal::High) => Signal::Low,
            (Signal::Low, Signal::Low) => q,
            _ => Signal::Undefined,
        })
    }
}

/// An edge-triggered T (toggle) flip-flop.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct TFlipFlop {
    trigger: Sensitivity
}
impl TFlipFlop {
    /// Creates a T flip-flop which toggles on the given clock edge.
    pub fn new(trigger: Sensitivity) -> Self {
        Self { trigger }
    }
}
impl Component for TFlipFlop {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["T", "CLK"]),
            (PortType::Output, &Q_OUTPUTS),
        ])
    }
    fn initialize_register(&self) -> Option<Register> {
        flip_flop_register()
    }
    fn is_registered(&self) -> bool {
        true
    }
    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        stored_outputs(2, ctx.register)
    }
    fn clock(&self, ports: &[Signal], register: &mut Register) -> bool {
        let t = ports[0];
        clock_register(self.trigger, ports[1], register, |q| match t {
            Signal::High => !q,
            Signal::Low => q,
            _ => Signal::Undefined,
        })
    }
}

/// A 4-bit counter whose count is kept in the component's properties.
///
/// The count is advanced outside the engine; `CLK` is only observed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Counter {
    count: u8
}
impl Counter {
    /// Creates a counter showing `count` (mod 16).
    pub fn new(count: u64) -> Self {
        Self { count: (count % 16) as u8 }
    }
}
impl Component for Counter {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["CLK"]),
            (PortType::Output, &["Q0", "Q1", "Q2", "Q3"]),
        ])
    }
    fn is_registered(&self) -> bool {
        true
    }
    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        updates_from(1, unpack_bits(u64::from(self.count), 4))
    }
}

/// An 8-bit shift register whose contents are kept in the component's properties.
///
/// Shifting happens outside the engine; `SI` and `CLK` are only observed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ShiftRegister {
    value: u8
}
impl ShiftRegister {
    /// Creates a shift register holding the low 8 bits of `value`.
    pub fn new(value: u64) -> Self {
        Self { value: (value & 0xFF) as u8 }
    }
}
impl Component for ShiftRegister {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["SI", "CLK"]),
            (PortType::Output, &["Q0", "Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7"]),
        ])
    }
    fn is_registered(&self) -> bool {
        true
    }
    fn run_inner(&self, _ctx: RunContext<'_>) -> Vec<PortUpdate> {
        updates_from(2, unpack_bits(u64::from(self.value), 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    fn run_latch(latch: &SrLatch, register: &mut Register, s: Signal, r: Signal) -> (Signal, Signal) {
        let updates = latch.run(RunContext { ports: &[s, r, Undefined, Undefined], register: Some(register) });
        (updates[0].value, updates[1].value)
    }

    fn outputs(func: &impl Component, ports: &[Signal], register: &mut Register) -> Vec<Signal> {
        func.run(RunContext { ports, register: Some(register) })
            .into_iter()
            .map(|u| u.value)
            .collect()
    }

    #[test]
    fn test_sr_latch() {
        let latch = SrLatch;
        let mut reg = latch.initialize_register().unwrap();

        assert_eq!(run_latch(&latch, &mut reg, High, Low), (High, Low), "S=1, R=0 should set");
        assert_eq!(run_latch(&latch, &mut reg, Low, Low), (High, Low), "S=0, R=0 should hold a set latch");
        assert_eq!(run_latch(&latch, &mut reg, Low, High), (Low, High), "S=0, R=1 should reset");
        assert_eq!(run_latch(&latch, &mut reg, Low, Low), (Low, High), "S=0, R=0 should hold a reset latch");
    }

    #[test]
    fn test_sr_latch_invalid() {
        let latch = SrLatch;
        let mut reg = latch.initialize_register().unwrap();

        assert_eq!(run_latch(&latch, &mut reg, High, High), (Error, Error));
        assert_eq!(latch.fault(&[High, High, Error, Error]), Some(DiagnosticKind::InvalidState));
        assert_eq!(latch.fault(&[High, Low, High, Low]), None);

        // the stored value is lost, so a following hold is indeterminate
        assert_eq!(run_latch(&latch, &mut reg, Low, Low), (Undefined, Undefined));
    }

    #[test]
    fn test_d_flip_flop_rising_edge() {
        let ff = DFlipFlop::new(Sensitivity::Posedge);
        let mut reg = ff.initialize_register().unwrap();

        // power-up
        assert_eq!(outputs(&ff, &[High, Low, Undefined, Undefined], &mut reg), [Low, High]);

        assert!(!ff.clock(&[High, Low, Low, High], &mut reg), "A LOW clock should not latch");
        assert!(ff.clock(&[High, High, Low, High], &mut reg), "A rising edge should latch D");
        assert_eq!(outputs(&ff, &[High, High, Undefined, Undefined], &mut reg), [High, Low]);

        // D changes while CLK stays HIGH: no edge
        assert!(!ff.clock(&[Low, High, High, Low], &mut reg));
        assert_eq!(outputs(&ff, &[Low, High, Undefined, Undefined], &mut reg), [High, Low]);

        // falling edge is ignored, next rising edge latches
        assert!(!ff.clock(&[Low, Low, High, Low], &mut reg));
        assert!(ff.clock(&[Low, High, High, Low], &mut reg));
        assert_eq!(outputs(&ff, &[Low, High, Undefined, Undefined], &mut reg), [Low, High]);
    }

    #[test]
    fn test_d_flip_flop_falling_edge() {
        let ff = DFlipFlop::new(Sensitivity::Negedge);
        let mut reg = ff.initialize_register().unwrap();

        assert!(!ff.clock(&[High, High, Low, High], &mut reg));
        assert!(ff.clock(&[High, Low, Low, High], &mut reg));
        assert_eq!(reg, Register::FlipFlop { q: High, prev_clock: Low });
    }

    #[test]
    fn test_sampled_error_is_stored_indeterminate() {
        let ff = DFlipFlop::new(Sensitivity::Posedge);
        let mut reg = ff.initialize_register().unwrap();

        assert!(ff.clock(&[Error, High, Low, High], &mut reg));
        assert_eq!(reg, Register::FlipFlop { q: Undefined, prev_clock: High });
    }

    #[test]
    fn test_jk_flip_flop() {
        let ff = JkFlipFlop::new(Sensitivity::Posedge);
        let mut reg = ff.initialize_register().unwrap();
        let edge = |j: Signal, k: Signal, reg: &mut Register| {
            ff.clock(&[j, Low, k, Undefined, Undefined], reg);
            ff.clock(&[j, High, k, Undefined, Undefined], reg);
            match reg {
                Register::FlipFlop { q, .. } => *q,
                _ => unreachable!(),
            }
        };

        assert_eq!(edge(High, Low, &mut reg), High, "J=1 should set");
        assert_eq!(edge(Low, Low, &mut reg), High, "J=K=0 should hold");
        assert_eq!(edge(High, High, &mut reg), Low, "J=K=1 should toggle");
        assert_eq!(edge(High, High, &mut reg), High, "J=K=1 should toggle");
        assert_eq!(edge(Low, High, &mut reg), Low, "K=1 should reset");
        assert_eq!(edge(Undefined, High, &mut reg), Undefined);
    }

    #[test]
    fn test_t_flip_flop_toggles() {
        let ff = TFlipFlop::new(Sensitivity::Posedge);
        let mut reg = ff.initialize_register().unwrap();

        for expected in [High, Low, High] {
            ff.clock(&[High, Low, Undefined, Undefined], &mut reg);
            assert!(ff.clock(&[High, High, Undefined, Undefined], &mut reg));
            assert_eq!(outputs(&ff, &[High, High, Undefined, Undefined], &mut reg), [expected, !expected]);
        }
    }

    #[test]
    fn test_counter_and_shift_register() {
        let counter = Counter::new(17);
        let bits: Vec<_> = counter.run(RunContext { ports: &[Low; 5], register: None })
            .into_iter().map(|u| u.value).collect();
        assert_eq!(bits, [High, Low, Low, Low]);

        let sr = ShiftRegister::new(0x181);
        let updates = sr.run(RunContext { ports: &[Low; 10], register: None });
        assert_eq!(updates[0], PortUpdate { index: 2, value: High });
        assert_eq!(updates[7], PortUpdate { index: 9, value: High });
        assert_eq!(updates[1].value, Low);
    }
}
