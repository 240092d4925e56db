use crate::func::{Component, PortProperties, PortType, PortUpdate, RunContext, port_list};
use crate::signal::Signal;

/// Minimum number of inputs for multi-input logic gates.
pub const MIN_GATE_INPUTS: u8 = 2;
/// Maximum number of inputs for multi-input logic gates.
pub const MAX_GATE_INPUTS: u8 = 8;

/// Input port names of a multi-input gate, in order.
const INPUT_NAMES: [&str; MAX_GATE_INPUTS as usize] = ["A", "B", "C", "D", "E", "F", "G", "H"];

macro_rules! gates {
    ($($(#[$m:meta])? $Id:ident: $f:expr, $invert:literal),*$(,)?) => {
        $(
            $(#[$m])?
            #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
            pub struct $Id {
                n_inputs: u8
            }
            impl $Id {
                /// Creates a new instance of the gate with the specified number of inputs.
                pub fn new(n_inputs: u8) -> Self {
                    Self {
                        n_inputs: n_inputs.clamp(MIN_GATE_INPUTS, MAX_GATE_INPUTS)
                    }
                }
            }
            impl Component for $Id {
                fn ports(&self) -> Vec<PortProperties> {
                    port_list(&[
                        (PortType::Input, &INPUT_NAMES[..usize::from(self.n_inputs)]),
                        (PortType::Output, &["Y"]),
                    ])
                }
                fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
                    let value = ctx.ports[..usize::from(self.n_inputs)].iter()
                        .copied()
                        .reduce($f)
                        .unwrap_or(Signal::Undefined);

                    vec![PortUpdate {
                        index: usize::from(self.n_inputs),
                        value: if $invert { !value } else { value }
                    }]
                }
            }
        )*
    }
}

gates! {
    /// An AND gate component.
    And:  |a, b| a & b, false,
    /// An OR gate component.
    Or:   |a, b| a | b, false,
    /// An XOR gate component (odd parity for more than two inputs).
    Xor:  |a, b| a ^ b, false,
    /// A NAND gate component.
    Nand: |a, b| a & b, true,
    /// A NOR gate component.
    Nor:  |a, b| a | b, true,
    /// A XNOR gate component.
    Xnor: |a, b| a ^ b, true,
}

/// A NOT gate component.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Not;
impl Component for Not {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["A"]),
            (PortType::Output, &["Y"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![PortUpdate { index: 1, value: !ctx.ports[0] }]
    }
}

/// A buffer, which copies its input to its output.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Buffer;
impl Component for Buffer {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["A"]),
            (PortType::Output, &["Y"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        vec![PortUpdate { index: 1, value: ctx.ports[0] }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::{run_with, with_outputs};
    use Signal::*;

    fn output(gate: &impl Component, inputs: &[Signal]) -> Signal {
        let updates = run_with(gate, &with_outputs(gate, inputs));
        assert_eq!(updates.len(), 1, "Expected a single update for a logic gate");
        updates[0].value
    }

    #[test]
    fn test_and_gate() {
        let gate = And::new(2);
        let updates = run_with(&gate, &[Low, High, Undefined]);

        // Checks if port 2, the output port for two input gates was updated
        // 0 & 1 = 0;
        assert_eq!(
            updates,
            vec![PortUpdate { index: 2, value: Low }],
            "Expected a single update with index=2 and value=LOW (0 & 1 = 0)"
        );
    }

    #[test]
    fn test_gate_truth_tables() {
        for a in [false, true] {
            for b in [false, true] {
                let ins = [Signal::from(a), Signal::from(b)];
                assert_eq!(output(&And::new(2), &ins), Signal::from(a & b), "AND {a} {b}");
                assert_eq!(output(&Or::new(2), &ins), Signal::from(a | b), "OR {a} {b}");
                assert_eq!(output(&Xor::new(2), &ins), Signal::from(a ^ b), "XOR {a} {b}");
                assert_eq!(output(&Nand::new(2), &ins), Signal::from(!(a & b)), "NAND {a} {b}");
                assert_eq!(output(&Nor::new(2), &ins), Signal::from(!(a | b)), "NOR {a} {b}");
                assert_eq!(output(&Xnor::new(2), &ins), Signal::from(!(a ^ b)), "XNOR {a} {b}");
            }
        }
    }

    #[test]
    fn test_and_gate_4input() {
        let gate = And::new(4);
        assert_eq!(gate.ports().len(), 5);
        assert_eq!(output(&gate, &[High, High, High, High]), High);
        assert_eq!(output(&gate, &[High, High, Low, High]), Low);
    }

    #[test]
    fn test_error_input_forces_error() {
        assert_eq!(output(&And::new(2), &[Low, Error]), Error);
        assert_eq!(output(&Or::new(2), &[High, Error]), Error);
        assert_eq!(output(&Nand::new(3), &[Low, Undefined, Error]), Error);
        assert_eq!(output(&Nor::new(2), &[Error, High]), Error);
        assert_eq!(output(&Xor::new(2), &[Error, Low]), Error);
        assert_eq!(output(&Not, &[Error]), Error);
        assert_eq!(output(&Buffer, &[Error]), Error);
    }

    #[test]
    fn test_undefined_input() {
        assert_eq!(output(&And::new(2), &[High, Undefined]), Undefined);
        assert_eq!(output(&Or::new(2), &[Low, Undefined]), Undefined);
        assert_eq!(output(&Xnor::new(2), &[High, Undefined]), Undefined);
        assert_eq!(output(&Not, &[Undefined]), Undefined);

        // controlling values still decide the output
        assert_eq!(output(&And::new(2), &[Low, Undefined]), Low);
        assert_eq!(output(&Nand::new(2), &[Undefined, Low]), High);
        assert_eq!(output(&Nor::new(2), &[High, Undefined]), Low);
    }

    #[test]
    fn test_xor_parity() {
        assert_eq!(output(&Xor::new(3), &[High, High, High]), High);
        assert_eq!(output(&Xor::new(3), &[High, High, Low]), Low);
    }

    #[test]
    fn test_input_count_clamped() {
        assert_eq!(Or::new(0).ports().len(), usize::from(MIN_GATE_INPUTS) + 1);
        assert_eq!(Or::new(100).ports().len(), usize::from(MAX_GATE_INPUTS) + 1);
    }
}
