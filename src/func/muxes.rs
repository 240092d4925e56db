use crate::func::{Component, PortProperties, PortType, PortUpdate, RunContext, port_list, updates_from};
use crate::signal::{pack_bits, Signal};

/// A multiplexer component.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Mux {
    selsize: u8
}
impl Mux {
    /// A 2-to-1 mux (`A, B, S -> Y`).
    pub fn two() -> Self {
        Self { selsize: 1 }
    }
    /// A 4-to-1 mux (`I0..I3, S0, S1 -> Y`).
    pub fn four() -> Self {
        Self { selsize: 2 }
    }

    fn names(&self) -> (&'static [&'static str], &'static [&'static str]) {
        match self.selsize {
            1 => (&["A", "B"], &["S"]),
            _ => (&["I0", "I1", "I2", "I3"], &["S0", "S1"]),
        }
    }
}
impl Component for Mux {
    fn ports(&self) -> Vec<PortProperties> {
        let (data, select) = self.names();
        port_list(&[
            (PortType::Input, data),
            (PortType::Input, select),
            (PortType::Output, &["Y"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        let n_data = 1 << self.selsize;
        let n_inputs = n_data + usize::from(self.selsize);
        let value = match pack_bits(&ctx.ports[n_data..n_inputs]) {
            Ok(sel) => ctx.ports[sel as usize],
            Err(e) => e,
        };
        vec![PortUpdate { index: n_inputs, value }]
    }
}

/// A 1-to-2 demultiplexer (`IN, S -> Y0, Y1`).
///
/// The unselected output is LOW.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Demux;
impl Component for Demux {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["IN", "S"]),
            (PortType::Output, &["Y0", "Y1"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        let result = match ctx.ports[1] {
            Signal::Low  => [ctx.ports[0], Signal::Low],
            Signal::High => [Signal::Low, ctx.ports[0]],
            e => [e; 2],
        };
        updates_from(2, result)
    }
}

/// A 2-to-4 decoder (`A0, A1 -> Y0..Y3`), driving the selected output HIGH.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Decoder;
impl Component for Decoder {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["A0", "A1"]),
            (PortType::Output, &["Y0", "Y1", "Y2", "Y3"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        let result = match pack_bits(&ctx.ports[..2]) {
            Ok(sel) => {
                let mut result = [Signal::Low; 4];
                result[sel as usize] = Signal::High;
                result
            },
            Err(e) => [e; 4],
        };
        updates_from(2, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::{run_with, with_outputs};
    use Signal::*;

    fn values(func: &impl Component, inputs: &[Signal]) -> Vec<Signal> {
        run_with(func, &with_outputs(func, inputs)).into_iter().map(|u| u.value).collect()
    }

    #[test]
    fn test_mux_2to1() {
        let mux = Mux::two();
        assert_eq!(mux.ports().len(), 4);
        assert_eq!(values(&mux, &[Low, High, Low]), [Low]);
        assert_eq!(values(&mux, &[Low, High, High]), [High]);
        // unselected input does not matter
        assert_eq!(values(&mux, &[Error, High, High]), [High]);
        assert_eq!(values(&mux, &[Low, High, Undefined]), [Undefined]);
    }

    #[test]
    fn test_mux_4to1() {
        let mux = Mux::four();
        let names: Vec<_> = mux.ports().iter().map(|p| p.name).collect();
        assert_eq!(names, ["I0", "I1", "I2", "I3", "S0", "S1", "Y"]);

        // select 2 (S0 = 0, S1 = 1)
        assert_eq!(values(&mux, &[Low, Low, High, Low, Low, High]), [High]);
        assert_eq!(values(&mux, &[Low, Low, High, Low, Error, High]), [Error]);
    }

    #[test]
    fn test_demux() {
        assert_eq!(values(&Demux, &[High, Low]), [High, Low]);
        assert_eq!(values(&Demux, &[High, High]), [Low, High]);
        assert_eq!(values(&Demux, &[High, Undefined]), [Undefined, Undefined]);
    }

    #[test]
    fn test_decoder() {
        for sel in 0..4 {
            let ins = [Signal::from(sel & 1 != 0), Signal::from(sel & 2 != 0)];
            let expected: Vec<_> = (0..4).map(|i| Signal::from(i == sel)).collect();
            assert_eq!(values(&Decoder, &ins), expected, "Decoder should select output {sel}");
        }
        assert_eq!(values(&Decoder, &[High, Undefined]), [Undefined; 4]);
    }
}
