use crate::func::{Component, PortProperties, PortType, PortUpdate, RunContext, port_list, updates_from};
use crate::signal::{pack_bits, unpack_bits, Signal};

/// Segment port names of a 7-segment display, `A` through `G`.
pub const SEGMENTS: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];

const A_BITS: [&str; 4] = ["A0", "A1", "A2", "A3"];
const B_BITS: [&str; 4] = ["B0", "B1", "B2", "B3"];

/// Reads the two 4-bit operands at the start of `ports`.
fn operands(ports: &[Signal]) -> Result<(u64, u64), Signal> {
    match (pack_bits(&ports[0..4]), pack_bits(&ports[4..8])) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(e1), Err(e2)) => Err(e1.max(e2)),
    }
}

/// A 4-bit adder (`A0..A3, B0..B3 -> S0..S3, Cout`).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Adder;
impl Component for Adder {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &A_BITS),
            (PortType::Input, &B_BITS),
            (PortType::Output, &["S0", "S1", "S2", "S3", "Cout"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        match operands(ctx.ports) {
            // sum bit 4 is the carry out
            Ok((a, b)) => updates_from(8, unpack_bits(a + b, 5)),
            Err(e) => updates_from(8, [e; 5]),
        }
    }
}

/// A 4-bit magnitude comparator (`A0..A3, B0..B3 -> A>B, A=B, A<B`).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Comparator;
impl Component for Comparator {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &A_BITS),
            (PortType::Input, &B_BITS),
            (PortType::Output, &["A>B", "A=B", "A<B"]),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        let result = match operands(ctx.ports) {
            Ok((a, b)) => [a > b, a == b, a < b].map(Signal::from),
            Err(e) => [e; 3],
        };
        updates_from(8, result)
    }
}

/// A BCD to 7-segment decoder (`D0..D3 -> A..G`).
///
/// Codes above 9 blank the display.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct BcdTo7Seg;
impl BcdTo7Seg {
    /// Lit segments for each digit, segment `A` in bit 0.
    const PATTERNS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];
}
impl Component for BcdTo7Seg {
    fn ports(&self) -> Vec<PortProperties> {
        port_list(&[
            (PortType::Input, &["D0", "D1", "D2", "D3"]),
            (PortType::Output, &SEGMENTS),
        ])
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        match pack_bits(&ctx.ports[..4]) {
            Ok(digit) => {
                let pattern = Self::PATTERNS.get(digit as usize).copied().unwrap_or(0);
                updates_from(4, unpack_bits(u64::from(pattern), SEGMENTS.len()))
            },
            Err(e) => updates_from(4, [e; 7]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::{run_with, with_outputs};
    use Signal::*;

    fn nibble(n: u64) -> Vec<Signal> {
        unpack_bits(n, 4).collect()
    }
    fn values(func: &impl Component, inputs: &[Signal]) -> Vec<Signal> {
        run_with(func, &with_outputs(func, inputs)).into_iter().map(|u| u.value).collect()
    }

    #[test]
    fn test_adder() {
        for (a, b) in [(0, 0), (3, 4), (9, 9), (15, 1), (15, 15)] {
            let ins = [nibble(a), nibble(b)].concat();
            let out = values(&Adder, &ins);
            assert_eq!(pack_bits(&out), Ok(a + b), "{a} + {b}");
        }
    }

    #[test]
    fn test_adder_undefined_operand() {
        let mut ins = [nibble(3), nibble(4)].concat();
        ins[5] = Undefined;
        assert_eq!(values(&Adder, &ins), [Undefined; 5]);
        ins[0] = Error;
        assert_eq!(values(&Adder, &ins), [Error; 5]);
    }

    #[test]
    fn test_comparator() {
        let cmp = |a, b| values(&Comparator, &[nibble(a), nibble(b)].concat());
        assert_eq!(cmp(7, 2), [High, Low, Low]);
        assert_eq!(cmp(5, 5), [Low, High, Low]);
        assert_eq!(cmp(0, 15), [Low, Low, High]);
    }

    #[test]
    fn test_bcd_to_7seg() {
        // 8 lights every segment, 1 lights B and C
        assert_eq!(values(&BcdTo7Seg, &nibble(8)), [High; 7]);
        assert_eq!(values(&BcdTo7Seg, &nibble(1)), [Low, High, High, Low, Low, Low, Low]);
        // above 9 is blank
        assert_eq!(values(&BcdTo7Seg, &nibble(12)), [Low; 7]);
    }
}
