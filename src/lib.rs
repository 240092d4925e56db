#![warn(missing_docs)]
//! Signal evaluation engine for CircuitForge logic circuits.
//!
//! Given a snapshot of a circuit (components with pins, wires between pins) and
//! the sequential memory returned by the previous evaluation, [`evaluate`]
//! computes a four-valued [`Signal`] for every pin and wire, reports problems
//! as diagnostics, and returns the memory to use next time.
//!
//! ```
//! use circuitforge_engine::circuit::{CircuitComponent, Wire};
//! use circuitforge_engine::func::{And, Sink, Switch};
//! use circuitforge_engine::{evaluate, SequentialMemory, Signal};
//!
//! let components = [
//!     CircuitComponent::new("a", Switch::new(true)),
//!     CircuitComponent::new("b", Switch::new(true)),
//!     CircuitComponent::new("and", And::new(2)),
//!     CircuitComponent::new("led", Sink::new(&["IN"])),
//! ];
//! let wires = [
//!     Wire::new("w1", ("a", "OUT"), ("and", "A")),
//!     Wire::new("w2", ("b", "OUT"), ("and", "B")),
//!     Wire::new("w3", ("and", "Y"), ("led", "IN")),
//! ];
//!
//! let (result, _memory) = evaluate(&components, &wires, SequentialMemory::new());
//! assert!(result.success);
//! assert_eq!(result.pin("led", "IN"), Some(Signal::High));
//! ```

pub mod circuit;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod func;
pub mod result;
pub mod signal;
pub mod snapshot;
pub mod store;
mod solver;

pub use engine::{evaluate, Engine, EngineConfig};
pub use result::EvalResult;
pub use signal::Signal;
pub use store::SequentialMemory;
