//! Diagnostics raised while evaluating a circuit.
//!
//! A malformed circuit never aborts an evaluation; every problem is recorded as a
//! [`Diagnostic`] next to the (partial) signal values. Only diagnostics of
//! [`Severity::Error`] make an evaluation unsuccessful.

use serde::{Deserialize, Serialize};

use crate::circuit::{ComponentId, PinId, WireId};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Purely informational.
    Info,
    /// Something looks off, but evaluation is still meaningful.
    Warning,
    /// The reported signal values are known to be wrong somewhere.
    Error,
}

/// The kind of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    /// An input pin is driven by more than one wire.
    ConflictingDriver,
    /// A wire refers to a component or pin that does not exist.
    StaleWire,
    /// A wire does not run from an output pin to an input pin.
    MisdirectedWire,
    /// A component's inputs put it in a forbidden state (e.g. S = R = 1 on an SR latch).
    InvalidState,
    /// A feedback loop never settled.
    Oscillation,
    /// A component's type is not recognized.
    UnknownComponentType,
    /// An input pin is not connected (only reported on request).
    FloatingInput,
}
impl DiagnosticKind {
    /// The severity of this kind.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::ConflictingDriver
            | DiagnosticKind::InvalidState
            | DiagnosticKind::Oscillation => Severity::Error,
            DiagnosticKind::StaleWire
            | DiagnosticKind::MisdirectedWire
            | DiagnosticKind::UnknownComponentType => Severity::Warning,
            DiagnosticKind::FloatingInput => Severity::Info,
        }
    }

    /// The fixed human-readable message of this kind.
    pub fn message(self) -> &'static str {
        match self {
            DiagnosticKind::ConflictingDriver    => "Input pin is driven by more than one wire",
            DiagnosticKind::StaleWire            => "Wire refers to a component or pin that no longer exists",
            DiagnosticKind::MisdirectedWire      => "Wire must run from an output pin to an input pin",
            DiagnosticKind::InvalidState         => "Component inputs put it in an invalid state",
            DiagnosticKind::Oscillation          => "Feedback loop does not settle",
            DiagnosticKind::UnknownComponentType => "Component type is not recognized",
            DiagnosticKind::FloatingInput        => "Input pin is not connected",
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// How bad it is (always `kind.severity()`).
    pub severity: Severity,
    /// The component concerned.
    pub component: ComponentId,
    /// The pin concerned, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<PinId>,
    /// The wire concerned, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire: Option<WireId>,
    /// Human-readable description.
    pub message: String,
}
impl Diagnostic {
    /// Creates a diagnostic of the given kind about a component.
    pub fn new(kind: DiagnosticKind, component: ComponentId) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            component,
            pin: None,
            wire: None,
            message: kind.message().to_owned(),
        }
    }
    /// Attaches the pin concerned.
    pub fn with_pin(mut self, pin: PinId) -> Self {
        self.pin = Some(pin);
        self
    }
    /// Attaches the wire concerned.
    pub fn with_wire(mut self, wire: WireId) -> Self {
        self.wire = Some(wire);
        self
    }
}

/// Collects the diagnostics of one evaluation, in the order they are raised.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}
impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Default::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            kind = ?diagnostic.kind,
            component = %diagnostic.component,
            pin = diagnostic.pin.as_ref().map(PinId::as_str),
            "diagnostic raised"
        );
        self.entries.push(diagnostic);
    }

    /// Whether an error-severity diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the collector, returning the diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_decide_success() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::new(DiagnosticKind::StaleWire, "a".into()).with_wire("w1".into()));
        diagnostics.push(Diagnostic::new(DiagnosticKind::FloatingInput, "b".into()).with_pin("A".into()));
        assert!(!diagnostics.has_errors(), "Warnings and info should not be errors");

        diagnostics.push(Diagnostic::new(DiagnosticKind::ConflictingDriver, "b".into()).with_pin("A".into()));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let d = Diagnostic::new(DiagnosticKind::ConflictingDriver, "and1".into()).with_pin("A".into());
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json, serde_json::json!({
            "kind": "CONFLICTING_DRIVER",
            "severity": "error",
            "component": "and1",
            "pin": "A",
            "message": "Input pin is driven by more than one wire",
        }));
    }
}
