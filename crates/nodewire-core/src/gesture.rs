//! Wiring gesture state machine.
//!
//! A pointer press on a connector arms the coordinator; the next pointer
//! release resolves the connector under the pointer (if any) and turns the
//! gesture into a `connect` or a cancel. One coordinator is shared by all
//! connectors of a wiring surface, so at most one connector is armed per
//! surface while independent surfaces never interfere.

use crate::connector::{Connector, ConnectorId};
use crate::endpoint::same_endpoint;
use crate::events::ConnectorEventKind;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// No connector armed.
    #[default]
    Idle,
    /// A gesture started on this connector.
    Armed(ConnectorId),
}

/// What a pointer release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GestureOutcome {
    /// Nothing was armed; the release was ignored.
    NotArmed,
    /// Released on the armed connector itself. No edge change and the
    /// coordinator stays armed.
    ReleasedOnActive,
    /// Released outside any connector; the armed connector dropped its edges.
    Cancelled,
    /// The two connectors would wire an endpoint into itself; treated as a
    /// cancel.
    Degenerate,
    /// A new edge `source -> destination`.
    Connected {
        source: ConnectorId,
        destination: ConnectorId,
    },
}

/// Holds the single armed connector of a wiring surface.
#[derive(Default)]
pub struct GestureCoordinator {
    active: RefCell<Option<Connector>>,
}

impl fmt::Debug for GestureCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureCoordinator")
            .field("state", &self.state())
            .finish()
    }
}

impl GestureCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        match self.active.borrow().as_ref() {
            Some(connector) => GestureState::Armed(connector.id()),
            None => GestureState::Idle,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// The armed connector, if any.
    pub fn active(&self) -> Option<Connector> {
        self.active.borrow().clone()
    }

    pub fn is_active(&self, connector: &Connector) -> bool {
        self.active.borrow().as_ref() == Some(connector)
    }

    /// Pointer pressed on `connector`.
    ///
    /// Arms the coordinator, flags the connector as connected and emits
    /// `Connect` from it. Ignored (returns false) while another gesture is
    /// armed.
    pub fn press(&self, connector: &Connector) -> bool {
        if self.is_armed() {
            log::debug!("Press on {} ignored, gesture already armed", connector.label());
            return false;
        }
        *self.active.borrow_mut() = Some(connector.clone());
        log::debug!("Gesture armed on {}", connector.label());

        connector.set_connected(true);
        connector.emit(ConnectorEventKind::Connect {
            has_source: connector.has_source(),
            has_destination: connector.has_destination(),
        });
        true
    }

    /// Pointer released over `target` (`None` when no connector is under
    /// the pointer).
    pub fn release(&self, target: Option<&Connector>) -> GestureOutcome {
        let Some(active) = self.active() else {
            return GestureOutcome::NotArmed;
        };

        let Some(target) = target else {
            self.active.borrow_mut().take();
            log::debug!("Gesture on {} cancelled", active.label());
            active.disconnect(None);
            return GestureOutcome::Cancelled;
        };

        if *target == active {
            // Stays armed: the next release elsewhere still completes it.
            log::debug!("Gesture released on its own connector {}", active.label());
            return GestureOutcome::ReleasedOnActive;
        }

        self.active.borrow_mut().take();

        let source = if active.has_source() {
            active.clone()
        } else {
            target.clone()
        };
        let destination = if target.has_destination() {
            target.clone()
        } else {
            active.clone()
        };

        let degenerate = source == destination
            || same_endpoint(
                source.source_endpoint().as_ref(),
                destination.destination_endpoint().as_ref(),
            );
        if degenerate {
            log::warn!(
                "Refusing to wire {} into {}: source and destination endpoints coincide",
                source.label(),
                destination.label()
            );
            active.disconnect(None);
            return GestureOutcome::Degenerate;
        }

        source.connect(&destination);
        GestureOutcome::Connected {
            source: source.id(),
            destination: destination.id(),
        }
    }

    /// Drop the armed connector without touching any edge.
    pub fn cancel(&self) -> Option<Connector> {
        let previous = self.active.borrow_mut().take();
        if let Some(connector) = &previous {
            log::debug!("Gesture on {} reset", connector.label());
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Disableable, EndpointRef, HasValue, InputEndpoint, InputKind, Value};
    use crate::events::ConnectorEvent;
    use std::rc::Rc;

    struct Rig {
        coordinator: Rc<GestureCoordinator>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                coordinator: Rc::new(GestureCoordinator::new()),
            }
        }

        fn connector(&self) -> Connector {
            Connector::new(self.coordinator.clone())
        }

        fn source(&self, endpoint: &Rc<InputEndpoint>) -> Connector {
            let connector = self.connector();
            connector.set_source_endpoint(Some(endpoint.clone()));
            connector
        }

        fn destination(&self, endpoint: &Rc<InputEndpoint>) -> Connector {
            let connector = self.connector();
            connector.set_destination_endpoint(Some(endpoint.clone()));
            connector
        }
    }

    fn number(value: i64) -> Rc<InputEndpoint> {
        Rc::new(InputEndpoint::new(InputKind::Number).with_value(value))
    }

    fn record(connector: &Connector) -> Rc<RefCell<Vec<ConnectorEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        connector.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    fn count_connected(events: &Rc<RefCell<Vec<ConnectorEvent>>>) -> usize {
        events
            .borrow()
            .iter()
            .filter(|event| matches!(event.kind, ConnectorEventKind::Connected { .. }))
            .count()
    }

    #[test]
    fn test_press_arms_and_emits_connect() {
        let rig = Rig::new();
        let a = rig.source(&number(1));
        let events = record(&a);

        assert!(a.pointer_down());

        assert_eq!(rig.coordinator.state(), GestureState::Armed(a.id()));
        assert!(a.connected());
        assert_eq!(
            events.borrow()[0].kind,
            ConnectorEventKind::Connect {
                has_source: true,
                has_destination: false
            }
        );
    }

    #[test]
    fn test_second_press_ignored_while_armed() {
        let rig = Rig::new();
        let a = rig.connector();
        let b = rig.connector();

        assert!(a.pointer_down());
        assert!(!b.pointer_down());

        assert_eq!(rig.coordinator.state(), GestureState::Armed(a.id()));
        assert!(!b.connected());
    }

    #[test]
    fn test_release_without_press() {
        let rig = Rig::new();
        let a = rig.connector();
        assert_eq!(rig.coordinator.release(Some(&a)), GestureOutcome::NotArmed);
        assert_eq!(rig.coordinator.release(None), GestureOutcome::NotArmed);
    }

    #[test]
    fn test_happy_path_source_to_destination() {
        let rig = Rig::new();
        let knob = number(0);
        let display = number(0);
        let a = rig.source(&knob);
        let b = rig.destination(&display);
        knob.input(5);
        assert_eq!(a.value(), Some(Value::from(5)));
        let a_events = record(&a);
        let b_events = record(&b);

        a.pointer_down();
        let outcome = rig.coordinator.release(Some(&b));

        assert_eq!(
            outcome,
            GestureOutcome::Connected {
                source: a.id(),
                destination: b.id()
            }
        );
        assert_eq!(count_connected(&a_events), 1);
        assert_eq!(count_connected(&b_events), 1);
        assert_eq!(display.value(), Value::from(5));
        assert!(display.disabled());

        knob.input(8);
        assert_eq!(display.value(), Value::from(8));
        assert_eq!(rig.coordinator.state(), GestureState::Idle);
    }

    #[test]
    fn test_happy_path_started_from_destination() {
        let rig = Rig::new();
        let knob = number(0);
        let display = number(0);
        let a = rig.source(&knob);
        let b = rig.destination(&display);

        b.pointer_down();
        let outcome = rig.coordinator.release(Some(&a));

        assert_eq!(
            outcome,
            GestureOutcome::Connected {
                source: a.id(),
                destination: b.id()
            }
        );
        assert!(a.is_connected_to(&b));
    }

    #[test]
    fn test_release_outside_cancels() {
        let rig = Rig::new();
        let a = rig.source(&number(1));
        let b = rig.connector();
        a.connect(&b);

        a.pointer_down();
        let outcome = rig.coordinator.release(None);

        assert_eq!(outcome, GestureOutcome::Cancelled);
        assert_eq!(a.peer_count(), 0);
        assert!(!a.connected());
        assert_eq!(rig.coordinator.state(), GestureState::Idle);
    }

    #[test]
    fn test_release_on_active_keeps_armed() {
        let rig = Rig::new();
        let a = rig.source(&number(1));
        let b = rig.destination(&number(0));

        a.pointer_down();
        assert_eq!(
            rig.coordinator.release(Some(&a)),
            GestureOutcome::ReleasedOnActive
        );
        assert_eq!(rig.coordinator.state(), GestureState::Armed(a.id()));
        assert_eq!(a.peer_count(), 0);

        // A later release on another connector still completes the gesture.
        let outcome = rig.coordinator.release(Some(&b));
        assert!(matches!(outcome, GestureOutcome::Connected { .. }));
        assert_eq!(rig.coordinator.state(), GestureState::Idle);
    }

    #[test]
    fn test_degenerate_pairing_cancels() {
        let rig = Rig::new();
        let shared: EndpointRef = number(3);
        let a = rig.connector();
        a.set_source_endpoint(Some(shared.clone()));
        let b = rig.connector();
        b.set_destination_endpoint(Some(shared));

        a.pointer_down();
        let outcome = rig.coordinator.release(Some(&b));

        assert_eq!(outcome, GestureOutcome::Degenerate);
        assert_eq!(a.peer_count(), 0);
        assert_eq!(b.peer_count(), 0);
        assert_eq!(rig.coordinator.state(), GestureState::Idle);
    }

    #[test]
    fn test_unbound_pair_is_degenerate() {
        let rig = Rig::new();
        let a = rig.connector();
        let b = rig.connector();

        a.pointer_down();

        assert_eq!(
            rig.coordinator.release(Some(&b)),
            GestureOutcome::Degenerate
        );
        assert_eq!(a.peer_count(), 0);
    }

    #[test]
    fn test_source_onto_source_without_destination_is_degenerate() {
        let rig = Rig::new();
        let a = rig.source(&number(1));
        let b = rig.source(&number(2));

        a.pointer_down();

        // Both roles resolve to `a`; a self edge is refused.
        assert_eq!(
            rig.coordinator.release(Some(&b)),
            GestureOutcome::Degenerate
        );
        assert!(!a.is_connected_to(&a));
    }

    #[test]
    fn test_cancel_resets_without_edge_changes() {
        let rig = Rig::new();
        let a = rig.connector();
        let b = rig.connector();
        a.connect(&b);
        a.pointer_down();

        assert_eq!(rig.coordinator.cancel(), Some(a.clone()));
        assert_eq!(rig.coordinator.state(), GestureState::Idle);
        assert!(a.is_connected_to(&b));
        assert_eq!(rig.coordinator.cancel(), None);
    }

    #[test]
    fn test_independent_coordinators() {
        let left = Rig::new();
        let right = Rig::new();
        let a = left.connector();
        let b = right.connector();

        assert!(a.pointer_down());
        assert!(b.pointer_down());

        assert_eq!(left.coordinator.state(), GestureState::Armed(a.id()));
        assert_eq!(right.coordinator.state(), GestureState::Armed(b.id()));
    }
}
