//! Host endpoint capability contract.
//!
//! A host endpoint is any widget a connector can read from or write into.
//! The core depends only on the four capability traits below:
//! - value access
//! - a name
//! - a disabled flag
//! - `Input` / `Change` notifications
//!
//! Endpoints are shared, interior-mutable handles. A connector borrows them
//! and subscribes to them; it never owns or destroys one.

mod input;

pub use input::{InputEndpoint, InputKind};

use crate::events::{EndpointEvent, Listener, ListenerId};
use std::rc::Rc;

/// Dynamic widget value.
pub type Value = serde_json::Value;

/// Readable and writable value.
pub trait HasValue {
    fn value(&self) -> Value;
    /// Overwrite the value. Does not emit notifications.
    fn set_value(&self, value: Value);
}

/// Readable name.
pub trait Nameable {
    /// Widget name, `None` when unnamed.
    fn name(&self) -> Option<String>;
}

/// Readable and writable disabled flag.
pub trait Disableable {
    fn disabled(&self) -> bool;
    fn set_disabled(&self, disabled: bool);
}

/// Notification source for `Input` / `Change` events.
pub trait Observable {
    /// Register a listener for one event kind.
    fn subscribe(&self, event: EndpointEvent, listener: Listener<EndpointEvent>) -> ListenerId;
    /// Remove a listener registered with [`Observable::subscribe`].
    fn unsubscribe(&self, id: ListenerId);
    /// Fire an event on this endpoint.
    fn dispatch(&self, event: EndpointEvent);
}

/// The full capability set a connector consumes.
pub trait HostEndpoint: HasValue + Nameable + Disableable + Observable {}

impl<T: HasValue + Nameable + Disableable + Observable + ?Sized> HostEndpoint for T {}

/// Shared handle to a host endpoint.
pub type EndpointRef = Rc<dyn HostEndpoint>;

/// Identity comparison of two optional endpoint bindings.
///
/// Two absent bindings compare as identical.
pub fn same_endpoint(a: Option<&EndpointRef>, b: Option<&EndpointRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Name of an endpoint, treating an empty name as no name.
pub(crate) fn endpoint_name(endpoint: &EndpointRef) -> Option<String> {
    endpoint.name().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_endpoint_identity() {
        let a: EndpointRef = Rc::new(InputEndpoint::new(InputKind::Number));
        let b: EndpointRef = Rc::new(InputEndpoint::new(InputKind::Number));
        let a_again = a.clone();

        assert!(same_endpoint(Some(&a), Some(&a_again)));
        assert!(!same_endpoint(Some(&a), Some(&b)));
        assert!(!same_endpoint(Some(&a), None));
        assert!(same_endpoint(None, None));
    }

    #[test]
    fn test_empty_name_is_no_name() {
        let unnamed: EndpointRef = Rc::new(InputEndpoint::new(InputKind::Text).with_name(""));
        let named: EndpointRef = Rc::new(InputEndpoint::new(InputKind::Text).with_name("volume"));

        assert_eq!(endpoint_name(&unnamed), None);
        assert_eq!(endpoint_name(&named), Some("volume".to_string()));
    }
}
