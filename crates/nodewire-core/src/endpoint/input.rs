//! In-memory input widget implementing the host endpoint contract.

use super::{Disableable, HasValue, Nameable, Observable, Value};
use crate::events::{EndpointEvent, Listener, ListenerId, Listeners};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;

/// Kind of input widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    #[default]
    Text,
    Number,
    Range,
    Button,
    Color,
}

impl InputKind {
    /// Value a fresh widget of this kind starts with.
    pub fn default_value(self) -> Value {
        match self {
            Self::Text => Value::String(String::new()),
            Self::Number | Self::Range => Value::from(0),
            Self::Button => Value::Null,
            Self::Color => Value::String("#000000".to_string()),
        }
    }
}

/// A headless input widget: value, name, disabled flag and listeners.
pub struct InputEndpoint {
    kind: InputKind,
    name: RefCell<Option<String>>,
    value: RefCell<Value>,
    disabled: Cell<bool>,
    input_listeners: Listeners<EndpointEvent>,
    change_listeners: Listeners<EndpointEvent>,
}

impl fmt::Debug for InputEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputEndpoint")
            .field("kind", &self.kind)
            .field("name", &self.name.borrow())
            .field("value", &self.value.borrow())
            .field("disabled", &self.disabled.get())
            .finish()
    }
}

impl InputEndpoint {
    /// Create an unnamed widget holding the kind's default value.
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            name: RefCell::new(None),
            value: RefCell::new(kind.default_value()),
            disabled: Cell::new(false),
            input_listeners: Listeners::new(),
            change_listeners: Listeners::new(),
        }
    }

    /// Set the widget name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        *self.name.borrow_mut() = Some(name.into());
        self
    }

    /// Set the initial value.
    pub fn with_value(self, value: impl Into<Value>) -> Self {
        *self.value.borrow_mut() = value.into();
        self
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn set_name(&self, name: Option<String>) {
        *self.name.borrow_mut() = name;
    }

    /// Simulate a user edit: store the value, then fire `Input` and `Change`.
    ///
    /// Returns false (and changes nothing) while the widget is disabled.
    pub fn input(&self, value: impl Into<Value>) -> bool {
        if self.disabled.get() {
            log::debug!("Ignoring input on disabled endpoint {:?}", self.name.borrow());
            return false;
        }
        *self.value.borrow_mut() = value.into();
        self.dispatch(EndpointEvent::Input);
        self.dispatch(EndpointEvent::Change);
        true
    }

    fn listeners(&self, event: EndpointEvent) -> &Listeners<EndpointEvent> {
        match event {
            EndpointEvent::Input => &self.input_listeners,
            EndpointEvent::Change => &self.change_listeners,
        }
    }
}

impl HasValue for InputEndpoint {
    fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }
}

impl Nameable for InputEndpoint {
    fn name(&self) -> Option<String> {
        self.name.borrow().clone()
    }
}

impl Disableable for InputEndpoint {
    fn disabled(&self) -> bool {
        self.disabled.get()
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }
}

impl Observable for InputEndpoint {
    fn subscribe(&self, event: EndpointEvent, listener: Listener<EndpointEvent>) -> ListenerId {
        self.listeners(event).add_shared(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        if !self.input_listeners.remove(id) {
            self.change_listeners.remove(id);
        }
    }

    fn dispatch(&self, event: EndpointEvent) {
        self.listeners(event).emit(&event);
    }
}
