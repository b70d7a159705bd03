//! Nodewire Core Library
//!
//! Connector wiring for independent input widgets: connectors, the value
//! propagation graph between them, and the pointer gesture that wires them.

pub mod config;
pub mod connector;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod gesture;
pub mod graph;
pub mod input;
pub mod surface;

pub use config::{ConnectorSpec, EndpointRegistry, EndpointResolver, SurfaceConfig};
pub use connector::{Connector, ConnectorHandle, ConnectorId, ConnectorRole};
pub use endpoint::{EndpointRef, HostEndpoint, InputEndpoint, InputKind, Value};
pub use error::{WiringError, WiringResult};
pub use events::{ConnectorEvent, ConnectorEventKind, EndpointEvent, ListenerId};
pub use gesture::{GestureCoordinator, GestureOutcome, GestureState};
pub use graph::Edge;
pub use input::{InputState, MouseButton, PointerEvent};
pub use surface::{PendingWire, WiringSurface};
