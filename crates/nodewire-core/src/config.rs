//! Surface settings and declarative connector specifications.

use crate::endpoint::EndpointRef;
use crate::error::{WiringError, WiringResult};
use crate::input::MouseButton;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Wiring surface settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Radius of newly created connector handles.
    pub handle_radius: f64,
    /// Extra pick distance around a handle.
    pub hit_tolerance: f64,
    /// Button that starts and completes wiring gestures.
    pub primary_button: MouseButton,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            handle_radius: crate::connector::DEFAULT_HANDLE_RADIUS,
            hit_tolerance: 4.0,
            primary_button: MouseButton::Left,
        }
    }
}

impl SurfaceConfig {
    /// Reject settings that make hit testing meaningless.
    pub fn validate(&self) -> WiringResult<()> {
        if !self.handle_radius.is_finite() || self.handle_radius <= 0.0 {
            return Err(WiringError::Config(format!(
                "handle_radius must be positive, got {}",
                self.handle_radius
            )));
        }
        if !self.hit_tolerance.is_finite() || self.hit_tolerance < 0.0 {
            return Err(WiringError::Config(format!(
                "hit_tolerance must not be negative, got {}",
                self.hit_tolerance
            )));
        }
        Ok(())
    }
}

/// Declarative description of one connector, applied at bind time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorSpec {
    /// Explicit connector name.
    pub name: Option<String>,
    /// Path of the source endpoint.
    pub source: Option<String>,
    /// Path of the destination endpoint.
    pub destination: Option<String>,
    /// Space-separated names of peer connectors to wire to.
    pub connect: Option<String>,
    /// Handle position on the surface.
    pub position: Option<Point>,
}

impl ConnectorSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, path: impl Into<String>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn with_destination(mut self, path: impl Into<String>) -> Self {
        self.destination = Some(path.into());
        self
    }

    pub fn with_connect(mut self, peers: impl Into<String>) -> Self {
        self.connect = Some(peers.into());
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Peer names listed in `connect`.
    pub fn peer_names(&self) -> impl Iterator<Item = &str> {
        self.connect.as_deref().unwrap_or_default().split_whitespace()
    }
}

/// Looks up host endpoints by path.
pub trait EndpointResolver {
    fn resolve(&self, path: &str) -> Option<EndpointRef>;
}

impl<F> EndpointResolver for F
where
    F: Fn(&str) -> Option<EndpointRef>,
{
    fn resolve(&self, path: &str) -> Option<EndpointRef> {
        self(path)
    }
}

/// Endpoints registered by name.
#[derive(Default, Clone)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, EndpointRef>,
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.endpoints.keys()).finish()
    }
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `endpoint` under `path`, returning the endpoint it replaced.
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        endpoint: EndpointRef,
    ) -> Option<EndpointRef> {
        self.endpoints.insert(path.into(), endpoint)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl EndpointResolver for EndpointRegistry {
    fn resolve(&self, path: &str) -> Option<EndpointRef> {
        self.endpoints.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{InputEndpoint, InputKind};
    use serde_json::json;
    use std::rc::Rc;

    #[test]
    fn test_config_defaults() {
        let config = SurfaceConfig::default();
        assert!((config.handle_radius - 6.0).abs() < f64::EPSILON);
        assert!((config.hit_tolerance - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.primary_button, MouseButton::Left);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json() {
        let config: SurfaceConfig =
            serde_json::from_value(json!({ "hit_tolerance": 1.5 })).unwrap();
        assert!((config.hit_tolerance - 1.5).abs() < f64::EPSILON);
        assert!((config.handle_radius - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let config = SurfaceConfig {
            handle_radius: 0.0,
            ..SurfaceConfig::default()
        };
        assert!(matches!(config.validate(), Err(WiringError::Config(_))));

        let config = SurfaceConfig {
            hit_tolerance: -1.0,
            ..SurfaceConfig::default()
        };
        assert!(matches!(config.validate(), Err(WiringError::Config(_))));
    }

    #[test]
    fn test_spec_from_json() {
        let spec: ConnectorSpec = serde_json::from_value(json!({
            "name": "volume",
            "source": "knob",
            "connect": "  mixer   meter ",
            "position": { "x": 10.0, "y": 20.0 }
        }))
        .unwrap();

        assert_eq!(spec.name.as_deref(), Some("volume"));
        assert_eq!(spec.source.as_deref(), Some("knob"));
        assert_eq!(spec.destination, None);
        assert_eq!(spec.peer_names().collect::<Vec<_>>(), vec!["mixer", "meter"]);
        assert_eq!(spec.position, Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_spec_without_connect_has_no_peers() {
        let spec = ConnectorSpec::named("lonely");
        assert_eq!(spec.peer_names().count(), 0);
    }

    #[test]
    fn test_registry_resolves_by_path() {
        let mut registry = EndpointRegistry::new();
        let knob: EndpointRef = Rc::new(InputEndpoint::new(InputKind::Range));
        registry.insert("knob", knob.clone());

        let resolved = registry.resolve("knob").unwrap();
        assert!(Rc::ptr_eq(&resolved, &knob));
        assert!(registry.resolve("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_closure_resolver() {
        let knob: EndpointRef = Rc::new(InputEndpoint::new(InputKind::Range));
        let captured = knob.clone();
        let resolver = move |path: &str| (path == "knob").then(|| captured.clone());

        assert!(resolver.resolve("knob").is_some());
        assert!(resolver.resolve("other").is_none());
    }
}
