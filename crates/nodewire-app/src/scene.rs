//! Scene files for the headless runner.

use nodewire_core::{
    ConnectorSpec, InputKind, PointerEvent, SurfaceConfig, Value, WiringError, WiringResult,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// An input widget to create before wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Registry path, also used as the widget name.
    pub name: String,
    #[serde(default)]
    pub kind: InputKind,
    /// Initial value; the kind's default when absent.
    #[serde(default)]
    pub value: Option<Value>,
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    /// Feed a pointer event to the surface.
    Pointer(PointerEvent),
    /// Simulate a user edit on an endpoint.
    Input { endpoint: String, value: Value },
    /// Detach a connector by name.
    Detach { connector: String },
}

/// Endpoints, connectors and a script to replay against them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub config: SurfaceConfig,
    pub endpoints: Vec<EndpointSpec>,
    pub connectors: Vec<ConnectorSpec>,
    pub script: Vec<ScriptStep>,
}

impl Scene {
    /// Parse and validate a scene from JSON.
    pub fn from_json(json: &str) -> WiringResult<Self> {
        let scene: Scene = serde_json::from_str(json)
            .map_err(|e| WiringError::Config(format!("Failed to parse scene: {}", e)))?;
        scene.config.validate()?;
        Ok(scene)
    }

    /// Load a scene file.
    pub fn load(path: impl AsRef<Path>) -> WiringResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            WiringError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use nodewire_core::MouseButton;
    use serde_json::json;
    use std::io::Write;

    fn sample() -> serde_json::Value {
        json!({
            "config": { "hit_tolerance": 2.0 },
            "endpoints": [
                { "name": "knob", "kind": "range", "value": 5 },
                { "name": "display", "kind": "number" }
            ],
            "connectors": [
                { "name": "a", "source": "knob", "position": { "x": 0.0, "y": 0.0 } },
                { "destination": "display", "position": { "x": 100.0, "y": 0.0 } }
            ],
            "script": [
                { "pointer": { "Down": { "position": { "x": 0.0, "y": 0.0 }, "button": "Left" } } },
                { "pointer": { "Up": { "position": { "x": 100.0, "y": 0.0 }, "button": "Left" } } },
                { "input": { "endpoint": "knob", "value": 8 } },
                { "detach": { "connector": "a" } }
            ]
        })
    }

    #[test]
    fn test_parse_scene() {
        let scene = Scene::from_json(&sample().to_string()).unwrap();

        assert!((scene.config.hit_tolerance - 2.0).abs() < f64::EPSILON);
        assert_eq!(scene.endpoints.len(), 2);
        assert_eq!(scene.endpoints[0].kind, InputKind::Range);
        assert_eq!(scene.endpoints[1].value, None);
        assert_eq!(scene.connectors[1].destination.as_deref(), Some("display"));
        assert_eq!(
            scene.script[0],
            ScriptStep::Pointer(PointerEvent::Down {
                position: Point::new(0.0, 0.0),
                button: MouseButton::Left
            })
        );
        assert_eq!(
            scene.script[3],
            ScriptStep::Detach {
                connector: "a".to_string()
            }
        );
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::from_json("{}").unwrap();
        assert_eq!(scene, Scene::default());
    }

    #[test]
    fn test_invalid_scene() {
        let result = Scene::from_json("{ \"endpoints\": 3 }");
        assert!(matches!(result, Err(WiringError::Config(_))));

        let result = Scene::from_json(&json!({ "config": { "handle_radius": -1.0 } }).to_string());
        assert!(matches!(result, Err(WiringError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample().to_string().as_bytes()).unwrap();

        let scene = Scene::load(file.path()).unwrap();

        assert_eq!(scene.connectors.len(), 2);
        assert_eq!(scene.script.len(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Scene::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(WiringError::Config(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let scene = Scene::from_json(&sample().to_string()).unwrap();
        let restored = Scene::from_json(&scene.to_json().unwrap()).unwrap();
        assert_eq!(restored, scene);
    }
}
