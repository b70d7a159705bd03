//! Nodewire Application
//!
//! Headless runner: loads a scene file, builds a wiring surface from it and
//! replays scripted pointer gestures and widget edits.

mod runner;
mod scene;

pub use runner::{ConnectorState, EndpointState, Report, Runner, run};
pub use scene::{EndpointSpec, Scene, ScriptStep};

use nodewire_core::WiringResult;
use std::path::Path;

/// Load a scene file and replay it.
pub fn run_file(path: impl AsRef<Path>) -> WiringResult<Report> {
    let scene = Scene::load(path)?;
    run(&scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodewire_core::Value;

    const KNOB_DISPLAY: &str = include_str!("../scenes/knob_display.json");

    #[test]
    fn test_bundled_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knob_display.json");
        std::fs::write(&path, KNOB_DISPLAY).unwrap();

        let report = run_file(&path).unwrap();

        assert_eq!(report.endpoints["display"].value, Value::from(42));
        assert_eq!(report.outcomes.len(), 1);
    }
}
