//! Replays a scene against a wiring surface.

use crate::scene::{Scene, ScriptStep};
use nodewire_core::endpoint::{Disableable, HasValue};
use nodewire_core::{
    Connector, ConnectorEvent, ConnectorId, EndpointRef, EndpointRegistry, GestureOutcome,
    InputEndpoint, InputKind, Value, WiringError, WiringResult, WiringSurface,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Final state of one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointState {
    pub kind: InputKind,
    pub value: Value,
    pub disabled: bool,
}

/// Final state of one connector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorState {
    pub id: ConnectorId,
    pub name: Option<String>,
    pub value: Option<Value>,
    pub connected: bool,
    /// Peer names (ids for unnamed peers), in insertion order.
    pub peers: Vec<String>,
}

/// What a replay produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub endpoints: BTreeMap<String, EndpointState>,
    pub connectors: Vec<ConnectorState>,
    pub outcomes: Vec<GestureOutcome>,
    pub events: Vec<ConnectorEvent>,
}

/// A surface built from a scene, ready to replay its script.
pub struct Runner {
    surface: WiringSurface,
    endpoints: BTreeMap<String, Rc<InputEndpoint>>,
    events: Rc<RefCell<Vec<ConnectorEvent>>>,
    outcomes: Vec<GestureOutcome>,
}

impl Runner {
    /// Create the scene's endpoints and attach its connectors.
    pub fn new(scene: &Scene) -> WiringResult<Self> {
        let mut endpoints = BTreeMap::new();
        let mut registry = EndpointRegistry::new();
        for spec in &scene.endpoints {
            let mut endpoint = InputEndpoint::new(spec.kind).with_name(spec.name.clone());
            if let Some(value) = &spec.value {
                endpoint = endpoint.with_value(value.clone());
            }
            let endpoint = Rc::new(endpoint);
            let shared: EndpointRef = endpoint.clone();
            if registry.insert(spec.name.clone(), shared).is_some() {
                return Err(WiringError::Config(format!(
                    "Duplicate endpoint name: {}",
                    spec.name
                )));
            }
            endpoints.insert(spec.name.clone(), endpoint);
        }

        let mut surface = WiringSurface::new(scene.config);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        surface.subscribe(move |event: &ConnectorEvent| {
            log::info!("{} on connector {}", event.kind.name(), event.target);
            sink.borrow_mut().push(event.clone());
        });

        let created = surface.apply(&scene.connectors, &registry)?;
        log::info!(
            "Scene ready: {} endpoints, {} connectors",
            endpoints.len(),
            created.len()
        );

        Ok(Self {
            surface,
            endpoints,
            events,
            outcomes: Vec::new(),
        })
    }

    /// Execute one script step.
    pub fn step(&mut self, step: &ScriptStep) -> WiringResult<()> {
        match step {
            ScriptStep::Pointer(event) => {
                if let Some(outcome) = self.surface.handle_pointer_event(*event) {
                    self.outcomes.push(outcome);
                }
            }
            ScriptStep::Input { endpoint, value } => {
                let target = self.endpoints.get(endpoint).ok_or_else(|| {
                    WiringError::Config(format!("Unknown endpoint: {}", endpoint))
                })?;
                if !target.input(value.clone()) {
                    log::warn!("Input on disabled endpoint {} ignored", endpoint);
                }
            }
            ScriptStep::Detach { connector } => {
                let id = self
                    .surface
                    .connector_by_name(connector)
                    .map(|c| c.id())
                    .ok_or_else(|| WiringError::UnknownConnector(connector.clone()))?;
                self.surface.detach(id)?;
            }
        }
        Ok(())
    }

    /// Snapshot endpoints, connectors, gesture outcomes and notifications.
    pub fn report(&self) -> Report {
        let endpoints = self
            .endpoints
            .iter()
            .map(|(name, endpoint)| {
                (
                    name.clone(),
                    EndpointState {
                        kind: endpoint.kind(),
                        value: endpoint.value(),
                        disabled: endpoint.disabled(),
                    },
                )
            })
            .collect();

        let connectors = self
            .surface
            .connectors()
            .iter()
            .map(|connector| ConnectorState {
                id: connector.id(),
                name: connector.name().ok(),
                value: connector.value(),
                connected: connector.connected(),
                peers: connector.peers().iter().map(display_name).collect(),
            })
            .collect();

        Report {
            endpoints,
            connectors,
            outcomes: self.outcomes.clone(),
            events: self.events.borrow().clone(),
        }
    }
}

fn display_name(connector: &Connector) -> String {
    connector
        .name()
        .unwrap_or_else(|_| connector.id().to_string())
}

/// Build the scene, replay every step and report the result.
pub fn run(scene: &Scene) -> WiringResult<Report> {
    let mut runner = Runner::new(scene)?;
    for (index, step) in scene.script.iter().enumerate() {
        log::debug!("Step {}: {:?}", index, step);
        runner.step(step)?;
    }
    Ok(runner.report())
}
