//! Propagation graph.
//!
//! Nodes are connectors and host endpoints. Edges are `connector -> peer`,
//! `connector -> destination endpoint` and `source endpoint -> connector`
//! (the source subscription). A value change is pushed depth-first through
//! the connector edges in insertion order, each connector writing its
//! destination endpoint once its own peers are done. The walk runs on an
//! explicit stack with a per-walk visited set; nothing is batched or deferred.
//!
//! Cycles are not rejected. A connector reached twice within one walk
//! already holds the value and is skipped. Cycles that pass through endpoint
//! listeners start nested walks and are not detected.

use crate::connector::{Connector, ConnectorId};
use crate::endpoint::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A directed connector-to-connector edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: ConnectorId,
    pub destination: ConnectorId,
}

/// One connector on the walk stack.
struct Frame {
    connector: Connector,
    peers: Vec<Connector>,
    next: usize,
}

/// Push `value` from `origin` through the graph.
pub(crate) fn propagate(origin: &Connector, value: Value) {
    let mut visited: HashSet<ConnectorId> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    match enter(origin, &value, &mut visited) {
        Some(frame) => stack.push(frame),
        None => return,
    }

    loop {
        let next_peer = match stack.last_mut() {
            None => break,
            Some(frame) if frame.next < frame.peers.len() => {
                frame.next += 1;
                Some(frame.peers[frame.next - 1].clone())
            }
            Some(_) => None,
        };

        match next_peer {
            Some(peer) => {
                if let Some(frame) = enter(&peer, &value, &mut visited) {
                    stack.push(frame);
                }
            }
            None => {
                if let Some(done) = stack.pop() {
                    done.connector.deliver(&value);
                }
            }
        }
    }
}

/// Store `value` on `connector` and open a frame for its peers, unless the
/// connector already holds the value.
fn enter(
    connector: &Connector,
    value: &Value,
    visited: &mut HashSet<ConnectorId>,
) -> Option<Frame> {
    if connector.holds_value(value) {
        return None;
    }
    if !visited.insert(connector.id()) {
        log::warn!("Connector {} revisited during propagation", connector.label());
        return None;
    }
    log::debug!("Propagating {} into {}", value, connector.label());
    connector.store_value(value.clone());
    Some(Frame {
        connector: connector.clone(),
        peers: connector.peers(),
        next: 0,
    })
}

/// All edges leaving `connectors`, in connector order then insertion order.
pub fn edges<'a>(connectors: impl IntoIterator<Item = &'a Connector>) -> Vec<Edge> {
    connectors
        .into_iter()
        .flat_map(|connector| {
            let source = connector.id();
            connector.peers().into_iter().map(move |peer| Edge {
                source,
                destination: peer.id(),
            })
        })
        .collect()
}

/// Connectors reachable from `origin`, in the order a propagation would
/// first visit them. `origin` itself is excluded.
pub fn downstream(origin: &Connector) -> Vec<Connector> {
    let mut visited: HashSet<ConnectorId> = HashSet::new();
    visited.insert(origin.id());
    let mut order = Vec::new();
    let mut stack: Vec<Connector> = origin.peers().into_iter().rev().collect();

    while let Some(connector) = stack.pop() {
        if !visited.insert(connector.id()) {
            continue;
        }
        stack.extend(connector.peers().into_iter().rev());
        order.push(connector);
    }
    order
}
