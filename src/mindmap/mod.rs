//! Mind-map documents: small node/edge graphs kept fully in memory and
//! persisted wholesale as one JSON collection.
//!
//! Unlike the relational sync layer, graph consistency is enforced
//! synchronously: deleting a node removes every edge touching it in the same
//! operation, so a document can never hold a dangling edge.

mod persistence;
mod store;

pub use persistence::{FileStorage, GraphPersistence, StorageError};
pub use store::MindMapStore;

use serde::{Deserialize, Serialize};

/// A point in document (canvas) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The editor's current pan/zoom transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Every node created through the store is the single interactive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Editable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub position: Position,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapDocument {
    pub id: String,
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Converts a pointer coordinate into document space under the current
/// pan/zoom transform, for placing nodes from pointer interaction.
pub fn screen_to_canvas(pointer: Position, viewport: Viewport) -> Position {
    Position {
        x: (pointer.x - viewport.x) / viewport.zoom,
        y: (pointer.y - viewport.y) / viewport.zoom,
    }
}
