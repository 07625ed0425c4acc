//! In-memory store for the mind-map collection.
//!
//! All mutations are synchronous; each one rewrites the whole collection
//! through the persistence seam. A save failure is logged and the in-memory
//! state stands, so the editor keeps working and the next mutation retries
//! the write.

use uuid::Uuid;

use super::{Edge, GraphPersistence, MindMapDocument, Node, NodeKind, Position};

/// Where the seed node of a fresh document lands.
const SEED_POSITION: Position = Position { x: 250.0, y: 150.0 };
const SEED_LABEL: &str = "Central idea";

pub struct MindMapStore {
    documents: Vec<MindMapDocument>,
    active_id: String,
    storage: Box<dyn GraphPersistence>,
}

fn seed_document(name: &str) -> MindMapDocument {
    MindMapDocument {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        nodes: vec![Node {
            id: Uuid::new_v4().to_string(),
            label: SEED_LABEL.to_string(),
            position: SEED_POSITION,
            kind: NodeKind::Editable,
        }],
        edges: Vec::new(),
    }
}

impl MindMapStore {
    /// Loads the stored collection, falling back to one seed document when
    /// the data is absent or malformed. The first document becomes active.
    pub fn open(storage: Box<dyn GraphPersistence>) -> Self {
        let documents = match storage.load() {
            Some(documents) if !documents.is_empty() => documents,
            _ => vec![seed_document("My mind map")],
        };
        let active_id = documents[0].id.clone();
        MindMapStore {
            documents,
            active_id,
            storage,
        }
    }

    pub fn documents(&self) -> &[MindMapDocument] {
        &self.documents
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active_document(&self) -> &MindMapDocument {
        // The store is never left without an active document.
        self.documents
            .iter()
            .find(|d| d.id == self.active_id)
            .unwrap_or(&self.documents[0])
    }

    pub fn set_active(&mut self, id: &str) {
        if self.documents.iter().any(|d| d.id == id) {
            self.active_id = id.to_string();
        }
    }

    /// Appends a new document with one seed node and makes it active.
    pub fn create_document(&mut self, name: &str) -> String {
        let document = seed_document(name);
        let id = document.id.clone();
        self.documents.push(document);
        self.active_id = id.clone();
        self.persist();
        id
    }

    pub fn rename_document(&mut self, id: &str, name: &str) {
        if let Some(document) = self.documents.iter_mut().find(|d| d.id == id) {
            document.name = name.to_string();
            self.persist();
        }
    }

    /// Removes a document. The previous document in the current ordering
    /// becomes active; if none remain a fresh seed document is created, so
    /// the store never holds zero documents.
    pub fn delete_document(&mut self, id: &str) {
        let Some(index) = self.documents.iter().position(|d| d.id == id) else {
            return;
        };
        self.documents.remove(index);

        if self.documents.is_empty() {
            self.documents.push(seed_document("My mind map"));
        }
        if self.active_id == id {
            let fallback = index.saturating_sub(1).min(self.documents.len() - 1);
            self.active_id = self.documents[fallback].id.clone();
        }
        self.persist();
    }

    /// Appends a node with a fresh identity to the active document and
    /// returns its id.
    pub fn add_node(&mut self, position: Position, label: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let node = Node {
            id: id.clone(),
            label: label.to_string(),
            position,
            kind: NodeKind::Editable,
        };
        self.active_mut().nodes.push(node);
        self.persist();
        id
    }

    /// Connects two existing nodes in the active document. Returns the new
    /// edge id, or `None` when an endpoint is missing or the ordered pair is
    /// already connected.
    pub fn connect(&mut self, source_id: &str, target_id: &str) -> Option<String> {
        let document = self.active_document();
        let both_exist = document.nodes.iter().any(|n| n.id == source_id)
            && document.nodes.iter().any(|n| n.id == target_id);
        if !both_exist {
            return None;
        }
        let duplicate = document
            .edges
            .iter()
            .any(|e| e.source == source_id && e.target == target_id);
        if duplicate {
            return None;
        }

        let id = Uuid::new_v4().to_string();
        self.active_mut().edges.push(Edge {
            id: id.clone(),
            source: source_id.to_string(),
            target: target_id.to_string(),
        });
        self.persist();
        Some(id)
    }

    /// Removes a node and, in the same operation, every edge whose source or
    /// target references it. No dangling edge ever survives this call.
    pub fn delete_node(&mut self, id: &str) {
        let document = self.active_mut();
        document.nodes.retain(|n| n.id != id);
        document.edges.retain(|e| e.source != id && e.target != id);
        self.persist();
    }

    pub fn delete_edge(&mut self, id: &str) {
        self.active_mut().edges.retain(|e| e.id != id);
        self.persist();
    }

    fn active_mut(&mut self) -> &mut MindMapDocument {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == self.active_id)
            .unwrap_or(0);
        &mut self.documents[index]
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.documents) {
            log::warn!("failed to persist mind-map collection: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mindmap::persistence::StorageError;
    use std::sync::{Arc, Mutex};

    /// In-memory persistence double. Captures every save so tests can assert
    /// on what would have hit disk.
    struct MemoryStorage {
        initial: Option<Vec<MindMapDocument>>,
        saved: Arc<Mutex<Vec<Vec<MindMapDocument>>>>,
    }

    impl MemoryStorage {
        fn empty() -> (Box<Self>, Arc<Mutex<Vec<Vec<MindMapDocument>>>>) {
            let saved = Arc::new(Mutex::new(Vec::new()));
            (
                Box::new(MemoryStorage {
                    initial: None,
                    saved: Arc::clone(&saved),
                }),
                saved,
            )
        }

        fn seeded(documents: Vec<MindMapDocument>) -> Box<Self> {
            Box::new(MemoryStorage {
                initial: Some(documents),
                saved: Arc::new(Mutex::new(Vec::new())),
            })
        }
    }

    impl GraphPersistence for MemoryStorage {
        fn load(&self) -> Option<Vec<MindMapDocument>> {
            self.initial.clone()
        }

        fn save(&self, documents: &[MindMapDocument]) -> Result<(), StorageError> {
            self.saved
                .lock()
                .expect("saved lock")
                .push(documents.to_vec());
            Ok(())
        }
    }

    fn empty_store() -> MindMapStore {
        MindMapStore::open(MemoryStorage::empty().0)
    }

    #[test]
    fn test_open_without_stored_data_seeds_one_document() {
        let store = empty_store();
        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.active_document().nodes.len(), 1);
        assert_eq!(store.active_document().nodes[0].position, SEED_POSITION);
    }

    #[test]
    fn test_open_with_stored_data_restores_collection() {
        let mut seeded = seed_document("Restored");
        seeded.id = "m1".to_string();
        let store = MindMapStore::open(MemoryStorage::seeded(vec![seeded]));
        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.active_document().name, "Restored");
        assert_eq!(store.active_id(), "m1");
    }

    #[test]
    fn test_delete_node_cascades_to_edges() {
        let mut store = empty_store();
        let n1 = store.active_document().nodes[0].id.clone();
        let n2 = store.add_node(Position { x: 100.0, y: 100.0 }, "n2");
        store.connect(&n1, &n2).expect("connect");

        store.delete_node(&n1);

        let document = store.active_document();
        assert_eq!(document.nodes.len(), 1);
        assert_eq!(document.nodes[0].id, n2);
        assert!(document.edges.is_empty(), "no dangling edges after delete");
    }

    #[test]
    fn test_connect_requires_both_endpoints() {
        let mut store = empty_store();
        let n1 = store.active_document().nodes[0].id.clone();
        assert!(store.connect(&n1, "missing").is_none());
        assert!(store.connect("missing", &n1).is_none());
        assert!(store.active_document().edges.is_empty());
    }

    #[test]
    fn test_duplicate_ordered_pair_is_rejected() {
        let mut store = empty_store();
        let n1 = store.active_document().nodes[0].id.clone();
        let n2 = store.add_node(Position { x: 50.0, y: 50.0 }, "n2");

        assert!(store.connect(&n1, &n2).is_some());
        assert!(store.connect(&n1, &n2).is_none());
        // The reverse direction is a different pair.
        assert!(store.connect(&n2, &n1).is_some());
        assert_eq!(store.active_document().edges.len(), 2);
    }

    #[test]
    fn test_delete_edge_removes_only_that_edge() {
        let mut store = empty_store();
        let n1 = store.active_document().nodes[0].id.clone();
        let n2 = store.add_node(Position { x: 10.0, y: 10.0 }, "n2");
        let n3 = store.add_node(Position { x: 20.0, y: 20.0 }, "n3");
        let e1 = store.connect(&n1, &n2).expect("edge 1");
        store.connect(&n1, &n3).expect("edge 2");

        store.delete_edge(&e1);
        assert_eq!(store.active_document().edges.len(), 1);
        assert_eq!(store.active_document().edges[0].target, n3);
    }

    #[test]
    fn test_delete_last_document_leaves_a_fresh_one() {
        let mut store = empty_store();
        let only = store.active_id().to_string();
        store.delete_document(&only);

        assert_eq!(store.documents().len(), 1);
        assert_ne!(store.documents()[0].id, only);
        assert_eq!(store.active_id(), store.documents()[0].id);
    }

    #[test]
    fn test_delete_active_document_reselects_previous() {
        let mut store = empty_store();
        let first = store.active_id().to_string();
        let second = store.create_document("Second");
        let third = store.create_document("Third");
        assert_eq!(store.active_id(), third);

        store.delete_document(&third);
        assert_eq!(store.active_id(), second);
        store.delete_document(&second);
        assert_eq!(store.active_id(), first);
    }

    #[test]
    fn test_every_mutation_persists_the_whole_collection() {
        let (storage, saved) = MemoryStorage::empty();
        let mut store = MindMapStore::open(storage);

        store.create_document("Plan");
        let n = store.add_node(Position { x: 1.0, y: 2.0 }, "step");
        store.delete_node(&n);

        let saved = saved.lock().expect("saved lock");
        assert_eq!(saved.len(), 3);
        // Each save carries every document, not just the active one.
        assert_eq!(saved.last().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_rename_document() {
        let mut store = empty_store();
        let id = store.active_id().to_string();
        store.rename_document(&id, "Renamed");
        assert_eq!(store.active_document().name, "Renamed");
    }
}
