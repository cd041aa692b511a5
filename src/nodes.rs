use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Descriptor de un nodo de backend, tal como llega por configuración
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub password: String,
}

/// Un nodo del backend de streaming con su carga actual
#[derive(Debug)]
pub struct Node {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub password: String,
    players: AtomicUsize,
    seq: usize,
}

impl Node {
    fn new(desc: NodeDescriptor, seq: usize) -> Self {
        Self {
            id: desc.id,
            host: desc.host,
            port: desc.port,
            password: desc.password,
            players: AtomicUsize::new(0),
            seq,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.load(Ordering::Relaxed)
    }

    /// Registra un player más sobre este nodo
    pub fn incr_players(&self) {
        self.players.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decr_players(&self) {
        let prev = self.players.fetch_sub(1, Ordering::Relaxed);
        debug_assert!(prev > 0, "decr_players sin players registrados");
    }
}

/// Pool de nodos compartido entre sesiones.
///
/// Colección inyectada y thread-safe: toda mutación pasa por `remove`,
/// que es idempotente porque varias sesiones pueden observar el mismo
/// nodo caído al mismo tiempo. Este componente nunca agrega nodos por
/// su cuenta.
pub struct NodePool {
    nodes: RwLock<Vec<Arc<Node>>>,
    next_seq: AtomicUsize,
}

impl NodePool {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(Vec::new()),
            next_seq: AtomicUsize::new(0),
        }
    }

    /// Construye el pool desde los descriptores de configuración
    pub fn from_descriptors(descriptors: Vec<NodeDescriptor>) -> Self {
        let pool = Self::new();
        for desc in descriptors {
            pool.add(desc);
        }
        pool
    }

    /// Registra un nodo; solo se usa durante el arranque
    pub fn add(&self, desc: NodeDescriptor) -> Arc<Node> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        info!("🎼 Nodo registrado: {} ({}:{})", desc.id, desc.host, desc.port);
        let node = Arc::new(Node::new(desc, seq));
        self.nodes.write().push(node.clone());
        node
    }

    /// Snapshot fresco de nodos vivos, ordenado por carga ascendente.
    /// Empates se resuelven por orden de registro.
    pub fn candidates(&self) -> Vec<Arc<Node>> {
        let mut snapshot: Vec<Arc<Node>> = self.nodes.read().iter().cloned().collect();
        snapshot.sort_by_key(|n| (n.player_count(), n.seq));
        snapshot
    }

    /// Saca un nodo de rotación de forma permanente. Idempotente:
    /// remover un id ausente es un no-op.
    pub fn remove(&self, node_id: &str) {
        let mut nodes = self.nodes.write();
        let before = nodes.len();
        nodes.retain(|n| n.id != node_id);
        if nodes.len() < before {
            warn!("⚠️ Nodo removido del pool: {}", node_id);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(id: &str) -> NodeDescriptor {
        NodeDescriptor {
            id: id.to_string(),
            host: "localhost".to_string(),
            port: 2333,
            password: "youshallnotpass".to_string(),
        }
    }

    #[test]
    fn test_candidates_sorted_by_load() {
        let pool = NodePool::new();
        let a = pool.add(desc("a"));
        let b = pool.add(desc("b"));
        let _c = pool.add(desc("c"));

        a.incr_players();
        a.incr_players();
        b.incr_players();

        let order: Vec<String> = pool.candidates().iter().map(|n| n.id.clone()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_candidates_ties_broken_by_registration_order() {
        let pool = NodePool::new();
        pool.add(desc("primero"));
        pool.add(desc("segundo"));
        pool.add(desc("tercero"));

        let order: Vec<String> = pool.candidates().iter().map(|n| n.id.clone()).collect();
        assert_eq!(order, vec!["primero", "segundo", "tercero"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let pool = NodePool::new();
        pool.add(desc("a"));
        pool.add(desc("b"));

        pool.remove("a");
        assert_eq!(pool.len(), 1);
        pool.remove("a");
        pool.remove("no-existe");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_candidates_is_fresh_snapshot() {
        let pool = NodePool::new();
        pool.add(desc("a"));
        let snapshot = pool.candidates();
        pool.remove("a");

        // El snapshot previo no se invalida
        assert_eq!(snapshot.len(), 1);
        assert!(pool.is_empty());
    }
}
