//! The [`LGraph`] container.
//!
//! All mutations keep the port incidence lists in sync with edge endpoints. Removal only marks
//! entries, so handles stay valid and scratch maps sized by `*_capacity()` keep working.

use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::ids::{EdgeId, LayerId, NodeId, PortId};
use rustc_hash::FxBuildHasher;

mod entries;

pub use entries::{Edge, Layer, Node, NodeKind, Port, PortSide};
use entries::EdgeState;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Default)]
pub struct LGraph {
    nodes: Vec<Node>,
    ports: Vec<Port>,
    edges: Vec<Edge>,
    layers: Vec<Layer>,
    name_index: HashMap<String, NodeId>,
    /// Bounding box of the drawing after layout.
    pub size: Size,
}

impl LGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------------------------
    // Nodes

    pub fn add_node(&mut self, name: impl Into<String>, size: Size) -> NodeId {
        let name = name.into();
        let id = NodeId::from_index(self.nodes.len());
        self.name_index.entry(name.clone()).or_insert(id);
        self.nodes.push(Node {
            name,
            kind: NodeKind::Normal,
            size,
            margin: Default::default(),
            position: Point::default(),
            input_position: None,
            ports: Vec::new(),
            layer: None,
            removed: false,
        });
        id
    }

    /// Adds a zero-size node of the given kind. Dummies are not registered in the name index.
    pub fn add_dummy(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            name: format!("_d{}", id.index()),
            kind,
            size: Size::default(),
            margin: Default::default(),
            position: Point::default(),
            input_position: None,
            ports: Vec::new(),
            layer: None,
            removed: false,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Live nodes in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.removed)
            .map(|(ix, _)| NodeId::from_index(ix))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.removed).count()
    }

    pub fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Removes a node together with its ports. All incident edges must already be removed or
    /// hidden.
    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(layer) = self.nodes[id.index()].layer.take() {
            self.layers[layer.index()].nodes.retain(|&n| n != id);
        }
        self.nodes[id.index()].removed = true;
    }

    // ---------------------------------------------------------------------------------------
    // Ports

    /// Adds a free port; its position is decided during layout.
    pub fn add_port(&mut self, node: NodeId, side: PortSide) -> PortId {
        self.push_port(node, side, Point::default(), false)
    }

    pub fn add_fixed_port(&mut self, node: NodeId, side: PortSide, position: Point) -> PortId {
        self.push_port(node, side, position, true)
    }

    fn push_port(&mut self, node: NodeId, side: PortSide, position: Point, fixed: bool) -> PortId {
        let id = PortId::from_index(self.ports.len());
        self.ports.push(Port {
            node,
            side,
            position,
            anchor: Point::default(),
            fixed,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        });
        self.nodes[node.index()].ports.push(id);
        id
    }

    pub fn port(&self, id: PortId) -> &Port {
        &self.ports[id.index()]
    }

    pub fn port_mut(&mut self, id: PortId) -> &mut Port {
        &mut self.ports[id.index()]
    }

    pub fn port_capacity(&self) -> usize {
        self.ports.len()
    }

    pub fn ports_of(&self, node: NodeId) -> &[PortId] {
        &self.nodes[node.index()].ports
    }

    pub fn ports_on_side(&self, node: NodeId, side: PortSide) -> Vec<PortId> {
        self.ports_of(node)
            .iter()
            .copied()
            .filter(|&p| self.ports[p.index()].side == side)
            .collect()
    }

    pub fn port_absolute_anchor(&self, id: PortId) -> Point {
        let port = &self.ports[id.index()];
        self.nodes[port.node.index()].position + port.position + port.anchor
    }

    // ---------------------------------------------------------------------------------------
    // Edges

    pub fn add_edge(&mut self, source: PortId, target: PortId) -> EdgeId {
        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(Edge {
            source,
            target,
            weight: 1.0,
            priority: 0,
            delta: 1,
            reversed: false,
            bend_points: Vec::new(),
            junction_points: Vec::new(),
            state: EdgeState::Active,
        });
        // Foreign handles are kept as-is and reported by `validate`.
        if let Some(p) = self.ports.get_mut(source.index()) {
            p.outgoing.push(id);
        }
        if let Some(p) = self.ports.get_mut(target.index()) {
            p.incoming.push(id);
        }
        id
    }

    /// Connects two nodes through fresh free ports: East on the source, West on the target.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        let sp = self.add_port(source, PortSide::East);
        let tp = self.add_port(target, PortSide::West);
        self.add_edge(sp, tp)
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    /// Active edges in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.state == EdgeState::Active)
            .map(|(ix, _)| EdgeId::from_index(ix))
    }

    pub fn edge_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|e| e.state == EdgeState::Active)
            .count()
    }

    pub fn edge_capacity(&self) -> usize {
        self.edges.len()
    }

    pub fn source_node(&self, edge: EdgeId) -> NodeId {
        self.ports[self.edges[edge.index()].source.index()].node
    }

    pub fn target_node(&self, edge: EdgeId) -> NodeId {
        self.ports[self.edges[edge.index()].target.index()].node
    }

    pub fn is_self_loop(&self, edge: EdgeId) -> bool {
        self.source_node(edge) == self.target_node(edge)
    }

    /// The endpoint of `edge` that is not `node`.
    pub fn opposite(&self, edge: EdgeId, node: NodeId) -> NodeId {
        let s = self.source_node(edge);
        if s == node { self.target_node(edge) } else { s }
    }

    /// Active outgoing edges of a node, in port order.
    pub fn outgoing_edges(&self, node: NodeId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        for &p in &self.nodes[node.index()].ports {
            out.extend_from_slice(&self.ports[p.index()].outgoing);
        }
        out
    }

    /// Active incoming edges of a node, in port order.
    pub fn incoming_edges(&self, node: NodeId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        for &p in &self.nodes[node.index()].ports {
            out.extend_from_slice(&self.ports[p.index()].incoming);
        }
        out
    }

    pub fn connected_edges(&self, node: NodeId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        for &p in &self.nodes[node.index()].ports {
            let port = &self.ports[p.index()];
            out.extend_from_slice(&port.incoming);
            out.extend(port.outgoing.iter().copied().filter(|e| !port.incoming.contains(e)));
        }
        out
    }

    pub fn set_source(&mut self, edge: EdgeId, port: PortId) {
        let old = self.edges[edge.index()].source;
        if self.edges[edge.index()].state == EdgeState::Active {
            self.ports[old.index()].outgoing.retain(|&e| e != edge);
            self.ports[port.index()].outgoing.push(edge);
        }
        self.edges[edge.index()].source = port;
    }

    pub fn set_target(&mut self, edge: EdgeId, port: PortId) {
        let old = self.edges[edge.index()].target;
        if self.edges[edge.index()].state == EdgeState::Active {
            self.ports[old.index()].incoming.retain(|&e| e != edge);
            self.ports[port.index()].incoming.push(edge);
        }
        self.edges[edge.index()].target = port;
    }

    /// Swaps the endpoints of an edge and toggles its `reversed` flag.
    ///
    /// With `adapt_ports`, each end moves to a port on the opposite side so that outgoing edges
    /// keep leaving through East ports. A free port used only by this edge is flipped in place;
    /// otherwise a new free port is created.
    pub fn reverse_edge(&mut self, edge: EdgeId, adapt_ports: bool) {
        let (source, target) = {
            let e = &self.edges[edge.index()];
            (e.source, e.target)
        };
        let (new_source, new_target) = if adapt_ports {
            (self.flipped_port(target, edge), self.flipped_port(source, edge))
        } else {
            (target, source)
        };

        if self.edges[edge.index()].state == EdgeState::Active {
            self.ports[source.index()].outgoing.retain(|&e| e != edge);
            self.ports[target.index()].incoming.retain(|&e| e != edge);
            self.ports[new_source.index()].outgoing.push(edge);
            self.ports[new_target.index()].incoming.push(edge);
        }

        let e = &mut self.edges[edge.index()];
        e.source = new_source;
        e.target = new_target;
        e.reversed = !e.reversed;
        e.bend_points.reverse();
        e.junction_points.reverse();
    }

    fn flipped_port(&mut self, port: PortId, edge: EdgeId) -> PortId {
        let p = &self.ports[port.index()];
        let side = p.side.opposed();
        let exclusive = !p.fixed
            && p.incoming.iter().chain(p.outgoing.iter()).all(|&e| e == edge);
        if exclusive {
            self.ports[port.index()].side = side;
            port
        } else {
            let node = p.node;
            self.add_port(node, side)
        }
    }

    /// Detaches an edge from its ports but keeps it for [`restore_edge`](Self::restore_edge).
    pub fn hide_edge(&mut self, edge: EdgeId) {
        if self.edges[edge.index()].state != EdgeState::Active {
            return;
        }
        self.detach(edge);
        self.edges[edge.index()].state = EdgeState::Hidden;
    }

    pub fn restore_edge(&mut self, edge: EdgeId) {
        if self.edges[edge.index()].state != EdgeState::Hidden {
            return;
        }
        let (s, t) = {
            let e = &self.edges[edge.index()];
            (e.source, e.target)
        };
        self.ports[s.index()].outgoing.push(edge);
        self.ports[t.index()].incoming.push(edge);
        self.edges[edge.index()].state = EdgeState::Active;
    }

    pub fn remove_edge(&mut self, edge: EdgeId) {
        if self.edges[edge.index()].state == EdgeState::Active {
            self.detach(edge);
        }
        self.edges[edge.index()].state = EdgeState::Removed;
    }

    fn detach(&mut self, edge: EdgeId) {
        let (s, t) = {
            let e = &self.edges[edge.index()];
            (e.source, e.target)
        };
        self.ports[s.index()].outgoing.retain(|&e| e != edge);
        self.ports[t.index()].incoming.retain(|&e| e != edge);
    }

    // ---------------------------------------------------------------------------------------
    // Layers

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.index()]
    }

    pub fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        &mut self.layers[id.index()]
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        (0..self.layers.len()).map(LayerId::from_index)
    }

    pub fn add_layer(&mut self) -> LayerId {
        self.layers.push(Layer::default());
        LayerId::from_index(self.layers.len() - 1)
    }

    /// Appends `node` to `layer`, detaching it from its previous layer.
    pub fn assign_layer(&mut self, node: NodeId, layer: LayerId) {
        if let Some(prev) = self.nodes[node.index()].layer {
            self.layers[prev.index()].nodes.retain(|&n| n != node);
        }
        self.layers[layer.index()].nodes.push(node);
        self.nodes[node.index()].layer = Some(layer);
    }

    /// Inserts `node` into `layer` at `index`.
    pub fn insert_into_layer(&mut self, node: NodeId, layer: LayerId, index: usize) {
        if let Some(prev) = self.nodes[node.index()].layer {
            self.layers[prev.index()].nodes.retain(|&n| n != node);
        }
        let nodes = &mut self.layers[layer.index()].nodes;
        let index = index.min(nodes.len());
        nodes.insert(index, node);
        self.nodes[node.index()].layer = Some(layer);
    }

    /// Replaces the order of a layer. `order` must be a permutation of the layer's nodes.
    pub fn set_layer_order(&mut self, layer: LayerId, order: Vec<NodeId>) {
        debug_assert_eq!(order.len(), self.layers[layer.index()].nodes.len());
        self.layers[layer.index()].nodes = order;
    }

    pub fn clear_layers(&mut self) {
        for layer in self.layers.drain(..) {
            for n in layer.nodes {
                self.nodes[n.index()].layer = None;
            }
        }
    }

    /// Live nodes not assigned to any layer.
    pub fn layerless_nodes(&self) -> Vec<NodeId> {
        self.node_ids()
            .filter(|&n| self.nodes[n.index()].layer.is_none())
            .collect()
    }

    pub fn layer_index(&self, node: NodeId) -> Option<usize> {
        self.nodes[node.index()].layer.map(LayerId::index)
    }

    // ---------------------------------------------------------------------------------------
    // Validation

    /// Checks the structural contract the layout phases rely on.
    pub fn validate(&self) -> Result<()> {
        for (ix, port) in self.ports.iter().enumerate() {
            let Some(node) = self.nodes.get(port.node.index()) else {
                return Err(Error::UnknownNode {
                    port: PortId::from_index(ix),
                    node: port.node,
                });
            };
            if node.removed && port.degree() > 0 {
                let edge = port.incoming.iter().chain(&port.outgoing).copied().next();
                if let Some(edge) = edge {
                    return Err(Error::DisconnectedEndpoint {
                        edge,
                        node: port.node,
                    });
                }
            }
        }
        for id in self.edge_ids() {
            let e = &self.edges[id.index()];
            for port in [e.source, e.target] {
                if port.index() >= self.ports.len() {
                    return Err(Error::DanglingEdge { edge: id, port });
                }
            }
            if self.is_self_loop(id) {
                continue;
            }
            if !e.weight.is_finite() || e.weight < 0.0 {
                return Err(Error::InvalidWeight {
                    edge: id,
                    weight: e.weight,
                });
            }
            if e.delta < 1 || i32::try_from(e.delta).is_err() {
                return Err(Error::InvalidDelta {
                    edge: id,
                    delta: e.delta,
                });
            }
        }
        for id in self.node_ids() {
            let size = self.nodes[id.index()].size;
            let ok = size.width.is_finite()
                && size.height.is_finite()
                && size.width >= 0.0
                && size.height >= 0.0;
            if !ok {
                return Err(Error::InvalidSize {
                    node: id,
                    width: size.width,
                    height: size.height,
                });
            }
        }
        Ok(())
    }
}
