use narwhal_graph::{LGraph, NodeMap, Point, PortId, PortSide};

/// Spreads the free ports of every node evenly along their side, ordered by the in-layer index
/// of the node at the other end. Ports without edges go last.
pub fn distribute_ports(graph: &mut LGraph) {
    let mut index = NodeMap::new(graph, usize::MAX);
    for layer in graph.layers() {
        for (i, &n) in layer.nodes().iter().enumerate() {
            index[n] = i;
        }
    }

    let nodes: Vec<_> = graph.node_ids().collect();
    for node in nodes {
        let size = graph.node(node).size;
        for side in PortSide::ALL {
            let mut ports: Vec<(usize, PortId)> = graph
                .ports_on_side(node, side)
                .into_iter()
                .filter(|&p| !graph.port(p).fixed)
                .map(|p| {
                    let port = graph.port(p);
                    let key = port
                        .incoming()
                        .iter()
                        .chain(port.outgoing())
                        .map(|&e| index[graph.opposite(e, node)])
                        .min()
                        .unwrap_or(usize::MAX);
                    (key, p)
                })
                .collect();
            if ports.is_empty() {
                continue;
            }
            ports.sort_by_key(|&(key, p)| (key, p));

            let count = ports.len() as f64;
            for (i, &(_, p)) in ports.iter().enumerate() {
                let t = (i as f64 + 1.0) / (count + 1.0);
                let position = match side {
                    PortSide::North => Point::new(size.width * t, 0.0),
                    PortSide::South => Point::new(size.width * t, size.height),
                    PortSide::East => Point::new(size.width, size.height * t),
                    PortSide::West => Point::new(0.0, size.height * t),
                };
                let port = graph.port_mut(p);
                port.position = position;
                port.anchor = Point::default();
            }
        }
    }
}
