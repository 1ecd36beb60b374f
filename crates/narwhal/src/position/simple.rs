use super::vertical_spacing;
use crate::config::Spacings;
use narwhal_graph::LGraph;

pub(super) fn place(graph: &mut LGraph, spacing: &Spacings) {
    let layers: Vec<Vec<_>> = graph.layers().iter().map(|l| l.nodes().to_vec()).collect();
    for nodes in layers {
        let mut cursor = 0.0;
        let mut previous = None;
        for n in nodes {
            if let Some(p) = previous {
                cursor += vertical_spacing(spacing, graph.node(p), graph.node(n));
            }
            let node = graph.node_mut(n);
            node.position.y = cursor + node.margin.top;
            cursor = node.position.y + node.size.height + node.margin.bottom;
            previous = Some(n);
        }
    }
}
