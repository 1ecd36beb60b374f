use narwhal_graph::{LGraph, NodeId, NodeMap};

/// Crossings between every pair of adjacent layers, from node order alone.
pub fn cross_count(graph: &LGraph) -> usize {
    let mut index = NodeMap::new(graph, 0usize);
    for layer in graph.layers() {
        for (i, &n) in layer.nodes().iter().enumerate() {
            index[n] = i;
        }
    }
    let layers = graph.layers();
    (1..layers.len())
        .map(|i| two_layer_cross_count(graph, &index, layers[i - 1].nodes(), layers[i].len()))
        .sum()
}

/// Bilayer accumulator-tree count (Barth, Jünger, Mutzel).
fn two_layer_cross_count(
    graph: &LGraph,
    index: &NodeMap<usize>,
    north: &[NodeId],
    south_len: usize,
) -> usize {
    if south_len == 0 {
        return 0;
    }

    let mut south_entries: Vec<usize> = Vec::new();
    for &v in north {
        let layer = graph.node(v).layer();
        let mut entries: Vec<usize> = graph
            .outgoing_edges(v)
            .into_iter()
            .map(|e| graph.target_node(e))
            .filter(|&w| graph.layer_index(w) == layer.map(|l| l.index() + 1))
            .map(|w| index[w])
            .collect();
        entries.sort_unstable();
        south_entries.extend(entries);
    }

    let mut first_index: usize = 1;
    while first_index < south_len {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree = vec![0usize; tree_size];

    let mut crossings = 0;
    for pos in south_entries {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut weight_sum = 0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        crossings += weight_sum;
    }
    crossings
}
