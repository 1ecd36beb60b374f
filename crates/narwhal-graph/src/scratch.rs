//! Dense per-phase scratch storage keyed by arena handles.
//!
//! A phase creates the maps it needs at its start (sized to the graph's arena) and drops them
//! when it returns. Removed elements keep their slot, so indexing never goes out of bounds for a
//! handle that came from the same graph.

use crate::graph::LGraph;
use crate::ids::{EdgeId, NodeId, PortId};
use std::ops::{Index, IndexMut};

macro_rules! scratch_map {
    ($name:ident, $id:ident, $capacity:ident) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<T> {
            values: Vec<T>,
        }

        impl<T: Clone> $name<T> {
            pub fn new(graph: &LGraph, init: T) -> Self {
                Self {
                    values: vec![init; graph.$capacity()],
                }
            }

            pub fn with_len(len: usize, init: T) -> Self {
                Self {
                    values: vec![init; len],
                }
            }

            pub fn fill(&mut self, value: T) {
                self.values.fill(value);
            }
        }

        impl<T> $name<T> {
            pub fn get(&self, id: $id) -> Option<&T> {
                self.values.get(id.index())
            }

            pub fn len(&self) -> usize {
                self.values.len()
            }

            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            pub fn iter(&self) -> impl Iterator<Item = ($id, &T)> + '_ {
                self.values
                    .iter()
                    .enumerate()
                    .map(|(ix, v)| ($id::from_index(ix), v))
            }
        }

        impl<T> Index<$id> for $name<T> {
            type Output = T;

            fn index(&self, id: $id) -> &T {
                &self.values[id.index()]
            }
        }

        impl<T> IndexMut<$id> for $name<T> {
            fn index_mut(&mut self, id: $id) -> &mut T {
                &mut self.values[id.index()]
            }
        }
    };
}

scratch_map!(NodeMap, NodeId, node_capacity);
scratch_map!(EdgeMap, EdgeId, edge_capacity);
scratch_map!(PortMap, PortId, port_capacity);
