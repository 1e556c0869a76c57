use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Predecessor graph over item positions. Edges run predecessor -> dependent.
pub struct ItemDag {
    pub graph: DiGraph<usize, ()>,
    pub position_to_index: Vec<NodeIndex>,
    predecessors: Vec<Option<usize>>,
    unresolved: Vec<(usize, String)>,
}

impl ItemDag {
    /// Build from `(id, predecessor)` pairs in input order. A predecessor id
    /// resolves to the first item carrying it.
    pub fn build<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let items: Vec<(&str, Option<&str>)> = items.into_iter().collect();

        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let mut id_to_position: HashMap<&str, usize> = HashMap::new();
        let mut position_to_index = Vec::with_capacity(items.len());

        // Add nodes first
        for (position, (id, _)) in items.iter().enumerate() {
            position_to_index.push(graph.add_node(position));
            id_to_position.entry(*id).or_insert(position);
        }

        // Add edges: pred -> item
        let mut predecessors = Vec::with_capacity(items.len());
        let mut unresolved = Vec::new();
        for (position, (_, predecessor)) in items.iter().enumerate() {
            let resolved = match predecessor {
                Some(pred_id) => match id_to_position.get(pred_id) {
                    Some(&pred_position) => {
                        graph.add_edge(
                            position_to_index[pred_position],
                            position_to_index[position],
                            (),
                        );
                        Some(pred_position)
                    }
                    None => {
                        unresolved.push((position, pred_id.to_string()));
                        None
                    }
                },
                None => None,
            };
            predecessors.push(resolved);
        }

        Self {
            graph,
            position_to_index,
            predecessors,
            unresolved,
        }
    }

    pub fn predecessor_of(&self, position: usize) -> Option<usize> {
        self.predecessors.get(position).copied().flatten()
    }

    /// Items whose predecessor id matched nothing, with the dangling id.
    pub fn unresolved(&self) -> &[(usize, String)] {
        &self.unresolved
    }

    /// Strongly connected components in topological order, members sorted by position.
    pub fn components_in_order(&self) -> Vec<Vec<usize>> {
        // tarjan_scc yields components in reverse topological order
        let mut components: Vec<Vec<usize>> = tarjan_scc(&self.graph)
            .into_iter()
            .map(|component| {
                let mut positions: Vec<usize> =
                    component.into_iter().map(|ix| self.graph[ix]).collect();
                positions.sort_unstable();
                positions
            })
            .collect();
        components.reverse();
        components
    }

    /// A component is a cycle when it has several members or a self-dependency.
    pub fn is_cycle(&self, component: &[usize]) -> bool {
        match component {
            [single] => self.predecessor_of(*single) == Some(*single),
            _ => true,
        }
    }
}
