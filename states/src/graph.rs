use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::{Debug, Formatter},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError<T>
where
    T: Debug,
{
    #[error("Cycle detected in dependency graph, from {:?}", .0)]
    CycleDetected(DepRoute<T>),
    #[error("Duplicate edge detected in dependency graph, from {:?}", .0)]
    DuplicateEdge(DepRoute<T>),
}

pub struct DepRoute<T> {
    // first means the start node, last means the end node
    route: Vec<T>,
}

impl<T> DepRoute<T> {
    pub fn nodes(&self) -> &[T] {
        &self.route
    }
}

impl<T> Debug for DepRoute<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some((last, rest)) = self.route.split_last() else {
            return write!(f, "[]");
        };
        for item in rest {
            write!(f, "{item:?} -> ")?;
        }
        write!(f, "{last:?}")
    }
}

/// Directed dependency graph; an edge `from -> to` means `to` reads `from`.
#[derive(Debug)]
pub struct Graph<Node, Edge = ()>
where
    Node: Debug + PartialEq + Copy + Ord,
    Edge: Debug + PartialEq,
{
    nodes: BTreeSet<Node>,
    routes: Vec<(Node, Edge, Node)>,

    route_cache: BTreeMap<Node, BTreeSet<Node>>,
}

impl<Node, Edge> Default for Graph<Node, Edge>
where
    Node: Debug + PartialEq + Copy + Ord,
    Edge: Debug + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Node, Edge> Graph<Node, Edge>
where
    Node: Debug + PartialEq + Copy + Ord,
    Edge: Debug + PartialEq,
{
    pub fn new() -> Self {
        Self {
            nodes: BTreeSet::new(),
            routes: Vec::new(),
            route_cache: BTreeMap::new(),
        }
    }

    /// Register a node that may have no edges at all.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node);
    }

    pub fn route_to(&mut self, from: Node, to: Node, via: Edge) {
        self.nodes.insert(from);
        self.nodes.insert(to);
        self.routes.push((from, via, to));
        self.route_cache.clear();
    }

    fn in_degrees(&self) -> BTreeMap<Node, usize> {
        let mut degrees: BTreeMap<Node, usize> = self.nodes.iter().map(|n| (*n, 0)).collect();

        for (_from, _via, to) in &self.routes {
            *degrees.entry(*to).or_insert(0) += 1;
        }

        degrees
    }

    /// Kahn's algorithm. Ties are broken by node order so the result is deterministic.
    pub fn topology_sort(&self) -> Result<Vec<Node>, TopologyError<Node>> {
        let mut degrees = self.in_degrees();
        let mut order = Vec::with_capacity(degrees.len());

        while !degrees.is_empty() {
            let Some(node) = degrees
                .iter()
                .find(|(_, deg)| **deg == 0)
                .map(|(node, _)| *node)
            else {
                let keys: Vec<Node> = degrees.keys().copied().collect();
                let route = self.find_cycle(&keys).unwrap_or_default();
                return Err(TopologyError::CycleDetected(DepRoute { route }));
            };

            degrees.remove(&node);
            order.push(node);

            for connected in self.direct_connected_nodes(node)? {
                if let Some(deg) = degrees.get_mut(&connected) {
                    *deg -= 1;
                }
            }
        }

        Ok(order)
    }

    /// Closed route through the nodes left over by Kahn's algorithm.
    fn find_cycle(&self, remaining: &[Node]) -> Option<Vec<Node>> {
        let mut finished = BTreeSet::new();
        let mut path = Vec::new();
        remaining
            .iter()
            .find_map(|&start| self.walk_for_cycle(start, remaining, &mut path, &mut finished))
    }

    fn walk_for_cycle(
        &self,
        node: Node,
        remaining: &[Node],
        path: &mut Vec<Node>,
        finished: &mut BTreeSet<Node>,
    ) -> Option<Vec<Node>> {
        if let Some(pos) = path.iter().position(|n| *n == node) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(node);
            return Some(cycle);
        }
        if finished.contains(&node) {
            return None;
        }

        path.push(node);
        let next = self.direct_connected_nodes(node).unwrap_or_default();
        let found = next
            .into_iter()
            .filter(|n| remaining.contains(n))
            .find_map(|n| self.walk_for_cycle(n, remaining, path, finished));
        path.pop();
        finished.insert(node);
        found
    }

    /// Every node that transitively depends on `node`.
    pub fn connected(&mut self, node: Node) -> impl Iterator<Item = &Node> {
        self.route_cache
            .entry(node)
            .or_insert_with(|| connected_nodes(&self.routes, node))
            .iter()
    }

    fn direct_connected_nodes(&self, node: Node) -> Result<BTreeSet<Node>, TopologyError<Node>> {
        let mut collected = BTreeSet::new();

        for (from, _via, to) in &self.routes {
            if from == &node && !collected.insert(*to) {
                return Err(TopologyError::DuplicateEdge(DepRoute {
                    route: vec![node, *to],
                }));
            }
        }

        Ok(collected)
    }
}

fn connected_nodes<Node, Edge>(routes: &[(Node, Edge, Node)], node: Node) -> BTreeSet<Node>
where
    Node: PartialEq + Copy + Ord,
{
    let mut collected = BTreeSet::new();
    let mut queue = VecDeque::new();

    queue.push_back(node);

    while let Some(current) = queue.pop_front() {
        for (from, _via, to) in routes {
            // already-collected nodes are skipped, so a cycle cannot loop forever
            if from == &current && collected.insert(*to) {
                queue.push_back(*to);
            }
        }
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_sort_orders_dependencies_first() {
        let mut graph: Graph<u32, &str> = Graph::new();
        graph.route_to(1, 2, "edge_1_2");
        graph.route_to(2, 3, "edge_2_3");
        graph.route_to(1, 3, "edge_1_3");

        let order = graph.topology_sort().expect("acyclic graph sorts");
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn isolated_nodes_are_part_of_the_order() {
        let mut graph: Graph<u32> = Graph::new();
        graph.add_node(9);
        graph.route_to(1, 2, ());

        let order = graph.topology_sort().expect("acyclic graph sorts");
        assert_eq!(order.len(), 3, "all nodes should be ordered");
        assert!(order.contains(&9), "isolated node should be ordered");
    }

    #[test]
    fn cycle_is_reported_with_route() {
        let mut graph: Graph<u32, &str> = Graph::new();
        graph.route_to(1, 2, "edge_1_2");
        graph.route_to(2, 3, "edge_2_3");
        graph.route_to(3, 1, "edge_3_1");

        match graph.topology_sort() {
            Err(TopologyError::CycleDetected(dep_route)) => {
                assert_eq!(dep_route.nodes().len(), 4, "closed loop over three nodes");
                let err_str = TopologyError::CycleDetected(dep_route).to_string();
                assert!(err_str.contains("Cycle detected"));
                assert!(err_str.contains("->"));
            }
            other => panic!("Expected CycleDetected error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_edge_is_reported() {
        let mut graph: Graph<u32, &str> = Graph::new();
        graph.route_to(1, 2, "edge_1_2");
        graph.route_to(1, 2, "edge_1_2_dup");

        match graph.topology_sort() {
            Err(TopologyError::DuplicateEdge(dep_route)) => {
                assert_eq!(format!("{dep_route:?}"), "1 -> 2");
            }
            other => panic!("Expected DuplicateEdge error, got {other:?}"),
        }
    }

    #[test]
    fn connected_is_transitive_and_refreshes_after_new_routes() {
        let mut graph: Graph<u32> = Graph::new();
        graph.route_to(1, 2, ());
        graph.route_to(2, 3, ());
        assert_eq!(graph.connected(1).copied().collect::<Vec<_>>(), vec![2, 3]);

        graph.route_to(3, 4, ());
        assert_eq!(
            graph.connected(1).copied().collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
        assert_eq!(graph.connected(4).count(), 0);
    }
}
