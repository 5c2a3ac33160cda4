//! Connected-component decomposition
//!
//! Components are found with an iterative depth-first search seeded in node
//! insertion order, then stably sorted by node count, largest first. Two
//! components of equal size therefore keep discovery order: the one holding
//! the earliest-inserted node comes first.

use crate::graph::{Coordinate, Graph};
use std::collections::HashMap;

/// Split `graph` into its connected components, largest first.
///
/// Every node lands in exactly one component; isolated nodes form
/// singleton components. Each component keeps the node and edge order of
/// the source graph. An empty graph yields no components.
pub fn partition(graph: &Graph) -> Vec<Graph> {
    let labels = label_components(graph);
    let component_count = labels.values().copied().max().map_or(0, |m| m + 1);

    let mut components: Vec<Graph> = (0..component_count).map(|_| Graph::new()).collect();
    for node in graph.nodes() {
        let label = labels[&node.coordinate];
        components[label].insert_node(node.clone());
    }
    for edge in graph.edges() {
        let label = labels[&edge.from];
        components[label].add_edge(edge.clone());
    }

    // stable: ties keep discovery order
    components.sort_by(|a, b| b.node_count().cmp(&a.node_count()));
    components
}

/// The first component `partition` would return
pub fn largest_component(graph: &Graph) -> Option<Graph> {
    partition(graph).into_iter().next()
}

/// Map each node to the index of its component, numbered in discovery order
fn label_components(graph: &Graph) -> HashMap<Coordinate, usize> {
    let mut adj: HashMap<Coordinate, Vec<Coordinate>> = HashMap::new();
    for edge in graph.edges() {
        adj.entry(edge.from).or_default().push(edge.to);
        adj.entry(edge.to).or_default().push(edge.from);
    }

    let mut labels: HashMap<Coordinate, usize> = HashMap::with_capacity(graph.node_count());
    let mut next_label = 0;

    for &seed in graph.coordinates() {
        if labels.contains_key(&seed) {
            continue;
        }

        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            if labels.contains_key(&current) {
                continue;
            }
            labels.insert(current, next_label);

            if let Some(neighbors) = adj.get(&current) {
                for neighbor in neighbors {
                    if !labels.contains_key(neighbor) {
                        stack.push(*neighbor);
                    }
                }
            }
        }

        next_label += 1;
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use std::collections::HashSet;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn chain(g: &mut Graph, points: &[(f64, f64)]) {
        for pair in points.windows(2) {
            g.add_edge(Edge::segment(pair[0].into(), pair[1].into()));
        }
    }

    #[test]
    fn empty_graph_has_no_components() {
        assert!(partition(&Graph::new()).is_empty());
        assert!(largest_component(&Graph::new()).is_none());
    }

    #[test]
    fn two_disjoint_lines_sorted_by_size() {
        let mut g = Graph::new();
        chain(&mut g, &[(100.0, 0.0), (101.0, 0.0)]);
        chain(
            &mut g,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)],
        );

        let parts = partition(&g);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].node_count(), 5);
        assert_eq!(parts[0].edge_count(), 4);
        assert_eq!(parts[1].node_count(), 2);
        assert_eq!(parts[1].edge_count(), 1);
    }

    #[test]
    fn isolated_points_are_singletons() {
        let mut g = Graph::new();
        g.add_node(c(5.0, 5.0));
        chain(&mut g, &[(0.0, 0.0), (1.0, 0.0)]);
        g.add_node(c(7.0, 7.0));

        let parts = partition(&g);
        let sizes: Vec<_> = parts.iter().map(Graph::node_count).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
        assert!(parts[1].contains_node(&c(5.0, 5.0)));
        assert!(parts[2].contains_node(&c(7.0, 7.0)));
    }

    #[test]
    fn equal_sizes_keep_insertion_order() {
        let mut g = Graph::new();
        chain(&mut g, &[(10.0, 0.0), (11.0, 0.0)]);
        chain(&mut g, &[(0.0, 0.0), (1.0, 0.0)]);
        chain(&mut g, &[(20.0, 0.0), (21.0, 0.0)]);

        let parts = partition(&g);
        let firsts: Vec<_> = parts
            .iter()
            .map(|p| *p.coordinates().next().unwrap())
            .collect();
        assert_eq!(firsts, vec![c(10.0, 0.0), c(0.0, 0.0), c(20.0, 0.0)]);
        assert_eq!(largest_component(&g).unwrap(), parts[0]);
    }

    #[test]
    fn components_cover_all_nodes_once() {
        let mut g = Graph::new();
        chain(&mut g, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        chain(&mut g, &[(1.0, 1.0), (0.0, 1.0)]);
        chain(&mut g, &[(5.0, 5.0), (6.0, 6.0)]);
        g.add_node(c(9.0, 9.0));

        let parts = partition(&g);
        let mut seen = HashSet::new();
        for part in &parts {
            for coord in part.coordinates() {
                assert!(seen.insert(*coord), "{} in two components", coord);
            }
        }
        let all: HashSet<_> = g.coordinates().copied().collect();
        assert_eq!(seen, all);
        assert_eq!(parts.iter().map(Graph::edge_count).sum::<usize>(), g.edge_count());
    }
}
