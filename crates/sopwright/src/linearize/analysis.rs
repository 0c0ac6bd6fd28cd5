//! Reachability and convergence points of a process graph.
//!
//! The flow graph gets one extra node, a virtual exit that every terminal
//! element flows into. The join of a split is its immediate post-dominator:
//! the first element every path from the split must pass through on its way
//! to the exit. Post-dominators are the dominators of the reversed graph
//! rooted at the exit.

use log::debug;
use petgraph::{
    algo::dominators,
    graph::{DiGraph, NodeIndex},
    visit::Bfs,
};

use sopwright_core::graph::ProcessGraph;

/// Reachability and join points, indexed by element position.
#[derive(Debug)]
pub(super) struct FlowAnalysis {
    reachable: Vec<bool>,
    joins: Vec<Option<usize>>,
}

impl FlowAnalysis {
    /// Analyzes `graph` once; elements are addressed by their document index.
    pub(super) fn new(graph: &ProcessGraph) -> Self {
        let count = graph.elements_count();
        let mut flow_graph: DiGraph<(), ()> =
            DiGraph::with_capacity(count + 1, graph.flows_count() + count);
        for _ in 0..count {
            flow_graph.add_node(());
        }
        let exit = flow_graph.add_node(());

        for (index, element) in graph.elements().enumerate() {
            let source = NodeIndex::new(index);
            let successors = graph
                .outgoing(element.id())
                .map(|flow| flow.target())
                .chain(graph.boundary_events(element.id()).map(|event| event.id()))
                .filter_map(|id| graph.element_index(id));

            let mut terminal = true;
            for target in successors {
                flow_graph.add_edge(source, NodeIndex::new(target), ());
                terminal = false;
            }
            if terminal {
                flow_graph.add_edge(source, exit, ());
            }
        }

        let mut reachable = vec![false; count];
        for start in graph.start_events() {
            let Some(index) = graph.element_index(start.id()) else {
                continue;
            };
            let mut bfs = Bfs::new(&flow_graph, NodeIndex::new(index));
            while let Some(node) = bfs.next(&flow_graph) {
                if node != exit {
                    reachable[node.index()] = true;
                }
            }
        }

        let mut reversed = flow_graph;
        reversed.reverse();
        let post_dominators = dominators::simple_fast(&reversed, exit);
        let joins: Vec<Option<usize>> = (0..count)
            .map(|index| {
                post_dominators
                    .immediate_dominator(NodeIndex::new(index))
                    .filter(|node| *node != exit)
                    .map(|node| node.index())
            })
            .collect();

        debug!(
            elements = count,
            reachable = reachable.iter().filter(|r| **r).count(),
            joins = joins.iter().flatten().count();
            "Flow analysis complete"
        );

        Self { reachable, joins }
    }

    pub(super) fn is_reachable(&self, index: usize) -> bool {
        self.reachable.get(index).copied().unwrap_or(false)
    }

    /// The element where all paths leaving `index` converge, if any.
    pub(super) fn join_of(&self, index: usize) -> Option<usize> {
        self.joins.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use sopwright_core::{
        element::{DiagramElement, ElementKind, SequenceFlow},
        graph::ProcessGraphBuilder,
    };

    use super::*;

    fn build(elements: &[(&str, ElementKind)], flows: &[(&str, &str)]) -> ProcessGraph {
        let mut builder = ProcessGraphBuilder::new();
        for (id, kind) in elements {
            builder
                .add_element(DiagramElement::new(*id, kind.clone()))
                .unwrap();
        }
        for (n, (source, target)) in flows.iter().enumerate() {
            builder
                .add_flow(SequenceFlow::new(format!("f{n}"), *source, *target))
                .unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_diamond_joins_at_merge() {
        let graph = build(
            &[
                ("s", ElementKind::StartEvent),
                ("g", ElementKind::ParallelGateway),
                ("a", ElementKind::Task),
                ("b", ElementKind::Task),
                ("m", ElementKind::ParallelGateway),
                ("e", ElementKind::EndEvent),
            ],
            &[("s", "g"), ("g", "a"), ("g", "b"), ("a", "m"), ("b", "m"), ("m", "e")],
        );
        let analysis = FlowAnalysis::new(&graph);

        assert_eq!(analysis.join_of(1), Some(4));
        assert_eq!(analysis.join_of(5), None);
        assert!((0..6).all(|i| analysis.is_reachable(i)));
    }

    #[test]
    fn test_separate_ends_have_no_join() {
        let graph = build(
            &[
                ("s", ElementKind::StartEvent),
                ("g", ElementKind::ExclusiveGateway),
                ("e1", ElementKind::EndEvent),
                ("e2", ElementKind::EndEvent),
            ],
            &[("s", "g"), ("g", "e1"), ("g", "e2")],
        );

        assert_eq!(FlowAnalysis::new(&graph).join_of(1), None);
    }

    #[test]
    fn test_unreachable_island() {
        let graph = build(
            &[
                ("s", ElementKind::StartEvent),
                ("e", ElementKind::EndEvent),
                ("island", ElementKind::Task),
            ],
            &[("s", "e")],
        );
        let analysis = FlowAnalysis::new(&graph);

        assert!(analysis.is_reachable(1));
        assert!(!analysis.is_reachable(2));
    }

    #[test]
    fn test_loop_exit_post_dominates() {
        let graph = build(
            &[
                ("s", ElementKind::StartEvent),
                ("work", ElementKind::Task),
                ("check", ElementKind::ExclusiveGateway),
                ("e", ElementKind::EndEvent),
            ],
            &[("s", "work"), ("work", "check"), ("check", "work"), ("check", "e")],
        );

        assert_eq!(FlowAnalysis::new(&graph).join_of(2), Some(3));
    }
}
