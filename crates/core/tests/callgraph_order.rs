use std::collections::HashMap;

use namer_core::analysis::{bottom_up_order, CallGraph};

#[test]
fn call_chain_yields_callees_before_callers() {
    // sub_100 -> sub_200 -> sub_300, with sub_300 a leaf.
    let order = bottom_up_order([0x100, 0x200, 0x300], [(0x100, 0x200), (0x200, 0x300)]);
    assert_eq!(order, vec![0x300, 0x200, 0x100]);
}

#[test]
fn every_function_appears_exactly_once_including_isolated_nodes() {
    let nodes = [1u64, 2, 3, 4, 5];
    // 4 and 5 neither call nor are called.
    let order = bottom_up_order(nodes, [(1, 2), (2, 3)]);

    assert_eq!(order.len(), nodes.len());
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, nodes);
}

#[test]
fn recursive_cycle_terminates_and_emits_each_member_once() {
    // a -> b -> c -> a, plus a shared leaf.
    let order = bottom_up_order([10, 20, 30, 40], [(10, 20), (20, 30), (30, 10), (30, 40)]);

    assert_eq!(order.len(), 4);
    // The leaf is below the whole cycle, so it must come first.
    assert_eq!(order[0], 40);
}

#[test]
fn self_call_does_not_block_emission() {
    let order = bottom_up_order([7, 8], [(7, 7), (7, 8)]);
    assert_eq!(order, vec![8, 7]);
}

#[test]
fn acyclic_graph_orders_every_callee_before_its_caller() {
    let nodes = [1u64, 2, 3, 4, 5, 6];
    let edges = [(1u64, 2u64), (1, 3), (2, 4), (3, 4), (4, 5), (3, 6)];
    let order = bottom_up_order(nodes, edges);

    let position: HashMap<u64, usize> =
        order.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    for (caller, callee) in edges {
        assert!(
            position[&callee] < position[&caller],
            "callee {callee} must precede caller {caller} in {order:?}"
        );
    }
}

#[test]
fn edges_to_unknown_functions_are_ignored() {
    let mut graph = CallGraph::new();
    graph.add_node(1);
    graph.add_node(2);
    assert!(graph.add_edge(1, 2));
    // Callee outside the function collection (e.g., an import).
    assert!(!graph.add_edge(1, 999));
    assert!(!graph.add_edge(999, 1));

    assert_eq!(graph.post_order(), vec![2, 1]);
}

#[test]
fn duplicate_nodes_are_inserted_once() {
    let mut graph = CallGraph::new();
    graph.add_node(5);
    graph.add_node(5);
    assert_eq!(graph.len(), 1);
    assert_eq!(graph.post_order(), vec![5]);
}

#[test]
fn empty_graph_yields_empty_order() {
    let graph = CallGraph::new();
    assert!(graph.is_empty());
    assert!(graph.post_order().is_empty());
}
