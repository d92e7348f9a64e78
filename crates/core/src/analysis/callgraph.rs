//! Owned adjacency-list call graph with an iterative post-order traversal.
//!
//! Deliberately minimal: node ids are function addresses, edges are
//! caller -> callee pairs, and the one traversal we need is depth-first
//! post-order over every node. The traversal uses an explicit stack so deep
//! call chains cannot overflow the thread stack.

use std::collections::HashMap;

/// Directed call graph over function addresses.
///
/// Every function in a binary appears as a node, even when it neither calls
/// nor is called. Edges whose endpoints are unknown (e.g., calls into
/// imports that are not part of the function collection) are ignored.
#[derive(Debug, Default)]
pub struct CallGraph {
    ids: Vec<u64>,
    index: HashMap<u64, usize>,
    successors: Vec<Vec<usize>>,
}

#[derive(Clone, Copy, PartialEq)]
enum VisitState {
    New,
    Open,
    Done,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a node collection and caller -> callee pairs.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = u64>,
        edges: impl IntoIterator<Item = (u64, u64)>,
    ) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        for (caller, callee) in edges {
            graph.add_edge(caller, callee);
        }
        graph
    }

    /// Insert a node if not already present.
    pub fn add_node(&mut self, id: u64) {
        if let std::collections::hash_map::Entry::Vacant(entry) = self.index.entry(id) {
            entry.insert(self.ids.len());
            self.ids.push(id);
            self.successors.push(Vec::new());
        }
    }

    /// Insert a caller -> callee edge. Returns false (and does nothing) when
    /// either endpoint is not a known node.
    pub fn add_edge(&mut self, caller: u64, callee: u64) -> bool {
        match (self.index.get(&caller), self.index.get(&callee)) {
            (Some(&from), Some(&to)) => {
                self.successors[from].push(to);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Depth-first post-order over all nodes: every node exactly once, each
    /// emitted only after all of its successors.
    ///
    /// Roots are tried in node insertion order, already-visited nodes are
    /// skipped, so the relative order of unrelated functions is stable but
    /// carries no meaning. Cycles are handled by never re-entering a node
    /// that is already on the stack; a member of a cycle is emitted when the
    /// traversal closes the cycle. Self-calls do not block emission.
    pub fn post_order(&self) -> Vec<u64> {
        let n = self.ids.len();
        let mut state = vec![VisitState::New; n];
        let mut order = Vec::with_capacity(n);
        // (node, index of the next successor to visit)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if state[root] != VisitState::New {
                continue;
            }
            state[root] = VisitState::Open;
            stack.push((root, 0));

            while let Some((node, cursor)) = stack.last_mut() {
                let node = *node;
                match self.successors[node].get(*cursor) {
                    Some(&succ) => {
                        *cursor += 1;
                        if state[succ] == VisitState::New {
                            state[succ] = VisitState::Open;
                            stack.push((succ, 0));
                        }
                    }
                    None => {
                        state[node] = VisitState::Done;
                        order.push(self.ids[node]);
                        stack.pop();
                    }
                }
            }
        }

        order
    }
}

/// Convenience wrapper: build the graph and return the bottom-up order in
/// one call.
pub fn bottom_up_order(
    nodes: impl IntoIterator<Item = u64>,
    edges: impl IntoIterator<Item = (u64, u64)>,
) -> Vec<u64> {
    CallGraph::from_edges(nodes, edges).post_order()
}
