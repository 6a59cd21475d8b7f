//! The immutable command graph.
//!
//! Nodes and edges live in two arenas and refer to each other by index;
//! the graph is built once from the command table and never mutated again,
//! so it can be shared freely across parser instances.
//!
//! Construction walks each pattern byte by byte, reusing edges where
//! patterns share prefixes: a literal byte reuses the node's keyed edge, a
//! parameter marker reuses an existing edge of the same kind on the node
//! (widening its terminator set). Parameter edges are inserted at the
//! front of a node's ordered list so they win over the control fallback.

use std::sync::Arc;

use ahash::AHashMap;
use once_cell::sync::Lazy;

use crate::commands::{CHAR, COMMANDS, MULTI, NUM, TEXT};
use crate::edge::{Edge, EdgeId, EdgeKind, NodeId};
use crate::machine::Machine;
use crate::HandlerId;

#[derive(Debug)]
pub struct Node {
    /// Literal transitions, keyed by codepoint.
    pub(crate) edge_map: AHashMap<u32, EdgeId>,
    /// Non-literal transitions, tried in order after the map misses.
    pub(crate) edge_list: Vec<EdgeId>,
    /// Handler dispatched when the runtime lands here.
    pub(crate) leaf: Option<HandlerId>,
}

#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    root: NodeId,
}

static STANDARD: Lazy<Arc<Graph>> = Lazy::new(|| Arc::new(Graph::build(COMMANDS)));

impl Graph {
    /// The shared graph for the standard command table.
    pub fn standard() -> Arc<Graph> {
        STANDARD.clone()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub(crate) fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id as usize]
    }

    pub(crate) fn leaf_of(&self, id: NodeId) -> Option<HandlerId> {
        self.node(id).leaf
    }

    /// Find the edge accepting `c` at `node`: the keyed map first, then the
    /// ordered list.
    pub(crate) fn find_edge(&self, node: NodeId, st: &Machine, c: u32) -> Option<EdgeId> {
        let n = self.node(node);
        if let Some(&e) = n.edge_map.get(&c) {
            return Some(e);
        }
        n.edge_list
            .iter()
            .copied()
            .find(|&e| self.edge(e).matches(st, c))
    }

    fn build(commands: &[crate::commands::Command]) -> Graph {
        let mut b = Builder {
            nodes: Vec::new(),
            edges: Vec::new(),
            control_edge: 0,
        };

        // Root first so it gets index 0; its fallback list is rebuilt at
        // the end.
        b.nodes.push(Node {
            edge_map: AHashMap::new(),
            edge_list: Vec::new(),
            leaf: None,
        });

        // The shared control edge and its dispatch target.
        b.edges.push(Edge::new(EdgeKind::Control, 0));
        b.control_edge = 0;
        let control_target = b.new_node();
        b.nodes[control_target as usize].leaf = Some(HandlerId::Process);
        b.edges[b.control_edge as usize].next = control_target;

        for cmd in commands {
            b.add_command(cmd.pattern, cmd.handler);
        }

        // Anything that matched no command edge at the root is a printable
        // (or a lone control code): route it to the shared process leaf.
        let print_target = b.new_node();
        b.nodes[print_target as usize].leaf = Some(HandlerId::Process);
        let print_edge = b.push_edge(Edge::new(EdgeKind::Literal, print_target));
        b.nodes[0].edge_list.push(print_edge);

        Graph {
            nodes: b.nodes,
            edges: b.edges,
            root: 0,
        }
    }
}

struct Builder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    control_edge: EdgeId,
}

impl Builder {
    fn push_edge(&mut self, e: Edge) -> EdgeId {
        self.edges.push(e);
        (self.edges.len() - 1) as EdgeId
    }

    /// New interior node carrying the control fallback.
    fn new_node(&mut self) -> NodeId {
        self.nodes.push(Node {
            edge_map: AHashMap::new(),
            edge_list: vec![self.control_edge],
            leaf: None,
        });
        (self.nodes.len() - 1) as NodeId
    }

    fn add_literal_edge(&mut self, cur: NodeId, val: u32) -> NodeId {
        if let Some(&e) = self.nodes[cur as usize].edge_map.get(&val) {
            return self.edges[e as usize].next;
        }
        let node = self.new_node();
        let edge = self.push_edge(Edge::new(EdgeKind::Literal, node));
        self.nodes[cur as usize].edge_map.insert(val, edge);
        node
    }

    fn add_single_char_edge(&mut self, cur: NodeId, var: u8) -> NodeId {
        let node = self.new_node();
        let edge = self.push_edge(Edge::new(EdgeKind::SingleChar { var }, node));
        self.nodes[cur as usize].edge_list.insert(0, edge);
        node
    }

    /// Reuse or create a parameter edge of `kind` on `cur`, then hang the
    /// terminator off the edge's target as a literal.
    fn add_param_edge(&mut self, cur: NodeId, kind: EdgeKind, terminator: u32) -> NodeId {
        let existing = self.nodes[cur as usize]
            .edge_list
            .iter()
            .copied()
            .find(|&e| self.edges[e as usize].is_kind(&kind));
        let next = match existing {
            Some(e) => {
                self.edges[e as usize].add_terminator(terminator);
                self.edges[e as usize].next
            }
            None => {
                let node = self.new_node();
                let edge = self.push_edge(Edge::new(kind, node));
                self.nodes[cur as usize].edge_list.insert(0, edge);
                node
            }
        };
        self.add_literal_edge(next, terminator)
    }

    fn add_command(&mut self, pattern: &[u16], handler: HandlerId) {
        let mut cur: NodeId = 0;
        let mut var: u8 = 0;
        let mut i = 0;
        while i < pattern.len() {
            match pattern[i] {
                NUM => {
                    i += 1;
                    let term = pattern[i] as u32;
                    cur = self.add_param_edge(
                        cur,
                        EdgeKind::SingleNumeric {
                            var,
                            terminators: vec![term],
                        },
                        term,
                    );
                    var += 1;
                }
                MULTI => {
                    let separator = pattern[i + 1] as u32;
                    let term = pattern[i + 2] as u32;
                    i += 2;
                    cur = self.add_param_edge(
                        cur,
                        EdgeKind::MultiNumeric {
                            var,
                            separator,
                            terminators: vec![term],
                        },
                        term,
                    );
                    var += 1;
                }
                TEXT => {
                    i += 1;
                    let term = pattern[i] as u32;
                    cur = self.add_param_edge(
                        cur,
                        EdgeKind::SingleText {
                            var,
                            terminators: vec![term],
                        },
                        term,
                    );
                    var += 1;
                }
                CHAR => {
                    cur = self.add_single_char_edge(cur, var);
                    var += 1;
                }
                lit => {
                    cur = self.add_literal_edge(cur, lit as u32);
                }
            }
            i += 1;
        }
        debug_assert!(
            self.nodes[cur as usize].leaf.is_none(),
            "two commands share a full pattern"
        );
        self.nodes[cur as usize].leaf = Some(handler);
    }
}
