//! Deterministic force-directed layout
//!
//! Nodes start on a circle and the simulation runs for a fixed number of
//! steps, so identical graphs always get identical positions. The result
//! seeds the interactive view, which keeps simulating in the browser.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use kgraph_core::RenderableGraph;
use serde::Serialize;

/// Simulation settings
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub iterations: usize,
    /// Seconds advanced per step
    pub time_step: f32,
    /// Radius of the starting circle
    pub radius: f64,
    pub node_mass: f32,
    pub force_charge: f32,
    pub force_spring: f32,
    pub force_max: f32,
    pub node_speed: f32,
    pub damping_factor: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 300,
            time_step: 0.016,
            radius: 200.0,
            node_mass: 10.0,
            force_charge: 150.0,
            force_spring: 0.05,
            force_max: 100.0,
            node_speed: 3000.0,
            damping_factor: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Node positions keyed by node id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    positions: HashMap<String, Position>,
}

impl Layout {
    /// Run the simulation for `graph`
    pub fn compute(graph: &RenderableGraph, config: &LayoutConfig) -> Self {
        let nodes = graph.nodes();
        if nodes.is_empty() {
            return Self::default();
        }

        let mut simulation: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
            force_charge: config.force_charge,
            force_spring: config.force_spring,
            force_max: config.force_max,
            node_speed: config.node_speed,
            damping_factor: config.damping_factor,
        });

        let mut id_to_idx: HashMap<&str, DefaultNodeIdx> = HashMap::new();
        let mut idx_to_slot: HashMap<DefaultNodeIdx, usize> = HashMap::new();
        let mut start = Vec::with_capacity(nodes.len());

        for (slot, node) in nodes.iter().enumerate() {
            let position = circle_position(slot, nodes.len(), config.radius);
            start.push(position);
            let idx = simulation.add_node(NodeData {
                x: position.x as f32,
                y: position.y as f32,
                mass: config.node_mass,
                is_anchor: false,
                user_data: slot,
            });
            id_to_idx.insert(node.id.as_str(), idx);
            idx_to_slot.insert(idx, slot);
        }

        for edge in graph.edges() {
            if let (Some(&src), Some(&tgt)) = (
                id_to_idx.get(edge.source.as_str()),
                id_to_idx.get(edge.target.as_str()),
            ) {
                // Self-loops contribute no spring force
                if src != tgt {
                    simulation.add_edge(src, tgt, EdgeData::default());
                }
            }
        }

        for _ in 0..config.iterations {
            simulation.update(config.time_step);
        }

        let mut settled = start;
        simulation.visit_nodes(|node| {
            if let Some(&slot) = idx_to_slot.get(&node.index()) {
                let (x, y) = (node.x() as f64, node.y() as f64);
                if x.is_finite() && y.is_finite() {
                    settled[slot] = Position { x, y };
                }
            }
        });

        let positions = nodes
            .iter()
            .zip(settled)
            .map(|(node, position)| (node.id.clone(), position))
            .collect();

        Self { positions }
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn circle_position(slot: usize, count: usize, radius: f64) -> Position {
    let angle = (slot as f64) * 2.0 * PI / count as f64;
    Position {
        x: radius * angle.cos(),
        y: radius * angle.sin(),
    }
}
