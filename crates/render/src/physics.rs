//! Browser-side physics options embedded in the artifact

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Solver settings for the interactive view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub solver: String,
    pub gravitational_constant: f64,
    pub central_gravity: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
    /// Simulation stops once every node moves slower than this
    pub min_velocity: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            solver: "forceAtlas2Based".to_string(),
            gravitational_constant: -100.0,
            central_gravity: 0.01,
            spring_length: 200.0,
            spring_constant: 0.08,
            min_velocity: 0.75,
        }
    }
}

impl PhysicsConfig {
    /// The `physics` block of the view options
    pub fn to_options(&self) -> Value {
        let mut physics = serde_json::Map::new();
        physics.insert(
            self.solver.clone(),
            json!({
                "gravitationalConstant": self.gravitational_constant,
                "centralGravity": self.central_gravity,
                "springLength": self.spring_length,
                "springConstant": self.spring_constant,
            }),
        );
        physics.insert("minVelocity".into(), json!(self.min_velocity));
        physics.insert("solver".into(), json!(self.solver));
        Value::Object(physics)
    }
}
