//! Interactive network document

use std::collections::{HashMap, HashSet};

use kgraph_core::{RenderEdge, RenderNode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::layout::Position;
use crate::physics::PhysicsConfig;
use crate::{RenderError, Result};

const COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const VIS_NETWORK_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/vis-network/9.1.2/dist/vis-network.min.js";
const VIS_NETWORK_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/vis-network/9.1.2/dist/dist/vis-network.min.css";

/// Canvas appearance
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOptions {
    pub height: String,
    pub width: String,
    pub directed: bool,
    pub bgcolor: String,
    pub font_color: String,
    /// Show the group filter above the canvas
    pub filter_menu: bool,
    pub heading: Option<String>,
    pub script_url: String,
    pub stylesheet_url: String,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            height: "1200px".to_string(),
            width: "100%".to_string(),
            directed: true,
            bgcolor: "#222222".to_string(),
            font_color: "white".to_string(),
            filter_menu: true,
            heading: None,
            script_url: VIS_NETWORK_JS.to_string(),
            stylesheet_url: VIS_NETWORK_CSS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct NetworkNode {
    id: String,
    label: String,
    title: String,
    group: String,
    color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct NetworkEdge {
    from: String,
    to: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arrows: Option<&'static str>,
}

/// Nodes and edges accumulated for one artifact
#[derive(Debug, Clone)]
pub struct Network {
    options: NetworkOptions,
    physics: PhysicsConfig,
    nodes: Vec<NetworkNode>,
    edges: Vec<NetworkEdge>,
    node_ids: HashSet<String>,
    group_colors: HashMap<String, String>,
    groups: Vec<String>,
}

impl Network {
    pub fn new(options: NetworkOptions, physics: PhysicsConfig) -> Self {
        Self {
            options,
            physics,
            nodes: Vec::new(),
            edges: Vec::new(),
            node_ids: HashSet::new(),
            group_colors: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Fix legend order and colours up front
    pub fn register_groups<'a>(&mut self, groups: impl IntoIterator<Item = &'a str>) {
        for group in groups {
            self.color_for(group);
        }
    }

    /// Add a node; rejects blank labels and repeated ids
    pub fn add_node(&mut self, node: &RenderNode, position: Option<Position>) -> Result<()> {
        if node.id.trim().is_empty() || node.label.trim().is_empty() {
            return Err(RenderError::Element(format!(
                "node {:?} has an empty label",
                node.id
            )));
        }
        if self.node_ids.contains(&node.id) {
            return Err(RenderError::Element(format!("duplicate node {}", node.id)));
        }

        let color = self.color_for(&node.group);
        self.node_ids.insert(node.id.clone());
        self.nodes.push(NetworkNode {
            id: node.id.clone(),
            label: node.label.clone(),
            title: node.title.clone(),
            group: node.group.clone(),
            color,
            x: position.map(|p| p.x),
            y: position.map(|p| p.y),
        });
        Ok(())
    }

    /// Add an edge; both endpoints must already be in the network
    pub fn add_edge(&mut self, edge: &RenderEdge) -> Result<()> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.node_ids.contains(endpoint) {
                return Err(RenderError::Element(format!(
                    "edge {} -> {} references missing node {:?}",
                    edge.source, edge.target, endpoint
                )));
            }
        }

        self.edges.push(NetworkEdge {
            from: edge.source.clone(),
            to: edge.target.clone(),
            label: edge.label.clone(),
            arrows: self.options.directed.then_some("to"),
        });
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Options object handed to the view
    pub fn view_options(&self) -> Value {
        json!({
            "nodes": {
                "shape": "dot",
                "size": 16,
                "font": { "color": self.options.font_color },
            },
            "edges": {
                "font": { "color": self.options.font_color, "strokeWidth": 0, "align": "middle" },
                "smooth": { "type": "dynamic" },
            },
            "interaction": { "hover": true, "navigationButtons": false },
            "physics": self.physics.to_options(),
        })
    }

    /// Render the complete HTML document
    pub fn to_html(&self) -> Result<String> {
        let nodes = script_json(&serde_json::to_string(&self.nodes)?);
        let edges = script_json(&serde_json::to_string(&self.edges)?);
        let options = script_json(&serde_json::to_string(&self.view_options())?);
        let legend = script_json(&serde_json::to_string(&self.legend())?);

        let heading = self
            .options
            .heading
            .as_deref()
            .map(|h| format!("<h1>{}</h1>\n", escape_html(h)))
            .unwrap_or_default();

        let filter = if self.options.filter_menu {
            FILTER_MENU_HTML
        } else {
            ""
        };

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<link rel="stylesheet" href="{stylesheet}">
<script type="text/javascript" src="{script}"></script>
<style type="text/css">
body {{ margin: 0; background-color: {bgcolor}; color: {font_color}; font-family: sans-serif; }}
#mynetwork {{ width: {width}; height: {height}; background-color: {bgcolor}; position: relative; }}
#filter-menu {{ padding: 8px; }}
#legend span {{ display: inline-block; margin-right: 12px; }}
#legend i {{ display: inline-block; width: 10px; height: 10px; border-radius: 5px; margin-right: 4px; }}
</style>
</head>
<body>
{heading}{filter}<div id="mynetwork"></div>
<script type="text/javascript">
var nodes = new vis.DataSet({nodes});
var edges = new vis.DataSet({edges});
var legend = {legend};
var options = {options};
var container = document.getElementById("mynetwork");
var network = new vis.Network(container, {{ nodes: nodes, edges: edges }}, options);
{filter_script}
</script>
</body>
</html>
"#,
            stylesheet = escape_html(&self.options.stylesheet_url),
            script = escape_html(&self.options.script_url),
            bgcolor = css_value(&self.options.bgcolor),
            font_color = css_value(&self.options.font_color),
            width = css_value(&self.options.width),
            height = css_value(&self.options.height),
            filter_script = if self.options.filter_menu {
                FILTER_MENU_SCRIPT
            } else {
                ""
            },
        ))
    }

    fn legend(&self) -> Vec<Value> {
        self.groups
            .iter()
            .map(|group| json!({ "group": group, "color": self.group_colors[group] }))
            .collect()
    }

    fn color_for(&mut self, group: &str) -> String {
        if let Some(color) = self.group_colors.get(group) {
            return color.clone();
        }
        let color = COLORS[self.groups.len() % COLORS.len()].to_string();
        self.groups.push(group.to_string());
        self.group_colors.insert(group.to_string(), color.clone());
        color
    }
}

const FILTER_MENU_HTML: &str = r#"<div id="filter-menu">
<label for="group-filter">Filter by type</label>
<select id="group-filter"><option value="">All</option></select>
<div id="legend"></div>
</div>
"#;

const FILTER_MENU_SCRIPT: &str = r#"var select = document.getElementById("group-filter");
var legendBox = document.getElementById("legend");
legend.forEach(function (entry) {
  var option = document.createElement("option");
  option.value = entry.group;
  option.textContent = entry.group;
  select.appendChild(option);
  var item = document.createElement("span");
  var swatch = document.createElement("i");
  swatch.style.backgroundColor = entry.color;
  item.appendChild(swatch);
  item.appendChild(document.createTextNode(entry.group));
  legendBox.appendChild(item);
});
select.addEventListener("change", function () {
  var wanted = select.value;
  nodes.update(nodes.get().map(function (node) {
    return { id: node.id, hidden: wanted !== "" && node.group !== wanted };
  }));
});"#;

/// Keep embedded JSON from closing the script element
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect()
}
