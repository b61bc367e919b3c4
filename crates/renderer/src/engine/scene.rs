// SPDX-License-Identifier: MIT

//!
//! The scene graph the engine draws into, and an in-memory implementation of
//! it that can be written out as SVG
//!

use super::helpers::svg_number;
use super::node_arena::NodeArena;
use std::collections::BTreeMap;
use std::fmt::Write;
use thiserror::Error;

/// Errors that can be returned by a [`Scene`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node doesn't exist (or has been removed)
    #[error("Unknown scene node {0:?}")]
    UnknownNode(NodeId),

    /// The underlying rendering surface failed
    #[error("Scene backend error: {0}")]
    Backend(String),
}

/// A handle to a node in a [`Scene`].  Handles to removed nodes never
/// resolve again, even once their slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

/// The kinds of node the engine creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Line,
    Text,
}

impl NodeKind {
    /// The SVG element name
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Group => "g",
            NodeKind::Line => "line",
            NodeKind::Text => "text",
        }
    }
}

/// A retained scene graph (e.g. an SVG document)
pub trait Scene {
    /// The node everything else is appended under
    fn root(&self) -> NodeId;

    /// Append a new node of `kind` under `parent`.  `class` is a space
    /// separated list of classes.
    fn create(&mut self, parent: NodeId, kind: NodeKind, class: &str)
    -> Result<NodeId, SceneError>;

    /// Set an attribute
    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SceneError>;

    /// Get an attribute
    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set (`Some`) or remove (`None`) an inline style property
    fn set_style(&mut self, node: NodeId, name: &str, value: Option<&str>)
    -> Result<(), SceneError>;

    /// Set the text content
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), SceneError>;

    /// Remove the node and everything beneath it
    fn remove(&mut self, node: NodeId) -> Result<(), SceneError>;

    /// Remove everything beneath the node
    fn clear_children(&mut self, node: NodeId) -> Result<(), SceneError>;

    /// Every live node that has all of `classes`, in document order
    fn select(&self, classes: &[&str]) -> Vec<NodeId>;

    /// Set a numeric attribute
    fn set_num(&mut self, node: NodeId, name: &str, value: f64) -> Result<(), SceneError> {
        self.set_attr(node, name, &svg_number(value))
    }

    /// Get a numeric attribute
    fn num(&self, node: NodeId, name: &str) -> Option<f64> {
        self.attr(node, name)?.parse().ok()
    }
}

/// Whether the space separated `class_attr` holds every one of `classes`
pub fn has_classes(class_attr: &str, classes: &[&str]) -> bool {
    classes
        .iter()
        .all(|wanted| class_attr.split_whitespace().any(|class| class == *wanted))
}

#[derive(Debug, Clone)]
struct MemoryNode {
    kind: NodeKind,
    class: String,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: Option<String>,
}

/// An arena-backed [`Scene`] held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: NodeArena<MemoryNode>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(MemoryNode {
                kind: NodeKind::Group,
                class: String::from("root"),
                attrs: BTreeMap::new(),
                styles: BTreeMap::new(),
                text: None,
            }),
        }
    }

    /// The number of live nodes (including the root)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).ok().map(|node| node.kind)
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.node(node).ok().and_then(|node| node.text.as_deref())
    }

    pub fn style(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)
            .ok()
            .and_then(|node| node.styles.get(name).map(String::as_str))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.children(node)
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.node(node).is_ok()
    }

    /// Write the scene as a standalone SVG document
    pub fn to_svg(&self, width: f64, height: f64) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n",
            svg_number(width),
            svg_number(height)
        );
        for child in self.children(self.root()) {
            self.write_node(&mut svg, *child, 1);
        }
        svg.push_str("</svg>\n");
        svg
    }

    fn write_node(&self, out: &mut String, id: NodeId, depth: usize) {
        let Ok(node) = self.node(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", node.kind.tag());
        if !node.class.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&node.class));
        }
        for (name, value) in &node.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
        if !node.styles.is_empty() {
            let style: Vec<String> = node
                .styles
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect();
            let _ = write!(out, " style=\"{}\"", escape(&style.join("; ")));
        }
        let children = self.children(id);
        match (&node.text, children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{}>", escape(text), node.kind.tag());
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{indent}  {}", escape(text));
                }
                for child in children {
                    self.write_node(out, *child, depth + 1);
                }
                let _ = writeln!(out, "{indent}</{}>", node.kind.tag());
            }
        }
    }

    fn node(&self, id: NodeId) -> Result<&MemoryNode, SceneError> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, SceneError> {
        self.nodes.get_mut(id)
    }
}

impl Scene for MemoryScene {
    fn root(&self) -> NodeId {
        self.nodes.root()
    }

    fn create(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        class: &str,
    ) -> Result<NodeId, SceneError> {
        self.nodes.insert(
            parent,
            MemoryNode {
                kind,
                class: class.to_string(),
                attrs: BTreeMap::new(),
                styles: BTreeMap::new(),
                text: None,
            },
        )
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SceneError> {
        self.node_mut(node)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).ok()?.attrs.get(name).cloned()
    }

    fn set_style(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), SceneError> {
        let styles = &mut self.node_mut(node)?.styles;
        match value {
            Some(value) => {
                styles.insert(name.to_string(), value.to_string());
            }
            None => {
                styles.remove(name);
            }
        }
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), SceneError> {
        self.node_mut(node)?.text = Some(text.to_string());
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.nodes.remove(node).map(|_| ())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.nodes.clear_children(node).map(|_| ())
    }

    fn select(&self, classes: &[&str]) -> Vec<NodeId> {
        self.nodes
            .walk()
            .into_iter()
            .filter_map(|(id, node)| has_classes(&node.class, classes).then_some(id))
            .collect()
    }
}

/// Escape text for use in XML
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
