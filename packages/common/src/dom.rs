//! # Host Document
//!
//! Abstraction over the page that owns the editable regions.
//!
//! The editing core never owns DOM nodes. It holds [`ElementId`] handles
//! handed out by the host and talks to the page through the
//! [`HostDocument`] trait. [`Dom`] is an arena-backed implementation used
//! by tooling and tests.
//!
//! ```text
//! #document (root, never part of a path)
//!   └─ html
//!       └─ body
//!           ├─ div      ← "html:0>body:0>div:0"
//!           └─ div      ← "html:0>body:0>div:1"
//! ```

use crate::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Non-owning handle to an element in a host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operations the editing core needs from the page
pub trait HostDocument {
    /// Tag name of the element, `None` if the handle is unknown
    fn tag_name(&self, el: ElementId) -> Option<&str>;

    /// Parent element (`None` for the document root and detached elements)
    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// Children in document order
    fn children(&self, el: ElementId) -> Vec<ElementId>;

    /// Whether the handle is the document root
    fn is_document_root(&self, el: ElementId) -> bool;

    /// Inline style declarations currently on the element
    fn inline_styles(&self, el: ElementId) -> BTreeMap<String, String>;

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) -> CommonResult<()>;

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn add_class(&mut self, el: ElementId, class: &str) -> CommonResult<()>;

    /// Remove a class (removing an absent class is not an error)
    fn remove_class(&mut self, el: ElementId, class: &str) -> CommonResult<()>;

    /// Replace the element's content with plain text
    fn set_text(&mut self, el: ElementId, text: &str) -> CommonResult<()>;

    /// Drop all children and text content
    fn clear_children(&mut self, el: ElementId) -> CommonResult<()>;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> ElementId;

    /// Move `child` to the end of `parent`'s children
    fn append_child(&mut self, parent: ElementId, child: ElementId) -> CommonResult<()>;

    /// The page body, if the document has one
    fn body(&self) -> Option<ElementId>;
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    text: Option<String>,
}

/// In-memory arena document
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    /// Create an empty document containing only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                tag: "#document".to_string(),
                ..Node::default()
            }],
        }
    }

    /// The document root
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: ElementId, tag: &str) -> CommonResult<ElementId> {
        let child = self.create_element(tag);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Remove an element from its parent; the handle stays valid
    pub fn detach(&mut self, el: ElementId) -> CommonResult<()> {
        let parent = self.node(el)?.parent;
        if let Some(parent) = parent {
            self.nodes[parent.0].children.retain(|c| *c != el);
            self.nodes[el.0].parent = None;
        }
        Ok(())
    }

    pub fn set_style(&mut self, el: ElementId, property: &str, value: &str) -> CommonResult<()> {
        self.node_mut(el)?
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    /// Classes in the order they were added
    pub fn classes(&self, el: ElementId) -> Vec<String> {
        self.nodes
            .get(el.0)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    pub fn text(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(el.0).and_then(|n| n.text.as_deref())
    }

    fn node(&self, el: ElementId) -> CommonResult<&Node> {
        self.nodes.get(el.0).ok_or(CommonError::UnknownElement(el))
    }

    fn node_mut(&mut self, el: ElementId) -> CommonResult<&mut Node> {
        self.nodes.get_mut(el.0).ok_or(CommonError::UnknownElement(el))
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDocument for Dom {
    fn tag_name(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(el.0).map(|n| n.tag.as_str())
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.get(el.0).and_then(|n| n.parent)
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(el.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn is_document_root(&self, el: ElementId) -> bool {
        el == self.root()
    }

    fn inline_styles(&self, el: ElementId) -> BTreeMap<String, String> {
        self.nodes
            .get(el.0)
            .map(|n| n.styles.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.nodes.get(el.0).and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) -> CommonResult<()> {
        self.node_mut(el)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.nodes
            .get(el.0)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, el: ElementId, class: &str) -> CommonResult<()> {
        let node = self.node_mut(el)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, el: ElementId, class: &str) -> CommonResult<()> {
        self.node_mut(el)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn set_text(&mut self, el: ElementId, text: &str) -> CommonResult<()> {
        self.clear_children(el)?;
        self.nodes[el.0].text = Some(text.to_string());
        Ok(())
    }

    fn clear_children(&mut self, el: ElementId) -> CommonResult<()> {
        let children = std::mem::take(&mut self.node_mut(el)?.children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[el.0].text = None;
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        id
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> CommonResult<()> {
        self.node(parent)?;
        self.node(child)?;

        let mut cursor = Some(parent);
        while let Some(el) = cursor {
            if el == child {
                return Err(format!("cannot append {} inside itself", child).into());
            }
            cursor = self.nodes[el.0].parent;
        }

        self.detach(child)?;

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    fn body(&self) -> Option<ElementId> {
        let mut queue = std::collections::VecDeque::from([self.root()]);
        while let Some(el) = queue.pop_front() {
            if self.nodes[el.0].tag.eq_ignore_ascii_case("body") {
                return Some(el);
            }
            queue.extend(self.nodes[el.0].children.iter().copied());
        }
        None
    }
}
