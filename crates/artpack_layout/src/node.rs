//! Tree nodes.

/// One child slot of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Node(Node),
    /// Character data. Whitespace-only runs are dropped at parse time.
    Text(String),
    Comment(String),
}

/// An element with ordered attributes and ordered children.
///
/// Attribute order is preserved from the source text so that serialization is
/// stable across a parse/serialize cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Child>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(Child::Node(child));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Read an attribute by exact name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Write an attribute, replacing the value in place if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Mutable access to every attribute value, paired with its name.
    pub fn attributes_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.attributes
            .iter_mut()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn push_child(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Iterate over direct element children, skipping text and comments.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|child| match child {
            Child::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn child_nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut().filter_map(|child| match child {
            Child::Node(node) => Some(node),
            _ => None,
        })
    }

    /// Direct text children, in document order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|child| match child {
            Child::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Collect this node and every descendant with the given tag (pre-order).
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.visit(&mut |node| {
            if node.tag == tag {
                found.push(node);
            }
        });
        found
    }

    /// Pre-order traversal over this node and all descendants.
    pub fn visit<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Node),
    {
        f(self);
        for child in self.child_nodes() {
            child.visit(f);
        }
    }

    /// Mutable pre-order traversal over this node and all descendants.
    pub fn visit_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        f(self);
        for child in self.child_nodes_mut() {
            child.visit_mut(f);
        }
    }
}
