use std::collections::{HashMap, HashSet};

use crate::html::parse_html;
use crate::selector::{
    SelectorCombinator, SelectorPart, SelectorPseudoClass, SelectorStep, parse_selector_groups,
};
use crate::{Error, Result};

/// Handle to a node owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attrs: HashMap<String, String>,
}

impl Element {
    fn has_class(&self, class_name: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }
}

/// An in-memory document tree with CSS selector queries.
///
/// Nodes are never freed; every node keeps its id for the life of the document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    /// Parses an HTML fragment into a fresh document.
    pub fn from_html(html: &str) -> Result<Self> {
        parse_html(html)
    }

    /// The document node itself.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_document(&self, node_id: NodeId) -> bool {
        node_id == self.root
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some()
    }

    fn node(&self, node_id: NodeId) -> Result<&Node> {
        self.nodes
            .get(node_id.0)
            .ok_or(Error::UnknownNode(node_id.0))
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> Result<NodeId> {
        if let Some(parent_id) = parent {
            self.ensure_container(parent_id)?;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        Ok(id)
    }

    fn ensure_container(&self, node_id: NodeId) -> Result<()> {
        match self.node(node_id)?.node_type {
            NodeType::Document | NodeType::Element(_) => Ok(()),
            NodeType::Text(_) => Err(Error::NotAnElement(format!(
                "text node {} cannot have children",
                node_id.0
            ))),
        }
    }

    /// Creates an element as the last child of `parent`.
    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: impl IntoIterator<Item = (String, String)>,
    ) -> Result<NodeId> {
        let element = Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: attrs
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
        };
        let id_attr = element.attrs.get("id").cloned();
        let id = self.create_node(Some(parent), NodeType::Element(element))?;
        if let Some(id_attr) = id_attr {
            if !id_attr.is_empty() && self.is_connected(id) {
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        Ok(id)
    }

    /// Creates an element with no parent.
    pub(crate) fn create_detached_element(&mut self, tag_name: &str) -> NodeId {
        let element = Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: HashMap::new(),
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Element(element),
        });
        id
    }

    pub fn create_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.create_node(Some(parent), NodeType::Text(text.to_string()))
    }

    fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0)?.parent
    }

    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.nodes
            .get(node_id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn element_children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.children(node_id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        node_id == self.root || self.is_descendant_of(node_id, self.root)
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn text_content(&self, node_id: NodeId) -> String {
        let Some(node) = self.nodes.get(node_id.0) else {
            return String::new();
        };
        match &node.node_type {
            NodeType::Text(text) => text.clone(),
            NodeType::Document | NodeType::Element(_) => node
                .children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
        }
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.element(node_id)?
            .attrs
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.attr(node_id, name).is_some()
    }

    /// Names of all attributes on `node_id`, sorted.
    pub fn attr_names(&self, node_id: NodeId) -> Vec<String> {
        let mut names = self
            .element(node_id)
            .map(|element| element.attrs.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        let element = self.element_mut(node_id).ok_or_else(|| {
            Error::NotAnElement(format!("cannot set attribute on node {}", node_id.0))
        })?;
        element.attrs.insert(lowered.clone(), value.to_string());
        if lowered == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        let element = self.element_mut(node_id).ok_or_else(|| {
            Error::NotAnElement(format!("cannot remove attribute from node {}", node_id.0))
        })?;
        let removed = element.attrs.remove(&lowered).is_some();
        if removed && lowered == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    /// First element in the whole document matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    /// All elements in the whole document matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        Ok(self.filter_matching(ids, &groups))
    }

    /// First descendant of `root` matching `selector`.
    ///
    /// Only descendants are candidates, but combinators in `selector` may
    /// reach past `root` into its ancestors and siblings.
    pub fn query_selector_from(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all_from(root, selector)?;
        Ok(all.into_iter().next())
    }

    pub fn query_selector_all_from(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        self.node(root)?;

        let mut ids = Vec::new();
        self.collect_elements_descendants_dfs(root, &mut ids);
        Ok(self.filter_matching(ids, &groups))
    }

    /// Like [`Document::query_selector`] but a miss is an error.
    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.into()))
    }

    pub fn matches_selector(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        let groups = parse_selector_groups(selector)?;
        if self.element(node_id).is_none() {
            return Ok(false);
        }
        Ok(groups
            .iter()
            .any(|steps| self.matches_selector_chain(node_id, steps)))
    }

    pub fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(current, steps))
            {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    fn filter_matching(&self, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| {
                groups
                    .iter()
                    .any(|steps| self.matches_selector_chain(*candidate, steps))
                    && seen.insert(*candidate)
            })
            .collect()
    }

    fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if let NodeType::Element(element) = &self.nodes[node.0].node_type {
                if let Some(id) = element.attrs.get("id") {
                    if !id.is_empty() {
                        next.entry(id.clone()).or_insert(node);
                    }
                }
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        // Deep documents recurse once per level.
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
                out.push(node_id);
            }
            for child in &self.nodes[node_id.0].children {
                self.collect_elements_dfs(*child, out);
            }
        })
    }

    fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        let Some((last, rest)) = steps.split_last() else {
            return false;
        };
        self.matches_step(node_id, &last.step) && self.matches_chain_prefix(node_id, last, rest)
    }

    /// Matches `rest` against the elements `part.combinator` reaches from
    /// `node_id`, trying every candidate before giving up.
    fn matches_chain_prefix(
        &self,
        node_id: NodeId,
        part: &SelectorPart,
        rest: &[SelectorPart],
    ) -> bool {
        if rest.is_empty() {
            return true;
        }
        // Long chains over deep trees recurse once per candidate.
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            let combinator = part.combinator.unwrap_or(SelectorCombinator::Descendant);
            match combinator {
                SelectorCombinator::Child => self
                    .parent(node_id)
                    .is_some_and(|parent| self.matches_selector_chain(parent, rest)),
                SelectorCombinator::AdjacentSibling => self
                    .previous_element_sibling(node_id)
                    .is_some_and(|sibling| self.matches_selector_chain(sibling, rest)),
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent(node_id);
                    while let Some(ancestor) = cursor {
                        if self.matches_selector_chain(ancestor, rest) {
                            return true;
                        }
                        cursor = self.parent(ancestor);
                    }
                    false
                }
                SelectorCombinator::GeneralSibling => {
                    let mut cursor = self.previous_element_sibling(node_id);
                    while let Some(sibling) = cursor {
                        if self.matches_selector_chain(sibling, rest) {
                            return true;
                        }
                        cursor = self.previous_element_sibling(sibling);
                    }
                    false
                }
            }
        })
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !element.has_class(class_name))
        {
            return false;
        }

        if step
            .attrs
            .iter()
            .any(|cond| !cond.matches(element.attrs.get(cond.key()).map(String::as_str)))
        {
            return false;
        }

        step.pseudo_classes
            .iter()
            .all(|pseudo| self.matches_pseudo_class(node_id, pseudo))
    }

    fn matches_pseudo_class(&self, node_id: NodeId, pseudo: &SelectorPseudoClass) -> bool {
        match pseudo {
            SelectorPseudoClass::Root => self.parent(node_id) == Some(self.root),
            SelectorPseudoClass::FirstChild => self.previous_element_sibling(node_id).is_none(),
            SelectorPseudoClass::LastChild => self.next_element_sibling(node_id).is_none(),
            SelectorPseudoClass::OnlyChild => {
                self.previous_element_sibling(node_id).is_none()
                    && self.next_element_sibling(node_id).is_none()
            }
            SelectorPseudoClass::FirstOfType => self.position_of_type(node_id).0 == 1,
            SelectorPseudoClass::LastOfType => {
                let (index, total) = self.position_of_type(node_id);
                index == total
            }
            SelectorPseudoClass::OnlyOfType => self.position_of_type(node_id).1 == 1,
            SelectorPseudoClass::Empty => self.children(node_id).iter().all(|child| {
                matches!(&self.nodes[child.0].node_type, NodeType::Text(text) if text.is_empty())
            }),
            SelectorPseudoClass::NthChild(selector) => {
                let (index, _) = self.position_among_siblings(node_id);
                index > 0 && selector.matches_index(index)
            }
            SelectorPseudoClass::NthLastChild(selector) => {
                let (index, total) = self.position_among_siblings(node_id);
                index > 0 && selector.matches_index(total + 1 - index)
            }
            SelectorPseudoClass::NthOfType(selector) => {
                let (index, _) = self.position_of_type(node_id);
                index > 0 && selector.matches_index(index)
            }
            SelectorPseudoClass::NthLastOfType(selector) => {
                let (index, total) = self.position_of_type(node_id);
                index > 0 && selector.matches_index(total + 1 - index)
            }
            SelectorPseudoClass::Not(inners) => !inners
                .iter()
                .any(|inner| self.matches_selector_chain(node_id, inner)),
            SelectorPseudoClass::Is(inners) | SelectorPseudoClass::Where(inners) => inners
                .iter()
                .any(|inner| self.matches_selector_chain(node_id, inner)),
            SelectorPseudoClass::Has(inners) => {
                let mut descendants = Vec::new();
                self.collect_elements_descendants_dfs(node_id, &mut descendants);
                descendants.into_iter().any(|descendant| {
                    inners
                        .iter()
                        .any(|inner| self.matches_selector_chain(descendant, inner))
                })
            }
        }
    }

    /// 1-based position of `node_id` among its element siblings, and the sibling count.
    /// `(0, 0)` for nodes without a parent.
    fn position_among_siblings(&self, node_id: NodeId) -> (usize, usize) {
        self.position_where(node_id, |_| true)
    }

    fn position_of_type(&self, node_id: NodeId) -> (usize, usize) {
        let Some(tag_name) = self.tag_name(node_id) else {
            return (0, 0);
        };
        self.position_where(node_id, |element| element.tag_name == tag_name)
    }

    fn position_where(&self, node_id: NodeId, filter: impl Fn(&Element) -> bool) -> (usize, usize) {
        let Some(parent) = self.parent(node_id) else {
            return (0, 0);
        };
        let mut total = 0usize;
        let mut target = 0usize;
        for child in &self.nodes[parent.0].children {
            let Some(element) = self.element(*child) else {
                continue;
            };
            if !filter(element) {
                continue;
            }
            total += 1;
            if *child == node_id {
                target = total;
            }
        }
        (target, total)
    }

    pub fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let children = &self.nodes[parent.0].children;
        let pos = children.iter().position(|id| *id == node_id)?;
        children[pos + 1..]
            .iter()
            .copied()
            .find(|sibling| self.is_element(*sibling))
    }

    pub(crate) fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let children = &self.nodes[parent.0].children;
        let pos = children.iter().position(|id| *id == node_id)?;
        children[..pos]
            .iter()
            .rev()
            .copied()
            .find(|sibling| self.is_element(*sibling))
    }

    /// Serializes the subtree under `node_id` (attributes sorted by name).
    pub fn dump_node(&self, node_id: NodeId) -> String {
        let Some(node) = self.nodes.get(node_id.0) else {
            return String::new();
        };
        match &node.node_type {
            NodeType::Document => node
                .children
                .iter()
                .map(|child| self.dump_node(*child))
                .collect(),
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                attrs.sort();
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                out.push('>');
                for child in &node.children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }
}
