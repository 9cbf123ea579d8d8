//! Arena-backed syntax tree.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. Each
//! node owns its first-child link and its next-sibling link; the parent link
//! is a plain index used for ascent only, so the structure cannot form
//! reference cycles. Top-level nodes form one sibling chain starting at the
//! root.
//!
//! Trees are mutable while they are being built (comment nodes are spliced in
//! after parsing) and read-only during traversal. Read access goes through
//! the copyable [`Node`] cursor.

use crate::comment::{position_after, CommentSpan, CommentStyle, CommentToken};
use crate::kind::TokenKind;
use serde::{Deserialize, Serialize};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Node kind.
    pub kind: TokenKind,
    /// Raw lexeme; empty for purely structural nodes.
    pub text: String,
    /// 1-based line.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    attached: bool,
}

/// Structural edits that would break the tree shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The node is already linked somewhere in the tree.
    #[error("node {0:?} is already attached")]
    AlreadyAttached(NodeId),
    /// The id does not belong to this tree.
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    /// Sibling edits need a target that is itself part of the tree.
    #[error("node {0:?} is not attached to the tree")]
    Detached(NodeId),
}

/// Serializable description of a subtree, the hand-off format from parsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node kind.
    pub kind: TokenKind,
    /// Raw lexeme.
    #[serde(default)]
    pub text: String,
    /// 1-based line.
    pub line: usize,
    /// 0-based column.
    #[serde(default)]
    pub column: usize,
    /// Children in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Creates a childless spec.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            children: Vec::new(),
        }
    }

    /// Sets the children of this spec.
    #[must_use]
    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }
}

// Deep nesting would overflow the stack with the recursive default drop.
impl Drop for NodeSpec {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut spec) = stack.pop() {
            stack.append(&mut spec.children);
        }
    }
}

/// A syntax tree for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from top-level specs without recursing.
    #[must_use]
    pub fn from_specs(roots: &[NodeSpec]) -> Self {
        let mut tree = Self::new();
        let mut pending: Vec<(&NodeSpec, NodeId)> = Vec::new();

        let top = tree.link_chain(None, roots, &mut pending);
        tree.root = top;

        while let Some((spec, id)) = pending.pop() {
            let first = tree.link_chain(Some(id), &spec.children, &mut pending);
            tree.nodes[id.0].first_child = first;
        }

        tree
    }

    fn link_chain<'s>(
        &mut self,
        parent: Option<NodeId>,
        specs: &'s [NodeSpec],
        pending: &mut Vec<(&'s NodeSpec, NodeId)>,
    ) -> Option<NodeId> {
        let mut first = None;
        let mut prev: Option<NodeId> = None;
        for spec in specs {
            let id = self.push_node(spec.kind, spec.text.clone(), spec.line, spec.column);
            let node = &mut self.nodes[id.0];
            node.parent = parent;
            node.attached = true;
            match prev {
                Some(p) => self.nodes[p.0].next_sibling = Some(id),
                None => first = Some(id),
            }
            prev = Some(id);
            pending.push((spec, id));
        }
        first
    }

    /// Number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First top-level node.
    #[must_use]
    pub fn root(&self) -> Option<Node<'_>> {
        self.root.map(|id| self.node(id))
    }

    /// Cursor for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id.0 < self.nodes.len(), "node id out of range");
        Node { tree: self, id }
    }

    /// Raw record for `id`, if it exists.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.0)
    }

    /// Adds a detached node to the arena.
    pub fn push_node(
        &mut self,
        kind: TokenKind,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            kind,
            text: text.into(),
            line,
            column,
            parent: None,
            first_child: None,
            next_sibling: None,
            attached: false,
        });
        id
    }

    /// Makes a detached node the root. A previous root chain is kept as the
    /// new root's following siblings.
    ///
    /// # Errors
    ///
    /// Fails if the node is unknown or already attached.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_detached(id)?;
        let node = &mut self.nodes[id.0];
        node.next_sibling = self.root;
        node.attached = true;
        self.root = Some(id);
        Ok(())
    }

    /// Appends a detached node as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if either node is unknown or `child` is already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.ensure_exists(parent)?;
        self.ensure_detached(child)?;

        match self.nodes[parent.0].first_child {
            None => self.nodes[parent.0].first_child = Some(child),
            Some(first) => {
                let last = self.last_in_chain(first);
                self.nodes[last.0].next_sibling = Some(child);
            }
        }
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.attached = true;
        Ok(())
    }

    /// Links a detached node directly after `target`.
    ///
    /// # Errors
    ///
    /// Fails if `target` is not in the tree or `new` is already attached.
    pub fn add_next_sibling(&mut self, target: NodeId, new: NodeId) -> Result<(), TreeError> {
        self.ensure_attached(target)?;
        self.ensure_detached(new)?;

        let parent = self.nodes[target.0].parent;
        let following = self.nodes[target.0].next_sibling;
        self.nodes[target.0].next_sibling = Some(new);
        let node = &mut self.nodes[new.0];
        node.next_sibling = following;
        node.parent = parent;
        node.attached = true;
        Ok(())
    }

    /// Links a detached node directly before `target`.
    ///
    /// # Errors
    ///
    /// Fails if `target` is not in the tree or `new` is already attached.
    pub fn add_previous_sibling(&mut self, target: NodeId, new: NodeId) -> Result<(), TreeError> {
        self.ensure_attached(target)?;
        self.ensure_detached(new)?;

        let parent = self.nodes[target.0].parent;
        let chain_start = match parent {
            Some(p) => self.nodes[p.0].first_child,
            None => self.root,
        };

        if chain_start == Some(target) {
            match parent {
                Some(p) => self.nodes[p.0].first_child = Some(new),
                None => self.root = Some(new),
            }
        } else {
            let mut cursor = chain_start;
            while let Some(id) = cursor {
                if self.nodes[id.0].next_sibling == Some(target) {
                    self.nodes[id.0].next_sibling = Some(new);
                    break;
                }
                cursor = self.nodes[id.0].next_sibling;
            }
        }

        let node = &mut self.nodes[new.0];
        node.next_sibling = Some(target);
        node.parent = parent;
        node.attached = true;
        Ok(())
    }

    /// Builds the detached node triple for a comment token.
    pub fn comment_node(&mut self, token: &CommentToken) -> NodeId {
        match token.style {
            CommentStyle::SingleLine => self.single_line_comment_node(token),
            CommentStyle::Block => self.block_comment_node(token),
        }
    }

    /// `SINGLE_LINE_COMMENT` with a `COMMENT_CONTENT` child.
    pub fn single_line_comment_node(&mut self, token: &CommentToken) -> NodeId {
        let comment = self.push_node(TokenKind::SingleLineComment, "//", token.line, token.column);
        let content = self.push_node(
            TokenKind::CommentContent,
            token.text.clone(),
            token.line,
            token.column + 2,
        );
        self.attach_fresh_child(comment, content, None);
        comment
    }

    /// `BLOCK_COMMENT_BEGIN` with `COMMENT_CONTENT` and `BLOCK_COMMENT_END`
    /// children.
    pub fn block_comment_node(&mut self, token: &CommentToken) -> NodeId {
        self.block_comment_node_from_text(&token.text, token.line, token.column)
    }

    /// Same as [`Self::block_comment_node`] for free-form text whose opening
    /// delimiter sits at `line`/`column`.
    pub fn block_comment_node_from_text(&mut self, text: &str, line: usize, column: usize) -> NodeId {
        let begin = self.push_node(TokenKind::BlockCommentBegin, "/*", line, column);
        let content = self.push_node(TokenKind::CommentContent, text, line, column + 2);
        let (end_line, end_column) = position_after(text, line, column + 2);
        let end = self.push_node(TokenKind::BlockCommentEnd, "*/", end_line, end_column);
        self.attach_fresh_child(begin, content, None);
        self.attach_fresh_child(begin, end, Some(content));
        begin
    }

    fn attach_fresh_child(&mut self, parent: NodeId, child: NodeId, after: Option<NodeId>) {
        match after {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.attached = true;
    }

    /// Inserts comment nodes for `comments` into the tree.
    ///
    /// Each comment becomes the previous sibling of the node with the
    /// smallest position at or after the comment (earliest in pre-order on
    /// ties). Comments past every node are appended to the top-level chain.
    pub fn splice_comments(&mut self, comments: &[CommentToken]) {
        if comments.is_empty() {
            return;
        }

        let mut anchors: Vec<((usize, usize), usize, NodeId)> = self
            .preorder()
            .into_iter()
            .enumerate()
            .map(|(order, id)| {
                let n = &self.nodes[id.0];
                ((n.line, n.column), order, id)
            })
            .collect();
        anchors.sort_unstable();

        let mut ordered: Vec<&CommentToken> = comments.iter().collect();
        ordered.sort_by_key(|t| (t.line, t.column));

        for token in ordered {
            let pos = (token.line, token.column);
            let at = anchors.partition_point(|(p, _, _)| *p < pos);
            let comment = self.comment_node(token);
            let linked = match anchors.get(at) {
                Some(&(_, _, anchor)) => self.add_previous_sibling(anchor, comment),
                None => self.append_top_level(comment),
            };
            if let Err(e) = linked {
                tracing::warn!("Failed to splice comment at {}:{}: {e}", token.line, token.column);
            }
        }
    }

    fn append_top_level(&mut self, id: NodeId) -> Result<(), TreeError> {
        match self.root {
            None => self.set_root(id),
            Some(root) => {
                let last = self.last_in_chain(root);
                self.add_next_sibling(last, id)
            }
        }
    }

    /// Comment spans for every comment node embedded in the tree.
    #[must_use]
    pub fn comment_spans(&self) -> Vec<CommentSpan> {
        self.preorder()
            .into_iter()
            .filter_map(|id| {
                let node = self.node(id);
                let style = match node.kind() {
                    TokenKind::SingleLineComment => CommentStyle::SingleLine,
                    TokenKind::BlockCommentBegin => CommentStyle::Block,
                    _ => return None,
                };
                let text = node
                    .find_first_child_of_kind(TokenKind::CommentContent)
                    .map(|c| c.text().to_string())
                    .unwrap_or_default();
                Some(CommentSpan::from_token(&CommentToken {
                    style,
                    text,
                    line: node.line(),
                    column: node.column(),
                }))
            })
            .collect()
    }

    /// Ids of every reachable node in pre-order.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = Vec::new();
        let mut next = self.root;

        loop {
            if let Some(id) = next {
                order.push(id);
                stack.push(id);
                next = self.nodes[id.0].first_child;
                continue;
            }
            let Some(done) = stack.pop() else { break };
            next = self.nodes[done.0].next_sibling;
        }

        order
    }

    fn last_in_chain(&self, start: NodeId) -> NodeId {
        let mut last = start;
        while let Some(next) = self.nodes[last.0].next_sibling {
            last = next;
        }
        last
    }

    fn ensure_exists(&self, id: NodeId) -> Result<(), TreeError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id))
        }
    }

    fn ensure_detached(&self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_exists(id)?;
        if self.nodes[id.0].attached {
            Err(TreeError::AlreadyAttached(id))
        } else {
            Ok(())
        }
    }

    fn ensure_attached(&self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_exists(id)?;
        if self.nodes[id.0].attached {
            Ok(())
        } else {
            Err(TreeError::Detached(id))
        }
    }
}

/// Read-only cursor over one node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("text", &self.text())
            .field("line", &self.line())
            .field("column", &self.column())
            .finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl<'a> Node<'a> {
    fn raw(&self) -> &'a SyntaxNode {
        &self.tree.nodes[self.id.0]
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<Node<'a>> {
        id.map(|id| Node {
            tree: self.tree,
            id,
        })
    }

    /// Arena id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.raw().kind
    }

    /// Raw lexeme.
    #[must_use]
    pub fn text(&self) -> &'a str {
        &self.raw().text
    }

    /// 1-based line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.raw().line
    }

    /// 0-based column.
    #[must_use]
    pub fn column(&self) -> usize {
        self.raw().column
    }

    /// Parent, or `None` for top-level nodes.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'a>> {
        self.wrap(self.raw().parent)
    }

    /// First child.
    #[must_use]
    pub fn first_child(&self) -> Option<Node<'a>> {
        self.wrap(self.raw().first_child)
    }

    /// Last child.
    #[must_use]
    pub fn last_child(&self) -> Option<Node<'a>> {
        self.children().last()
    }

    /// Next sibling.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'a>> {
        self.wrap(self.raw().next_sibling)
    }

    /// Previous sibling, found by walking the sibling chain from its start.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<Node<'a>> {
        let start = match self.parent() {
            Some(parent) => parent.first_child(),
            None => self.tree.root(),
        };
        let mut prev = None;
        let mut cursor = start;
        while let Some(node) = cursor {
            if node.id == self.id {
                return prev;
            }
            prev = Some(node);
            cursor = node.next_sibling();
        }
        None
    }

    /// Iterator over the immediate children.
    #[must_use]
    pub fn children(&self) -> Siblings<'a> {
        Siblings {
            next: self.first_child(),
        }
    }

    /// Number of immediate children. Walks the chain; not cached.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// Number of immediate children of `kind`.
    #[must_use]
    pub fn child_count_of_kind(&self, kind: TokenKind) -> usize {
        self.children().filter(|c| c.kind() == kind).count()
    }

    /// Returns true if the node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.raw().first_child.is_some()
    }

    /// First immediate child of `kind`.
    #[must_use]
    pub fn find_first_child_of_kind(&self, kind: TokenKind) -> Option<Node<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            depth += 1;
            cursor = node.parent();
        }
        depth
    }
}

/// Iterator along a sibling chain.
pub struct Siblings<'a> {
    next: Option<Node<'a>>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}
