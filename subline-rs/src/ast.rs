//! Arena-owned abstract syntax tree.
//!
//! Nodes live in a single growable arena owned by the [`Ast`]; references
//! between nodes are stable [`NodeId`] indices rather than pointers.  Nodes
//! are immutable once built and are dropped together with the arena after
//! evaluation.

use crate::lex::Token;

// ── Node ──────────────────────────────────────────────────────────────────

/// Index of a node within its [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

/// Which literal rule a [`Node::Value`] leaf evaluates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Ident,
    Str,
    Number,
    Color,
    Env,
}

impl ValueKind {
    pub fn describe(self) -> &'static str {
        match self {
            ValueKind::Ident => "ident",
            ValueKind::Str => "string",
            ValueKind::Number => "number",
            ValueKind::Color => "color",
            ValueKind::Env => "env",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node<'a> {
    /// Leaf literal; `kind` selects the evaluation rule.
    Value { kind: ValueKind, token: Token<'a> },
    /// `name=value` parameter.  `value` always refers to a real node.
    ParamNamed { name: Token<'a>, value: NodeId },
    /// Ordered parameter list of a call or block.
    ParamList { values: Vec<NodeId> },
    /// `name(...)`; `params` refers to a [`Node::ParamList`].
    Call { name: Token<'a>, params: NodeId },
    /// `[params]? { statements }`; `params` refers to a [`Node::ParamList`].
    Block {
        params: Option<NodeId>,
        statements: Vec<NodeId>,
    },
    /// `if condition statement (else statement)?`.
    If {
        condition: NodeId,
        body: NodeId,
        else_body: Option<NodeId>,
    },
}

// ── Ast ───────────────────────────────────────────────────────────────────

/// Parse result: the node arena plus the ordered top-level statements.
#[derive(Debug)]
pub struct Ast<'a> {
    nodes: Vec<Node<'a>>,
    pub statements: Vec<NodeId>,
    /// End-of-input token, kept as a fallback error position for nodes that
    /// carry no token of their own (empty lists and blocks).
    eof: Token<'a>,
}

impl<'a> Ast<'a> {
    pub fn new(eof: Token<'a>) -> Self {
        Ast {
            nodes: Vec::new(),
            statements: Vec::new(),
            eof,
        }
    }

    pub fn alloc(&mut self, node: Node<'a>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0 as usize]
    }

    /// A token to point diagnostics at for the given node.
    pub fn error_token(&self, id: NodeId) -> Token<'a> {
        match self.node(id) {
            Node::Value { token, .. } => *token,
            Node::ParamNamed { name, .. } => *name,
            Node::Call { name, .. } => *name,
            Node::ParamList { values } => match values.first() {
                Some(&first) => self.error_token(first),
                None => self.eof,
            },
            Node::Block { params, statements } => {
                if let Some(p) = params {
                    self.error_token(*p)
                } else if let Some(&first) = statements.first() {
                    self.error_token(first)
                } else {
                    self.eof
                }
            }
            Node::If { condition, .. } => self.error_token(*condition),
        }
    }

    /// Source text rendering of a node, used by the `-d` debug dump.
    pub fn render(&self, id: NodeId) -> String {
        match self.node(id) {
            Node::Value { token, .. } => token.text().to_owned(),
            Node::ParamNamed { name, value } => {
                format!("{}={}", name.text(), self.render(*value))
            }
            Node::ParamList { values } => {
                let parts: Vec<String> = values.iter().map(|&v| self.render(v)).collect();
                parts.join(", ")
            }
            Node::Call { name, params } => {
                format!("{}({})", name.text(), self.render(*params))
            }
            Node::Block { params, statements } => {
                let head = match params {
                    Some(p) => format!("[{}] ", self.render(*p)),
                    None => String::new(),
                };
                let parts: Vec<String> = statements.iter().map(|&s| self.render(s)).collect();
                format!("{}{{ {} }}", head, parts.join(" "))
            }
            Node::If {
                condition,
                body,
                else_body,
            } => match else_body {
                Some(e) => format!(
                    "if {} {} else {}",
                    self.render(*condition),
                    self.render(*body),
                    self.render(*e)
                ),
                None => format!("if {} {}", self.render(*condition), self.render(*body)),
            },
        }
    }
}
