//! Recursive-descent parser for skip expressions
//!
//! Two levels: atoms (literals, `$NAME` references, `defined` folds,
//! parenthesized groups, `!` negation) and a top-level loop that linearizes
//! atoms separated by binary operators, re-shaping them by priority with a
//! push-down stack. Left-associative within a priority class.
//!
//! Error recovery is deliberate, not exceptional: any unexpected byte
//! truncates the remaining input at that point and substitutes constant
//! false for the failed production, and a parse that stops short of the
//! untruncated input's end makes the entire expression constant false. The
//! practical consequence is that a malformed skip expression skips nothing.

use crate::expr::{BinaryOp, ExprId, Expression, Node, eval_node, FALSE_ID};
use crate::generator::ComboGenerator;

impl Expression {
    /// Parse a skip expression, resolving `$NAME` references to axis slots
    /// of `resolver`.
    ///
    /// `defined X` is folded at parse time: its inner atom is evaluated
    /// against the resolver's current assignment vector and replaced by the
    /// resulting constant. Empty input yields the constant-false expression.
    pub fn parse(input: &str, resolver: &ComboGenerator) -> Self {
        let bytes = input.as_bytes();
        let mut parser = Parser {
            bytes,
            pos: 0,
            end: bytes.len(),
            nodes: vec![Node::Const(0)],
            resolver,
        };
        let mut root = parser.parse_top_level();
        // A stray closing paren, or input left behind a truncating abort,
        // poisons the whole expression.
        if parser.pos != bytes.len() {
            root = FALSE_ID;
        }
        Self {
            nodes: parser.nodes,
            root,
        }
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Effective end of input; an abort truncates this to the abort point so
    /// every enclosing production sees end-of-input and unwinds.
    end: usize,
    nodes: Vec<Node>,
    resolver: &'a ComboGenerator,
}

impl Parser<'_> {
    fn push(&mut self, node: Node) -> ExprId {
        let id = self.nodes.len() as ExprId;
        self.nodes.push(node);
        id
    }

    fn abort(&mut self) -> ExprId {
        self.end = self.pos;
        FALSE_ID
    }

    fn peek(&self) -> Option<u8> {
        if self.pos < self.end {
            Some(self.bytes[self.pos])
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &[u8]) -> bool {
        if self.bytes[self.pos..self.end].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Atom: integer | `defined` Atom | `(` TopLevel `)` | `$` ident | `!` Atom
    fn parse_atom(&mut self) -> ExprId {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return self.abort();
        };

        if c.is_ascii_digit() {
            let mut value: i64 = 0;
            while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
                value = (value * 10 + i64::from(d - b'0')).min(i64::from(i32::MAX));
                self.pos += 1;
            }
            self.push(Node::Const(value as i32))
        } else if self.eat(b"defined") {
            // Folded immediately against the resolver's current assignment
            // vector (the post-load sentinel values), not at combo time.
            let inner = self.parse_atom();
            let value = eval_node(&self.nodes, inner, self.resolver.values());
            self.push(Node::Const(value))
        } else if c == b'(' {
            self.pos += 1;
            let inner = self.parse_top_level();
            if self.peek() == Some(b')') {
                self.pos += 1;
                inner
            } else {
                self.abort()
            }
        } else if c == b'$' {
            self.pos += 1;
            let start = self.pos;
            while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
                self.pos += 1;
            }
            let name = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("");
            self.push(Node::Var(self.resolver.slot_of(name)))
        } else if c == b'!' {
            self.pos += 1;
            let inner = self.parse_atom();
            self.push(Node::Not(inner))
        } else {
            self.abort()
        }
    }

    /// TopLevel: Atom (Op Atom)*
    ///
    /// The stack holds binary nodes from loosest (front) to tightest (back).
    /// An incoming operator pops entries it binds looser than, then either
    /// steals the right operand of the surviving stack top or takes the
    /// last popped expression as its left operand.
    fn parse_top_level(&mut self) -> ExprId {
        let first = self.parse_atom();
        let mut stack: Vec<ExprId> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(b')') => break,
                Some(_) => {}
            }

            let op = if self.eat(b"&&") {
                BinaryOp::And
            } else if self.eat(b"||") {
                BinaryOp::Or
            } else if self.eat(b">=") {
                BinaryOp::Ge
            } else if self.eat(b"<=") {
                BinaryOp::Le
            } else if self.eat(b"==") {
                BinaryOp::Eq
            } else if self.eat(b"!=") {
                BinaryOp::Neq
            } else if self.eat(b">") {
                BinaryOp::Gt
            } else if self.eat(b"<") {
                BinaryOp::Lt
            } else {
                return self.abort();
            };

            let y = self.parse_atom();
            let priority = op.priority();

            let mut last = first;
            while let Some(&top) = stack.last() {
                last = top;
                if priority > self.priority_of(top) {
                    stack.pop();
                } else {
                    break;
                }
            }

            let node = if let Some(&top) = stack.last() {
                let x = self.right_of(top);
                let id = self.push(Node::Binary { op, x, y });
                self.set_right(top, id);
                id
            } else {
                self.push(Node::Binary { op, x: last, y })
            };
            stack.push(node);
        }

        // The front of the stack is the loosest-binding node, i.e. the root
        // of everything parsed at this level.
        stack.first().copied().unwrap_or(first)
    }

    fn priority_of(&self, id: ExprId) -> u8 {
        match &self.nodes[id as usize] {
            Node::Binary { op, .. } => op.priority(),
            _ => 0,
        }
    }

    fn right_of(&self, id: ExprId) -> ExprId {
        match &self.nodes[id as usize] {
            Node::Binary { y, .. } => *y,
            _ => FALSE_ID,
        }
    }

    fn set_right(&mut self, id: ExprId, y: ExprId) {
        if let Node::Binary { y: slot, .. } = &mut self.nodes[id as usize] {
            *slot = y;
        }
    }
}
