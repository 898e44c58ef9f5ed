//! Convenience constructors for building ASTs by hand.
//!
//! Each helper creates one node (plus any purely structural children such as a `ParamList`) with
//! the child layout documented on [`NodeKind`].

use crate::{
    context::Context,
    node::{AssignOp, BinaryOp, Node, NodeKind, UnaryOp},
};

impl Context {
    pub fn name(&mut self, name: &str) -> Node {
        Node::new(self, NodeKind::Name(name.to_owned()), vec![])
    }

    pub fn number(&mut self, value: f64) -> Node {
        Node::new(self, NodeKind::Number(value), vec![])
    }

    pub fn string(&mut self, value: &str) -> Node {
        Node::new(self, NodeKind::Str(value.to_owned()), vec![])
    }

    pub fn boolean(&mut self, value: bool) -> Node {
        let kind = if value { NodeKind::True } else { NodeKind::False };
        Node::new(self, kind, vec![])
    }

    pub fn null(&mut self) -> Node {
        Node::new(self, NodeKind::Null, vec![])
    }

    pub fn empty(&mut self) -> Node {
        Node::new(self, NodeKind::Empty, vec![])
    }

    pub fn script(&mut self, statements: Vec<Node>) -> Node {
        Node::new(self, NodeKind::Script, statements)
    }

    pub fn block(&mut self, statements: Vec<Node>) -> Node {
        Node::new(self, NodeKind::Block, statements)
    }

    /// A function with simple named parameters.  An empty `name` makes it anonymous.
    pub fn function(&mut self, name: &str, params: &[&str], body: Node) -> Node {
        let name = self.name(name);
        let params = params.iter().map(|param| self.name(param)).collect();
        let param_list = Node::new(self, NodeKind::ParamList, params);
        Node::new(self, NodeKind::Function, vec![name, param_list, body])
    }

    pub fn var_decl(&mut self, name: &str, init: Option<Node>) -> Node {
        self.decl(NodeKind::Var, name, init)
    }

    pub fn let_decl(&mut self, name: &str, init: Option<Node>) -> Node {
        self.decl(NodeKind::Let, name, init)
    }

    pub fn const_decl(&mut self, name: &str, init: Node) -> Node {
        self.decl(NodeKind::Const, name, Some(init))
    }

    /// A single-name declaration of `kind` (`Var`, `Let` or `Const`).  Without an initializer
    /// this also serves as a `for-in`/`for-of` target.
    pub fn decl(&mut self, kind: NodeKind, name: &str, init: Option<Node>) -> Node {
        let name = Node::new(
            self,
            NodeKind::Name(name.to_owned()),
            init.into_iter().collect(),
        );
        Node::new(self, kind, vec![name])
    }

    pub fn assign(&mut self, target: Node, value: Node) -> Node {
        self.assign_op(AssignOp::Assign, target, value)
    }

    pub fn assign_op(&mut self, op: AssignOp, target: Node, value: Node) -> Node {
        Node::new(self, NodeKind::Assign(op), vec![target, value])
    }

    pub fn and(&mut self, lhs: Node, rhs: Node) -> Node {
        Node::new(self, NodeKind::And, vec![lhs, rhs])
    }

    pub fn or(&mut self, lhs: Node, rhs: Node) -> Node {
        Node::new(self, NodeKind::Or, vec![lhs, rhs])
    }

    pub fn hook(&mut self, cond: Node, then_expr: Node, else_expr: Node) -> Node {
        Node::new(self, NodeKind::Hook, vec![cond, then_expr, else_expr])
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Node, rhs: Node) -> Node {
        Node::new(self, NodeKind::Binary(op), vec![lhs, rhs])
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Node) -> Node {
        Node::new(self, NodeKind::Unary(op), vec![operand])
    }

    pub fn call(&mut self, callee: Node, args: Vec<Node>) -> Node {
        let mut children = vec![callee];
        children.extend(args);
        Node::new(self, NodeKind::Call, children)
    }

    pub fn get_prop(&mut self, object: Node, prop: &str) -> Node {
        Node::new(self, NodeKind::GetProp(prop.to_owned()), vec![object])
    }

    pub fn get_elem(&mut self, object: Node, key: Node) -> Node {
        Node::new(self, NodeKind::GetElem, vec![object, key])
    }

    pub fn array_pattern(&mut self, names: &[&str]) -> Node {
        let names = names.iter().map(|name| self.name(name)).collect();
        Node::new(self, NodeKind::ArrayPattern, names)
    }

    pub fn expr_result(&mut self, expr: Node) -> Node {
        Node::new(self, NodeKind::ExprResult, vec![expr])
    }

    pub fn return_stmt(&mut self, expr: Option<Node>) -> Node {
        Node::new(self, NodeKind::Return, expr.into_iter().collect())
    }

    pub fn throw_stmt(&mut self, expr: Node) -> Node {
        Node::new(self, NodeKind::Throw, vec![expr])
    }

    pub fn if_stmt(&mut self, cond: Node, then_block: Node, else_block: Option<Node>) -> Node {
        let mut children = vec![cond, then_block];
        children.extend(else_block);
        Node::new(self, NodeKind::If, children)
    }

    pub fn while_loop(&mut self, cond: Node, body: Node) -> Node {
        Node::new(self, NodeKind::While, vec![cond, body])
    }

    pub fn do_loop(&mut self, body: Node, cond: Node) -> Node {
        Node::new(self, NodeKind::Do, vec![body, cond])
    }

    /// A C-style `for`; missing header parts become `Empty` nodes.
    pub fn for_loop(
        &mut self,
        init: Option<Node>,
        cond: Option<Node>,
        incr: Option<Node>,
        body: Node,
    ) -> Node {
        let init = init.unwrap_or_else(|| self.empty());
        let cond = cond.unwrap_or_else(|| self.empty());
        let incr = incr.unwrap_or_else(|| self.empty());
        Node::new(self, NodeKind::For, vec![init, cond, incr, body])
    }

    pub fn for_in(&mut self, target: Node, object: Node, body: Node) -> Node {
        Node::new(self, NodeKind::ForIn, vec![target, object, body])
    }

    pub fn for_of(&mut self, target: Node, iterable: Node, body: Node) -> Node {
        Node::new(self, NodeKind::ForOf, vec![target, iterable, body])
    }

    pub fn try_catch(
        &mut self,
        try_block: Node,
        catch_name: &str,
        catch_block: Node,
        finally_block: Option<Node>,
    ) -> Node {
        let binding = self.name(catch_name);
        let catch = Node::new(self, NodeKind::Catch, vec![binding, catch_block]);
        let mut children = vec![try_block, catch];
        children.extend(finally_block);
        Node::new(self, NodeKind::Try, children)
    }
}
