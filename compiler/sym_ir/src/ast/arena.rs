//! Node storage and construction helpers.

use std::sync::Arc;

use super::{
    ArmRange, BinaryOp, MatchArm, Node, NodeKind, NodeRange, Param, ParamRange, PropRange,
    Property, UnaryOp,
};
use crate::{Name, NodeId, SharedInterner, SourcePos, Span, StringInterner};

/// Owner of one compilation unit's nodes.
///
/// Builder methods allocate bottom-up and give every node a distinct span
/// (`index..index + 1`) unless an explicit span is supplied through
/// [`NodeArena::alloc_at`].
pub struct NodeArena {
    source: Arc<str>,
    interner: SharedInterner,
    nodes: Vec<Node>,
    children: Vec<NodeId>,
    props: Vec<Property>,
    params: Vec<Param>,
    arms: Vec<MatchArm>,
}

fn to_u32(len: usize, table: &str) -> u32 {
    match u32::try_from(len) {
        Ok(n) => n,
        Err(_) => panic!("node arena {table} table exceeded u32::MAX entries"),
    }
}

impl NodeArena {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self::with_interner(source, Arc::new(StringInterner::new()))
    }

    pub fn with_interner(source: impl Into<Arc<str>>, interner: SharedInterner) -> Self {
        NodeArena {
            source: source.into(),
            interner,
            nodes: Vec::new(),
            children: Vec::new(),
            props: Vec::new(),
            params: Vec::new(),
            arms: Vec::new(),
        }
    }

    // Access

    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// # Panics
    /// Panics on `NodeId::INVALID` or an id from another arena.
    pub fn get(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()) {
            Some(node) => node,
            None => panic!("{id:?} does not belong to unit {}", self.source),
        }
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).span
    }

    pub fn pos(&self, id: NodeId) -> SourcePos {
        SourcePos::new(Arc::clone(&self.source), self.span(id))
    }

    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub fn children(&self, range: NodeRange) -> &[NodeId] {
        &self.children[range.indices()]
    }

    pub fn props(&self, range: PropRange) -> &[Property] {
        &self.props[range.indices()]
    }

    pub fn params(&self, range: ParamRange) -> &[Param] {
        &self.params[range.indices()]
    }

    pub fn arms(&self, range: ArmRange) -> &[MatchArm] {
        &self.arms[range.indices()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Allocation

    pub fn alloc_at(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::new(to_u32(self.nodes.len(), "node"));
        self.nodes.push(Node { kind, span });
        id
    }

    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let start = to_u32(self.nodes.len(), "node");
        self.alloc_at(kind, Span::new(start, start + 1))
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn alloc_children(&mut self, ids: impl IntoIterator<Item = NodeId>) -> NodeRange {
        let start = to_u32(self.children.len(), "child");
        self.children.extend(ids);
        NodeRange {
            start,
            len: to_u32(self.children.len(), "child") - start,
        }
    }

    fn alloc_props<'a>(
        &mut self,
        props: impl IntoIterator<Item = (&'a str, NodeId, bool)>,
    ) -> PropRange {
        let start = to_u32(self.props.len(), "property");
        for (key, value, optional) in props {
            let key = self.intern(key);
            self.props.push(Property {
                key,
                value,
                optional,
            });
        }
        PropRange {
            start,
            len: to_u32(self.props.len(), "property") - start,
        }
    }

    // Literals and references

    pub fn nil(&mut self) -> NodeId {
        self.alloc(NodeKind::Nil)
    }

    pub fn bool(&mut self, value: bool) -> NodeId {
        self.alloc(NodeKind::Bool(value))
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.alloc(NodeKind::Int(value))
    }

    pub fn float(&mut self, value: f64) -> NodeId {
        self.alloc(NodeKind::Float(value.to_bits()))
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        let name = self.intern(value);
        self.alloc(NodeKind::Str(name))
    }

    pub fn rune(&mut self, value: char) -> NodeId {
        self.alloc(NodeKind::Rune(value))
    }

    pub fn path(&mut self, value: &str) -> NodeId {
        let name = self.intern(value);
        self.alloc(NodeKind::PathLit(name))
    }

    pub fn url(&mut self, value: &str) -> NodeId {
        let name = self.intern(value);
        self.alloc(NodeKind::UrlLit(name))
    }

    pub fn host(&mut self, value: &str) -> NodeId {
        let name = self.intern(value);
        self.alloc(NodeKind::HostLit(name))
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::Ident(name))
    }

    pub fn global(&mut self, name: &str) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::GlobalIdent(name))
    }

    pub fn self_ref(&mut self) -> NodeId {
        self.alloc(NodeKind::SelfRef)
    }

    // Composite expressions

    pub fn list(&mut self, elements: impl IntoIterator<Item = NodeId>) -> NodeId {
        let range = self.alloc_children(elements);
        self.alloc(NodeKind::List(range))
    }

    pub fn tuple(&mut self, elements: impl IntoIterator<Item = NodeId>) -> NodeId {
        let range = self.alloc_children(elements);
        self.alloc(NodeKind::Tuple(range))
    }

    pub fn object<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, NodeId)>) -> NodeId {
        let range = self.alloc_props(entries.into_iter().map(|(k, v)| (k, v, false)));
        self.alloc(NodeKind::Object(range))
    }

    pub fn record<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, NodeId)>) -> NodeId {
        let range = self.alloc_props(entries.into_iter().map(|(k, v)| (k, v, false)));
        self.alloc(NodeKind::Record(range))
    }

    pub fn member(&mut self, object: NodeId, name: &str) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::Member { object, name })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(NodeKind::Unary { op, operand })
    }

    pub fn call(&mut self, callee: NodeId, args: impl IntoIterator<Item = NodeId>) -> NodeId {
        let args = self.alloc_children(args);
        self.alloc(NodeKind::Call { callee, args })
    }

    /// `params` pairs a name with a pattern node or `NodeId::INVALID`.
    pub fn function<'a>(
        &mut self,
        params: impl IntoIterator<Item = (&'a str, NodeId)>,
        return_type: NodeId,
        body: NodeId,
    ) -> NodeId {
        let start = to_u32(self.params.len(), "parameter");
        for (name, pattern) in params {
            let name = self.intern(name);
            self.params.push(Param { name, pattern });
        }
        let params = ParamRange {
            start,
            len: to_u32(self.params.len(), "parameter") - start,
        };
        self.alloc(NodeKind::Function {
            params,
            return_type,
            body,
        })
    }

    pub fn spawn(&mut self, body: NodeId) -> NodeId {
        self.alloc(NodeKind::Spawn { body })
    }

    pub fn matches(&mut self, subject: NodeId, pattern: NodeId) -> NodeId {
        self.alloc(NodeKind::Matches { subject, pattern })
    }

    // Statements

    pub fn var(&mut self, name: &str, pattern: NodeId, init: NodeId) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::VarDecl {
            name,
            pattern,
            init,
            constant: false,
        })
    }

    pub fn constant(&mut self, name: &str, pattern: NodeId, init: NodeId) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::VarDecl {
            name,
            pattern,
            init,
            constant: true,
        })
    }

    pub fn global_var(&mut self, name: &str, pattern: NodeId, init: NodeId) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::GlobalDecl {
            name,
            pattern,
            init,
            constant: false,
        })
    }

    pub fn global_constant(&mut self, name: &str, pattern: NodeId, init: NodeId) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::GlobalDecl {
            name,
            pattern,
            init,
            constant: true,
        })
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.alloc(NodeKind::Assign { target, value })
    }

    pub fn if_else(&mut self, test: NodeId, then_branch: NodeId, else_branch: NodeId) -> NodeId {
        self.alloc(NodeKind::If {
            test,
            then_branch,
            else_branch,
        })
    }

    pub fn match_on(
        &mut self,
        subject: NodeId,
        arms: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> NodeId {
        let start = to_u32(self.arms.len(), "arm");
        self.arms.extend(
            arms.into_iter()
                .map(|(pattern, body)| MatchArm { pattern, body }),
        );
        let arms = ArmRange {
            start,
            len: to_u32(self.arms.len(), "arm") - start,
        };
        self.alloc(NodeKind::Match { subject, arms })
    }

    pub fn for_in(&mut self, binding: &str, iterable: NodeId, body: NodeId) -> NodeId {
        let binding = self.intern(binding);
        self.alloc(NodeKind::For {
            binding,
            iterable,
            body,
        })
    }

    pub fn ret(&mut self, value: NodeId) -> NodeId {
        self.alloc(NodeKind::Return(value))
    }

    pub fn fn_decl(&mut self, name: &str, function: NodeId) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::FnDecl { name, function })
    }

    pub fn pattern_def(&mut self, name: &str, pattern: NodeId) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::PatternDef { name, pattern })
    }

    pub fn namespace_def<'a>(
        &mut self,
        name: &str,
        members: impl IntoIterator<Item = (&'a str, NodeId)>,
    ) -> NodeId {
        let name = self.intern(name);
        let members = self.alloc_props(members.into_iter().map(|(k, v)| (k, v, false)));
        self.alloc(NodeKind::NamespaceDef { name, members })
    }

    pub fn block(&mut self, stmts: impl IntoIterator<Item = NodeId>) -> NodeId {
        let range = self.alloc_children(stmts);
        self.alloc(NodeKind::Block(range))
    }

    pub fn module(&mut self, stmts: impl IntoIterator<Item = NodeId>) -> NodeId {
        let range = self.alloc_children(stmts);
        self.alloc(NodeKind::Module(range))
    }

    // Pattern expressions

    pub fn pattern_ident(&mut self, name: &str) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::PatternIdent(name))
    }

    pub fn pattern_member(&mut self, namespace: &str, member: &str) -> NodeId {
        let namespace = self.intern(namespace);
        let member = self.intern(member);
        self.alloc(NodeKind::PatternMember { namespace, member })
    }

    /// Fields are `(name, pattern, optional)`.
    pub fn object_pattern<'a>(
        &mut self,
        fields: impl IntoIterator<Item = (&'a str, NodeId, bool)>,
        exact: bool,
    ) -> NodeId {
        let fields = self.alloc_props(fields);
        self.alloc(NodeKind::ObjectPattern { fields, exact })
    }

    pub fn record_pattern<'a>(
        &mut self,
        fields: impl IntoIterator<Item = (&'a str, NodeId, bool)>,
        exact: bool,
    ) -> NodeId {
        let fields = self.alloc_props(fields);
        self.alloc(NodeKind::RecordPattern { fields, exact })
    }

    pub fn list_pattern(&mut self, elements: impl IntoIterator<Item = NodeId>) -> NodeId {
        let range = self.alloc_children(elements);
        self.alloc(NodeKind::ListPattern(range))
    }

    pub fn list_of_pattern(&mut self, element: NodeId) -> NodeId {
        self.alloc(NodeKind::ListOfPattern(element))
    }

    pub fn tuple_pattern(&mut self, elements: impl IntoIterator<Item = NodeId>) -> NodeId {
        let range = self.alloc_children(elements);
        self.alloc(NodeKind::TuplePattern(range))
    }

    pub fn union_pattern(
        &mut self,
        cases: impl IntoIterator<Item = NodeId>,
        disjoint: bool,
    ) -> NodeId {
        let cases = self.alloc_children(cases);
        self.alloc(NodeKind::UnionPattern { cases, disjoint })
    }

    pub fn intersection_pattern(&mut self, cases: impl IntoIterator<Item = NodeId>) -> NodeId {
        let range = self.alloc_children(cases);
        self.alloc(NodeKind::IntersectionPattern(range))
    }

    pub fn difference_pattern(&mut self, base: NodeId, removed: NodeId) -> NodeId {
        self.alloc(NodeKind::DifferencePattern { base, removed })
    }

    pub fn int_range_pattern(&mut self, start: i64, end: i64) -> NodeId {
        self.alloc(NodeKind::IntRangePattern { start, end })
    }

    pub fn exact_pattern(&mut self, value: NodeId) -> NodeId {
        self.alloc(NodeKind::ExactPattern(value))
    }

    pub fn optional_pattern(&mut self, inner: NodeId) -> NodeId {
        self.alloc(NodeKind::OptionalPattern(inner))
    }

    pub fn path_pattern(&mut self, glob: &str) -> NodeId {
        let name = self.intern(glob);
        self.alloc(NodeKind::PathPattern(name))
    }

    pub fn url_pattern(&mut self, prefix: &str) -> NodeId {
        let name = self.intern(prefix);
        self.alloc(NodeKind::UrlPattern(name))
    }

    pub fn host_pattern(&mut self, host: &str) -> NodeId {
        let name = self.intern(host);
        self.alloc(NodeKind::HostPattern(name))
    }

    pub fn function_pattern(
        &mut self,
        params: impl IntoIterator<Item = NodeId>,
        result: NodeId,
    ) -> NodeId {
        let params = self.alloc_children(params);
        self.alloc(NodeKind::FunctionPattern { params, result })
    }
}
