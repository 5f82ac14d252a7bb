//! Flat syntax tree.
//!
//! Children are `NodeId` indices into the owning `NodeArena`; variable-length
//! children live in side tables addressed by range types. Absent optional
//! children use `NodeId::INVALID`.

mod arena;

pub use arena::NodeArena;

use crate::{Name, NodeId, Span};

macro_rules! define_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
        pub struct $name {
            pub start: u32,
            pub len: u32,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.len == 0
            }

            #[inline]
            pub(crate) fn indices(self) -> std::ops::Range<usize> {
                let start = self.start as usize;
                start..start + self.len as usize
            }
        }
    };
}

define_range!(
    /// Range into the arena's child list.
    NodeRange
);
define_range!(
    /// Range into the arena's property table.
    PropRange
);
define_range!(
    /// Range into the arena's parameter table.
    ParamRange
);
define_range!(
    /// Range into the arena's match-arm table.
    ArmRange
);

/// A keyed child: object/record literal entries, object pattern fields and
/// pattern namespace members.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Property {
    pub key: Name,
    pub value: NodeId,
    /// Only meaningful for pattern fields (`b?: int`).
    pub optional: bool,
}

/// Function parameter with an optional pattern annotation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub pattern: NodeId,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchArm {
    pub pattern: NodeId,
    pub body: NodeId,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
    Concat,
}

impl BinaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Concat => "++",
        }
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
        )
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Which store caches a node participates in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeClass {
    Expression,
    Statement,
    /// Modules and blocks: introduce scopes.
    Block,
    Pattern,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    // Literals
    Nil,
    Bool(bool),
    Int(i64),
    /// IEEE-754 bits, so the tree stays `Eq + Hash`.
    Float(u64),
    Str(Name),
    Rune(char),
    PathLit(Name),
    UrlLit(Name),
    HostLit(Name),

    // References
    Ident(Name),
    GlobalIdent(Name),
    SelfRef,

    // Composite expressions
    List(NodeRange),
    Tuple(NodeRange),
    Object(PropRange),
    Record(PropRange),
    Member {
        object: NodeId,
        name: Name,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Call {
        callee: NodeId,
        args: NodeRange,
    },
    /// `fn(params) %ret { body }`; `return_type` may be `INVALID`.
    Function {
        params: ParamRange,
        return_type: NodeId,
        body: NodeId,
    },
    Spawn {
        body: NodeId,
    },
    /// `subject match %pattern`, a boolean test that narrows `subject`.
    Matches {
        subject: NodeId,
        pattern: NodeId,
    },

    // Statements
    VarDecl {
        name: Name,
        pattern: NodeId,
        init: NodeId,
        constant: bool,
    },
    GlobalDecl {
        name: Name,
        pattern: NodeId,
        init: NodeId,
        constant: bool,
    },
    Assign {
        target: NodeId,
        value: NodeId,
    },
    If {
        test: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    Match {
        subject: NodeId,
        arms: ArmRange,
    },
    For {
        binding: Name,
        iterable: NodeId,
        body: NodeId,
    },
    Return(NodeId),
    FnDecl {
        name: Name,
        function: NodeId,
    },
    PatternDef {
        name: Name,
        pattern: NodeId,
    },
    NamespaceDef {
        name: Name,
        members: PropRange,
    },
    Block(NodeRange),
    Module(NodeRange),

    // Pattern expressions
    PatternIdent(Name),
    PatternMember {
        namespace: Name,
        member: Name,
    },
    ObjectPattern {
        fields: PropRange,
        exact: bool,
    },
    RecordPattern {
        fields: PropRange,
        exact: bool,
    },
    ListPattern(NodeRange),
    ListOfPattern(NodeId),
    TuplePattern(NodeRange),
    UnionPattern {
        cases: NodeRange,
        disjoint: bool,
    },
    IntersectionPattern(NodeRange),
    /// `base \ removed`
    DifferencePattern {
        base: NodeId,
        removed: NodeId,
    },
    /// `int(start..end)`, both ends included.
    IntRangePattern {
        start: i64,
        end: i64,
    },
    ExactPattern(NodeId),
    OptionalPattern(NodeId),
    PathPattern(Name),
    UrlPattern(Name),
    HostPattern(Name),
    FunctionPattern {
        params: NodeRange,
        result: NodeId,
    },
}

impl NodeKind {
    pub fn class(&self) -> NodeClass {
        match self {
            NodeKind::Block(_) | NodeKind::Module(_) => NodeClass::Block,
            NodeKind::VarDecl { .. }
            | NodeKind::GlobalDecl { .. }
            | NodeKind::Assign { .. }
            | NodeKind::If { .. }
            | NodeKind::Match { .. }
            | NodeKind::For { .. }
            | NodeKind::Return(_)
            | NodeKind::FnDecl { .. }
            | NodeKind::PatternDef { .. }
            | NodeKind::NamespaceDef { .. } => NodeClass::Statement,
            NodeKind::PatternIdent(_)
            | NodeKind::PatternMember { .. }
            | NodeKind::ObjectPattern { .. }
            | NodeKind::RecordPattern { .. }
            | NodeKind::ListPattern(_)
            | NodeKind::ListOfPattern(_)
            | NodeKind::TuplePattern(_)
            | NodeKind::UnionPattern { .. }
            | NodeKind::IntersectionPattern(_)
            | NodeKind::DifferencePattern { .. }
            | NodeKind::IntRangePattern { .. }
            | NodeKind::ExactPattern(_)
            | NodeKind::OptionalPattern(_)
            | NodeKind::PathPattern(_)
            | NodeKind::UrlPattern(_)
            | NodeKind::HostPattern(_)
            | NodeKind::FunctionPattern { .. } => NodeClass::Pattern,
            _ => NodeClass::Expression,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}
