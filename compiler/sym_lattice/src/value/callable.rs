//! Functions, native bindings and routine handles.

use sym_ir::NodeId;

use crate::{Shape, TestCx, Value};

/// Parameter and result shapes of a callable.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Signature {
    pub params: Vec<Value>,
    pub param_names: Vec<String>,
    pub result: Value,
    /// The result comes from a return-type annotation rather than inference.
    pub declared_result: bool,
}

impl Signature {
    pub fn new(params: Vec<Value>, result: Value) -> Self {
        let param_names = (0..params.len()).map(|i| format!("_{i}")).collect();
        Signature {
            params,
            param_names,
            result,
            declared_result: false,
        }
    }

    /// Contravariant parameters, covariant result.
    pub(crate) fn test_in(&self, other_params: &[Value], other_result: &Value, cx: TestCx<'_>) -> bool {
        self.params.len() == other_params.len()
            && self
                .params
                .iter()
                .zip(other_params)
                .all(|(mine, theirs)| theirs.test_in(mine, cx))
            && self.result.test_in(other_result, cx)
    }
}

/// A user-defined function.
///
/// With a `node`, the value stands for that one function; without, for any
/// function with a compatible signature.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionValue {
    pub node: Option<NodeId>,
    pub signature: Shape<Signature>,
}

impl FunctionValue {
    pub fn any() -> Self {
        FunctionValue {
            node: None,
            signature: Shape::Open,
        }
    }

    pub fn declared(node: NodeId, signature: Signature) -> Self {
        FunctionValue {
            node: Some(node),
            signature: Shape::Closed(signature),
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.closed()
    }

    pub(crate) fn test_in(&self, other: &FunctionValue, cx: TestCx<'_>) -> bool {
        let Shape::Closed(mine) = &self.signature else {
            return true;
        };
        if let Some(node) = self.node {
            return other.node == Some(node);
        }
        match &other.signature {
            Shape::Open => false,
            Shape::Closed(theirs) => mine.test_in(&theirs.params, &theirs.result, cx),
        }
    }

    pub(crate) fn test_native_in(&self, other: &NativeFunction, cx: TestCx<'_>) -> bool {
        match &self.signature {
            Shape::Open => true,
            Shape::Closed(mine) => {
                self.node.is_none()
                    && other.variadic.is_none()
                    && mine.test_in(&other.params, &other.result, cx)
            }
        }
    }
}

/// A function implemented by the runtime.
///
/// Natives report problems through the state's temporary error channel
/// rather than by returning diagnostics.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NativeFunction {
    pub name: String,
    pub params: Vec<Value>,
    /// Type of extra trailing arguments, when variadic.
    pub variadic: Option<Value>,
    pub result: Value,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, params: Vec<Value>, result: Value) -> Self {
        NativeFunction {
            name: name.into(),
            params,
            variadic: None,
            result,
        }
    }

    #[must_use]
    pub fn variadic(mut self, rest: Value) -> Self {
        self.variadic = Some(rest);
        self
    }
}

/// Handle to a spawned routine.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RoutineValue {
    pub result: Value,
}
