//! Callable bodies and call sites.
//!
//! A function body is evaluated once, where the function is defined, with
//! its parameters bound to their patterns' values. Calls then only check
//! arguments against the signature. A body calling itself before it is
//! summarized gets the annotated return value, or `Any` plus a diagnostic.

use std::sync::Arc;

use sym_diagnostic::messages;
use sym_ir::{NodeId, NodeKind, Param, ParamRange};
use sym_lattice::{
    join, Capabilities, FunctionValue, NativeFunction, Pattern, Signature, Value,
};

use super::Evaluator;
use crate::State;

impl Evaluator<'_> {
    fn function_parts(&self, function: NodeId) -> (ParamRange, NodeId, NodeId) {
        match *self.arena.kind(function) {
            NodeKind::Function {
                params,
                return_type,
                body,
            } => (params, return_type, body),
            ref other => panic!("{other:?} is not a function"),
        }
    }

    fn parameter_patterns(&self, params: &[Param], state: &mut State) -> Vec<Pattern> {
        params
            .iter()
            .map(|param| match param.pattern.present() {
                Some(pattern) => self.eval_pattern(pattern, state),
                None => Pattern::Any,
            })
            .collect()
    }

    fn signature(&self, params: &[Param], patterns: &[Pattern], declared: Option<&Pattern>) -> Signature {
        Signature {
            params: patterns.iter().map(Pattern::symbolic_value).collect(),
            param_names: params
                .iter()
                .map(|p| self.name(p.name).to_owned())
                .collect(),
            result: declared.map_or(Value::Any, Pattern::symbolic_value),
            declared_result: declared.is_some(),
        }
    }

    /// The function as known before its body is evaluated.
    pub(super) fn declared_function(&self, function: NodeId, state: &mut State) -> Value {
        let (params, return_type, _) = self.function_parts(function);
        let params = self.arena.params(params);
        let patterns = self.parameter_patterns(params, state);
        let declared = return_type.present().map(|p| self.eval_pattern(p, state));
        let signature = self.signature(params, &patterns, declared.as_ref());
        Value::Function(Arc::new(FunctionValue::declared(function, signature)))
    }

    /// Evaluate a function's body and summarize it. Consumes the pending
    /// receiver, if any.
    pub(super) fn eval_function(&self, function: NodeId, state: &mut State) -> Value {
        let receiver = state.take_next_self();
        let (params, return_type, body) = self.function_parts(function);
        let params = self.arena.params(params);
        let patterns = self.parameter_patterns(params, state);
        let declared = return_type.present().map(|p| self.eval_pattern(p, state));
        let mut signature = self.signature(params, &patterns, declared.as_ref());

        if state.is_in_progress(function) || state.callee_depth() >= state.config().max_call_depth {
            tracing::debug!(?function, depth = state.callee_depth(), "body not evaluated");
            return Value::Function(Arc::new(FunctionValue::declared(function, signature)));
        }

        let mut body_state = state.fork();
        body_state.push_scope();
        if let Some(receiver) = &receiver {
            body_state.set_self(receiver.clone());
        }
        for (param, pattern) in params.iter().zip(&patterns) {
            let pos = param
                .pattern
                .present()
                .map_or_else(|| self.pos(function), |p| self.pos(p));
            body_state.set_local(
                param.name,
                pattern.symbolic_value(),
                Some(pattern.clone()),
                false,
                Some(pos),
            );
        }
        body_state.set_return_type(declared);
        body_state.push_callee(function);

        self.eval(body, &mut body_state);

        body_state.pop_callee();
        let inferred = match body_state.take_return() {
            Some((value, false)) => value,
            // Falling off the end returns nil.
            Some((value, true)) => join([value, Value::Nil]),
            None => Value::Nil,
        };
        if !signature.declared_result {
            signature.result = inferred;
        }
        if receiver.is_some() {
            body_state.unset_self();
        }
        body_state.pop_scope();

        Value::Function(Arc::new(FunctionValue::declared(function, signature)))
    }

    pub(super) fn eval_call(&self, call: NodeId, callee: NodeId, args: &[NodeId], state: &mut State) -> Value {
        let callee_value = self.eval(callee, state);
        let arg_values: Vec<Value> = args.iter().map(|&arg| self.eval(arg, state)).collect();

        match &callee_value {
            Value::Function(function) => self.call_function(call, function, args, &arg_values, state),
            Value::Native(native) => self.call_native(call, native, args, &arg_values, state),
            value if value.is_any() || value.capabilities().contains(Capabilities::CALLABLE) => {
                Value::Any
            }
            other => {
                state.add_error(messages::not_callable(self.pos(callee), &other.to_string()));
                Value::Any
            }
        }
    }

    fn check_args(
        &self,
        call: NodeId,
        params: &[Value],
        rest: Option<&Value>,
        args: &[NodeId],
        values: &[Value],
        state: &State,
    ) {
        let arity_ok = match rest {
            Some(_) => values.len() >= params.len(),
            None => values.len() == params.len(),
        };
        if !arity_ok {
            state.add_error(messages::invalid_arg_count(
                self.pos(call),
                values.len(),
                params.len(),
            ));
            return;
        }

        for (index, (arg, value)) in args.iter().zip(values).enumerate() {
            let Some(param) = params.get(index).or(rest) else {
                continue;
            };
            self.record_expected(*arg, param.clone(), state);
            if !param.test_in(value, state.test_cx()) {
                state.add_error(messages::invalid_arg(
                    self.pos(*arg),
                    index,
                    &value.to_string(),
                    &param.to_string(),
                ));
            }
        }
    }

    fn call_function(
        &self,
        call: NodeId,
        function: &FunctionValue,
        args: &[NodeId],
        values: &[Value],
        state: &mut State,
    ) -> Value {
        let Some(signature) = function.signature() else {
            return Value::Any;
        };
        self.check_args(call, &signature.params, None, args, values, state);

        if let Some(body) = function.node {
            if state.is_in_progress(body) && !signature.declared_result {
                state.add_error(messages::recursive_call_needs_return_type(self.pos(call)));
                return Value::Any;
            }
        }
        signature.result.clone()
    }

    /// The checker runs first. Parameter shapes it declares through
    /// [`State::set_native_params`] replace the declared ones when the
    /// arguments are checked, and the narrowed native is recorded on the call.
    fn call_native(
        &self,
        call: NodeId,
        native: &NativeFunction,
        args: &[NodeId],
        values: &[Value],
        state: &mut State,
    ) -> Value {
        let result = match self.checkers.get(&native.name) {
            Some(checker) => checker(state, values).unwrap_or_else(|| native.result.clone()),
            None => native.result.clone(),
        };

        match state.consume_native_params() {
            Some(params) => {
                let specialized = NativeFunction {
                    params,
                    variadic: None,
                    ..native.clone()
                };
                self.check_args(call, &specialized.params, None, args, values, state);
                if state.config().record_node_values {
                    state.store_mut().set_specialized_callee(
                        call,
                        self.class(call),
                        Value::Native(Arc::new(specialized)),
                    );
                }
            }
            None => {
                self.check_args(call, &native.params, native.variadic.as_ref(), args, values, state);
            }
        }

        for error in state.consume_native_errors() {
            let pos = error
                .arg
                .and_then(|index| args.get(index))
                .map_or_else(|| self.pos(call), |&arg| self.pos(arg));
            state.add_error(messages::native_error(pos, &error.message));
        }
        result
    }
}
