//! Statement execution, tail evaluation, and scopes.

use crate::errors::{
    not_a_list, not_spreadable, recursive_definition_used_as_value, type_mismatch, EvalError,
};
use crate::exec::call;
use crate::executor::{ActionExecutor, Executor};
use crate::frame::Frame;
use crate::function::Closure;
use crate::ir::{Op, OpKind, ScopeExec};
use crate::record::{Module, ModuleDict};
use crate::value::Value;
use std::rc::Rc;

impl Op {
    /// Execute this operation as a statement, sending generated values
    /// and fields to `executor`.
    ///
    /// Expressions are one-value generators: the default arm evaluates
    /// and pushes. Actions generate nothing under any executor.
    pub fn exec(&self, frame: &mut Frame, executor: &mut dyn Executor) -> Result<(), EvalError> {
        match &self.kind {
            OpKind::NullAction => Ok(()),
            OpKind::Compound(parts) => {
                for part in parts {
                    part.exec(frame, executor)?;
                }
                Ok(())
            }
            OpKind::Preaction { actions, body } => {
                actions.exec(frame, &mut ActionExecutor)?;
                body.exec(frame, executor)
            }
            OpKind::Block { scope, body } => {
                scope.exec(frame)?;
                body.exec(frame, executor)
            }
            OpKind::If { cond, then } => {
                if self.condition(cond, frame)? {
                    then.exec(frame, executor)?;
                }
                Ok(())
            }
            OpKind::IfElse { cond, then, els } => {
                if self.condition(cond, frame)? {
                    then.exec(frame, executor)
                } else {
                    els.exec(frame, executor)
                }
            }
            OpKind::For {
                pattern,
                list,
                body,
            } => {
                let value = list.eval(frame)?;
                let Some(items) = value.as_list() else {
                    return Err(not_a_list(list.phrase, value.type_name()));
                };
                let items = items.to_vec();
                for item in items {
                    pattern.bind_into_frame(item, frame)?;
                    body.exec(frame, executor)?;
                }
                Ok(())
            }
            OpKind::While { cond, body } => {
                while self.condition(cond, frame)? {
                    body.exec(frame, &mut ActionExecutor)?;
                }
                Ok(())
            }
            OpKind::Spread(arg) => {
                let value = arg.eval(frame)?;
                match &value {
                    Value::List(items) => {
                        for item in items.iter() {
                            executor.push_value(item.clone(), self.phrase)?;
                        }
                        Ok(())
                    }
                    Value::Record(rec) => {
                        for (name, item) in rec.iter() {
                            executor.push_field(name.clone(), item.clone(), self.phrase)?;
                        }
                        Ok(())
                    }
                    Value::Module(module) => {
                        for (name, item) in module.fields() {
                            executor.push_field(name, item, self.phrase)?;
                        }
                        Ok(())
                    }
                    other => Err(not_spreadable(self.phrase, other.type_name())),
                }
            }
            OpKind::Assoc { name, value } => {
                let name = name.eval(frame)?;
                let value = value.eval(frame)?;
                executor.push_field(name, value, self.phrase)
            }
            OpKind::Assign { locative, expr } => {
                let value = expr.eval(frame)?;
                locative.store(frame, value)
            }
            OpKind::DataSetter {
                module_slot,
                pattern,
                definiens,
            } => {
                let value = definiens.eval(frame)?;
                match module_slot {
                    None => pattern.bind_into_frame(value, frame),
                    Some(slot) => {
                        let module = scope_module(frame, *slot, self)?;
                        pattern.bind_into_module(value, frame, &module)
                    }
                }
            }
            OpKind::FunctionSetter {
                module_slot,
                nonlocals,
                elements,
            } => {
                // One shared nonlocal module for the whole bundle;
                // mutual references resolve through it.
                tracing::debug!(members = elements.len(), "binding recursive function bundle");
                let shared = nonlocals.eval_module(frame)?;
                let module = match module_slot {
                    None => None,
                    Some(slot) => Some(scope_module(frame, *slot, self)?),
                };
                for element in elements {
                    let closure = Value::Closure(Closure {
                        lambda: element.lambda.clone(),
                        nonlocals: shared.clone(),
                    });
                    match &module {
                        None => frame[element.slot] = closure,
                        Some(module) => module.set(element.slot, closure),
                    }
                }
                Ok(())
            }
            OpKind::IncludeSetter {
                module_slot,
                elements,
            } => {
                let module = match module_slot {
                    None => None,
                    Some(slot) => Some(scope_module(frame, *slot, self)?),
                };
                for element in elements {
                    match &module {
                        None => frame[element.slot] = element.value.clone(),
                        Some(module) => module.set(element.slot, element.value.clone()),
                    }
                }
                Ok(())
            }
            OpKind::RecursiveDefinition => {
                Err(recursive_definition_used_as_value(self.phrase))
            }
            OpKind::Print(arg) => {
                let value = arg.eval(frame)?;
                frame.system.console().writeln(&value.display_value());
                Ok(())
            }
            // Every expression is a generator of exactly one value.
            _ => {
                let value = self.eval(frame)?;
                executor.push_value(value, self.phrase)
            }
        }
    }

    /// Tail evaluation: either replace the frame and stage the next
    /// operation, or finalize `frame.result`. The tail positions are
    /// `if/else` branches, block and preaction bodies, and calls;
    /// everything else finalizes through plain `eval`.
    pub fn tail_eval(&self, frame: &mut Box<Frame>) -> Result<(), EvalError> {
        match &self.kind {
            OpKind::IfElse { cond, then, els } => {
                let branch = if self.condition(cond, frame)? {
                    then
                } else {
                    els
                };
                frame.next_op = Some(branch.clone());
                Ok(())
            }
            OpKind::Block { scope, body } => {
                scope.exec(frame)?;
                frame.next_op = Some(body.clone());
                Ok(())
            }
            OpKind::Preaction { actions, body } => {
                actions.exec(frame, &mut ActionExecutor)?;
                frame.next_op = Some(body.clone());
                Ok(())
            }
            OpKind::Call { func, arg } => call::tail_call(self, func, arg, frame),
            _ => {
                frame.result = self.eval(frame)?;
                Ok(())
            }
        }
    }

    /// Evaluate a module expression to its module.
    pub fn eval_module(&self, frame: &mut Frame) -> Result<Module, EvalError> {
        match &self.kind {
            OpKind::ConstModule(module) => Ok(module.clone()),
            OpKind::EnumModule { dict, exprs } => {
                let module = Module::new(dict.clone());
                for (slot, expr) in exprs.iter().enumerate() {
                    module.set(slot, expr.eval(frame)?);
                }
                Ok(module)
            }
            OpKind::ScopedModule(scope) => scope.eval_module(frame),
            _ => {
                let value = self.eval(frame)?;
                match value {
                    Value::Module(module) => Ok(module),
                    other => Err(type_mismatch(self.phrase, "record", other.type_name())),
                }
            }
        }
    }
}

/// The module a setter's `module_slot` points at.
fn scope_module(frame: &Frame, slot: usize, op: &Op) -> Result<Module, EvalError> {
    match &frame[slot] {
        Value::Module(module) => Ok(module.clone()),
        other => Err(type_mismatch(op.phrase, "record", other.type_name())),
    }
}

impl ScopeExec {
    /// Execute a block's definitions and actions in order.
    pub fn exec(&self, frame: &mut Frame) -> Result<(), EvalError> {
        for action in &self.actions {
            action.exec(frame, &mut ActionExecutor)?;
        }
        Ok(())
    }

    /// Build this scope's module: allocate it, store it in the frame
    /// first so recursive references through `ModuleRef` resolve, then
    /// run the setters that fill its slots.
    pub fn eval_module(&self, frame: &mut Frame) -> Result<Module, EvalError> {
        let dict = match &self.dictionary {
            Some(dict) => dict.clone(),
            None => Rc::new(ModuleDict::new(Vec::new())),
        };
        let module = Module::new(dict);
        if let Some(slot) = self.module_slot {
            frame[slot] = Value::Module(module.clone());
        }
        for action in &self.actions {
            action.exec(frame, &mut ActionExecutor)?;
        }
        Ok(module)
    }
}
