//! The compiled operation tree.
//!
//! Analysis turns the syntax tree into a tree of `Op` nodes; the tree
//! is immutable from then on and shared read-only by every evaluation.
//! The node set is a closed union: the analyzer and evaluator are
//! co-designed, so an open hierarchy buys nothing and a closed one
//! gets exhaustiveness checking on every dispatch.
//!
//! Three families:
//!
//! - expressions evaluate to one value (`eval`), and double as
//!   one-value generators under `exec`;
//! - statements execute for their effects (`exec`), producing values
//!   or fields through an `Executor`;
//! - actions are statements that produce nothing, legal under every
//!   executor.
//!
//! Nodes are built with the constructor functions at the bottom of
//! this module, which also compute the `pure` flag analysis relies on.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use lathe_ir::{Phrase, Slot, Symbol};
use rustc_hash::FxHasher;

use crate::function::Lambda;
use crate::heap::Heap;
use crate::locative::Locative;
use crate::pattern::Pattern;
use crate::record::{Module, ModuleDict};
use crate::value::Value;

/// A shared, immutable operation node.
pub type SharedOp = Rc<Op>;

/// One compiled construct.
pub struct Op {
    /// The syntax this operation was compiled from.
    pub phrase: Phrase,
    /// True when evaluation is referentially transparent: no side
    /// effects, value depends only on arguments and constants. Set by
    /// the constructors; legalizes caching and hashing.
    pub pure: bool,
    pub kind: OpKind,
}

/// Prefix operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Pos,
    Neg,
}

/// Strict infix operators. `and`/`or` are separate nodes because they
/// short-circuit; everything here evaluates both operands first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Surface token, used in shape-compiler output.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// One piece of an interpolated string.
pub enum Segment {
    /// Literal text.
    Literal(Heap<String>),
    /// `$name` - string contents, or printed form for non-strings.
    Ident(SharedOp),
    /// `${expr}` - same conversion as `Ident`.
    Brace(SharedOp),
    /// `$(expr)` - always the printed form.
    Paren(SharedOp),
    /// `$[expr]` - code point or list of code points to characters.
    Bracket(SharedOp),
}

/// A field selector: fixed at analysis time, or computed from an
/// interpolated string.
pub enum SymbolExpr {
    Fixed(Symbol),
    Dynamic(SharedOp),
}

/// The compiled definitions and actions of a module or block.
pub struct ScopeExec {
    /// For a module constructor, where the module lives in the frame;
    /// `None` for a plain block.
    pub module_slot: Option<Slot>,
    /// For a module constructor, the field dictionary.
    pub dictionary: Option<Rc<ModuleDict>>,
    /// Setters and action statements, in execution order.
    pub actions: Vec<SharedOp>,
}

/// One member of a mutually recursive closure bundle.
pub struct FunctionElement {
    /// Binding slot: a frame slot for a block, a module slot when the
    /// enclosing scope builds a module.
    pub slot: Slot,
    pub lambda: Heap<Lambda>,
}

/// One pre-evaluated binding spliced in by `include`.
pub struct IncludeElement {
    pub slot: Slot,
    pub value: Value,
}

pub enum OpKind {
    // Expressions
    /// A value known at analysis time.
    Constant(Value),
    /// Dynamic lookup in the ambient global environment.
    SymbolicRef(Symbol),
    /// A local frame slot.
    DataRef(Slot),
    /// A slot of the captured nonlocal module. Reading a lambda out of
    /// it yields a closure over the current frame's nonlocals; that is
    /// how mutually recursive bundle members reach each other.
    NonlocalRef(Slot),
    /// A slot of the module stored at another frame slot; resolves
    /// recursive references inside a module under construction.
    ModuleRef { slot: Slot, index: Slot },
    Call {
        func: SharedOp,
        arg: SharedOp,
    },
    Unary {
        op: UnaryOp,
        arg: SharedOp,
    },
    Binary {
        op: BinaryOp,
        lhs: SharedOp,
        rhs: SharedOp,
    },
    And {
        lhs: SharedOp,
        rhs: SharedOp,
    },
    Or {
        lhs: SharedOp,
        rhs: SharedOp,
    },
    /// `value :: predicate` - asserts the predicate holds, then yields
    /// the value.
    Ensure {
        arg: SharedOp,
        predicate: SharedOp,
    },
    Range {
        first: SharedOp,
        last: SharedOp,
        step: Option<SharedOp>,
        half_open: bool,
    },
    /// `[...]` - element operations run as value generators.
    List(Vec<SharedOp>),
    /// `{...}` - field operations run as field generators.
    Record(Vec<SharedOp>),
    /// `if` without `else`: a statement; evaluating it is an error.
    If {
        cond: SharedOp,
        then: SharedOp,
    },
    IfElse {
        cond: SharedOp,
        then: SharedOp,
        els: SharedOp,
    },
    /// Field access `base.name`.
    Dot {
        base: SharedOp,
        selector: SymbolExpr,
    },
    /// Interpolated string.
    Str(Vec<Segment>),
    /// Evaluates to a closure over a freshly built nonlocal module.
    Lambda {
        lambda: Heap<Lambda>,
        /// A module expression constructing the captured environment.
        nonlocals: SharedOp,
    },
    /// Constructs a record with an attached reconstructor closure.
    Parametric {
        ctor: SharedOp,
    },
    // Module expressions
    ConstModule(Module),
    /// Dictionary plus one expression per slot.
    EnumModule {
        dict: Rc<ModuleDict>,
        exprs: Vec<SharedOp>,
    },
    ScopedModule(ScopeExec),

    // Statements
    NullAction,
    /// A statement sequence.
    Compound(Vec<SharedOp>),
    /// Actions followed by a body; a block with no definitions.
    Preaction {
        actions: SharedOp,
        body: SharedOp,
    },
    Block {
        scope: ScopeExec,
        body: SharedOp,
    },
    For {
        pattern: Rc<Pattern>,
        list: SharedOp,
        body: SharedOp,
    },
    While {
        cond: SharedOp,
        body: SharedOp,
    },
    /// `...arg` - splats a list or record into the surrounding
    /// generator.
    Spread(SharedOp),
    /// Field generator `name: value`.
    Assoc {
        name: SymbolExpr,
        value: SharedOp,
    },
    /// `locative := expr`.
    Assign {
        locative: Rc<Locative>,
        expr: SharedOp,
    },
    /// Initializes the slots of a data definition.
    DataSetter {
        module_slot: Option<Slot>,
        pattern: Rc<Pattern>,
        definiens: SharedOp,
    },
    /// Initializes a group of mutually recursive closures sharing one
    /// nonlocal module.
    FunctionSetter {
        module_slot: Option<Slot>,
        /// An enum-module expression building the shared nonlocals.
        nonlocals: SharedOp,
        elements: Vec<FunctionElement>,
    },
    IncludeSetter {
        module_slot: Option<Slot>,
        elements: Vec<IncludeElement>,
    },
    /// Placeholder for a recursive definition referenced as a value;
    /// evaluating or executing it reports the misuse.
    RecursiveDefinition,
    /// Debug action: writes the argument's display form to the system
    /// console.
    Print(SharedOp),
}

fn op(phrase: Phrase, pure: bool, kind: OpKind) -> SharedOp {
    Rc::new(Op { phrase, pure, kind })
}

/// Constructors. Used by the analyzer; purity propagation lives here
/// so the flag can never drift from the node shape.
impl Op {
    pub fn constant(phrase: Phrase, value: Value) -> SharedOp {
        op(phrase, true, OpKind::Constant(value))
    }

    pub fn symbolic_ref(phrase: Phrase, name: Symbol) -> SharedOp {
        op(phrase, false, OpKind::SymbolicRef(name))
    }

    pub fn data_ref(phrase: Phrase, slot: Slot) -> SharedOp {
        op(phrase, false, OpKind::DataRef(slot))
    }

    pub fn nonlocal_ref(phrase: Phrase, slot: Slot) -> SharedOp {
        op(phrase, false, OpKind::NonlocalRef(slot))
    }

    pub fn module_ref(phrase: Phrase, slot: Slot, index: Slot) -> SharedOp {
        op(phrase, false, OpKind::ModuleRef { slot, index })
    }

    pub fn call(phrase: Phrase, func: SharedOp, arg: SharedOp) -> SharedOp {
        let pure = func.pure && arg.pure;
        op(phrase, pure, OpKind::Call { func, arg })
    }

    pub fn unary(phrase: Phrase, operator: UnaryOp, arg: SharedOp) -> SharedOp {
        let pure = arg.pure;
        op(phrase, pure, OpKind::Unary { op: operator, arg })
    }

    pub fn binary(phrase: Phrase, operator: BinaryOp, lhs: SharedOp, rhs: SharedOp) -> SharedOp {
        let pure = lhs.pure && rhs.pure;
        op(
            phrase,
            pure,
            OpKind::Binary {
                op: operator,
                lhs,
                rhs,
            },
        )
    }

    pub fn and(phrase: Phrase, lhs: SharedOp, rhs: SharedOp) -> SharedOp {
        let pure = lhs.pure && rhs.pure;
        op(phrase, pure, OpKind::And { lhs, rhs })
    }

    pub fn or(phrase: Phrase, lhs: SharedOp, rhs: SharedOp) -> SharedOp {
        let pure = lhs.pure && rhs.pure;
        op(phrase, pure, OpKind::Or { lhs, rhs })
    }

    pub fn ensure(phrase: Phrase, arg: SharedOp, predicate: SharedOp) -> SharedOp {
        let pure = arg.pure && predicate.pure;
        op(phrase, pure, OpKind::Ensure { arg, predicate })
    }

    pub fn range(
        phrase: Phrase,
        first: SharedOp,
        last: SharedOp,
        step: Option<SharedOp>,
        half_open: bool,
    ) -> SharedOp {
        op(
            phrase,
            false,
            OpKind::Range {
                first,
                last,
                step,
                half_open,
            },
        )
    }

    pub fn list(phrase: Phrase, elements: Vec<SharedOp>) -> SharedOp {
        let pure = elements.iter().all(|e| e.pure);
        op(phrase, pure, OpKind::List(elements))
    }

    pub fn record(phrase: Phrase, fields: Vec<SharedOp>) -> SharedOp {
        op(phrase, false, OpKind::Record(fields))
    }

    pub fn if_op(phrase: Phrase, cond: SharedOp, then: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::If { cond, then })
    }

    pub fn if_else(phrase: Phrase, cond: SharedOp, then: SharedOp, els: SharedOp) -> SharedOp {
        let pure = cond.pure && then.pure && els.pure;
        op(phrase, pure, OpKind::IfElse { cond, then, els })
    }

    pub fn dot(phrase: Phrase, base: SharedOp, selector: SymbolExpr) -> SharedOp {
        op(phrase, false, OpKind::Dot { base, selector })
    }

    pub fn string_expr(phrase: Phrase, segments: Vec<Segment>) -> SharedOp {
        op(phrase, false, OpKind::Str(segments))
    }

    pub fn literal_segment(text: impl Into<String>) -> Segment {
        Segment::Literal(Heap::new(text.into()))
    }

    pub fn lambda_expr(phrase: Phrase, lambda: Heap<Lambda>, nonlocals: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Lambda { lambda, nonlocals })
    }

    pub fn parametric(phrase: Phrase, ctor: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Parametric { ctor })
    }

    pub fn const_module(phrase: Phrase, module: Module) -> SharedOp {
        op(phrase, false, OpKind::ConstModule(module))
    }

    pub fn enum_module(phrase: Phrase, dict: Rc<ModuleDict>, exprs: Vec<SharedOp>) -> SharedOp {
        op(phrase, false, OpKind::EnumModule { dict, exprs })
    }

    pub fn scoped_module(phrase: Phrase, scope: ScopeExec) -> SharedOp {
        op(phrase, false, OpKind::ScopedModule(scope))
    }

    pub fn null_action(phrase: Phrase) -> SharedOp {
        op(phrase, false, OpKind::NullAction)
    }

    pub fn compound(phrase: Phrase, parts: Vec<SharedOp>) -> SharedOp {
        op(phrase, false, OpKind::Compound(parts))
    }

    pub fn preaction(phrase: Phrase, actions: SharedOp, body: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Preaction { actions, body })
    }

    pub fn block(phrase: Phrase, scope: ScopeExec, body: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Block { scope, body })
    }

    pub fn for_op(
        phrase: Phrase,
        pattern: Rc<Pattern>,
        list: SharedOp,
        body: SharedOp,
    ) -> SharedOp {
        op(
            phrase,
            false,
            OpKind::For {
                pattern,
                list,
                body,
            },
        )
    }

    pub fn while_op(phrase: Phrase, cond: SharedOp, body: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::While { cond, body })
    }

    pub fn spread(phrase: Phrase, arg: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Spread(arg))
    }

    pub fn assoc(phrase: Phrase, name: SymbolExpr, value: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Assoc { name, value })
    }

    pub fn assign(phrase: Phrase, locative: Rc<Locative>, expr: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Assign { locative, expr })
    }

    pub fn data_setter(
        phrase: Phrase,
        module_slot: Option<Slot>,
        pattern: Rc<Pattern>,
        definiens: SharedOp,
    ) -> SharedOp {
        op(
            phrase,
            false,
            OpKind::DataSetter {
                module_slot,
                pattern,
                definiens,
            },
        )
    }

    pub fn function_setter(
        phrase: Phrase,
        module_slot: Option<Slot>,
        nonlocals: SharedOp,
        elements: Vec<FunctionElement>,
    ) -> SharedOp {
        op(
            phrase,
            false,
            OpKind::FunctionSetter {
                module_slot,
                nonlocals,
                elements,
            },
        )
    }

    pub fn include_setter(
        phrase: Phrase,
        module_slot: Option<Slot>,
        elements: Vec<IncludeElement>,
    ) -> SharedOp {
        op(phrase, false, OpKind::IncludeSetter { module_slot, elements })
    }

    pub fn recursive_definition(phrase: Phrase) -> SharedOp {
        op(phrase, false, OpKind::RecursiveDefinition)
    }

    pub fn print(phrase: Phrase, arg: SharedOp) -> SharedOp {
        op(phrase, false, OpKind::Print(arg))
    }
}

// Hashing of pure operations.
//
// Pure operations can key caches (the shape compiler deduplicates
// lowered subtrees this way). The hash is structural over the node
// shape and stable across executions; phrases do not participate.

impl Op {
    pub fn op_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into(&self, state: &mut FxHasher) {
        std::mem::discriminant(&self.kind).hash(state);
        match &self.kind {
            OpKind::Constant(value) => value.hash(state),
            OpKind::DataRef(slot) | OpKind::NonlocalRef(slot) => slot.hash(state),
            OpKind::ModuleRef { slot, index } => {
                slot.hash(state);
                index.hash(state);
            }
            OpKind::Unary { op, arg } => {
                op.hash(state);
                arg.hash_into(state);
            }
            OpKind::Binary { op, lhs, rhs } => {
                op.hash(state);
                lhs.hash_into(state);
                rhs.hash_into(state);
            }
            OpKind::And { lhs, rhs } | OpKind::Or { lhs, rhs } => {
                lhs.hash_into(state);
                rhs.hash_into(state);
            }
            OpKind::Call { func, arg } => {
                func.hash_into(state);
                arg.hash_into(state);
            }
            OpKind::IfElse { cond, then, els } => {
                cond.hash_into(state);
                then.hash_into(state);
                els.hash_into(state);
            }
            OpKind::List(elements) => {
                elements.len().hash(state);
                for element in elements {
                    element.hash_into(state);
                }
            }
            _ => {
                // The hash contract only covers the pure subset; a
                // non-pure operation must never be used as a key.
                debug_assert!(
                    false,
                    "op_hash on an operation outside the hashable subset"
                );
            }
        }
    }

    /// Structural equality over the hashable subset; agrees with
    /// `op_hash`.
    pub fn op_hash_eq(&self, other: &Op) -> bool {
        match (&self.kind, &other.kind) {
            (OpKind::Constant(a), OpKind::Constant(b)) => a.equal(b),
            (OpKind::DataRef(a), OpKind::DataRef(b))
            | (OpKind::NonlocalRef(a), OpKind::NonlocalRef(b)) => a == b,
            (
                OpKind::ModuleRef { slot: s1, index: i1 },
                OpKind::ModuleRef { slot: s2, index: i2 },
            ) => s1 == s2 && i1 == i2,
            (OpKind::Unary { op: o1, arg: a1 }, OpKind::Unary { op: o2, arg: a2 }) => {
                o1 == o2 && a1.op_hash_eq(a2)
            }
            (
                OpKind::Binary {
                    op: o1,
                    lhs: l1,
                    rhs: r1,
                },
                OpKind::Binary {
                    op: o2,
                    lhs: l2,
                    rhs: r2,
                },
            ) => o1 == o2 && l1.op_hash_eq(l2) && r1.op_hash_eq(r2),
            (OpKind::And { lhs: l1, rhs: r1 }, OpKind::And { lhs: l2, rhs: r2 })
            | (OpKind::Or { lhs: l1, rhs: r1 }, OpKind::Or { lhs: l2, rhs: r2 }) => {
                l1.op_hash_eq(l2) && r1.op_hash_eq(r2)
            }
            (OpKind::Call { func: f1, arg: a1 }, OpKind::Call { func: f2, arg: a2 }) => {
                f1.op_hash_eq(f2) && a1.op_hash_eq(a2)
            }
            (
                OpKind::IfElse {
                    cond: c1,
                    then: t1,
                    els: e1,
                },
                OpKind::IfElse {
                    cond: c2,
                    then: t2,
                    els: e2,
                },
            ) => c1.op_hash_eq(c2) && t1.op_hash_eq(t2) && e1.op_hash_eq(e2),
            (OpKind::List(a), OpKind::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.op_hash_eq(y))
            }
            _ => false,
        }
    }
}

/// Wraps a pure operation for use as a hash-map key.
#[derive(Clone)]
pub struct PureOpKey(pub SharedOp);

impl Hash for PureOpKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.op_hash());
    }
}

impl PartialEq for PureOpKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.op_hash_eq(&other.0)
    }
}

impl Eq for PureOpKey {}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn p() -> Phrase {
        Phrase::SYNTHETIC
    }

    #[test]
    fn constants_are_pure() {
        assert!(Op::constant(p(), Value::Num(1.0)).pure);
        assert!(!Op::data_ref(p(), 0).pure);
    }

    #[test]
    fn purity_propagates_through_operators() {
        let pure = Op::binary(
            p(),
            BinaryOp::Add,
            Op::constant(p(), Value::Num(1.0)),
            Op::constant(p(), Value::Num(2.0)),
        );
        assert!(pure.pure);

        let impure = Op::binary(
            p(),
            BinaryOp::Add,
            Op::constant(p(), Value::Num(1.0)),
            Op::data_ref(p(), 0),
        );
        assert!(!impure.pure);
    }

    #[test]
    fn purity_propagates_through_if_else() {
        let node = Op::if_else(
            p(),
            Op::constant(p(), Value::Bool(true)),
            Op::constant(p(), Value::Num(1.0)),
            Op::constant(p(), Value::Num(2.0)),
        );
        assert!(node.pure);
    }

    #[test]
    fn equal_structure_hashes_equal() {
        let make = || {
            Op::binary(
                p(),
                BinaryOp::Mul,
                Op::data_ref(p(), 1),
                Op::constant(p(), Value::Num(2.0)),
            )
        };
        let a = make();
        let b = make();
        assert_eq!(a.op_hash(), b.op_hash());
        assert!(a.op_hash_eq(&b));
    }

    #[test]
    fn different_structure_does_not_hash_eq() {
        let a = Op::binary(
            p(),
            BinaryOp::Add,
            Op::data_ref(p(), 0),
            Op::constant(p(), Value::Num(1.0)),
        );
        let b = Op::binary(
            p(),
            BinaryOp::Sub,
            Op::data_ref(p(), 0),
            Op::constant(p(), Value::Num(1.0)),
        );
        assert!(!a.op_hash_eq(&b));
    }

    #[test]
    fn pure_op_key_works_in_a_map() {
        let mut cache: FxHashMap<PureOpKey, u32> = FxHashMap::default();
        let key = |n: f64| PureOpKey(Op::constant(p(), Value::Num(n)));
        cache.insert(key(1.0), 10);
        cache.insert(key(2.0), 20);
        assert_eq!(cache.get(&key(1.0)), Some(&10));
        assert_eq!(cache.get(&key(2.0)), Some(&20));
        assert_eq!(cache.len(), 2);
    }
}
