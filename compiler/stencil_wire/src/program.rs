//! Typed wire program.
//!
//! The runtime consumes positional JSON arrays: the first element of every
//! statement and expression is its [`SexpOpcode`], the rest is fixed per
//! opcode. These types keep the arrays typed until serialization. Each
//! `Serialize` impl writes one array in the documented field order.

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use stencil_ir::norm::{CurriedType, LiteralValue};

use crate::SexpOpcode;

/// Writes one positional array. Elements are serialized in order.
macro_rules! sexp {
    (@unit $element:expr) => {
        ()
    };
    ($serializer:expr; $($element:expr),+ $(,)?) => {{
        let len = [$(sexp!(@unit $element)),+].len();
        let mut seq = $serializer.serialize_seq(Some(len))?;
        $(seq.serialize_element($element)?;)+
        seq.end()
    }};
}

// ─── Program ───

/// A compiled template: `[statements, symbols, hasEval, upvars]`.
#[derive(Clone, Debug, PartialEq)]
pub struct WireProgram {
    pub statements: Vec<Statement>,
    /// Slot names; slot `n` is `symbols[n - 1]`.
    pub symbols: Vec<String>,
    pub has_eval: bool,
    /// Free variable names in first-use order.
    pub upvars: Vec<String>,
}

impl WireProgram {
    /// Compact JSON, as handed to the runtime.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for WireProgram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        sexp!(serializer; &self.statements, &self.symbols, &self.has_eval, &self.upvars)
    }
}

/// Inline block: `[statements, parameterSlots]`.
#[derive(Clone, Debug, PartialEq)]
pub struct WireBlock {
    pub statements: Vec<Statement>,
    pub params: Vec<u32>,
}

impl Serialize for WireBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        sexp!(serializer; &self.statements, &self.params)
    }
}

/// Named blocks as parallel arrays: `[names, blocks]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedBlocks {
    pub names: Vec<String>,
    pub blocks: Vec<WireBlock>,
}

impl NamedBlocks {
    pub fn push(&mut self, name: impl Into<String>, block: WireBlock) {
        self.names.push(name.into());
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Serialize for NamedBlocks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        sexp!(serializer; &self.names, &self.blocks)
    }
}

/// Named arguments as parallel arrays: `[keys, values]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WireHash {
    pub keys: Vec<String>,
    pub values: Vec<Expression>,
}

impl Serialize for WireHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        sexp!(serializer; &self.keys, &self.values)
    }
}

/// Positional arguments; `None` serializes as `null`.
pub type Params = Option<Vec<Expression>>;

// ─── Statements ───

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Append(Expression),
    TrustingAppend(Expression),
    Comment(String),
    Modifier {
        callee: Expression,
        params: Params,
        hash: Option<WireHash>,
    },
    Block {
        callee: Expression,
        params: Params,
        hash: Option<WireHash>,
        blocks: NamedBlocks,
    },
    Component {
        tag: Expression,
        /// Attributes, splattributes and modifiers; `None` when there are
        /// none.
        params: Option<Vec<Statement>>,
        hash: Option<WireHash>,
        blocks: NamedBlocks,
    },
    OpenElement {
        tag: String,
        splat: bool,
    },
    FlushElement,
    CloseElement,
    StaticAttr(StaticAttr),
    DynamicAttr(DynamicAttr),
    AttrSplat(u32),
    Yield {
        target: u32,
        params: Params,
    },
    Partial {
        target: Expression,
        eval: Vec<u32>,
    },
    Debugger(Vec<u32>),
    InElement {
        block: WireBlock,
        guid: String,
        destination: Expression,
        insert_before: Option<Expression>,
    },
    If {
        condition: Expression,
        block: WireBlock,
        inverse: Option<WireBlock>,
    },
    Each {
        value: Expression,
        key: Option<Expression>,
        block: WireBlock,
        inverse: Option<WireBlock>,
    },
    With {
        value: Expression,
        block: WireBlock,
        inverse: Option<WireBlock>,
    },
    Let {
        positional: Vec<Expression>,
        block: WireBlock,
    },
    WithDynamicVars {
        hash: Option<WireHash>,
        block: WireBlock,
    },
    InvokeComponent {
        definition: Expression,
        params: Params,
        hash: Option<WireHash>,
        blocks: Option<NamedBlocks>,
    },
}

/// Attribute with a literal value.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticAttr {
    pub name: String,
    pub value: String,
    pub namespace: Option<&'static str>,
    /// Set on component invocations.
    pub component: bool,
}

impl StaticAttr {
    pub fn opcode(&self) -> SexpOpcode {
        if self.component {
            SexpOpcode::StaticComponentAttr
        } else {
            SexpOpcode::StaticAttr
        }
    }
}

/// Attribute whose value is computed at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicAttr {
    pub name: String,
    pub value: Expression,
    pub namespace: Option<&'static str>,
    pub trusting: bool,
    pub component: bool,
}

impl DynamicAttr {
    pub fn opcode(&self) -> SexpOpcode {
        match (self.component, self.trusting) {
            (false, false) => SexpOpcode::DynamicAttr,
            (false, true) => SexpOpcode::TrustingDynamicAttr,
            (true, false) => SexpOpcode::ComponentAttr,
            (true, true) => SexpOpcode::TrustingComponentAttr,
        }
    }
}

impl Statement {
    pub fn opcode(&self) -> SexpOpcode {
        match self {
            Statement::Append(_) => SexpOpcode::Append,
            Statement::TrustingAppend(_) => SexpOpcode::TrustingAppend,
            Statement::Comment(_) => SexpOpcode::Comment,
            Statement::Modifier { .. } => SexpOpcode::Modifier,
            Statement::Block { .. } => SexpOpcode::Block,
            Statement::Component { .. } => SexpOpcode::Component,
            Statement::OpenElement { splat: false, .. } => SexpOpcode::OpenElement,
            Statement::OpenElement { splat: true, .. } => SexpOpcode::OpenElementWithSplat,
            Statement::FlushElement => SexpOpcode::FlushElement,
            Statement::CloseElement => SexpOpcode::CloseElement,
            Statement::StaticAttr(attr) => attr.opcode(),
            Statement::DynamicAttr(attr) => attr.opcode(),
            Statement::AttrSplat(_) => SexpOpcode::AttrSplat,
            Statement::Yield { .. } => SexpOpcode::Yield,
            Statement::Partial { .. } => SexpOpcode::Partial,
            Statement::Debugger(_) => SexpOpcode::Debugger,
            Statement::InElement { .. } => SexpOpcode::InElement,
            Statement::If { .. } => SexpOpcode::If,
            Statement::Each { .. } => SexpOpcode::Each,
            Statement::With { .. } => SexpOpcode::With,
            Statement::Let { .. } => SexpOpcode::Let,
            Statement::WithDynamicVars { .. } => SexpOpcode::WithDynamicVars,
            Statement::InvokeComponent { .. } => SexpOpcode::InvokeComponent,
        }
    }
}

impl Serialize for Statement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let op = self.opcode();
        match self {
            Statement::Append(value) | Statement::TrustingAppend(value) => {
                sexp!(serializer; &op, value)
            }
            Statement::Comment(text) => sexp!(serializer; &op, text),
            Statement::Modifier {
                callee,
                params,
                hash,
            } => sexp!(serializer; &op, callee, params, hash),
            Statement::Block {
                callee,
                params,
                hash,
                blocks,
            } => sexp!(serializer; &op, callee, params, hash, blocks),
            Statement::Component {
                tag,
                params,
                hash,
                blocks,
            } => sexp!(serializer; &op, tag, params, hash, blocks),
            Statement::OpenElement { tag, .. } => sexp!(serializer; &op, tag),
            Statement::FlushElement | Statement::CloseElement => sexp!(serializer; &op),
            Statement::StaticAttr(attr) => match attr.namespace {
                Some(ns) => sexp!(serializer; &op, &attr.name, &attr.value, ns),
                None => sexp!(serializer; &op, &attr.name, &attr.value),
            },
            Statement::DynamicAttr(attr) => match attr.namespace {
                Some(ns) => sexp!(serializer; &op, &attr.name, &attr.value, ns),
                None => sexp!(serializer; &op, &attr.name, &attr.value),
            },
            Statement::AttrSplat(slot) => sexp!(serializer; &op, slot),
            Statement::Yield { target, params } => sexp!(serializer; &op, target, params),
            Statement::Partial { target, eval } => sexp!(serializer; &op, target, eval),
            Statement::Debugger(eval) => sexp!(serializer; &op, eval),
            Statement::InElement {
                block,
                guid,
                destination,
                insert_before,
            } => match insert_before {
                Some(insert_before) => {
                    sexp!(serializer; &op, block, guid, destination, insert_before)
                }
                None => sexp!(serializer; &op, block, guid, destination),
            },
            Statement::If {
                condition,
                block,
                inverse,
            } => sexp!(serializer; &op, condition, block, inverse),
            Statement::Each {
                value,
                key,
                block,
                inverse,
            } => sexp!(serializer; &op, value, key, block, inverse),
            Statement::With {
                value,
                block,
                inverse,
            } => sexp!(serializer; &op, value, block, inverse),
            Statement::Let { positional, block } => sexp!(serializer; &op, positional, block),
            Statement::WithDynamicVars { hash, block } => sexp!(serializer; &op, hash, block),
            Statement::InvokeComponent {
                definition,
                params,
                hash,
                blocks,
            } => sexp!(serializer; &op, definition, params, hash, blocks),
        }
    }
}

// ─── Expressions ───

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// Raw JSON value; `undefined` becomes `[27]`.
    Literal(LiteralValue),
    /// `[30, slot, tail?]`.
    GetSymbol { slot: u32, tail: Vec<String> },
    /// `[op, upvar, tail?]` where `op` encodes the resolution.
    GetFree {
        op: SexpOpcode,
        upvar: u32,
        tail: Vec<String>,
    },
    Call {
        callee: Box<Expression>,
        params: Params,
        hash: Option<WireHash>,
    },
    Concat(Vec<Expression>),
    HasBlock(Box<Expression>),
    HasBlockParams(Box<Expression>),
    Curry {
        definition: Box<Expression>,
        curried: CurriedType,
        params: Params,
        hash: Option<WireHash>,
    },
    Not(Box<Expression>),
    IfInline {
        condition: Box<Expression>,
        truthy: Box<Expression>,
        falsy: Option<Box<Expression>>,
    },
    GetDynamicVar(Box<Expression>),
    Log(Params),
}

impl Expression {
    pub fn symbol(slot: u32) -> Self {
        Expression::GetSymbol {
            slot,
            tail: Vec::new(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(LiteralValue::String(value.into()))
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expression::Literal(value) => serialize_literal(value, serializer),
            Expression::GetSymbol { slot, tail } => {
                let op = SexpOpcode::GetSymbol;
                if tail.is_empty() {
                    sexp!(serializer; &op, slot)
                } else {
                    sexp!(serializer; &op, slot, tail)
                }
            }
            Expression::GetFree { op, upvar, tail } => {
                if tail.is_empty() {
                    sexp!(serializer; op, upvar)
                } else {
                    sexp!(serializer; op, upvar, tail)
                }
            }
            Expression::Call {
                callee,
                params,
                hash,
            } => sexp!(serializer; &SexpOpcode::Call, callee, params, hash),
            Expression::Concat(parts) => sexp!(serializer; &SexpOpcode::Concat, parts),
            Expression::HasBlock(block) => sexp!(serializer; &SexpOpcode::HasBlock, block),
            Expression::HasBlockParams(block) => {
                sexp!(serializer; &SexpOpcode::HasBlockParams, block)
            }
            Expression::Curry {
                definition,
                curried,
                params,
                hash,
            } => {
                let curried = *curried as u8;
                sexp!(serializer; &SexpOpcode::Curry, definition, &curried, params, hash)
            }
            Expression::Not(value) => sexp!(serializer; &SexpOpcode::Not, value),
            Expression::IfInline {
                condition,
                truthy,
                falsy,
            } => sexp!(serializer; &SexpOpcode::IfInline, condition, truthy, falsy),
            Expression::GetDynamicVar(name) => {
                sexp!(serializer; &SexpOpcode::GetDynamicVar, name)
            }
            Expression::Log(params) => sexp!(serializer; &SexpOpcode::Log, params),
        }
    }
}

/// Largest integer an IEEE double holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn serialize_literal<S: Serializer>(
    value: &LiteralValue,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        LiteralValue::String(s) => serializer.serialize_str(s),
        LiteralValue::Number(n) => {
            let negative_zero = *n == 0.0 && n.is_sign_negative();
            if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER && !negative_zero {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "integral and within the exact range of f64"
                )]
                let int = *n as i64;
                serializer.serialize_i64(int)
            } else {
                serializer.serialize_f64(*n)
            }
        }
        LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
        LiteralValue::Null => serializer.serialize_unit(),
        LiteralValue::Undefined => sexp!(serializer; &SexpOpcode::Undefined),
    }
}
