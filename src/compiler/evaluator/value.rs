use std::fmt::{Debug, Display, Formatter};
use std::io::Write;
use std::rc::Rc;
use crate::compiler::ast::BlockStatement;
use crate::compiler::environment::{EnvId, ScopeMark};
use crate::compiler::evaluator::EvalResult;

pub type BuiltinFunction = fn(&[Value], &mut dyn Write) -> EvalResult<Value>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub function: BuiltinFunction,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin {}", self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: EnvId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
    /// Only used to unwind blocks up to the nearest call boundary.
    ReturnValue(Box<Value>),
    Array(Vec<Value>),
    Builtin(Builtin),
    Function(Rc<Function>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Bool(_) => "BOOL",
            Value::String(_) => "STRING",
            Value::Null => "NULL",
            Value::ReturnValue(_) => "RETURN_VAL",
            Value::Array(_) => "ARRAY",
            Value::Builtin(_) => "BUILTIN",
            Value::Function(_) => "FUNCTION",
        }
    }

    /// Only `false` and null are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Null)
    }

    pub fn unwrap_return(self) -> Value {
        match self {
            Value::ReturnValue(value) => *value,
            value => value,
        }
    }

    /// Whether a function inside this value closes over a scope created since `mark`.
    pub fn captures_scope_since(&self, mark: ScopeMark) -> bool {
        match self {
            Value::Function(function) => function.env.is_since(mark),
            Value::Array(elements) => elements.iter().any(|element| element.captures_scope_since(mark)),
            Value::ReturnValue(value) => value.captures_scope_since(mark),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{:.6}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::String(value) => f.write_str(value),
            Value::Null => f.write_str("null"),
            Value::ReturnValue(value) => write!(f, "{}", value),
            Value::Array(elements) => write!(f, "[{}]", elements.iter()
                .map(|element| element.to_string()).collect::<Vec<String>>().join(", ")),
            Value::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Value::Function(function) => write!(f, "isme({}) {{ {} }}", function.parameters.join(", "), function.body),
        }
    }
}
