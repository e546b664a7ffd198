use std::fmt::{Display, Formatter};
use std::io::Write;
use std::rc::Rc;
use crate::compiler::ast::{BlockStatement, Expression, FunctionLiteral, InfixOperator, PrefixOperator, Program, Statement};
use crate::compiler::environment::{EnvId, Environments};
use crate::compiler::evaluator::value::{Function, Value};

pub mod builtins;
pub mod value;


#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    UndefinedVariable(String),
    TypeMismatch {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    UnknownInfixOperator {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: &'static str,
    },
    NotAFunction(&'static str),
    WrongArgumentCount {
        name: String,
        got: usize,
        want: usize,
    },
    UnsupportedArgument {
        name: &'static str,
        got: &'static str,
    },
    DivisionByZero,
    IndexNotSupported {
        left: &'static str,
        index: &'static str,
    },
    /// The program still contains a node left behind by a parse error.
    InvalidExpression,
    Output(String),
}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::UndefinedVariable(name) => write!(f, "identifier not found: {}", name),
            EvalError::TypeMismatch { left, operator, right } => write!(f, "type mismatch: {} {} {}", left, operator, right),
            EvalError::UnknownInfixOperator { left, operator, right } => write!(f, "unknown operator: {} {} {}", left, operator, right),
            EvalError::UnknownPrefixOperator { operator, operand } => write!(f, "unknown operator: {}{}", operator, operand),
            EvalError::NotAFunction(type_name) => write!(f, "not a function: {}", type_name),
            EvalError::WrongArgumentCount { name, got, want } => write!(f, "wrong number of arguments to `{}`: got={}, want={}", name, got, want),
            EvalError::UnsupportedArgument { name, got } => write!(f, "argument to `{}` not supported, got {}", name, got),
            EvalError::DivisionByZero => write!(f, "division by zero"),
            EvalError::IndexNotSupported { left, index } => write!(f, "index operator not supported: {}[{}]", left, index),
            EvalError::InvalidExpression => write!(f, "cannot evaluate an invalid expression"),
            EvalError::Output(message) => write!(f, "could not write output: {}", message),
        }
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluates an operand. A `hi` reached inside it is handed straight back to the caller,
/// so it keeps unwinding up to the enclosing call.
macro_rules! operand {
    ($evaluator:expr, $expression:expr, $env:expr) => {
        match $evaluator.eval_expression($expression, $env)? {
            value @ Value::ReturnValue(_) => return Ok(value),
            value => value,
        }
    };
}

/// Tree-walking interpreter. Bindings made at the top level persist across calls to
/// [`Evaluator::eval`], and `SpeakNow` output is written to `out`.
pub struct Evaluator<W: Write> {
    environments: Environments,
    global: EnvId,

    out: W,
}

impl<W: Write> Evaluator<W> {
    pub fn new(out: W) -> Evaluator<W> {
        let mut environments = Environments::new();
        let global = environments.new_global();

        Evaluator { environments, global, out }
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn eval(&mut self, program: &Program) -> EvalResult<Value> {
        self.eval_program(program, self.global)
    }

    /// Evaluates and writes the display string of the result (or the error) followed by a newline.
    pub fn eval_and_print(&mut self, program: &Program) -> std::io::Result<()> {
        match self.eval(program) {
            Ok(value) => writeln!(self.out, "{}", value),
            Err(err) => writeln!(self.out, "ERROR: {}", err),
        }
    }

    pub fn eval_program(&mut self, program: &Program, env: EnvId) -> EvalResult<Value> {
        let mut result = Value::Null;

        for statement in &program.statements {
            result = self.eval_statement(statement, env)?;

            if let Value::ReturnValue(value) = result {
                return Ok(*value);
            }
        }

        Ok(result)
    }

    fn eval_block(&mut self, block: &BlockStatement, env: EnvId) -> EvalResult<Value> {
        let mut result = Value::Null;

        for statement in &block.statements {
            result = self.eval_statement(statement, env)?;

            // Leave the return wrapped so enclosing blocks keep unwinding
            if let Value::ReturnValue(_) = result {
                return Ok(result);
            }
        }

        Ok(result)
    }

    fn eval_statement(&mut self, statement: &Statement, env: EnvId) -> EvalResult<Value> {
        match statement {
            Statement::Let { name, value, .. } => {
                let value = operand!(self, value, env);
                self.environments.put_variable(env, &name.name, value);
                Ok(Value::Null)
            },
            Statement::Return { value, .. } => {
                let value = operand!(self, value, env);
                Ok(Value::ReturnValue(Box::new(value)))
            },
            Statement::Expression { expression, .. } => self.eval_expression(expression, env),
        }
    }

    fn eval_expression(&mut self, expression: &Expression, env: EnvId) -> EvalResult<Value> {
        match expression {
            Expression::Variable(identifier) => self.eval_identifier(&identifier.name, env),
            Expression::IntegerLiteral { value, .. } => Ok(Value::Integer(*value)),
            Expression::FloatLiteral { value, .. } => Ok(Value::Float(*value)),
            Expression::StringLiteral { value, .. } => Ok(Value::String(value.clone())),
            Expression::Boolean { value, .. } => Ok(Value::Bool(*value)),

            Expression::Prefix { operator, right, .. } => {
                let right = operand!(self, right, env);
                eval_prefix(*operator, right)
            },
            Expression::Infix { left, operator, right, .. } => {
                let left = operand!(self, left, env);
                let right = operand!(self, right, env);

                eval_infix(*operator, left, right)
            },

            Expression::If { condition, consequence, alternative, .. } => {
                let condition = operand!(self, condition, env);

                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(Value::Null)
                }
            },
            Expression::Function(function) => Ok(self.make_function(function, env)),
            Expression::Call { function, arguments, .. } => {
                let callee = operand!(self, function, env);
                let mut args = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    args.push(operand!(self, argument, env));
                }

                self.apply_function(&function.to_string(), callee, args)
            },

            Expression::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());

                for element in elements {
                    values.push(operand!(self, element, env));
                }

                Ok(Value::Array(values))
            },
            Expression::Index { left, index, .. } => {
                let left = operand!(self, left, env);
                let index = operand!(self, index, env);

                eval_index(left, index)
            },

            Expression::Error => Err(EvalError::InvalidExpression),
        }
    }

    fn eval_identifier(&self, name: &str, env: EnvId) -> EvalResult<Value> {
        if let Some(value) = self.environments.find_variable(env, name) {
            return Ok(value.clone());
        }

        builtins::lookup(name)
            .map(Value::Builtin)
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_owned()))
    }

    fn make_function(&self, function: &FunctionLiteral, env: EnvId) -> Value {
        Value::Function(Rc::new(Function {
            parameters: function.parameters.iter().map(|parameter| parameter.name.clone()).collect(),
            body: function.body.clone(),
            env,
        }))
    }

    fn apply_function(&mut self, name: &str, callee: Value, args: Vec<Value>) -> EvalResult<Value> {
        match callee {
            Value::Function(function) => {
                if function.parameters.len() != args.len() {
                    return Err(EvalError::WrongArgumentCount { name: name.to_owned(), got: args.len(), want: function.parameters.len() });
                }

                let mark = self.environments.mark();
                let call_env = self.environments.new_with_parent(function.env);

                for (parameter, arg) in function.parameters.iter().zip(args) {
                    self.environments.put_variable(call_env, parameter, arg);
                }

                let result = self.eval_block(&function.body, call_env).map(Value::unwrap_return);

                // Code running in the call only binds into scopes created since `mark`,
                // so the result is the only way one of them can still be reached
                if !matches!(&result, Ok(value) if value.captures_scope_since(mark)) {
                    self.environments.release(mark);
                }

                result
            },
            Value::Builtin(builtin) => (builtin.function)(&args, &mut self.out),
            other => Err(EvalError::NotAFunction(other.type_name())),
        }
    }
}

fn eval_prefix(operator: PrefixOperator, right: Value) -> EvalResult<Value> {
    match (operator, right) {
        (PrefixOperator::Not, right) => Ok(Value::Bool(!right.is_truthy())),
        (PrefixOperator::Negate, Value::Integer(value)) => Ok(Value::Integer(value.wrapping_neg())),
        (PrefixOperator::Negate, Value::Float(value)) => Ok(Value::Float(-value)),
        (operator, right) => Err(EvalError::UnknownPrefixOperator { operator, operand: right.type_name() }),
    }
}

fn eval_infix(operator: InfixOperator, left: Value, right: Value) -> EvalResult<Value> {
    match (&left, &right) {
        (Value::Integer(left), Value::Integer(right)) => eval_integer_infix(operator, *left, *right),
        (Value::Float(left), Value::Float(right)) => eval_float_infix(operator, *left, *right),
        (Value::Integer(left), Value::Float(right)) => eval_float_infix(operator, *left as f64, *right),
        (Value::Float(left), Value::Integer(right)) => eval_float_infix(operator, *left, *right as f64),
        (Value::String(left), Value::String(right)) => eval_string_infix(operator, left, right),
        (Value::Bool(left), Value::Bool(right)) => match operator {
            InfixOperator::Equal => Ok(Value::Bool(left == right)),
            InfixOperator::NotEqual => Ok(Value::Bool(left != right)),
            _ => Err(unknown_operator(operator, "BOOL", "BOOL")),
        },
        (Value::Null, Value::Null) => match operator {
            InfixOperator::Equal => Ok(Value::Bool(true)),
            InfixOperator::NotEqual => Ok(Value::Bool(false)),
            _ => Err(unknown_operator(operator, "NULL", "NULL")),
        },
        _ if left.type_name() != right.type_name() => Err(EvalError::TypeMismatch {
            left: left.type_name(), operator, right: right.type_name(),
        }),
        _ => Err(unknown_operator(operator, left.type_name(), right.type_name())),
    }
}

fn unknown_operator(operator: InfixOperator, left: &'static str, right: &'static str) -> EvalError {
    EvalError::UnknownInfixOperator { left, operator, right }
}

fn eval_integer_infix(operator: InfixOperator, left: i64, right: i64) -> EvalResult<Value> {
    Ok(match operator {
        InfixOperator::Add => Value::Integer(left.wrapping_add(right)),
        InfixOperator::Subtract => Value::Integer(left.wrapping_sub(right)),
        InfixOperator::Multiply => Value::Integer(left.wrapping_mul(right)),
        InfixOperator::Divide => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }

            Value::Integer(left.wrapping_div(right))
        },
        InfixOperator::Equal => Value::Bool(left == right),
        InfixOperator::NotEqual => Value::Bool(left != right),
        InfixOperator::Less => Value::Bool(left < right),
        InfixOperator::LessEqual => Value::Bool(left <= right),
        InfixOperator::Greater => Value::Bool(left > right),
        InfixOperator::GreaterEqual => Value::Bool(left >= right),
        InfixOperator::And | InfixOperator::Or => return Err(unknown_operator(operator, "INTEGER", "INTEGER")),
    })
}

fn eval_float_infix(operator: InfixOperator, left: f64, right: f64) -> EvalResult<Value> {
    Ok(match operator {
        InfixOperator::Add => Value::Float(left + right),
        InfixOperator::Subtract => Value::Float(left - right),
        InfixOperator::Multiply => Value::Float(left * right),
        InfixOperator::Divide => Value::Float(left / right),
        InfixOperator::Equal => Value::Bool(left == right),
        InfixOperator::NotEqual => Value::Bool(left != right),
        InfixOperator::Less => Value::Bool(left < right),
        InfixOperator::LessEqual => Value::Bool(left <= right),
        InfixOperator::Greater => Value::Bool(left > right),
        InfixOperator::GreaterEqual => Value::Bool(left >= right),
        InfixOperator::And | InfixOperator::Or => return Err(unknown_operator(operator, "FLOAT", "FLOAT")),
    })
}

fn eval_string_infix(operator: InfixOperator, left: &str, right: &str) -> EvalResult<Value> {
    match operator {
        InfixOperator::Add => Ok(Value::String(format!("{}{}", left, right))),
        InfixOperator::Equal => Ok(Value::Bool(left == right)),
        InfixOperator::NotEqual => Ok(Value::Bool(left != right)),
        _ => Err(unknown_operator(operator, "STRING", "STRING")),
    }
}

fn eval_index(left: Value, index: Value) -> EvalResult<Value> {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(index)) => Ok(usize::try_from(*index).ok()
            .and_then(|index| elements.get(index))
            .cloned()
            .unwrap_or(Value::Null)),
        _ => Err(EvalError::IndexNotSupported { left: left.type_name(), index: index.type_name() }),
    }
}
