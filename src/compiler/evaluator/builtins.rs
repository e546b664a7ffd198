use std::collections::HashMap;
use std::io::Write;
use lazy_static::lazy_static;
use crate::compiler::evaluator::{EvalError, EvalResult};
use crate::compiler::evaluator::value::{Builtin, BuiltinFunction, Value};

/// Name of the output builtin; the code generator special-cases it as well.
pub const PRINT_BUILTIN: &str = "SpeakNow";

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, Builtin> = {
        let entries: [(&'static str, BuiltinFunction); 6] = [
            ("len", len),
            ("debut", debut),
            ("ttpd", ttpd),
            ("rest", rest),
            ("billboard", billboard),
            (PRINT_BUILTIN, speak_now),
        ];

        entries.into_iter().map(|(name, function)| (name, Builtin { name, function })).collect()
    };
}

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.get(name).copied()
}

fn expect_argument_count(name: &str, args: &[Value], want: usize) -> EvalResult<()> {
    if args.len() != want {
        return Err(EvalError::WrongArgumentCount { name: name.to_owned(), got: args.len(), want });
    }

    Ok(())
}

fn expect_array<'a>(name: &'static str, value: &'a Value) -> EvalResult<&'a [Value]> {
    match value {
        Value::Array(elements) => Ok(elements),
        other => Err(EvalError::UnsupportedArgument { name, got: other.type_name() }),
    }
}

fn len(args: &[Value], _: &mut dyn Write) -> EvalResult<Value> {
    expect_argument_count("len", args, 1)?;

    match &args[0] {
        Value::Array(elements) => Ok(Value::Integer(elements.len() as i64)),
        Value::String(value) => Ok(Value::Integer(value.len() as i64)),
        other => Err(EvalError::UnsupportedArgument { name: "len", got: other.type_name() }),
    }
}

fn debut(args: &[Value], _: &mut dyn Write) -> EvalResult<Value> {
    expect_argument_count("debut", args, 1)?;
    let elements = expect_array("debut", &args[0])?;

    Ok(elements.first().cloned().unwrap_or(Value::Null))
}

fn ttpd(args: &[Value], _: &mut dyn Write) -> EvalResult<Value> {
    expect_argument_count("ttpd", args, 1)?;
    let elements = expect_array("ttpd", &args[0])?;

    Ok(elements.last().cloned().unwrap_or(Value::Null))
}

fn rest(args: &[Value], _: &mut dyn Write) -> EvalResult<Value> {
    expect_argument_count("rest", args, 1)?;
    let elements = expect_array("rest", &args[0])?;

    if elements.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Array(elements[1..].to_vec()))
    }
}

fn billboard(args: &[Value], _: &mut dyn Write) -> EvalResult<Value> {
    expect_argument_count("billboard", args, 2)?;
    let elements = expect_array("billboard", &args[0])?;

    let mut pushed = elements.to_vec();
    pushed.push(args[1].clone());
    Ok(Value::Array(pushed))
}

fn speak_now(args: &[Value], out: &mut dyn Write) -> EvalResult<Value> {
    for arg in args {
        writeln!(out, "{}", arg).map_err(|err| EvalError::Output(err.to_string()))?;
    }

    Ok(Value::Null)
}
