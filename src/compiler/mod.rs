pub mod ast;
pub mod lexer;
pub mod parser;
pub mod environment;
pub mod evaluator;
pub mod codegen;
pub mod writer;
