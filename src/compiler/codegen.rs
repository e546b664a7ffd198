use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use crate::compiler::ast::{BlockStatement, Expression, FunctionLiteral, InfixOperator, PrefixOperator, Program, Statement};
use crate::compiler::codegen::symbol_table::{Storage, SymbolTable, SLOT_SIZE};
use crate::compiler::evaluator::builtins::{self, PRINT_BUILTIN};
use crate::compiler::writer::AsmWriter;
use crate::log_debug;

pub mod runtime;
pub mod symbol_table;


const INDENTATION: &str = "    ";

/// `$t0`-`$t9`; every function saves all of them.
const INT_REGISTER_COUNT: usize = 10;
/// `$f0`-`$f31`.
const FLOAT_REGISTER_COUNT: usize = 32;

const SAVED_REGISTERS_SIZE: usize = INT_REGISTER_COUNT * SLOT_SIZE;
/// Saved `$fp` and `$ra`, plus the empty slot left below the arguments by the last push.
const FIRST_PARAMETER_OFFSET: usize = 12;

macro_rules! emit {
    ($writer:expr, $($arg:tt)*) => {
        $writer.instruction(&format!($($arg)*))
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    Bool,
    String,
    Function,
    /// No value, either because the node has none or because generating it failed.
    Void,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Function => "function",
            ValueType::Void => "void",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    Int(usize),
    Float(usize),
    /// Placeholder for nodes without a value.
    Zero,
}

impl Register {
    fn load_instruction(&self) -> &'static str {
        match self {
            Register::Float(_) => "l.s",
            _ => "lw",
        }
    }

    fn store_instruction(&self) -> &'static str {
        match self {
            Register::Float(_) => "s.s",
            _ => "sw",
        }
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Register::Int(index) => write!(f, "$t{}", index),
            Register::Float(index) => write!(f, "$f{}", index),
            Register::Zero => f.write_str("$zero"),
        }
    }
}

/// Where an expression's value ended up, and what it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operand {
    pub register: Register,
    pub ty: ValueType,
}

impl Operand {
    pub fn new(register: Register, ty: ValueType) -> Operand {
        Operand { register, ty }
    }

    pub fn void() -> Operand {
        Operand::new(Register::Zero, ValueType::Void)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CodegenError {
    UnsupportedOperator {
        operator: InfixOperator,
        ty: ValueType,
    },
    UnsupportedPrefix {
        operator: PrefixOperator,
        ty: ValueType,
    },
    UndefinedVariable(String),
    WrongArgumentCount {
        name: String,
        got: usize,
        want: usize,
    },
    UnsupportedPrintType(ValueType),
    UnsupportedNode(String),
    NotCallable(String),
    CapturedVariable(String),
    BranchTypeMismatch {
        consequence: ValueType,
        alternative: ValueType,
    },
    RegisterExhausted(Register),
}

impl CodegenError {
    pub fn severity(&self) -> Severity {
        match self {
            CodegenError::BranchTypeMismatch { .. } | CodegenError::RegisterExhausted(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl Display for CodegenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodegenError::UnsupportedOperator { operator, ty } => write!(f, "unsupported operator `{}` for {} operands", operator, ty),
            CodegenError::UnsupportedPrefix { operator, ty } => write!(f, "unsupported prefix operator `{}` for {} operand", operator, ty),
            CodegenError::UndefinedVariable(name) => write!(f, "undefined variable: {}", name),
            CodegenError::WrongArgumentCount { name, got, want } => write!(f, "wrong number of arguments to `{}`: got={}, want={}", name, got, want),
            CodegenError::UnsupportedPrintType(ty) => write!(f, "`{}` cannot print a {} value", PRINT_BUILTIN, ty),
            CodegenError::UnsupportedNode(what) => write!(f, "{} cannot be compiled", what),
            CodegenError::NotCallable(name) => write!(f, "`{}` is not a function", name),
            CodegenError::CapturedVariable(name) => write!(f, "`{}` belongs to an enclosing function and cannot be captured", name),
            CodegenError::BranchTypeMismatch { consequence, alternative } =>
                write!(f, "if branches produce different types: {} and {}", consequence, alternative),
            CodegenError::RegisterExhausted(register) => write!(f, "register {} is past the end of the register file", register),
        }
    }
}

impl std::error::Error for CodegenError {}

struct FunctionContext {
    end_label: String,
    /// Type of the values given to `hi` so far.
    returns: ValueType,
}

/// Emits MIPS assembly for a program. All allocation state lives in the generator and is
/// reset at the start of every [`Generator::generate`] call.
pub struct Generator {
    data: AsmWriter,
    text: AsmWriter,
    functions: AsmWriter,

    int_registers: usize,
    float_registers: usize,
    int_registers_exhausted: bool,
    float_registers_exhausted: bool,
    labels: usize,

    symbols: SymbolTable,
    function: Option<FunctionContext>,
    function_labels: HashSet<String>,
    globals: HashSet<String>,
    strings: HashMap<String, String>,

    uses_concat: bool,
    uses_compare: bool,

    diagnostics: Vec<CodegenError>,
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new()
    }
}

impl Generator {
    pub fn new() -> Generator {
        Generator {
            data: AsmWriter::new(INDENTATION.to_owned()),
            text: AsmWriter::new(INDENTATION.to_owned()),
            functions: AsmWriter::new(INDENTATION.to_owned()),

            int_registers: 0,
            float_registers: 0,
            int_registers_exhausted: false,
            float_registers_exhausted: false,
            labels: 0,

            symbols: SymbolTable::new(),
            function: None,
            function_labels: HashSet::new(),
            globals: HashSet::new(),
            strings: HashMap::new(),

            uses_concat: false,
            uses_compare: false,

            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics of the last [`Generator::generate`] call, in emission order.
    pub fn diagnostics(&self) -> &[CodegenError] {
        &self.diagnostics
    }

    pub fn had_error(&self) -> bool {
        self.diagnostics.iter().any(|diagnostic| diagnostic.severity() == Severity::Error)
    }

    pub fn generate(&mut self, program: &Program) -> String {
        *self = Generator::new();

        self.text.label("main");
        emit!(self.text, "move $fp, $sp");
        emit!(self.text, "sw $ra, 0($sp)");
        emit!(self.text, "addi $sp, $sp, -4");

        for statement in &program.statements {
            self.generate_statement(statement);
        }

        self.emit_exit();

        let mut out = AsmWriter::new(INDENTATION.to_owned());
        out.directive(".data");
        out.declaration("newline", ".asciiz \"\\n\"");
        out.declaration("true_str", ".asciiz \"true\"");
        out.declaration("false_str", ".asciiz \"false\"");
        out.append(&self.data);

        out.directive(".text");
        out.directive(".globl main");
        out.append(&self.text);
        out.append(&self.functions);

        if self.uses_concat {
            out.routine(runtime::CONCAT_STRINGS_ROUTINE);
        }

        if self.uses_compare {
            out.routine(runtime::COMPARE_STRINGS_ROUTINE);
        }

        out.into_string()
    }

    fn generate_statement(&mut self, statement: &Statement) -> Operand {
        match statement {
            Statement::Let { name, value: Expression::Function(function), .. } => {
                self.generate_named_function(&name.name, function);
                Operand::void()
            },
            Statement::Let { name, value, .. } => {
                let operand = self.generate_expression(value);
                self.store_variable(&name.name, operand);
                Operand::void()
            },
            Statement::Return { value, .. } => {
                let operand = self.generate_expression(value);
                self.generate_return(operand);
                Operand::void()
            },
            Statement::Expression { expression, .. } => self.generate_expression(expression),
        }
    }

    fn generate_block(&mut self, block: &BlockStatement) -> Operand {
        let mut result = Operand::void();

        for statement in &block.statements {
            result = self.generate_statement(statement);
        }

        result
    }

    fn generate_expression(&mut self, expression: &Expression) -> Operand {
        match expression {
            Expression::Variable(identifier) => self.load_variable(&identifier.name),

            Expression::IntegerLiteral { value, .. } => {
                let register = self.next_int_register();
                emit!(self.text, "li {}, {}", register, value);
                Operand::new(register, ValueType::Int)
            },
            Expression::FloatLiteral { value, .. } => {
                let register = self.next_float_register();
                emit!(self.text, "li.s {}, {}", register, float_literal(*value));
                Operand::new(register, ValueType::Float)
            },
            Expression::StringLiteral { value, .. } => {
                let label = self.intern_string(value);
                let register = self.next_int_register();
                emit!(self.text, "la {}, {}", register, label);
                Operand::new(register, ValueType::String)
            },
            Expression::Boolean { value, .. } => {
                let register = self.next_int_register();
                emit!(self.text, "li {}, {}", register, if *value { 1 } else { 0 });
                Operand::new(register, ValueType::Bool)
            },

            Expression::Prefix { operator, right, .. } => self.generate_prefix(*operator, right),
            Expression::Infix { left, operator, right, .. } => self.generate_infix(*operator, left, right),

            Expression::If { condition, consequence, alternative, .. } =>
                self.generate_if(condition, consequence, alternative.as_ref()),
            Expression::Function(function) => {
                self.generate_anonymous_function(function);
                Operand::new(Register::Zero, ValueType::Function)
            },
            Expression::Call { function, arguments, .. } => self.generate_call(function, arguments),

            Expression::Array { .. } => self.unsupported("array literal"),
            Expression::Index { .. } => self.unsupported("index expression"),
            Expression::Error => self.unsupported("invalid expression"),
        }
    }

    fn generate_prefix(&mut self, operator: PrefixOperator, right: &Expression) -> Operand {
        let operand = self.generate_expression(right);

        match (operator, operand.ty) {
            (_, ValueType::Void) => Operand::void(),
            (PrefixOperator::Negate, ValueType::Int) => {
                let result = self.next_int_register();
                emit!(self.text, "neg {}, {}", result, operand.register);
                Operand::new(result, ValueType::Int)
            },
            (PrefixOperator::Negate, ValueType::Float) => {
                let result = self.next_float_register();
                emit!(self.text, "neg.s {}, {}", result, operand.register);
                Operand::new(result, ValueType::Float)
            },
            (PrefixOperator::Not, ValueType::Int | ValueType::Bool) => {
                let result = self.next_int_register();
                emit!(self.text, "seq {}, {}, $zero", result, operand.register);
                Operand::new(result, ValueType::Bool)
            },
            (operator, ty) => self.fail(CodegenError::UnsupportedPrefix { operator, ty }),
        }
    }

    /// Both operands are generated first, then the instructions are picked by the
    /// strongest operand type: string, then float, then bool, then int.
    fn generate_infix(&mut self, operator: InfixOperator, left: &Expression, right: &Expression) -> Operand {
        let left = self.generate_expression(left);
        let right = self.generate_expression(right);
        let has_type = |ty: ValueType| left.ty == ty || right.ty == ty;

        if has_type(ValueType::Void) {
            Operand::void()
        } else if has_type(ValueType::Function) {
            self.fail(CodegenError::UnsupportedOperator { operator, ty: ValueType::Function })
        } else if has_type(ValueType::String) {
            self.generate_string_infix(operator, left, right)
        } else if has_type(ValueType::Float) {
            self.generate_float_infix(operator, left, right)
        } else if has_type(ValueType::Bool) {
            self.generate_bool_infix(operator, left, right)
        } else {
            self.generate_int_infix(operator, left, right)
        }
    }

    fn generate_string_infix(&mut self, operator: InfixOperator, left: Operand, right: Operand) -> Operand {
        let (routine, ty) = match operator {
            InfixOperator::Add => {
                self.uses_concat = true;
                (runtime::CONCAT_STRINGS, ValueType::String)
            },
            InfixOperator::Equal | InfixOperator::NotEqual => {
                self.uses_compare = true;
                (runtime::COMPARE_STRINGS, ValueType::Bool)
            },
            _ => return self.fail(CodegenError::UnsupportedOperator { operator, ty: ValueType::String }),
        };

        emit!(self.text, "move $a0, {}", left.register);
        emit!(self.text, "move $a1, {}", right.register);
        emit!(self.text, "jal {}", routine);

        let result = self.next_int_register();
        emit!(self.text, "move {}, $v0", result);

        if operator == InfixOperator::NotEqual {
            emit!(self.text, "xori {}, {}, 1", result, result);
        }

        Operand::new(result, ty)
    }

    fn generate_float_infix(&mut self, operator: InfixOperator, left: Operand, right: Operand) -> Operand {
        let arithmetic = match operator {
            InfixOperator::Add => Some("add.s"),
            InfixOperator::Subtract => Some("sub.s"),
            InfixOperator::Multiply => Some("mul.s"),
            InfixOperator::Divide => Some("div.s"),
            _ => None,
        };

        if arithmetic.is_none() && !operator.is_comparison() {
            return self.fail(CodegenError::UnsupportedOperator { operator, ty: ValueType::Float });
        }

        let left = self.convert_to_float(left);
        let right = self.convert_to_float(right);

        if let Some(instruction) = arithmetic {
            let result = self.next_float_register();
            emit!(self.text, "{} {}, {}, {}", instruction, result, left, right);
            return Operand::new(result, ValueType::Float);
        }

        // The coprocessor only has eq, lt and le; the rest swap operands or branch on false
        let (comparison, first, second, branch) = match operator {
            InfixOperator::NotEqual => ("c.eq.s", left, right, "bc1f"),
            InfixOperator::Less => ("c.lt.s", left, right, "bc1t"),
            InfixOperator::LessEqual => ("c.le.s", left, right, "bc1t"),
            InfixOperator::Greater => ("c.lt.s", right, left, "bc1t"),
            InfixOperator::GreaterEqual => ("c.le.s", right, left, "bc1t"),
            _ => ("c.eq.s", left, right, "bc1t"),
        };

        let result = self.next_int_register();
        let label = format!("float_true_{}", self.next_label());

        emit!(self.text, "{} {}, {}", comparison, first, second);
        emit!(self.text, "li {}, 1", result);
        emit!(self.text, "{} {}", branch, label);
        emit!(self.text, "li {}, 0", result);
        self.text.label(&label);

        Operand::new(result, ValueType::Bool)
    }

    fn convert_to_float(&mut self, operand: Operand) -> Register {
        if operand.ty == ValueType::Float {
            return operand.register;
        }

        let register = self.next_float_register();
        emit!(self.text, "mtc1 {}, {}", operand.register, register);
        emit!(self.text, "cvt.s.w {}, {}", register, register);
        register
    }

    fn generate_bool_infix(&mut self, operator: InfixOperator, left: Operand, right: Operand) -> Operand {
        let instruction = match operator {
            InfixOperator::And => "and",
            InfixOperator::Or => "or",
            InfixOperator::Equal | InfixOperator::NotEqual => "xor",
            _ => return self.fail(CodegenError::UnsupportedOperator { operator, ty: ValueType::Bool }),
        };

        let result = self.next_int_register();
        emit!(self.text, "{} {}, {}, {}", instruction, result, left.register, right.register);

        match operator {
            InfixOperator::Equal => emit!(self.text, "sltiu {}, {}, 1", result, result),
            InfixOperator::NotEqual => emit!(self.text, "sltu {}, $zero, {}", result, result),
            _ => {},
        }

        Operand::new(result, ValueType::Bool)
    }

    fn generate_int_infix(&mut self, operator: InfixOperator, left: Operand, right: Operand) -> Operand {
        let (instruction, ty) = match operator {
            InfixOperator::Add => ("add", ValueType::Int),
            InfixOperator::Subtract => ("sub", ValueType::Int),
            InfixOperator::Multiply => ("mul", ValueType::Int),
            InfixOperator::Divide => ("div", ValueType::Int),
            InfixOperator::Equal => ("seq", ValueType::Bool),
            InfixOperator::NotEqual => ("sne", ValueType::Bool),
            InfixOperator::Less => ("slt", ValueType::Bool),
            InfixOperator::LessEqual => ("sle", ValueType::Bool),
            InfixOperator::Greater => ("sgt", ValueType::Bool),
            InfixOperator::GreaterEqual => ("sge", ValueType::Bool),
            InfixOperator::And | InfixOperator::Or =>
                return self.fail(CodegenError::UnsupportedOperator { operator, ty: ValueType::Int }),
        };

        let result = self.next_int_register();

        if operator == InfixOperator::Divide {
            emit!(self.text, "div {}, {}", left.register, right.register);
            emit!(self.text, "mflo {}", result);
        } else {
            emit!(self.text, "{} {}, {}, {}", instruction, result, left.register, right.register);
        }

        Operand::new(result, ty)
    }

    fn generate_if(&mut self, condition: &Expression, consequence: &BlockStatement, alternative: Option<&BlockStatement>) -> Operand {
        self.int_registers = 0;
        let mut condition = self.generate_expression(condition);

        if let Register::Float(_) = condition.register {
            self.diagnostics.push(CodegenError::UnsupportedNode(String::from("float condition")));
            condition = Operand::void();
        }

        let label = self.next_label();
        let else_label = format!("else_{}", label);
        let end_label = format!("end_{}", label);

        emit!(self.text, "beq {}, $zero, {}", condition.register, else_label);

        let consequence = self.generate_block(consequence);
        let result = match consequence.register {
            Register::Int(_) => Some(self.next_int_register()),
            Register::Float(_) => Some(self.next_float_register()),
            Register::Zero => None,
        };

        if let Some(result) = result {
            self.move_register(result, consequence.register);
        }

        emit!(self.text, "j {}", end_label);
        self.text.label(&else_label);

        if let Some(alternative) = alternative {
            let alternative = self.generate_block(alternative);

            if alternative.ty != consequence.ty {
                self.diagnostics.push(CodegenError::BranchTypeMismatch { consequence: consequence.ty, alternative: alternative.ty });
            }

            if let Some(result) = result {
                self.move_register(result, alternative.register);
            }
        }

        self.text.label(&end_label);

        match result {
            Some(result) => Operand::new(result, consequence.ty),
            None => Operand::void(),
        }
    }

    fn move_register(&mut self, to: Register, from: Register) {
        match (to, from) {
            (Register::Int(_), Register::Int(_)) => emit!(self.text, "move {}, {}", to, from),
            (Register::Float(_), Register::Float(_)) => emit!(self.text, "mov.s {}, {}", to, from),
            _ => {},
        }
    }

    fn generate_call(&mut self, function: &Expression, arguments: &[Expression]) -> Operand {
        let (label, arity, returns) = match function {
            Expression::Variable(identifier) if identifier.name == PRINT_BUILTIN => return self.generate_speak_now(arguments),
            Expression::Variable(identifier) => {
                let storage = self.symbols.resolve(&identifier.name).map(|(symbol, _)| symbol.storage.clone());

                match storage {
                    Some(Storage::Function { label, arity, returns }) => (label, arity, returns),
                    Some(_) => return self.fail(CodegenError::NotCallable(identifier.name.clone())),
                    None if builtins::lookup(&identifier.name).is_some() =>
                        return self.unsupported(&format!("builtin `{}`", identifier.name)),
                    None => return self.fail(CodegenError::UndefinedVariable(identifier.name.clone())),
                }
            },
            Expression::Function(literal) => {
                let (label, returns) = self.generate_anonymous_function(literal);
                (label, literal.parameters.len(), returns)
            },
            other => return self.fail(CodegenError::NotCallable(other.to_string())),
        };

        if arguments.len() != arity {
            return self.fail(CodegenError::WrongArgumentCount { name: function.to_string(), got: arguments.len(), want: arity });
        }

        for argument in arguments.iter().rev() {
            let operand = self.generate_expression(argument);
            emit!(self.text, "{} {}, 0($sp)", operand.register.store_instruction(), operand.register);
            emit!(self.text, "addi $sp, $sp, -{}", SLOT_SIZE);
        }

        emit!(self.text, "jal {}", label);

        if !arguments.is_empty() {
            emit!(self.text, "addi $sp, $sp, {}", arguments.len() * SLOT_SIZE);
        }

        match returns {
            ValueType::Void | ValueType::Function => Operand::void(),
            ValueType::Float => {
                let result = self.next_float_register();
                emit!(self.text, "mtc1 $v0, {}", result);
                Operand::new(result, ValueType::Float)
            },
            ty => {
                let result = self.next_int_register();
                emit!(self.text, "move {}, $v0", result);
                Operand::new(result, ty)
            },
        }
    }

    fn generate_speak_now(&mut self, arguments: &[Expression]) -> Operand {
        if arguments.len() != 1 {
            return self.fail(CodegenError::WrongArgumentCount { name: PRINT_BUILTIN.to_owned(), got: arguments.len(), want: 1 });
        }

        let operand = self.generate_expression(&arguments[0]);

        match operand.ty {
            ValueType::Int => {
                emit!(self.text, "move $a0, {}", operand.register);
                emit!(self.text, "li $v0, 1");
                emit!(self.text, "syscall");
            },
            ValueType::Bool => {
                let label = self.next_label();
                let false_label = format!("print_false_{}", label);
                let end_label = format!("print_end_{}", label);

                emit!(self.text, "beq {}, $zero, {}", operand.register, false_label);
                emit!(self.text, "la $a0, true_str");
                emit!(self.text, "j {}", end_label);
                self.text.label(&false_label);
                emit!(self.text, "la $a0, false_str");
                self.text.label(&end_label);
                emit!(self.text, "li $v0, 4");
                emit!(self.text, "syscall");
            },
            ValueType::String => {
                emit!(self.text, "move $a0, {}", operand.register);
                emit!(self.text, "li $v0, 4");
                emit!(self.text, "syscall");
            },
            ValueType::Float => {
                emit!(self.text, "mov.s $f12, {}", operand.register);
                emit!(self.text, "li $v0, 2");
                emit!(self.text, "syscall");
            },
            ValueType::Void => return Operand::void(),
            ty => return self.fail(CodegenError::UnsupportedPrintType(ty)),
        }

        emit!(self.text, "li $v0, 4");
        emit!(self.text, "la $a0, newline");
        emit!(self.text, "syscall");

        Operand::void()
    }

    fn generate_return(&mut self, operand: Operand) {
        let end_label = match &mut self.function {
            Some(context) => {
                if operand.ty != ValueType::Void {
                    context.returns = operand.ty;
                }

                context.end_label.clone()
            },
            None => {
                self.emit_exit();
                return;
            },
        };

        self.move_to_result(operand);
        emit!(self.text, "j {}", end_label);
    }

    fn move_to_result(&mut self, operand: Operand) {
        match operand.register {
            Register::Int(_) => emit!(self.text, "move $v0, {}", operand.register),
            Register::Float(_) => emit!(self.text, "mfc1 $v0, {}", operand.register),
            Register::Zero => {},
        }
    }

    fn emit_exit(&mut self) {
        emit!(self.text, "li $v0, 10");
        emit!(self.text, "syscall");
    }

    fn generate_named_function(&mut self, name: &str, function: &FunctionLiteral) {
        let label = self.function_label(&format!("fn_{}", name));
        let arity = function.parameters.len();

        // Defined before the body so the function can call itself
        self.symbols.define(name, ValueType::Function, Storage::Function { label: label.clone(), arity, returns: ValueType::Int });

        let returns = self.generate_function(&label, function);
        self.symbols.define(name, ValueType::Function, Storage::Function { label, arity, returns });
    }

    fn generate_anonymous_function(&mut self, function: &FunctionLiteral) -> (String, ValueType) {
        let label = format!("func_{}", self.next_label());
        let label = self.function_label(&label);
        let returns = self.generate_function(&label, function);

        (label, returns)
    }

    fn function_label(&mut self, base: &str) -> String {
        let label = if self.function_labels.contains(base) {
            format!("{}_{}", base, self.next_label())
        } else {
            base.to_owned()
        };

        self.function_labels.insert(label.clone());
        label
    }

    /// Generates the body into its own buffer, then writes the whole routine to the
    /// function section once the size of its locals is known. Returns the result type.
    fn generate_function(&mut self, label: &str, function: &FunctionLiteral) -> ValueType {
        log_debug!("Generating function {} with {} parameter(s)", label, function.parameters.len());

        let outer_text = std::mem::replace(&mut self.text, AsmWriter::new(INDENTATION.to_owned()));
        let outer_registers = (self.int_registers, self.float_registers);
        let outer_function = self.function.replace(FunctionContext {
            end_label: format!("{}_end", label),
            returns: ValueType::Void,
        });

        self.int_registers = 0;
        self.float_registers = 0;

        let symbols = std::mem::take(&mut self.symbols);
        self.symbols = symbols.enclosed();

        for (index, parameter) in function.parameters.iter().enumerate() {
            self.symbols.define(&parameter.name, ValueType::Int, Storage::Parameter(index));
        }

        let result = self.generate_block(&function.body);
        self.move_to_result(result);

        let locals = self.symbols.local_size();
        let symbols = std::mem::take(&mut self.symbols);
        self.symbols = symbols.into_parent().unwrap_or_default();

        let body = std::mem::replace(&mut self.text, outer_text);
        let context = std::mem::replace(&mut self.function, outer_function);
        (self.int_registers, self.float_registers) = outer_registers;

        self.write_function(label, locals, &body);

        match (result.ty, context) {
            (ValueType::Void, Some(context)) => context.returns,
            (ty, _) => ty,
        }
    }

    fn write_function(&mut self, label: &str, locals: usize, body: &AsmWriter) {
        let out = &mut self.functions;

        out.label(label);
        emit!(out, "addi $sp, $sp, -8");
        emit!(out, "sw $ra, 4($sp)");
        emit!(out, "sw $fp, 0($sp)");
        emit!(out, "move $fp, $sp");
        // Calls store into 0($sp) before moving it, so keep that slot free
        emit!(out, "addi $sp, $sp, -{}", SAVED_REGISTERS_SIZE + locals + SLOT_SIZE);

        for index in 0..INT_REGISTER_COUNT {
            emit!(out, "sw {}, -{}($fp)", Register::Int(index), (index + 1) * SLOT_SIZE);
        }

        out.append(body);
        out.label(&format!("{}_end", label));

        for index in 0..INT_REGISTER_COUNT {
            emit!(out, "lw {}, -{}($fp)", Register::Int(index), (index + 1) * SLOT_SIZE);
        }

        emit!(out, "move $sp, $fp");
        emit!(out, "lw $fp, 0($sp)");
        emit!(out, "lw $ra, 4($sp)");
        emit!(out, "addi $sp, $sp, 8");
        emit!(out, "jr $ra");
    }

    /// Globals become data-section words; inside a function, a stack slot below the saved
    /// registers.
    fn store_variable(&mut self, name: &str, operand: Operand) {
        if operand.register == Register::Zero {
            return;
        }

        let store = operand.register.store_instruction();

        if self.symbols.is_global() {
            let label = format!("var_{}", name);

            if self.globals.insert(name.to_owned()) {
                self.data.declaration(&label, ".word 0");
            }

            emit!(self.text, "{} {}, {}", store, operand.register, label);
            self.symbols.define(name, operand.ty, Storage::Global(label));
        } else {
            let address = self.symbols.define_local(name, operand.ty);
            emit!(self.text, "{} {}, -{}($fp)", store, operand.register, local_offset(address));
        }
    }

    fn load_variable(&mut self, name: &str) -> Operand {
        let (symbol, depth) = match self.symbols.resolve(name) {
            Some((symbol, depth)) => (symbol.clone(), depth),
            None => return self.fail(CodegenError::UndefinedVariable(name.to_owned())),
        };

        let location = match symbol.storage {
            Storage::Function { .. } => return self.unsupported(&format!("function value `{}`", name)),
            Storage::Local(_) | Storage::Parameter(_) if depth > 0 =>
                return self.fail(CodegenError::CapturedVariable(name.to_owned())),

            Storage::Global(label) => label,
            Storage::Local(address) => format!("-{}($fp)", local_offset(address)),
            Storage::Parameter(index) => format!("{}($fp)", FIRST_PARAMETER_OFFSET + index * SLOT_SIZE),
        };

        let register = match symbol.ty {
            ValueType::Float => self.next_float_register(),
            _ => self.next_int_register(),
        };

        emit!(self.text, "{} {}, {}", register.load_instruction(), register, location);
        Operand::new(register, symbol.ty)
    }

    fn intern_string(&mut self, value: &str) -> String {
        if let Some(label) = self.strings.get(value) {
            return label.clone();
        }

        let label = format!("str_{}", self.strings.len());
        self.data.declaration(&label, &format!(".asciiz \"{}\"", escape_string(value)));
        self.strings.insert(value.to_owned(), label.clone());

        label
    }

    fn next_int_register(&mut self) -> Register {
        let register = Register::Int(self.int_registers);

        if self.int_registers >= INT_REGISTER_COUNT && !self.int_registers_exhausted {
            self.int_registers_exhausted = true;
            self.diagnostics.push(CodegenError::RegisterExhausted(register));
        }

        self.int_registers += 1;
        register
    }

    fn next_float_register(&mut self) -> Register {
        let register = Register::Float(self.float_registers);

        if self.float_registers >= FLOAT_REGISTER_COUNT && !self.float_registers_exhausted {
            self.float_registers_exhausted = true;
            self.diagnostics.push(CodegenError::RegisterExhausted(register));
        }

        self.float_registers += 1;
        register
    }

    fn next_label(&mut self) -> usize {
        let label = self.labels;
        self.labels += 1;
        label
    }

    fn fail(&mut self, error: CodegenError) -> Operand {
        log_debug!("Codegen diagnostic: {}", error);
        self.diagnostics.push(error);
        Operand::void()
    }

    fn unsupported(&mut self, what: &str) -> Operand {
        self.fail(CodegenError::UnsupportedNode(what.to_owned()))
    }
}

fn local_offset(address: usize) -> usize {
    SAVED_REGISTERS_SIZE + SLOT_SIZE + address
}

/// Plain decimal notation, never exponent form.
fn float_literal(value: f64) -> String {
    let text = value.to_string();

    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }

    escaped
}
