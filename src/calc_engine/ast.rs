use std::f64::consts::{E, PI};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => PI,
            Constant::E => E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log,
    Ln,
    Sqrt,
    Abs,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Asin,
        Function::Acos,
        Function::Atan,
        Function::Log,
        Function::Ln,
        Function::Sqrt,
        Function::Abs,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Function::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Log => "log",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
        }
    }

    /// Trig functions that take an angle as their argument.
    pub fn takes_angle(self) -> bool {
        matches!(self, Function::Sin | Function::Cos | Function::Tan)
    }

    /// Inverse trig functions that return an angle.
    pub fn returns_angle(self) -> bool {
        matches!(self, Function::Asin | Function::Acos | Function::Atan)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            '*' => Some(BinaryOp::Mul),
            '/' => Some(BinaryOp::Div),
            '^' => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
        }
    }
}

/// Parsed expression tree. Every node owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(Constant),
    Variable(char),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn neg(operand: Expr) -> Self {
        Expr::Unary(UnaryOp::Neg, Box::new(operand))
    }

    pub fn call(function: Function, argument: Expr) -> Self {
        Expr::Call(function, Box::new(argument))
    }

    pub fn mentions(&self, variable: char) -> bool {
        match self {
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Variable(v) => *v == variable,
            Expr::Unary(_, operand) => operand.mentions(variable),
            Expr::Binary(_, left, right) => left.mentions(variable) || right.mentions(variable),
            Expr::Call(_, argument) => argument.mentions(variable),
        }
    }
}

/// Fully parenthesised rendering, mostly useful in logs and test failures.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Constant(Constant::Pi) => f.write_str("pi"),
            Expr::Constant(Constant::E) => f.write_str("e"),
            Expr::Variable(v) => write!(f, "{}", v),
            Expr::Unary(UnaryOp::Neg, operand) => write!(f, "(-{})", operand),
            Expr::Binary(op, left, right) => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Call(function, argument) => write!(f, "{}({})", function, argument),
        }
    }
}
