use super::{Column, LineNumber};

/// Runtime and load-time failure, carrying the C64 error number and,
/// once known, the source line it is anchored to.
#[derive(Debug, PartialEq, Clone)]
pub struct Error {
    code: ErrorCode,
    line: LineNumber,
    column: Option<Column>,
    message: Option<String>,
}

#[macro_export]
macro_rules! error {
    ($code:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$code)
    };
    ($code:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$code).message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line: None,
            column: None,
            message: None,
        }
    }

    pub fn message(mut self, message: &str) -> Error {
        self.message = Some(message.to_string());
        self
    }

    pub fn at_column(mut self, column: Column) -> Error {
        if self.column.is_none() {
            self.column = Some(column);
        }
        self
    }

    /// Anchor to a source line. The first anchor wins so a callee's
    /// more precise location is not clobbered on the way up.
    pub fn in_line_number(mut self, line: LineNumber) -> Error {
        if self.line.is_none() {
            self.line = line;
        }
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line_number(&self) -> LineNumber {
        self.line
    }

    pub fn column(&self) -> Option<Column> {
        self.column.clone()
    }
}

/// The C64 BASIC error numbers, as the KERNAL error message table orders them.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u16)]
pub enum ErrorCode {
    NextWithoutFor = 10,
    SyntaxError = 11,
    ReturnWithoutGosub = 12,
    OutOfData = 13,
    IllegalQuantity = 14,
    Overflow = 15,
    OutOfMemory = 16,
    UndefinedLine = 17,
    SubscriptOutOfRange = 18,
    RedimensionedArray = 19,
    DivisionByZero = 20,
    TypeMismatch = 22,
}

impl ErrorCode {
    fn text(self) -> &'static str {
        use ErrorCode::*;
        match self {
            NextWithoutFor => "NEXT WITHOUT FOR",
            SyntaxError => "SYNTAX",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB",
            OutOfData => "OUT OF DATA",
            IllegalQuantity => "ILLEGAL QUANTITY",
            Overflow => "OVERFLOW",
            OutOfMemory => "OUT OF MEMORY",
            UndefinedLine => "UNDEF'D STATEMENT",
            SubscriptOutOfRange => "BAD SUBSCRIPT",
            RedimensionedArray => "REDIM'D ARRAY",
            DivisionByZero => "DIVISION BY ZERO",
            TypeMismatch => "TYPE MISMATCH",
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ERROR", self.code.text())?;
        if let Some(line) = self.line {
            write!(f, " IN {}", line)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}
