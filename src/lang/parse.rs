use super::ast::*;
use super::token::{Literal, Operator, Token, Word};
use super::{Column, Error, LineNumber, MaxValue};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// Built-in functions; any other name followed by `(` is an array access.
const FUNCTIONS: &[&str] = &[
    "ASC", "CHR$", "INT", "LEFT$", "LEN", "MID$", "RIGHT$", "RND", "STR$", "VAL",
];

/// Parse one lexed line into its statements.
pub fn parse(tokens: &[(Token, Column)]) -> Result<Vec<Statement>> {
    Parse { tokens, pos: 0 }.line()
}

struct Parse<'a> {
    tokens: &'a [(Token, Column)],
    pos: usize,
}

impl<'a> Parse<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek2(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    fn column(&self) -> Column {
        match self.tokens.get(self.pos) {
            Some((_, column)) => column.clone(),
            None => match self.tokens.last() {
                Some((_, column)) => column.end..column.end,
                None => 0..0,
            },
        }
    }

    fn err(&self, message: &str) -> Error {
        error!(SyntaxError; message).at_column(self.column())
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: Word) -> bool {
        self.eat(&Token::Word(word))
    }

    fn eat_operator(&mut self, operator: Operator) -> bool {
        self.eat(&Token::Operator(operator))
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.err(what))
        }
    }

    fn line(&mut self) -> Result<Vec<Statement>> {
        let mut statements = vec![];
        loop {
            while self.eat(&Token::Colon) {}
            if self.peek().is_none() {
                break;
            }
            statements.push(self.statement()?);
            match self.peek() {
                None => break,
                Some(Token::Colon) => continue,
                Some(_) => return Err(self.err("EXPECTED END OF STATEMENT")),
            }
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(Token::Word(word)) => match word {
                Word::Print => self.print_statement(),
                Word::Input => self.input_statement(),
                Word::If => self.if_statement(),
                Word::Goto => {
                    self.pos += 1;
                    Ok(Statement::Goto(self.line_ref()?))
                }
                Word::Gosub => {
                    self.pos += 1;
                    Ok(Statement::Gosub(self.line_ref()?))
                }
                Word::Return => {
                    self.pos += 1;
                    Ok(Statement::Return)
                }
                Word::For => self.for_statement(),
                Word::Next => {
                    self.pos += 1;
                    let counter = match self.peek() {
                        Some(Token::Ident(_)) => Some(self.ident()?),
                        _ => None,
                    };
                    Ok(Statement::Next(counter))
                }
                Word::Dim => self.dim_statement(),
                Word::Data => self.data_statement(),
                Word::Read => self.read_statement(),
                Word::Poke => self.poke_statement(),
                Word::On => self.on_statement(),
                Word::Restore => {
                    self.pos += 1;
                    Ok(Statement::Restore)
                }
                Word::Run => {
                    self.pos += 1;
                    Ok(Statement::Run)
                }
                Word::Stop => {
                    self.pos += 1;
                    Ok(Statement::Stop)
                }
                Word::End => {
                    self.pos += 1;
                    Ok(Statement::End)
                }
                Word::Rem => {
                    self.pos += 1;
                    let text = match self.peek() {
                        Some(Token::Remark(s)) => {
                            self.pos += 1;
                            s.clone()
                        }
                        _ => String::new(),
                    };
                    Ok(Statement::Rem(text))
                }
                Word::Let => {
                    self.pos += 1;
                    self.assignment()
                }
                Word::Then | Word::To | Word::Step => Err(self.err("EXPECTED STATEMENT")),
            },
            Some(Token::Ident(_)) => self.assignment(),
            _ => Err(self.err("EXPECTED STATEMENT")),
        }
    }

    fn assignment(&mut self) -> Result<Statement> {
        let lvalue = self.lvalue()?;
        if !self.eat_operator(Operator::Equal) {
            return Err(self.err("EXPECTED ="));
        }
        let value = self.expression()?;
        Ok(Statement::Let(lvalue, value))
    }

    fn lvalue(&mut self) -> Result<Lvalue> {
        let ident = self.ident()?;
        let index = if self.eat(&Token::LParen) {
            let mut subscripts = vec![self.expression()?];
            while self.eat(&Token::Comma) {
                subscripts.push(self.expression()?);
            }
            self.expect(&Token::RParen, "EXPECTED )")?;
            Some(subscripts)
        } else {
            None
        };
        Ok(Lvalue { ident, index })
    }

    fn ident(&mut self) -> Result<Ident> {
        match self.peek() {
            Some(Token::Ident(ident)) => {
                self.pos += 1;
                Ok(ident.clone())
            }
            _ => Err(self.err("EXPECTED VARIABLE")),
        }
    }

    fn line_ref(&mut self) -> Result<u16> {
        match self.peek() {
            Some(Token::Literal(Literal::Number(n)))
                if n.fract() == 0.0 && *n >= 0.0 && *n <= LineNumber::max_value() as f64 =>
            {
                self.pos += 1;
                Ok(*n as u16)
            }
            _ => Err(self.err("EXPECTED LINE NUMBER")),
        }
    }

    fn print_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let mut items = vec![];
        loop {
            match self.peek() {
                None | Some(Token::Colon) => break,
                Some(Token::Comma) => {
                    self.pos += 1;
                    items.push(PrintItem::Comma);
                }
                Some(Token::Semicolon) => {
                    self.pos += 1;
                    items.push(PrintItem::Semicolon);
                }
                Some(Token::Ident(Ident::Plain(name)))
                    if (name == "TAB" || name == "SPC")
                        && self.peek2() == Some(&Token::LParen) =>
                {
                    let tab = name == "TAB";
                    self.pos += 2;
                    let expr = self.expression()?;
                    self.expect(&Token::RParen, "EXPECTED )")?;
                    items.push(if tab {
                        PrintItem::Tab(expr)
                    } else {
                        PrintItem::Spc(expr)
                    });
                }
                _ => items.push(PrintItem::Expr(self.expression()?)),
            }
        }
        Ok(Statement::Print(items))
    }

    fn input_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let prompt = match self.peek() {
            Some(Token::Literal(Literal::String(s))) => {
                let s = s.clone();
                self.pos += 1;
                if !self.eat(&Token::Semicolon) {
                    self.eat(&Token::Comma);
                }
                Some(s)
            }
            _ => None,
        };
        let mut targets = vec![self.lvalue()?];
        while self.eat(&Token::Comma) {
            targets.push(self.lvalue()?);
        }
        Ok(Statement::Input(prompt, targets))
    }

    fn if_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let condition = self.expression()?;
        let had_then = self.eat_word(Word::Then);
        if self.eat_word(Word::Goto) {
            return Ok(Statement::If(condition, IfBranch::Line(self.line_ref()?)));
        }
        if let Some(Token::Literal(Literal::Number(_))) = self.peek() {
            return Ok(Statement::If(condition, IfBranch::Line(self.line_ref()?)));
        }
        if !had_then {
            return Err(self.err("EXPECTED THEN"));
        }
        let mut branch = vec![];
        loop {
            while self.eat(&Token::Colon) {}
            if self.peek().is_none() {
                break;
            }
            branch.push(self.statement()?);
            match self.peek() {
                None => break,
                Some(Token::Colon) => continue,
                Some(_) => return Err(self.err("EXPECTED END OF STATEMENT")),
            }
        }
        if branch.is_empty() {
            return Err(self.err("EXPECTED STATEMENT"));
        }
        Ok(Statement::If(condition, IfBranch::Statements(branch)))
    }

    fn for_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let counter = self.ident()?;
        if counter.is_string() {
            return Err(self.err("EXPECTED NUMERIC COUNTER"));
        }
        if !self.eat_operator(Operator::Equal) {
            return Err(self.err("EXPECTED ="));
        }
        let start = self.expression()?;
        if !self.eat_word(Word::To) {
            return Err(self.err("EXPECTED TO"));
        }
        let end = self.expression()?;
        let step = if self.eat_word(Word::Step) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Statement::For(counter, start, end, step))
    }

    fn dim_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let mut declarations = vec![];
        loop {
            let ident = self.ident()?;
            self.expect(&Token::LParen, "EXPECTED (")?;
            let mut dimensions = vec![self.expression()?];
            while self.eat(&Token::Comma) {
                dimensions.push(self.expression()?);
            }
            self.expect(&Token::RParen, "EXPECTED )")?;
            declarations.push((ident, dimensions));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::Dim(declarations))
    }

    fn data_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let mut items = vec![];
        loop {
            match self.peek() {
                Some(Token::Literal(literal)) => {
                    items.push(literal.clone());
                    self.pos += 1;
                }
                // bare separator: an empty datum
                _ => items.push(Literal::String(String::new())),
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::Data(items))
    }

    fn read_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let mut targets = vec![self.lvalue()?];
        while self.eat(&Token::Comma) {
            targets.push(self.lvalue()?);
        }
        Ok(Statement::Read(targets))
    }

    fn poke_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let address = self.expression()?;
        self.expect(&Token::Comma, "EXPECTED ,")?;
        let value = self.expression()?;
        Ok(Statement::Poke(address, value))
    }

    fn on_statement(&mut self) -> Result<Statement> {
        self.pos += 1;
        let selector = self.expression()?;
        let target = if self.eat_word(Word::Goto) {
            OnTarget::Goto
        } else if self.eat_word(Word::Gosub) {
            OnTarget::Gosub
        } else {
            return Err(self.err("EXPECTED GOTO OR GOSUB"));
        };
        let mut lines = vec![self.line_ref()?];
        while self.eat(&Token::Comma) {
            lines.push(self.line_ref()?);
        }
        Ok(Statement::On(target, selector, lines))
    }

    fn expression(&mut self) -> Result<Expression> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expression> {
        let mut left = self.and_expr()?;
        while self.eat_operator(Operator::Or) {
            let right = self.and_expr()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expression> {
        let mut left = self.rel_expr()?;
        while self.eat_operator(Operator::And) {
            let right = self.rel_expr()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn rel_expr(&mut self) -> Result<Expression> {
        let left = self.add_expr()?;
        let relation = match self.peek() {
            Some(Token::Operator(op)) => match op {
                Operator::Equal => Expression::Equal,
                Operator::NotEqual => Expression::NotEqual,
                Operator::Less => Expression::Less,
                Operator::LessEqual => Expression::LessEqual,
                Operator::Greater => Expression::Greater,
                Operator::GreaterEqual => Expression::GreaterEqual,
                _ => return Ok(left),
            },
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.add_expr()?;
        Ok(relation(Box::new(left), Box::new(right)))
    }

    fn add_expr(&mut self) -> Result<Expression> {
        let mut left = self.mul_expr()?;
        loop {
            if self.eat_operator(Operator::Plus) {
                let right = self.mul_expr()?;
                left = Expression::Add(Box::new(left), Box::new(right));
            } else if self.eat_operator(Operator::Minus) {
                let right = self.mul_expr()?;
                left = Expression::Subtract(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn mul_expr(&mut self) -> Result<Expression> {
        let mut left = self.pow_expr()?;
        loop {
            if self.eat_operator(Operator::Multiply) {
                let right = self.pow_expr()?;
                left = Expression::Multiply(Box::new(left), Box::new(right));
            } else if self.eat_operator(Operator::Divide) {
                let right = self.pow_expr()?;
                left = Expression::Divide(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn pow_expr(&mut self) -> Result<Expression> {
        let left = self.unary_expr()?;
        if self.eat_operator(Operator::Caret) {
            // right-associative
            let right = self.pow_expr()?;
            return Ok(Expression::Power(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> Result<Expression> {
        if self.eat_operator(Operator::Minus) {
            return Ok(Expression::Negate(Box::new(self.unary_expr()?)));
        }
        if self.eat_operator(Operator::Plus) {
            return self.unary_expr();
        }
        if self.eat_operator(Operator::Not) {
            return Ok(Expression::Not(Box::new(self.unary_expr()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.peek() {
            Some(Token::LParen) => {
                self.pos += 1;
                let expr = self.expression()?;
                self.expect(&Token::RParen, "EXPECTED )")?;
                Ok(expr)
            }
            Some(Token::Literal(Literal::Number(n))) => {
                let n = *n;
                self.pos += 1;
                Ok(Expression::Number(n))
            }
            Some(Token::Literal(Literal::String(s))) => {
                let s = s.clone();
                self.pos += 1;
                Ok(Expression::String(s))
            }
            Some(Token::Ident(_)) => {
                let ident = self.ident()?;
                if self.eat(&Token::LParen) {
                    let mut args = vec![];
                    if self.peek() != Some(&Token::RParen) {
                        args.push(self.expression()?);
                        while self.eat(&Token::Comma) {
                            args.push(self.expression()?);
                        }
                    }
                    self.expect(&Token::RParen, "EXPECTED )")?;
                    if FUNCTIONS.contains(&ident.name()) {
                        Ok(Expression::Function(ident, args))
                    } else {
                        Ok(Expression::Array(ident, args))
                    }
                } else {
                    Ok(Expression::Var(ident))
                }
            }
            _ => Err(self.err("EXPECTED EXPRESSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{lex, normalize};
    use super::*;

    fn parse_str(s: &str) -> Result<Vec<Statement>> {
        let (_, tokens) = lex(&normalize(&s.to_uppercase()))?;
        parse(&tokens)
    }

    #[test]
    fn test_optional_let() {
        let with_let = parse_str("10 LET A=1").unwrap();
        let without = parse_str("10 A=1").unwrap();
        assert_eq!(with_let, without);
    }

    #[test]
    fn test_if_forms_equivalent() {
        let a = parse_str("10 IF A>1 THEN 100").unwrap();
        let b = parse_str("10 IF A>1 GOTO 100").unwrap();
        let c = parse_str("10 IF A>1 100").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_if_statement_branch() {
        let parsed = parse_str("10 IF X THEN PRINT \"Y\":GOTO 30").unwrap();
        match &parsed[0] {
            Statement::If(_, IfBranch::Statements(branch)) => assert_eq!(branch.len(), 2),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_empty_statements() {
        let parsed = parse_str("10 L=1::PRINT L").unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_function_vs_array() {
        let parsed = parse_str("10 A=INT(B(2))").unwrap();
        match &parsed[0] {
            Statement::Let(_, Expression::Function(name, args)) => {
                assert_eq!(name.name(), "INT");
                assert!(matches!(args[0], Expression::Array(_, _)));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_power_right_associative() {
        let parsed = parse_str("10 A=2^3^2").unwrap();
        match &parsed[0] {
            Statement::Let(_, Expression::Power(_, right)) => {
                assert!(matches!(**right, Expression::Power(_, _)));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_print_tab_and_spc() {
        let parsed = parse_str("10 PRINT TAB(5)\"A\";SPC(3)\"B\"").unwrap();
        match &parsed[0] {
            Statement::Print(items) => {
                assert!(matches!(items[0], PrintItem::Tab(_)));
                assert!(matches!(items[3], PrintItem::Spc(_)));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_on_goto() {
        let parsed = parse_str("10 ON X GOSUB 100,200,300").unwrap();
        assert_eq!(
            parsed[0],
            Statement::On(
                OnTarget::Gosub,
                Expression::Var(Ident::Plain("X".to_string())),
                vec![100, 200, 300]
            )
        );
    }
}
