use crate::error;
use crate::lang::ast::{IfBranch, Statement};
use crate::lang::{lex, normalize, parse, Error, Literal};
use std::collections::{BTreeMap, HashMap};

type Result<T> = std::result::Result<T, Error>;

/// One program line after parsing.
#[derive(Debug)]
pub struct Line {
    number: u16,
    statements: Vec<Statement>,
}

impl Line {
    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// The parsed program: lines in ascending order plus a line-number
/// index so jumps resolve in O(1).
#[derive(Debug)]
pub struct Program {
    lines: Vec<Line>,
    index: HashMap<u16, usize>,
}

impl Program {
    pub fn parse(source: &str) -> Result<Program> {
        let mut numbered: BTreeMap<u16, Vec<Statement>> = BTreeMap::new();
        for raw in source.lines() {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let normalized = normalize(&raw.to_uppercase());
            let (number, tokens) = lex(&normalized)?;
            let number = match number {
                Some(number) => number,
                None => return Err(error!(SyntaxError; "MISSING LINE NUMBER")),
            };
            let statements = parse(&tokens).map_err(|e| e.in_line_number(Some(number)))?;
            if numbered.insert(number, statements).is_some() {
                return Err(
                    error!(SyntaxError; "DUPLICATE LINE").in_line_number(Some(number))
                );
            }
        }
        let lines: Vec<Line> = numbered
            .into_iter()
            .map(|(number, statements)| Line { number, statements })
            .collect();
        let index = lines
            .iter()
            .enumerate()
            .map(|(position, line)| (line.number, position))
            .collect();
        Ok(Program { lines, index })
    }

    pub fn get(&self, position: usize) -> Option<&Line> {
        self.lines.get(position)
    }

    pub fn index_of(&self, number: u16) -> Option<usize> {
        self.index.get(&number).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every DATA literal in program order, including those tucked into
    /// IF-THEN branches; this is what the READ cursor walks.
    pub fn data_pool(&self) -> Vec<Literal> {
        let mut pool = vec![];
        for line in &self.lines {
            collect_data(&line.statements, &mut pool);
        }
        pool
    }
}

fn collect_data(statements: &[Statement], pool: &mut Vec<Literal>) {
    for statement in statements {
        match statement {
            Statement::Data(items) => pool.extend(items.iter().cloned()),
            Statement::If(_, IfBranch::Statements(branch)) => collect_data(branch, pool),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_sorted_and_indexed() {
        let program = Program::parse("30 END\n10 PRINT \"A\"\n20 GOTO 30").unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.get(0).unwrap().number(), 10);
        assert_eq!(program.get(2).unwrap().number(), 30);
        assert_eq!(program.index_of(20), Some(1));
        assert_eq!(program.index_of(25), None);
    }

    #[test]
    fn test_duplicate_line_rejected() {
        let result = Program::parse("10 PRINT\n10 END");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_line_number_rejected() {
        assert!(Program::parse("PRINT 1").is_err());
    }

    #[test]
    fn test_data_pool_in_program_order() {
        let program =
            Program::parse("20 DATA 3,4\n10 DATA 1,2\n30 IF X THEN DATA 5").unwrap();
        let pool = program.data_pool();
        assert_eq!(pool.len(), 5);
        assert_eq!(pool[0], Literal::Number(1.0));
        assert_eq!(pool[2], Literal::Number(3.0));
        assert_eq!(pool[4], Literal::Number(5.0));
    }
}
