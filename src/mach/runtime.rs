use super::screen::ColorTarget;
use super::{Arrays, Program, Screen, Stack, Val, Var};
use crate::error;
use crate::lang::ast::*;
use crate::lang::{Error, Literal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Result<T> = std::result::Result<T, Error>;

/// (line position, statement position) into the ordered program.
type Cursor = (usize, usize);

const GOSUB_DEPTH: usize = 256;
const FOR_DEPTH: usize = 64;

/// What a step left the machine doing.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Event {
    Running,
    AwaitingInput,
    Stopped,
}

#[derive(Debug, Clone)]
struct ForFrame {
    counter: String,
    limit: f64,
    step: f64,
    resume: Cursor,
}

#[derive(Debug)]
struct InputRequest {
    targets: Vec<Lvalue>,
    line: u16,
}

enum Flow {
    Next,
    Jumped,
}

pub struct Runtime {
    program: Program,
    data: Vec<Literal>,
    data_cursor: usize,
    vars: Var,
    arrays: Arrays,
    gosub: Stack<Cursor>,
    fors: Stack<ForFrame>,
    cursor: Cursor,
    rng: StdRng,
    screen: Arc<Mutex<Screen>>,
    pokes: HashMap<u16, u8>,
    input: Option<InputRequest>,
    done: bool,
}

impl Runtime {
    pub fn new(program: Program, screen: Arc<Mutex<Screen>>, seed: Option<u64>) -> Runtime {
        let data = program.data_pool();
        Runtime {
            program,
            data,
            data_cursor: 0,
            vars: Var::new(),
            arrays: Arrays::new(),
            gosub: Stack::new(GOSUB_DEPTH),
            fors: Stack::new(FOR_DEPTH),
            cursor: (0, 0),
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
            screen,
            pokes: HashMap::new(),
            input: None,
            done: false,
        }
    }

    pub fn screen(&self) -> Arc<Mutex<Screen>> {
        Arc::clone(&self.screen)
    }

    pub fn awaiting_input(&self) -> bool {
        self.input.is_some()
    }

    /// Addresses POKEd so far with their last value; the color
    /// registers act on the screen, everything else just lands here.
    pub fn pokes(&self) -> &HashMap<u16, u8> {
        &self.pokes
    }

    /// Execute one statement. Errors come back anchored to the line
    /// that was executing.
    pub fn step(&mut self) -> Result<Event> {
        if self.done {
            return Ok(Event::Stopped);
        }
        if self.input.is_some() {
            return Ok(Event::AwaitingInput);
        }
        let (line_pos, statement_pos) = self.cursor;
        let line = match self.program.get(line_pos) {
            Some(line) => line,
            None => {
                self.done = true;
                return Ok(Event::Stopped);
            }
        };
        if statement_pos >= line.statements().len() {
            self.cursor = (line_pos + 1, 0);
            return Ok(Event::Running);
        }
        let number = line.number();
        let statement = line.statements()[statement_pos].clone();
        self.cursor = (line_pos, statement_pos + 1);
        self.exec(&statement)
            .map_err(|e| e.in_line_number(Some(number)))?;
        if self.done {
            Ok(Event::Stopped)
        } else if self.input.is_some() {
            Ok(Event::AwaitingInput)
        } else {
            Ok(Event::Running)
        }
    }

    /// Deliver one line typed at the INPUT prompt. Unparseable numeric
    /// input re-prompts instead of failing the run.
    pub fn provide_input(&mut self, line: &str) -> Result<()> {
        let request = match self.input.take() {
            Some(request) => request,
            None => return Ok(()),
        };
        let screen = Arc::clone(&self.screen);
        screen.lock().unwrap().newline();
        let values: Vec<&str> = line.split(',').collect();
        let mut parsed = vec![];
        let mut good = true;
        for (position, target) in request.targets.iter().enumerate() {
            let raw = values.get(position).map(|v| v.trim()).unwrap_or("");
            if target.ident.is_string() {
                parsed.push(Val::String(raw.to_string()));
            } else {
                match parse_plain_number(raw) {
                    Some(n) => parsed.push(Val::Number(n)),
                    None => {
                        good = false;
                        break;
                    }
                }
            }
        }
        if !good {
            screen.lock().unwrap().print("? ");
            self.input = Some(request);
            return Ok(());
        }
        let line_number = request.line;
        for (target, value) in request.targets.iter().zip(parsed) {
            self.assign(target, value)
                .map_err(|e| e.in_line_number(Some(line_number)))?;
        }
        Ok(())
    }

    fn exec(&mut self, statement: &Statement) -> Result<Flow> {
        match statement {
            Statement::Print(items) => self.exec_print(items),
            Statement::Input(prompt, targets) => self.exec_input(prompt.as_deref(), targets),
            Statement::Let(lvalue, expr) => {
                let value = self.eval(expr)?;
                self.assign(lvalue, value)?;
                Ok(Flow::Next)
            }
            Statement::If(condition, branch) => self.exec_if(condition, branch),
            Statement::Goto(number) => self.goto(*number),
            Statement::Gosub(number) => self.gosub(*number),
            Statement::Return => match self.gosub.pop() {
                Some(cursor) => {
                    self.cursor = cursor;
                    Ok(Flow::Jumped)
                }
                None => Err(error!(ReturnWithoutGosub)),
            },
            Statement::For(counter, start, end, step) => {
                self.exec_for(counter, start, end, step.as_ref())
            }
            Statement::Next(counter) => self.exec_next(counter.as_ref()),
            Statement::Dim(declarations) => {
                for (ident, dimensions) in declarations {
                    let sizes = self.subscripts(dimensions)?;
                    self.arrays.dimension(ident.name(), sizes)?;
                }
                Ok(Flow::Next)
            }
            Statement::Data(_) => Ok(Flow::Next),
            Statement::Read(targets) => self.exec_read(targets),
            Statement::Poke(address, value) => self.exec_poke(address, value),
            Statement::On(target, selector, lines) => self.exec_on(*target, selector, lines),
            Statement::Restore => {
                self.data_cursor = 0;
                Ok(Flow::Next)
            }
            Statement::Run => {
                self.vars.clear();
                self.arrays.clear();
                self.gosub.clear();
                self.fors.clear();
                self.data_cursor = 0;
                self.cursor = (0, 0);
                Ok(Flow::Jumped)
            }
            Statement::Stop | Statement::End => {
                self.done = true;
                Ok(Flow::Next)
            }
            Statement::Rem(_) => Ok(Flow::Next),
        }
    }

    fn exec_print(&mut self, items: &[PrintItem]) -> Result<Flow> {
        let screen = Arc::clone(&self.screen);
        let mut screen = screen.lock().unwrap();
        for item in items {
            match item {
                PrintItem::Expr(expr) => {
                    let value = self.eval(expr)?;
                    screen.print(&value.format());
                    if !value.is_string() {
                        screen.print(" ");
                    }
                }
                PrintItem::Comma => {
                    let (_, col) = screen.cursor();
                    if col >= 30 {
                        screen.newline();
                    } else {
                        screen.tab((col / 10 + 1) * 10);
                    }
                }
                PrintItem::Semicolon => {}
                PrintItem::Tab(expr) => {
                    let column = self.eval(expr)?.as_int()?;
                    if column < 0 {
                        return Err(error!(IllegalQuantity));
                    }
                    screen.tab(column as usize);
                }
                PrintItem::Spc(expr) => {
                    let count = self.eval(expr)?.as_int()?;
                    if count < 0 {
                        return Err(error!(IllegalQuantity));
                    }
                    screen.spc(count as usize);
                }
            }
        }
        match items.last() {
            Some(PrintItem::Comma) | Some(PrintItem::Semicolon) => {}
            _ => screen.newline(),
        }
        Ok(Flow::Next)
    }

    fn exec_input(&mut self, prompt: Option<&str>, targets: &[Lvalue]) -> Result<Flow> {
        let line = match self.program.get(self.cursor.0) {
            Some(line) => line.number(),
            None => 0,
        };
        {
            let mut screen = self.screen.lock().unwrap();
            if let Some(prompt) = prompt {
                screen.print(prompt);
            }
            screen.print("? ");
        }
        self.input = Some(InputRequest {
            targets: targets.to_vec(),
            line,
        });
        Ok(Flow::Next)
    }

    fn exec_if(&mut self, condition: &Expression, branch: &IfBranch) -> Result<Flow> {
        let truthy = self.eval(condition)?.as_number()? != 0.0;
        if !truthy {
            // a false IF abandons the rest of the line
            self.cursor = (self.cursor.0 + 1, 0);
            return Ok(Flow::Jumped);
        }
        match branch {
            IfBranch::Line(number) => self.goto(*number),
            IfBranch::Statements(statements) => {
                for statement in statements {
                    let flow = self.exec(statement)?;
                    if matches!(flow, Flow::Jumped) || self.done || self.input.is_some() {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Next)
            }
        }
    }

    fn goto(&mut self, number: u16) -> Result<Flow> {
        match self.program.index_of(number) {
            Some(position) => {
                self.cursor = (position, 0);
                Ok(Flow::Jumped)
            }
            None => Err(error!(UndefinedLine)),
        }
    }

    fn gosub(&mut self, number: u16) -> Result<Flow> {
        self.gosub.push(self.cursor)?;
        self.goto(number)
    }

    fn exec_for(
        &mut self,
        counter: &Ident,
        start: &Expression,
        end: &Expression,
        step: Option<&Expression>,
    ) -> Result<Flow> {
        let start = self.eval(start)?.as_number()?;
        let limit = self.eval(end)?.as_number()?;
        let step = match step {
            Some(step) => self.eval(step)?.as_number()?,
            None => 1.0,
        };
        let counter = counter.name().to_string();
        self.vars.store(&counter, Val::Number(start))?;
        // re-entering with a live counter discards that frame and all
        // frames above it
        if let Some(position) = self.fors.vec().iter().rposition(|f| f.counter == counter) {
            self.fors.truncate(position);
        }
        self.fors.push(ForFrame {
            counter,
            limit,
            step,
            resume: self.cursor,
        })?;
        Ok(Flow::Next)
    }

    fn exec_next(&mut self, counter: Option<&Ident>) -> Result<Flow> {
        let position = match counter {
            Some(ident) => self
                .fors
                .vec()
                .iter()
                .rposition(|f| f.counter == ident.name()),
            None => self.fors.len().checked_sub(1),
        };
        let position = match position {
            Some(position) => position,
            None => return Err(error!(NextWithoutFor)),
        };
        // a named NEXT abandons any inner loops
        self.fors.truncate(position + 1);
        let frame = match self.fors.last() {
            Some(frame) => frame.clone(),
            None => return Err(error!(NextWithoutFor)),
        };
        let value = self.vars.fetch(&frame.counter).as_number()? + frame.step;
        self.vars.store(&frame.counter, Val::Number(value))?;
        let finished = if frame.step >= 0.0 {
            value > frame.limit
        } else {
            value < frame.limit
        };
        if finished {
            self.fors.pop();
            Ok(Flow::Next)
        } else {
            self.cursor = frame.resume;
            Ok(Flow::Jumped)
        }
    }

    fn exec_read(&mut self, targets: &[Lvalue]) -> Result<Flow> {
        for target in targets {
            let datum = match self.data.get(self.data_cursor) {
                Some(datum) => datum.clone(),
                None => return Err(error!(OutOfData)),
            };
            self.data_cursor += 1;
            let value = if target.ident.is_string() {
                Val::String(match datum {
                    Literal::String(s) => s,
                    Literal::Number(n) => format!("{}", n),
                })
            } else {
                Val::Number(match datum {
                    Literal::Number(n) => n,
                    Literal::String(s) => val_parse(&s),
                })
            };
            self.assign(target, value)?;
        }
        Ok(Flow::Next)
    }

    fn exec_poke(&mut self, address: &Expression, value: &Expression) -> Result<Flow> {
        let address = self.eval(address)?.as_int()?;
        if !(0..=65535).contains(&address) {
            return Err(error!(IllegalQuantity));
        }
        let address = address as u16;
        let value = self.eval(value)?.as_int()?.rem_euclid(256) as u8;
        self.pokes.insert(address, value);
        let mut screen = self.screen.lock().unwrap();
        match address {
            53280 => screen.poke_color(ColorTarget::Border, value),
            53281 => screen.poke_color(ColorTarget::Background, value),
            646 => screen.poke_color(ColorTarget::Text, value),
            // 53272 (charset), 650 (key repeat), 1690 and the rest:
            // recorded above, no effect
            _ => {}
        }
        Ok(Flow::Next)
    }

    fn exec_on(
        &mut self,
        target: OnTarget,
        selector: &Expression,
        lines: &[u16],
    ) -> Result<Flow> {
        let selector = self.eval(selector)?.as_int()?;
        if selector < 0 {
            return Err(error!(IllegalQuantity));
        }
        let selector = selector as usize;
        if selector == 0 || selector > lines.len() {
            return Ok(Flow::Next);
        }
        let number = lines[selector - 1];
        match target {
            OnTarget::Goto => self.goto(number),
            OnTarget::Gosub => self.gosub(number),
        }
    }

    fn assign(&mut self, lvalue: &Lvalue, value: Val) -> Result<()> {
        match &lvalue.index {
            None => self.vars.store(lvalue.ident.name(), value),
            Some(exprs) => {
                let subscripts = self.subscripts(exprs)?;
                self.arrays.store(lvalue.ident.name(), &subscripts, value)
            }
        }
    }

    fn subscripts(&mut self, exprs: &[Expression]) -> Result<Vec<usize>> {
        let mut subscripts = vec![];
        for expr in exprs {
            let value = self.eval(expr)?.as_int()?;
            if value < 0 {
                return Err(error!(SubscriptOutOfRange));
            }
            subscripts.push(value as usize);
        }
        Ok(subscripts)
    }

    fn eval(&mut self, expr: &Expression) -> Result<Val> {
        use Expression::*;
        match expr {
            Number(n) => Ok(Val::Number(*n)),
            String(s) => Ok(Val::String(s.clone())),
            Var(ident) => Ok(self.vars.fetch(ident.name())),
            Array(ident, exprs) => {
                let subscripts = self.subscripts(exprs)?;
                self.arrays.fetch(ident.name(), &subscripts)
            }
            Function(ident, args) => self.eval_function(ident.name(), args),
            Negate(e) => Val::negate(self.eval(e)?),
            Not(e) => Val::not(self.eval(e)?),
            Power(l, r) => Val::power(self.eval(l)?, self.eval(r)?),
            Multiply(l, r) => Val::multiply(self.eval(l)?, self.eval(r)?),
            Divide(l, r) => Val::divide(self.eval(l)?, self.eval(r)?),
            Add(l, r) => Val::add(self.eval(l)?, self.eval(r)?),
            Subtract(l, r) => Val::subtract(self.eval(l)?, self.eval(r)?),
            Equal(l, r) => Val::equal(self.eval(l)?, self.eval(r)?),
            NotEqual(l, r) => Val::not_equal(self.eval(l)?, self.eval(r)?),
            Less(l, r) => Val::less(self.eval(l)?, self.eval(r)?),
            LessEqual(l, r) => Val::less_equal(self.eval(l)?, self.eval(r)?),
            Greater(l, r) => Val::greater(self.eval(l)?, self.eval(r)?),
            GreaterEqual(l, r) => Val::greater_equal(self.eval(l)?, self.eval(r)?),
            And(l, r) => Val::and(self.eval(l)?, self.eval(r)?),
            Or(l, r) => Val::or(self.eval(l)?, self.eval(r)?),
        }
    }

    fn eval_function(&mut self, name: &str, args: &[Expression]) -> Result<Val> {
        match name {
            "INT" => {
                let n = self.eval(one(args)?)?.as_number()?;
                Ok(Val::Number(n.floor()))
            }
            "RND" => {
                // the argument selects reseed modes on the metal; here
                // it is evaluated and ignored
                self.eval(one(args)?)?.as_number()?;
                Ok(Val::Number(self.rng.gen::<f64>()))
            }
            "CHR$" => {
                let code = self.eval(one(args)?)?.as_int()?;
                if !(0..=255).contains(&code) {
                    return Err(error!(IllegalQuantity));
                }
                Ok(Val::String((code as u8 as char).to_string()))
            }
            "ASC" => {
                let value = self.eval(one(args)?)?;
                let s = value.as_string()?;
                match s.chars().next() {
                    Some(c) => Ok(Val::Number(c as u32 as f64)),
                    None => Err(error!(IllegalQuantity)),
                }
            }
            "VAL" => {
                let value = self.eval(one(args)?)?;
                Ok(Val::Number(val_parse(value.as_string()?)))
            }
            "STR$" => {
                let n = self.eval(one(args)?)?.as_number()?;
                Ok(Val::String(Val::Number(n).format()))
            }
            "LEN" => {
                let value = self.eval(one(args)?)?;
                Ok(Val::Number(value.as_string()?.chars().count() as f64))
            }
            "LEFT$" => {
                let (value, count) = self.string_and_count(args)?;
                Ok(Val::String(value.chars().take(count).collect()))
            }
            "RIGHT$" => {
                let (value, count) = self.string_and_count(args)?;
                let skip = value.chars().count().saturating_sub(count);
                Ok(Val::String(value.chars().skip(skip).collect()))
            }
            "MID$" => {
                if args.len() < 2 || args.len() > 3 {
                    return Err(error!(SyntaxError));
                }
                let value = self.eval(&args[0])?;
                let s = value.as_string()?;
                let start = self.eval(&args[1])?.as_int()?;
                if start < 1 {
                    return Err(error!(IllegalQuantity));
                }
                let rest = s.chars().skip(start as usize - 1);
                let result: String = match args.get(2) {
                    Some(expr) => {
                        let len = self.eval(expr)?.as_int()?;
                        if len < 0 {
                            return Err(error!(IllegalQuantity));
                        }
                        rest.take(len as usize).collect()
                    }
                    None => rest.collect(),
                };
                Ok(Val::String(result))
            }
            _ => Err(error!(SyntaxError)),
        }
    }

    fn string_and_count(&mut self, args: &[Expression]) -> Result<(String, usize)> {
        if args.len() != 2 {
            return Err(error!(SyntaxError));
        }
        let value = self.eval(&args[0])?;
        let s = value.as_string()?.to_string();
        let count = self.eval(&args[1])?.as_int()?;
        if count < 0 {
            return Err(error!(IllegalQuantity));
        }
        Ok((s, count as usize))
    }
}

fn one(args: &[Expression]) -> Result<&Expression> {
    match args {
        [arg] => Ok(arg),
        _ => Err(error!(SyntaxError)),
    }
}

/// VAL-style prefix parse: optional sign, digits, optional fraction;
/// no digits means zero.
fn val_parse(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (pos, c) in s.char_indices() {
        if pos == 0 && (c == '+' || c == '-') {
            end = pos + c.len_utf8();
            continue;
        }
        if c.is_ascii_digit() {
            seen_digit = true;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
        end = pos + c.len_utf8();
    }
    if !seen_digit {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Strict parse for INPUT: the whole trimmed field must be a signed
/// decimal number.
fn parse_plain_number(s: &str) -> Option<f64> {
    let digits = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('+'))
        .unwrap_or(s);
    if digits.is_empty()
        || digits.chars().filter(|c| *c == '.').count() > 1
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        || !digits.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }
    s.parse().ok()
}
