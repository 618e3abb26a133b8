use std::collections::HashMap;

/// ## Screen memory
///
/// The 40×25 character grid the interpreter writes into and the
/// frontend renders. Colors are palette indices 0..16; the reverse
/// attribute is latched per cell at write time.

pub const COLUMNS: usize = 40;
pub const ROWS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub reverse: bool,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    reverse: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Border,
    Background,
    Text,
}

thread_local!(
    /// In-band placeholders for PETSCII graphics, translated at print
    /// time. CLR and REVERSE act on the screen instead of producing a
    /// glyph; unknown placeholders are dropped.
    static PLACEHOLDERS: HashMap<&'static str, char> = [
        ("SIDE", '│'),
        ("BORDERS", '─'),
        ("BALL", '●'),
        ("FIELD", '▒'),
        ("BLOCK", '█'),
        ("SHADE", '░'),
    ]
    .into_iter()
    .collect();
);

#[derive(Debug)]
pub struct Screen {
    cells: Vec<Vec<Cell>>,
    row: usize,
    col: usize,
    pub border: u8,
    pub background: u8,
    pub text: u8,
    reverse: bool,
    input: String,
}

impl Default for Screen {
    fn default() -> Screen {
        Screen::new()
    }
}

impl Screen {
    pub fn new() -> Screen {
        Screen {
            cells: vec![vec![BLANK; COLUMNS]; ROWS],
            row: 0,
            col: 0,
            // power-on colors: light blue on blue
            border: 14,
            background: 6,
            text: 14,
            reverse: false,
            input: String::new(),
        }
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn rows(&self) -> &Vec<Vec<Cell>> {
        &self.cells
    }

    pub fn clear(&mut self) {
        self.cells = vec![vec![BLANK; COLUMNS]; ROWS];
        self.row = 0;
        self.col = 0;
    }

    pub fn print(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\n' {
                self.newline();
            } else if ch == '[' {
                let mut name = String::new();
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                    name.push(ch);
                }
                match name.as_str() {
                    "CLR" => self.clear(),
                    "REVERSE" => self.reverse = !self.reverse,
                    _ => {
                        if let Some(glyph) =
                            PLACEHOLDERS.with(|p| p.get(name.as_str()).copied())
                        {
                            self.put(glyph);
                        }
                    }
                }
            } else {
                self.put(map_petscii(ch));
            }
        }
    }

    fn put(&mut self, glyph: char) {
        self.cells[self.row][self.col] = Cell {
            glyph,
            reverse: self.reverse,
        };
        self.col += 1;
        if self.col == COLUMNS {
            self.newline();
        }
    }

    pub fn newline(&mut self) {
        self.col = 0;
        self.row += 1;
        if self.row == ROWS {
            self.scroll();
            self.row = ROWS - 1;
        }
    }

    fn scroll(&mut self) {
        self.cells.remove(0);
        self.cells.push(vec![BLANK; COLUMNS]);
    }

    /// Forward-only tab: pads with spaces up to the target column,
    /// never moves backward, never wraps.
    pub fn tab(&mut self, column: usize) {
        let target = column.min(COLUMNS - 1);
        while self.col < target {
            self.put(' ');
        }
    }

    pub fn spc(&mut self, count: usize) {
        for _ in 0..count {
            self.put(' ');
        }
    }

    pub fn reverse_on(&mut self) {
        self.reverse = true;
    }

    pub fn reverse_off(&mut self) {
        self.reverse = false;
    }

    pub fn poke_color(&mut self, target: ColorTarget, value: u8) {
        let code = value & 0x0F;
        match target {
            ColorTarget::Border => self.border = code,
            ColorTarget::Background => self.background = code,
            ColorTarget::Text => self.text = code,
        }
    }

    /// Rows as text, trailing spaces trimmed.
    pub fn snapshot(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.glyph)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    // --- input line -------------------------------------------------

    pub fn type_char(&mut self, ch: char) {
        self.input.push(ch);
        self.print(&ch.to_string());
    }

    pub fn type_backspace(&mut self) {
        if self.input.pop().is_some() && self.col > 0 {
            self.col -= 1;
            self.cells[self.row][self.col] = BLANK;
        }
    }

    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// PETSCII codes that survive into detokenized text, mapped to their
/// box-drawing equivalents; everything else passes through.
fn map_petscii(ch: char) -> char {
    match ch {
        '\u{00DD}' => '│',
        '\u{00A3}' => '─',
        '\u{00D1}' => '●',
        '\u{00A6}' => '▒',
        _ => ch,
    }
}
