/*!
## PRG module

Detokenizes a saved C64 BASIC program image back into canonical source
text, one logical line per output line.

A PRG file is a two-byte little-endian load address followed by a
linked list of lines:

```text
link (u16 LE, 0x0000 ends the program) | lineno (u16 LE) | body… | 0x00
```

Body bytes with the high bit set are tokens; everything else is
PETSCII. Tokens inside string literals and after REM are literal bytes.
*/

use thiserror::Error;

/// The BASIC V2 reserved words, indexed from token 0x80.
const TOKENS: &[&str] = &[
    "END", "FOR", "NEXT", "DATA", "INPUT#", "INPUT", "DIM", "READ", "LET", "GOTO", "RUN", "IF",
    "RESTORE", "GOSUB", "RETURN", "REM", "STOP", "ON", "WAIT", "LOAD", "SAVE", "VERIFY", "DEF",
    "POKE", "PRINT#", "PRINT", "CONT", "LIST", "CLR", "CMD", "SYS", "OPEN", "CLOSE", "GET", "NEW",
    "TAB(", "TO", "FN", "SPC(", "THEN", "NOT", "STEP", "+", "-", "*", "/", "^", "AND", "OR", ">",
    "=", "<", "SGN", "INT", "ABS", "USR", "FRE", "POS", "SQR", "RND", "LOG", "EXP", "COS", "SIN",
    "TAN", "ATN", "PEEK", "LEN", "STR$", "VAL", "ASC", "CHR$", "LEFT$", "RIGHT$", "MID$", "GO",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown token at byte {0}")]
    BadToken(usize),
    #[error("truncated program")]
    Truncated,
    #[error("unterminated string literal")]
    UnterminatedString,
}

fn read_u16(bytes: &[u8], pos: usize) -> Result<u16, DecodeError> {
    match (bytes.get(pos), bytes.get(pos + 1)) {
        (Some(lo), Some(hi)) => Ok(u16::from_le_bytes([*lo, *hi])),
        _ => Err(DecodeError::Truncated),
    }
}

/// Detokenize a PRG image. The load address is discarded.
pub fn detokenize(bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.len() < 2 {
        return Err(DecodeError::Truncated);
    }
    let mut out = String::new();
    let mut pos = 2;
    loop {
        let link = read_u16(bytes, pos)?;
        pos += 2;
        if link == 0 {
            break;
        }
        let number = read_u16(bytes, pos)?;
        pos += 2;
        out.push_str(&number.to_string());
        out.push(' ');
        pos = decode_line(bytes, pos, &mut out)?;
        out.push('\n');
    }
    Ok(out)
}

fn decode_line(bytes: &[u8], mut pos: usize, out: &mut String) -> Result<usize, DecodeError> {
    let mut in_string = false;
    let mut in_rem = false;
    loop {
        let byte = match bytes.get(pos) {
            Some(byte) => *byte,
            None => return Err(DecodeError::Truncated),
        };
        if byte == 0 {
            if in_string {
                return Err(DecodeError::UnterminatedString);
            }
            return Ok(pos + 1);
        }
        if byte == b'"' {
            in_string = !in_string;
            out.push('"');
            pos += 1;
            continue;
        }
        if in_string || in_rem {
            push_petscii(byte, out);
            pos += 1;
            continue;
        }
        if byte >= 0x80 {
            let token = match TOKENS.get((byte - 0x80) as usize) {
                Some(token) => *token,
                None => return Err(DecodeError::BadToken(pos)),
            };
            // smart spacing: keep keyword and identifier text apart so
            // the parser downstream sees unambiguous boundaries
            let first = token.chars().next().unwrap_or(' ');
            let last = token.chars().last().unwrap_or(' ');
            if first.is_ascii_alphanumeric()
                && out.chars().last().map_or(false, |c| c.is_ascii_alphanumeric())
            {
                out.push(' ');
            }
            out.push_str(token);
            if last.is_ascii_alphanumeric()
                && bytes
                    .get(pos + 1)
                    .map_or(false, |b| b.is_ascii_alphanumeric())
            {
                out.push(' ');
            }
            if token == "REM" {
                in_rem = true;
            }
            pos += 1;
            continue;
        }
        push_petscii(byte, out);
        pos += 1;
    }
}

/// Literal PETSCII to text. Control codes that the screen understands
/// come out as their in-band placeholders; the common graphics bytes
/// map straight to their glyphs.
fn push_petscii(byte: u8, out: &mut String) {
    match byte {
        0x12 | 0x92 => out.push_str("[REVERSE]"),
        0x93 => out.push_str("[CLR]"),
        0xA3 | 0xC0 => out.push('─'),
        0xDD => out.push('│'),
        0xD1 => out.push('●'),
        0xA6 => out.push('▒'),
        0x20..=0x5F => out.push(byte as char),
        0x61..=0x7A => out.push(byte as char),
        _ => out.push('?'),
    }
}
