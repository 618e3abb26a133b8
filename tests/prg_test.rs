mod common;
use basic64::mach::Program;
use basic64::prg::{detokenize, DecodeError};
use common::*;

/// Crunch plain source into a PRG image the way the machine stored it:
/// greedy longest-match tokenization, strings and REM tails literal.
fn tokenize(source: &str) -> Vec<u8> {
    const TOKENS: &[&str] = &[
        "END", "FOR", "NEXT", "DATA", "INPUT#", "INPUT", "DIM", "READ", "LET", "GOTO", "RUN",
        "IF", "RESTORE", "GOSUB", "RETURN", "REM", "STOP", "ON", "WAIT", "LOAD", "SAVE",
        "VERIFY", "DEF", "POKE", "PRINT#", "PRINT", "CONT", "LIST", "CLR", "CMD", "SYS", "OPEN",
        "CLOSE", "GET", "NEW", "TAB(", "TO", "FN", "SPC(", "THEN", "NOT", "STEP", "+", "-", "*",
        "/", "^", "AND", "OR", ">", "=", "<", "SGN", "INT", "ABS", "USR", "FRE", "POS", "SQR",
        "RND", "LOG", "EXP", "COS", "SIN", "TAN", "ATN", "PEEK", "LEN", "STR$", "VAL", "ASC",
        "CHR$", "LEFT$", "RIGHT$", "MID$", "GO",
    ];
    let mut image = vec![0x01, 0x08];
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (digits, rest) = line.split_at(line.find(' ').unwrap());
        let number: u16 = digits.parse().unwrap();
        image.extend([0xFF, 0xFF]); // link, value unused by the decoder
        image.extend(number.to_le_bytes());
        let mut in_string = false;
        let mut in_rem = false;
        let body = rest.trim_start();
        let mut pos = 0;
        'body: while pos < body.len() {
            let rest = &body[pos..];
            let c = rest.chars().next().unwrap();
            if c == '"' {
                in_string = !in_string;
                image.push(b'"');
                pos += 1;
                continue;
            }
            if !in_string && !in_rem {
                // longest token first, as the crunch routine worked
                let mut candidates: Vec<(usize, &str)> =
                    TOKENS.iter().enumerate().map(|(i, t)| (i, *t)).collect();
                candidates.sort_by_key(|(_, t)| std::cmp::Reverse(t.len()));
                for (index, token) in candidates {
                    if rest.starts_with(token) {
                        image.push(0x80 + index as u8);
                        if token == "REM" {
                            in_rem = true;
                        }
                        pos += token.len();
                        continue 'body;
                    }
                }
            }
            image.push(c as u8);
            pos += c.len_utf8();
        }
        image.push(0);
    }
    image.extend([0x00, 0x00]);
    image
}

fn statements_of(program: &Program) -> String {
    let mut out = String::new();
    for position in 0.. {
        match program.get(position) {
            Some(line) => {
                out.push_str(&format!("{} {:?}\n", line.number(), line.statements()))
            }
            None => break,
        }
    }
    out
}

/// Round trip: parse(detokenize(tokenize(P))) == parse(P).
#[test]
fn test_prg_round_trip_matches_plain_parse() {
    let source = concat!(
        "10 PRINT \"HELLO\"\n",
        "20 FOR I=1 TO 3:PRINT I;:NEXT:PRINT\n",
        "30 IF A$<>\"N\" AND A$<>\"S\" THEN 10\n",
        "40 DATA 7,9\n",
        "50 READ A,B:PRINT A+B\n",
        "60 GOSUB 100:GOTO 70\n",
        "70 END\n",
        "100 X=X+1:RETURN\n",
    );
    let direct = Program::parse(source).unwrap();
    let decoded_text = detokenize(&tokenize(source)).unwrap();
    let decoded = Program::parse(&decoded_text).unwrap();
    assert_eq!(statements_of(&direct), statements_of(&decoded));
}

/// The detokenized text runs like the plain text.
#[test]
fn test_prg_pipeline_executes() {
    let source = "10 FOR I=1 TO 3:PRINT I;:NEXT:PRINT\n";
    let decoded = detokenize(&tokenize(source)).unwrap();
    let program = Program::parse(&decoded).unwrap();
    let screen = std::sync::Arc::new(std::sync::Mutex::new(basic64::mach::Screen::new()));
    let mut r = basic64::mach::Runtime::new(program, screen, Some(1));
    assert_eq!(exec(&mut r)[0], " 1  2  3");
}

#[test]
fn test_glued_keywords_from_crunched_source() {
    // crunching IFI=5THENPRINT"OK" puts IF/THEN/PRINT tokens right
    // against the identifier bytes; the decoder's smart spacing and
    // the parser's normalizer must both hold up
    let decoded = detokenize(&tokenize("10 IFI=5THENPRINT\"OK\"\n")).unwrap();
    assert!(Program::parse(&decoded).is_ok());
}

#[test]
fn test_decode_errors() {
    assert_eq!(detokenize(&[0x01]).unwrap_err(), DecodeError::Truncated);
    let mut bad_token = vec![0x01, 0x08, 0x10, 0x08, 0x0A, 0x00, 0xFE, 0x00, 0x00, 0x00];
    assert_eq!(
        detokenize(&bad_token).unwrap_err(),
        DecodeError::BadToken(6)
    );
    bad_token[6] = b'"';
    // line now opens a string that never closes
    assert_eq!(
        detokenize(&bad_token).unwrap_err(),
        DecodeError::UnterminatedString
    );
}
