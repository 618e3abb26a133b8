//! Keyword-collision normalizer.
//!
//! C64 BASIC source routinely glues reserved words against identifiers
//! (`IFI=5THENPRINT`, `PZ=HZTOHZ+15`) because the original tokenizer
//! crunched reserved words greedily from an ordered list, never caring
//! about identifier boundaries. Three passes over the upper-cased line
//! reintroduce the separations before lexing. String literals and REM
//! tails are copied through untouched by every pass.

/// Statement keywords are substituted wherever their text appears;
/// keywords win unconditionally over identifiers, exactly as the
/// original crunch did.
const STATEMENT_WORDS: &[&str] = &[
    "PRINT", "INPUT", "IF", "THEN", "GOTO", "GOSUB", "RETURN", "FOR", "NEXT", "DIM", "DATA",
    "READ", "POKE", "LET", "END", "REM", "RUN", "STOP", "ON", "RESTORE",
];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '$' || c == '%'
}

fn matches_at(chars: &[char], at: usize, word: &str) -> bool {
    chars.len() >= at + word.len() && chars[at..at + word.len()].iter().copied().eq(word.chars())
}

/// True when the remainder at `at` is the REM keyword on a word boundary.
/// After the statement pass every surviving R-E-M run outside a string is
/// the keyword, so later passes use this to leave the tail alone.
fn at_remark(chars: &[char], at: usize) -> bool {
    matches_at(chars, at, "REM") && (at == 0 || !is_ident_char(chars[at - 1]))
}

/// The maximal alphabetic run containing position `at`.
fn letter_run_around(chars: &[char], at: usize) -> String {
    let mut start = at;
    while start > 0 && chars[start - 1].is_ascii_alphabetic() {
        start -= 1;
    }
    let mut end = at;
    while end < chars.len() && chars[end].is_ascii_alphabetic() {
        end += 1;
    }
    chars[start..end].iter().collect()
}

pub fn normalize(line: &str) -> String {
    let pass1 = statement_pass(line);
    let pass2 = logical_pass(&pass1);
    to_pass(&pass2)
}

/// Pass 1: separate statement keywords from whatever they abut.
fn statement_pass(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            in_string = !in_string;
            out.push(c);
            i += 1;
            continue;
        }
        if in_string {
            out.push(c);
            i += 1;
            continue;
        }
        let mut matched = false;
        for word in STATEMENT_WORDS {
            if matches_at(&chars, i, word) {
                if out.chars().last().map_or(false, is_ident_char) {
                    out.push(' ');
                }
                out.push_str(word);
                i += word.len();
                if *word == "REM" {
                    out.extend(chars[i..].iter());
                    return out;
                }
                if chars.get(i).copied().map_or(false, is_ident_char) {
                    out.push(' ');
                }
                matched = true;
                break;
            }
        }
        if !matched {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Pass 2: AND, OR and NOT. Normalized unless the character before is an
/// identifier character and the character after is not; that mixed shape
/// is the trailing edge of a longer word (the OR in FOR), every other
/// shape is the operator. Safe only because strings and REM tails never
/// reach this pass.
fn logical_pass(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            in_string = !in_string;
            out.push(c);
            i += 1;
            continue;
        }
        if in_string {
            out.push(c);
            i += 1;
            continue;
        }
        if at_remark(&chars, i) {
            out.extend(chars[i..].iter());
            return out;
        }
        let mut matched = false;
        for word in ["AND", "OR", "NOT"] {
            if matches_at(&chars, i, word) {
                // never split a statement keyword pass 1 just emitted
                // (the OR inside RESTORE)
                if STATEMENT_WORDS.contains(&letter_run_around(&chars, i).as_str()) {
                    break;
                }
                let prev_id = i > 0 && is_ident_char(chars[i - 1]);
                let next_id = chars
                    .get(i + word.len())
                    .copied()
                    .map_or(false, is_ident_char);
                if !(prev_id && !next_id) {
                    out.push(' ');
                    out.push_str(word);
                    out.push(' ');
                    i += word.len();
                    matched = true;
                }
                break;
            }
        }
        if !matched {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Pass 3: the first TO inside a `FOR …=…` region is the loop keyword,
/// unconditionally. The region ends at that TO or at the end of the
/// statement.
fn to_pass(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    let mut in_string = false;
    let mut in_for = false;
    let mut seen_equals = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            in_string = !in_string;
            out.push(c);
            i += 1;
            continue;
        }
        if in_string {
            out.push(c);
            i += 1;
            continue;
        }
        if at_remark(&chars, i) {
            out.extend(chars[i..].iter());
            return out;
        }
        if matches_at(&chars, i, "FOR")
            && (i == 0 || !is_ident_char(chars[i - 1]))
            && !chars.get(i + 3).copied().map_or(false, is_ident_char)
        {
            in_for = true;
            seen_equals = false;
            out.push_str("FOR");
            i += 3;
            continue;
        }
        if c == ':' {
            in_for = false;
            seen_equals = false;
        }
        if in_for && c == '=' {
            seen_equals = true;
        }
        if in_for && seen_equals && matches_at(&chars, i, "TO") {
            out.push_str(" TO ");
            i += 2;
            in_for = false;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squeeze(s: &str) -> String {
        // collapse runs of spaces so assertions read cleanly
        let mut out = String::new();
        let mut last_space = false;
        for c in s.chars() {
            if c == ' ' {
                if !last_space {
                    out.push(c);
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }
        out
    }

    #[test]
    fn test_glued_if_then_print() {
        assert_eq!(
            squeeze(&normalize("10 IFI=5THENPRINT\"OK\"")),
            "10 IF I=5 THEN PRINT\"OK\""
        );
    }

    #[test]
    fn test_glued_then_target() {
        assert_eq!(
            squeeze(&normalize("40 L=1::IFI>ZTHENWW=INT(RND(1)*2)+1")),
            "40 L=1::IF I>Z THEN WW=INT(RND(1)*2)+1"
        );
    }

    #[test]
    fn test_for_to_region() {
        assert_eq!(
            squeeze(&normalize("20 FOR PZ=HZTOHZ+15:NEXT")),
            "20 FOR PZ=HZ TO HZ+15:NEXT"
        );
    }

    #[test]
    fn test_embedded_or() {
        assert_eq!(squeeze(&normalize("IF HZORQZ THEN 10")), "IF HZ OR QZ THEN 10");
    }

    #[test]
    fn test_and_after_string() {
        assert_eq!(
            squeeze(&normalize("30 IF A$<>\"N\"ANDA$<>\"S\"THEN 10")),
            "30 IF A$<>\"N\" AND A$<>\"S\"THEN 10"
        );
    }

    #[test]
    fn test_or_inside_string_untouched() {
        assert_eq!(normalize("PRINT\"[BORDERS]\""), "PRINT\"[BORDERS]\"");
        assert_eq!(normalize("PRINT\"ANCORA TU\""), "PRINT\"ANCORA TU\"");
    }

    #[test]
    fn test_for_keyword_survives() {
        // the OR inside FOR has an identifier char before and a space
        // after, the one shape the logical pass skips
        assert_eq!(squeeze(&normalize("FOR I=1 TO 3")), "FOR I=1 TO 3");
    }

    #[test]
    fn test_rem_tail_untouched() {
        assert_eq!(normalize("100 REMHZORQZ AND MORE"), "100 REMHZORQZ AND MORE");
    }

    #[test]
    fn test_restore_survives_logical_pass() {
        assert_eq!(squeeze(&normalize("500 RESTORE:GOTO 10")), "500 RESTORE:GOTO 10");
    }

    #[test]
    fn test_crunch_wins_over_identifier() {
        // same greedy substitution the original tokenizer performed
        assert_eq!(squeeze(&normalize("FORAPE=1TO16")), "FOR APE=1 TO 16");
    }
}
