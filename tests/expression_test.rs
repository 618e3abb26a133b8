mod common;
use common::*;

#[test]
fn test_precedence() {
    assert_eq!(run("10 PRINT 2+3*4")[0], " 14");
    assert_eq!(run("10 PRINT (2+3)*4")[0], " 20");
    assert_eq!(run("10 PRINT 2^3*2")[0], " 16");
    assert_eq!(run("10 PRINT 2^3^2")[0], " 512");
    assert_eq!(run("10 PRINT -2^2")[0], " 4");
    assert_eq!(run("10 PRINT 10-2-3")[0], " 5");
}

#[test]
fn test_comparisons_are_c64_truth_values() {
    assert_eq!(run("10 PRINT 1<2")[0], "-1");
    assert_eq!(run("10 PRINT 2<1")[0], " 0");
    // truth values feed back into arithmetic
    assert_eq!(run("10 PRINT (1<2)+(3<4)")[0], "-2");
}

#[test]
fn test_and_or_not() {
    assert_eq!(run("10 PRINT 1<2 AND 3<4")[0], "-1");
    assert_eq!(run("10 PRINT 1<2 AND 3>4")[0], " 0");
    assert_eq!(run("10 PRINT 1>2 OR 3<4")[0], "-1");
    assert_eq!(run("10 PRINT NOT 0")[0], "-1");
    assert_eq!(run("10 IF NOT X THEN PRINT \"FRESH\"")[0], "FRESH");
}

#[test]
fn test_string_comparison_and_concat() {
    assert_eq!(run("10 A$=\"AB\":PRINT A$+\"C\"")[0], "ABC");
    assert_eq!(run("10 IF \"ABC\"<\"ABD\" THEN PRINT \"LT\"")[0], "LT");
    assert_eq!(run("10 IF A$=\"\" THEN PRINT \"EMPTY\"")[0], "EMPTY");
}

#[test]
fn test_int_floors_toward_minus_infinity() {
    assert_eq!(run("10 PRINT INT(2.7)")[0], " 2");
    assert_eq!(run("10 PRINT INT(-2.1)")[0], "-3");
}

#[test]
fn test_string_functions() {
    assert_eq!(run("10 PRINT CHR$(65)")[0], "A");
    assert_eq!(run("10 PRINT ASC(\"A\")")[0], " 65");
    assert_eq!(run("10 PRINT LEN(\"HELLO\")")[0], " 5");
    assert_eq!(run("10 PRINT LEFT$(\"HELLO\",2)")[0], "HE");
    assert_eq!(run("10 PRINT RIGHT$(\"HELLO\",2)")[0], "LO");
    assert_eq!(run("10 PRINT MID$(\"HELLO\",2,3)")[0], "ELL");
    assert_eq!(run("10 PRINT MID$(\"HELLO\",2)")[0], "ELLO");
    assert_eq!(run("10 PRINT MID$(\"HI\",9)")[0], "");
}

#[test]
fn test_val_and_str() {
    assert_eq!(run("10 PRINT VAL(\"12AB\")")[0], " 12");
    assert_eq!(run("10 PRINT VAL(\"X\")")[0], " 0");
    assert_eq!(run("10 PRINT STR$(42)")[0], " 42");
    assert_eq!(run("10 PRINT STR$(-1)")[0], "-1");
    // STR$ keeps the sign position but not PRINT's trailing space
    assert_eq!(run("10 PRINT STR$(7)+\"X\"")[0], " 7X");
}

#[test]
fn test_rnd_in_unit_interval_and_seeded() {
    let rows = run("10 FOR I=1 TO 50:R=RND(1):IF R<0 OR R>=1 THEN PRINT \"BAD\":END\n20 NEXT:PRINT \"OK\"");
    assert_eq!(rows[0], "OK");
    // same seed, same sequence
    let a = run("10 FOR I=1 TO 5:PRINT RND(1):NEXT");
    let b = run("10 FOR I=1 TO 5:PRINT RND(1):NEXT");
    assert_eq!(a, b);
}

#[test]
fn test_numeric_formatting_laws() {
    assert_eq!(run("10 PRINT 0")[0], " 0");
    assert_eq!(run("10 PRINT 3.5")[0], " 3.5");
    assert_eq!(run("10 PRINT -0.25")[0], "-0.25");
    assert_eq!(run("10 PRINT 1/4")[0], " 0.25");
}

#[test]
fn test_undefined_scalars_default() {
    assert_eq!(run("10 PRINT Z")[0], " 0");
    assert_eq!(run("10 PRINT Z$;\"|\"")[0], "|");
}

#[test]
fn test_integer_suffix_is_numeric() {
    assert_eq!(run("10 A%=5:PRINT A%+1")[0], " 6");
}
