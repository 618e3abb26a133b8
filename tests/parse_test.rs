use basic64::lang::ErrorCode;
use basic64::mach::Program;

/// Lines lifted from the hosted program's style of keyword gluing;
/// every one must parse.
#[test]
fn test_accepts_glued_keyword_forms() {
    let lines = [
        "10 IFI=5THENPRINT\"OK\"",
        "20 FOR PZ=HZTOHZ+15:NEXT",
        "30 IF A$<>\"N\"ANDA$<>\"S\"THEN 10",
        "40 L=1::IFI>ZTHENWW=INT(RND(1)*2)+1",
        "50 IFRND(1)>.5THENA(PZ)=A(PZ)+1",
        "60 PRINTCHR$(142):GOSUB2000",
    ];
    for line in lines {
        assert!(
            Program::parse(line).is_ok(),
            "failed to parse: {}",
            line
        );
    }
}

#[test]
fn test_lower_case_source() {
    assert!(Program::parse("10 print \"hello\":goto 10").is_ok());
}

#[test]
fn test_statements_per_line() {
    let program = Program::parse("10 A=1:B=2:PRINT A+B").unwrap();
    assert_eq!(program.get(0).unwrap().statements().len(), 3);
}

#[test]
fn test_rejects_duplicate_line_numbers() {
    let error = Program::parse("10 PRINT\n10 END").unwrap_err();
    assert_eq!(error.code(), ErrorCode::SyntaxError);
    assert_eq!(error.line_number(), Some(10));
}

#[test]
fn test_rejects_stray_quote() {
    // an unbalanced quote swallows the rest of the line
    let error = Program::parse("4000 PRINT \"A\":PRINT \"B").unwrap_err();
    assert_eq!(error.code(), ErrorCode::SyntaxError);
    assert_eq!(error.line_number(), Some(4000));
}

#[test]
fn test_rejects_missing_line_number() {
    assert!(Program::parse("PRINT 1").is_err());
}

#[test]
fn test_rejects_nonsense() {
    assert!(Program::parse("10 PRINT )").is_err());
    assert!(Program::parse("10 GOTO X").is_err());
    assert!(Program::parse("10 FOR I=1").is_err());
}

#[test]
fn test_line_number_range() {
    assert!(Program::parse("63999 END").is_ok());
    assert!(Program::parse("64000 END").is_err());
}
