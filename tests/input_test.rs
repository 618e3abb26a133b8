mod common;
use basic64::mach::Event;
use common::*;

#[test]
fn test_input_prompts_and_assigns() {
    let mut r = runtime("10 INPUT \"NAME\";A$:PRINT \"HI \";A$");
    let rows = exec(&mut r);
    assert_eq!(rows[0], "NAME?");
    assert!(r.awaiting_input());
    r.provide_input("MARIO").unwrap();
    let rows = exec(&mut r);
    assert_eq!(rows[1], "HI MARIO");
}

#[test]
fn test_input_without_prompt() {
    let mut r = runtime("10 INPUT X:PRINT X*2");
    let rows = exec(&mut r);
    assert_eq!(rows[0], "?");
    r.provide_input("21").unwrap();
    assert_eq!(exec(&mut r)[1], " 42");
}

#[test]
fn test_input_splits_on_commas() {
    let mut r = runtime("10 INPUT A,B(A):PRINT A;B(1)");
    exec(&mut r);
    r.provide_input("1,2").unwrap();
    assert_eq!(exec(&mut r)[1], " 1  2");
}

#[test]
fn test_bad_numeric_input_reprompts() {
    let mut r = runtime("10 INPUT X:PRINT X");
    exec(&mut r);
    r.provide_input("TWELVE").unwrap();
    assert!(r.awaiting_input());
    // the prompt was issued again on the next row
    assert_eq!(snapshot(&r)[1], "?");
    r.provide_input("12").unwrap();
    assert_eq!(exec(&mut r)[2], " 12");
}

#[test]
fn test_empty_line_accepted_for_strings_only() {
    let mut r = runtime("10 INPUT A$:PRINT \"[\";A$;\"]\"");
    exec(&mut r);
    r.provide_input("").unwrap();
    assert!(!r.awaiting_input());
    let mut r = runtime("10 INPUT X");
    exec(&mut r);
    r.provide_input("").unwrap();
    assert!(r.awaiting_input());
}

#[test]
fn test_step_reports_awaiting_input() {
    let mut r = runtime("10 INPUT X");
    loop {
        match r.step().unwrap() {
            Event::AwaitingInput => break,
            Event::Running => {}
            Event::Stopped => panic!("stopped before input"),
        }
    }
    assert!(r.awaiting_input());
}
