#![allow(dead_code)]

use basic64::lang::Error;
use basic64::mach::{Event, Program, Runtime, Screen};
use std::sync::{Arc, Mutex};

pub fn runtime(source: &str) -> Runtime {
    let program = Program::parse(source).expect("program should parse");
    Runtime::new(program, Arc::new(Mutex::new(Screen::new())), Some(1))
}

/// Step to completion (or the first INPUT) and return the snapshot.
pub fn exec(runtime: &mut Runtime) -> Vec<String> {
    exec_n(runtime, 100_000)
}

pub fn exec_n(runtime: &mut Runtime, cycles: usize) -> Vec<String> {
    for _ in 0..cycles {
        match runtime.step().expect("clean run") {
            Event::Stopped | Event::AwaitingInput => break,
            Event::Running => {}
        }
    }
    snapshot(runtime)
}

/// Step until the runtime fails and return the error.
pub fn exec_err(runtime: &mut Runtime) -> Error {
    for _ in 0..100_000 {
        match runtime.step() {
            Ok(Event::Stopped) | Ok(Event::AwaitingInput) => {
                panic!("expected a runtime error")
            }
            Ok(Event::Running) => {}
            Err(error) => return error,
        }
    }
    panic!("runtime never failed")
}

pub fn snapshot(runtime: &Runtime) -> Vec<String> {
    runtime.screen().lock().unwrap().snapshot()
}

/// Parse + run in one go.
pub fn run(source: &str) -> Vec<String> {
    exec(&mut runtime(source))
}
