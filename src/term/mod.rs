/*!
## Terminal module

Raw-mode, alternate-screen frontend: renders the 40×25 grid with
ratatui, routes keys to the waiting INPUT line, and throttles the
stepper so the screen stays watchable.

*/

use crate::lang::Error;
use crate::mach::{Event, Runtime, Screen, COLUMNS, ROWS};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a session ended.
pub enum Outcome {
    Finished,
    Quit,
    Failed(Error),
}

pub fn run(runtime: &mut Runtime) -> io::Result<Outcome> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let outcome = drive(&mut terminal, runtime);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome
}

fn drive(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &mut Runtime,
) -> io::Result<Outcome> {
    let screen = runtime.screen();
    loop {
        draw_all(terminal, &screen, "RUNNING - ESC QUITS")?;
        if runtime.awaiting_input() {
            match read_key()? {
                Some(KeyCode::Char(c)) => screen.lock().unwrap().type_char(c),
                Some(KeyCode::Backspace) => screen.lock().unwrap().type_backspace(),
                Some(KeyCode::Enter) => {
                    let line = screen.lock().unwrap().take_input();
                    if let Err(error) = runtime.provide_input(&line) {
                        return fail(terminal, &screen, error);
                    }
                }
                Some(KeyCode::Esc) => return Ok(Outcome::Quit),
                _ => {}
            }
            continue;
        }
        if event::poll(Duration::from_millis(0))? {
            if read_key()? == Some(KeyCode::Esc) {
                return Ok(Outcome::Quit);
            }
        }
        match runtime.step() {
            Ok(Event::Running) => std::thread::sleep(Duration::from_micros(100)),
            Ok(Event::AwaitingInput) => {}
            Ok(Event::Stopped) => {
                draw_all(terminal, &screen, "READY - PRESS ANY KEY")?;
                wait_key()?;
                return Ok(Outcome::Finished);
            }
            Err(error) => return fail(terminal, &screen, error),
        }
    }
}

fn fail(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &Arc<Mutex<Screen>>,
    error: Error,
) -> io::Result<Outcome> {
    let status = format!("?{}", error);
    draw_all(terminal, screen, &status)?;
    wait_key()?;
    Ok(Outcome::Failed(error))
}

fn draw_all(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &Arc<Mutex<Screen>>,
    status: &str,
) -> io::Result<()> {
    terminal.draw(|frame| {
        let screen = screen.lock().unwrap();
        draw(frame, &screen, status);
    })?;
    Ok(())
}

/// Next key press, or None for events the loop should just redraw
/// after (resize, release).
fn read_key() -> io::Result<Option<KeyCode>> {
    match event::read()? {
        TermEvent::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(key.code)),
        _ => Ok(None),
    }
}

fn wait_key() -> io::Result<()> {
    loop {
        if read_key()?.is_some() {
            return Ok(());
        }
    }
}

fn draw(frame: &mut Frame, screen: &Screen, status: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(ROWS as u16 + 2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(frame.area());
    let grid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(COLUMNS as u16 + 2), Constraint::Min(0)])
        .split(rows[0]);

    let style = Style::default()
        .fg(color(screen.text))
        .bg(color(screen.background));
    let lines: Vec<Line> = screen
        .rows()
        .iter()
        .map(|row| {
            let mut spans: Vec<Span> = vec![];
            let mut run = String::new();
            let mut reverse = false;
            for cell in row {
                if cell.reverse != reverse && !run.is_empty() {
                    spans.push(span(std::mem::take(&mut run), reverse, style));
                }
                reverse = cell.reverse;
                run.push(cell.glyph);
            }
            spans.push(span(run, reverse, style));
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color(screen.border)))
            .style(Style::default().bg(color(screen.background))),
    );
    frame.render_widget(paragraph, grid[0]);
    frame.render_widget(Paragraph::new(status.to_string()), rows[1]);
}

fn span(text: String, reverse: bool, style: Style) -> Span<'static> {
    if reverse {
        Span::styled(text, style.add_modifier(Modifier::REVERSED))
    } else {
        Span::styled(text, style)
    }
}

/// The VIC-II palette.
fn color(code: u8) -> Color {
    match code & 0x0F {
        0 => Color::Rgb(0x00, 0x00, 0x00),
        1 => Color::Rgb(0xFF, 0xFF, 0xFF),
        2 => Color::Rgb(0x88, 0x00, 0x00),
        3 => Color::Rgb(0xAA, 0xFF, 0xEE),
        4 => Color::Rgb(0xCC, 0x44, 0xCC),
        5 => Color::Rgb(0x00, 0xCC, 0x55),
        6 => Color::Rgb(0x00, 0x00, 0xAA),
        7 => Color::Rgb(0xEE, 0xEE, 0x77),
        8 => Color::Rgb(0xDD, 0x88, 0x55),
        9 => Color::Rgb(0x66, 0x44, 0x00),
        10 => Color::Rgb(0xFF, 0x77, 0x77),
        11 => Color::Rgb(0x33, 0x33, 0x33),
        12 => Color::Rgb(0x77, 0x77, 0x77),
        13 => Color::Rgb(0xAA, 0xFF, 0x66),
        14 => Color::Rgb(0x00, 0x88, 0xFF),
        _ => Color::Rgb(0xBB, 0xBB, 0xBB),
    }
}
