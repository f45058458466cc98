use anyhow::Result;
use calcipro::calc_engine::{validate_variable, AngleMode};
use calcipro::plot::render_ascii;
use calcipro::session::{Response, Session, Tab};
use std::io::{stdin, stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::{DetectCursorPos, Goto},
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
};
use tracing::info;

const PLOT_WIDTH: usize = 61;
const PLOT_HEIGHT: usize = 21;

const BANNER: [&str; 6] = [
    "CalciPro line mode",
    "Supports: + - * / ^ %, functions (sin, cos, tan, asin, acos, atan, log, ln, sqrt, abs)",
    "Note: -3^2 is (-3)^2 = 9; write -(x^2) for a negative square",
    "Constants: pi, e",
    "Commands: solve <equation> [for <v>], plot <f(x)>, deg, rad, history, clear, quit",
    "Navigation: ←/→, Backspace/Delete, Home/End, ↑/↓ for history",
];

// Функция для преобразования позиции символа в байтовую позицию
fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or_else(|| s.len())
}

/// What the REPL should do after a line.
#[derive(Debug, PartialEq)]
enum Reply {
    Quit,
    Print(Vec<String>),
}

fn last_entry_lines(session: &Session) -> Vec<String> {
    match session.history.last() {
        Some(entry) => match &entry.result {
            Ok(value) => vec![format!("  {} = {}", entry.input, value)],
            Err(e) => vec![format!("  {} = Error: {}", entry.input, e)],
        },
        None => Vec::new(),
    }
}

fn respond(session: &mut Session, input: &str) -> Reply {
    let lowered = input.to_lowercase();
    match lowered.as_str() {
        "quit" | "exit" | "q" => return Reply::Quit,
        "history" => {
            let lines = session
                .history
                .entries()
                .iter()
                .map(|entry| {
                    let result = match &entry.result {
                        Ok(value) => value.clone(),
                        Err(e) => format!("Error: {}", e),
                    };
                    format!("  [{}] {} = {}", entry.time_label(), entry.input, result)
                })
                .collect();
            return Reply::Print(lines);
        }
        _ => {}
    }

    if lowered.starts_with("solve ") {
        let body = input.get(6..).unwrap_or_default();
        let (equation, variable) = match body.rsplit_once(" for ") {
            Some((equation, name)) => match validate_variable(name.trim()) {
                Ok(variable) => (equation, variable),
                Err(e) => return Reply::Print(vec![format!("  Error: {}", e)]),
            },
            None => (body, session.variable),
        };
        let entry = session.solve(equation.trim(), variable);
        session.history.push(entry);
        return Reply::Print(last_entry_lines(session));
    }

    if lowered.starts_with("plot ") {
        let function = input.get(5..).unwrap_or_default();
        session.submit(Tab::Graph, function);
        let mut lines = last_entry_lines(session);
        let points = session.plot_points();
        if !points.is_empty() {
            lines.extend(render_ascii(&points, &session.viewport, PLOT_WIDTH, PLOT_HEIGHT));
        }
        return Reply::Print(lines);
    }

    match session.submit(Tab::Calculator, input) {
        Response::Ignored => Reply::Print(Vec::new()),
        Response::Notice(message) => Reply::Print(vec![format!("  {}", message)]),
        Response::Recorded => Reply::Print(last_entry_lines(session)),
    }
}

pub fn run_line(angle_mode: AngleMode) -> Result<()> {
    for line in BANNER {
        println!("{}", line);
    }
    println!();

    let mut stdout = stdout().into_raw_mode()?;
    let mut session = Session::new(angle_mode);
    let mut recall: Vec<String> = Vec::new();
    let mut recall_index = 0;
    info!(angle_mode = angle_mode.label(), "starting line mode");

    loop {
        write!(stdout, "{}{} > ", ClearLine, session.angle_mode.label())?;
        stdout.flush()?;

        let mut expression = String::new();
        let mut cursor_pos = 0;  // позиция курсора в символах
        let (_, initial_y) = stdout.cursor_pos()?;
        let prompt_width = 6;

        let stdin = stdin();
        let mut keys = stdin.keys();

        loop {
            write!(
                stdout,
                "{}{}{} > {}",
                Goto(1, initial_y),
                ClearLine,
                session.angle_mode.label(),
                expression
            )?;

            let byte_pos = char_index_to_byte_index(&expression, cursor_pos);
            let column = expression[..byte_pos].chars().count() + prompt_width + 1;
            write!(stdout, "{}", Goto(column as u16, initial_y))?;
            stdout.flush()?;

            let key = match keys.next() {
                Some(key) => key?,
                None => return Ok(()),
            };

            match key {
                Key::Char('\n') => break,
                Key::Ctrl('c') | Key::Ctrl('d') => {
                    write!(stdout, "\r\n")?;
                    return Ok(());
                }
                Key::Char(c) => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    expression.insert(byte_idx, c);
                    cursor_pos += 1;
                }
                Key::Backspace if cursor_pos > 0 => {
                    cursor_pos -= 1;
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    if let Some(c) = expression[byte_idx..].chars().next() {
                        expression.drain(byte_idx..byte_idx + c.len_utf8());
                    }
                }
                Key::Delete if cursor_pos < expression.chars().count() => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    if let Some(c) = expression[byte_idx..].chars().next() {
                        expression.drain(byte_idx..byte_idx + c.len_utf8());
                    }
                }
                Key::Left if cursor_pos > 0 => cursor_pos -= 1,
                Key::Right if cursor_pos < expression.chars().count() => cursor_pos += 1,
                Key::Home => cursor_pos = 0,
                Key::End => cursor_pos = expression.chars().count(),
                Key::Up => {
                    if recall_index > 0 {
                        recall_index -= 1;
                        expression = recall[recall_index].clone();
                        cursor_pos = expression.chars().count();
                    }
                }
                Key::Down => {
                    if recall_index < recall.len().saturating_sub(1) {
                        recall_index += 1;
                        expression = recall[recall_index].clone();
                        cursor_pos = expression.chars().count();
                    } else {
                        recall_index = recall.len();
                        expression.clear();
                        cursor_pos = 0;
                    }
                }
                _ => {}
            }
        }

        let input = expression.trim();
        if input.is_empty() {
            write!(stdout, "\r\n")?;
            continue;
        }

        recall.push(input.to_string());
        recall_index = recall.len();

        match respond(&mut session, input) {
            Reply::Quit => {
                write!(stdout, "\r\nGoodbye!\r\n")?;
                return Ok(());
            }
            Reply::Print(lines) => {
                write!(stdout, "\r\n")?;
                for line in lines {
                    write!(stdout, "{}\r\n", line)?;
                }
                write!(stdout, "\r\n")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print(session: &mut Session, input: &str) -> Vec<String> {
        match respond(session, input) {
            Reply::Print(lines) => lines,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_expression() {
        let mut session = Session::default();
        assert_eq!(print(&mut session, "1 + 1"), vec!["  1 + 1 = 2"]);
    }

    #[test]
    fn test_solve_with_variable() {
        let mut session = Session::default();
        assert_eq!(
            print(&mut session, "solve 2y + 1 = 5 for y"),
            vec!["  Solve: 2y + 1 = 5 = y = 2"]
        );
        assert_eq!(
            print(&mut session, "solve x = 1 for xy"),
            vec!["  Error: 'xy' is not a valid variable name"]
        );
    }

    #[test]
    fn test_plot_prints_grid() {
        let mut session = Session::default();
        let lines = print(&mut session, "plot x");
        assert_eq!(lines[0], "  Graph: x = Displayed");
        assert_eq!(lines.len(), 1 + PLOT_HEIGHT);
    }

    #[test]
    fn test_banner_matches_minus_precedence() {
        let mut session = Session::default();
        assert!(BANNER.iter().any(|line| line.contains("-(x^2)")));
        assert_eq!(print(&mut session, "-3^2"), vec!["  -3^2 = 9"]);
        assert_eq!(print(&mut session, "-(3^2)"), vec!["  -(3^2) = -9"]);
        assert_eq!(print(&mut session, "200 * 10%"), vec!["  200 * 10% = 20"]);
    }

    #[test]
    fn test_quit_and_history() {
        let mut session = Session::default();
        print(&mut session, "2 * 3");
        let lines = print(&mut session, "history");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("2 * 3 = 6"));
        assert_eq!(respond(&mut session, "quit"), Reply::Quit);
    }
}
