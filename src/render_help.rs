use crate::tui_mode::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
    ))
}

fn help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("CalciPro - Calculator, Equation Solver and Grapher", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        heading("Operators:"),
        Line::from("  + - * /  : Arithmetic     (e.g., 6 * 7 = 42)"),
        Line::from("  ^        : Power          (e.g., 2 ^ 3 ^ 2 = 512)"),
        Line::from("  %        : Percent        (e.g., 200 * 10% = 20)"),
        Line::from("  A leading minus applies before ^: -3^2 = 9 and -x^2 is (-x)^2."),
        Line::from("  Write -(3^2) or -(x^2) for a negative square."),
        Line::from("  ( )      : Grouping       (e.g., 2(3 + 1) = 8)"),
        Line::from("  Numbers next to names or brackets multiply: 2pi, 3x, (x+1)(x-1)"),
        Line::from(""),
        heading("Functions:"),
        Line::from("  sin cos tan    : Trigonometry (angle mode applies)"),
        Line::from("  asin acos atan : Inverse trigonometry"),
        Line::from("  log(x)   : Base-10 logarithm"),
        Line::from("  ln(x)    : Natural logarithm"),
        Line::from("  sqrt(x)  : Square root"),
        Line::from("  abs(x)   : Absolute value"),
        Line::from(""),
        heading("Constants:"),
        Line::from("  pi or π : 3.14159265..."),
        Line::from("  e       : Euler's number (2.71828182...)"),
        Line::from(""),
        heading("Tabs:"),
        Line::from("  Calculator : Evaluate an expression"),
        Line::from("  Equation   : Solve a linear or quadratic equation, e.g. x^2 - 5x + 6 = 0"),
        Line::from("  Graph      : Plot y = f(x), e.g. sin(x) or 1/x"),
        Line::from(""),
        heading("Commands:"),
        Line::from("  deg / rad : Set the angle mode (F2 toggles)"),
        Line::from("  var <v>   : Solve equations for another variable"),
        Line::from("  clear     : Clear calculation history"),
        Line::from("  help      : Show this help screen"),
        Line::from("  quit      : Exit"),
        Line::from(""),
        heading("Navigation:"),
        Line::from("  Tab : Next tab"),
        Line::from("  ← → : Move cursor left/right"),
        Line::from("  Ctrl+←/→ : Move cursor by words"),
        Line::from("  Home/End : Move to start/end of line"),
        Line::from("  ↑ ↓ : Recall earlier input"),
        Line::from("  PgUp/PgDn : Page through history"),
        Line::from("  Ctrl+U : Clear current input"),
        Line::from(""),
        heading("Graph keys:"),
        Line::from("  F5 / F6 : Zoom in / out"),
        Line::from("  F7 / F8 : Widen / narrow the x range"),
        Line::from("  F9      : Reset to [-10, 10] x [-10, 10]"),
    ]
}

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" CalciPro Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let help_text = help_lines();

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_explains_minus_before_power() {
        let text: Vec<String> = help_lines()
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|line| line.contains("-(x^2)")));
        assert!(text.iter().any(|line| line.contains("200 * 10% = 20")));
    }
}
