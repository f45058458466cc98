//! Styling for history lines: token colouring and wrapping to the list width.

use calcipro::calc_engine::{tokenize, Constant, Function, TokenKind};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

const LABELS: [&str; 2] = ["Solve: ", "Graph: "];

/// Splits a history input into its `Solve: ` / `Graph: ` label and what the
/// user typed. Plain calculations have an empty label.
pub fn split_label(input: &str) -> (&str, &str) {
    LABELS
        .iter()
        .find_map(|label| {
            input
                .strip_prefix(label)
                .map(|typed| (&input[..label.len()], typed))
        })
        .unwrap_or(("", input))
}

fn token_style(kind: &TokenKind, variable: char, base: Style) -> Style {
    match kind {
        TokenKind::Number(_) => Style::default().fg(Color::LightGreen),
        TokenKind::Op(_) | TokenKind::Equals => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        TokenKind::Ident(name) if Function::from_name(name).is_some() => Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
        TokenKind::Ident(name) if Constant::from_name(name).is_some() => {
            Style::default().fg(Color::LightMagenta)
        }
        TokenKind::Ident(name) if name.len() == 1 && name.starts_with(variable) => Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD),
        _ => base,
    }
}

/// Colours `text` by what the engine's tokenizer makes of it, with `variable`
/// picked out. Input that does not tokenize is shown in `base`.
pub fn highlight(text: &str, variable: char, base: Style) -> Vec<Span<'static>> {
    let tokens = match tokenize(text) {
        Ok(tokens) => tokens,
        Err(_) => return vec![Span::styled(text.to_string(), base)],
    };

    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut cursor = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.pos > cursor {
            spans.push(Span::styled(chars[cursor..token.pos].iter().collect::<String>(), base));
            cursor = token.pos;
        }
        let end = tokens.get(i + 1).map_or(chars.len(), |next| next.pos);
        // `²` yields two tokens from one column.
        if end <= cursor {
            continue;
        }

        let segment: String = chars[cursor..end].iter().collect();
        let word = segment.trim_end();
        spans.push(Span::styled(word.to_string(), token_style(&token.kind, variable, base)));
        if word.len() < segment.len() {
            spans.push(Span::styled(segment[word.len()..].to_string(), base));
        }
        cursor = end;
    }

    if cursor < chars.len() {
        spans.push(Span::styled(chars[cursor..].iter().collect::<String>(), base));
    }
    spans
}

/// Breaks styled text into rows no wider than `width` terminal columns,
/// keeping each piece's style.
pub fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![Line::from(spans)];
    }

    let mut rows = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut row_width = 0;

    for span in spans {
        let mut piece = String::new();
        for c in span.content.chars() {
            let char_width = c.width().unwrap_or(0);
            if row_width > 0 && row_width + char_width > width {
                if !piece.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut piece), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut row)));
                row_width = 0;
            }
            piece.push(c);
            row_width += char_width;
        }
        if !piece.is_empty() {
            row.push(Span::styled(piece, span.style));
        }
    }

    if !row.is_empty() || rows.is_empty() {
        rows.push(Line::from(row));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn style_of<'a>(spans: &'a [Span], content: &str) -> &'a Style {
        &spans
            .iter()
            .find(|s| s.content == content)
            .unwrap()
            .style
    }

    #[test]
    fn test_split_label() {
        assert_eq!(split_label("Solve: 2x = 4"), ("Solve: ", "2x = 4"));
        assert_eq!(split_label("Graph: sin(x)"), ("Graph: ", "sin(x)"));
        assert_eq!(split_label("1 + 1"), ("", "1 + 1"));
    }

    #[test]
    fn test_highlight_by_token_class() {
        let base = Style::default().fg(Color::Cyan);
        let spans = highlight("sin(t) + 2pi = t²", 't', base);
        assert_eq!(text(&spans), "sin(t) + 2pi = t²");
        assert_eq!(style_of(&spans, "sin").fg, Some(Color::LightBlue));
        assert_eq!(style_of(&spans, "t").fg, Some(Color::LightYellow));
        assert_eq!(style_of(&spans, "pi").fg, Some(Color::LightMagenta));
        assert_eq!(style_of(&spans, "=").fg, Some(Color::Yellow));
        assert_eq!(style_of(&spans, "2").fg, Some(Color::LightGreen));
        assert_eq!(style_of(&spans, "(").fg, Some(Color::Cyan));
    }

    #[test]
    fn test_highlight_other_letters_use_base() {
        let base = Style::default().fg(Color::Cyan);
        let spans = highlight("x + y", 'x', base);
        assert_eq!(style_of(&spans, "y").fg, Some(Color::Cyan));
    }

    #[test]
    fn test_highlight_untokenizable_input() {
        let base = Style::default().fg(Color::Cyan);
        let spans = highlight("2 $ 3", 'x', base);
        assert_eq!(spans.len(), 1);
        assert_eq!(text(&spans), "2 $ 3");
    }

    #[test]
    fn test_wrap_spans_keeps_styles() {
        let green = Style::default().fg(Color::Green);
        let spans = vec![Span::raw("abcd"), Span::styled("efg", green)];
        let rows = wrap_spans(spans, 3);
        let texts: Vec<String> = rows.iter().map(|row| text(&row.spans)).collect();
        assert_eq!(texts, vec!["abc", "def", "g"]);
        assert_eq!(rows[1].spans[1].style, green);
    }

    #[test]
    fn test_wrap_spans_wide_characters() {
        let rows = wrap_spans(vec![Span::raw("中文")], 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(wrap_spans(Vec::new(), 5).len(), 1);
    }
}
