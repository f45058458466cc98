use super::app::App;
use anyhow::Result;
use calcipro::calc_engine::{format_number, PLOT_VARIABLE};
use calcipro::session::Tab;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;
use super::helpers::{highlight, split_label, wrap_spans};
use crate::render_help::render_help;

const MIN_TERMINAL_WIDTH: u16 = 50;
const MIN_TERMINAL_HEIGHT: u16 = 14;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            if app.show_help {
                render_help(f, app);
            } else {
                ui(f, app);
            }
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind == KeyEventKind::Press => {
                    handle_key_event(app, code, modifiers);
                }
                Event::Mouse(event) => {
                    handle_mouse_event(app, event);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.show_help {
        match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            _ => {}
        }
        return;
    }

    if app.tab == Tab::Graph && handle_graph_key(app, code) {
        return;
    }

    match code {
        KeyCode::Char('u') | KeyCode::Char('U') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_input();
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => app.insert_char(c),
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left if modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_cursor_by_words(-1);
        }
        KeyCode::Right if modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_cursor_by_words(1);
        }
        KeyCode::Left => app.move_cursor(-1),
        KeyCode::Right => app.move_cursor(1),
        KeyCode::Home => {
            app.cursor_position = 0;
            app.input_scroll = 0;
        }
        KeyCode::End => {
            app.cursor_position = app.input.chars().count();
        }
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::PageUp => app.scroll_history(-1),
        KeyCode::PageDown => app.scroll_history(1),
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => app.next_tab(),
        KeyCode::F(1) => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        KeyCode::F(2) => app.toggle_angle_mode(),
        KeyCode::Esc => app.show_help = false,
        _ => {}
    }
}

/// Viewport keys. Returns `true` when the key was consumed.
fn handle_graph_key(app: &mut App, code: KeyCode) -> bool {
    let viewport = &mut app.session.viewport;
    match code {
        KeyCode::F(5) => viewport.zoom_in(),
        KeyCode::F(6) => viewport.zoom_out(),
        KeyCode::F(7) => viewport.widen_x(),
        KeyCode::F(8) => viewport.narrow_x(),
        KeyCode::F(9) => viewport.reset(),
        _ => return false,
    }
    true
}

fn handle_mouse_event(app: &mut App, event: crossterm::event::MouseEvent) {
    if app.show_help {
        match event.kind {
            MouseEventKind::ScrollDown => app.help_scroll = app.help_scroll.saturating_add(3),
            MouseEventKind::ScrollUp => app.help_scroll = app.help_scroll.saturating_sub(3),
            _ => {}
        }
    } else {
        match event.kind {
            MouseEventKind::ScrollDown => {
                app.history_scroll = app.history_scroll.saturating_add(3);
            }
            MouseEventKind::ScrollUp => {
                app.history_scroll = app.history_scroll.saturating_sub(3);
            }
            _ => {}
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH ||
                             terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        render_resize_message(frame, terminal_size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(terminal_size);

    render_tabs(frame, app, layout[0]);
    render_input(frame, app, layout[1]);
    render_status(frame, app, layout[2]);

    let history_area = if app.tab == Tab::Graph {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(layout[3]);
        render_graph(frame, app, columns[0]);
        columns[1]
    } else {
        layout[3]
    };

    render_history(frame, app, history_area);
    app.list_height = history_area.height as usize;
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| Line::from(format!(" {} ", tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider("|");

    frame.render_widget(tabs, area);
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH,
        MIN_TERMINAL_HEIGHT,
        area.width,
        area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow)
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn axis_labels(range: (f64, f64)) -> Vec<Span<'static>> {
    let mid = (range.0 + range.1) / 2.0;
    [range.0, mid, range.1]
        .iter()
        .map(|v| Span::styled(format_number(*v), Style::default().fg(Color::DarkGray)))
        .collect()
}

fn render_graph(frame: &mut Frame, app: &App, area: Rect) {
    let viewport = app.session.viewport;
    let title = match &app.session.plot {
        Some(plot) => format!(" y = {} ", plot.label),
        None => " Graph ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_alignment(Alignment::Center);

    let points: Vec<(f64, f64)> = app
        .session
        .plot_points()
        .into_iter()
        .map(|p| (p.x, p.y))
        .collect();

    if points.is_empty() {
        let message = if app.session.plot.is_some() {
            calcipro::session::EMPTY_PLOT_MESSAGE
        } else {
            "Enter a function of x to plot it here."
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::LightBlue))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("x")
                .style(Style::default().fg(Color::Gray))
                .bounds([viewport.x_range.0, viewport.x_range.1])
                .labels(axis_labels(viewport.x_range)),
        )
        .y_axis(
            Axis::default()
                .title("y")
                .style(Style::default().fg(Color::Gray))
                .bounds([viewport.y_range.0, viewport.y_range.1])
                .labels(axis_labels(viewport.y_range)),
        );

    frame.render_widget(chart, area);
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" History ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let entries = app.session.history.entries();
    if entries.is_empty() {
        let empty_msg = Paragraph::new("No calculations yet. Enter an expression to see results here.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    let mut item_start_indices = Vec::with_capacity(entries.len());

    // Room left after the "HH:MM:SS > " prefix.
    let wrap_width = inner_area.width.saturating_sub(11) as usize;

    for (i, entry) in entries.iter().enumerate() {
        item_start_indices.push(items.len());

        let is_selected = i == app.cursor_history;
        let base_style = Style::default()
            .fg(if is_selected { Color::Yellow } else { Color::Cyan });

        let (label, typed) = split_label(&entry.input);
        let variable = if label.starts_with("Graph") {
            PLOT_VARIABLE
        } else {
            app.session.variable
        };
        let mut input_spans = Vec::new();
        if !label.is_empty() {
            input_spans.push(Span::styled(label.to_string(), Style::default().fg(Color::Gray)));
        }
        input_spans.extend(highlight(typed, variable, base_style));

        for (line_idx, row) in wrap_spans(input_spans, wrap_width).into_iter().enumerate() {
            let mut spans = if line_idx == 0 {
                vec![
                    Span::styled(
                        format!("{} ", entry.time_label()),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled("> ", Style::default().fg(Color::Green)),
                ]
            } else {
                vec![Span::raw(" ".repeat(11))]
            };
            spans.extend(row.spans);
            items.push(ListItem::new(Line::from(spans)));
        }

        let result_line = match &entry.result {
            Ok(value) => Line::from(vec![
                Span::styled("    = ", Style::default().fg(Color::Gray)),
                Span::styled(
                    value.clone(),
                    Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
                ),
            ]),
            Err(e) => Line::from(vec![
                Span::styled("    = ", Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("Error: {}", e),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            ]),
        };
        items.push(ListItem::new(result_line));

        if i < entries.len() - 1 {
            let separator = Span::styled(
                "-".repeat(inner_area.width as usize),
                Style::default().fg(Color::DarkGray)
            );
            items.push(ListItem::new(Line::from(separator)));
        }
    }

    if app.scroll_to_bottom {
        app.history_scroll = items.len().saturating_sub(inner_area.height as usize);
        app.scroll_to_bottom = false;
    }

    let selected_index = item_start_indices.get(app.cursor_history).copied();
    app.item_start_indices = item_start_indices;

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default()
        .with_selected(selected_index)
        .with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut keys = vec![
        ("Enter", "Calculate"),
        ("Tab", "Switch"),
        ("F1", "Help"),
        ("F2", app.session.angle_mode.label()),
    ];
    if app.tab == Tab::Graph {
        keys.push(("F5/F6", "Zoom"));
        keys.push(("F7/F8", "X range"));
        keys.push(("F9", "Reset"));
    }

    let mut spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect();

    if app.tab == Tab::Equation {
        spans.push(Span::styled(
            format!("var {} ", app.session.variable),
            Style::default().fg(Color::LightGreen),
        ));
    }
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            format!("| {}", notice),
            Style::default().fg(Color::LightMagenta),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = match app.tab {
        Tab::Calculator => " Expression ".to_string(),
        Tab::Equation => format!(" Equation in {} ", app.session.variable),
        Tab::Graph => " y = f(x) ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let visible_width = (inner_area.width.saturating_sub(2)) as usize;
    let total_chars = app.input.chars().count();
    app.adjust_input_scroll(visible_width);

    let visible_input: String = app.input
        .chars()
        .skip(app.input_scroll)
        .take(visible_width)
        .collect();

    let input_line = format!("> {}", visible_input);
    let paragraph = Paragraph::new(input_line);
    frame.render_widget(paragraph, inner_area);

    let visible_cursor = app.cursor_position.saturating_sub(app.input_scroll);
    let visible_prefix = visible_input.chars().take(visible_cursor).collect::<String>();
    let cursor_x = inner_area.x + 2 + visible_prefix.width() as u16;
    let cursor_y = inner_area.y;
    frame.set_cursor(cursor_x, cursor_y);

    let scroll_indicator_style = Style::default().fg(Color::DarkGray);

    if app.input_scroll > 0 {
        let left_indicator = Paragraph::new("<").style(scroll_indicator_style);
        frame.render_widget(left_indicator, Rect::new(inner_area.x, inner_area.y, 1, 1));
    }

    if total_chars > app.input_scroll + visible_width {
        let right_indicator = Paragraph::new(">").style(scroll_indicator_style);
        frame.render_widget(
            right_indicator,
            Rect::new(inner_area.x + inner_area.width - 1, inner_area.y, 1, 1),
        );
    }
}

