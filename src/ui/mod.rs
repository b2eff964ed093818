use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
};

use crate::app::{App, Screen};
use crate::market_data::types::{Category, Item, MarketSnapshot};
use crate::state::view::{comparison_bars, filter_items};

pub fn draw(f: &mut Frame, app: &App) {
    match &app.screen {
        Screen::Loading => draw_loading(f),
        Screen::Error(message) => draw_error(f, message),
        Screen::Ready => match app.snapshot.as_ref() {
            Some(snapshot) => draw_dashboard(f, app, snapshot),
            None => draw_loading(f),
        },
    }
}

fn draw_loading(f: &mut Frame) {
    let area = centered_rect(40, 20, f.area());
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from("Loading market data...").centered(),
        Line::from(""),
        Line::from("q to quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
    ])
    .block(Block::default().borders(Borders::ALL).title(" bazarwatch "));
    f.render_widget(text, area);
}

fn draw_error(f: &mut Frame, message: &str) {
    let area = centered_rect(50, 25, f.area());
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Failed to load market data",
            Style::default().fg(Color::Red).bold(),
        ))
        .centered(),
        Line::from(message.to_string()).centered(),
        Line::from(""),
        Line::from("r to retry, q to quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" bazarwatch "),
    );
    f.render_widget(text, area);
}

fn draw_dashboard(f: &mut Frame, app: &App, snapshot: &MarketSnapshot) {
    let items = filter_items(snapshot, app.view.category, &app.view.search);

    let chart_height = if app.view.chart_visible() { 12 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(chart_height),
            Constraint::Length(2),
        ])
        .split(f.area());

    draw_filter_bar(f, app, chunks[0]);
    draw_items(f, app, &items, chunks[1]);
    if app.view.chart_visible() {
        draw_comparison_chart(f, app, chunks[2]);
    }
    draw_footer(f, app, chunks[3]);

    if let Some(item) = &app.view.detail {
        draw_detail(f, item);
    }
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let bar = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(34)])
        .split(area);

    let titles: Vec<Line> = Category::ALL.iter().map(|c| Line::from(c.label())).collect();
    let tabs = Tabs::new(titles)
        .select(app.view.category.index())
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .block(Block::default().borders(Borders::ALL).title(" Category "));
    f.render_widget(tabs, bar[0]);

    let (search_text, search_style) = if app.view.search_active {
        (
            format!("{}█", app.view.search),
            Style::default().fg(Color::Yellow),
        )
    } else if app.view.search.is_empty() {
        ("/ to search".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (app.view.search.clone(), Style::default())
    };
    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title(" Search "));
    f.render_widget(search, bar[1]);
}

fn draw_items(f: &mut Frame, app: &App, items: &[&Item], area: Rect) {
    if items.is_empty() {
        let empty = Paragraph::new("No matches.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Prices "));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = items
        .iter()
        .map(|item| {
            let marker = if app.view.is_comparing(&item.symbol) {
                Cell::from("✓").style(Style::default().fg(Color::Cyan))
            } else {
                Cell::from(" ")
            };

            let change = item.change_value().unwrap_or(0.0);
            let change_cell = if change >= 0.0 {
                Cell::from(format!("↑ +{:.2}%", change.abs()))
                    .style(Style::default().fg(Color::Green))
            } else {
                Cell::from(format!("↓ {:.2}%", change.abs()))
                    .style(Style::default().fg(Color::Red))
            };

            Row::new(vec![
                marker,
                Cell::from(item.name.clone()),
                Cell::from(format!("{} {}", item.price, item.unit)),
                change_cell,
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Percentage(40),
            Constraint::Min(20),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["", "Name", "Price", "Change"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().bg(Color::Indexed(236)).fg(Color::Yellow))
    .highlight_symbol("» ")
    .block(Block::default().borders(Borders::ALL).title(format!(
        " Prices — {} ({}) ",
        app.view.category.label(),
        items.len()
    )));

    let mut table_state = TableState::default();
    table_state.select(Some(app.view.cursor.min(items.len() - 1)));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_comparison_chart(f: &mut Frame, app: &App, area: Rect) {
    let bars = comparison_bars(&app.view.compare);
    let data: Vec<(&str, u64)> = bars.iter().map(|(label, v)| (label.as_str(), *v)).collect();

    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / data.len().max(1))
        .saturating_sub(1)
        .clamp(3, 16) as u16;

    let chart = BarChart::default()
        .data(&data)
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Indexed(62)))
        .value_style(Style::default().fg(Color::White).bold())
        .label_style(Style::default().fg(Color::Gray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Price comparison "),
        );
    f.render_widget(chart, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let hints = Paragraph::new(
        "q quit · tab/1-4 category · / search · ↑↓ move · enter details · space compare",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hints, lines[0]);

    let mut status: Vec<Span> = vec![Span::styled(
        "Source: brsapi.ir",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some((date, time)) = app.snapshot.as_ref().and_then(|s| s.last_updated()) {
        status.push(Span::styled(
            format!(" · Last update: {date} {time}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.stale_error.is_some() {
        status.push(Span::styled(
            " · STALE: last refresh failed",
            Style::default().fg(Color::Yellow).bold(),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(status)), lines[1]);
}

fn draw_detail(f: &mut Frame, item: &Item) {
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);

    let change = item.change_value().unwrap_or(0.0);
    let change_style = if change >= 0.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let arrow = if change >= 0.0 { "↑ +" } else { "↓ " };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", item.name),
            Style::default().bold(),
        )),
        Line::from(format!("  {}", item.symbol)).style(Style::default().fg(Color::DarkGray)),
        Line::from(""),
        Line::from(format!("  {} {}", item.price, item.unit)),
        Line::from(Span::styled(
            format!("  {arrow}{:.2}%", change.abs()),
            change_style,
        )),
        Line::from(""),
        Line::from(format!("  {} - {}", item.date, item.time))
            .style(Style::default().fg(Color::DarkGray)),
    ];
    if let Some(description) = &item.description {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("  {description}")));
    }
    lines.push(Line::from(""));
    lines.push(
        Line::from("  Esc or Enter to close").style(Style::default().fg(Color::DarkGray)),
    );

    let detail = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Details "),
    );
    f.render_widget(detail, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
