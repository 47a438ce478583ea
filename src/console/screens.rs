use super::navigation::{clamp_selection, ConsoleScreen, ALL_CONSOLE_SCREENS};
use super::state::ConsoleState;
use crate::model::{format_run_at, GeneratedReport};
use crate::report::DesignerField;
use crate::wizard::{InputKind, WizardView};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, Padding, Paragraph, Row, Sparkline, Table, Tabs,
    Wrap,
};
use ratatui::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignerRow {
    pub label: &'static str,
    pub value: String,
    pub focused: bool,
}

pub struct ConsoleViewModel {
    pub screen: ConsoleScreen,
    pub filter_line: Option<String>,
    pub items: Vec<String>,
    pub selected: usize,
    pub status_text: String,
    pub hint_text: String,
    pub designer: Vec<DesignerRow>,
    pub chart: Vec<u64>,
    pub wizard: Option<WizardView>,
    pub confirm: Option<String>,
}

pub fn project_console_view_model(state: &ConsoleState, now: i64) -> ConsoleViewModel {
    let screen = state.screen();
    let items = screen_items(state, screen, now);
    let selected = clamp_selection(state.nav().selected, items.len());
    let designer = if screen == ConsoleScreen::Reports {
        let focused = state.designer().focused_field();
        state
            .designer()
            .rows()
            .into_iter()
            .map(|(field, value)| DesignerRow {
                label: field.label(),
                value,
                focused: field == focused,
            })
            .collect()
    } else {
        Vec::new()
    };
    let chart = if screen == ConsoleScreen::Reports {
        state
            .catalog
            .reports
            .get_index(selected)
            .map(chart_values)
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    ConsoleViewModel {
        screen,
        filter_line: (screen == ConsoleScreen::Agents).then(|| match state.role_filter() {
            Some(role) => format!("Role filter: {role}"),
            None => "Role filter: all".to_string(),
        }),
        items,
        selected,
        status_text: state.nav().status_text.clone(),
        hint_text: state.nav().hint_text.clone(),
        designer,
        chart,
        wizard: state.wizard_view(now),
        confirm: state.pending_delete().map(|pending| pending.prompt()),
    }
}

/// One display line per record on `screen`.
pub fn screen_items(state: &ConsoleState, screen: ConsoleScreen, now: i64) -> Vec<String> {
    let catalog = &state.catalog;
    match screen {
        ConsoleScreen::Agents => state
            .visible_agents()
            .into_iter()
            .map(|agent| {
                format!(
                    "{:<22} {:<7} {:<20} {:<9} v{}",
                    agent.name,
                    agent.role.as_str(),
                    agent.host,
                    agent.status.as_str(),
                    agent.version
                )
            })
            .collect(),
        ConsoleScreen::Endpoints => catalog
            .endpoints
            .iter()
            .map(|endpoint| format!("{:<36} {}", endpoint.label(), endpoint.connection_url()))
            .collect(),
        ConsoleScreen::Pipelines => catalog
            .pipelines
            .iter()
            .map(|pipeline| {
                format!(
                    "{:<24} {} -> {}  [{}]",
                    pipeline.name,
                    pipeline.source.endpoint_id,
                    pipeline.target.endpoint_id,
                    pipeline.status.as_str()
                )
            })
            .collect(),
        ConsoleScreen::Tasks => catalog
            .tasks
            .iter()
            .map(|task| {
                let next = match task.schedule.next_run_at(now) {
                    Ok(Some(ts)) => format_run_at(ts),
                    Ok(None) => "-".to_string(),
                    Err(err) => err,
                };
                format!(
                    "{:<22} {:<16} {:<28} {}  next: {}",
                    task.name,
                    task.task_type.as_str(),
                    task.source.describe(),
                    task.schedule.describe(),
                    next
                )
            })
            .collect(),
        ConsoleScreen::Reports => catalog.reports.iter().map(report_line).collect(),
    }
}

fn report_line(report: &GeneratedReport) -> String {
    let summary = report.summary.as_ref().map_or_else(String::new, |summary| {
        format!(
            "  min {:.2} / mean {:.2} / max {:.2}",
            summary.min, summary.mean, summary.max
        )
    });
    format!(
        "{:<22} {} | {} | {}{}",
        report.title,
        report.kind.label(),
        report.range.label(),
        report.generated_at,
        summary
    )
}

fn chart_values(report: &GeneratedReport) -> Vec<u64> {
    report
        .points
        .iter()
        .map(|point| (point.value.max(0.0) * 100.0).round() as u64)
        .collect()
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn draw_console_ui(frame: &mut Frame<'_>, view_model: &ConsoleViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let titles: Vec<Line> = ALL_CONSOLE_SCREENS
        .iter()
        .map(|screen| Line::from(screen.title()))
        .collect();
    let selected_tab = ALL_CONSOLE_SCREENS
        .iter()
        .position(|screen| *screen == view_model.screen)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected_tab)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Replication Console "),
        );
    frame.render_widget(tabs, chunks[0]);

    if view_model.screen == ConsoleScreen::Reports {
        draw_reports(frame, chunks[1], view_model);
    } else {
        draw_record_list(frame, chunks[1], view_model);
    }

    let footer = Paragraph::new(vec![
        Line::from(view_model.hint_text.clone()),
        Line::from(format!("Status: {}", view_model.status_text)),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[2]);

    if let Some(wizard) = &view_model.wizard {
        draw_wizard(frame, wizard);
    }
    if let Some(prompt) = &view_model.confirm {
        draw_confirm(frame, prompt);
    }
}

fn draw_record_list(frame: &mut Frame<'_>, area: Rect, view_model: &ConsoleViewModel) {
    let mut items = Vec::with_capacity(view_model.items.len() + 1);
    if let Some(filter) = &view_model.filter_line {
        items.push(ListItem::new(Line::from(Span::styled(
            filter.clone(),
            Style::default().fg(Color::DarkGray),
        ))));
    }
    if view_model.items.is_empty() {
        items.push(ListItem::new(Line::from("(no records)")));
    }
    for (idx, line) in view_model.items.iter().enumerate() {
        let mut item = ListItem::new(Line::from(Span::raw(line.clone())));
        if idx == view_model.selected {
            item = item.style(selected_style());
        }
        items.push(item);
    }
    frame.render_widget(
        List::new(items).block(main_panel_block(view_model.screen.title())),
        area,
    );
}

fn draw_reports(frame: &mut Frame<'_>, area: Rect, view_model: &ConsoleViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(DesignerField::ALL.len() as u16 + 2),
            Constraint::Length(6),
            Constraint::Min(3),
        ])
        .split(area);

    let rows = view_model.designer.iter().map(|row| {
        let style = if row.focused {
            selected_style()
        } else {
            Style::default()
        };
        Row::new(vec![Cell::from(row.label), Cell::from(row.value.clone())]).style(style)
    });
    let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(10)])
        .column_spacing(2)
        .block(Block::default().borders(Borders::ALL).title(" Report designer "));
    frame.render_widget(table, chunks[0]);

    let chart = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(" Selected report "))
        .data(&view_model.chart)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(chart, chunks[1]);

    let items: Vec<ListItem> = if view_model.items.is_empty() {
        vec![ListItem::new(Line::from("(no reports generated yet)"))]
    } else {
        view_model
            .items
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                let item = ListItem::new(Line::from(line.clone()));
                if idx == view_model.selected {
                    item.style(Style::default().fg(Color::Yellow))
                } else {
                    item
                }
            })
            .collect()
    };
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Generated ")),
        chunks[2],
    );
}

fn wizard_lines(wizard: &WizardView) -> Vec<Line<'static>> {
    let steps = wizard
        .step_titles
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            let style = if idx + 1 == wizard.step {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!(" {}. {} ", idx + 1, title), style)
        })
        .collect::<Vec<_>>();
    let mut lines = vec![Line::from(steps), Line::from("")];

    for row in &wizard.rows {
        let marker = if row.required { "*" } else { " " };
        let mut value = row.value.clone();
        if row.kind == InputKind::Choice && !row.query.is_empty() {
            value = format!("{value}  (search: {})", row.query);
        }
        let style = if row.focused {
            selected_style()
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {:<18} {value}", row.label),
            style,
        )));
        if row.focused && row.kind == InputKind::Choice && !row.query.is_empty() {
            for label in row.matches.iter().take(5) {
                lines.push(Line::from(Span::styled(
                    format!("      {label}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    if !wizard.summary.is_empty() {
        lines.push(Line::from(""));
        lines.extend(wizard.summary.iter().map(|line| Line::from(line.clone())));
    }
    if let Some(operation) = &wizard.operation {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            operation.clone(),
            Style::default().fg(Color::Green),
        )));
    }
    if let Some(error) = &wizard.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
        "Up/Down field | Left/Right choose | Bksp clears optional | Enter next/deploy | Tab/BackTab step | Esc cancel",
    ));
    lines
}

fn draw_wizard(frame: &mut Frame<'_>, wizard: &WizardView) {
    let area = centered_rect(80, 80, frame.area());
    let title = format!(" {} ({}/{}) ", wizard.title, wizard.step, wizard.total);
    let body = Paragraph::new(wizard_lines(wizard))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding::new(2, 2, 1, 1)),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

fn draw_confirm(frame: &mut Frame<'_>, prompt: &str) {
    let area = centered_rect(50, 20, frame.area());
    let body = Paragraph::new(prompt.to_string())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Confirm "));
    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

fn main_panel_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .padding(Padding::new(3, 3, 1, 1))
}
