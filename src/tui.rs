use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::board::{Board, BoardHandler, DropOutcome, DropTarget, Partitions, StoreSync};
use crate::config::Config;
use crate::followup;
use crate::models::{Application, ApplicationId, Status};
use crate::store::RecordStore;
use crate::templates;

/// Cursor and panels. Survives across key presses; the board holds the
/// drag session itself.
#[derive(Debug, Default)]
struct Ui {
    col: usize,
    row: usize,
    opened: Option<ApplicationId>,
    hovered: Option<ApplicationId>,
    notice: Option<String>,
}

impl Ui {
    fn status(&self) -> Status {
        Status::ALL[self.col]
    }
}

/// Board callbacks for one key press: record changes go to the store,
/// the rest to the UI.
struct Handler<'a> {
    sync: StoreSync<'a>,
    ui: &'a mut Ui,
}

impl BoardHandler for Handler<'_> {
    fn edit_requested(&mut self, app: &Application) {
        self.ui.notice = Some(format!("Edit from the shell: jobtrack edit {} --help", app.id));
    }

    fn delete_requested(&mut self, id: &str) {
        self.sync.delete_requested(id);
        if self.ui.opened.as_deref() == Some(id) {
            self.ui.opened = None;
        }
        self.ui.notice = Some(format!("Deleted #{}", id));
    }

    fn status_changed(&mut self, id: &str, status: Status) {
        self.sync.status_changed(id, status);
    }

    fn open_requested(&mut self, app: &Application) {
        self.ui.opened = Some(app.id.clone());
    }
}

/// Runs the interactive board and returns the column order it ended with.
pub fn run_board(store: &mut RecordStore, config: &Config, saved: Option<Partitions>) -> Result<Partitions> {
    let mut board = Board::restore(store.applications(), config.board_order, saved);
    let mut ui = Ui::default();
    refresh_hover(&board, &mut ui);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, store, &mut board, &mut ui, config);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result.map(|()| board.partitions().clone())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    store: &mut RecordStore,
    board: &mut Board,
    ui: &mut Ui,
    config: &Config,
) -> Result<()> {
    loop {
        let today = Local::now().date_naive();
        terminal.draw(|frame| draw(frame, board, ui, today, config.follow_up_days))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !handle_key(key.code, store, board, ui, today)? {
                break;
            }
        }
    }
    Ok(())
}

/// Returns `false` when the user quits.
fn handle_key(
    code: KeyCode,
    store: &mut RecordStore,
    board: &mut Board,
    ui: &mut Ui,
    today: NaiveDate,
) -> Result<bool> {
    let dragging = board.dragging().is_some();
    ui.notice = None;

    match code {
        KeyCode::Char('q') if !dragging => return Ok(false),
        KeyCode::Esc if dragging => board.drag_cancel(),
        KeyCode::Esc if ui.opened.is_some() => ui.opened = None,
        KeyCode::Esc => return Ok(false),
        KeyCode::Left | KeyCode::Char('h') => ui.col = ui.col.saturating_sub(1),
        KeyCode::Right | KeyCode::Char('l') => ui.col = (ui.col + 1).min(Status::ALL.len() - 1),
        KeyCode::Up | KeyCode::Char('k') => ui.row = ui.row.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => ui.row += 1,
        KeyCode::Char(' ') | KeyCode::Enter if dragging => {
            let column = board.column(ui.status());
            // one slot past the last card is the column background
            let target = match column.get(ui.row) {
                Some(id) => DropTarget::Card(id.clone()),
                None => DropTarget::Column(ui.status()),
            };
            let active = board.dragging().map(str::to_string);
            let mut handler = Handler {
                sync: StoreSync::new(store),
                ui: &mut *ui,
            };
            let outcome = board.drag_end(Some(target), &mut handler);
            let saved = handler.sync.finish();
            if let DropOutcome::Moved { to, .. } = outcome {
                board.sync(store.applications());
                // keep the cursor on the card that just landed
                if let Some(row) = board.column(to).iter().position(|id| Some(id) == active.as_ref()) {
                    ui.row = row;
                }
            }
            saved?;
        }
        KeyCode::Char(' ') => {
            if let Some(id) = selected(board, ui) {
                board.drag_start(&id);
            }
        }
        KeyCode::Enter | KeyCode::Char('o') if !dragging => {
            if let Some(id) = selected(board, ui) {
                board.request_open(&id, &mut Handler { sync: StoreSync::new(store), ui: &mut *ui });
            }
        }
        KeyCode::Char('e') if !dragging => {
            if let Some(id) = selected(board, ui) {
                board.request_edit(&id, &mut Handler { sync: StoreSync::new(store), ui: &mut *ui });
            }
        }
        KeyCode::Char('d') if !dragging => {
            if let Some(id) = selected(board, ui) {
                let mut handler = Handler {
                    sync: StoreSync::new(store),
                    ui: &mut *ui,
                };
                board.request_delete(&id, &mut handler);
                handler.sync.finish()?;
                board.remove(&id);
                board.sync(store.applications());
            }
        }
        KeyCode::Char('f') if !dragging => {
            if let Some(id) = selected(board, ui) {
                store.mark_followed_up(&id, today)?;
                board.sync(store.applications());
                ui.notice = Some(format!("Marked #{} followed up", id));
            }
        }
        _ => {}
    }

    clamp_cursor(board, ui);
    refresh_hover(board, ui);
    Ok(true)
}

fn selected(board: &Board, ui: &Ui) -> Option<ApplicationId> {
    board.column(ui.status()).get(ui.row).cloned()
}

fn clamp_cursor(board: &Board, ui: &mut Ui) {
    let len = board.column(ui.status()).len();
    // while dragging the cursor may rest on the empty slot below the last card
    let max = if board.dragging().is_some() { len } else { len.saturating_sub(1) };
    ui.row = ui.row.min(max);
}

fn refresh_hover(board: &Board, ui: &mut Ui) {
    let id = selected(board, ui);
    let mut sink = HoverSink(None);
    board.hover(id.as_deref(), &mut sink);
    ui.hovered = sink.0;
}

/// Collects hover callbacks when no store access is needed.
struct HoverSink(Option<ApplicationId>);

impl BoardHandler for HoverSink {
    fn edit_requested(&mut self, _app: &Application) {}
    fn delete_requested(&mut self, _id: &str) {}
    fn status_changed(&mut self, _id: &str, _status: Status) {}
    fn open_requested(&mut self, _app: &Application) {}
    fn hover_enter(&mut self, app: &Application) {
        self.0 = Some(app.id.clone());
    }
    fn hover_leave(&mut self) {
        self.0 = None;
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Applied => Color::Blue,
        Status::Interviewing => Color::Yellow,
        Status::Offer => Color::Green,
        Status::Rejected => Color::Red,
        Status::Accepted => Color::Magenta,
    }
}

fn draw(frame: &mut Frame, board: &Board, ui: &Ui, today: NaiveDate, follow_up_days: i64) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(rows[0]);

    let dragging = board.dragging();

    for (i, (status, ids)) in board.partitions().iter().enumerate() {
        let mut items: Vec<ListItem> = ids
            .iter()
            .filter_map(|id| board.get(id))
            .map(|app| {
                let marker = if dragging == Some(app.id.as_str()) { "» " } else { "" };
                let due = if followup::needs_follow_up(app, today, follow_up_days) { " !" } else { "" };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("{}{}{}", marker, app.role, due),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(app.company.clone()),
                    Line::from(Span::styled(
                        format!("Applied {}", app.date_applied),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();
        if dragging.is_some() && i == ui.col {
            items.push(ListItem::new(Span::styled("  (drop here)", Style::default().fg(Color::DarkGray))));
        }

        let mut state = ListState::default();
        if i == ui.col {
            state.select(Some(ui.row));
        }
        let border = if i == ui.col { Style::default().fg(status_color(status)) } else { Style::default() };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!(" {} ({}) ", status.label(), ids.len())),
            )
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol(if dragging.is_some() { "▸ " } else { "> " });
        frame.render_stateful_widget(list, columns[i], &mut state);
    }

    let focus = ui.opened.as_deref().or(ui.hovered.as_deref());
    let detail = match focus.and_then(|id| board.get(id)) {
        Some(app) => build_detail(app, today, follow_up_days, ui.opened.is_some()),
        None => Text::raw("No application selected"),
    };
    let title = if ui.opened.is_some() { " Details " } else { " Preview " };
    frame.render_widget(
        Paragraph::new(detail)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false }),
        rows[1],
    );

    let help = match (&ui.notice, dragging) {
        (Some(notice), _) => notice.clone(),
        (None, Some(_)) => " h/l/j/k:choose slot  space/enter:drop  esc:cancel".to_string(),
        (None, None) => {
            " h/l/j/k:move  space:pick up  o:open  e:edit  d:delete  f:followed up  q:quit".to_string()
        }
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );
}

fn build_detail(app: &Application, today: NaiveDate, follow_up_days: i64, full: bool) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        format!("{} at {}", app.role, app.company),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", app.status.label()),
        Style::default().fg(status_color(app.status)),
    )));
    lines.push(Line::from(format!("Applied: {}  (#{})", app.date_applied, app.id)));
    if !app.job_url.is_empty() {
        lines.push(Line::from(format!("URL: {}", app.job_url)));
    }
    if followup::needs_follow_up(app, today, follow_up_days) {
        lines.push(Line::from(Span::styled(
            format!("Follow up: {} days without contact", followup::days_since(app, today)),
            Style::default().fg(Color::Yellow),
        )));
    }

    if !full {
        return Text::from(lines);
    }

    if !app.interviews.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Interviews", Style::default().add_modifier(Modifier::BOLD))));
        for interview in &app.interviews {
            let when = format!("{} {}", interview.date, interview.time);
            let when = if when.trim().is_empty() { "unscheduled".to_string() } else { when.trim().to_string() };
            lines.push(Line::from(format!("  {} - {}", interview.kind, when)));
            if let Some(prep) = templates::prep_for(&interview.kind) {
                lines.push(Line::from(Span::styled(
                    format!("    prep: {} items (jobtrack prep \"{}\")", prep.checklist.len(), prep.kind),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    if app.offer_details.has_any() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Offer", Style::default().fg(Color::Green))));
        for (label, value) in app.offer_details.fields() {
            if !value.is_empty() {
                lines.push(Line::from(format!("  {}: {}", label, value)));
            }
        }
    }

    if !app.notes.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Notes", Style::default().add_modifier(Modifier::BOLD))));
        for line in textwrap::fill(&app.notes, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::OrderPolicy;
    use crate::models::NewApplication;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn setup() -> (RecordStore, Board, Ui, ApplicationId, ApplicationId) {
        let mut store = RecordStore::new();
        let newer = store.create(NewApplication::new("Acme", "Engineer", day(9))).unwrap();
        let older = store.create(NewApplication::new("Globex", "Analyst", day(2))).unwrap();
        let board = Board::new(store.applications(), OrderPolicy::ByDate);
        let mut ui = Ui::default();
        refresh_hover(&board, &mut ui);
        (store, board, ui, newer, older)
    }

    fn press(keys: &[KeyCode], store: &mut RecordStore, board: &mut Board, ui: &mut Ui) {
        for key in keys {
            assert!(handle_key(*key, store, board, ui, day(30)).unwrap());
        }
    }

    #[test]
    fn keyboard_drag_moves_card_and_saves_status() {
        let (mut store, mut board, mut ui, newer, _) = setup();
        press(
            &[KeyCode::Char(' '), KeyCode::Right, KeyCode::Enter],
            &mut store,
            &mut board,
            &mut ui,
        );

        assert_eq!(store.require(&newer).unwrap().status, Status::Interviewing);
        assert_eq!(board.column(Status::Interviewing), [newer.clone()]);
        assert_eq!(board.dragging(), None);
        assert_eq!(ui.hovered.as_deref(), Some(newer.as_str()));
    }

    #[test]
    fn escape_cancels_a_drag() {
        let (mut store, mut board, mut ui, newer, _) = setup();
        press(
            &[KeyCode::Char(' '), KeyCode::Right, KeyCode::Esc, KeyCode::Enter],
            &mut store,
            &mut board,
            &mut ui,
        );
        assert_eq!(store.require(&newer).unwrap().status, Status::Applied);
        assert_eq!(board.dragging(), None);
    }

    #[test]
    fn reorder_within_column_does_not_touch_store() {
        let (mut store, mut board, mut ui, newer, older) = setup();
        press(
            &[KeyCode::Char(' '), KeyCode::Down, KeyCode::Enter],
            &mut store,
            &mut board,
            &mut ui,
        );
        assert_eq!(board.column(Status::Applied), [older, newer.clone()]);
        assert_eq!(store.require(&newer).unwrap().status, Status::Applied);
    }

    #[test]
    fn delete_and_follow_up_keys() {
        let (mut store, mut board, mut ui, newer, older) = setup();
        press(&[KeyCode::Char('f')], &mut store, &mut board, &mut ui);
        assert_eq!(store.require(&newer).unwrap().last_follow_up, Some(day(30)));

        press(&[KeyCode::Char('d')], &mut store, &mut board, &mut ui);
        assert!(store.get(&newer).is_none());
        assert_eq!(board.column(Status::Applied), [older.clone()]);
        assert_eq!(ui.hovered.as_deref(), Some(older.as_str()));
    }

    #[test]
    fn quit_keys() {
        let (mut store, mut board, mut ui, _, _) = setup();
        assert!(!handle_key(KeyCode::Char('q'), &mut store, &mut board, &mut ui, day(1)).unwrap());

        press(&[KeyCode::Char('o')], &mut store, &mut board, &mut ui);
        assert!(ui.opened.is_some());
        press(&[KeyCode::Esc], &mut store, &mut board, &mut ui);
        assert!(ui.opened.is_none());
    }
}
