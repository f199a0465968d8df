use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;
use ratatui::{Frame, Terminal};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::state::{AppState, Focus};
use crate::config::Config;
use crate::db::{self, DbEvent, DbStatus, QueryRunner};
use crate::editor::{BufferSink, Editor};
use crate::ui::{Component, ConnectionInfo, MessageKind, Priority, StatusLine, StatusSegment};
use crate::vim::VimMode;

pub struct App {
    pub editor: Editor,
    pub status: StatusLine,
    pub state: AppState,
    config: Config,

    rt: Handle,
    db_events_tx: mpsc::UnboundedSender<DbEvent>,
    db_events_rx: mpsc::UnboundedReceiver<DbEvent>,
}

impl App {
    pub fn new(
        mut editor: Editor,
        config: Config,
        rt: Handle,
        db_events_tx: mpsc::UnboundedSender<DbEvent>,
        db_events_rx: mpsc::UnboundedReceiver<DbEvent>,
        conn_str: Option<String>,
    ) -> Self {
        editor.set_executor(db::disconnected);

        let timeout = Duration::from_millis(config.display.status_timeout_ms);
        let status = StatusLine::new(timeout).with_runtime(rt.clone());

        let mut app = Self {
            editor,
            status,
            state: AppState::new(),
            config,
            rt,
            db_events_tx,
            db_events_rx,
        };

        if let Some(conn_str) = conn_str {
            app.start_connect(conn_str);
        }

        app
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while !self.state.should_quit {
            self.drain_db_events();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    self.on_key(key);
                }
            }
        }

        self.editor.clean_up();
        self.status.clean_up();
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.area());

        self.editor.layout(chunks[0]);
        self.status.layout(chunks[1]);
        self.refresh_status();

        let focused = self.state.editor_focused();
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .title(format!(" Query [{}] ", self.editor.mode().label()))
            .border_style(border_style);
        frame.render_widget(block, self.editor.bounds());

        let cursor = {
            let mut sink = BufferSink::new(frame.buffer_mut());
            self.editor.render(&mut sink);
            self.status.render(&mut sink);
            sink.cursor()
        };

        if focused {
            if let Some(position) = cursor {
                frame.set_cursor_position(position);
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.state.should_quit = true;
            return;
        }

        match self.state.focus {
            Focus::Released => match key.code {
                KeyCode::Char('q') => self.state.should_quit = true,
                KeyCode::Char('i') | KeyCode::Enter => self.state.focus = Focus::Editor,
                _ => {}
            },
            Focus::Editor => {
                if key.code == KeyCode::Esc && self.editor.is_normal_mode() {
                    self.state.focus = Focus::Released;
                    return;
                }
                if let Err(e) = self.editor.handle_key(key) {
                    debug!(error = %e, "editor command failed");
                    self.status.set_message(e.to_string(), MessageKind::Error);
                }
            }
        }
    }

    pub fn start_connect(&mut self, conn_str: String) {
        self.state.db.reset(DbStatus::Connecting);
        self.state.db.conn_str = Some(conn_str.clone());
        self.status.set_message("Connecting...", MessageKind::Info);

        let timeout = Duration::from_secs(self.config.connection.connect_timeout_secs);
        db::start_connect(&self.rt, conn_str, timeout, self.db_events_tx.clone());
    }

    fn drain_db_events(&mut self) {
        while let Ok(ev) = self.db_events_rx.try_recv() {
            self.apply_db_event(ev);
        }
    }

    pub fn apply_db_event(&mut self, ev: DbEvent) {
        match ev {
            DbEvent::Connected { client } => {
                info!("connected");
                self.state.db.status = DbStatus::Connected;
                self.editor.set_executor(QueryRunner::new(
                    client,
                    self.rt.clone(),
                    self.db_events_tx.clone(),
                    self.state.db.running_flag(),
                ));
                self.status.set_message("Connected", MessageKind::Info);
            }
            DbEvent::ConnectError { error } => {
                self.state.db.reset(DbStatus::Error);
                self.editor.set_executor(db::disconnected);
                self.status
                    .set_message(format!("Connection error: {}", error), MessageKind::Error);
            }
            DbEvent::ConnectionLost { error } => {
                self.state.db.reset(DbStatus::Error);
                self.editor.set_executor(db::disconnected);
                self.status
                    .set_message(format!("Connection lost: {}", error), MessageKind::Error);
            }
            DbEvent::QueryStarted => {
                self.status.set_message("Running...", MessageKind::Info);
            }
            DbEvent::QueryFinished { outcome } => {
                self.state.db.last_command_tag = outcome.command_tag.clone();
                self.state.db.last_elapsed = Some(outcome.elapsed);
                self.status.set_message(outcome.summary(), MessageKind::Info);
            }
            DbEvent::QueryError { error } => {
                self.status.set_message(error, MessageKind::Error);
            }
        }
    }

    fn refresh_status(&mut self) {
        let mode = self.editor.mode();
        let mode_color = match mode {
            VimMode::Normal => Color::Cyan,
            VimMode::Insert => Color::Green,
            VimMode::Visual(_) | VimMode::VisualLine(_) => Color::Magenta,
        };
        let mut segments = vec![StatusSegment::new(format!(" {} ", mode.label()), Priority::Critical)
            .style(
                Style::default()
                    .fg(Color::Black)
                    .bg(mode_color)
                    .add_modifier(Modifier::BOLD),
            )];

        let db = &self.state.db;
        let db_color = match db.status {
            DbStatus::Connected => Color::Green,
            DbStatus::Connecting => Color::Yellow,
            DbStatus::Disconnected => Color::DarkGray,
            DbStatus::Error => Color::Red,
        };
        let db_label = match &db.conn_str {
            Some(conn_str) => format!(
                "{} {}",
                db.status.label(),
                ConnectionInfo::parse(conn_str).label()
            ),
            None => db.status.label().to_string(),
        };
        segments.push(
            StatusSegment::new(db_label, Priority::High).style(Style::default().fg(db_color)),
        );

        if db.is_running() {
            segments.push(
                StatusSegment::new("running", Priority::Medium)
                    .style(Style::default().fg(Color::Yellow)),
            );
        }
        if let Some(last) = db.last_result() {
            segments.push(
                StatusSegment::new(last, Priority::Low)
                    .style(Style::default().fg(Color::DarkGray))
                    .right_align(),
            );
        }
        if self.editor.is_modified() {
            segments.push(StatusSegment::new("[+]", Priority::Low));
        }
        if !self.state.editor_focused() {
            segments.push(
                StatusSegment::new("q quit, i edit", Priority::Low)
                    .style(Style::default().fg(Color::DarkGray)),
            );
        }

        if self.config.display.show_cursor_position {
            let cursor = self.editor.cursor_position();
            segments.push(
                StatusSegment::new(
                    format!("Ln {}, Col {}", cursor.line + 1, cursor.col + 1),
                    Priority::Medium,
                )
                .right_align(),
            );
        }

        self.status.set_segments(segments);
    }
}
