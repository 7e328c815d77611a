//! Application State and Event Loop
//!
//! `App` owns the [`FumotionClient`] and the live [`View`] for the current
//! screen. Every key press goes to the view first; whatever the view hands
//! back as an [`Action`] is applied here, which is the only place screens
//! change. Chat poll results arrive on an mpsc channel and are routed to the
//! view between key presses.
//!
//! While a key press or the startup health check is waiting on the service, the
//! terminal is still read: Ctrl+C abandons the request and quits, and a
//! busy line replaces the status line once the wait gets noticeable.

use std::future::Future;
use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{Stream, StreamExt};
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;

use fumotion_core::{FumotionClient, PollUpdate, Screen};

use crate::screens::{Action, View};
use crate::theme;

/// Redraw cadence when nothing else happens
const TICK: Duration = Duration::from_millis(250);

/// Poll updates buffered between redraws
const POLL_CHANNEL_CAPACITY: usize = 16;

/// Wait before the busy line is drawn over the last frame
const BUSY_DELAY: Duration = Duration::from_millis(150);

/// Status line message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alert {
    Info(String),
    Error(String),
}

pub struct App {
    client: FumotionClient,
    view: View,
    poll_tx: mpsc::Sender<PollUpdate>,
    poll_rx: mpsc::Receiver<PollUpdate>,
    alert: Option<Alert>,
    running: bool,
}

impl App {
    pub fn new(client: FumotionClient) -> Self {
        let (poll_tx, poll_rx) = mpsc::channel(POLL_CHANNEL_CAPACITY);
        Self {
            client,
            view: View::Loading,
            poll_tx,
            poll_rx,
            alert: None,
            running: true,
        }
    }

    pub fn client(&self) -> &FumotionClient {
        &self.client
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Probe the service and open the first screen
    pub async fn start(&mut self) {
        self.client.start().await;
        if self.client.is_offline() {
            self.alert = Some(Alert::Error(
                "Cannot reach the Fumotion service. Check your connection.".to_string(),
            ));
        }
        self.enter_view().await;
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        self.run_with_events(terminal, EventStream::new()).await
    }

    /// Event loop over any source of terminal events
    pub async fn run_with_events<B, S>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut events: S,
    ) -> anyhow::Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        // Loading frame while the health probe runs
        let mut last_frame = terminal.draw(|frame| self.render(frame))?.buffer.clone();
        if interruptible(terminal, &mut events, &last_frame, self.start())
            .await?
            .is_none()
        {
            self.running = false;
        }

        while self.running {
            last_frame = terminal.draw(|frame| self.render(frame))?.buffer.clone();

            tokio::select! {
                biased;

                maybe_event = events.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let handled =
                            interruptible(terminal, &mut events, &last_frame, self.handle_key(key))
                                .await?;
                        if handled.is_none() {
                            self.running = false;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal event stream failed");
                        self.running = false;
                    }
                    None => self.running = false,
                },

                Some(update) = self.poll_rx.recv() => {
                    self.view.apply_poll(update);
                }

                _ = tokio::time::sleep(TICK) => {}
            }
        }

        tracing::info!("Exiting");
        Ok(())
    }

    /// Route a key press: the view first, then the global bindings
    pub async fn handle_key(&mut self, key: KeyEvent) {
        if is_interrupt(&key) {
            self.running = false;
            return;
        }

        if let Some(action) = self.view.handle_key(key, &self.client).await {
            self.apply(action).await;
            return;
        }

        match key.code {
            KeyCode::Esc => self.apply(Action::Back).await,
            KeyCode::Char('q') if !self.view.captures_text() => self.apply(Action::Quit).await,
            _ => {}
        }
    }

    pub async fn apply(&mut self, action: Action) {
        match action {
            Action::Consumed => {}
            Action::Navigate(screen, params) => {
                self.alert = None;
                self.client.navigate(screen, params);
                self.enter_view().await;
            }
            Action::Back => {
                if self.client.screen().back_target().is_none() {
                    self.running = false;
                    return;
                }
                self.alert = None;
                self.client.back();
                self.enter_view().await;
            }
            Action::Logout => {
                self.client.logout();
                self.alert = Some(Alert::Info("Signed out".to_string()));
                self.enter_view().await;
            }
            Action::Quit => self.running = false,
            Action::Notify(message) => self.alert = Some(Alert::Info(message)),
            Action::Error(error) => {
                tracing::warn!(error = %error, screen = %self.client.screen(), "Request failed");
                self.alert = Some(Alert::Error(error.user_message()));
                if self.client.handle_error(&error).is_some() {
                    self.enter_view().await;
                }
            }
        }
    }

    /// Replace the view with a fresh one for the current screen. Dropping
    /// the old view stops any chat polling it owned.
    async fn enter_view(&mut self) {
        self.view = View::Loading;
        let (view, error) = View::enter(&self.client, &self.poll_tx).await;
        self.view = view;

        if let Some(error) = error {
            tracing::warn!(error = %error, screen = %self.client.screen(), "Screen load failed");
            self.alert = Some(Alert::Error(error.user_message()));
            if self.client.handle_error(&error).is_some() {
                let (view, _) = View::enter(&self.client, &self.poll_tx).await;
                self.view = view;
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(2),
        ])
        .areas(frame.area());

        self.render_header(frame, header);
        self.view.render(frame, body);
        self.render_footer(frame, footer);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let screen = self.client.screen();
        let mut spans = vec![
            Span::styled(" Fumotion ", theme::title().add_modifier(Modifier::REVERSED)),
            Span::raw(" "),
            Span::styled(screen.title(), theme::title()),
        ];
        if let Some(user) = self.client.current_user() {
            spans.push(Span::styled(format!("  {}", user.full_name()), theme::dim()));
        }
        if self.client.is_offline() {
            spans.push(Span::styled(
                "  OFFLINE",
                Style::default()
                    .fg(theme::WARNING_AMBER)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let [alert_area, hints_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

        if let Some(alert) = &self.alert {
            let (text, style) = match alert {
                Alert::Info(text) => (text, Style::default().fg(theme::SUCCESS_GREEN)),
                Alert::Error(text) => (text, Style::default().fg(theme::ERROR_RED)),
            };
            frame.render_widget(Paragraph::new(format!(" {text}")).style(style), alert_area);
        }

        let hints = if screen_is_root(self.client.screen()) {
            self.view.hints().to_string()
        } else {
            format!("{} | Ctrl+C quit", self.view.hints())
        };
        frame.render_widget(
            Paragraph::new(format!(" {hints}")).style(theme::dim()),
            hints_area,
        );
    }
}

fn screen_is_root(screen: Screen) -> bool {
    screen.back_target().is_none()
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Drive `work` to completion while still reading terminal events.
///
/// Returns `None` when Ctrl+C arrives or the event source closes first; the
/// unfinished work is dropped. Other keys are discarded until it finishes.
async fn interruptible<B, S, F>(
    terminal: &mut Terminal<B>,
    events: &mut S,
    last_frame: &Buffer,
    work: F,
) -> io::Result<Option<F::Output>>
where
    B: Backend,
    S: Stream<Item = io::Result<Event>> + Unpin,
    F: Future,
{
    tokio::pin!(work);
    let mut busy_shown = false;

    loop {
        tokio::select! {
            biased;

            output = &mut work => return Ok(Some(output)),

            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press && is_interrupt(&key) => {
                    tracing::info!("Interrupted while waiting on the service");
                    return Ok(None);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Terminal event stream failed");
                    return Ok(None);
                }
                None => return Ok(None),
            },

            _ = tokio::time::sleep(BUSY_DELAY), if !busy_shown => {
                busy_shown = true;
                terminal.draw(|frame| render_busy(frame, last_frame))?;
            }
        }
    }
}

/// Last frame with the status line replaced by a busy notice
fn render_busy(frame: &mut Frame, last_frame: &Buffer) {
    frame.buffer_mut().merge(last_frame);
    let area = frame.area();
    if area.height < 2 {
        return;
    }
    let status = Rect::new(area.x, area.bottom() - 2, area.width, 1);
    frame.render_widget(Clear, status);
    frame.render_widget(
        Paragraph::new(" Working... (Ctrl+C to quit)").style(theme::dim()),
        status,
    );
}
