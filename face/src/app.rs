//! Main Application
//!
//! The render loop host. Owns the face, the renderer and the bridge to
//! the assistant; converts terminal events into face inputs and ticks the
//! animation at the configured frame rate. The loop itself never blocks
//! on anything but its own frame timer - every slow operation lives on
//! the voice side of the [`AssistantHandle`].

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::Terminal;

use otto_core::status::BASELINE_COLOR;
use otto_core::{AssistantHandle, AssistantStatus, OttoConfig, Rgb};

use crate::bridge::StatusBridge;
use crate::face::{Face, Renderer};

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Shared view of the voice loop
    handle: AssistantHandle,
    /// The animated face
    face: Face,
    /// Status-to-face translator
    bridge: StatusBridge,
    /// Frame painter
    renderer: Renderer,
    /// Terminal size
    size: (u16, u16),
    /// Target frame period
    frame_duration: Duration,
    /// Idle drift paused by the user (space bar)
    drift_paused: bool,
}

impl App {
    /// Create a new App instance
    pub fn new(config: &OttoConfig, handle: AssistantHandle) -> anyhow::Result<Self> {
        let size = crossterm::terminal::size()?;
        let now = Instant::now();

        let face = Face::new(now, config.face.caption_fade_secs as f32);
        // Bottom row is reserved for the status bar
        let renderer = Renderer::new(size.0, size.1.saturating_sub(1));
        let fps = config.face.target_fps.max(1);

        Ok(Self {
            running: true,
            handle,
            face,
            bridge: StatusBridge::new(),
            renderer,
            size,
            frame_duration: Duration::from_secs(1) / fps,
            drift_paused: false,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut events = EventStream::new();

        while self.running {
            tokio::select! {
                biased;

                // Terminal events take priority over the frame tick
                maybe_event = events.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        match event {
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key.code, key.modifiers);
                            }
                            Event::Resize(w, h) => self.handle_resize(w, h),
                            _ => {}
                        }
                    }
                }

                _ = tokio::time::sleep(self.frame_duration) => {}
            }

            if self.handle.quit_requested() {
                self.running = false;
            }

            let now = Instant::now();
            self.bridge.poll(now, &self.handle, &mut self.face);
            let snapshot = self.face.tick(now);

            // A bad frame is logged and skipped; the loop never dies on a
            // draw fault
            let caption = self.face.caption(now);
            let renderer = &mut self.renderer;
            let status = self.handle.status();
            let size = self.size;
            let draw_result = terminal.draw(|frame| {
                let buf = frame.buffer_mut();
                renderer.render(&snapshot, caption, buf);
                Self::draw_status_bar(buf, status, size);
            });
            if let Err(err) = draw_result {
                tracing::warn!(error = %err, "render fault, skipping frame");
            }
        }

        Ok(())
    }

    /// Handle keyboard input
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Esc => {
                self.handle.request_quit();
                self.running = false;
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.handle.request_quit();
                self.running = false;
            }

            // Pause/resume the idle look-around
            KeyCode::Char(' ') => {
                self.drift_paused = !self.drift_paused;
                self.face.set_idle_drift(!self.drift_paused);
            }

            // Debug color pokes
            KeyCode::Char('r') => self.face.set_eye_color(Rgb::new(255, 0, 0)),
            KeyCode::Char('b') => self.face.set_eye_color(BASELINE_COLOR),

            _ => {}
        }
    }

    /// Handle terminal resize
    fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.renderer.resize(width, height.saturating_sub(1));
    }

    /// Bottom status line: what the assistant is doing plus key hints
    fn draw_status_bar(buf: &mut ratatui::buffer::Buffer, status: AssistantStatus, size: (u16, u16)) {
        if size.1 == 0 {
            return;
        }
        let y = size.1 - 1;

        let style = match status {
            AssistantStatus::Idle | AssistantStatus::ListeningWake => {
                Style::default().fg(Color::DarkGray)
            }
            AssistantStatus::Error => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::Cyan),
        };

        let line = format!(
            " {} | Esc to quit | Space to pause drift",
            status.description()
        );
        let padded: String = line
            .chars()
            .chain(std::iter::repeat(' '))
            .take(size.0 as usize)
            .collect();
        buf.set_string(0, y, &padded, style);
    }
}
