//! TUI module for envgen
//!
//! Shows the measure scope, lane step grids and the transport, refreshed at
//! roughly 30 Hz.

mod scope;
mod steps;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Producer;
use std::time::Duration;

use envgen::{
    params::{LaneConfig, ParamId, ParamSender},
    scope::ScopeReader,
    StepIndicator,
};

use super::transport::{ControlMessage, SharedPosition};
use scope::render_scope;
use steps::render_steps;
use transport::render_transport;

/// Refresh interval (~30 fps)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
/// Quarter notes per nudge
const NUDGE_BEATS: f64 = 1.0;
/// Cutoff change per key press (a quarter octave)
const CUTOFF_STEP: f32 = 1.189_207;

/// Static state handed over once at startup
pub struct UiStateInit {
    pub bpm: f64,
    pub numerator: i32,
    pub denominator: i32,
    pub sample_rate: f32,
    pub lanes: Vec<LaneConfig>,
    pub cutoff: f32,
}

/// Channels between the UI and the audio thread
pub struct UiLinks {
    pub reader: ScopeReader,
    pub indicator: StepIndicator,
    pub position: SharedPosition,
    pub control_tx: Producer<ControlMessage>,
    pub param_tx: ParamSender,
}

/// UI application state
pub struct UiApp {
    init: UiStateInit,
    links: UiLinks,
    dry_pass: bool,
    cutoff: f32,
    should_quit: bool,
}

impl UiApp {
    pub fn new(init: UiStateInit, links: UiLinks) -> Self {
        let cutoff = init.cutoff;
        Self {
            init,
            links,
            dry_pass: false,
            cutoff,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(FRAME_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.control(ControlMessage::TogglePlayback),
            KeyCode::Left => self.control(ControlMessage::Nudge(-NUDGE_BEATS)),
            KeyCode::Right => self.control(ControlMessage::Nudge(NUDGE_BEATS)),
            KeyCode::Char('r') | KeyCode::Char('R') => self.control(ControlMessage::Rewind),
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.dry_pass = !self.dry_pass;
                self.param(ParamId::DryPass, if self.dry_pass { 1.0 } else { 0.0 });
            }
            KeyCode::Up => {
                self.cutoff = (self.cutoff * CUTOFF_STEP).min(20_000.0);
                self.param(ParamId::FilterCutoff, self.cutoff);
            }
            KeyCode::Down => {
                self.cutoff = (self.cutoff / CUTOFF_STEP).max(20.0);
                self.param(ParamId::FilterCutoff, self.cutoff);
            }
            _ => {}
        }
    }

    fn control(&mut self, message: ControlMessage) {
        if self.links.control_tx.push(message).is_err() {
            log::warn!("control queue full, dropped {:?}", message);
        }
    }

    fn param(&mut self, id: ParamId, value: f32) {
        if !self.links.param_tx.send(id, value) {
            log::warn!("parameter queue full, dropped {}", id);
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let lane_rows = self.init.lanes.len().max(1) as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Transport bar
                Constraint::Min(10),               // Scope
                Constraint::Length(lane_rows + 2), // Step grids
                Constraint::Length(1),             // Help bar
            ])
            .split(area);

        let playing = self.links.indicator.is_playing();
        render_transport(
            frame,
            chunks[0],
            &self.init,
            self.links.position.load(),
            playing,
            self.dry_pass,
            self.cutoff,
        );

        // Braille markers give two columns per cell
        let width = chunks[1].width.saturating_sub(2) as usize * 2;
        let display = self.links.reader.refresh(width.max(1));
        render_scope(frame, chunks[1], display);

        render_steps(frame, chunks[2], &self.init.lanes, &self.links.indicator);

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Pause  [←/→] Seek  [R] Rewind  [D] Dry  [↑/↓] Cutoff",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
