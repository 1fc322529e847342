//! Transport bar widget - shows BPM, play state, position and filter state

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use envgen::sequencing::TimeSignature;

use super::UiStateInit;

fn dry_label(dry_pass: bool) -> &'static str {
    if dry_pass {
        "on"
    } else {
        "off"
    }
}

/// Render the transport bar
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    state: &UiStateInit,
    position: f64,
    is_playing: bool,
    dry_pass: bool,
    cutoff: f32,
) {
    let block = Block::default().title(" envgen ").borders(Borders::ALL);

    let meter = TimeSignature::from_host(state.numerator, state.denominator);
    let beats_per_bar = meter.quarter_notes_per_bar();
    let current_bar = (position / beats_per_bar).floor() as i64 + 1;
    let current_beat = (position.rem_euclid(beats_per_bar)).floor() as i64 + 1;

    let play_symbol = if is_playing { "▶" } else { "⏸" };
    let play_state_str = if is_playing { "Playing" } else { "Paused" };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  {}/{}  ", state.bpm, meter.numerator, meter.denominator),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if is_playing { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(
            format!("Bar {} | Beat {}  ", current_bar, current_beat),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Cutoff: {:.0} Hz  ", cutoff),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("Dry: {}  ", dry_label(dry_pass)),
            Style::default().fg(if dry_pass { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            format!("{:.1}kHz", state.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_pass_shows_as_a_toggle() {
        assert_eq!(dry_label(true), "on");
        assert_eq!(dry_label(false), "off");
    }
}
