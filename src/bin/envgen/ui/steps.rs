//! Step grid widget - one row of 16 cells per lane, playhead highlighted

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use envgen::{dsp::Destination, params::LaneConfig, StepIndicator, NUM_STEPS};

pub fn render_steps(frame: &mut Frame, area: Rect, lanes: &[LaneConfig], indicator: &StepIndicator) {
    let block = Block::default().title(" Lanes ").borders(Borders::ALL);

    let lines: Vec<Line> = lanes
        .iter()
        .enumerate()
        .map(|(index, lane)| {
            let current = indicator.current_step(index);
            let level = indicator.envelope_level(index).unwrap_or(0.0);

            let mut spans = Vec::with_capacity(NUM_STEPS + 3);
            spans.push(Span::styled(
                format!(" {} {:>4} ", index + 1, lane.rate.label()),
                Style::default().fg(Color::DarkGray),
            ));

            for (step, &active) in lane.steps.iter().enumerate() {
                let symbol = if active { "■" } else { "·" };
                let mut style = Style::default().fg(if active { Color::Green } else { Color::DarkGray });
                if current == Some(step) {
                    style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
                }
                // Beat separators every four steps
                let sep = if step % 4 == 3 { "  " } else { " " };
                spans.push(Span::styled(format!("{}{}", symbol, sep), style));
            }

            let target = match lane.destination {
                Destination::None => "-",
                Destination::Cutoff => "cutoff",
                Destination::Volume => "volume",
            };
            spans.push(Span::styled(
                format!("{:>6} {:+.2}  ", target, lane.amount),
                Style::default().fg(Color::White),
            ));
            spans.push(Span::styled(
                "█".repeat((level * 10.0).round() as usize),
                Style::default().fg(Color::Magenta),
            ));

            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
