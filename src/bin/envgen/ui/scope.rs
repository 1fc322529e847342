//! Measure scope widget - one bar of audio with lane envelopes on top

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use envgen::scope::{DisplayFrame, GridLine};

const LANE_COLORS: [Color; 8] = [
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightRed,
    Color::LightCyan,
    Color::Gray,
    Color::White,
];

/// Render the scope: grid, waveform in [-1, 1], envelopes in [0, 1]
pub fn render_scope(frame: &mut Frame, area: Rect, display: &DisplayFrame) {
    let block = Block::default().title(" Measure ").borders(Borders::ALL);
    let width = display.width().max(1) as f64;

    let column = |values: &[f32]| -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(x, &v)| (x as f64 / width, v as f64))
            .collect()
    };

    let grid: Vec<(GridLine, [(f64, f64); 2])> = display
        .grid_lines()
        .map(|(x, kind)| (kind, [(x as f64, -1.0), (x as f64, 1.0)]))
        .collect();
    let waveform = column(display.waveform());
    let envelopes: Vec<Vec<(f64, f64)>> = display.envelopes().iter().map(|e| column(e)).collect();

    let mut datasets = Vec::with_capacity(grid.len() + envelopes.len() + 1);
    for (kind, line) in &grid {
        let color = match kind {
            GridLine::Measure => Color::Gray,
            GridLine::Quarter => Color::DarkGray,
            GridLine::Eighth => Color::Black,
        };
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(line),
        );
    }

    datasets.push(
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&waveform),
    );

    for (lane, envelope) in envelopes.iter().enumerate() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(LANE_COLORS[lane % LANE_COLORS.len()]))
                .data(envelope),
        );
    }

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
