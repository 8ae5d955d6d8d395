pub mod progress;

use crate::playback::ScheduledEvent;
use crate::sampling::Draw;

pub fn print_banner() {
    eprintln!("measureplay-rs");
}

/// `[03] 011010  p=0.042` plus the decoded lines, indented
pub fn format_event(event: &ScheduledEvent<String>) -> String {
    let mut out = format!("[{:02}] {}", event.index + 1, format_draw(&event.draw));
    for line in &event.values {
        out.push_str("\n     ");
        out.push_str(line);
    }
    out
}

pub fn format_draw(draw: &Draw) -> String {
    format!("{}  p={:.3}", draw.bitstring, draw.probability())
}

/// One shade character per intensity value
pub fn shade(values: &[u8]) -> String {
    const RAMP: [char; 5] = [' ', '░', '▒', '▓', '█'];
    values
        .iter()
        .map(|&v| RAMP[(v as usize * (RAMP.len() - 1) + 127) / 255])
        .collect()
}
