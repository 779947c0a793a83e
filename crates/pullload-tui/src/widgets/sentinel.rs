use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use pullload_core::{Axis, ScrollHost, SentinelFrame};

use super::pull_load_view::{Indicator, PullLoadView};
use crate::host::ListHost;

pub struct SentinelWidget;

impl SentinelWidget {
    /// Draw `view` inside the list viewport `area`, if any of it is visible
    pub fn render(frame: &mut Frame, area: Rect, host: &ListHost, view: &PullLoadView) {
        let Some(sentinel) = view.frame() else {
            return;
        };
        let Some(target) = project(&sentinel, host, area) else {
            return;
        };

        let style = match view.indicator() {
            Indicator::Loading => Style::default().fg(Color::Yellow),
            Indicator::Pulling { past_threshold: true } => {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            }
            Indicator::Pulling { past_threshold: false } => Style::default().fg(Color::Gray),
            Indicator::Idle => Style::default().fg(Color::DarkGray),
        };

        let lines = match host.axis() {
            Axis::Vertical => {
                let glyph = view.glyph();
                let budget = (target.width as usize).saturating_sub(glyph.width() + 1);
                let message = truncate(&view.message(), budget);
                vec![Line::from(vec![
                    Span::styled(glyph, style),
                    Span::raw(" "),
                    Span::styled(message, style),
                ])]
            }
            // Strips are too narrow for the label.
            Axis::Horizontal => vec![Line::from(Span::styled(view.glyph(), style))],
        };

        let top_pad = target.height.saturating_sub(lines.len() as u16) / 2;
        let mut padded = vec![Line::default(); top_pad as usize];
        padded.extend(lines);

        let paragraph = Paragraph::new(padded).alignment(Alignment::Center);
        frame.render_widget(paragraph, target);
    }
}

/// Screen cells covered by a sentinel, clipped to the list viewport
pub fn project(sentinel: &SentinelFrame, host: &ListHost, area: Rect) -> Option<Rect> {
    if sentinel.hidden {
        return None;
    }
    let axis = host.axis();
    let start = sentinel.rect.origin.along(axis) - host.content_offset().along(axis);
    let end = start + sentinel.rect.size.along(axis);

    let limit = match axis {
        Axis::Vertical => area.height,
        Axis::Horizontal => area.width,
    } as f64;
    let first = start.max(0.0).round();
    let last = end.min(limit).round();
    if last <= first {
        return None;
    }

    let offset = first as u16;
    let span = (last - first) as u16;
    Some(match axis {
        Axis::Vertical => Rect::new(area.x, area.y + offset, area.width, span),
        Axis::Horizontal => Rect::new(area.x + offset, area.y, span, area.height),
    })
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}
