use chatbot_core::{Sender, SessionViewModel, GREETING, INPUT_PLACEHOLDER};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{InputFocus, Shell};

const SLOW_CONNECTION_TEXT: &str = "Conexión lenta. El servidor está tardando en responder...";
const HELP_TEXT: &str = "Enter enviar | Ctrl+O adjuntar PDF | Ctrl+X quitar adjunto | Ctrl+C salir";

pub fn render(frame: &mut Frame, view: &SessionViewModel, shell: &Shell) {
    let area = frame.area();
    let [header_area, transcript_area, status_area, input_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_transcript(frame, transcript_area, view);
    render_status(frame, status_area, view, shell);
    render_input(frame, input_area, view, shell);
    render_help(frame, help_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled("Chatbot NICSP", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            " — asistente para consultas sobre NICSP",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_transcript(frame: &mut Frame, area: Rect, view: &SessionViewModel) {
    let block = Block::default().borders(Borders::ALL).title(" Conversación ");
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    if view.messages.is_empty() && !view.busy {
        lines.push(Line::from(Span::styled(
            GREETING,
            Style::default().fg(Color::DarkGray),
        )));
    }
    for message in &view.messages {
        let (label, color) = match message.sender {
            Sender::User => ("Tú:", Color::Cyan),
            Sender::Bot => ("Bot:", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        if let Some(name) = &message.attachment_name {
            lines.push(Line::from(Span::styled(
                format!("[adjunto: {name}]"),
                Style::default().fg(Color::DarkGray),
            )));
        }
        for line in message.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }
    if view.busy {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(view.dots as usize + 1);
        lines.push(Line::from(Span::styled(
            dots,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let scroll = bottom_scroll(&lines, inner_width, inner_height);
    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(transcript, area);
}

/// Scroll offset that keeps the newest line visible after wrapping.
fn bottom_scroll(lines: &[Line], width: u16, height: u16) -> u16 {
    let width = width.max(1) as usize;
    let mut total: u16 = 0;
    for line in lines {
        // Use character count, not byte length, for proper UTF-8 handling
        let chars: usize = line
            .spans
            .iter()
            .map(|span| span.content.chars().count())
            .sum();
        if chars == 0 {
            total += 1;
        } else {
            total += ((chars - 1) / width + 1) as u16;
        }
    }
    total.saturating_sub(height.max(1))
}

fn render_status(frame: &mut Frame, area: Rect, view: &SessionViewModel, shell: &Shell) {
    let line = if let Some(alert) = shell.path_error.as_deref().or(view.alert.as_deref()) {
        Line::from(Span::styled(
            alert.to_string(),
            Style::default().fg(Color::Red),
        ))
    } else if view.slow_connection {
        Line::from(Span::styled(
            SLOW_CONNECTION_TEXT,
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(name) = &view.attachment_name {
        Line::from(Span::styled(
            format!("Adjunto: {name}"),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, area: Rect, view: &SessionViewModel, shell: &Shell) {
    match shell.focus {
        InputFocus::Question => {
            let block = Block::default().borders(Borders::ALL).title(" Pregunta ");
            let text = if view.input.is_empty() {
                Text::from(Span::styled(
                    INPUT_PLACEHOLDER,
                    Style::default().fg(Color::DarkGray),
                ))
            } else {
                Text::from(view.input.as_str())
            };
            frame.render_widget(Paragraph::new(text).block(block), area);
        }
        InputFocus::FilePath => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(" Ruta del PDF (Enter adjunta, Esc cancela) ");
            frame.render_widget(
                Paragraph::new(shell.path_input.as_str()).block(block),
                area,
            );
        }
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            HELP_TEXT,
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}
