use ratatui::Frame;
use ratatui::layout::{Alignment as TextAlignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{Focus, MessageType, OpenTranscript, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::format_timestamp;
use crate::catalog::group_by_folder;
use crate::classifier::Alignment;
use crate::models::FileDescriptor;
use crate::utils::{folder_label, format_file_size, sanitize_line};

const ACCENT: Color = Color::Rgb(16, 185, 129);
const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ERROR: Color = Color::Rgb(239, 68, 68);
const BAR_BG: Color = Color::Rgb(24, 24, 27);

/// Everything one frame needs, borrowed from the app
pub struct RenderState<'a> {
    pub query: &'a str,
    /// Filtered descriptors in catalog order
    pub files: &'a [&'a FileDescriptor],
    pub total_count: usize,
    pub selected_idx: usize,
    pub focus: Focus,
    pub open: Option<&'a OpenTranscript>,
    pub pending_delete: Option<&'a FileDescriptor>,
    pub scanning: bool,
    pub last_error: Option<&'a str>,
    pub show_sidechains: bool,
    pub status_message: Option<&'a StatusMessage>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_search(frame, layout.search_area, state);
    render_file_list(frame, layout.list_area, state);
    render_conversation(frame, layout.conversation_area, state);
    render_status_bar(frame, layout.status_area, state);

    if let Some(file) = state.pending_delete {
        render_delete_prompt(frame, file);
    }
}

fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { ACCENT } else { MUTED })
}

fn render_search(frame: &mut Frame, area: Rect, state: &RenderState) {
    let text = if state.query.is_empty() {
        Line::from(Span::styled("type to search", Style::default().fg(MUTED)))
    } else {
        Line::from(sanitize_line(state.query))
    };
    let paragraph = Paragraph::new(text).block(
        Block::default().borders(Borders::ALL).border_style(border_style(false)).title(" Search "),
    );
    frame.render_widget(paragraph, area);
}

/// List rows with a header per folder; returns the row of the selected file
pub(crate) fn file_list_rows<'a>(
    files: &[&'a FileDescriptor],
    selected_idx: usize,
) -> (Vec<ListItem<'a>>, Option<usize>) {
    let mut rows = Vec::new();
    let mut selected_row = None;
    let mut file_idx = 0;

    for group in group_by_folder(files.iter().copied()) {
        let header = format!("{} ({})", sanitize_line(&folder_label(group.folder)), group.files.len());
        rows.push(ListItem::new(Line::from(Span::styled(
            header,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))));

        for file in group.files {
            if file_idx == selected_idx {
                selected_row = Some(rows.len());
            }
            let line = Line::from(vec![
                Span::raw("  "),
                Span::raw(sanitize_line(file.label())),
                Span::styled(
                    format!("  {} · {}", format_timestamp(file.last_modified_ms), format_file_size(file.size_bytes)),
                    Style::default().fg(MUTED),
                ),
            ]);
            rows.push(ListItem::new(line));
            file_idx += 1;
        }
    }

    (rows, selected_row)
}

fn render_file_list(frame: &mut Frame, area: Rect, state: &RenderState) {
    let title = format!(" Transcripts {}/{} ", state.files.len(), state.total_count);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(state.focus == Focus::List))
        .title(title);

    if state.files.is_empty() {
        let message = if state.scanning {
            "Scanning…"
        } else if state.total_count == 0 {
            "No transcripts found"
        } else {
            "No matches"
        };
        let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(MUTED))).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let (rows, selected_row) = file_list_rows(state.files, state.selected_idx);
    let list = List::new(rows).block(block).highlight_style(
        Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD),
    );
    let mut list_state = ListState::default();
    list_state.select(selected_row);
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Conversation text: a label line per record, then its lines, then a blank line
pub(crate) fn conversation_text(open: &OpenTranscript) -> Text<'static> {
    let mut lines = Vec::new();
    for outline in &open.outlines {
        let alignment = match outline.alignment {
            Alignment::Start => TextAlignment::Left,
            Alignment::End => TextAlignment::Right,
        };
        let label_style = if outline.is_error {
            Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        };

        lines.push(Line::from(Span::styled(sanitize_line(&outline.label), label_style)).alignment(alignment));
        for text in &outline.lines {
            lines.push(Line::from(sanitize_line(text)).alignment(alignment));
        }
        lines.push(Line::from(""));
    }
    Text::from(lines)
}

fn render_conversation(frame: &mut Frame, area: Rect, state: &RenderState) {
    let focused = state.focus == Focus::Conversation;
    let Some(open) = state.open else {
        let paragraph = Paragraph::new(Span::styled(
            "Select a transcript and press Enter",
            Style::default().fg(MUTED),
        ))
        .block(Block::default().borders(Borders::ALL).border_style(border_style(focused)).title(" Conversation "));
        frame.render_widget(paragraph, area);
        return;
    };

    let mut title = format!(" {} · {} messages", sanitize_line(&open.title), open.thread.message_count());
    if open.thread.error_count() > 0 {
        title.push_str(&format!(" · {} unparsed", open.thread.error_count()));
    }
    if state.show_sidechains {
        title.push_str(" · side-chains");
    }
    title.push(' ');

    let paragraph = Paragraph::new(conversation_text(open))
        .block(Block::default().borders(Borders::ALL).border_style(border_style(focused)).title(title))
        .wrap(Wrap { trim: false })
        .scroll((open.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn status_line(state: &RenderState) -> (String, Style) {
    let base = Style::default().fg(BRIGHT).bg(BAR_BG);

    if let Some(message) = state.status_message {
        let style = match message.message_type {
            MessageType::Success => base,
            MessageType::Error => base.fg(ERROR),
        };
        return (format!(" {} ", sanitize_line(&message.text)), style);
    }
    if state.pending_delete.is_some() {
        return (" Delete this transcript? y: delete | any other key: cancel ".to_string(), base.fg(ERROR));
    }
    if state.scanning {
        return (" Scanning… ".to_string(), base);
    }
    if let Some(error) = state.last_error {
        return (format!(" [ERROR] {} ", sanitize_line(error)), base.fg(ERROR));
    }

    let mut parts = Vec::new();
    if state.files.len() < state.total_count {
        parts.push(format!("{}/{} shown", state.files.len(), state.total_count));
    } else {
        parts.push(format!("{} transcripts", state.total_count));
    }
    parts.push("Enter: open".to_string());
    parts.push("Tab: focus".to_string());
    parts.push("Ctrl+R: refresh".to_string());
    parts.push("Ctrl+D: delete".to_string());
    parts.push("Ctrl+S: side-chains".to_string());
    parts.push("Esc: back".to_string());
    (format!(" {} ", parts.join(" | ")), base)
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (text, style) = status_line(state);
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height), Constraint::Fill(1)])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(width), Constraint::Fill(1)])
        .split(vertical[1])[1]
}

fn render_delete_prompt(frame: &mut Frame, file: &FileDescriptor) {
    let area = centered(frame.area(), 60, 5);
    let text = Text::from(vec![
        Line::from(sanitize_line(&file.path)),
        Line::from(""),
        Line::from(Span::styled("y: delete   any other key: cancel", Style::default().fg(MUTED))),
    ]);
    let paragraph = Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ERROR))
            .title(" Delete transcript? "),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}
