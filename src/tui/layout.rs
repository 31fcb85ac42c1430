use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Browser layout: search box above the transcript list on the left,
/// conversation on the right, status bar along the bottom
pub struct AppLayout {
    pub search_area: Rect,
    pub list_area: Rect,
    pub conversation_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(vertical_chunks[0]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(horizontal_chunks[0]);

        Self {
            search_area: left_chunks[0],
            list_area: left_chunks[1],
            conversation_area: horizontal_chunks[1],
            status_area: vertical_chunks[1],
        }
    }
}
