use crate::{
    board::{CompetitorBoard, SUMMARY_LINES, clamp_lines, display_title},
    styles,
    summary::SummaryItem,
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::time::Instant;
use textwrap::wrap;

// Borders, the link line and the clamped summary.
const CARD_HEIGHT: u16 = 2 + 1 + SUMMARY_LINES as u16;

pub struct ViewSnap<'a> {
    pub summary: &'a [SummaryItem],
    pub board: &'a CompetitorBoard,
    pub scroll: usize,
    pub now: Instant,
}

pub fn draw(frame: &mut Frame, snap: &ViewSnap) {
    let area = frame.area();

    let summary = summary_lines(snap.summary, area.width.saturating_sub(2) as usize);
    let summary_h = if summary.is_empty() {
        0
    } else {
        (summary.len() as u16 + 2).min(area.height / 2)
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(summary_h),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(" Rivals ", styles::header())));
    frame.render_widget(header, layout[0]);

    if summary_h > 0 {
        let body = Paragraph::new(summary)
            .block(Block::default().borders(Borders::ALL).title(" Company Summary "));
        frame.render_widget(body, layout[1]);
    }

    if !snap.board.is_empty() {
        draw_grid(frame, layout[2], snap);
    }

    frame.render_widget(Paragraph::new(hints(snap.board)), layout[3]);
}

fn summary_lines(items: &[SummaryItem], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut out = Vec::new();

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(Line::from(Span::styled("─".repeat(width), styles::dim())));
        }
        let (icon, title) = item.split_heading();
        out.push(Line::from(vec![
            Span::styled(icon.to_string(), styles::icon()),
            Span::raw(" "),
            Span::styled(title.to_string(), styles::heading()),
        ]));
        for seg in wrap(&item.text, width) {
            out.push(Line::from(Span::styled(seg.into_owned(), styles::value())));
        }
    }

    out
}

fn draw_grid(frame: &mut Frame, area: Rect, snap: &ViewSnap) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Similar Companies ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let board = snap.board;
    let (cards_area, toggle_area) = match board.toggle_label() {
        Some(_) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(inner);
            (split[0], Some(split[1]))
        }
        None => (inner, None),
    };

    let bottom = cards_area.y + cards_area.height;
    let mut y = cards_area.y;
    for (row, pair) in board.visible().chunks(2).enumerate().skip(snap.scroll) {
        if y + CARD_HEIGHT > bottom {
            break;
        }
        let row_area = Rect::new(cards_area.x, y, cards_area.width, CARD_HEIGHT);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row_area);

        for (col, competitor) in pair.iter().enumerate() {
            let index = row * 2 + col;
            if !board.is_revealed(index, snap.now) {
                continue;
            }
            let card_area = cols[col];
            let text_width = card_area.width.saturating_sub(2) as usize;

            let mut lines = vec![Line::from(Span::styled(
                competitor.url.clone(),
                styles::link(),
            ))];
            lines.extend(
                clamp_lines(&competitor.summary, text_width, SUMMARY_LINES)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, styles::value()))),
            );

            let card = Paragraph::new(lines).block(
                Block::default().borders(Borders::ALL).title(Span::styled(
                    format!(" {} ", display_title(competitor)),
                    styles::card_title(),
                )),
            );
            frame.render_widget(card, card_area);
        }
        y += CARD_HEIGHT;
    }

    if let (Some(area), Some(label)) = (toggle_area, board.toggle_label()) {
        let toggle = Paragraph::new(Line::from(Span::styled(
            format!("[ {label} ]"),
            styles::toggle(),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(toggle, area);
    }
}

fn hints(board: &CompetitorBoard) -> Line<'static> {
    let mut spans = vec![Span::styled(" q quit", styles::dim())];
    if let Some(label) = board.toggle_label() {
        spans.push(Span::styled(format!(" • m {}", label.to_lowercase()), styles::dim()));
    }
    spans.push(Span::styled(" • ↑/↓ scroll", styles::dim()));
    Line::from(spans)
}
