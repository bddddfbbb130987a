use crate::{
    board::CompetitorBoard,
    summary::SummaryItem,
    view::{self, ViewSnap},
};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rivals_discovery::Competitor;
use std::{
    io::{self, Stdout},
    time::{Duration, Instant},
};

const TICK_RATE: Duration = Duration::from_millis(50);

/// Interactive state behind the results screen.
pub struct Screen {
    summary: Vec<SummaryItem>,
    board: CompetitorBoard,
    scroll: usize,
    quit: bool,
}

impl Screen {
    pub fn new(summary: Vec<SummaryItem>, competitors: Vec<Competitor>) -> Self {
        Self {
            summary,
            board: CompetitorBoard::new(competitors),
            scroll: 0,
            quit: false,
        }
    }

    pub fn board(&self) -> &CompetitorBoard {
        &self.board
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Apply a key press. Returns whether anything changed.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), _)
            | (KeyCode::Esc, _) => {
                self.quit = true;
                true
            }
            (KeyCode::Char('m'), _) | (KeyCode::Char(' '), _) => {
                if !self.board.has_more() {
                    return false;
                }
                self.board.toggle(now);
                self.scroll = self.scroll.min(self.max_scroll());
                true
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                let before = self.scroll;
                self.scroll = self.scroll.saturating_sub(1);
                before != self.scroll
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                let before = self.scroll;
                self.scroll = (self.scroll + 1).min(self.max_scroll());
                before != self.scroll
            }
            _ => false,
        }
    }

    fn max_scroll(&self) -> usize {
        self.board.visible().len().div_ceil(2).saturating_sub(1)
    }

    fn snap(&self, now: Instant) -> ViewSnap<'_> {
        ViewSnap {
            summary: &self.summary,
            board: &self.board,
            scroll: self.scroll,
            now,
        }
    }
}

/// Show the company summary and competitor grid until the user quits.
pub fn run(summary: Vec<SummaryItem>, competitors: Vec<Competitor>) -> Result<()> {
    let mut term = enter()?;
    let result = event_loop(&mut term, Screen::new(summary, competitors));
    leave(&mut term);
    result
}

fn event_loop(term: &mut Terminal<CrosstermBackend<Stdout>>, mut screen: Screen) -> Result<()> {
    let mut dirty = true;
    while !screen.should_quit() {
        let now = Instant::now();
        // Keep drawing while cards are still being revealed.
        if dirty || !screen.board().settled(now) {
            term.draw(|frame| view::draw(frame, &screen.snap(now)))?;
            dirty = false;
        }

        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    dirty |= screen.handle_key(key, Instant::now());
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}

fn enter() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;
    term.clear()?;
    Ok(term)
}

fn leave(term: &mut Terminal<CrosstermBackend<Stdout>>) {
    disable_raw_mode().ok();
    let _ = execute!(term.backend_mut(), LeaveAlternateScreen);
    let _ = term.show_cursor();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn competitors(n: usize) -> Vec<Competitor> {
        (0..n)
            .map(|i| Competitor {
                title: format!("C{i}"),
                url: format!("https://c{i}.test"),
                summary: "s".into(),
            })
            .collect()
    }

    #[test]
    fn m_and_space_toggle_the_grid() {
        let now = Instant::now();
        let mut screen = Screen::new(Vec::new(), competitors(9));

        assert!(screen.handle_key(key(KeyCode::Char('m')), now));
        assert!(screen.board().is_expanded());
        assert!(screen.handle_key(key(KeyCode::Char(' ')), now));
        assert!(!screen.board().is_expanded());
    }

    #[test]
    fn toggle_is_ignored_when_nothing_is_hidden() {
        let mut screen = Screen::new(Vec::new(), competitors(3));
        assert!(!screen.handle_key(key(KeyCode::Char('m')), Instant::now()));
        assert!(!screen.board().is_expanded());
    }

    #[test]
    fn scrolling_stays_within_the_visible_rows() {
        let now = Instant::now();
        let mut screen = Screen::new(Vec::new(), competitors(10));
        screen.handle_key(key(KeyCode::Down), now);
        assert_eq!(screen.scroll(), 1);
        assert!(!screen.handle_key(key(KeyCode::Down), now));

        screen.handle_key(key(KeyCode::Char('m')), now);
        for _ in 0..10 {
            screen.handle_key(key(KeyCode::Down), now);
        }
        assert_eq!(screen.scroll(), 4);

        // Collapsing pulls the scroll back into range.
        screen.handle_key(key(KeyCode::Char('m')), now);
        assert_eq!(screen.scroll(), 1);
    }

    #[test]
    fn q_and_esc_quit() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut screen = Screen::new(Vec::new(), Vec::new());
            screen.handle_key(key(code), Instant::now());
            assert!(screen.should_quit());
        }
    }
}
