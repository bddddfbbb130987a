use rivals_discovery::Competitor;
use std::time::{Duration, Instant};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;
use url::Url;

/// Cards shown before the grid is expanded.
pub const INITIAL_VISIBLE: usize = 4;
/// Summary lines per card; longer summaries end in an ellipsis.
pub const SUMMARY_LINES: usize = 3;

const STAGGER_STEP: Duration = Duration::from_millis(200);

/// Competitor grid state: which cards are visible and when they appear.
#[derive(Debug, Clone)]
pub struct CompetitorBoard {
    competitors: Vec<Competitor>,
    expanded: bool,
    shown_at: Instant,
}

impl CompetitorBoard {
    pub fn new(competitors: Vec<Competitor>) -> Self {
        Self::shown_at(competitors, Instant::now())
    }

    pub fn shown_at(competitors: Vec<Competitor>, at: Instant) -> Self {
        Self {
            competitors,
            expanded: false,
            shown_at: at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn visible(&self) -> &[Competitor] {
        if self.expanded {
            &self.competitors
        } else {
            &self.competitors[..self.competitors.len().min(INITIAL_VISIBLE)]
        }
    }

    pub fn has_more(&self) -> bool {
        self.competitors.len() > INITIAL_VISIBLE
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Expand or collapse, replaying the reveal. No-op when everything fits.
    pub fn toggle(&mut self, now: Instant) {
        if !self.has_more() {
            return;
        }
        self.expanded = !self.expanded;
        self.shown_at = now;
    }

    pub fn toggle_label(&self) -> Option<&'static str> {
        self.has_more()
            .then_some(if self.expanded { "Show Less" } else { "Show More" })
    }

    pub fn is_revealed(&self, index: usize, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= reveal_delay(index)
    }

    /// True once every visible card is on screen.
    pub fn settled(&self, now: Instant) -> bool {
        (0..self.visible().len()).all(|i| self.is_revealed(i, now))
    }
}

/// Delay before card `index` appears. Cycles every four cards.
pub fn reveal_delay(index: usize) -> Duration {
    STAGGER_STEP * ((index % INITIAL_VISIBLE) as u32 + 1)
}

/// The card heading: the title, else the bare hostname, else the raw URL.
pub fn display_title(competitor: &Competitor) -> String {
    if !competitor.title.trim().is_empty() {
        return competitor.title.clone();
    }
    Url::parse(&competitor.url)
        .ok()
        .and_then(|u| {
            u.host_str()
                .map(|h| h.strip_prefix("www.").unwrap_or(h).to_string())
        })
        .unwrap_or_else(|| competitor.url.clone())
}

/// Wrap `text` to `width` and keep at most `max_lines`, marking the cut.
pub fn clamp_lines(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines: Vec<String> = wrap(text, width)
        .into_iter()
        .map(|l| l.into_owned())
        .collect();
    if lines.len() <= max_lines {
        return lines;
    }

    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        while !last.is_empty() && UnicodeWidthStr::width(last.as_str()) + 1 > width {
            last.pop();
        }
        last.push('…');
    }
    lines
}
