mod app;
mod board;
mod styles;
mod summary;
mod view;

pub use app::{Screen, run};
pub use board::{CompetitorBoard, display_title, reveal_delay};
pub use summary::SummaryItem;
