use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::GameConfig;
use crate::game::{GameSession, HandPicker, SessionRanges};
use crate::sheets::SheetStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SheetStore>,
    /// Held for the duration of a round or reload; a second request while it
    /// is held gets 409.
    pub session: Arc<Mutex<GameSession>>,
}

impl AppState {
    pub fn new(store: Arc<dyn SheetStore>, picker: Box<dyn HandPicker>, game: &GameConfig) -> Self {
        let ranges = SessionRanges {
            history: game.history_range.clone(),
            append: game.append_range.clone(),
        };
        let session = GameSession::new(store.clone(), picker, ranges);
        Self {
            store,
            session: Arc::new(Mutex::new(session)),
        }
    }
}
