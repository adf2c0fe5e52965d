use std::sync::Arc;

use taskboard_core::AppConfig;

use crate::{
    board_lifecycle::BoardLifecycle, store::EntityStore, ticket_lifecycle::TicketLifecycle,
    user_directory::UserDirectory,
};

/// Entry point bundling the lifecycle managers over one store.
pub struct Taskboard {
    pub boards: BoardLifecycle,
    pub tickets: TicketLifecycle,
    pub users: UserDirectory,
}

impl Taskboard {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self::from_config(store, &AppConfig::default())
    }

    pub fn from_config(store: Arc<dyn EntityStore>, config: &AppConfig) -> Self {
        let atomic_moves = config.effective_atomic_moves();
        Self {
            boards: BoardLifecycle::new(store.clone()).with_atomic_moves(atomic_moves),
            tickets: TicketLifecycle::new(store.clone())
                .with_atomic_moves(atomic_moves)
                .with_default_page_size(config.effective_page_size()),
            users: UserDirectory::new(store),
        }
    }
}
