use std::sync::Arc;

use crate::config::Config;
use crate::notify::{ConfirmSubmit, Notify};

/// Session-scoped context passed to every component constructor.
///
/// Replaces any process-wide mutable state: two sessions never share a
/// context, a timer, or a monitor.
#[derive(Clone)]
pub struct SessionContext {
    pub config: Config,
    pub notifier: Arc<dyn Notify>,
    pub confirm: Arc<dyn ConfirmSubmit>,
}

impl SessionContext {
    pub fn new(
        config: Config,
        notifier: Arc<dyn Notify>,
        confirm: Arc<dyn ConfirmSubmit>,
    ) -> Self {
        Self {
            config,
            notifier,
            confirm,
        }
    }
}
