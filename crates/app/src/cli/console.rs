//! Terminal rendering and navigation.

use std::{
    error::Error,
    sync::{Arc, Mutex, PoisonError},
};

use hitea_app::navigation::{Navigator, Route};
use tracing::debug;

/// Remembers where the last action wanted to send the user.
#[derive(Debug, Default)]
pub(crate) struct ConsoleNavigator {
    last: Mutex<Option<Route>>,
}

impl ConsoleNavigator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn last_route(&self) -> Option<Route> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        debug!(path = route.path(), "navigate");

        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }
}

/// `error` and its sources, outermost first.
pub(crate) fn describe(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

pub(crate) fn price(amount: u64) -> String {
    format!("{amount} Ft")
}
