//! Action router: the boundary between resolution and execution
//!
//! Handlers live here, outside the engine. A resolved action with no
//! handler passes through exactly like an unbound chord, which lets the
//! host keep side paths (terminal clipboard) outside the router.

use std::collections::HashMap;
use std::fmt;

use super::command::Action;

type Handler = Box<dyn FnMut(&Action) + Send>;

/// What the router did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A registered handler ran
    Handled(Action),
    /// Nothing handled it; forward the key event to the next handler
    PassThrough,
}

#[derive(Default)]
pub struct ActionRouter {
    handlers: HashMap<Action, Handler>,
}

impl ActionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the action
    pub fn register<F>(&mut self, action: Action, handler: F)
    where
        F: FnMut(&Action) + Send + 'static,
    {
        if self.handlers.insert(action.clone(), Box::new(handler)).is_some() {
            tracing::debug!("Replaced handler for {}", action);
        }
    }

    pub fn unregister(&mut self, action: &Action) -> bool {
        self.handlers.remove(action).is_some()
    }

    pub fn is_registered(&self, action: &Action) -> bool {
        self.handlers.contains_key(action)
    }

    /// Run the handler for a resolved action, if one is registered
    pub fn dispatch(&mut self, resolved: Option<&Action>) -> Dispatch {
        let Some(action) = resolved else {
            return Dispatch::PassThrough;
        };

        match self.handlers.get_mut(action) {
            Some(handler) => {
                tracing::debug!("Dispatching {}", action);
                handler(action);
                Dispatch::Handled(action.clone())
            }
            None => {
                tracing::debug!("No handler for {}, passing through", action);
                Dispatch::PassThrough
            }
        }
    }
}

impl fmt::Debug for ActionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&str> = self.handlers.keys().map(Action::as_str).collect();
        actions.sort_unstable();
        f.debug_struct("ActionRouter")
            .field("handlers", &actions)
            .finish()
    }
}
