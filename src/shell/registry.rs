//! Command registry and dispatcher
//!
//! A flat, case-insensitive namespace of command handlers. Registration
//! order is kept because prefix completion walks names in that order.

/// Handler invoked with the shell context and the argument tokens.
pub type Handler<C> = Box<dyn Fn(&mut C, &[String])>;

pub struct CommandRegistry<C> {
    entries: Vec<(String, Handler<C>)>,
}

impl<C> CommandRegistry<C> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register `handler` under the lowercased `name`.
    ///
    /// Registering an existing name replaces the old handler in place, so the
    /// name keeps its original completion position.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut C, &[String]) + 'static,
    {
        let key = name.to_lowercase();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == key) {
            tracing::debug!(command = %key, "replacing registered handler");
            entry.1 = Box::new(handler);
            return;
        }
        self.entries.push((key, Box::new(handler)));
    }

    /// Route a raw input line to its handler.
    ///
    /// Returns `false` (and does nothing) when the line is blank or no handler
    /// matches the first token.
    pub fn dispatch(&self, ctx: &mut C, input: &str) -> bool {
        let tokens = split_args(input);
        let Some((name, args)) = tokens.split_first() else {
            return false;
        };
        let name = name.to_lowercase();
        match self.entries.iter().find(|(n, _)| *n == name) {
            Some((_, handler)) => {
                tracing::debug!(command = %name, args = args.len(), "dispatch");
                handler(ctx, args);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.entries.iter().any(|(n, _)| *n == name)
    }

    /// Command names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Split on runs of whitespace. No quoting, no operators.
pub fn split_args(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}
