use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use log::debug;

/// Something registered with the host that has to be released on teardown.
pub trait Disposable: Send {
    fn dispose(self: Box<Self>);
}

/// Teardown list. Everything pushed here is released together, newest first.
#[derive(Default)]
pub struct Subscriptions {
    items: Vec<Box<dyn Disposable>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<D: Disposable + 'static>(&mut self, item: D) {
        self.items.push(Box::new(item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn dispose_all(&mut self) {
        while let Some(item) = self.items.pop() {
            item.dispose();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Command,
    Formatter,
}

/// Commands and formatters currently registered. Requests for anything not in here are refused.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Mutex<HashSet<(Kind, String)>>,
}

/// Handle returned by [`Registry`]; disposing it removes the registration.
#[derive(Debug)]
pub struct Registration {
    registry: Arc<Registry>,
    kind: Kind,
    name: String,
}

impl Registry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn insert(self: &Arc<Self>, kind: Kind, name: &str) -> Registration {
        debug!("registering {kind:?} {name}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((kind, name.to_owned()));
        Registration {
            registry: Arc::clone(self),
            kind,
            name: name.to_owned(),
        }
    }

    fn contains(&self, kind: Kind, name: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(kind, name.to_owned()))
    }

    pub fn register_command(self: &Arc<Self>, id: &str) -> Registration {
        self.insert(Kind::Command, id)
    }

    /// Registers a document formatter for a language id.
    pub fn register_formatter(self: &Arc<Self>, language_id: &str) -> Registration {
        self.insert(Kind::Formatter, language_id)
    }

    pub fn has_command(&self, id: &str) -> bool {
        self.contains(Kind::Command, id)
    }

    pub fn formats(&self, language_id: &str) -> bool {
        self.contains(Kind::Formatter, language_id)
    }

    pub fn commands(&self) -> Vec<String> {
        let mut commands: Vec<String> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(kind, _)| *kind == Kind::Command)
            .map(|(_, name)| name.clone())
            .collect();
        commands.sort();
        commands
    }
}

impl Disposable for Registration {
    fn dispose(self: Box<Self>) {
        debug!("disposing {:?} {}", self.kind, self.name);
        self.registry
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(self.kind, self.name.clone()));
    }
}
