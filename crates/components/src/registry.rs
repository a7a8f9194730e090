//! ComponentRegistry - command lookup table

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{Command, CommandOutput, CommandRegistry, ContractError, Options};

/// Name → command table built during `configure`
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    commands: HashMap<String, Command>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, command: Command) -> &mut Self {
        self.commands.insert(name.into(), command);
        self
    }

    /// Register a closure as a command
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Options) -> Result<CommandOutput, ContractError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(f))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandRegistry for ComponentRegistry {
    fn get_command(&self, name: &str) -> Option<Command> {
        self.commands.get(name).cloned()
    }

    fn command_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("commands", &self.command_names())
            .finish()
    }
}
