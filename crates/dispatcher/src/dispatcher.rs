//! CommandDispatcher - configuration gate and command execution

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{Command, CommandOutput, ComponentInitializer, ConfigValidator, Options};
use futures::future::{self, BoxFuture, FutureExt};
use observability::{LogController, Logger};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{CommandError, DispatcherError};
use crate::state::ConfigurationState;

/// Bootstrap command that configures the library
pub const CONFIGURE_COMMAND: &str = "configure";
/// Bootstrap command that toggles logging
pub const LOG_COMMAND: &str = "log";

/// Future returned for every invocation
pub type Invocation = BoxFuture<'static, Result<Value, CommandError>>;

type Outcome = BoxFuture<'static, Result<Value, DispatcherError>>;

/// How a single invocation proceeds after the synchronous part of `execute`
enum Step {
    /// Configuration failed earlier; never settles
    Poisoned,
    Settled(Result<Value, DispatcherError>),
    Running(Outcome),
}

/// Builder for a `CommandDispatcher`
pub struct DispatcherBuilder {
    namespace: String,
    initializer: Arc<dyn ComponentInitializer>,
    log_controller: LogController,
    query_string: Option<String>,
    validators: Vec<ConfigValidator>,
}

impl DispatcherBuilder {
    pub fn new(namespace: impl Into<String>, initializer: impl ComponentInitializer + 'static) -> Self {
        Self {
            namespace: namespace.into(),
            initializer: Arc::new(initializer),
            log_controller: LogController::new(),
            query_string: None,
            validators: config_loader::config_validators(),
        }
    }

    /// Share a logging flag with other collaborators
    pub fn log_controller(mut self, controller: LogController) -> Self {
        self.log_controller = controller;
        self
    }

    /// Location search string consulted for the log override (`?beacon_log=true`)
    pub fn query_string(mut self, search: impl Into<String>) -> Self {
        self.query_string = Some(search.into());
        self
    }

    /// Extra validators applied after the defaults
    pub fn validators(mut self, validators: impl IntoIterator<Item = ConfigValidator>) -> Self {
        self.validators.extend(validators);
        self
    }

    pub fn build(self) -> CommandDispatcher {
        let logger = Logger::new(&self.namespace, self.log_controller);
        observability::record_configuration_state(ConfigurationState::Unconfigured.as_gauge());

        CommandDispatcher {
            namespace: Arc::from(self.namespace),
            initializer: self.initializer,
            logger,
            query_string: self.query_string,
            validators: self.validators,
            state: Mutex::new(ConfigurationState::Unconfigured),
            configuring: AtomicBool::new(false),
        }
    }
}

/// Single entry point for named commands
pub struct CommandDispatcher {
    namespace: Arc<str>,
    initializer: Arc<dyn ComponentInitializer>,
    logger: Logger,
    query_string: Option<String>,
    validators: Vec<ConfigValidator>,
    state: Mutex<ConfigurationState>,
    /// Set by the first `configure`; the state lock is not held while the
    /// initializer runs, so this is what rejects overlapping configures
    configuring: AtomicBool,
}

impl CommandDispatcher {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Snapshot of the configuration state
    pub fn state(&self) -> ConfigurationState {
        self.lock_state().clone()
    }

    pub fn is_configured(&self) -> bool {
        self.lock_state().is_configured()
    }

    /// Execute `name` with `options`
    ///
    /// Resolution and any state change happen before this returns; the
    /// returned future only carries the outcome. Errors are never raised
    /// synchronously. After a failed `configure` the future never settles.
    #[instrument(name = "command_dispatcher_execute", skip(self, options), fields(command = %name))]
    pub fn execute(&self, name: &str, options: Options) -> Invocation {
        self.logger
            .log(&format!("Executing \"{name}\" command."), &options);
        observability::record_command_invoked(name);

        let outcome = match self.dispatch(name, options) {
            Step::Poisoned => {
                debug!("Configuration failed earlier, invocation left pending");
                return future::pending().boxed();
            }
            Step::Settled(result) => future::ready(result).boxed(),
            Step::Running(outcome) => outcome,
        };

        let namespace = Arc::clone(&self.namespace);
        let command = name.to_string();
        async move {
            outcome.await.map_err(|kind| {
                observability::record_command_failed(&command, kind.label());
                warn!(command = %command, error = %kind, "Command failed");
                CommandError::new(namespace.as_ref(), kind)
            })
        }
        .boxed()
    }

    fn dispatch(&self, name: &str, options: Options) -> Step {
        let state = self.lock_state();

        if state.is_failed() {
            return Step::Poisoned;
        }

        match name {
            CONFIGURE_COMMAND => {
                drop(state);
                self.configure(options)
            }
            LOG_COMMAND => {
                self.set_logging(enabled_flag(options.get("enabled")));
                Step::Settled(Ok(Value::Null))
            }
            _ => {
                let registry = match state.registry() {
                    Some(registry) => Arc::clone(registry),
                    None => {
                        return Step::Settled(Err(DispatcherError::unconfigured(
                            self.namespace.as_ref(),
                        )));
                    }
                };
                drop(state);

                match registry.get_command(name) {
                    Some(command) => invoke(name, command, options),
                    None => Step::Settled(Err(DispatcherError::unknown_command(name))),
                }
            }
        }
    }

    /// Runs validation and the initializer without holding the state lock,
    /// so an initializer may call back into `execute`. Nested commands see
    /// the dispatcher as unconfigured; a nested `configure` is rejected.
    #[instrument(name = "command_dispatcher_configure", skip_all)]
    fn configure(&self, options: Options) -> Step {
        {
            let state = self.lock_state();
            if state.is_failed() {
                return Step::Poisoned;
            }
            if state.is_configured() || self.configuring.swap(true, Ordering::SeqCst) {
                return Step::Settled(Err(DispatcherError::AlreadyConfigured));
            }
        }
        Step::Settled(self.initialize(options))
    }

    fn initialize(&self, options: Options) -> Result<Value, DispatcherError> {
        if let Some(log) = options.get("log") {
            self.set_logging(enabled_flag(Some(log)));
        }
        if let Some(enabled) = self
            .query_string
            .as_deref()
            .and_then(config_loader::log_override)
        {
            self.set_logging(enabled);
        }

        let config = config_loader::create_config(options).and_then(|mut config| {
            config.add_validators(self.validators.iter().cloned());
            config.validate().map(|()| config)
        });
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                self.transition(ConfigurationState::Failed);
                return Err(DispatcherError::Configuration(e));
            }
        };

        match self.initializer.initialize(config) {
            Ok(registry) => {
                info!(commands = ?registry.command_names(), "Library configured");
                self.transition(ConfigurationState::Configured(registry));
                Ok(Value::Null)
            }
            Err(e) => {
                self.transition(ConfigurationState::Failed);
                Err(DispatcherError::Initialization(e))
            }
        }
    }

    fn transition(&self, next: ConfigurationState) {
        let mut state = self.lock_state();
        debug!(from = state.label(), to = next.label(), "Configuration state changed");
        observability::record_configuration_state(next.as_gauge());
        *state = next;
    }

    fn set_logging(&self, enabled: bool) {
        self.logger.controller().set_enabled(enabled);
    }

    fn lock_state(&self) -> MutexGuard<'_, ConfigurationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run a resolved command, routing sync errors and failed futures alike
fn invoke(name: &str, command: Command, options: Options) -> Step {
    match command(options) {
        Ok(CommandOutput::Ready(value)) => Step::Settled(Ok(value)),
        Ok(CommandOutput::Pending(fut)) => {
            let name = name.to_string();
            Step::Running(
                async move {
                    fut.await
                        .map_err(|e| DispatcherError::command_execution(name, e))
                }
                .boxed(),
            )
        }
        Err(e) => Step::Settled(Err(DispatcherError::command_execution(name, e))),
    }
}

/// Loose truthiness for the `log` / `enabled` options
fn enabled_flag(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
