//! DefaultInitializer - builds the default command set from a validated config

use std::sync::{Arc, Mutex, PoisonError};

use contracts::{
    Command, CommandOutput, CommandRegistry, ComponentInitializer, Config, ContractError,
    DestinationBatch, Dom, Options,
};
use destinations::{DestinationPipeline, FrameFireExecutorFactory, PipelineBuilder};
use observability::Logger;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::personalization::actions::{set_html, ActionSettings, Collect, RenderEvent};
use crate::personalization::{hide_elements, show_elements};
use crate::registry::ComponentRegistry;

pub const COMMAND_EVENT: &str = "event";
pub const COMMAND_APPLY_PERSONALIZATION: &str = "applyPersonalization";
pub const COMMAND_DESTINATIONS_FIRED: &str = "destinationsFired";

/// Wires the destination pipeline and registers the default commands
pub struct DefaultInitializer<D> {
    dom: Arc<D>,
    logger: Logger,
}

impl<D> DefaultInitializer<D>
where
    D: Dom + Sync + 'static,
{
    pub fn new(dom: Arc<D>, logger: Logger) -> Self {
        Self { dom, logger }
    }
}

impl<D> ComponentInitializer for DefaultInitializer<D>
where
    D: Dom + Sync + 'static,
{
    #[instrument(name = "default_initializer_initialize", skip_all)]
    fn initialize(&self, config: Config) -> Result<Arc<dyn CommandRegistry>, ContractError> {
        let property_id = config
            .property_id()
            .ok_or_else(|| ContractError::initialization("propertyID missing after validation"))?
            .to_string();

        let pipeline = PipelineBuilder::new(
            Arc::clone(&self.dom),
            FrameFireExecutorFactory::new(Arc::clone(&self.dom)),
            self.logger.clone(),
        )
        .spawn()
        .map_err(|e| ContractError::initialization(e.to_string()))?;
        let pipeline = Arc::new(pipeline);

        let mut registry = ComponentRegistry::new();
        registry
            .register(COMMAND_EVENT, event_command(Arc::clone(&pipeline), property_id.clone()))
            .register(
                COMMAND_APPLY_PERSONALIZATION,
                apply_personalization_command(Arc::clone(&self.dom)),
            )
            .register(COMMAND_DESTINATIONS_FIRED, destinations_fired_command(pipeline));

        info!(property_id = %property_id, commands = registry.len(), "Components initialized");
        Ok(Arc::new(registry))
    }
}

#[derive(Debug, Deserialize)]
struct EventOptions {
    #[serde(default)]
    destinations: DestinationBatch,
}

/// `event`: queue the event's destinations on the pipeline
fn event_command(pipeline: Arc<DestinationPipeline>, property_id: String) -> Command {
    Arc::new(move |options: Options| {
        let options: EventOptions = parse_options(COMMAND_EVENT, options)?;
        let queued = options.destinations.len();
        if !options.destinations.is_empty() {
            pipeline.fire(options.destinations);
        }
        Ok(CommandOutput::ready(json!({
            "propertyID": property_id,
            "destinationsQueued": queued,
        })))
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonalizationOptions {
    selector: String,
    #[serde(flatten)]
    settings: ActionSettings,
    #[serde(default)]
    prehiding_selector: Option<String>,
}

/// `applyPersonalization`: wait for the target, render, report metadata
fn apply_personalization_command<D>(dom: Arc<D>) -> Command
where
    D: Dom + Sync + 'static,
{
    Arc::new(move |options: Options| {
        let options: PersonalizationOptions =
            parse_options(COMMAND_APPLY_PERSONALIZATION, options)?;
        if let Some(selector) = &options.prehiding_selector {
            hide_elements(dom.as_ref(), selector)?;
        }

        let dom = Arc::clone(&dom);
        Ok(CommandOutput::pending(async move {
            let result = render_personalization(Arc::clone(&dom), &options).await;
            if let (Err(e), Some(selector)) = (&result, &options.prehiding_selector) {
                // Content will never render, so the hidden elements must come back
                if let Err(cleanup) = show_elements(dom.as_ref(), selector) {
                    warn!(selector = %selector, error = %cleanup, "Prehiding style not removed");
                }
                warn!(selector = %options.selector, error = %e, "Personalization not applied");
            }
            result
        }))
    })
}

async fn render_personalization<D>(
    dom: Arc<D>,
    options: &PersonalizationOptions,
) -> Result<Value, ContractError>
where
    D: Dom + Sync + 'static,
{
    let elements = dom.await_selector(&options.selector).await?;

    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    let collect: Collect = Arc::new(move |meta: Value| {
        sink.lock().unwrap_or_else(PoisonError::into_inner).push(meta)
    });
    let action = set_html(dom, collect);

    for element in elements {
        let event = RenderEvent {
            element,
            prehiding_selector: options.prehiding_selector.clone(),
        };
        action(&options.settings, &event)?;
    }

    let collected = collected
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Ok(Value::Array(collected))
}

/// `destinationsFired`: settles once the pipeline reports completion
fn destinations_fired_command(pipeline: Arc<DestinationPipeline>) -> Command {
    Arc::new(move |_options: Options| {
        let completed = pipeline.firing_completed();
        Ok(CommandOutput::pending(async move {
            completed.await;
            Ok(Value::Null)
        }))
    })
}

fn parse_options<T: serde::de::DeserializeOwned>(
    command: &str,
    options: Options,
) -> Result<T, ContractError> {
    let options = match options {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(options).map_err(|e| ContractError::invalid_options(command, e.to_string()))
}
