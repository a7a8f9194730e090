//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Contract snapshot tests
//! - End to end: dispatcher → components → destinations → MemoryDom

#[cfg(test)]
mod contract_tests {
    use serde_json::json;

    #[test]
    fn test_default_validators_registered() {
        let fields: Vec<_> = config_loader::config_validators()
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["propertyID", "edgeDomain"]);
    }

    #[test]
    fn test_destination_batch_is_opaque() {
        let batch: contracts::DestinationBatch =
            serde_json::from_value(json!([{ "anything": true }, 42])).unwrap();
        assert_eq!(batch.len(), 2);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use components::{
        ComponentRegistry, DefaultInitializer, COMMAND_APPLY_PERSONALIZATION,
        COMMAND_DESTINATIONS_FIRED, COMMAND_EVENT,
    };
    use contracts::{
        CommandOutput, CommandRegistry, Config, ContractError, DestinationBatch, Dom,
    };
    use destinations::{
        Deferred, FireContext, FireDestinationsFactory, FrameFireExecutor,
        FrameFireExecutorFactory, PipelineBuilder, IFRAME_TAG,
    };
    use dispatcher::{CommandDispatcher, DispatcherBuilder, DispatcherError};
    use dom::MemoryDom;
    use observability::{LogController, Logger};
    use serde_json::{json, Value};
    use tokio::time::{sleep, timeout};

    const SETTLE_WINDOW: Duration = Duration::from_millis(100);

    fn sdk(dom: &Arc<MemoryDom>, controller: LogController) -> CommandDispatcher {
        let initializer =
            DefaultInitializer::new(Arc::clone(dom), Logger::new("beacon", controller.clone()));
        DispatcherBuilder::new("beacon", initializer)
            .log_controller(controller)
            .build()
    }

    /// configure → custom command → second configure
    #[tokio::test]
    async fn test_e2e_configure_execute_reconfigure() {
        let dispatcher = DispatcherBuilder::new(
            "beacon",
            |config: Config| -> Result<Arc<dyn CommandRegistry>, ContractError> {
                let property_id = config.property_id().unwrap_or_default().to_string();
                let mut registry = ComponentRegistry::new();
                registry.register_fn("someCommand", move |options| {
                    Ok(CommandOutput::ready(json!({
                        "propertyID": property_id,
                        "x": options["x"],
                    })))
                });
                Ok(Arc::new(registry))
            },
        )
        .build();

        dispatcher
            .execute("configure", json!({ "propertyID": "p1" }))
            .await
            .unwrap();

        let result = dispatcher
            .execute("someCommand", json!({ "x": 1 }))
            .await
            .unwrap();
        assert_eq!(result, json!({ "propertyID": "p1", "x": 1 }));

        let err = dispatcher
            .execute("configure", json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[beacon] The library has already been configured and may only be configured once."
        );
    }

    /// Early events queue until the body exists, then fire through one frame
    #[tokio::test]
    async fn test_e2e_destinations_fire_after_body_appears() {
        let dom = Arc::new(MemoryDom::new());
        let dispatcher = sdk(&dom, LogController::new());

        dispatcher
            .execute("configure", json!({ "propertyID": "p1", "log": true }))
            .await
            .unwrap();

        for url in ["https://a.test/1", "https://a.test/2"] {
            let result = dispatcher
                .execute(
                    COMMAND_EVENT,
                    json!({ "destinations": [{ "type": "url", "url": url }] }),
                )
                .await
                .unwrap();
            assert_eq!(result["destinationsQueued"], 1);
        }

        let fired = tokio::spawn(dispatcher.execute(COMMAND_DESTINATIONS_FIRED, Value::Null));
        sleep(Duration::from_millis(20)).await;
        assert_eq!(dom.created_count(IFRAME_TAG), 0);
        assert!(!fired.is_finished());

        dom.attach_body();

        timeout(Duration::from_secs(1), fired)
            .await
            .expect("destinations should fire once the body exists")
            .unwrap()
            .unwrap();

        sleep(Duration::from_millis(20)).await;
        assert_eq!(dom.created_count(IFRAME_TAG), 1);
        assert_eq!(dom.created_count("IMG"), 2);
        assert!(dom.query_selector_all(IFRAME_TAG).is_empty());
        assert_eq!(dom.removed_count(), 1);
    }

    /// A failed configure leaves every later call pending
    #[tokio::test]
    async fn test_e2e_failed_configure_poisons() {
        let dom = Arc::new(MemoryDom::with_body());
        let dispatcher = sdk(&dom, LogController::new());

        let err = dispatcher
            .execute("configure", json!({ "propertyID": "" }))
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), DispatcherError::Configuration(_)));
        assert!(err.to_string().starts_with("[beacon] "));

        for name in [COMMAND_EVENT, "configure", "log", "missing"] {
            let invocation = dispatcher.execute(name, json!({}));
            assert!(
                timeout(SETTLE_WINDOW, invocation).await.is_err(),
                "{name} settled on a poisoned dispatcher"
            );
        }
        assert_eq!(dom.created_count(IFRAME_TAG), 0);
    }

    /// `beacon_log` in the query string beats the `log` option
    #[tokio::test]
    async fn test_e2e_query_string_log_override() {
        let dom = Arc::new(MemoryDom::with_body());
        let controller = LogController::new();
        let initializer =
            DefaultInitializer::new(Arc::clone(&dom), Logger::new("beacon", controller.clone()));
        let dispatcher = DispatcherBuilder::new("beacon", initializer)
            .log_controller(controller.clone())
            .query_string("?beacon_log=true")
            .build();

        dispatcher
            .execute("configure", json!({ "propertyID": "p1", "log": false }))
            .await
            .unwrap();
        assert!(controller.is_enabled());

        dispatcher
            .execute("log", json!({ "enabled": false }))
            .await
            .unwrap();
        assert!(!controller.is_enabled());
    }

    /// Personalization waits for its target and reports metadata
    #[tokio::test]
    async fn test_e2e_apply_personalization() {
        let dom = Arc::new(MemoryDom::with_body());
        let dispatcher = sdk(&dom, LogController::new());
        dispatcher
            .execute("configure", json!({ "propertyID": "p1" }))
            .await
            .unwrap();

        let applied = tokio::spawn(dispatcher.execute(
            COMMAND_APPLY_PERSONALIZATION,
            json!({
                "selector": ".promo",
                "content": "<p>50% off</p>",
                "meta": { "activity": "spring" },
                "prehidingSelector": ".promo"
            }),
        ));

        sleep(Duration::from_millis(10)).await;
        assert_eq!(dom.query_selector_all("STYLE").len(), 1);

        let body = dom.body().unwrap();
        let promo = dom.create_node("div", &[("class", "promo")]).unwrap();
        let promo = dom.append_node(&body, promo).unwrap();

        let result = timeout(Duration::from_secs(1), applied)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(
            result,
            json!([{ "meta": { "personalization": { "activity": "spring" } } }])
        );
        assert_eq!(dom.inner_html(&promo).as_deref(), Some("<p>50% off</p>"));
        assert!(dom.query_selector_all("STYLE").is_empty());
    }

    /// Command failures surface namespaced through the dispatcher
    #[tokio::test]
    async fn test_e2e_command_option_errors_are_namespaced() {
        let dom = Arc::new(MemoryDom::with_body());
        let dispatcher = sdk(&dom, LogController::new());
        dispatcher
            .execute("configure", json!({ "propertyID": "p1" }))
            .await
            .unwrap();

        let err = dispatcher
            .execute(COMMAND_EVENT, json!({ "destinations": "nope" }))
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), DispatcherError::CommandExecution { .. }));
        assert!(
            err.to_string().starts_with("[beacon] invalid options for 'event'"),
            "got: {err}"
        );
    }

    /// A caller-owned completion signal that never resolves keeps the frame
    #[tokio::test]
    async fn test_e2e_caller_completion_controls_teardown() {
        let dom = Arc::new(MemoryDom::with_body());
        let completion = Deferred::new();
        let pipeline = PipelineBuilder::new(
            Arc::clone(&dom),
            NoCompletionFactory(FrameFireExecutorFactory::new(Arc::clone(&dom))),
            Logger::new("beacon", LogController::new()),
        )
        .completion(completion.clone())
        .spawn()
        .unwrap();

        pipeline.fire(DestinationBatch::new(vec![
            json!({ "type": "url", "url": "https://a.test/held" }),
        ]));
        let frame = pipeline.frame().await.unwrap();

        sleep(Duration::from_millis(20)).await;
        assert!(dom.is_attached(&frame));
        assert_eq!(dom.children(&frame).len(), 1);

        assert!(completion.resolve());
        assert!(!completion.resolve());
        sleep(Duration::from_millis(20)).await;
        assert!(!dom.is_attached(&frame));
        assert_eq!(dom.removed_count(), 1);
    }

    /// Wraps the frame executor but hands it a completion nobody resolves
    struct NoCompletionFactory(FrameFireExecutorFactory<MemoryDom>);

    impl FireDestinationsFactory for NoCompletionFactory {
        type Executor = FrameFireExecutor<MemoryDom>;

        fn create(&self, mut context: FireContext) -> Result<Self::Executor, ContractError> {
            context.completion = Deferred::new();
            self.0.create(context)
        }
    }
}
