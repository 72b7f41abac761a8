//! Shared test utilities used across topogrid crates.

pub mod tracing {
    //! Capture layer for asserting spans and log events in tests.

    use std::{
        collections::BTreeMap,
        fmt,
        sync::{Arc, Mutex, PoisonError},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id},
    };
    use tracing_subscriber::{
        Layer, layer::Context, layer::SubscriberExt, registry::LookupSpan,
    };

    /// A span opened while the layer was installed.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CapturedSpan {
        /// Span name from its metadata.
        pub name: String,
        /// Fields recorded when the span was created.
        pub fields: BTreeMap<String, String>,
    }

    /// An event emitted while the layer was installed.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CapturedEvent {
        /// Event level.
        pub level: Level,
        /// Rendered `message` field, empty when absent.
        pub message: String,
        /// Every other field.
        pub fields: BTreeMap<String, String>,
    }

    /// Layer that stores span openings and events for later inspection.
    #[derive(Clone, Default)]
    pub struct CaptureLayer {
        spans: Arc<Mutex<Vec<CapturedSpan>>>,
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl CaptureLayer {
        /// Returns the spans opened so far, in creation order.
        ///
        /// # Examples
        /// ```
        /// use topogrid_test_support::tracing::CaptureLayer;
        ///
        /// assert!(CaptureLayer::default().spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<CapturedSpan> {
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Returns the events emitted so far, in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<CapturedEvent> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Returns whether a span called `name` was opened.
        #[must_use]
        pub fn saw_span(&self, name: &str) -> bool {
            self.spans().iter().any(|span| span.name == name)
        }

        /// Returns the events at `level`.
        #[must_use]
        pub fn events_at(&self, level: Level) -> Vec<CapturedEvent> {
            self.events()
                .into_iter()
                .filter(|event| event.level == level)
                .collect()
        }
    }

    /// Runs `f` with a fresh [`CaptureLayer`] as the thread's default subscriber.
    ///
    /// # Examples
    /// ```
    /// use topogrid_test_support::tracing::capture;
    ///
    /// let ((), layer) = capture(|| tracing::warn!(count = 2, "careful"));
    /// let warnings = layer.events_at(tracing::Level::WARN);
    /// assert_eq!(warnings.len(), 1);
    /// assert_eq!(warnings[0].message, "careful");
    /// assert_eq!(warnings[0].fields.get("count").map(String::as_str), Some("2"));
    /// ```
    pub fn capture<T>(f: impl FnOnce() -> T) -> (T, CaptureLayer) {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, layer)
    }

    impl<S> Layer<S> for CaptureLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            let mut recorder = FieldRecorder::default();
            attrs.record(&mut recorder);
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(CapturedSpan {
                    name: attrs.metadata().name().to_owned(),
                    fields: recorder.fields,
                });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut recorder = FieldRecorder::default();
            event.record(&mut recorder);
            let message = recorder.fields.remove("message").unwrap_or_default();
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(CapturedEvent {
                    level: *event.metadata().level(),
                    message,
                    fields: recorder.fields,
                });
        }
    }

    #[derive(Default)]
    struct FieldRecorder {
        fields: BTreeMap<String, String>,
    }

    impl Visit for FieldRecorder {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .insert(field.name().to_owned(), format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.fields
                .insert(field.name().to_owned(), value.to_owned());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.fields
                .insert(field.name().to_owned(), value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.fields
                .insert(field.name().to_owned(), value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.fields
                .insert(field.name().to_owned(), value.to_string());
        }
    }

}
