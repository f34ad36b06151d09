use crate::config::HostConfig;
use crate::error::HostError;
use crate::guest::GuestModule;
use crate::parameters::ControlChange;
use crate::parameters::ParameterRegistry;
use crate::result::decode_text_result;
use crate::string;
use parking_lot::Mutex;
use render_wasmer_common::StatusCode;
use std::sync::Arc;

/// What the presenter shows after a render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutcome {
    pub success: bool,
    /// short human readable status
    pub message: String,
    /// only present on success
    pub markup: Option<String>,
}

impl RenderOutcome {
    pub fn rendered(markup: String) -> Self {
        Self {
            success: true,
            message: StatusCode::Success.message().to_string(),
            markup: Some(markup),
        }
    }

    pub fn failed(status: StatusCode) -> Self {
        Self {
            success: false,
            message: status.message().to_string(),
            markup: None,
        }
    }
}

/// The presentation layer. Only `show_outcome` is required.
pub trait Presenter {
    fn show_outcome(&mut self, outcome: &RenderOutcome);

    /// The controls changed underneath the user, e.g. after a reset or import.
    fn show_parameters(&mut self, _registry: &ParameterRegistry) {}

    /// A skin document is ready to be saved.
    fn offer_skin(&mut self, _json: &str) {}

    fn notify(&mut self, _notice: &str) {}
}

/// Every user visible thing that can happen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    TextEdited(String),
    ParameterChanged { key: String, change: ControlChange },
    SkinImported(String),
    ResetClicked,
    ExportRequested,
}

/// Sequences every event into complete guest exchanges.
///
/// Each exchange finishes, buffers released, before the next one starts. Apart from an export
/// request every event ends with a full render of the current text, nothing is re-rendered
/// incrementally.
pub struct RenderDriver<G, P> {
    guest: G,
    presenter: P,
    registry: ParameterRegistry,
    config: HostConfig,
    text: String,
}

impl<G: GuestModule, P: Presenter> RenderDriver<G, P> {
    /// Negotiates the schema and loads the parameter table before anything is shown.
    pub fn new(mut guest: G, mut presenter: P, config: HostConfig) -> Result<Self, HostError> {
        config.validate()?;
        let registry = ParameterRegistry::connect(&mut guest, &config)?;
        presenter.show_parameters(&registry);
        Ok(Self {
            guest,
            presenter,
            registry,
            config,
            text: String::new(),
        })
    }

    pub fn guest(&mut self) -> &mut G {
        &mut self.guest
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_parts(self) -> (G, P) {
        (self.guest, self.presenter)
    }

    /// Encode the current text, render it, decode the result and present it.
    pub fn render(&mut self) -> Result<RenderOutcome, HostError> {
        let result_ptr = {
            let mut encoded = string::encode(&mut self.guest, &self.text, &self.config)?;
            let (ptr, len) = encoded.hand_over();
            tracing::debug!(ptr, len, "render");
            encoded.guest().render(ptr, len)?
        };
        let outcome = match decode_text_result(
            &mut self.guest,
            result_ptr,
            self.registry.schema().status_count,
        )? {
            Ok(markup) => RenderOutcome::rendered(markup),
            Err(status) => RenderOutcome::failed(status),
        };
        self.presenter.show_outcome(&outcome);
        Ok(outcome)
    }

    pub fn handle(&mut self, event: Event) -> Result<(), HostError> {
        match event {
            Event::TextEdited(text) => {
                self.text = text;
            }
            Event::ParameterChanged { key, change } => {
                match self.registry.change(&mut self.guest, &key, change) {
                    Ok(_) => {}
                    Err(HostError::Wire(e)) => {
                        tracing::debug!(key = %key, error = %e, "rejected control input");
                        self.presenter.notify(&format!("Invalid value for {}: {}", key, e));
                    }
                    Err(e) => return Err(e),
                }
            }
            Event::SkinImported(json) => {
                let status = self.registry.import(&mut self.guest, &json, &self.config)?;
                if !status.is_success() {
                    self.presenter.notify(&format!("Invalid skin file: {}", status));
                }
                self.presenter.show_parameters(&self.registry);
            }
            Event::ResetClicked => {
                self.registry.reset(&mut self.guest)?;
                self.presenter.show_parameters(&self.registry);
            }
            Event::ExportRequested => {
                match self.registry.export(&mut self.guest)? {
                    Ok(json) => self.presenter.offer_skin(&json),
                    Err(status) => self.presenter.notify(&format!("Export failed: {}", status)),
                }
                return Ok(());
            }
        }
        self.render().map(|_| ())
    }
}

/// A driver that can be handed to several event sources.
///
/// Events are applied one at a time in the order the lock is taken, so guest calls never overlap.
pub struct SharedDriver<G, P>(Arc<Mutex<RenderDriver<G, P>>>);

impl<G, P> Clone for SharedDriver<G, P> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<G: GuestModule, P: Presenter> SharedDriver<G, P> {
    pub fn new(driver: RenderDriver<G, P>) -> Self {
        Self(Arc::new(Mutex::new(driver)))
    }

    pub fn handle(&self, event: Event) -> Result<(), HostError> {
        self.0.lock().handle(event)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut RenderDriver<G, P>) -> R) -> R {
        f(&mut self.0.lock())
    }
}
