use shared::error::RedirectException;
use thiserror::Error;

/// Why an action did not produce its normal outcome.
///
/// The HTTP layer matches on this: `Redirect` becomes redirect-back with a
/// flashed message and the submitted input kept, `Fault` becomes an error
/// page.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Redirect(#[from] RedirectException),
    #[error(transparent)]
    Fault(anyhow::Error),
}

impl ActionError {
    pub fn redirect(message: impl Into<String>) -> Self {
        Self::Redirect(RedirectException::new(message))
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Collaborators may return a `RedirectException` wrapped in `anyhow`, with or
/// without added context; it is found anywhere in the chain.
impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        let redirect = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<RedirectException>())
            .cloned();
        match redirect {
            Some(redirect) => Self::Redirect(redirect),
            None => Self::Fault(err),
        }
    }
}

impl From<ResponderError> for ActionError {
    fn from(err: ResponderError) -> Self {
        Self::Fault(err.into())
    }
}

#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("failed to bind `{slot}` for template `{template}`")]
    Binding {
        template: &'static str,
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
