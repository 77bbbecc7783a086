use super::Configurer;
use crate::error::{BootstrapError, BootstrapResult};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Pick the configurer to use from the registered candidates
///
/// No candidates: `make_default` builds one. One candidate: it is returned
/// as-is. More: [`BootstrapError::AmbiguousConfiguration`].
pub fn select_configurer<F>(
    candidates: &[Arc<dyn Configurer>],
    make_default: F,
) -> BootstrapResult<Arc<dyn Configurer>>
where
    F: FnOnce() -> Arc<dyn Configurer>,
{
    match candidates {
        [] => {
            debug!("No configurer registered, using the default configurer");
            Ok(make_default())
        }
        [only] => Ok(Arc::clone(only)),
        _ => Err(BootstrapError::AmbiguousConfiguration {
            count: candidates.len(),
        }),
    }
}

/// Candidate list plus the cached selection
///
/// The first successful [`ConfigurerSelector::select`] is final; later calls
/// return the same configurer without looking at the candidates again.
pub struct ConfigurerSelector {
    candidates: Vec<Arc<dyn Configurer>>,
    selected: OnceLock<Arc<dyn Configurer>>,
}

impl ConfigurerSelector {
    pub fn new(candidates: Vec<Arc<dyn Configurer>>) -> Self {
        Self {
            candidates,
            selected: OnceLock::new(),
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn select<F>(&self, make_default: F) -> BootstrapResult<Arc<dyn Configurer>>
    where
        F: FnOnce() -> Arc<dyn Configurer>,
    {
        if let Some(selected) = self.selected.get() {
            return Ok(Arc::clone(selected));
        }

        let chosen = select_configurer(&self.candidates, make_default)?;
        // a racing caller may have stored its choice first; keep that one
        Ok(Arc::clone(self.selected.get_or_init(|| chosen)))
    }

    /// The configurer chosen so far, if any
    pub fn selected(&self) -> Option<Arc<dyn Configurer>> {
        self.selected.get().cloned()
    }
}

impl Default for ConfigurerSelector {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
