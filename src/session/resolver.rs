use crate::env::DEFAULT_PRIORITY;
use crate::error::{BootstrapError, BootstrapResult};
use crate::session::types::*;
use std::collections::HashMap;
use tracing::debug;

/// Turns user-declared session descriptors into resolved configurations
///
/// Resolution is a pure function of the descriptor sequence: names and
/// priorities are defaulted, locators, groups and explicit priorities are
/// validated (the default priority sentinel cannot be declared), and the
/// `(name, scope)` pair must be unique across the whole set. Input order is
/// preserved; ordering by priority is left to [`ResolvedSessions::startup_order`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfigurationResolver;

impl SessionConfigurationResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, descriptors: &[SessionDescriptor]) -> BootstrapResult<ResolvedSessions> {
        let mut sessions = Vec::with_capacity(descriptors.len());
        let mut seen: HashMap<(String, Option<String>), usize> = HashMap::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            let group: SessionGroup = descriptor
                .group
                .parse()
                .map_err(|reason: String| BootstrapError::invalid(index, reason))?;

            if descriptor.config_locator.trim().is_empty() {
                return Err(BootstrapError::invalid(index, "config locator is empty"));
            }

            if descriptor.priority == Some(DEFAULT_PRIORITY) {
                return Err(BootstrapError::invalid(
                    index,
                    format!("priority {} is reserved for unset priorities", DEFAULT_PRIORITY),
                ));
            }

            let name = descriptor.resolved_name().to_string();
            let key = (name.clone(), descriptor.scope_name.clone());
            if let Some(previous) = seen.insert(key, index) {
                return Err(BootstrapError::invalid(
                    index,
                    format!(
                        "session '{}' with scope {:?} is already declared at index {}",
                        name, descriptor.scope_name, previous
                    ),
                ));
            }

            let configuration = SessionConfiguration::new(
                name,
                descriptor.config_locator.clone(),
                descriptor.scope_name.clone(),
                descriptor.resolved_priority(),
                group,
            );
            debug!("Resolved session {}", configuration);
            sessions.push(configuration);
        }

        Ok(ResolvedSessions { sessions })
    }
}

/// Ordered, validated set of session configurations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSessions {
    sessions: Vec<SessionConfiguration>,
}

impl ResolvedSessions {
    /// All sessions in declaration order
    pub fn all(&self) -> &[SessionConfiguration] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions of one group, in declaration order
    pub fn group(&self, group: SessionGroup) -> impl Iterator<Item = &SessionConfiguration> {
        self.sessions.iter().filter(move |s| s.group() == group)
    }

    pub fn server(&self) -> impl Iterator<Item = &SessionConfiguration> {
        self.group(SessionGroup::Server)
    }

    pub fn client(&self) -> impl Iterator<Item = &SessionConfiguration> {
        self.group(SessionGroup::Client)
    }

    pub fn grpc(&self) -> impl Iterator<Item = &SessionConfiguration> {
        self.group(SessionGroup::Grpc)
    }

    pub fn has_group(&self, group: SessionGroup) -> bool {
        self.group(group).next().is_some()
    }

    /// Sessions in the order they are started: highest priority first,
    /// ties keep declaration order
    pub fn startup_order(&self) -> Vec<&SessionConfiguration> {
        let mut ordered: Vec<&SessionConfiguration> = self.sessions.iter().collect();
        // stable sort keeps declaration order among equal priorities
        ordered.sort_by(|a, b| b.priority().cmp(&a.priority()));
        ordered
    }

    /// Sessions in the order they are stopped: the reverse of startup
    pub fn shutdown_order(&self) -> Vec<&SessionConfiguration> {
        let mut ordered = self.startup_order();
        ordered.reverse();
        ordered
    }
}

impl<'a> IntoIterator for &'a ResolvedSessions {
    type Item = &'a SessionConfiguration;
    type IntoIter = std::slice::Iter<'a, SessionConfiguration>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}
