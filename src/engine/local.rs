use super::*;
use crate::config::EngineProperties;
use crate::env::properties;
use crate::session::SessionGroup;
use std::sync::OnceLock;
use tracing::debug;

/// In-process engine holding the registry of configured sessions
pub struct LocalEngine {
    id: Uuid,
    sessions: Vec<SessionHandle>,
    cluster_name: String,
    is_member: bool,
}

impl LocalEngine {
    pub fn new(sessions: &ResolvedSessions, props: &EngineProperties) -> Self {
        let id = Uuid::new_v4();
        let handles = sessions
            .startup_order()
            .into_iter()
            .map(|s| SessionHandle::new(Arc::new(s.clone()), id))
            .collect();
        let cluster_name = props
            .get(properties::CLUSTER_NAME)
            .unwrap_or(properties::DEFAULT_CLUSTER_NAME)
            .to_string();

        Self {
            id,
            sessions: handles,
            cluster_name,
            is_member: is_member(sessions),
        }
    }
}

/// A process joins as a member when it declares server sessions or no sessions at all
fn is_member(sessions: &ResolvedSessions) -> bool {
    sessions.is_empty() || sessions.has_group(SessionGroup::Server)
}

impl Engine for LocalEngine {
    fn instance_id(&self) -> Uuid {
        self.id
    }

    fn find_session(&self, name: &str) -> Option<SessionHandle> {
        self.sessions.iter().find(|s| s.name() == name).cloned()
    }

    fn session_names(&self) -> Vec<String> {
        self.sessions.iter().map(|s| s.name().to_string()).collect()
    }

    fn cluster(&self) -> ClusterHandle {
        ClusterHandle {
            name: self.cluster_name.clone(),
            engine_id: self.id,
            is_member: self.is_member,
        }
    }
}

/// Configurer used when the embedding application supplies none
///
/// Builds a [`LocalEngine`] on first use and hands out the same instance
/// afterwards.
pub struct DefaultConfigurer {
    sessions: ResolvedSessions,
    properties: EngineProperties,
    engine: OnceLock<EngineHandle>,
}

impl DefaultConfigurer {
    pub fn new(sessions: ResolvedSessions, properties: EngineProperties) -> Self {
        Self {
            sessions,
            properties,
            engine: OnceLock::new(),
        }
    }

    fn local_engine(&self) -> EngineHandle {
        self.engine
            .get_or_init(|| {
                debug!("Creating local engine for {} sessions", self.sessions.len());
                Arc::new(LocalEngine::new(&self.sessions, &self.properties))
            })
            .clone()
    }
}

impl Configurer for DefaultConfigurer {
    fn name(&self) -> &str {
        "default"
    }

    fn engine(&self) -> BoxFuture<'_, anyhow::Result<EngineHandle>> {
        Box::pin(async move { Ok(self.local_engine()) })
    }

    fn configuration(&self) -> BoxFuture<'_, anyhow::Result<ConfigurationSnapshot>> {
        Box::pin(async move {
            Ok(ConfigurationSnapshot::new(
                &self.sessions,
                self.properties.native(),
            ))
        })
    }

    fn server(&self) -> BoxFuture<'_, anyhow::Result<Option<ServerHandle>>> {
        Box::pin(async move {
            if !is_member(&self.sessions) {
                return Ok(None);
            }
            let engine = self.local_engine();
            let sessions = self.sessions.startup_order().into_iter().cloned().collect();
            Ok(Some(ServerHandle::new(engine, sessions)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionConfigurationResolver, SessionDescriptor};

    fn sessions(descriptors: &[SessionDescriptor]) -> ResolvedSessions {
        SessionConfigurationResolver::new().resolve(descriptors).unwrap()
    }

    #[tokio::test]
    async fn test_default_configurer_reuses_engine() {
        let configurer = DefaultConfigurer::new(
            sessions(&[SessionDescriptor::new(SessionGroup::Server, "a.xml")]),
            EngineProperties::new(),
        );

        let first = configurer.engine().await.unwrap();
        let second = configurer.engine().await.unwrap();
        assert_eq!(first.instance_id(), second.instance_id());

        let server = configurer.server().await.unwrap().expect("server sessions declared");
        assert_eq!(server.engine().instance_id(), first.instance_id());
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_client_only_process_has_no_server() {
        let configurer = DefaultConfigurer::new(
            sessions(&[SessionDescriptor::new(SessionGroup::Client, "c.xml")]),
            EngineProperties::new(),
        );

        assert!(configurer.server().await.unwrap().is_none());
        let engine = configurer.engine().await.unwrap();
        assert!(!engine.cluster().is_member);
    }

    #[tokio::test]
    async fn test_configuration_snapshot_is_in_startup_order() {
        let mut props = EngineProperties::new();
        props.insert(properties::CLUSTER_NAME, "orders");
        let configurer = DefaultConfigurer::new(
            sessions(&[
                SessionDescriptor::new(SessionGroup::Server, "a.xml")
                    .with_name("low")
                    .with_priority(1),
                SessionDescriptor::new(SessionGroup::Server, "b.xml")
                    .with_name("high")
                    .with_priority(5),
            ]),
            props,
        );

        let snapshot = configurer.configuration().await.unwrap();
        let names: Vec<_> = snapshot.sessions.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["high", "low"]);
        assert_eq!(snapshot.properties["engine.cluster"], "orders");

        let engine = configurer.engine().await.unwrap();
        assert_eq!(engine.cluster().name, "orders");
        assert_eq!(engine.session_names(), vec!["high", "low"]);
    }

    #[test]
    fn test_local_engine_first_match_wins() {
        let resolved = sessions(&[
            SessionDescriptor::new(SessionGroup::Server, "a.xml").with_scope("one"),
            SessionDescriptor::new(SessionGroup::Server, "b.xml")
                .with_scope("two")
                .with_priority(3),
        ]);
        let engine = LocalEngine::new(&resolved, &EngineProperties::new());

        let found = engine.find_session("default").unwrap();
        assert_eq!(found.scope_name(), Some("two"));
        assert_eq!(found.engine_id(), engine.instance_id());
        assert!(engine.find_session("other").is_none());
        assert_eq!(engine.cluster().name, "local");
    }
}
