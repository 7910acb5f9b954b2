//! Server resolution for a measurement pass

use crate::backend::SpeedtestBackend;
use crate::error::{AppError, Result};
use crate::models::{PinnedServerConfig, ServerIdentity};
use crate::types::SelectionSource;

/// The server a pass will bind to and how it was chosen
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedServer {
    pub server: ServerIdentity,
    pub source: SelectionSource,
}

/// Picks the server for a pass: the pin if there is one, otherwise the
/// measurement client's best-latency server.
///
/// A pin is returned as-is without contacting it; an unreachable pin only
/// shows up when binding. Auto-selected servers are never persisted.
pub struct ServerSelector;

impl ServerSelector {
    pub async fn resolve(
        pinned: &PinnedServerConfig,
        backend: &mut dyn SpeedtestBackend,
    ) -> Result<ResolvedServer> {
        if let Some(server) = pinned.server() {
            return Ok(ResolvedServer {
                server,
                source: SelectionSource::Pinned,
            });
        }

        let server = backend
            .best_server()
            .await
            .map_err(|e| AppError::no_server(e.to_string()))?;

        Ok(ResolvedServer {
            server,
            source: SelectionSource::AutoSelected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SessionResults;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use tokio_test::block_on;

    /// Backend that only answers best-server queries
    struct PoolBackend {
        best: Option<ServerIdentity>,
        best_server_calls: usize,
    }

    impl PoolBackend {
        fn with_best(server: ServerIdentity) -> Self {
            Self {
                best: Some(server),
                best_server_calls: 0,
            }
        }

        fn empty() -> Self {
            Self {
                best: None,
                best_server_calls: 0,
            }
        }
    }

    #[async_trait]
    impl SpeedtestBackend for PoolBackend {
        async fn best_server(&mut self) -> Result<ServerIdentity> {
            self.best_server_calls += 1;
            self.best
                .clone()
                .ok_or_else(|| AppError::backend("Unable to connect to servers to test latency"))
        }

        async fn bind(&mut self, _server: &ServerIdentity) -> Result<()> {
            unreachable!("selection never binds")
        }

        async fn download(&mut self) -> Result<f64> {
            unreachable!("selection never measures")
        }

        async fn upload(&mut self) -> Result<f64> {
            unreachable!("selection never measures")
        }

        async fn results(&self) -> Result<SessionResults> {
            unreachable!("selection never measures")
        }
    }

    #[tokio::test]
    async fn test_missing_config_triggers_auto_selection() {
        let mut backend = PoolBackend::with_best(ServerIdentity::new("3", "Near", "Bergen", "Norway"));

        let resolved = ServerSelector::resolve(&PinnedServerConfig::unpinned(), &mut backend)
            .await
            .unwrap();

        assert_eq!(resolved.server.id, "3");
        assert_eq!(resolved.source, SelectionSource::AutoSelected);
        assert_eq!(backend.best_server_calls, 1);
    }

    #[tokio::test]
    async fn test_auto_selection_failure_is_no_server_available() {
        let mut backend = PoolBackend::empty();

        let error = ServerSelector::resolve(&PinnedServerConfig::unpinned(), &mut backend)
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::NoServerAvailable(_)));
    }

    #[tokio::test]
    async fn test_pin_is_not_checked_for_reachability() {
        // Even with no reachable servers the pin resolves
        let mut backend = PoolBackend::empty();
        let pin = PinnedServerConfig::pinned(ServerIdentity::new("404", "Gone", "Nowhere", ""));

        let resolved = ServerSelector::resolve(&pin, &mut backend).await.unwrap();
        assert_eq!(resolved.server.id, "404");
        assert_eq!(backend.best_server_calls, 0);
    }

    #[tokio::test]
    async fn test_whitespace_id_is_returned_verbatim() {
        let mut backend = PoolBackend::with_best(ServerIdentity::new("9", "Near", "Bergen", "Norway"));
        let pin = PinnedServerConfig {
            id: Some(" ".to_string()),
            ..Default::default()
        };

        let resolved = ServerSelector::resolve(&pin, &mut backend).await.unwrap();
        assert_eq!(resolved.server.id, " ");
        assert_eq!(resolved.source, SelectionSource::Pinned);
        assert_eq!(backend.best_server_calls, 0);
    }

    fn pinned_strategy() -> impl Strategy<Value = ServerIdentity> {
        ("[0-9]{1,6}", "[A-Za-z ]{0,10}", "[A-Za-z ]{0,10}", "[A-Za-z ]{0,10}")
            .prop_map(|(id, sponsor, name, country)| ServerIdentity::new(id, sponsor, name, country))
    }

    fn unpinned_strategy() -> impl Strategy<Value = PinnedServerConfig> {
        (
            prop_oneof![Just(None), Just(Some(String::new()))],
            proptest::option::of("[A-Za-z]{1,10}"),
            proptest::option::of("[A-Za-z]{1,10}"),
        )
            .prop_map(|(id, sponsor, name)| PinnedServerConfig {
                id,
                sponsor,
                name,
                ..Default::default()
            })
    }

    proptest! {
        #[test]
        fn prop_pinned_id_is_returned_verbatim(identity in pinned_strategy()) {
            let mut backend = PoolBackend::with_best(ServerIdentity::new("1", "Other", "Other", "Other"));
            let pin = PinnedServerConfig::pinned(identity.clone());

            let resolved = block_on(ServerSelector::resolve(&pin, &mut backend)).unwrap();

            prop_assert_eq!(resolved.server, identity);
            prop_assert_eq!(resolved.source, SelectionSource::Pinned);
            prop_assert_eq!(backend.best_server_calls, 0);
        }

        #[test]
        fn prop_missing_id_always_auto_selects(config in unpinned_strategy()) {
            let best = ServerIdentity::new("77", "Near", "Bergen", "Norway");
            let mut backend = PoolBackend::with_best(best.clone());

            let resolved = block_on(ServerSelector::resolve(&config, &mut backend)).unwrap();

            prop_assert_eq!(resolved.server, best);
            prop_assert!(resolved.source.is_auto_selected());
            prop_assert_eq!(backend.best_server_calls, 1);
        }
    }
}
