//! Caller-facing search surface.
//!
//! Turns a `SearchRequest` (explicit ids or a random draw, replace or append)
//! into an orchestrated batch delivered to a renderer.

use super::assembler::RecordAssembler;
use super::orchestrator::{BatchOrchestrator, BatchReport};
use crate::client::JsonFetcher;
use crate::models::{Config, RandomConfig, Result, SearchRequest};
use crate::render::Renderer;
use std::sync::Arc;
use tracing::{debug, warn};

/// Search entry point bound to one catalog.
pub struct SearchSession {
    orchestrator: BatchOrchestrator,
    random: RandomConfig,
}

impl SearchSession {
    pub fn new(orchestrator: BatchOrchestrator, random: RandomConfig) -> Self {
        Self {
            orchestrator,
            random,
        }
    }

    /// Wire the full pipeline from configuration.
    ///
    /// B_i(config is consistent) → DexError::Config otherwise
    pub fn from_config(fetcher: Arc<dyn JsonFetcher>, config: &Config) -> Result<Self> {
        config.validate()?;
        let assembler = RecordAssembler::new(fetcher, config);
        Ok(Self::new(
            BatchOrchestrator::new(assembler),
            config.random.clone(),
        ))
    }

    /// Run one search.
    ///
    /// Returns `Ok(None)` when the request names no identifiers. Only an
    /// impossible random draw is an error; record failures show up as
    /// tombstones in the report.
    pub async fn search<R>(
        &self,
        request: &SearchRequest,
        renderer: &mut R,
    ) -> Result<Option<BatchReport>>
    where
        R: Renderer + ?Sized,
    {
        let identifiers = {
            let mut rng = rand::rng();
            request.query.identifiers(&mut rng, &self.random)?
        };

        if identifiers.is_empty() {
            debug!("Empty search, nothing to do");
            return Ok(None);
        }

        if !request.append {
            if let Err(e) = renderer.clear() {
                warn!(error = %e, "Failed to clear previous results");
            }
        }

        let report = self.orchestrator.render_batch(&identifiers, renderer).await;
        Ok(Some(report))
    }

    /// Drop everything the renderer shows.
    pub fn reset<R>(&self, renderer: &mut R) -> Result<()>
    where
        R: Renderer + ?Sized,
    {
        renderer.clear()
    }
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(SearchRequest),
    Reset,
    Quit,
}

impl SessionCommand {
    /// Parse an interactive line.
    ///
    /// - `1, 4, pikachu` searches, replacing previous results
    /// - `+7, 8` searches and appends
    /// - `?` or `?6` draws random identifiers
    /// - `!` clears, `q` quits
    ///
    /// Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => None,
            "q" | "quit" | "exit" => Some(Self::Quit),
            "!" => Some(Self::Reset),
            _ => {
                if let Some(rest) = line.strip_prefix('?') {
                    let count = rest.trim().parse::<usize>().ok();
                    Some(Self::Search(SearchRequest::random(count)))
                } else if let Some(rest) = line.strip_prefix('+') {
                    Some(Self::Search(SearchRequest::explicit(rest).appending()))
                } else {
                    Some(Self::Search(SearchRequest::explicit(line)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fakes::MemoryFetcher;
    use crate::models::{DexError, Query};
    use crate::render::CardBoard;
    use serde_json::json;

    fn session(random: RandomConfig) -> SearchSession {
        let fetcher = MemoryFetcher::new();
        for id in 1..=5 {
            fetcher.insert(
                format!("https://pokeapi.co/api/v2/pokemon/{id}"),
                json!({ "id": id, "name": format!("creature-{id}") }),
            );
        }
        let config = Config {
            random,
            ..Config::default()
        };
        SearchSession::from_config(Arc::new(fetcher), &config).unwrap()
    }

    #[tokio::test]
    async fn test_replace_then_append() {
        let session = session(RandomConfig::default());
        let mut board = CardBoard::default();

        session
            .search(&SearchRequest::explicit("1, 2"), &mut board)
            .await
            .unwrap();
        session
            .search(&SearchRequest::explicit("3"), &mut board)
            .await
            .unwrap();
        assert_eq!(board.items().len(), 1);

        session
            .search(&SearchRequest::explicit("4, 5").appending(), &mut board)
            .await
            .unwrap();
        let ids: Vec<u32> = board
            .items()
            .iter()
            .map(|i| i.as_resolved().unwrap().id)
            .collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn test_blank_search_is_noop() {
        let session = session(RandomConfig::default());
        let mut board = CardBoard::default();
        session
            .search(&SearchRequest::explicit("1"), &mut board)
            .await
            .unwrap();

        let report = session
            .search(&SearchRequest::explicit(" , ,"), &mut board)
            .await
            .unwrap();
        assert!(report.is_none());
        assert_eq!(board.items().len(), 1);
    }

    #[tokio::test]
    async fn test_random_search() {
        let session = session(RandomConfig {
            min_id: 1,
            max_id: 5,
            count: 4,
        });
        let mut board = CardBoard::default();

        let report = session
            .search(&SearchRequest::random(None), &mut board)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.total(), 4);
        assert_eq!(report.resolved, 4);

        let err = session
            .search(&SearchRequest::random(Some(6)), &mut board)
            .await
            .unwrap_err();
        assert!(matches!(err, DexError::InvalidInput(_)));
    }

    #[test]
    fn test_inconsistent_config_rejected() {
        let mut config = Config::default();
        config.random.min_id = 10;
        config.random.max_id = 5;

        let err = SearchSession::from_config(Arc::new(MemoryFetcher::new()), &config)
            .err()
            .unwrap();
        assert!(matches!(err, DexError::Config(_)));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("   "), None);
        assert_eq!(SessionCommand::parse("q"), Some(SessionCommand::Quit));
        assert_eq!(SessionCommand::parse("!"), Some(SessionCommand::Reset));
        assert_eq!(
            SessionCommand::parse("?"),
            Some(SessionCommand::Search(SearchRequest::random(None)))
        );
        assert_eq!(
            SessionCommand::parse("? 6"),
            Some(SessionCommand::Search(SearchRequest::random(Some(6))))
        );

        match SessionCommand::parse("+7, 8") {
            Some(SessionCommand::Search(request)) => {
                assert!(request.append);
                assert_eq!(request.query, Query::Explicit("7, 8".to_string()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
