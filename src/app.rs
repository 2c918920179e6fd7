use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, task::JoinHandle, time::timeout};

use crate::{
    classifier::{ClassificationService, LexicalMatcher, Lexicon, VerdictCache},
    config::AppConfig,
    http::{self, AppState},
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    model::{AuthoritativeClassifier, ClassificationBridge, ModelBackend, RemoteClassifierClient},
};

pub struct CommentGuardApp {
    _paths: ResolvedPaths,
    server_handle: JoinHandle<Result<()>>,
    service: Arc<ClassificationService>,
    shutdown: Shutdown,
}

impl CommentGuardApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let lexicon = match &config.classifier.lexicon_path {
            Some(path) => Lexicon::from_file(path)?,
            None => Lexicon::builtin(),
        };
        tracing::info!(target: "classifier", entries = lexicon.len(), "lexicon loaded");
        let matcher = Arc::new(LexicalMatcher::new(Arc::new(lexicon)));

        let mut model_config = config.model.clone();
        model_config.model_dir = paths.model_dir.clone();
        let backend = ModelBackend::detect(&model_config);
        let bridge = Arc::new(ClassificationBridge::new(backend, matcher.clone()));

        let authority: Arc<dyn AuthoritativeClassifier> = match &config.remote.base_url {
            Some(base_url) => {
                let http_client = Client::builder()
                    .user_agent(format!("comment-guard/{}", env!("CARGO_PKG_VERSION")))
                    .timeout(config.classifier.authority_timeout)
                    .build()?;
                let client = RemoteClassifierClient::new(http_client, base_url)
                    .context("invalid CLASSIFY_REMOTE_URL")?;
                tracing::info!(
                    target: "classifier",
                    endpoint = %client.endpoint(),
                    "authoritative pass uses remote bridge"
                );
                Arc::new(client) as Arc<dyn AuthoritativeClassifier>
            }
            None => bridge.clone() as Arc<dyn AuthoritativeClassifier>,
        };

        let cache = Arc::new(VerdictCache::new(config.classifier.cache_capacity));
        let service = Arc::new(ClassificationService::new(
            matcher.clone(),
            cache,
            authority,
            config.classifier.authority_timeout,
        ));

        let listener = TcpListener::bind(&config.server.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
        let state = AppState {
            service: service.clone(),
            bridge,
            matcher,
        };
        let server_handle = tokio::spawn(http::serve(listener, state, shutdown.subscribe()));

        Ok(Self {
            _paths: paths,
            server_handle,
            service,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let CommentGuardApp {
            _paths: _,
            mut server_handle,
            service,
            shutdown,
        } = self;

        tracing::info!("comment guard started");

        let mut shutdown_listener = shutdown.subscribe();
        let shutdown_timeout = Duration::from_secs(5);
        let mut server_completed = false;

        tokio::select! {
            _ = shutdown_listener.notified() => {
                tracing::info!("shutdown signal received");
            }
            res = &mut server_handle => {
                server_completed = true;
                match res {
                    Ok(Ok(())) => tracing::info!("http server exited"),
                    Ok(Err(err)) => tracing::error!(?err, "http server failed"),
                    Err(err) => tracing::error!(error = %err, "http server task panicked"),
                }
            }
        }

        shutdown.trigger();

        let aborted = service.abort_background();
        if aborted > 0 {
            tracing::info!(target: "tasks", aborted, "background classifications abandoned");
        }

        if !server_completed {
            match timeout(shutdown_timeout, &mut server_handle).await {
                Ok(Ok(Err(err))) => tracing::error!(?err, "http server failed during shutdown"),
                Ok(_) => {}
                Err(_) => {
                    tracing::warn!(
                        target: "http",
                        "server did not stop within {:?}; aborting",
                        shutdown_timeout
                    );
                    server_handle.abort();
                }
            }
        }

        tracing::info!("comment guard stopped");
        Ok(())
    }
}
