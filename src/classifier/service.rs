use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{sync::Semaphore, task::JoinSet, time::timeout};

use crate::{
    domain::{Comment, ModelTag, SortOrder, ToxicitySummary, Verdict, sort_comments, summarize},
    model::{AuthoritativeClassifier, ClassifyError},
    tasks::pending::{PendingClassifications, PendingVerdict},
};

use super::{cache::VerdictCache, matcher::LexicalMatcher};

/// Upper bound on authoritative passes run at once for cache warming.
pub const WARM_CONCURRENCY: usize = 4;

/// Reconciles the immediate local pass with the authoritative pass.
///
/// Both passes share one cache. Only the authoritative pass writes to it.
pub struct ClassificationService {
    matcher: Arc<LexicalMatcher>,
    cache: Arc<VerdictCache>,
    authority: Arc<dyn AuthoritativeClassifier>,
    authority_timeout: Duration,
    pending: Arc<PendingClassifications>,
    warmups: Mutex<JoinSet<()>>,
    warm_permits: Arc<Semaphore>,
}

impl ClassificationService {
    pub fn new(
        matcher: Arc<LexicalMatcher>,
        cache: Arc<VerdictCache>,
        authority: Arc<dyn AuthoritativeClassifier>,
        authority_timeout: Duration,
    ) -> Self {
        Self {
            matcher,
            cache,
            authority,
            authority_timeout,
            pending: Arc::new(PendingClassifications::new()),
            warmups: Mutex::new(JoinSet::new()),
            warm_permits: Arc::new(Semaphore::new(WARM_CONCURRENCY)),
        }
    }

    /// Never blocks and never fails.
    pub fn classify_immediate(&self, content: &str) -> Verdict {
        if let Some(cached) = self.cache.get(content) {
            return cached;
        }
        self.matcher.classify(content)
    }

    /// Authoritative verdict; degrades to the matcher on any authority failure.
    pub async fn classify(&self, content: &str) -> Verdict {
        if content.is_empty() {
            return self.matcher.classify(content);
        }
        if let Some(cached) = self.cache.get(content) {
            tracing::debug!(target: "classifier", "authoritative cache hit");
            return cached;
        }

        match self.consult_authority(content).await {
            Ok(verdict) => {
                self.cache.put(content, verdict);
                verdict
            }
            Err(err) => {
                tracing::warn!(
                    target: "classifier",
                    authority = self.authority.name(),
                    error = %err,
                    "authoritative classification failed; using lexical fallback"
                );
                // Not cached, so a recovered authority is asked again.
                self.matcher.classify(content).with_model(ModelTag::Fallback)
            }
        }
    }

    async fn consult_authority(&self, content: &str) -> Result<Verdict, ClassifyError> {
        timeout(self.authority_timeout, self.authority.classify(content))
            .await
            .map_err(|_| ClassifyError::Timeout(self.authority_timeout))?
    }

    /// Returns the immediate verdict and schedules an authoritative pass owned
    /// by `comment_id`. Resubmitting the same id replaces the earlier pass.
    pub fn submit(
        self: &Arc<Self>,
        comment_id: &str,
        content: String,
    ) -> (Verdict, PendingVerdict) {
        let immediate = self.classify_immediate(&content);
        let service = Arc::clone(self);
        let pending = self
            .pending
            .spawn(comment_id, async move { service.classify(&content).await });
        (immediate, pending)
    }

    /// Drops the pending pass of a removed comment. No-op if none is running.
    pub fn forget(&self, comment_id: &str) -> bool {
        self.pending.cancel(comment_id)
    }

    /// Immediate pass over a fetched list, then sort and count. Uncached texts
    /// are sent through the authoritative pass in the background to warm the
    /// cache, at most `WARM_CONCURRENCY` at a time; the returned comments are
    /// not updated by it.
    pub fn annotate(
        self: &Arc<Self>,
        mut comments: Vec<Comment>,
        order: SortOrder,
    ) -> (Vec<Comment>, ToxicitySummary) {
        let mut warm: HashMap<String, String> = HashMap::new();
        for comment in &mut comments {
            match self.cache.get(&comment.content) {
                Some(cached) => comment.apply_verdict(&cached),
                None => {
                    comment.apply_verdict(&self.matcher.classify(&comment.content));
                    if !comment.content.is_empty() {
                        warm.entry(VerdictCache::key(&comment.content))
                            .or_insert_with(|| comment.content.clone());
                    }
                }
            }
        }

        if !warm.is_empty() {
            let mut warmups = self.warmups.lock();
            while warmups.try_join_next().is_some() {}
            for content in warm.into_values() {
                let service = Arc::clone(self);
                let permits = Arc::clone(&self.warm_permits);
                warmups.spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return;
                    };
                    service.classify(&content).await;
                });
            }
            tracing::debug!(target: "classifier", queued = warmups.len(), "cache warm-up scheduled");
        }

        sort_comments(&mut comments, order);
        let summary = summarize(&comments);
        (comments, summary)
    }

    pub fn authority_name(&self) -> &'static str {
        self.authority.name()
    }

    pub fn cache(&self) -> &VerdictCache {
        &self.cache
    }

    pub fn pending(&self) -> &PendingClassifications {
        &self.pending
    }

    /// Aborts pending comment passes and cache warm-ups. Returns how many
    /// tasks were still tracked.
    pub fn abort_background(&self) -> usize {
        let mut warmups = self.warmups.lock();
        while warmups.try_join_next().is_some() {}
        let warming = warmups.len();
        warmups.abort_all();
        self.pending.abort_all() + warming
    }
}
