//! Write-back like cache.

use crate::cache::{like_keys, CacheStore};
use crate::like_service::{FlushReport, LikeService};
use crate::metrics::LikeMetrics;
use agora_core::{AgoraResult, ContentId, ContentItem, ContentKind, LikedContent, UserId};
use agora_repository::{CommentRepository, PostRepository, UserRepository};
use async_trait::async_trait;
use shaku::Component;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What happened to one like-set during a flush.
enum FlushOutcome {
    Written,
    ContentMissing,
}

/// Like service backed by a [`CacheStore`], writing back to the repositories.
#[derive(Component)]
#[shaku(interface = LikeService)]
pub struct LikeCacheService {
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    #[shaku(inject)]
    posts: Arc<dyn PostRepository>,
    #[shaku(inject)]
    comments: Arc<dyn CommentRepository>,
    #[shaku(inject)]
    users: Arc<dyn UserRepository>,
    /// Held for the duration of a flush pass.
    #[shaku(default)]
    flush_lock: Mutex<()>,
}

impl LikeCacheService {
    /// Creates a like service outside of the DI container.
    pub fn new(
        cache: Arc<dyn CacheStore>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            cache,
            posts,
            comments,
            users,
            flush_lock: Mutex::new(()),
        }
    }

    /// Copies the durable likes of an item into the cache on first touch.
    ///
    /// Adding the id to the marker doubles as the claim: only the caller whose
    /// add actually inserted it reads the durable store. If that read fails
    /// the claim is released so a later call retries.
    async fn ensure_loaded(&self, kind: ContentKind, id: ContentId) -> AgoraResult<()> {
        let marker = like_keys::loaded_marker(kind);
        let member = id.to_string();

        if self.cache.set_contains(&marker, &member).await? {
            return Ok(());
        }
        if !self.cache.add_to_set(&marker, &member).await? {
            return Ok(());
        }

        match self.hydrate(kind, id).await {
            Ok(count) => {
                debug!("Hydrated {} likes for {}:{}", count, kind, id);
                LikeMetrics::hydrated(kind);
                Ok(())
            }
            Err(e) => {
                warn!(kind = %kind, id = %id, error = %e, "Hydration failed, releasing marker");
                LikeMetrics::hydration_failed(kind);
                if let Err(release) = self.cache.remove_from_set(&marker, &member).await {
                    warn!(kind = %kind, id = %id, error = %release, "Failed to release hydration marker");
                }
                Err(e)
            }
        }
    }

    async fn hydrate(&self, kind: ContentKind, id: ContentId) -> AgoraResult<u64> {
        let likers = match self.load_content(kind, id).await? {
            Some(item) => item.liked_by().clone(),
            None => BTreeSet::new(),
        };

        let members: Vec<String> = likers.iter().map(ToString::to_string).collect();
        self.cache
            .add_all_to_set(&like_keys::like_set(kind, id), &members)
            .await?;
        Ok(members.len() as u64)
    }

    async fn load_content(&self, kind: ContentKind, id: ContentId) -> AgoraResult<Option<ContentItem>> {
        Ok(match kind {
            ContentKind::Post => self.posts.find_by_id(id).await?.map(ContentItem::from),
            ContentKind::Comment => self.comments.find_by_id(id).await?.map(ContentItem::from),
        })
    }

    /// Runs one flush pass. The caller holds `flush_lock`.
    async fn flush_locked(&self) -> AgoraResult<FlushReport> {
        let started = Instant::now();
        let mut report = FlushReport::default();

        for kind in ContentKind::ALL {
            let flushed = self.flush_emptied(kind, &mut report).await?;

            let keys = self
                .cache
                .keys_matching(&like_keys::like_set_pattern(kind))
                .await?;

            for key in keys {
                report.keys_scanned += 1;

                let Some(id) = like_keys::parse_like_set_key(kind, &key) else {
                    warn!(kind = %kind, key = %key, "Skipping malformed like-set key");
                    report.malformed_keys += 1;
                    LikeMetrics::flush_item(kind, "malformed");
                    continue;
                };
                if flushed.contains(&id) {
                    continue;
                }

                let outcome = self.flush_one(kind, id, &key, &mut report).await;
                Self::tally(kind, id, outcome, &mut report);
            }
        }

        LikeMetrics::flush_completed(started.elapsed());
        info!(
            scanned = report.keys_scanned,
            flushed = report.flushed,
            missing_content = report.missing_content,
            missing_users = report.missing_users,
            malformed = report.malformed_keys,
            failed = report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Like flush completed"
        );
        Ok(report)
    }

    /// Flushes the items whose like-set was emptied since the last pass.
    ///
    /// Each id is removed from the emptied marker before its flush and put
    /// back if the flush fails. Returns the ids visited.
    async fn flush_emptied(&self, kind: ContentKind, report: &mut FlushReport) -> AgoraResult<HashSet<ContentId>> {
        let marker = like_keys::emptied_marker(kind);
        let mut visited = HashSet::new();

        for member in self.cache.set_members(&marker).await? {
            if !self.cache.remove_from_set(&marker, &member).await? {
                continue;
            }

            let Ok(id) = member.parse::<ContentId>() else {
                warn!(kind = %kind, member = %member, "Dropping malformed emptied-marker entry");
                report.malformed_keys += 1;
                LikeMetrics::flush_item(kind, "malformed");
                continue;
            };
            visited.insert(id);

            let key = like_keys::like_set(kind, id);
            let outcome = self.flush_one(kind, id, &key, report).await;
            if outcome.is_err() {
                if let Err(e) = self.cache.add_to_set(&marker, &member).await {
                    warn!(kind = %kind, id = %id, error = %e, "Failed to requeue emptied item");
                }
            }
            Self::tally(kind, id, outcome, report);
        }

        Ok(visited)
    }

    fn tally(kind: ContentKind, id: ContentId, outcome: AgoraResult<FlushOutcome>, report: &mut FlushReport) {
        match outcome {
            Ok(FlushOutcome::Written) => {
                report.flushed += 1;
                LikeMetrics::flush_item(kind, "written");
            }
            Ok(FlushOutcome::ContentMissing) => {
                debug!("Skipping {}:{}, no longer exists", kind, id);
                report.missing_content += 1;
                LikeMetrics::flush_item(kind, "missing");
            }
            Err(e) => {
                warn!(kind = %kind, id = %id, error = %e, "Failed to flush like-set");
                report.failed += 1;
                LikeMetrics::flush_item(kind, "failed");
            }
        }
    }

    /// Replaces the durable liked-by relation of one item with its cached set.
    ///
    /// The content row is only updated, never created, so an item deleted
    /// while the flush runs stays deleted.
    async fn flush_one(
        &self,
        kind: ContentKind,
        id: ContentId,
        key: &str,
        report: &mut FlushReport,
    ) -> AgoraResult<FlushOutcome> {
        let members = self.cache.set_members(key).await?;

        let mut resolved = BTreeSet::new();
        for member in members {
            let Ok(user_id) = member.parse::<UserId>() else {
                debug!("Dropping non-numeric member '{}' of {}", member, key);
                report.missing_users += 1;
                continue;
            };
            match self.users.find_by_id(user_id).await? {
                Some(user) => {
                    resolved.insert(user.id);
                }
                None => {
                    debug!("Dropping unknown user {} from {}", user_id, key);
                    report.missing_users += 1;
                }
            }
        }

        let written = match kind {
            ContentKind::Post => self.posts.replace_liked_by(id, &resolved).await?,
            ContentKind::Comment => self.comments.replace_liked_by(id, &resolved).await?,
        };
        Ok(if written {
            FlushOutcome::Written
        } else {
            FlushOutcome::ContentMissing
        })
    }
}

#[async_trait]
impl LikeService for LikeCacheService {
    async fn like_count(&self, kind: ContentKind, id: ContentId) -> AgoraResult<u64> {
        self.ensure_loaded(kind, id).await?;
        self.cache.set_size(&like_keys::like_set(kind, id)).await
    }

    async fn likers(&self, kind: ContentKind, id: ContentId) -> AgoraResult<BTreeSet<UserId>> {
        self.ensure_loaded(kind, id).await?;
        let key = like_keys::like_set(kind, id);
        let members = self.cache.set_members(&key).await?;

        Ok(members
            .into_iter()
            .filter_map(|member| match member.parse() {
                Ok(user) => Some(user),
                Err(_) => {
                    warn!(key = %key, member = %member, "Ignoring non-numeric like-set member");
                    None
                }
            })
            .collect())
    }

    async fn is_liked(&self, kind: ContentKind, id: ContentId, user: UserId) -> AgoraResult<bool> {
        self.ensure_loaded(kind, id).await?;
        self.cache
            .set_contains(&like_keys::like_set(kind, id), &user.to_string())
            .await
    }

    async fn toggle_like(&self, kind: ContentKind, id: ContentId, user: UserId) -> AgoraResult<bool> {
        self.ensure_loaded(kind, id).await?;
        let key = like_keys::like_set(kind, id);
        let member = user.to_string();

        let liked = if self.cache.remove_from_set(&key, &member).await? {
            if self.cache.set_size(&key).await? == 0 {
                self.cache
                    .add_to_set(&like_keys::emptied_marker(kind), &id.to_string())
                    .await?;
            }
            false
        } else {
            self.cache.add_to_set(&key, &member).await?;
            true
        };

        debug!("User {} {} {}:{}", user, if liked { "liked" } else { "unliked" }, kind, id);
        LikeMetrics::toggled(kind, liked);
        Ok(liked)
    }

    async fn flush_all(&self) -> AgoraResult<FlushReport> {
        let _guard = self.flush_lock.lock().await;
        self.flush_locked().await
    }

    async fn try_flush_all(&self) -> AgoraResult<Option<FlushReport>> {
        let Ok(_guard) = self.flush_lock.try_lock() else {
            debug!("Flush already in progress, skipping");
            return Ok(None);
        };
        self.flush_locked().await.map(Some)
    }
}

impl std::fmt::Debug for LikeCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeCacheService").finish_non_exhaustive()
    }
}
