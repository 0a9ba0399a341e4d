use crate::{
    cache::{CacheLookup, QueryCache},
    entity::{
        CollectionName, EntityKind, Filter, Mutation, MutationKind, MutationOutcome, Payload,
        QueryKey, Record, RecordId, Sort,
    },
    obs::{MetricsEvent, MetricsSink, global_sink},
    platform::{Platform, PlatformError},
    query::{QueryError, QueryOptions, QueryResponse, WriteError},
    retry::{RetryOutcome, cancellable, run_with_retry},
};
use std::{future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

///
/// EntityClient
///
/// Cached reads and invalidating writes over the platform's collections.
///

pub struct EntityClient {
    platform: Arc<dyn Platform>,
    cache: QueryCache,
    options: QueryOptions,
    sink: Arc<dyn MetricsSink>,
}

impl EntityClient {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>, options: QueryOptions) -> Self {
        Self {
            platform,
            cache: QueryCache::new().with_stale_after(options.stale_after),
            options,
            sink: global_sink(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    #[must_use]
    pub const fn options(&self) -> &QueryOptions {
        &self.options
    }

    //
    // Reads
    //

    /// Read `key`, from cache when fresh, otherwise from the platform.
    pub async fn query(
        &self,
        key: &QueryKey,
        cancel: &CancellationToken,
    ) -> Result<QueryResponse, QueryError> {
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }

        let fingerprint = key.fingerprint();
        let collection = key.collection.clone();
        match self.cache.lookup(key) {
            CacheLookup::Fresh(records) => {
                tracing::trace!(%collection, %fingerprint, "query.hit");
                self.sink.record(MetricsEvent::CacheHit { collection });
                return Ok(QueryResponse::new(records, true, fingerprint));
            }
            CacheLookup::Stale(_) => {
                self.sink.record(MetricsEvent::CacheStale {
                    collection: collection.clone(),
                });
            }
            CacheLookup::Miss => {
                self.sink.record(MetricsEvent::CacheMiss {
                    collection: collection.clone(),
                });
            }
        }

        let generation = self.cache.generation(&collection);
        let platform = &self.platform;
        let outcome = run_with_retry(
            self.options.retry,
            cancel,
            PlatformError::is_transient,
            || async move {
                if key.filter.is_empty() {
                    platform
                        .list(&key.collection, key.sort.as_ref(), key.limit)
                        .await
                } else {
                    platform
                        .filter(&key.collection, &key.filter, key.sort.as_ref(), key.limit)
                        .await
                }
            },
        )
        .await;

        match outcome {
            RetryOutcome::Done { value, attempts } => {
                let rows = value.len();
                let records = Arc::new(value);
                let stored = self.cache.store(key.clone(), Arc::clone(&records), generation);
                tracing::debug!(%collection, %fingerprint, attempts, rows, stored, "query.fetch");
                self.sink.record(MetricsEvent::Fetch {
                    collection,
                    attempts,
                    ok: true,
                    rows: u64::try_from(rows).unwrap_or(u64::MAX),
                });

                Ok(QueryResponse::new(records, false, fingerprint))
            }
            RetryOutcome::Failed { error, attempts } => {
                tracing::warn!(%collection, %fingerprint, attempts, error = %error, "query.fetch failed");
                self.sink.record(MetricsEvent::Fetch {
                    collection: collection.clone(),
                    attempts,
                    ok: false,
                    rows: 0,
                });

                Err(QueryError::Fetch {
                    collection,
                    attempts,
                    source: error,
                })
            }
            RetryOutcome::Cancelled => Err(QueryError::Cancelled),
        }
    }

    /// Typed read of `E`'s collection.
    pub async fn query_as<E: EntityKind>(
        &self,
        filter: Filter,
        sort: Option<Sort>,
        cancel: &CancellationToken,
    ) -> Result<Vec<E>, QueryError> {
        let mut key = QueryKey::filtered(E::COLLECTION, filter);
        key.sort = sort;

        self.query(&key, cancel).await?.decode()
    }

    /// Mark every cached read of `collection` stale without writing.
    pub fn invalidate(&self, collection: &CollectionName) -> usize {
        let entries = self.cache.invalidate(collection);
        self.sink.record(MetricsEvent::Invalidation {
            collection: collection.clone(),
            entries: u64::try_from(entries).unwrap_or(u64::MAX),
        });

        entries
    }

    //
    // Writes
    //

    /// Apply one mutation. Not retried; invalidates the collection on success.
    pub async fn mutate(
        &self,
        collection: &CollectionName,
        mutation: Mutation,
        cancel: &CancellationToken,
    ) -> Result<MutationOutcome, WriteError> {
        let platform = &self.platform;
        let kind = mutation.kind();

        match mutation {
            Mutation::Create(payload) => self
                .write(collection, kind, cancel, platform.create(collection, payload))
                .await
                .map(MutationOutcome::Created),
            Mutation::Update { id, patch } => self
                .write(collection, kind, cancel, platform.update(collection, &id, patch))
                .await
                .map(MutationOutcome::Updated),
            Mutation::Delete { id } => {
                self.write(collection, kind, cancel, platform.delete(collection, &id))
                    .await?;
                Ok(MutationOutcome::Deleted(id))
            }
            Mutation::BulkCreate(payloads) => self
                .write(collection, kind, cancel, platform.bulk_create(collection, payloads))
                .await
                .map(MutationOutcome::BulkCreated),
        }
    }

    pub async fn create(
        &self,
        collection: &CollectionName,
        payload: Payload,
        cancel: &CancellationToken,
    ) -> Result<Record, WriteError> {
        self.write(
            collection,
            MutationKind::Create,
            cancel,
            self.platform.create(collection, payload),
        )
        .await
    }

    pub async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: Payload,
        cancel: &CancellationToken,
    ) -> Result<Record, WriteError> {
        self.write(
            collection,
            MutationKind::Update,
            cancel,
            self.platform.update(collection, id, patch),
        )
        .await
    }

    pub async fn delete(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        cancel: &CancellationToken,
    ) -> Result<(), WriteError> {
        self.write(
            collection,
            MutationKind::Delete,
            cancel,
            self.platform.delete(collection, id),
        )
        .await
    }

    pub async fn bulk_create(
        &self,
        collection: &CollectionName,
        payloads: Vec<Payload>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>, WriteError> {
        self.write(
            collection,
            MutationKind::BulkCreate,
            cancel,
            self.platform.bulk_create(collection, payloads),
        )
        .await
    }

    /// Create a typed entity and decode what the platform stored.
    pub async fn create_entity<E: EntityKind>(
        &self,
        entity: &E,
        cancel: &CancellationToken,
    ) -> Result<E, WriteError> {
        let payload = entity.to_payload().map_err(|err| WriteError::Encode {
            collection: E::COLLECTION,
            message: err.to_string(),
        })?;
        let record = self.create(&E::COLLECTION, payload, cancel).await?;

        E::from_record(&record).map_err(|err| WriteError::Decode {
            collection: E::COLLECTION,
            message: format!("{}: {err}", record.id),
        })
    }

    async fn write<T>(
        &self,
        collection: &CollectionName,
        kind: MutationKind,
        cancel: &CancellationToken,
        fut: impl Future<Output = Result<T, PlatformError>>,
    ) -> Result<T, WriteError> {
        if cancel.is_cancelled() {
            return Err(WriteError::Cancelled);
        }

        let Some(result) = cancellable(cancel, fut).await else {
            // the platform may already have applied it
            self.invalidate(collection);
            return Err(WriteError::Cancelled);
        };

        match result {
            Ok(value) => {
                self.sink.record(MetricsEvent::Mutation {
                    collection: collection.clone(),
                    kind,
                    ok: true,
                });
                let entries = self.invalidate(collection);
                tracing::debug!(%collection, op = %kind, invalidated = entries, "mutation.ok");

                Ok(value)
            }
            Err(source) => {
                tracing::warn!(%collection, op = %kind, error = %source, "mutation failed");
                self.sink.record(MetricsEvent::Mutation {
                    collection: collection.clone(),
                    kind,
                    ok: false,
                });

                Err(WriteError::Rejected {
                    collection: collection.clone(),
                    kind,
                    source,
                })
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Transaction, TransactionKind, TransactionStatus},
        platform::memory::MemoryPlatform,
        retry::RetryPolicy,
        test_fixtures::{RecordingSink, cliente, payload},
    };
    use serde_json::json;

    fn setup() -> (Arc<MemoryPlatform>, EntityClient) {
        let platform = Arc::new(MemoryPlatform::new().with_user(cliente()));
        let client = EntityClient::new(platform.clone(), QueryOptions::default());

        (platform, client)
    }

    fn all_transactions() -> QueryKey {
        QueryKey::list(CollectionName::TRANSACTION)
    }

    #[tokio::test(start_paused = true)]
    async fn created_record_is_visible_to_the_next_query() {
        let (_, client) = setup();
        let cancel = CancellationToken::new();
        let body = payload(json!({ "type": "Receita", "amount": 100, "date": "2024-01-05" }));

        client
            .query(&all_transactions(), &cancel)
            .await
            .expect("initial read should succeed");
        client
            .mutate(
                &CollectionName::TRANSACTION,
                Mutation::Create(body.clone()),
                &cancel,
            )
            .await
            .expect("create should succeed");
        let rows = client
            .query(&all_transactions(), &cancel)
            .await
            .expect("read should succeed");

        assert!(!rows.from_cache());
        assert!(rows.iter().any(|record| record.matches_payload(&body)));
    }

    #[tokio::test(start_paused = true)]
    async fn deleted_record_is_gone_from_the_next_query() {
        let (platform, client) = setup();
        let cancel = CancellationToken::new();
        let seeded = platform.seed(
            &CollectionName::TRANSACTION,
            [
                payload(json!({ "type": "Receita", "amount": 10 })),
                payload(json!({ "type": "Despesa", "amount": 5 })),
            ],
        );
        let doomed = seeded[0].id.clone();

        let before = client.query(&all_transactions(), &cancel).await;
        assert_eq!(before.map(|rows| rows.len()), Ok(2));

        client
            .mutate(
                &CollectionName::TRANSACTION,
                Mutation::Delete { id: doomed.clone() },
                &cancel,
            )
            .await
            .expect("delete should succeed");
        let after = client
            .query(&all_transactions(), &cancel)
            .await
            .expect("read should succeed");

        assert_eq!(after.len(), 1);
        assert!(after.iter().all(|record| record.id != doomed));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_reads_are_served_from_cache() {
        let (platform, client) = setup();
        let sink = Arc::new(RecordingSink::default());
        let client = client.with_sink(sink.clone());
        let cancel = CancellationToken::new();

        let first = client.query(&all_transactions(), &cancel).await;
        let second = client.query(&all_transactions(), &cancel).await;

        assert_eq!(first.map(|r| r.from_cache()), Ok(false));
        assert_eq!(second.map(|r| r.from_cache()), Ok(true));
        assert_eq!(platform.calls().reads, 1);
        assert!(sink.events().contains(&MetricsEvent::CacheHit {
            collection: CollectionName::TRANSACTION
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn writes_invalidate_every_filter_of_the_collection() {
        let (platform, client) = setup();
        let cancel = CancellationToken::new();
        let validated = QueryKey::filtered(
            CollectionName::TRANSACTION,
            Filter::new().field_eq("status", "Validado"),
        );
        let bookings = QueryKey::list(CollectionName::BOOKING);

        for key in [&all_transactions(), &validated, &bookings] {
            client.query(key, &cancel).await.expect("read should succeed");
        }
        client
            .create(
                &CollectionName::TRANSACTION,
                payload(json!({ "status": "Pendente" })),
                &cancel,
            )
            .await
            .expect("create should succeed");

        assert!(!client.cache().lookup(&all_transactions()).is_fresh());
        assert!(!client.cache().lookup(&validated).is_fresh());
        assert!(client.cache().lookup(&bookings).is_fresh());
        assert_eq!(platform.calls().reads, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_read_failures_are_retried() {
        let (platform, client) = setup();
        platform.fail_next_reads(2);

        let rows = client
            .query(&all_transactions(), &CancellationToken::new())
            .await;

        assert!(rows.is_ok());
        assert_eq!(platform.calls().reads, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_read_failure_is_surfaced() {
        let (platform, client) = setup();
        platform.fail_next_reads(3);

        let err = client
            .query(&all_transactions(), &CancellationToken::new())
            .await
            .expect_err("third failure should surface");

        assert!(matches!(err, QueryError::Fetch { attempts: 3, .. }));
        assert!(client.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_writes_are_not_retried_and_keep_the_cache() {
        let (platform, client) = setup();
        let cancel = CancellationToken::new();
        client
            .query(&all_transactions(), &cancel)
            .await
            .expect("read should succeed");
        platform.reject_next_writes(1);

        let err = client
            .create(&CollectionName::TRANSACTION, Payload::new(), &cancel)
            .await
            .expect_err("write should be rejected");

        assert!(matches!(
            err,
            WriteError::Rejected {
                kind: MutationKind::Create,
                ..
            }
        ));
        assert_eq!(platform.calls().writes, 1);
        assert!(client.cache().lookup(&all_transactions()).is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn typed_reads_and_writes_round_trip() {
        let (_, client) = setup();
        let cancel = CancellationToken::new();
        let draft = Transaction::new(TransactionKind::Despesa, 40.0, "2024-01-20")
            .with_category("Marketing")
            .with_status(TransactionStatus::Validado);

        let created = client
            .create_entity(&draft, &cancel)
            .await
            .expect("create should succeed");
        let listed: Vec<Transaction> = client
            .query_as(
                Filter::new().field_eq("category", "Marketing"),
                Some(Sort::desc("date")),
                &cancel,
            )
            .await
            .expect("typed read should succeed");

        assert!(created.id.is_some());
        assert_eq!(created.created_by.as_deref(), Some("cliente@example.com"));
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test(start_paused = true)]
    async fn bulk_create_reports_every_record() {
        let (platform, client) = setup();

        let outcome = client
            .mutate(
                &CollectionName::REVIEW,
                Mutation::BulkCreate(vec![
                    payload(json!({ "rating": 5 })),
                    payload(json!({ "rating": 3 })),
                ]),
                &CancellationToken::new(),
            )
            .await
            .expect("bulk create should succeed");

        assert_eq!(outcome.kind(), MutationKind::BulkCreate);
        assert_eq!(outcome.records().len(), 2);
        assert_eq!(platform.records(&CollectionName::REVIEW).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_calls_never_reach_the_platform() {
        let (platform, client) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let read = client.query(&all_transactions(), &cancel).await;
        let write = client
            .delete(&CollectionName::TRANSACTION, &RecordId::new("x"), &cancel)
            .await;

        assert_eq!(read, Err(QueryError::Cancelled));
        assert_eq!(write, Err(WriteError::Cancelled));
        assert_eq!(platform.calls().reads, 0);
        assert_eq!(platform.calls().writes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_policy_none_fails_fast() {
        let platform = Arc::new(MemoryPlatform::new());
        let client = EntityClient::new(
            platform.clone(),
            QueryOptions {
                retry: RetryPolicy::NONE,
                ..QueryOptions::default()
            },
        );
        platform.fail_next_reads(1);

        let err = client
            .query(&all_transactions(), &CancellationToken::new())
            .await;

        assert!(matches!(err, Err(QueryError::Fetch { attempts: 1, .. })));
    }
}
