use crate::{
    config::{Config, ConfigError, RetryConfig},
    core::{
        Error, ErrorCode, ErrorOrigin,
        client_state::ClientStateStore,
        entity::{Filter, Sort},
        gate::{Decision, GateAction, GateRequirements, GateRoutes, NavigationTarget, evaluate},
        integrations::Integrations,
        model::{Transaction, TransactionKind},
        obs::MetricsSink,
        platform::Platform,
        query::{EntityClient, QueryOptions},
        retry::RetryPolicy,
        session::{SessionAccessor, SessionStatus, SessionUser, UserType},
        views::{
            CategoryRollupOptions, CategoryTotal, FinancialSummary, MonthlyRollup, StatusScope,
            category_rollup, monthly_rollup, summary,
        },
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

///
/// App
///
/// Application context. Owns the session, the entity client and its cache,
/// the integrations wrapper, and persisted client state. Nothing here is
/// global; every consumer receives the `App` it should use.
///

pub struct App {
    config: Config,
    session: SessionAccessor,
    entities: EntityClient,
    integrations: Integrations,
    client_state: ClientStateStore,
}

impl App {
    pub fn new(config: Config, platform: Arc<dyn Platform>) -> Result<Self, Error> {
        config.validate().map_err(config_error)?;

        let session = SessionAccessor::new(Arc::clone(&platform), retry_policy(config.session.retry));
        let entities = EntityClient::new(
            Arc::clone(&platform),
            QueryOptions {
                retry: retry_policy(config.query.retry),
                stale_after: config.query.stale_after(),
            },
        );
        let integrations = Integrations::new(platform);

        let max_logs = config.client_state.max_access_logs;
        let client_state = match &config.client_state.path {
            Some(path) => ClientStateStore::open(path, max_logs)?,
            None => ClientStateStore::in_memory(max_logs),
        };

        tracing::info!(app_id = %config.app.app_id, "app.start");

        Ok(Self {
            config,
            session,
            entities,
            integrations,
            client_state,
        })
    }

    /// Route session and entity metrics to `sink` instead of the global counters.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.session = self.session.with_sink(Arc::clone(&sink));
        self.entities = self.entities.with_sink(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn session(&self) -> &SessionAccessor {
        &self.session
    }

    #[must_use]
    pub const fn entities(&self) -> &EntityClient {
        &self.entities
    }

    #[must_use]
    pub const fn integrations(&self) -> &Integrations {
        &self.integrations
    }

    #[must_use]
    pub const fn client_state(&self) -> &ClientStateStore {
        &self.client_state
    }

    //
    // Gate
    //

    /// Resolve the session (fetching it at most once) and evaluate the gate.
    /// Authorized visits are appended to the access log.
    pub async fn authorize(
        &self,
        requirements: &GateRequirements,
        route: &str,
        cancel: &CancellationToken,
    ) -> Decision {
        let status = SessionStatus::from(self.session.current(cancel).await);
        let decision = evaluate(&status, requirements, route, &self.config.app.setup_route);

        tracing::debug!(route, decision = %decision.kind(), "gate");
        if let Some(user) = decision.user()
            && let Err(err) = self.client_state.record_access(route, Some(&user.email))
        {
            tracing::warn!(error = %err, "access log not saved");
        }

        decision
    }

    /// Evaluate the gate against the current session snapshot without waiting.
    #[must_use]
    pub fn gate(&self, requirements: &GateRequirements, route: &str) -> Decision {
        evaluate(
            &self.session.status(),
            requirements,
            route,
            &self.config.app.setup_route,
        )
    }

    /// Where `action` on `decision`'s denial screen leads, using the
    /// configured login and home routes. Login carries `route` back.
    #[must_use]
    pub fn action_target(
        &self,
        decision: &Decision,
        action: GateAction,
        route: &str,
    ) -> Option<NavigationTarget> {
        let routes = GateRoutes {
            home: &self.config.app.home_route,
            login: &self.config.app.login_route,
        };

        decision.target(action, route, routes)
    }

    //
    // Session
    //

    /// Sign out and drop every cached read.
    pub async fn logout(&self, cancel: &CancellationToken) -> Result<(), Error> {
        self.session.logout(cancel).await?;
        self.entities.cache().clear();

        Ok(())
    }

    pub async fn complete_setup(
        &self,
        user_type: UserType,
        cancel: &CancellationToken,
    ) -> Result<SessionUser, Error> {
        Ok(self.session.complete_setup(user_type, cancel).await?)
    }

    //
    // Views
    //

    /// Category rollup options with the configured top-N.
    #[must_use]
    pub const fn category_options(&self, scope: StatusScope) -> CategoryRollupOptions {
        CategoryRollupOptions::new(scope, self.config.views.top_categories)
    }

    /// Fetch transactions and build the financial dashboard views.
    pub async fn financial_overview(
        &self,
        scope: StatusScope,
        cancel: &CancellationToken,
    ) -> Result<FinancialOverview, Error> {
        let transactions: Vec<Transaction> = self
            .entities
            .query_as(Filter::new(), Some(Sort::desc("date")), cancel)
            .await?;
        let options = self
            .category_options(scope)
            .with_kind(TransactionKind::Despesa);

        Ok(FinancialOverview {
            monthly: monthly_rollup(&transactions),
            summary: summary(&transactions),
            expense_categories: category_rollup(&transactions, &options),
        })
    }
}

///
/// FinancialOverview
///

#[derive(Clone, Debug, PartialEq)]
pub struct FinancialOverview {
    pub monthly: MonthlyRollup,
    pub summary: FinancialSummary,
    pub expense_categories: Vec<CategoryTotal>,
}

const fn retry_policy(config: RetryConfig) -> RetryPolicy {
    RetryPolicy::new(config.max_retries, config.delay())
}

fn config_error(err: ConfigError) -> Error {
    let message = match err.field() {
        Some(field) => format!("invalid configuration: {field}"),
        None => "invalid configuration".to_string(),
    };

    Error::new(ErrorCode::ConfigError, ErrorOrigin::Config, message).with_details(err.to_string())
}

///
/// TESTS
///
