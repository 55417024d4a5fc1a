//! Scope-bound fixture orchestration.
//!
//! Every provisioned remote resource registers its teardown at creation time
//! on a [`FixtureStack`]. Teardowns run in reverse registration order when the
//! scope exits, on every exit path including panics, and their failures are
//! logged rather than propagated: cleanup must not fail a test that already
//! passed.
//!
//! Name uniqueness across concurrently running test binaries is a naming
//! convention (one descriptive workspace per test module), not enforced here.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::client::datastore::PostgisParams;
use crate::client::GeoServerClient;
use crate::error::HarnessResult;

type TeardownFn = Box<dyn FnOnce() -> BoxFuture<'static, HarnessResult<()>> + Send>;

struct Teardown {
    label: String,
    run: TeardownFn,
}

/// A registry of deferred teardown actions.
///
/// Clones share the same underlying stack, so a fixture can hand the stack to
/// helpers that register their own finalizers.
#[derive(Clone, Default)]
pub struct FixtureStack {
    teardowns: Arc<Mutex<Vec<Teardown>>>,
}

impl FixtureStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a teardown to run at scope exit.
    pub fn defer<F, Fut>(&self, label: impl Into<String>, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = HarnessResult<()>> + Send + 'static,
    {
        let teardown = Teardown {
            label: label.into(),
            run: Box::new(move || f().boxed()),
        };
        self.teardowns
            .lock()
            .expect("fixture stack lock poisoned")
            .push(teardown);
    }

    /// Number of teardowns currently registered.
    pub fn pending(&self) -> usize {
        self.teardowns
            .lock()
            .expect("fixture stack lock poisoned")
            .len()
    }

    /// Run all registered teardowns in reverse registration order.
    ///
    /// Failures are logged and swallowed; every registered teardown is
    /// attempted exactly once.
    pub async fn teardown(&self) {
        let mut teardowns = {
            let mut guard = self
                .teardowns
                .lock()
                .expect("fixture stack lock poisoned");
            std::mem::take(&mut *guard)
        };

        while let Some(teardown) = teardowns.pop() {
            match (teardown.run)().await {
                Ok(()) => tracing::debug!(fixture = %teardown.label, "torn down"),
                Err(e) => {
                    tracing::warn!(fixture = %teardown.label, error = %e, "teardown failed")
                }
            }
        }
    }

    /// Run a test body with guaranteed teardown.
    ///
    /// Panics from the body are caught, teardown runs, then the panic resumes
    /// so the test still fails with its original message.
    pub async fn run<Fut, T>(&self, body: Fut) -> T
    where
        Fut: std::future::Future<Output = T>,
    {
        let outcome = AssertUnwindSafe(body).catch_unwind().await;
        self.teardown().await;

        match outcome {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// A workspace (optionally with a backing PostGIS datastore) whose deletion is
/// deferred on the stack at creation time.
pub struct WorkspaceFixture {
    pub workspace: String,
    pub datastore: Option<String>,
}

impl WorkspaceFixture {
    /// Create a workspace, deferring its recursive deletion.
    pub async fn create(
        client: &GeoServerClient,
        stack: &FixtureStack,
        workspace: &str,
        set_default: bool,
    ) -> HarnessResult<Self> {
        // Clear leftovers from a previous aborted run before creating.
        client.delete_workspace(workspace).await?;
        client
            .create_workspace(workspace, false, set_default)
            .await?
            .ensure_status(reqwest::StatusCode::CREATED)?;

        let cleanup_client = client.clone();
        let name = workspace.to_string();
        stack.defer(format!("workspace {}", workspace), move || async move {
            cleanup_client.delete_workspace(&name).await?;
            Ok(())
        });

        Ok(Self {
            workspace: workspace.to_string(),
            datastore: None,
        })
    }

    /// Create a workspace plus a PostGIS datastore, each with its own
    /// deferred teardown (datastore first on the way back out).
    pub async fn create_with_datastore(
        client: &GeoServerClient,
        stack: &FixtureStack,
        workspace: &str,
        datastore: &str,
        params: &PostgisParams,
    ) -> HarnessResult<Self> {
        let mut fixture = Self::create(client, stack, workspace, true).await?;

        client
            .create_postgis_datastore(workspace, datastore, params)
            .await?
            .ensure_status(reqwest::StatusCode::CREATED)?;

        let cleanup_client = client.clone();
        let ws = workspace.to_string();
        let ds = datastore.to_string();
        stack.defer(format!("datastore {}:{}", workspace, datastore), move || {
            async move {
                cleanup_client.delete_datastore(&ws, &ds).await?;
                Ok(())
            }
        });

        fixture.datastore = Some(datastore.to_string());
        Ok(fixture)
    }
}

/// Function-scoped factory: each `create` call provisions an independently
/// named workspace/datastore pair and self-registers its finalizer, so a test
/// can spin up several resource sets without cleanup bookkeeping.
pub struct WorkspaceFactory {
    client: GeoServerClient,
    stack: FixtureStack,
    params: PostgisParams,
}

impl WorkspaceFactory {
    pub fn new(client: GeoServerClient, stack: FixtureStack, params: PostgisParams) -> Self {
        Self {
            client,
            stack,
            params,
        }
    }

    /// Create a workspace and datastore both named `name`.
    pub async fn create(&self, name: &str) -> HarnessResult<WorkspaceFixture> {
        WorkspaceFixture::create_with_datastore(
            &self.client,
            &self.stack,
            name,
            name,
            &self.params,
        )
        .await
    }
}
