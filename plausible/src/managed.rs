//! Generic reconciler for managed records.
//!
//! Each tick observes the remote object, then creates or updates it, and
//! finally writes the external name and status back onto the record. Kinds
//! plug in through [`External`], which knows how to talk to Plausible about
//! one kind of object.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::StreamExt;
use kube::{
    api::{Patch, PatchParams},
    runtime::{controller::Action, watcher, Controller},
    Api, Client, Resource, ResourceExt,
};
use plausible_crds::{
    Condition, DeletionPolicy, ExternalName, Managed, ManagedStatus, EXTERNAL_NAME_ANNOTATION,
};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::{
    client::PlausibleClient,
    config::Config,
    connection::ConnectionResolver,
    error::{Error, ErrorKind, Result},
    store::ClusterStore,
};

pub const CONTROLLER_NAME: &str = "plausible.crossplane.io/provider";

pub const FINALIZER: &str = "finalizer.managedresource.crossplane.io";

/// A record as seen by one reconcile tick.
///
/// The external name is lifted out of the annotations into a typed field.
/// It can be set by discovery only while unset ([`Desired::adopt`]), by a
/// create ([`Desired::bind`]), or by an explicit rename ([`Desired::rename`]).
#[derive(Debug, Clone)]
pub struct Desired<K> {
    record: K,
    identity: Option<ExternalName>,
    identity_changed: bool,
}

impl<K: Managed> Desired<K> {
    pub fn new(record: K) -> Self {
        let identity = ExternalName::of(&record);

        Desired {
            record,
            identity,
            identity_changed: false,
        }
    }

    pub fn record(&self) -> &K {
        &self.record
    }

    pub fn identity(&self) -> Option<&ExternalName> {
        self.identity.as_ref()
    }

    /// The external name, for operations that only make sense once the
    /// record is bound to a remote object.
    pub fn require_identity(&self) -> Result<&ExternalName> {
        self.identity.as_ref().ok_or_else(|| {
            Error::MissingIdentity(format!("{} {}", K::kind(&()), self.record.name_any()))
        })
    }

    /// Whether the external name differs from the one the record was read with.
    pub fn identity_changed(&self) -> bool {
        self.identity_changed
    }

    /// Bind to a discovered remote object, unless already bound.
    pub fn adopt(&mut self, identity: ExternalName) {
        if self.identity.is_none() {
            self.set_identity(identity);
        }
    }

    /// Bind to a freshly created remote object.
    pub fn bind(&mut self, identity: ExternalName) {
        self.set_identity(identity);
    }

    /// Follow the remote object to its new identifier after a rename.
    pub fn rename(&mut self, identity: ExternalName) {
        self.set_identity(identity);
    }

    fn set_identity(&mut self, identity: ExternalName) {
        if self.identity.as_ref() == Some(&identity) {
            return;
        }

        identity.apply_to(&mut self.record);
        self.identity = Some(identity);
        self.identity_changed = true;
    }

    pub fn status_mut(&mut self) -> &mut ManagedStatus<K::Observation> {
        self.record.managed_status_mut()
    }
}

/// Result of observing the remote counterpart of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed<O> {
    Missing,
    Present {
        identity: ExternalName,
        at_provider: O,
        /// Whether every field that can be changed remotely already matches.
        up_to_date: bool,
    },
}

/// Remote operations for one kind of record.
///
/// `observe` finds the remote object by external name if the record has
/// one, and by the kind's natural key otherwise. A remote object that is
/// absent is [`Observed::Missing`], not an error.
#[async_trait]
pub trait External: Send + Sync {
    type Kind: Managed;

    async fn observe(
        &self,
        desired: &Desired<Self::Kind>,
    ) -> Result<Observed<<Self::Kind as Managed>::Observation>>;

    /// Create the remote object, returning its identifier.
    async fn create(&self, desired: &Desired<Self::Kind>) -> Result<ExternalName>;

    /// Move the remote object towards the desired state. Returns a new
    /// identifier if the update changed it.
    async fn update(&self, desired: &Desired<Self::Kind>) -> Result<Option<ExternalName>>;

    /// Delete the remote object. A 404 may be returned as an error, the
    /// caller treats it as success.
    async fn delete(&self, desired: &Desired<Self::Kind>) -> Result<()>;
}

/// A record kind with a reconciler.
pub trait ManagedKind: Managed {
    type External: External<Kind = Self>;

    fn external(client: PlausibleClient, store: Arc<dyn ClusterStore>) -> Self::External;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    UpToDate,
}

/// Bring the remote object in line with `desired`, recording the
/// observation, conditions and external name on it.
pub async fn sync<E: External>(external: &E, desired: &mut Desired<E::Kind>) -> Result<Outcome> {
    match external.observe(desired).await? {
        Observed::Missing => {
            let status = desired.status_mut();
            status.at_provider = None;
            status.set_condition(Condition::creating());

            let identity = external.create(desired).await?;
            info!(
                kind = %<E::Kind as Resource>::kind(&()),
                name = %desired.record().name_any(),
                external_name = %identity,
                "created remote object"
            );
            desired.bind(identity);

            Ok(Outcome::Created)
        }
        Observed::Present {
            identity,
            at_provider,
            up_to_date,
        } => {
            desired.adopt(identity);

            let status = desired.status_mut();
            status.at_provider = Some(at_provider);
            status.set_condition(Condition::available());

            if up_to_date {
                return Ok(Outcome::UpToDate);
            }

            if let Some(identity) = external.update(desired).await? {
                info!(
                    kind = %<E::Kind as Resource>::kind(&()),
                    name = %desired.record().name_any(),
                    external_name = %identity,
                    "remote object renamed"
                );
                desired.rename(identity);
            }

            Ok(Outcome::Updated)
        }
    }
}

/// Delete the remote counterpart of a record that is being deleted.
///
/// Records that were never bound are looked up by natural key first. A
/// remote object that is already gone counts as deleted.
pub async fn finalize<E: External>(external: &E, desired: &mut Desired<E::Kind>) -> Result<()> {
    if desired.record().deletion_policy() == DeletionPolicy::Orphan {
        info!(name = %desired.record().name_any(), "orphaning remote object");
        return Ok(());
    }

    if desired.identity().is_none() {
        match external.observe(desired).await? {
            Observed::Missing => {
                debug!(name = %desired.record().name_any(), "no remote object to delete");
                return Ok(());
            }
            Observed::Present { identity, .. } => desired.adopt(identity),
        }
    }

    desired.status_mut().set_condition(Condition::deleting());

    match external.delete(desired).await {
        Ok(()) => Ok(()),
        Err(error) if error.is_not_found() => {
            debug!(name = %desired.record().name_any(), "remote object already deleted");
            Ok(())
        }
        Err(error) => Err(error),
    }
}

/// Shared state of every controller.
pub struct Context {
    pub client: Client,
    pub store: Arc<dyn ClusterStore>,
    pub resolver: ConnectionResolver,
    pub config: Config,
}

impl Context {
    async fn connect<K: ManagedKind>(&self, record: &K) -> Result<K::External> {
        let connection = self.resolver.resolve(record).await?;
        let client = PlausibleClient::new(connection, self.config.request_timeout)?;

        Ok(K::external(client, self.store.clone()))
    }
}

pub async fn controller<K: ManagedKind>(ctx: Arc<Context>) {
    let records = Api::<K>::all(ctx.client.clone());

    Controller::new(records, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile::<K>, error_policy::<K>, ctx)
        .for_each(|res| async move {
            match res {
                Ok((record, _)) => info!(record = %record, "reconciled"),
                Err(e) => warn!(error = %e, "reconcile failed"),
            }
        })
        .await;
}

async fn reconcile<K: ManagedKind>(record: Arc<K>, ctx: Arc<Context>) -> Result<Action> {
    let api = Api::<K>::namespaced(ctx.client.clone(), &record.namespace().unwrap_or_default());

    let result = if record.meta().deletion_timestamp.is_some() {
        reconcile_deletion(&api, &record, &ctx).await
    } else {
        reconcile_existence(&api, &record, &ctx).await
    };

    if let Err(error) = &result {
        let mut status = record.managed_status().cloned().unwrap_or_default();
        report_error(&mut status, error);

        if let Err(patch_error) = patch_status(&api, &record.name_any(), &status).await {
            warn!(
                name = %record.name_any(),
                error = %patch_error,
                "cannot report reconcile error"
            );
        }
    }

    result
}

/// Record a failed tick on `status`. Errors that retrying cannot fix also
/// take the record out of `Ready`.
fn report_error<O>(status: &mut ManagedStatus<O>, error: &Error) {
    if matches!(
        error.kind(),
        ErrorKind::Configuration | ErrorKind::Validation
    ) {
        status.set_condition(Condition::unavailable(error.to_string()));
    }

    status.set_condition(Condition::reconcile_error(error.to_string()));
}

/// Run the remote part of a tick, giving up after `deadline`. Identity and
/// status are only written once this returns successfully.
async fn within<T>(deadline: Duration, work: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(deadline, work)
        .await
        .map_err(|_| Error::Timeout(deadline))?
}

async fn reconcile_existence<K: ManagedKind>(
    api: &Api<K>,
    record: &K,
    ctx: &Context,
) -> Result<Action> {
    let resource_version = ensure_finalizer(api, record).await?;

    let mut desired = Desired::new(record.clone());

    let outcome = within(ctx.config.reconcile_timeout, async {
        let external = ctx.connect::<K>(record).await?;
        sync(&external, &mut desired).await
    })
    .await?;

    debug!(name = %record.name_any(), ?outcome, "synced");

    if desired.identity_changed() {
        if let Some(identity) = desired.identity() {
            persist_identity(api, &record.name_any(), resource_version, identity).await?;
        }
    }

    desired
        .status_mut()
        .set_condition(Condition::reconcile_success());

    if let Some(status) = desired.record().managed_status() {
        patch_status(api, &record.name_any(), status).await?;
    }

    Ok(Action::requeue(ctx.config.poll_interval))
}

async fn reconcile_deletion<K: ManagedKind>(
    api: &Api<K>,
    record: &K,
    ctx: &Context,
) -> Result<Action> {
    if !record.finalizers().iter().any(|finalizer| finalizer == FINALIZER) {
        return Ok(Action::await_change());
    }

    if record.deletion_policy() == DeletionPolicy::Delete {
        let mut desired = Desired::new(record.clone());

        within(ctx.config.reconcile_timeout, async {
            let external = ctx.connect::<K>(record).await?;
            finalize(&external, &mut desired).await
        })
        .await?;
    } else {
        info!(name = %record.name_any(), "orphaning remote object");
    }

    remove_finalizer(api, record).await?;

    Ok(Action::await_change())
}

/// Add the finalizer if missing, returning the resource version to write
/// the external name against.
async fn ensure_finalizer<K: ManagedKind>(api: &Api<K>, record: &K) -> Result<Option<String>> {
    if record.finalizers().iter().any(|finalizer| finalizer == FINALIZER) {
        return Ok(record.resource_version());
    }

    let mut finalizers = record.finalizers().to_vec();
    finalizers.push(FINALIZER.to_string());

    let patched = api
        .patch_metadata(
            &record.name_any(),
            &PatchParams::apply(CONTROLLER_NAME),
            &Patch::Merge(json!({
                "metadata": {
                    "finalizers": finalizers,
                }
            })),
        )
        .await?;

    Ok(patched.resource_version())
}

async fn remove_finalizer<K: ManagedKind>(api: &Api<K>, record: &K) -> Result<()> {
    let finalizers: Vec<&String> = record
        .finalizers()
        .iter()
        .filter(|finalizer| *finalizer != FINALIZER)
        .collect();

    api.patch_metadata(
        &record.name_any(),
        &PatchParams::apply(CONTROLLER_NAME),
        &Patch::Merge(json!({
            "metadata": {
                "finalizers": finalizers,
            }
        })),
    )
    .await?;

    Ok(())
}

/// Write the external name, failing with a conflict if the record changed
/// since `resource_version`.
async fn persist_identity<K: ManagedKind>(
    api: &Api<K>,
    name: &str,
    resource_version: Option<String>,
    identity: &ExternalName,
) -> Result<()> {
    info!(name, external_name = %identity, "recording external name");

    let mut metadata = json!({
        "annotations": {
            EXTERNAL_NAME_ANNOTATION: identity.as_str(),
        },
    });
    if let Some(resource_version) = resource_version {
        metadata["resourceVersion"] = json!(resource_version);
    }

    api.patch_metadata(
        name,
        &PatchParams::apply(CONTROLLER_NAME),
        &Patch::Merge(json!({
            "metadata": metadata,
        })),
    )
    .await?;

    Ok(())
}

async fn patch_status<K: ManagedKind>(
    api: &Api<K>,
    name: &str,
    status: &ManagedStatus<K::Observation>,
) -> Result<()> {
    api.patch_status(
        name,
        &PatchParams::apply(CONTROLLER_NAME),
        &Patch::Merge(json!({
            "status": status,
        })),
    )
    .await?;

    Ok(())
}

fn error_policy<K: ManagedKind>(record: Arc<K>, error: &Error, ctx: Arc<Context>) -> Action {
    error!(
        kind = %K::kind(&()),
        name = %record.name_any(),
        error = %error,
        "reconcile failed"
    );
    Action::requeue(ctx.config.error_backoff)
}
