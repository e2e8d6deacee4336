use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::FutureExt;
use futures::stream::StreamExt;
use kube::api::Api;
use kube::core::NamespaceResourceScope;
use kube::{Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use kube_runtime::finalizer::{self, finalizer, Event};
use kube_runtime::watcher;
use rand::{thread_rng, Rng};
use tracing::{event, Level};

type Uids<T> = Arc<Mutex<BTreeMap<String, T>>>;

/// How long a remembered fingerprint suppresses events. Shorter than the
/// success requeue, so periodic resyncs always reach [`Context::apply`].
const FINGERPRINT_TTL: Duration = Duration::from_secs(30 * 60);

/// A fingerprint that was applied successfully, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Applied {
    fingerprint: u64,
    at: Instant,
}

impl Applied {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.at) < FINGERPRINT_TTL
    }
}

/// Whether an event can be skipped because the same fingerprint was applied
/// recently. Deletions are never skipped.
fn is_unchanged(
    last: Option<Applied>,
    fingerprint: Option<u64>,
    deleting: bool,
    now: Instant,
) -> bool {
    match (last, fingerprint) {
        (Some(last), Some(fingerprint)) if !deleting => {
            last.fingerprint == fingerprint && last.is_fresh(now)
        }
        _ => false,
    }
}

/// What to remember after a successful reconcile. Nothing is remembered
/// while the resource is being deleted or still waits for its finalizer.
fn remembered(
    fingerprint: Option<u64>,
    deleting: bool,
    has_finalizer: bool,
    now: Instant,
) -> Option<Applied> {
    match fingerprint {
        Some(fingerprint) if !deleting && has_finalizer => Some(Applied {
            fingerprint,
            at: now,
        }),
        _ => None,
    }
}

/// The [`Controller`] watches a set of resources, calling methods on the
/// provided [`Context`] when events occur.
pub struct Controller<Ctx: Context>
where
    Ctx: Send + Sync + 'static,
    Ctx::Error: Send + Sync + 'static,
    Ctx::Resource: Send + Sync + 'static,
    Ctx::Resource: Clone + std::fmt::Debug + serde::Serialize,
    for<'de> Ctx::Resource: serde::Deserialize<'de>,
    <Ctx::Resource as Resource>::DynamicType:
        Eq + Clone + std::hash::Hash + std::default::Default + std::fmt::Debug + std::marker::Unpin,
{
    client: kube::Client,
    make_api: Box<dyn Fn(&Ctx::Resource) -> Api<Ctx::Resource> + Sync + Send + 'static>,
    controller: kube_runtime::controller::Controller<Ctx::Resource>,
    context: Ctx,
}

impl<Ctx: Context> Controller<Ctx>
where
    Ctx: Send + Sync + 'static,
    Ctx::Error: Send + Sync + 'static,
    Ctx::Resource: Send + Sync + 'static,
    Ctx::Resource: Clone + std::fmt::Debug + serde::Serialize,
    for<'de> Ctx::Resource: serde::Deserialize<'de>,
    <Ctx::Resource as Resource>::DynamicType:
        Eq + Clone + std::hash::Hash + std::default::Default + std::fmt::Debug + std::marker::Unpin,
{
    /// Creates a new controller for a namespaced resource using the given
    /// `client`. The `context` given determines the type of resource
    /// to watch (via the [`Context::Resource`] type provided as part of
    /// the trait implementation). The resources to be watched will be
    /// limited to resources in the given `namespace`. A [`watcher::Config`]
    /// can be given to limit the resources watched (for instance,
    /// `watcher::Config::default().labels("app=myapp")`).
    pub fn namespaced(
        client: Client,
        context: Ctx,
        namespace: &str,
        wc: watcher::Config,
    ) -> Self
    where
        Ctx::Resource: Resource<Scope = NamespaceResourceScope>,
    {
        let controller = kube_runtime::controller::Controller::new(
            Api::<Ctx::Resource>::namespaced(client.clone(), namespace),
            wc,
        );
        Self::with_controller(client, context, controller)
    }

    /// Creates a new controller for a namespaced resource using the given
    /// `client`. The resources to be watched will not be limited by
    /// namespace.
    pub fn namespaced_all(client: Client, context: Ctx, wc: watcher::Config) -> Self
    where
        Ctx::Resource: Resource<Scope = NamespaceResourceScope>,
    {
        let controller = kube_runtime::controller::Controller::new(
            Api::<Ctx::Resource>::all(client.clone()),
            wc,
        );
        Self::with_controller(client, context, controller)
    }

    fn with_controller(
        client: Client,
        context: Ctx,
        controller: kube_runtime::controller::Controller<Ctx::Resource>,
    ) -> Self
    where
        Ctx::Resource: Resource<Scope = NamespaceResourceScope>,
    {
        let make_api = {
            let client = client.clone();
            Box::new(move |resource: &Ctx::Resource| match resource.namespace() {
                Some(namespace) => Api::<Ctx::Resource>::namespaced(client.clone(), &namespace),
                None => Api::<Ctx::Resource>::default_namespaced(client.clone()),
            })
        };
        Self {
            client,
            make_api,
            controller: controller.shutdown_on_signal(),
            context,
        }
    }

    /// Run the controller until the process is asked to shut down. The
    /// [`Context`] given to the constructor will have its
    /// [`apply`](Context::apply) method called when a resource is created or
    /// updated, and its [`cleanup`](Context::cleanup) method called when a
    /// resource is about to be deleted.
    ///
    /// Events whose [fingerprint](Context::fingerprint) matches the last one
    /// that was applied successfully, within the last half hour, are skipped.
    pub async fn run(self) {
        let Self {
            client,
            make_api,
            controller,
            context,
        } = self;
        let backoffs: Uids<u32> = Arc::new(Mutex::new(BTreeMap::new()));
        let fingerprints: Uids<Applied> = Arc::new(Mutex::new(BTreeMap::new()));
        let backoffs = &backoffs;
        let fingerprints = &fingerprints;
        controller
            .run(
                |resource, context| {
                    let uid = resource.uid().unwrap_or_default();
                    let backoffs = Arc::clone(backoffs);
                    let fingerprints = Arc::clone(fingerprints);
                    let client = client.clone();
                    let api = make_api(&resource);
                    async move {
                        let deleting = resource.meta().deletion_timestamp.is_some();
                        let fingerprint = context.fingerprint(&resource);
                        let last = fingerprints.lock().unwrap().get(&uid).copied();
                        if is_unchanged(last, fingerprint, deleting, Instant::now()) {
                            event!(
                                Level::DEBUG,
                                resource_name = %resource.name_any(),
                                controller = Ctx::CONTROLLER_NAME,
                                "Skipping unchanged resource."
                            );
                            return Ok(context.success_action(&resource));
                        }
                        let finalized = has_finalizer::<Ctx>(&resource);
                        let result = context._reconcile(client, api, resource).await;
                        if result.is_ok() {
                            backoffs.lock().unwrap().remove(&uid);
                            let now = Instant::now();
                            let mut fingerprints = fingerprints.lock().unwrap();
                            fingerprints.retain(|_, applied| applied.is_fresh(now));
                            match remembered(fingerprint, deleting, finalized, now) {
                                Some(applied) => {
                                    fingerprints.insert(uid, applied);
                                }
                                None => {
                                    fingerprints.remove(&uid);
                                }
                            }
                        }
                        result
                    }
                    .boxed()
                },
                |resource, err, context| {
                    let consecutive_errors = {
                        let uid = resource.uid().unwrap_or_default();
                        let mut backoffs = backoffs.lock().unwrap();
                        let consecutive_errors: u32 =
                            backoffs.get(&uid).copied().unwrap_or_default();
                        backoffs.insert(uid, consecutive_errors.saturating_add(1));
                        consecutive_errors
                    };
                    context.error_action(resource, err, consecutive_errors)
                },
                Arc::new(context),
            )
            .for_each(|reconciliation_result| async move {
                let dynamic_type = Default::default();
                let kind = Ctx::Resource::kind(&dynamic_type).into_owned();
                match reconciliation_result {
                    Ok(resource) => {
                        event!(
                            Level::DEBUG,
                            resource_name = %resource.0.name,
                            controller = Ctx::CONTROLLER_NAME,
                            "{} reconciliation successful.",
                            kind
                        );
                    }
                    Err(err) => event!(
                        Level::ERROR,
                        err = %err,
                        source = err.source(),
                        controller = Ctx::CONTROLLER_NAME,
                        "{} reconciliation error.",
                        kind
                    ),
                }
            })
            .await
    }
}

/// Whether the resource is in the state where `apply` results can be
/// remembered: it either carries the context's finalizer or none is needed.
fn has_finalizer<Ctx: Context>(resource: &Ctx::Resource) -> bool {
    match Ctx::FINALIZER_NAME {
        Some(name) => resource.finalizers().iter().any(|f| f == name),
        None => true,
    }
}

/// The [`Context`] trait should be implemented in order to provide callbacks
/// for events that happen to resources watched by a [`Controller`].
#[cfg_attr(docs_rs, feature(async_fn_in_trait))]
#[cfg_attr(not(docs_rs), async_trait::async_trait)]
pub trait Context {
    /// The type of Kubernetes [resource](Resource) that will be watched by
    /// the [`Controller`] this context is passed to
    type Resource: Resource + Send + Sync;
    /// The error type which will be returned by the [`apply`](Self::apply)
    /// and [`cleanup`](Self::apply) methods
    type Error: std::error::Error;

    /// Name used for this controller in logs.
    const CONTROLLER_NAME: &'static str;

    /// The name to use for the finalizer. This must be unique across
    /// controllers - if multiple controllers with the same finalizer name
    /// run against the same resource, unexpected behavior can occur.
    ///
    /// Without a finalizer, deleted resources are ignored and
    /// [`cleanup`](Self::cleanup) is never called.
    const FINALIZER_NAME: Option<&'static str>;

    /// A hash of the parts of the resource this context reacts to. Events
    /// whose fingerprint did not change since a recent successful
    /// [`apply`](Self::apply) are skipped and requeued with
    /// [`success_action`](Self::success_action). Returning `None` processes
    /// every event.
    fn fingerprint(&self, resource: &Self::Resource) -> Option<u64> {
        let _resource = resource;
        None
    }

    /// This method is called when a watched resource is created or updated.
    /// The [`Client`] used by the controller is passed in to allow making
    /// additional API requests, as is the resource which triggered this
    /// event. If this method returns `Some(action)`, the given action will
    /// be performed, otherwise if `None` is returned,
    /// [`success_action`](Self::success_action) will be called to find the
    /// action to perform.
    async fn apply(
        &self,
        client: Client,
        resource: &Self::Resource,
    ) -> Result<Option<Action>, Self::Error>;

    /// This method is called when a watched resource is marked for deletion.
    /// The finalizer is only removed once it returns `Ok`. The default
    /// implementation does nothing.
    async fn cleanup(
        &self,
        client: Client,
        resource: &Self::Resource,
    ) -> Result<Option<Action>, Self::Error> {
        let _client = client;
        let _resource = resource;
        Ok(None)
    }

    /// This method is called when a call to [`apply`](Self::apply) or
    /// [`cleanup`](Self::cleanup) returns `Ok(None)`. It should return the
    /// default [`Action`] to perform. The default implementation will
    /// requeue the event at a random time between 40 and 60 minutes in the
    /// future.
    fn success_action(&self, resource: &Self::Resource) -> Action {
        // use a better name for the parameter name in the docs
        let _resource = resource;

        Action::requeue(Duration::from_secs(thread_rng().gen_range(2400..3600)))
    }

    /// This method is called when a call to [`apply`](Self::apply) or
    /// [`cleanup`](Self::cleanup) returns `Err`. It should return the
    /// default [`Action`] to perform. The error returned will be passed in
    /// here, as well as a count of how many consecutive errors have happened
    /// for this resource, to allow for an exponential backoff strategy. The
    /// default implementation uses exponential backoff with a max of 256
    /// seconds and some added randomization to avoid thundering herds.
    fn error_action(
        self: Arc<Self>,
        resource: Arc<Self::Resource>,
        err: &finalizer::Error<Self::Error>,
        consecutive_errors: u32,
    ) -> Action {
        // use a better name for the parameter name in the docs
        let _resource = resource;
        let _err = err;

        let seconds = 2u64.pow(consecutive_errors.min(7) + 1);
        Action::requeue(Duration::from_millis(
            thread_rng().gen_range((seconds * 500)..(seconds * 1000)),
        ))
    }

    #[doc(hidden)]
    async fn _reconcile(
        self: Arc<Self>,
        client: Client,
        api: Api<Self::Resource>,
        resource: Arc<Self::Resource>,
    ) -> Result<Action, finalizer::Error<Self::Error>>
    where
        Self: Send + Sync + 'static,
        Self::Error: Send + Sync + 'static,
        Self::Resource: Send + Sync + 'static,
        Self::Resource: Clone + std::fmt::Debug + serde::Serialize,
        for<'de> Self::Resource: serde::Deserialize<'de>,
        <Self::Resource as Resource>::DynamicType: Eq
            + Clone
            + std::hash::Hash
            + std::default::Default
            + std::fmt::Debug
            + std::marker::Unpin,
    {
        let dynamic_type = Default::default();
        let kind = Self::Resource::kind(&dynamic_type).into_owned();
        let resource_name = resource.name_any();

        let Some(finalizer_name) = Self::FINALIZER_NAME else {
            if resource.meta().deletion_timestamp.is_some() {
                event!(
                    Level::DEBUG,
                    resource_name = %resource_name,
                    controller = Self::CONTROLLER_NAME,
                    "Ignoring deleted {}.",
                    kind
                );
                return Ok(Action::await_change());
            }
            event!(
                Level::INFO,
                resource_name = %resource_name,
                controller = Self::CONTROLLER_NAME,
                "Reconciling {} (apply).",
                kind
            );
            let action = self
                .apply(client, &resource)
                .await
                .map_err(finalizer::Error::ApplyFailed)?;
            return Ok(action.unwrap_or_else(|| self.success_action(&resource)));
        };

        let mut ran = false;
        let res = finalizer(&api, finalizer_name, Arc::clone(&resource), |event| async {
            ran = true;
            event!(
                Level::INFO,
                resource_name = %resource_name,
                controller = Self::CONTROLLER_NAME,
                "Reconciling {} ({}).",
                kind,
                match event {
                    Event::Apply(_) => "apply",
                    Event::Cleanup(_) => "cleanup",
                }
            );
            let action = match event {
                Event::Apply(resource) => {
                    let action = self.apply(client, &resource).await?;
                    if let Some(action) = action {
                        action
                    } else {
                        self.success_action(&resource)
                    }
                }
                Event::Cleanup(resource) => self
                    .cleanup(client, &resource)
                    .await?
                    .unwrap_or_else(Action::await_change),
            };
            Ok(action)
        })
        .await;
        if !ran {
            event!(
                Level::INFO,
                resource_name = %resource_name,
                controller = Self::CONTROLLER_NAME,
                "Reconciling {} ({}).",
                kind,
                if resource.meta().deletion_timestamp.is_some() {
                    "delete"
                } else {
                    "init"
                }
            );
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(fingerprint: u64, at: Instant) -> Option<Applied> {
        Some(Applied { fingerprint, at })
    }

    #[test]
    fn same_fingerprint_is_skipped_while_fresh() {
        let now = Instant::now();
        assert!(is_unchanged(applied(7, now), Some(7), false, now));
        assert!(!is_unchanged(applied(7, now), Some(8), false, now));
        assert!(!is_unchanged(None, Some(7), false, now));
        assert!(!is_unchanged(applied(7, now), None, false, now));
    }

    #[test]
    fn deletion_is_never_skipped() {
        let now = Instant::now();
        assert!(!is_unchanged(applied(7, now), Some(7), true, now));
    }

    #[test]
    fn fingerprint_expires() {
        let at = Instant::now();
        let later = at + FINGERPRINT_TTL;
        assert!(!is_unchanged(applied(7, at), Some(7), false, later));
        assert!(is_unchanged(
            applied(7, at),
            Some(7),
            false,
            later - Duration::from_secs(1)
        ));
    }

    #[test]
    fn only_settled_resources_are_remembered() {
        let now = Instant::now();
        assert_eq!(remembered(Some(7), false, true, now), applied(7, now));
        assert_eq!(remembered(Some(7), false, false, now), None);
        assert_eq!(remembered(Some(7), true, true, now), None);
        assert_eq!(remembered(None, false, true, now), None);
    }

    #[test]
    fn finalizer_presence() {
        use crate::crd::{self, CodebaseSpec};
        use crate::reconciler::CodebaseReconciler;

        let mut codebase = crd::Codebase::new("petclinic", CodebaseSpec::default());
        assert!(!has_finalizer::<CodebaseReconciler>(&codebase));
        codebase.metadata.finalizers = Some(vec![
            <CodebaseReconciler as Context>::FINALIZER_NAME
                .unwrap_or_default()
                .to_owned(),
        ]);
        assert!(has_finalizer::<CodebaseReconciler>(&codebase));

        let component = crd::EDPComponent::new("sonar", Default::default());
        assert!(has_finalizer::<crate::reconciler::EDPComponentReconciler>(&component));
    }
}
