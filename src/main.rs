use std::fmt::Debug;
use std::hash::Hash;

use actix_web::{get, middleware, App, HttpRequest, HttpResponse, HttpServer, Responder};
use futures::future::{join_all, BoxFuture, FutureExt};
use kube::core::NamespaceResourceScope;
use kube::{Client, Resource};
use kube_runtime::watcher;
use sqlx::PgPool;
use tracing::{event, Level};

use edp_reconciler::config::Config;
use edp_reconciler::reconciler::*;
use edp_reconciler::{crd, db, telemetry, Context, Controller};

#[get("/healthz")]
async fn healthz(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[get("/readyz")]
async fn readyz(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok().body("ok")
}

fn watch<Ctx>(client: &Client, namespace: Option<&str>, context: Ctx) -> BoxFuture<'static, ()>
where
    Ctx: Context + Send + Sync + 'static,
    Ctx::Error: Send + Sync + 'static,
    Ctx::Resource: Resource<Scope = NamespaceResourceScope>,
    Ctx::Resource: Clone + Debug + serde::Serialize + Send + Sync + 'static,
    for<'de> Ctx::Resource: serde::Deserialize<'de>,
    <Ctx::Resource as Resource>::DynamicType: Eq + Clone + Hash + Default + Debug + Unpin,
{
    let client = client.clone();
    let wc = watcher::Config::default();
    let controller = match namespace {
        Some(namespace) => Controller::namespaced(client, context, namespace, wc),
        None => Controller::namespaced_all(client, context, wc),
    };
    controller.run().boxed()
}

fn controllers(
    client: &Client,
    pool: &PgPool,
    namespace: Option<&str>,
) -> Vec<BoxFuture<'static, ()>> {
    vec![
        watch(client, namespace, CodebaseReconciler::new(pool.clone())),
        watch(client, namespace, CodebaseBranchReconciler::new(pool.clone())),
        watch(client, namespace, CDPipelineReconciler::new(pool.clone())),
        watch(client, namespace, StageReconciler::new(pool.clone())),
        watch(client, namespace, GitServerReconciler::new(pool.clone())),
        watch(client, namespace, JiraServerReconciler::new(pool.clone())),
        watch(client, namespace, PerfServerReconciler::new(pool.clone())),
        watch(
            client,
            namespace,
            PerfDataSourceReconciler::<crd::PerfDataSourceJenkins>::new(pool.clone()),
        ),
        watch(
            client,
            namespace,
            PerfDataSourceReconciler::<crd::PerfDataSourceSonar>::new(pool.clone()),
        ),
        watch(client, namespace, EDPComponentReconciler::new(pool.clone())),
        watch(client, namespace, ThirdPartyServiceReconciler::new(pool.clone())),
        watch(client, namespace, JenkinsSlaveReconciler::new(pool.clone())),
        watch(client, namespace, JobProvisioningReconciler::new(pool.clone())),
        watch(client, namespace, JenkinsJobReconciler::new(pool.clone())),
    ]
}

async fn app_main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.debug_mode)?;

    let pool = db::connect(&config).await?;
    let client = Client::try_default().await?;

    let namespace = config.watch_namespace.as_deref();
    event!(
        Level::INFO,
        namespace = namespace.unwrap_or("*"),
        db_host = %config.db_host,
        "Starting edp reconciler."
    );
    let controllers = join_all(controllers(&client, &pool, namespace));

    let server = HttpServer::new(|| {
        App::new()
            .wrap(middleware::Logger::default().exclude("/healthz").exclude("/readyz"))
            .service(healthz)
            .service(readyz)
    })
    .bind(config.health_probe_bind_address)?
    .shutdown_timeout(5);

    // Both shut down on SIGTERM, so poll until both are done
    tokio::join!(controllers, server.run()).1?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(app_main())
}
