use crate::{
    admission::Admission,
    clients::{ApiLookup, SubjectAccessReviewer},
    core::{self, BuildByStrategy, Plugins},
    metrics::AdmissionMetrics,
};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "build-admission",
    about = "Admits builds only when the requesting user may use their strategy"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "build_admission=info,warn",
        env = "BUILD_ADMISSION_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    server: kubert::ServerArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            server,
        } = self;

        let mut prom = <Registry>::default();
        let metrics = AdmissionMetrics::register(prom.sub_registry_with_prefix("build_admission"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_server(server)
            .build()
            .await?;

        // A gate without its clients must not start serving.
        let mut plugins = Plugins::default();
        core::register(&mut plugins);
        let gate = plugins
            .new_from_plugins(BuildByStrategy::NAME)?
            .with_reviewer(Arc::new(SubjectAccessReviewer::new(runtime.client())))
            .with_lookup(Arc::new(ApiLookup::new(runtime.client())))
            .build()?;
        info!(plugin = BuildByStrategy::NAME, "Initialized admission plugin");

        let admission = Admission::new(gate, metrics);
        let runtime = runtime.spawn_server(admission);

        // Block the main thread on the shutdown signal.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
