use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};

/// Asks a live cluster whether a namespace exists.
pub trait NamespaceChecker {
    fn namespace_exists(&self, kubeconfig: &[u8], namespace: &str) -> Result<bool>;
}

/// Looks the namespace up through the API server of the kubeconfig's current context.
///
/// The lookup is a single call bounded by `timeout`; it is never retried.
pub struct KubeNamespaceChecker {
    timeout: Duration,
}

impl KubeNamespaceChecker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl NamespaceChecker for KubeNamespaceChecker {
    fn namespace_exists(&self, kubeconfig: &[u8], namespace: &str) -> Result<bool> {
        let raw = std::str::from_utf8(kubeconfig).context("kubeconfig is not valid UTF-8")?;
        let kubeconfig = Kubeconfig::from_yaml(raw).context("failed to parse kubeconfig")?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start runtime")?;
        runtime.block_on(async {
            tokio::time::timeout(self.timeout, lookup(kubeconfig, namespace))
                .await
                .map_err(|_| anyhow!("timed out after {}s", self.timeout.as_secs()))?
        })
    }
}

async fn lookup(kubeconfig: Kubeconfig, namespace: &str) -> Result<bool> {
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .context("failed to initialize config")?;
    let client = Client::try_from(config).context("failed to initialize k8s REST client")?;
    let api: Api<Namespace> = Api::all(client);
    let found = api.get_opt(namespace).await.with_context(|| format!("failed to query namespace {namespace:?}"))?;
    tracing::debug!(namespace, exists = found.is_some(), "namespace lookup");
    Ok(found.is_some())
}
