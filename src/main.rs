use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use kube_inventory::sink::{to_line_protocol, write_lines, BufferAccumulator};
use kube_inventory::{default_registry, load_config, Config, Gatherer, KubeConnector};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    info!("url = {}, namespace = {:?}", cfg.url, cfg.namespace);

    let gatherer = Gatherer::new(KubeConnector, default_registry());
    let acc = Arc::new(BufferAccumulator::new());

    let Some(every) = cfg.poll_interval else {
        return poll_and_emit(&gatherer, &cfg, &acc).await;
    };

    info!("polling every {:?}", every);
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = poll_and_emit(&gatherer, &cfg, &acc).await {
                    error!("poll failed: {:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                gatherer.shutdown();
                break;
            }
        }
    }

    Ok(())
}

async fn poll_and_emit(gatherer: &Gatherer<KubeConnector>, cfg: &Config, acc: &Arc<BufferAccumulator>) -> Result<()> {
    let summary = gatherer.poll(cfg, acc.clone()).await?;

    let lines: Vec<String> = acc.drain().iter().filter_map(to_line_protocol).collect();
    let failures = acc.drain_errors();
    info!(
        "{} collector(s) ran, {} failed, {} metric(s) gathered",
        summary.ran.len(),
        failures.len() + summary.panicked.len(),
        lines.len()
    );

    match cfg.output_url.as_deref() {
        Some(url) if !lines.is_empty() => write_lines(url, &lines).await?,
        Some(_) => info!("No metrics gathered, skipping write"),
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
