//! Example: a small deploy pipeline.
//!
//! Builds an artifact, runs checks two at a time, then hands the release id
//! to a watcher on another thread through a future/promise pair.
//!
//! Run with: `RUST_LOG=conflux=debug cargo run --example deploy_pipeline -p conflux`

use conflux::conflux_future::Future;
use conflux::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let release = Arc::new(Future::<String>::new());
    let watcher = {
        let promise = release.promise();
        std::thread::spawn(move || match promise.wait() {
            Some(id) => println!("watcher: release {id} is live"),
            None => println!("watcher: release was abandoned"),
        })
    };

    let build = FnAction::named("build", |_ctx, state| async move {
        state.insert("artifact", String::from("app-1.4.2.tar.gz"));
        Ok(())
    });

    let checks: Vec<Arc<dyn Action>> = ["lint", "unit", "integration", "audit"]
        .into_iter()
        .map(|name| {
            FnAction::named(name, move |ctx, _state| async move {
                if ctx.is_cancelled() {
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
                println!("check {name} passed");
                Ok(())
            })
            .arc()
        })
        .collect();

    let publish = {
        let release = Arc::clone(&release);
        FnAction::named("publish", move |_ctx, state| {
            let release = Arc::clone(&release);
            async move {
                let artifact = state
                    .get::<String>("artifact")
                    .ok_or_else(|| ActionError::msg("no artifact to publish"))?;
                release.set(format!("rel-{artifact}"));
                Ok(())
            }
        })
    };

    let config = ThrottleConfig::from_env()?;
    let pipeline = Linear::new([
        build.arc(),
        ThrottledAsync::from_config(&config, checks)?.named("checks").arc(),
        publish.arc(),
    ]);

    let ctx = ExecContext::new().with_timeout(Duration::from_secs(10));
    let result = pipeline.run(&ctx, &RunState::new()).await;
    if let Err(err) = &result {
        eprintln!("pipeline failed in {:?}: {}", err.chain(), err.root());
        release.cancel();
    }

    watcher.join().map_err(|_| "watcher thread panicked")?;
    result.map_err(Into::into)
}
