//! # Release pipeline
//!
//! Demonstrates actionflow features:
//! - Actions ordered by their imports, not by registration order
//! - Named exports of the same type
//! - Services and defaults resolved at activation
//! - Trace log attached to the target
//! - Ordinary failures swallowed, the run continues
//!
//! Run with `RUST_LOG=debug cargo run --example pipeline` to see scheduler logs.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use actionflow::{
    Action, ActionBuilder, ActionContext, ActionError, ActionRegistry, ActionTrace, ActionType,
    SequenceConfig, ServiceMap, TraceEvent, Traceable, WaveExecution,
};

/// The run target: one release being built.
struct Release {
    version: String,
    trace: ActionTrace,
}

impl Traceable for Release {
    fn action_trace(&self) -> Option<&ActionTrace> {
        Some(&self.trace)
    }
}

struct Sources(Vec<&'static str>);
struct Artifact(String);
struct Registry(String);

/// Checks out the sources.
struct Checkout {
    ctx: ActionContext,
}

#[async_trait]
impl Action<Release> for Checkout {
    async fn execute(&self, release: &Release, _: CancellationToken) -> Result<(), ActionError> {
        println!("📥 checkout {}", release.version);
        self.ctx.export(Sources(vec!["main.rs", "lib.rs"]))?;
        Ok(())
    }
}

impl ActionType<Release> for Checkout {
    fn describe() -> ActionBuilder<Release> {
        ActionBuilder::for_type::<Self>()
            .description("git")
            .factory(|args| Ok(Checkout { ctx: args.context() }))
    }
}

/// Builds the binary and the docs as two named artifacts.
struct Build {
    sources: Arc<Sources>,
    ctx: ActionContext,
}

#[async_trait]
impl Action<Release> for Build {
    async fn execute(
        &self,
        release: &Release,
        cancel: CancellationToken,
    ) -> Result<(), ActionError> {
        if cancel.is_cancelled() {
            return Err(ActionError::Canceled);
        }
        println!("🔨 build {} files", self.sources.0.len());
        self.ctx
            .export_named("bin", Artifact(format!("app-{}", release.version)))?;
        self.ctx
            .export_named("docs", Artifact(format!("docs-{}.tar.gz", release.version)))?;
        Ok(())
    }
}

impl ActionType<Release> for Build {
    fn describe() -> ActionBuilder<Release> {
        ActionBuilder::for_type::<Self>()
            .import::<Sources>()
            .factory(|args| {
                Ok(Build {
                    sources: args.get(0)?,
                    ctx: args.context(),
                })
            })
    }
}

/// Publishes the binary to the configured registry.
struct Publish {
    bin: Arc<Artifact>,
    registry: Arc<Registry>,
    retries: u8,
}

#[async_trait]
impl Action<Release> for Publish {
    async fn execute(&self, _: &Release, _: CancellationToken) -> Result<(), ActionError> {
        println!(
            "🚀 publish {} to {} (retries: {})",
            self.bin.0, self.registry.0, self.retries
        );
        Ok(())
    }
}

impl ActionType<Release> for Publish {
    fn describe() -> ActionBuilder<Release> {
        ActionBuilder::for_type::<Self>()
            .import_named::<Artifact>("bin")
            .service::<Registry>()
            .service_or(3_u8)
            .factory(|args| {
                Ok(Publish {
                    bin: args.get(0)?,
                    registry: args.get(1)?,
                    retries: args.cloned(2)?,
                })
            })
    }
}

/// Uploads the docs; the docs host is down today.
struct UploadDocs {
    docs: Arc<Artifact>,
}

#[async_trait]
impl Action<Release> for UploadDocs {
    async fn execute(&self, _: &Release, _: CancellationToken) -> Result<(), ActionError> {
        Err(ActionError::fail(format!("docs host unreachable for {}", self.docs.0)))
    }
}

impl ActionType<Release> for UploadDocs {
    fn describe() -> ActionBuilder<Release> {
        ActionBuilder::for_type::<Self>()
            .import_named::<Artifact>("docs")
            .factory(|args| Ok(UploadDocs { docs: args.get(0)? }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut registry = ActionRegistry::<Release>::new();
    registry.add::<Publish>()?;
    registry.add::<UploadDocs>()?;
    registry.add::<Build>()?;
    registry.add_with_priority::<Checkout>(-1)?;

    let mut cfg = SequenceConfig::default();
    cfg.execution = WaveExecution::Concurrent;

    let services = ServiceMap::new().with(Registry("crates.example.org".into()));
    let mut sequence = registry
        .into_factory()
        .builder()
        .with_config(cfg)
        .with_resolver(Arc::new(services))
        .build();

    let release = Release {
        version: "1.4.0".into(),
        trace: ActionTrace::new(),
    };
    let outcome = sequence.run(&release, CancellationToken::new()).await?;

    println!("\n✅ outcome: {}", outcome.as_str());
    for entry in release.trace.entries() {
        let marker = match entry.event {
            TraceEvent::Begin => "▶",
            TraceEvent::End => "■",
            TraceEvent::UnexpectedEnd => "✗",
        };
        match entry.error {
            Some(error) => println!("{marker} {:>3} {} ({error})", entry.seq, entry.identifier),
            None => println!("{marker} {:>3} {}", entry.seq, entry.identifier),
        }
    }
    Ok(())
}
