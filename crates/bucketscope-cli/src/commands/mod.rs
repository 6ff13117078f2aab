//! Command implementations.

mod browse;
mod fetch;
mod list;
mod scene;
mod summarize;

use anyhow::Context;
use bucketscope_core::loader::{HandleRegistry, ResourceIdentity};
use bucketscope_core::navigation::{NavigationState, Navigator};
use bucketscope_core::scenes::{SceneRecord, derive_image_reference, resolve_image_object};
use bucketscope_core::store::ObjectStoreService;
use bucketscope_core::summary::SummaryService;
use bucketscope_gcs::GcsClient;
use bucketscope_rig::{GeminiConfig, GeminiGenerator};

use crate::TRACING_TARGET_CONFIG;
use crate::config::{Cli, Command, SessionConfig};

/// Runs the parsed command to completion.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let store = GcsClient::new(cli.gcs.clone())
        .context("failed to create storage client")?
        .into_service();

    match cli.command {
        Command::List => {
            let navigator = connect(store, &cli.session).await?;
            list::run(&navigator, cli.columns);
        }
        Command::Scene { index, save_image } => {
            let navigator = connect(store, &cli.session).await?;
            scene::run(&navigator, &HandleRegistry::new(), index, save_image.as_deref()).await?;
        }
        Command::Fetch { ref name, ref output } => {
            fetch::run(&store, &cli.session, name, output.as_deref()).await?;
        }
        Command::Summarize => {
            let summary = summary_service(&cli.gemini)?;
            let mut navigator = connect(store, &cli.session).await?;
            summarize::run(&mut navigator, &summary).await;
        }
        Command::Browse => {
            let summary = summary_service(&cli.gemini)
                .inspect_err(|error| {
                    tracing::warn!(
                        target: TRACING_TARGET_CONFIG,
                        error = %error,
                        "Summaries are unavailable"
                    );
                })
                .ok();
            let mut navigator = Navigator::new(store);
            // Connection problems are shown in the prompt, where they can be retried.
            if let Err(error) = authenticate(&mut navigator, &cli.session).await {
                println!("{error}");
            }
            browse::run(navigator, summary, cli.columns).await?;
        }
    }

    Ok(())
}

/// Authenticates with the configured session.
async fn authenticate(navigator: &mut Navigator, session: &SessionConfig) -> anyhow::Result<()> {
    navigator
        .authenticate(
            session.bucket.clone().unwrap_or_default(),
            session.token.clone().unwrap_or_default(),
            session.path.clone(),
        )
        .await
        .context("cannot connect: pass --bucket and --token (or GCS_BUCKET and GCS_ACCESS_TOKEN)")?;
    Ok(())
}

/// Authenticates and requires the first listing to succeed.
async fn connect(store: ObjectStoreService, session: &SessionConfig) -> anyhow::Result<Navigator> {
    let mut navigator = Navigator::new(store);
    authenticate(&mut navigator, session).await?;

    if let NavigationState::Error(message) = navigator.state() {
        anyhow::bail!("listing failed: {message}");
    }
    Ok(navigator)
}

fn summary_service(config: &GeminiConfig) -> anyhow::Result<SummaryService> {
    let generator = GeminiGenerator::new(config).context("summary model is not configured")?;
    Ok(generator.into_service())
}

/// Identity of the image a scene refers to, if any.
///
/// References resolve against the folder the scenes were listed from.
fn scene_image(navigator: &Navigator, record: &SceneRecord) -> Option<ResourceIdentity> {
    let context = navigator.context()?;
    let reference = derive_image_reference(record)?;
    Some(ResourceIdentity::new(
        &context.bucket,
        resolve_image_object(navigator.listed_path(), reference),
        context.token.clone(),
    ))
}
