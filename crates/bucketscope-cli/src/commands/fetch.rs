//! `fetch`: download one object by name.

use std::path::Path;

use anyhow::Context;
use bucketscope_core::session::ConnectionContext;
use bucketscope_core::store::ObjectStoreService;
use tokio::io::AsyncWriteExt;

use crate::config::SessionConfig;

pub async fn run(
    store: &ObjectStoreService,
    session: &SessionConfig,
    name: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let context = ConnectionContext::new(
        session.bucket.clone().unwrap_or_default(),
        session.token.clone().unwrap_or_default(),
        session.path.clone(),
    )?;

    let object = store
        .fetch_object(&context.bucket, name, &context.token)
        .await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &object.data)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Saved {} bytes{} to {}",
                object.data.len(),
                object
                    .content_type
                    .as_deref()
                    .map(|content_type| format!(" ({content_type})"))
                    .unwrap_or_default(),
                path.display()
            );
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&object.data).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
