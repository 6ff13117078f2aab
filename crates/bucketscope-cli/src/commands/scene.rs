//! `scene`: detail view of one record.

use std::path::Path;

use anyhow::Context;
use bucketscope_core::loader::{HandleRegistry, ImageSlot};
use bucketscope_core::navigation::Navigator;

use super::scene_image;
use crate::render;

pub async fn run(
    navigator: &Navigator,
    registry: &HandleRegistry,
    index: usize,
    save_image: Option<&Path>,
) -> anyhow::Result<()> {
    let scenes = navigator.scenes();
    let record = scenes.get(index).with_context(|| {
        format!("no scene #{index}: {} scene(s) at this path", scenes.len())
    })?;

    print!("{}", render::scene_detail(index, record));

    let Some(identity) = scene_image(navigator, record) else {
        return Ok(());
    };

    let name = identity.name.clone();
    let mut slot = ImageSlot::new(navigator.store().clone(), registry.clone());
    let state = slot.load(identity).await;
    println!("{}", render::load_state(&name, state));

    if let Some(path) = save_image {
        let bytes = state
            .handle()
            .and_then(|handle| handle.bytes())
            .with_context(|| format!("image {name} could not be loaded"))?;
        tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved {} bytes to {}", bytes.len(), path.display());
    }

    Ok(())
}
