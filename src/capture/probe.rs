use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::models::{ImageDimensions, ImageHandle};

use super::ImageProbe;

/// Measures images stored on the local filesystem, addressed either by a
/// `file://` URI or a plain path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageProbe;

impl FileImageProbe {
    fn path_for(image: &ImageHandle) -> Result<PathBuf> {
        let raw = image.as_str();
        let path = match raw.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => bail!("unsupported image scheme '{scheme}'"),
            None => raw,
        };
        if path.is_empty() {
            bail!("empty image path");
        }
        Ok(PathBuf::from(path))
    }
}

#[async_trait]
impl ImageProbe for FileImageProbe {
    async fn measure(&self, image: &ImageHandle) -> Result<ImageDimensions> {
        let path = Self::path_for(image)?;
        let (width, height) = tokio::task::spawn_blocking({
            let path = path.clone();
            move || image::image_dimensions(&path)
        })
        .await
        .context("image probe worker join failed")?
        .with_context(|| format!("failed to read dimensions of {}", path.display()))?;
        Ok(ImageDimensions::new(width, height))
    }
}
