//! The per-request orchestration shared by both entry adapters: decode,
//! normalize, stage a private workspace, run the predictor, pick up its
//! output, encode it back. Strictly sequential for one request; isolation
//! between requests comes entirely from the workspace partitioning.

use crate::codec;
use crate::error::Error;
use crate::invoker::Invoke;
use crate::locate;
use crate::mask;
use crate::util;
use crate::workspace::WorkspaceManager;
use image::{DynamicImage, GrayImage, RgbaImage};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// How the normalized mask is laid out inside `input_root`. The predictor's
/// file-discovery rule is opaque, so both historical conventions are kept per
/// adapter rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskLayout {
    /// One `image_mask.png` next to `image.png` (the predictor matches
    /// `*mask*.png` in the same tree as the image). HTTP service convention.
    Sibling,
    /// The mask duplicated under `mask/image.png` and `masks/image.png`.
    /// Batch handler convention.
    Subdirs,
}

pub struct Pipeline<I> {
    workspaces: WorkspaceManager,
    invoker: I,
    layout: MaskLayout,
}

impl<I: Invoke> Pipeline<I> {
    pub fn new(workspaces: WorkspaceManager, invoker: I, layout: MaskLayout) -> Self {
        Pipeline {
            workspaces,
            invoker,
            layout,
        }
    }

    /// Run one request end to end, returning the base64-encoded result
    /// artifact. The workspace is removed on every exit path.
    pub fn run(&self, image_b64: &str, mask_b64: &str) -> Result<String, Error> {
        // Decode before touching the filesystem; rejected input must not
        // leave directories behind.
        let image = codec::decode_b64_image(image_b64)?;
        let mask = codec::decode_b64_image(mask_b64)?;
        let mask = mask::normalize(&mask);

        let request_id = util::request_id();
        let ws = self.workspaces.acquire(&request_id)?;
        debug!("request {request_id}: workspace at {}", ws.input_root.display());

        self.write_inputs(&image, &mask, &ws.input_root)?;

        let invocation = self.invoker.invoke(&ws.input_root, &ws.output_root)?;
        debug!(
            "request {request_id}: predictor exited {:?} ({} bytes of stdout)",
            invocation.status,
            invocation.stdout.len()
        );

        let artifact = locate::find_result(&ws.output_root)?;
        let bytes = fs::read(&artifact)?;
        info!(
            "request {request_id}: result {} ({} bytes)",
            artifact.display(),
            bytes.len()
        );

        Ok(codec::encode_b64(&bytes))
        // `ws` drops here and on every `?` above: both directories removed
        // regardless of outcome.
    }

    fn write_inputs(
        &self,
        image: &RgbaImage,
        mask: &GrayImage,
        input_root: &Path,
    ) -> Result<(), Error> {
        // Alpha is dropped for predictor compatibility.
        let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        rgb.save(input_root.join("image.png"))
            .map_err(image_write_error)?;

        match self.layout {
            MaskLayout::Sibling => {
                mask.save(input_root.join("image_mask.png"))
                    .map_err(image_write_error)?;
            }
            MaskLayout::Subdirs => {
                for dir in ["mask", "masks"] {
                    let dir = input_root.join(dir);
                    fs::create_dir_all(&dir)?;
                    mask.save(dir.join("image.png")).map_err(image_write_error)?;
                }
            }
        }
        Ok(())
    }
}

fn image_write_error(err: image::ImageError) -> Error {
    match err {
        image::ImageError::IoError(err) => Error::Io(err),
        other => Error::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
    }
}
