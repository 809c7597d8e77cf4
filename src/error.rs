use thiserror::Error;

use crate::{renderer::RendererError, sphere::GeometryError};

/// Everything that can end the program early.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error("invalid sphere: {0}")]
    Geometry(#[from] GeometryError),
}
