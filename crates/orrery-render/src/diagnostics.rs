//! GPU error reporting
//!
//! Uncaptured device errors and surface acquisition failures are logged;
//! neither ends the frame loop.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    OutOfMemory,
    Internal,
}

pub fn categorize(error: &wgpu::Error) -> ErrorCategory {
    match error {
        wgpu::Error::Validation { .. } => ErrorCategory::Validation,
        wgpu::Error::OutOfMemory { .. } => ErrorCategory::OutOfMemory,
        #[allow(unreachable_patterns)]
        _ => ErrorCategory::Internal,
    }
}

/// Handler for [`wgpu::Device::on_uncaptured_error`].
pub fn log_uncaptured(error: wgpu::Error) {
    let category = categorize(&error);
    tracing::error!(?category, "Uncaptured GPU error: {error}");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Reconfigure the surface and skip this frame.
    Reconfigure,
    /// Log and skip this frame.
    Skip,
}

pub fn surface_action(error: &wgpu::SurfaceError) -> SurfaceAction {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceAction::Reconfigure,
        _ => SurfaceAction::Skip,
    }
}
