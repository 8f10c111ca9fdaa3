use thiserror::Error;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Failure while acquiring, submitting or presenting a frame.
///
/// Only [`FrameError::DeviceLost`] is fatal; everything else costs one frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// No output target this frame (minimized window, timeout, reconfigure).
    #[error("output target unavailable: {0}")]
    TargetUnavailable(String),

    /// Recorded work could not be submitted or presented.
    #[error("frame submission failed: {0}")]
    SubmitFailed(String),

    /// The device cannot recover; the engine must shut down.
    #[error("device lost: {0}")]
    DeviceLost(String),
}

impl FrameError {
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::DeviceLost(_))
    }
}

impl From<(SurfaceErrorAction, wgpu::SurfaceError)> for FrameError {
    fn from((action, err): (SurfaceErrorAction, wgpu::SurfaceError)) -> Self {
        match action {
            SurfaceErrorAction::Fatal => FrameError::DeviceLost(err.to_string()),
            SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                FrameError::TargetUnavailable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_device_loss_is_fatal() {
        assert!(!FrameError::TargetUnavailable("minimized".into()).is_fatal());
        assert!(!FrameError::SubmitFailed("validation".into()).is_fatal());
        assert!(FrameError::DeviceLost("driver reset".into()).is_fatal());
    }

    #[test]
    fn surface_errors_map_through_their_action() {
        let lost: FrameError = (SurfaceErrorAction::Fatal, wgpu::SurfaceError::OutOfMemory).into();
        assert!(lost.is_fatal());

        let skip: FrameError = (SurfaceErrorAction::SkipFrame, wgpu::SurfaceError::Timeout).into();
        assert!(matches!(skip, FrameError::TargetUnavailable(_)));
    }
}
