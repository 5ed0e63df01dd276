use thiserror::Error;

#[derive(Debug, Error)]
pub enum CamError {
    /// The operation kind cannot be compiled at all (V-carve). Fatal for
    /// that operation; other operations in the same job still proceed.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("invalid operation parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Core(#[from] cm_core::Error),

    #[error(transparent)]
    Geom(#[from] cm_geom::GeomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cam_error_display() {
        let err = CamError::Unsupported("v-carve".into());
        assert_eq!(err.to_string(), "unsupported operation: v-carve");
    }

    #[test]
    fn test_cam_error_from_core() {
        let core_err = cm_core::Error::InvalidDimension("negative cutter diameter".into());
        let err = CamError::from(core_err);
        assert!(matches!(err, CamError::Core(_)));
    }
}
