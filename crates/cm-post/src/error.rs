use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("G-code emission error: {0}")]
    Emission(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] cm_core::Error),

    #[error(transparent)]
    Cam(#[from] cm_cam::CamError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_error_display() {
        let err = PostError::Emission("unterminated pass".into());
        assert!(err.to_string().contains("unterminated pass"));
    }

    #[test]
    fn test_post_error_from_toml() {
        let bad_toml = "{{bad";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let err = PostError::from(toml_err);
        assert!(matches!(err, PostError::TomlParse(_)));
    }

    #[test]
    fn test_post_error_from_cam() {
        let cam_err = cm_cam::CamError::Unsupported("v-carve".into());
        let err = PostError::from(cam_err);
        assert!(matches!(err, PostError::Cam(_)));
    }
}
