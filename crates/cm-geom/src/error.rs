use thiserror::Error;

/// Polygon algebra never fails in the sense of returning `Err` — degenerate
/// or numerically collapsed inputs simply produce empty output (see the
/// module docs on `clip` and `offset`). This type exists for symmetry with
/// every other crate in the workspace and as a home for `cm_core::Error`
/// conversions at call sites that need one.
#[derive(Debug, Error)]
pub enum GeomError {
    #[error(transparent)]
    Core(#[from] cm_core::Error),
}
