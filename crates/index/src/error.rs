use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to build the {0} index level")]
    IndexBuildFailure(&'static str),
}
