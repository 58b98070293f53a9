pub mod crops;
pub mod estimator;
pub mod series;
pub mod upstream;

use self::series::SeriesError;
use self::upstream::UpstreamError;

/// Anything that stops a handler from producing real numbers. Every variant
/// degrades to a fallback payload; none is reported to the caller as an error.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error("no numeric value for `{0}`")]
    NoValue(&'static str),
}
