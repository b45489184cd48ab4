use crate::resolve::ResolutionError;
use crate::store::AttrError;
use thiserror::Error;

/// Failure confined to one path. Reported alongside the other results;
/// never aborts the batch.
#[derive(Error, Debug)]
pub enum PathError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Attr(#[from] AttrError),
}
