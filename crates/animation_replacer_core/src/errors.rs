use bevy::log::error;
use thiserror::Error;

/// Errors produced outside of the real-time callback path (settings, library setup).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ReplacerError {
    #[error("could not access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("could not write RON: {0}")]
    RonSerialize(#[from] ron::Error),
    #[error("too many animations: the animation limit of {limit} has been reached")]
    TooManyAnimations { limit: u16 },
}

pub type ReplacerResult<T> = Result<T, ReplacerError>;

/// Exceeding the animation limit would corrupt engine-side binding indices, so there is
/// nothing to recover to.
pub fn abort_too_many_animations(limit: u16) -> ! {
    let err = ReplacerError::TooManyAnimations { limit };
    error!("{err}. Either increase the animation limit or remove some animations.");
    panic!("{err}");
}
