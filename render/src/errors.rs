use super::spans::SENTINEL_EXTENT;
use failure::{Backtrace, Context, Fail};
use std::fmt;
use std::result::Result as StdResult;

pub type Result<T> = StdResult<T, Error>;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Invalid span [{}, {}].", first, last)]
    InvalidRange { first: i32, last: i32 },

    #[fail(display = "Invalid projection: {}", _0)]
    InvalidProjection(String),
}

/// Returns early with `$error` converted into an `Error` unless `$condition` holds.
macro_rules! ensure {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($crate::errors::Error::from($error));
        }
    };
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }

    pub(crate) fn invalid_range(first: i32, last: i32) -> Self {
        Self::from(ErrorKind::InvalidRange { first, last })
    }

    pub(crate) fn invalid_screen_width(width: i32) -> Self {
        Self::from(ErrorKind::InvalidProjection(format!(
            "screen width must be in (0, {}), got {}",
            SENTINEL_EXTENT, width
        )))
    }

    pub(crate) fn invalid_fov(degrees: f32) -> Self {
        Self::from(ErrorKind::InvalidProjection(format!(
            "field of view must be in (0, 180) degrees, got {}",
            degrees
        )))
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Self {
        Error { inner }
    }
}
