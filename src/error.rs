use std::{error, fmt};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A metric was merged into a builder that never declared it.
    UnknownMetric,
    /// Two records with different time buckets were folded together.
    TimeMismatch,
    /// Summing a metric would leave the `i64` range.
    MetricOverflow,
    Parse,
    Encode,
    Decode,
    Other,
}

pub struct Error {
    kind: ErrorKind,
    message: String,
    source: Option<Box<dyn error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(message: &str) -> Self {
        Self::with_kind(ErrorKind::Other, message)
    }

    pub fn with_kind(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} error: {}", self.kind, self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(err) => write!(f, "{}. Source error: {}", self.message, err),
            None => write!(f, "{}", self.message),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.source {
            Some(ref err) => Some(&**err),
            None => None,
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self {
            kind: ErrorKind::Other,
            message,
            source: None,
        }
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl<E: error::Error + Send + Sync + 'static> From<(&str, E)> for Error {
    fn from((message, err): (&str, E)) -> Self {
        Self {
            kind: ErrorKind::Other,
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }
}

impl<E: error::Error + Send + Sync + 'static> From<(ErrorKind, &str, E)> for Error {
    fn from((kind, message, err): (ErrorKind, &str, E)) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        format!("{}", err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source() {
        let source = "x".parse::<i64>().unwrap_err();
        let err = Error::from((ErrorKind::Parse, "bad time bucket", source));

        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.message(), "bad time bucket");
        assert!(format!("{}", err).starts_with("bad time bucket. Source error: "));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn test_plain_message() {
        let err: Error = "boom".into();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(format!("{}", err), "boom");
        assert_eq!(String::from(err), "boom");
    }
}
