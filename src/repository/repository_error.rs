use std::fmt;

use mongodb::error::{ErrorKind, WriteFailure};

/// Mongo duplicate key error code.
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug)]
pub enum RepositoryError {
    NotFound(String),
    AlreadyExists(String),
    ValidationError(String),
    DatabaseError(String),
    ConnectionError(String),
    SerializationError(String),
    /// Anything else the driver reports
    Generic(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RepositoryError::AlreadyExists(msg) => write!(f, "Already Exists: {}", msg),
            RepositoryError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            RepositoryError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            RepositoryError::ConnectionError(msg) => write!(f, "Connection Error: {}", msg),
            RepositoryError::SerializationError(msg) => write!(f, "Serialization Error: {}", msg),
            RepositoryError::Generic(err) => write!(f, "Repository Error: {}", err),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::Generic(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl RepositoryError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        RepositoryError::NotFound(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        RepositoryError::AlreadyExists(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        RepositoryError::ValidationError(msg.into())
    }

    pub fn database<T: Into<String>>(msg: T) -> Self {
        RepositoryError::DatabaseError(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RepositoryError::SerializationError(msg.into())
    }

    /// Map a driver error, turning unique-index violations into `AlreadyExists`.
    pub fn from_mongo(context: &str, err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY => {
                RepositoryError::AlreadyExists(format!("{}: duplicate key", context))
            }
            ErrorKind::Authentication { .. } | ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
                RepositoryError::ConnectionError(format!("{}: {}", context, err))
            }
            ErrorKind::InvalidArgument { .. } => {
                RepositoryError::ValidationError(format!("{}: {}", context, err))
            }
            _ => RepositoryError::DatabaseError(format!("{}: {}", context, err)),
        }
    }
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        let is_write = matches!(err.kind.as_ref(), ErrorKind::Write(_));
        if is_write {
            RepositoryError::from_mongo("Write error", err)
        } else {
            RepositoryError::Generic(Box::new(err))
        }
    }
}

impl From<bson::ser::Error> for RepositoryError {
    fn from(err: bson::ser::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON serialization error: {}", err))
    }
}

impl From<bson::de::Error> for RepositoryError {
    fn from(err: bson::de::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON deserialization error: {}", err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// RFC 3339 timestamp used for `createdAt` / `updatedAt`.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
