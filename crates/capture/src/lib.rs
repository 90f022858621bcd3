use std::error::Error;

use model::proximity::ProximityError;

pub mod client;
pub mod database;

#[derive(Debug)]
pub enum RequestError {
    NotFound,
    InvalidInput(String),
    Proximity(ProximityError),
    Other(Box<dyn Error + Send + Sync>),
}

impl RequestError {
    pub fn other<T: Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::NotFound => write!(f, "the requested item does not exist"),
            RequestError::InvalidInput(message) => write!(f, "{}", message),
            RequestError::Proximity(why) => write!(f, "{}", why),
            RequestError::Other(why) => write!(f, "{}", why),
        }
    }
}

impl Error for RequestError {}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

impl From<ProximityError> for RequestError {
    fn from(why: ProximityError) -> Self {
        Self::Proximity(why)
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
