use thiserror::Error;

/// Validation failures of a scheduling problem.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("squad needs two distinct people, got `{0}` twice")]
    DuplicateMember(String),

    #[error("person `{0}` appears more than once in the roster")]
    DuplicatePerson(String),

    #[error("person `{0}` is not in the roster")]
    UnknownPerson(String),

    #[error("no person at roster index {0}")]
    UnknownIndex(usize),

    #[error("working range {start} - {end} is empty")]
    EmptyWorkingRange { start: String, end: String },

    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        name: &'static str,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
