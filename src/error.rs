use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kube Error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("SerializationError: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("edp name is not configured for namespace {namespace}")]
    MissingEdpName { namespace: String },

    #[error("invalid schema name {0:?}")]
    InvalidSchemaName(String),

    /// A row the current resource refers to has not been mirrored yet.
    #[error("{kind} {name} has not been found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} owner reference is missing for {name}")]
    MissingOwner { kind: &'static str, name: String },

    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn metric_label(&self) -> String {
        let label = match self {
            Error::Kube(_) => "kube",
            Error::Database(_) => "database",
            Error::Serialization(_) => "serialization",
            Error::Config(_) => "config",
            Error::MissingEdpName { .. } => "missing_edp_name",
            Error::InvalidSchemaName(_) => "invalid_schema_name",
            Error::NotFound { .. } => "not_found",
            Error::MissingOwner { .. } => "missing_owner",
            Error::Context { source, .. } => return source.metric_label(),
        };
        label.to_owned()
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Attaches a description of the failed operation to an error.
pub trait ResultExt<T> {
    fn context<F, M>(self, message: F) -> Result<T>
    where
        F: FnOnce() -> M,
        M: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<F, M>(self, message: F) -> Result<T>
    where
        F: FnOnce() -> M,
        M: Into<String>,
    {
        self.map_err(|err| Error::Context {
            message: message().into(),
            source: Box::new(err.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_the_inner_label() {
        let res: Result<()> = Err(Error::not_found("git server", "gerrit"));
        let err = res.context(|| "couldn't put codebase petclinic").unwrap_err();
        assert_eq!(err.metric_label(), "not_found");
        assert_eq!(
            err.to_string(),
            "couldn't put codebase petclinic: git server gerrit has not been found"
        );
    }
}
