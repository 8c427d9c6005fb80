pub type StrataResult<T> = Result<T, StrataError>;

#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("unknown blend mode '{0}'")]
    UnknownBlendMode(String),

    #[error("unknown plugin '{0}'")]
    UnknownPlugin(String),

    #[error("overlay fetch failed for '{source_name}': {reason}")]
    OverlayFetch { source_name: String, reason: String },

    #[error("plugin '{name}' failed: {reason:#}")]
    Plugin { name: String, reason: anyhow::Error },

    #[error("{job} failed: {source}")]
    Job {
        job: String,
        #[source]
        source: Box<StrataError>,
    },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn overlay_fetch(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OverlayFetch {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Attach the failing job's description to an error raised while it ran.
    pub fn in_job(self, job: impl Into<String>) -> Self {
        Self::Job {
            job: job.into(),
            source: Box::new(self),
        }
    }

    /// Strip any job context wrappers and return the underlying error.
    pub fn root(&self) -> &StrataError {
        match self {
            Self::Job { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
