/// Error codes prefixed by phase: R = resolution, X = execution, F = field access,
/// J = persisted sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Resolution
    R000, // no method assigned
    R001, // target missing
    R002, // owner or object type not found
    R003, // parameter type not found
    R004, // no exact method match
    R005, // predicate call on a non-bool method

    // Execution
    X001, // method reported an error
    X002, // method panicked

    // Field protocol
    F001, // unknown field path
    F002, // read-only field
    F003, // value of the wrong shape for the field
    F004, // list index out of range
    F005, // binding rejected the write

    // Persistence
    J001, // malformed json
    J002, // unsupported sheet version
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::R000 => "R000",
            Self::R001 => "R001",
            Self::R002 => "R002",
            Self::R003 => "R003",
            Self::R004 => "R004",
            Self::R005 => "R005",
            Self::X001 => "X001",
            Self::X002 => "X002",
            Self::F001 => "F001",
            Self::F002 => "F002",
            Self::F003 => "F003",
            Self::F004 => "F004",
            Self::F005 => "F005",
            Self::J001 => "J001",
            Self::J002 => "J002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// Why a call could not be turned into an invocable handle.
///
/// None of these are fatal: the invoker reports them as a skipped call and
/// keeps the configuration intact so it can be repaired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no method assigned")]
    Unassigned,

    #[error("target missing: {0}")]
    TargetMissing(String),

    #[error("type `{0}` not found")]
    TypeNotFound(String),

    #[error("parameter type `{ty}` of `{method}` not found")]
    ParameterTypeNotFound { method: String, ty: String },

    #[error("method `{0}` not found")]
    MethodNotFound(String),

    #[error("`{method}` returns {found}, a predicate needs bool")]
    NotAPredicate { method: String, found: String },
}

impl ResolveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unassigned                   => ErrorCode::R000,
            Self::TargetMissing(_)             => ErrorCode::R001,
            Self::TypeNotFound(_)              => ErrorCode::R002,
            Self::ParameterTypeNotFound { .. } => ErrorCode::R003,
            Self::MethodNotFound(_)            => ErrorCode::R004,
            Self::NotAPredicate { .. }         => ErrorCode::R005,
        }
    }
}

// ─── Execution ────────────────────────────────────────────────────────────────

/// Failure raised by a method implementation while it runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("receiver is not a `{0}`")]
    Receiver(String),

    #[error("argument {index} expected {expected}")]
    Argument { index: usize, expected: String },

    #[error("{0}")]
    Message(String),

    #[error("panicked: {0}")]
    Panic(String),
}

impl ExecError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Panic(_) => ErrorCode::X002,
            _              => ErrorCode::X001,
        }
    }
}

// ─── Field protocol ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("unknown field `{0}`")]
    UnknownPath(String),

    #[error("field `{0}` is read-only")]
    ReadOnly(String),

    #[error("field `{path}` expects {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("index {index} out of range for `{path}` (len {len})")]
    IndexOutOfRange { path: String, index: usize, len: usize },

    #[error("binding rejected `{path}`: {source}")]
    Binding { path: String, source: ResolveError },
}

impl FieldError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownPath(_)          => ErrorCode::F001,
            Self::ReadOnly(_)             => ErrorCode::F002,
            Self::TypeMismatch { .. }     => ErrorCode::F003,
            Self::IndexOutOfRange { .. }  => ErrorCode::F004,
            Self::Binding { .. }          => ErrorCode::F005,
        }
    }
}

// ─── Persistence ──────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed call sheet: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported call sheet version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl PersistError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Json(_)                   => ErrorCode::J001,
            Self::UnsupportedVersion { .. } => ErrorCode::J002,
        }
    }
}
