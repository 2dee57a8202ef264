use thiserror::Error;

/// Result type alias using RowGraphError
pub type Result<T> = std::result::Result<T, RowGraphError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that collaborators (the protocol
/// bridge, the CLI) can use to translate failures into their own responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Schema / registration
    /// Template declares no table, or a migration target is missing
    Schema,
    /// Save or read against a table that was never migrated
    UnknownTable,

    // Encoding / decoding
    /// A field or element value cannot be stored
    UnsupportedType,
    /// A reference token points at a row that no longer exists
    MissingReference,
    InvalidInput,

    // Mutation guards
    /// Unscoped delete without explicit opt-in
    ConditionRequired,

    NotFound,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Schema => "ERR_SCHEMA",
            ExErrorKind::UnknownTable => "ERR_UNKNOWN_TABLE",
            ExErrorKind::UnsupportedType => "ERR_UNSUPPORTED_TYPE",
            ExErrorKind::MissingReference => "ERR_MISSING_REFERENCE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::ConditionRequired => "ERR_CONDITION_REQUIRED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, table, row, field) for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    row_id: Option<i64>,
    field: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            row_id: None,
            field: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add row id context
    pub fn with_row_id(mut self, row_id: i64) -> Self {
        self.row_id = Some(row_id);
        self
    }

    /// Add field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn row_id(&self) -> Option<i64> {
        self.row_id
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(row_id) = self.row_id {
            write!(f, " (row_id: {})", row_id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for rowgraph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowGraphError {
    // ===== Schema Errors =====
    /// Model type declares an empty table name
    #[error("Model {model} does not declare a table name")]
    MissingTableName { model: String },

    /// Table backing a template does not exist in the live schema
    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    /// Save or read against a table that was never migrated
    #[error("Table {table} does not exist, migrate it first")]
    UnknownTable { table: String },

    // ===== Codec Errors =====
    /// Field value has a runtime type the store cannot encode here
    #[error("Unsupported value for {table}.{field}: {reason}")]
    UnsupportedType {
        table: String,
        field: String,
        reason: String,
    },

    /// Reference token points at a row that no longer exists
    #[error("Dangling reference {token}: row {row_id} not found in {table}")]
    MissingReference {
        token: String,
        table: String,
        row_id: i64,
    },

    /// Text in a reference position is not a well-formed token
    #[error("Malformed reference token: {token}")]
    MalformedToken { token: String },

    /// Decoded value cannot be converted to the requested field type
    #[error("Field {field}: expected {expected}, found {found}")]
    FieldConversion {
        field: String,
        expected: String,
        found: String,
    },

    // ===== Mutation Errors =====
    /// Delete without an id or condition, and without opt-in
    #[error("Delete on {table} requires a condition")]
    ConditionRequired { table: String },

    // ===== Generic Errors =====
    /// Serialization error (blob encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<RowGraphError> for ExError {
    fn from(err: RowGraphError) -> Self {
        let message = err.to_string();
        match err {
            RowGraphError::MissingTableName { .. } => {
                ExError::new(ExErrorKind::Schema).with_message(message)
            }

            RowGraphError::TableNotFound { table } => ExError::new(ExErrorKind::Schema)
                .with_table(table)
                .with_message(message),

            RowGraphError::UnknownTable { table } => ExError::new(ExErrorKind::UnknownTable)
                .with_table(table)
                .with_message(message),

            RowGraphError::UnsupportedType { table, field, .. } => {
                ExError::new(ExErrorKind::UnsupportedType)
                    .with_table(table)
                    .with_field(field)
                    .with_message(message)
            }

            RowGraphError::MissingReference { table, row_id, .. } => {
                ExError::new(ExErrorKind::MissingReference)
                    .with_table(table)
                    .with_row_id(row_id)
                    .with_message(message)
            }

            RowGraphError::MalformedToken { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            RowGraphError::FieldConversion { field, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_field(field)
                    .with_message(message)
            }

            RowGraphError::ConditionRequired { table } => {
                ExError::new(ExErrorKind::ConditionRequired)
                    .with_table(table)
                    .with_message(message)
            }

            RowGraphError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            RowGraphError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}
