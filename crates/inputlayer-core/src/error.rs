//! Error types for the compilation layer.

/// Errors raised while compiling objects and expressions to Datalog.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A storage-type name has no mapping in the type registry.
    #[error("Unsupported storage type: {0}")]
    UnsupportedType(String),

    /// A result cell could not be converted to a runtime value.
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// The single-branch condition compiler was handed an OR node.
    ///
    /// OR conditions require query splitting; route the condition through
    /// the OR fan-out instead.
    #[error("OR conditions require query splitting; compile each branch separately")]
    OrInSingleBranch,
}

/// Result type for compilation operations.
pub type Result<T> = std::result::Result<T, CompileError>;
