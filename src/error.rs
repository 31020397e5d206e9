//! Error types for the container.

use std::sync::Arc;

/// Boxed error returned by user-supplied invokers.
///
/// Constructors, holder constructors, producer methods and field accessors
/// all report failure through this type. A `DiError` converts into it with
/// `?`, and the container unwraps it again so nested failures keep their
/// original variant.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared error cause, so `DiError` stays `Clone`.
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync>;

/// Container errors
///
/// Covers every failure of the registration phase (marker checks, strategy
/// selection, cycle detection) and of the resolution phase (missing
/// bindings, failing invokers, field assignment).
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::DiError;
///
/// let unsupported = DiError::UnsupportedClass("app::Mailer");
/// let cycle = DiError::CyclicDependency(vec!["app::A", "app::B", "app::A"]);
///
/// assert_eq!(
///     unsupported.to_string(),
///     "Unsupported class: app::Mailer is not injectable and has no producer"
/// );
/// assert_eq!(cycle.to_string(), "Cyclic dependency: app::A -> app::B -> app::A");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// Type lacks its marker, or nothing can build it at resolution time
    #[error("Unsupported class: {0} is not injectable and has no producer")]
    UnsupportedClass(&'static str),
    /// Neither an injection constructor nor a zero-argument constructor
    #[error("No suitable constructor for {0}: expected an injection constructor or a zero-argument constructor")]
    NoSuitableConstructor(&'static str),
    /// A type depends on itself, directly or transitively (includes path)
    #[error("Cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<&'static str>),
    /// An invoker returned an error or panicked
    #[error("Construction of {type_name} failed: {source}")]
    ConstructionFailure {
        type_name: &'static str,
        source: ErrorCause,
    },
    /// A field accessor rejected the resolved dependency
    #[error("Injection of field `{field}` on {owner} failed: {source}")]
    FieldInjection {
        owner: &'static str,
        field: &'static str,
        source: ErrorCause,
    },
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Constructor invoker consumed more arguments than it declared
    #[error("Constructor of {owner} requested argument {index} but only {available} were declared")]
    MissingArgument {
        owner: &'static str,
        index: usize,
        available: usize,
    },
    /// Two producer methods declare the same return type
    #[error("Duplicate producer for {produced}: {first} and {second}")]
    DuplicateProducer {
        produced: &'static str,
        first: String,
        second: String,
    },
    /// Maximum graph depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A configuration value could not be parsed
    #[error("Invalid option {name}: {value:?}")]
    InvalidOption { name: String, value: String },
}

impl DiError {
    /// Maps an invoker error onto the taxonomy.
    ///
    /// Errors that already are `DiError`s (a nested resolution failing inside
    /// a producer, an argument downcast) pass through unchanged; anything
    /// else becomes a `ConstructionFailure` of `type_name`.
    pub(crate) fn from_invoker(type_name: &'static str, err: BoxError) -> Self {
        match err.downcast::<DiError>() {
            Ok(di) => *di,
            Err(other) => DiError::ConstructionFailure {
                type_name,
                source: Arc::from(other),
            },
        }
    }

    /// The dependency path of a cycle, if this is one.
    pub fn cycle_path(&self) -> Option<&[&'static str]> {
        match self {
            DiError::CyclicDependency(path) => Some(path),
            _ => None,
        }
    }
}

/// Payload of a panicking invoker, carried as the cause of a `ConstructionFailure`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invoker panicked: {message}")]
pub struct InvokerPanic {
    pub message: String,
}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;
