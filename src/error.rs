use thiserror::Error;

use crate::constraint::ViolationReport;

#[derive(Error, Debug)]
pub enum ClabjectError {
    #[error("The following properties are not defined for the clabject: {0:?}")]
    UndefinedProperties(Vec<String>),
    #[error("The following properties are already defined for the clabject: {0:?}")]
    AlreadyDefinedProperties(Vec<String>),
    #[error("The following properties have to be instantiated at this level: {0:?}")]
    UninitializedProperties(Vec<String>),
    #[error("Property '{property}' is not due to be instantiated, it has to be instantiated in {steps} step(s)")]
    UndueInstantiation { property: String, steps: u32 },
    #[error("Property '{0}' is declared final and thus cannot be changed")]
    ChangeFinalProperty(String),
    #[error("Property '{0}' is declared final and thus cannot be re-initialized")]
    ReinitFinalProperty(String),
    #[error("Property '{0}' will vanish with the next instantiation step and thus cannot be re-initialized")]
    ReinitVanishingProperty(String),
    #[error("Constraint violation:\n{0}")]
    ConstraintViolation(ViolationReport),
    #[error("The constraint '{0}' is type specific and thus can not be removed")]
    TypeSpecificConstraintRemoval(String),
    #[error("The multiplicity ({min}, {max}) is invalid, it has to be a (min, max) pair with 0 <= min <= max")]
    InvalidMultiplicity { min: usize, max: String },
    #[error("The instantiation order {0} is invalid, it has to be an integer > 0 or a (min, max) pair with 0 < min <= max")]
    InvalidInstantiationOrder(String),
    #[error("The clabject '{0}' is declared as an instance and thus can't be instantiated further")]
    DeclaredAsInstance(String),
    #[error("The provided value {0} is not a clabject")]
    NotAClabject(String),
    #[error("A property can only be of one specific kind, but {0:?} were requested")]
    InconsistentPropertyKind(Vec<&'static str>),
    #[error("The clabject '{0}' is not part of this hierarchy")]
    UnknownClabject(String),
    #[error("The origin clabject '{0}' carries no properties")]
    OriginProperties(String),
    #[error("A clabject named '{0}' already exists")]
    DuplicateClabject(String),
    #[error("'{0}' is not a method of the clabject")]
    NotAMethod(String),
    #[error("Method '{method}' takes {expected} argument(s) besides its target but {given} were given")]
    MethodArity { method: String, expected: usize, given: usize },
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("The hierarchy lock is poisoned: {0}")]
    Lock(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, ClabjectError>;

// Helper conversions
impl From<config::ConfigError> for ClabjectError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<std::io::Error> for ClabjectError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}
impl From<std::fmt::Error> for ClabjectError {
    fn from(e: std::fmt::Error) -> Self { Self::Render(e.to_string()) }
}
impl From<serde_json::Error> for ClabjectError {
    fn from(e: serde_json::Error) -> Self { Self::Io(e.to_string()) }
}
