//! Error types for the DC operating point solver.
//!
//! [`DcopError`] covers every failure a caller can observe: netlist parsing,
//! validation, equation assembly and the linear solve. Assembly-specific
//! problems live in [`TopologyError`] so the builder can report them without
//! knowing about the outer stages.

use thiserror::Error;

/// Result type alias using [`DcopError`].
pub type Result<T> = std::result::Result<T, DcopError>;

/// Guidance appended to failures of the solve stage.
const SOLVE_GUIDANCE: &str = "Possible causes:\n\
    \u{2022} floating nodes (no connection to ground)\n\
    \u{2022} shorted voltage sources\n\
    \u{2022} components with invalid values\n\
    \u{2022} a poorly connected circuit";

/// Structural problems found while assembling the MNA system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// No node carries the ground flag
    #[error("no ground node found (mark one node as ground, e.g. '0' or 'GND')")]
    MissingGround,

    /// Nothing to solve for
    #[error("the circuit has nothing to solve: it needs at least one component and one non-ground node or voltage source")]
    NoUnknowns,

    /// Resistance must be strictly positive and finite
    #[error("resistor '{component}' has invalid value: {resistance}")]
    InvalidResistance { component: String, resistance: f64 },

    /// Source voltage must be finite
    #[error("voltage source '{component}' has invalid value: {voltage}")]
    InvalidVoltage { component: String, voltage: f64 },

    /// A component terminal names a node the topology does not contain
    #[error("component '{component}' references unknown node '{node}'")]
    UnknownNode { component: String, node: String },

    /// The system exceeds the configured size guard
    #[error("the circuit needs {unknowns} unknowns, more than the limit of {limit}")]
    TooLarge { unknowns: usize, limit: usize },
}

/// Unified error type for all solver operations.
#[derive(Error, Debug)]
pub enum DcopError {
    // ============ Netlist Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    // ============ Validation Errors ============
    /// Rejected by the pre-solve validator
    #[error("Invalid circuit: {message}")]
    Validation { message: String },

    // ============ Assembly Errors ============
    /// Structural problem found by the tableau builder
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The assembled matrix stays rank deficient after regularization
    #[error(
        "The system of equations is singular (rank {rank}/{dimension}). \
         Possible causes: floating nodes, shorted or looped voltage sources, \
         or disconnected components."
    )]
    SingularSystem { rank: usize, dimension: usize },

    /// Dimensions of the matrix and right-hand side do not agree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // ============ Solve Errors ============
    /// Every solver tier failed outright
    #[error("Could not solve the system of equations. The circuit may contain a design error: {cause}")]
    UnsolvableSystem { cause: String },

    /// Assembly failure, wrapped by the simulator
    #[error("Failed to build the system of equations: {source}")]
    Assembly {
        #[source]
        source: Box<DcopError>,
    },

    /// Solve failure, wrapped by the simulator with circuit-level guidance
    #[error("Failed to solve the system of equations: {source}\n\n{}", SOLVE_GUIDANCE)]
    Solve {
        #[source]
        source: Box<DcopError>,
    },

    /// Unified explanation for any singularity, whichever stage detected it
    #[error(
        "The system of equations is singular. This usually means:\n\n\
         1. There are floating nodes (no electrical connection to ground)\n\
         2. Voltage sources are connected directly to each other (short circuit)\n\
         3. The circuit is malformed or disconnected\n\n\
         Check the circuit connections."
    )]
    SingularCircuit,

    // ============ Verification Errors ============
    /// Law verification could not run
    #[error("Verification failed: {message}")]
    Verification { message: String },

    // ============ I/O Errors ============
    /// Error reading a netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DcopError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap an error raised while assembling the system.
    pub fn assembly(source: DcopError) -> Self {
        Self::Assembly {
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while solving the system.
    pub fn solve(source: DcopError) -> Self {
        Self::Solve {
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through stage wrappers.
    pub fn root(&self) -> &DcopError {
        match self {
            Self::Assembly { source } | Self::Solve { source } => source.root(),
            other => other,
        }
    }

    /// Replace any error whose message mentions singularity with
    /// [`DcopError::SingularCircuit`].
    pub fn normalize(self) -> Self {
        if self.to_string().to_lowercase().contains("singular") {
            Self::SingularCircuit
        } else {
            self
        }
    }
}
