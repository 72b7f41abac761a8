//! Error types for the topogrid core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// A parse failure raised while decoding a persisted graph.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FormatError {
    /// The matrix text contained no rows.
    #[error("adjacency matrix contains no rows")]
    EmptyMatrix,
    /// A matrix row had a different length than the number of rows.
    #[error("adjacency matrix is not square: row {row} has {found} columns but {expected} rows were read")]
    MalformedMatrix {
        /// Zero-based index of the offending row.
        row: usize,
        /// Number of rows in the matrix.
        expected: usize,
        /// Number of columns found in the row.
        found: usize,
    },
    /// A matrix cell could not be parsed as an integer.
    #[error("adjacency matrix row {row} column {column} holds `{value}`, expected an integer")]
    MalformedEntry {
        /// Zero-based index of the offending row.
        row: usize,
        /// Zero-based index of the offending column.
        column: usize,
        /// Raw cell contents.
        value: String,
    },
    /// The edge list header or a data row could not be interpreted.
    #[error("edge list line {line} is malformed: {reason}")]
    MalformedEdgeList {
        /// One-based line number within the input.
        line: usize,
        /// Human-readable description of the problem.
        reason: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`FormatError`] variants.
    enum FormatErrorCode for FormatError {
        /// The matrix text contained no rows.
        EmptyMatrix => EmptyMatrix => "FORMAT_EMPTY_MATRIX",
        /// A matrix row had a different length than the number of rows.
        MalformedMatrix => MalformedMatrix { .. } => "FORMAT_MALFORMED_MATRIX",
        /// A matrix cell could not be parsed as an integer.
        MalformedEntry => MalformedEntry { .. } => "FORMAT_MALFORMED_ENTRY",
        /// The edge list header or a data row could not be interpreted.
        MalformedEdgeList => MalformedEdgeList { .. } => "FORMAT_MALFORMED_EDGE_LIST",
    }
}

/// Error type produced by topology generation, translation, and analysis.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TopologyError {
    /// The requested topology family is not registered.
    #[error("unknown topology family `{name}`")]
    UnknownFamily {
        /// Name supplied by the caller.
        name: String,
    },
    /// A family parameter was missing, mistyped, or out of range.
    #[error("invalid `{parameter}` for `{family}`: {reason}")]
    InvalidConfig {
        /// Family whose configuration failed to resolve.
        family: &'static str,
        /// Parameter that could not be resolved.
        parameter: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A structural precondition such as an even stub count was violated.
    #[error("structural precondition violated for `{family}`: {reason}")]
    ParityViolation {
        /// Family whose precondition failed.
        family: &'static str,
        /// Human-readable description of the violated precondition.
        reason: String,
    },
    /// A randomised construction did not converge within its restart budget.
    #[error("`{family}` generation failed after {attempts} attempts")]
    GenerationFailed {
        /// Family whose construction gave up.
        family: &'static str,
        /// Number of attempts made before giving up.
        attempts: usize,
    },
    /// A persisted graph could not be decoded.
    #[error("failed to read {format} graph: {error}")]
    Format {
        /// Name of the format being decoded.
        format: &'static str,
        /// Underlying parse failure.
        #[source]
        error: FormatError,
    },
    /// The grid dimensions were unusable.
    #[error("grid dimensions must be positive (got {world_x}x{world_y})")]
    InvalidGrid {
        /// Requested width.
        world_x: usize,
        /// Requested height.
        world_y: usize,
    },
    /// The graph has more nodes than the grid has positions.
    #[error("graph with {nodes} nodes does not fit a grid with {capacity} positions")]
    GraphTooLarge {
        /// Number of nodes in the graph.
        nodes: usize,
        /// Number of positions in the grid.
        capacity: usize,
    },
    /// An edge referenced a node without a grid position.
    #[error("node {node} has no grid position")]
    UnmappedNode {
        /// Node lacking a position.
        node: usize,
    },
    /// Expected births would divide by a zero degree.
    #[error("node {node} has degree zero; expected births are undefined without an isolated-node policy")]
    DivisionByZeroDegree {
        /// Isolated node that triggered the failure.
        node: usize,
    },
    /// Every node carried zero expected births, so proportions are undefined.
    #[error("expected births sum to zero; proportions are undefined")]
    ZeroTotalWeight,
}

define_error_codes! {
    /// Stable codes describing [`TopologyError`] variants.
    enum TopologyErrorCode for TopologyError {
        /// The requested topology family is not registered.
        UnknownFamily => UnknownFamily { .. } => "TOPOLOGY_UNKNOWN_FAMILY",
        /// A family parameter was missing, mistyped, or out of range.
        InvalidConfig => InvalidConfig { .. } => "TOPOLOGY_INVALID_CONFIG",
        /// A structural precondition was violated.
        ParityViolation => ParityViolation { .. } => "TOPOLOGY_PARITY_VIOLATION",
        /// A randomised construction did not converge.
        GenerationFailed => GenerationFailed { .. } => "TOPOLOGY_GENERATION_FAILED",
        /// A persisted graph could not be decoded.
        FormatFailure => Format { .. } => "TOPOLOGY_FORMAT_FAILURE",
        /// The grid dimensions were unusable.
        InvalidGrid => InvalidGrid { .. } => "TOPOLOGY_INVALID_GRID",
        /// The graph has more nodes than the grid has positions.
        GraphTooLarge => GraphTooLarge { .. } => "TOPOLOGY_GRAPH_TOO_LARGE",
        /// An edge referenced a node without a grid position.
        UnmappedNode => UnmappedNode { .. } => "TOPOLOGY_UNMAPPED_NODE",
        /// Expected births would divide by a zero degree.
        DivisionByZeroDegree => DivisionByZeroDegree { .. } => "TOPOLOGY_DIVISION_BY_ZERO_DEGREE",
        /// Every node carried zero expected births.
        ZeroTotalWeight => ZeroTotalWeight => "TOPOLOGY_ZERO_TOTAL_WEIGHT",
    }
}

impl TopologyError {
    /// Retrieve the inner [`FormatErrorCode`] when the error came from decoding a graph.
    #[must_use]
    pub const fn format_code(&self) -> Option<FormatErrorCode> {
        match self {
            Self::Format { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    pub(crate) fn invalid_config(
        family: &'static str,
        parameter: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            family,
            parameter,
            reason: reason.into(),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TopologyError>;
