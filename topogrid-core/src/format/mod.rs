//! Text formats for persisted topologies.

mod edges;
mod matrix;

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{
    error::{Result, TopologyError},
    graph::{Graph, Orientation},
};

pub use edges::{read_edges, write_edges};
pub use matrix::{read_matrix, write_matrix};

/// On-disk representation of a graph artifact.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    /// Dense adjacency matrix (`.mat`).
    #[default]
    Matrix,
    /// `from,to` edge list (`.csv`).
    Edges,
}

impl GraphFormat {
    /// Returns the file extension used for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Matrix => "mat",
            Self::Edges => "csv",
        }
    }

    /// Picks the format matching a file extension, if any.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mat" => Some(Self::Matrix),
            "csv" => Some(Self::Edges),
            _ => None,
        }
    }

    /// Serialises `graph` in this format.
    #[must_use]
    pub fn write(self, graph: &Graph) -> String {
        match self {
            Self::Matrix => write_matrix(graph),
            Self::Edges => write_edges(graph),
        }
    }

    /// Parses a graph in this format.
    ///
    /// # Errors
    /// Returns [`TopologyError::Format`] when `text` is malformed.
    pub fn read(self, text: &str, orientation: Orientation) -> Result<Graph> {
        match self {
            Self::Matrix => matrix::read_matrix_as(text, orientation),
            Self::Edges => read_edges(text, orientation),
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Matrix => "matrix",
            Self::Edges => "edges",
        })
    }
}

impl FromStr for GraphFormat {
    type Err = TopologyError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "matrix" => Ok(Self::Matrix),
            "edges" => Ok(Self::Edges),
            other => Err(TopologyError::invalid_config(
                "output",
                "output_mode",
                format!("expected `matrix` or `edges` (got `{other}`)"),
            )),
        }
    }
}
