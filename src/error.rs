//! Error types.
//!
//! [`GraphError`] covers structural problems caught while assembling a
//! component graph; [`TopologyError`] wraps it together with the
//! loading and validation failures of declared topologies. A graph that
//! assembled successfully cannot fail during cycle execution.

use thiserror::Error;

/// A structural problem in the component graph, reported at assembly.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("component id is empty")]
    EmptyComponentId,

    #[error("duplicate component id `{0}`")]
    DuplicateComponent(String),

    #[error("component `{component}` declares a port with an empty id")]
    EmptyPortId { component: String },

    #[error("component `{component}` declares duplicate port `{port}`")]
    DuplicatePort { component: String, port: String },

    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    #[error("component `{component}` has no port `{port}`")]
    UnknownPort { component: String, port: String },

    #[error(
        "width mismatch: `{from}.{output}` is {from_width} bits but `{to}.{input}` is {to_width} bits"
    )]
    WidthMismatch {
        from: String,
        output: String,
        from_width: u8,
        to: String,
        input: String,
        to_width: u8,
    },

    #[error("output `{component}.{port}` is already connected")]
    OutputAlreadyConnected { component: String, port: String },

    #[error("input `{component}.{port}` is already connected")]
    InputAlreadyConnected { component: String, port: String },

    #[error("combinational loop not broken by a register")]
    CombinationalLoop,
}

/// A failure loading, validating or assembling a declared topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid topology: {0}")]
    Validation(String),

    #[error("unknown topology format `{0}`")]
    UnknownFormat(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result alias for graph assembly operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;
