use thiserror::Error;

/// Failure to build a topology from a descriptor buffer.
///
/// Any of these makes the whole configuration unusable; no partial topology is kept.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error("descriptor at offset {offset} needs {needed} bytes, only {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("zero-length descriptor at offset {offset}")]
    ZeroLength { offset: usize },

    #[error("descriptor at offset {offset} has an unusable {field}")]
    UnknownRequiredField { offset: usize, field: &'static str },

    #[error("entity {entity} references missing source {missing}")]
    DanglingReference { entity: u8, missing: u8 },

    #[error("entity id {id} is declared twice")]
    DuplicateEntity { id: u8 },

    #[error("no entity id left for a synthesized clock")]
    EntityIdsExhausted,
}

/// The output buffer is smaller than `serialized_size()` said it had to be.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum WriteError {
    #[error("descriptor needs {needed} bytes, buffer holds {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("{size} bytes do not fit a 16-bit total length")]
    TotalLengthOverflow { size: usize },
}

/// Errors reported by the device transport. They are passed through unchanged.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum TransportError {
    #[error("device unreachable")]
    Unreachable,

    #[error("transfer timed out")]
    Timeout,

    #[error("endpoint stalled")]
    Stall,

    #[error("short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },
}

/// Failure of a single translated control request. Never retried.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DispatchError {
    #[error("no interface {0} in the current configuration")]
    UnknownInterface(u8),

    #[error("no entity {entity} on interface {interface}")]
    UnknownEntity { interface: u8, entity: u8 },

    #[error("control {selector} of entity {entity} is not supported")]
    NotSupported { entity: u8, selector: u8 },

    #[error("payload of {available} bytes, control needs {needed}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Failure to bring up a device during attach.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AttachError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid {0} descriptor")]
    InvalidDescriptor(&'static str),

    #[error("configuration {index} is unusable: {error}")]
    Parse { index: u8, error: ParseError },

    #[error("no configuration of the device could be parsed")]
    NoUsableConfiguration,
}
