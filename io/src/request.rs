use redlilium_core::memory::MemoryBlock;

use crate::error::IoResultKind;
use crate::events::IoDriverEvents;
use crate::path::PathKind;

/// Work submitted to the I/O worker.
#[derive(Debug)]
pub enum AsyncRequest {
    Read {
        uri: String,
        kind: PathKind,
    },
    /// `payload` is a retained handle, released once the write finishes or
    /// the request is abandoned.
    Write {
        uri: String,
        kind: PathKind,
        payload: MemoryBlock,
    },
}

impl AsyncRequest {
    pub fn uri(&self) -> &str {
        match self {
            AsyncRequest::Read { uri, .. } | AsyncRequest::Write { uri, .. } => uri,
        }
    }
}

/// Outcome of one [`AsyncRequest`], delivered back to the polling thread.
#[derive(Debug)]
pub enum AsyncResponse {
    OpenFailed { uri: String },
    ReadFailed { uri: String },
    ReadOk { uri: String, block: Option<MemoryBlock> },
    WriteFailed { uri: String },
    WriteOk { uri: String, bytes_written: usize },
}

impl AsyncResponse {
    pub(crate) fn from_read(uri: String, block: Option<MemoryBlock>, result: IoResultKind) -> Self {
        match result {
            IoResultKind::ReadOk => AsyncResponse::ReadOk { uri, block },
            IoResultKind::OpenFailed => AsyncResponse::OpenFailed { uri },
            _ => AsyncResponse::ReadFailed { uri },
        }
    }

    pub(crate) fn from_write(uri: String, bytes_written: usize, result: IoResultKind) -> Self {
        match result {
            IoResultKind::WriteOk => AsyncResponse::WriteOk { uri, bytes_written },
            IoResultKind::OpenFailed => AsyncResponse::OpenFailed { uri },
            _ => AsyncResponse::WriteFailed { uri },
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            AsyncResponse::OpenFailed { uri }
            | AsyncResponse::ReadFailed { uri }
            | AsyncResponse::ReadOk { uri, .. }
            | AsyncResponse::WriteFailed { uri }
            | AsyncResponse::WriteOk { uri, .. } => uri,
        }
    }

    pub fn result(&self) -> IoResultKind {
        match self {
            AsyncResponse::OpenFailed { .. } => IoResultKind::OpenFailed,
            AsyncResponse::ReadFailed { .. } => IoResultKind::ReadFailed,
            AsyncResponse::ReadOk { .. } => IoResultKind::ReadOk,
            AsyncResponse::WriteFailed { .. } => IoResultKind::WriteFailed,
            AsyncResponse::WriteOk { .. } => IoResultKind::WriteOk,
        }
    }

    /// Invoke the single callback matching this outcome.
    pub(crate) fn dispatch(self, events: &mut dyn IoDriverEvents) {
        match self {
            AsyncResponse::OpenFailed { uri } => events.on_open_error(&uri),
            AsyncResponse::ReadFailed { uri } => events.on_read_error(&uri),
            AsyncResponse::ReadOk { uri, block } => events.on_read_complete(&uri, block),
            AsyncResponse::WriteFailed { uri } => events.on_write_error(&uri),
            AsyncResponse::WriteOk { uri, bytes_written } => {
                events.on_write_complete(&uri, bytes_written)
            }
        }
    }
}
