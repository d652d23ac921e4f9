use redlilium_core::memory::MemoryBlock;

/// Completion callbacks for asynchronous requests.
///
/// Callbacks run only inside [`run_async_loop`](crate::IoDriver::run_async_loop),
/// on the thread that polls the driver, never on the I/O worker. That is
/// why implementors do not need to be `Send`.
pub trait IoDriverEvents {
    /// A read finished. `block` is `None` for a zero-length file.
    fn on_read_complete(&mut self, uri: &str, block: Option<MemoryBlock>);

    /// The path could not be opened for reading or writing.
    fn on_open_error(&mut self, uri: &str);

    /// The file opened but could not be read in full.
    fn on_read_error(&mut self, uri: &str);

    /// A write finished with `bytes_written` bytes on disk.
    fn on_write_complete(&mut self, uri: &str, bytes_written: usize);

    /// Nothing was written.
    fn on_write_error(&mut self, uri: &str);
}
