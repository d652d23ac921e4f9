//! Shared helpers for the driver integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use redlilium_core::memory::MemoryBlock;
use redlilium_io::{AsyncDriver, IoDriver, IoDriverEvents};

/// One delivered callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ReadComplete { uri: String, data: Option<Vec<u8>> },
    OpenError(String),
    ReadError(String),
    WriteComplete { uri: String, bytes: usize },
    WriteError(String),
}

impl Event {
    pub fn uri(&self) -> &str {
        match self {
            Event::ReadComplete { uri, .. } | Event::WriteComplete { uri, .. } => uri,
            Event::OpenError(uri) | Event::ReadError(uri) | Event::WriteError(uri) => uri,
        }
    }
}

/// Callbacks that append every event to a shared list.
pub struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Recorder {
    pub fn shared() -> (Self, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                events: Rc::clone(&events),
            },
            events,
        )
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl IoDriverEvents for Recorder {
    fn on_read_complete(&mut self, uri: &str, block: Option<MemoryBlock>) {
        self.push(Event::ReadComplete {
            uri: uri.to_owned(),
            data: block.map(|b| b.data().to_vec()),
        });
    }

    fn on_open_error(&mut self, uri: &str) {
        self.push(Event::OpenError(uri.to_owned()));
    }

    fn on_read_error(&mut self, uri: &str) {
        self.push(Event::ReadError(uri.to_owned()));
    }

    fn on_write_complete(&mut self, uri: &str, bytes_written: usize) {
        self.push(Event::WriteComplete {
            uri: uri.to_owned(),
            bytes: bytes_written,
        });
    }

    fn on_write_error(&mut self, uri: &str) {
        self.push(Event::WriteError(uri.to_owned()));
    }
}

/// Poll the driver like a frame loop until nothing is in flight.
pub fn pump(driver: &mut AsyncDriver) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while driver.in_flight() > 0 {
        assert!(Instant::now() < deadline, "async I/O did not complete in time");
        driver.run_async_loop();
        std::thread::sleep(Duration::from_millis(1));
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
