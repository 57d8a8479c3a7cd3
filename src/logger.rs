//! `log` backend that writes to the firmware console.

use core::fmt::Write;

use log::{LevelFilter, Log, Metadata, Record};
use spin::{Mutex, Once};

use crate::{
    err::VecUnitError,
    osal::{PutChar, SinkWriter},
};

pub struct ConsoleLogger {
    sink: Mutex<Option<PutChar>>,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    sink: Mutex::new(None),
};

/// Set once `log::set_logger` has been attempted; holds whether it won.
static INSTALLED: Once<bool> = Once::new();

/// Routes `log` records to `putc` at `level` and above.
///
/// The first call installs [`ConsoleLogger`]. Later calls only swap the
/// output routine and the level. If another logger took the slot first,
/// every call fails with [`VecUnitError::LoggerInit`].
pub fn init(putc: fn(u8), level: LevelFilter) -> Result<(), VecUnitError> {
    let installed = *INSTALLED.call_once(|| log::set_logger(&LOGGER).is_ok());
    if !installed {
        return Err(VecUnitError::LoggerInit);
    }
    *LOGGER.sink.lock() = Some(PutChar(putc));
    log::set_max_level(level);
    Ok(())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut guard = self.sink.lock();
        if let Some(sink) = guard.as_mut() {
            let _ = writeln!(
                SinkWriter(sink),
                "[{:<5}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
