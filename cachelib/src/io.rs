use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::SimError;

// Trace lines are short, a few pages at a time keeps the syscall count down
const BUFFER_SIZE: usize = 64 * 4096;

/// Opens a trace file for one sequential pass
pub fn get_reader(path: &Path) -> Result<Box<dyn BufRead>, SimError> {
    let file = File::open(path).map_err(|e| SimError::io(path, e))?;
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // Zero length mappings are rejected on some platforms, and there's nothing to gain anyway
        let len = file.metadata().map_err(|e| SimError::io(path, e))?.len();
        if len == 0 {
            return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)));
        }
        // Safety: the mapping is read-only and only lives for the parse; a trace being truncated
        // underneath us is outside what the simulator supports
        unsafe {
            let m = Mmap::map(&file).map_err(|e| SimError::io(path, e))?;
            m.advise(Advice::Sequential).map_err(|e| SimError::io(path, e))?;
            Ok(Box::new(Cursor::new(m)))
        }
    }
}
