use std::fs::File;
use std::io::{self, Cursor, Seek};

use xferprims_copy::Source;

/// A sequentially readable source whose remaining length is known up front.
///
/// The size is what goes into the transfer header, so it must count from
/// the current read position, not from the start.
pub trait FileSource: Source {
    /// Bytes between the current position and the end of the source.
    fn size(&mut self) -> io::Result<u64>;
}

impl FileSource for File {
    fn size(&mut self) -> io::Result<u64> {
        let len = self.metadata()?.len();
        let position = self.stream_position()?;
        Ok(len.saturating_sub(position))
    }
}

impl<T: AsRef<[u8]>> FileSource for Cursor<T> {
    fn size(&mut self) -> io::Result<u64> {
        let len = self.get_ref().as_ref().len() as u64;
        Ok(len.saturating_sub(self.position()))
    }
}

impl<T: FileSource + ?Sized> FileSource for &mut T {
    fn size(&mut self) -> io::Result<u64> {
        (**self).size()
    }
}
