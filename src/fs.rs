use log::debug;
use std::io;
use std::path::Path;

/// Where documents are read from. The crate only ever reads whole files; it never
/// opens, watches or writes them itself.
pub trait FileSource {
    /// Returns the full text of the file at `path`.
    ///
    /// # Errors
    /// Fails if the path does not exist or cannot be read as UTF-8 text.
    fn read(&self, path: &Path) -> io::Result<String>;
}

impl<T: FileSource + ?Sized> FileSource for &T {
    fn read(&self, path: &Path) -> io::Result<String> {
        (**self).read(path)
    }
}

/// Reads straight from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFiles;

impl FileSource for DiskFiles {
    fn read(&self, path: &Path) -> io::Result<String> {
        debug!("reading {}", path.display());
        std::fs::read_to_string(path)
    }
}
