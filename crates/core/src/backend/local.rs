use std::fmt;
use std::fs::{self, File, ReadDir};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::{Backend, ByteStream};
use crate::error::{Error, Result};
use crate::uri::Uri;

/// Backend over the immediate children of a local directory.
///
/// Symlinks are followed: a link to a regular file is listed, links to
/// directories and dangling links are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// The path is taken literally: no tilde or variable expansion, no
    /// existence check.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Backend for LocalBackend {
    type Entry = LocalEntry;
    type Stream = FileStream;
    type Entries = LocalEntries;

    fn from_uri(uri: &Uri) -> Result<Self> {
        Ok(Self::new(&uri.path))
    }

    fn list(&self) -> LocalEntries {
        debug!(root = %self.root.display(), "listing local directory");
        LocalEntries {
            root: self.root.clone(),
            state: ListState::Pending,
        }
    }

    fn fetch(&self, entry: &LocalEntry) -> Result<FileStream> {
        if entry.root != self.root {
            return Err(Error::ForeignEntry {
                entry: entry.path.clone(),
                root: self.root.clone(),
            });
        }
        FileStream::open(&entry.path)
    }
}

/// A file listed by a [`LocalBackend`].
///
/// Only `list` creates these, so an entry always names a child of the root
/// of the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalEntry {
    root: PathBuf,
    path: PathBuf,
}

impl LocalEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for LocalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

enum ListState {
    Pending,
    Reading(ReadDir),
    Done,
}

/// Lazy directory listing. The directory is opened on the first `next`.
pub struct LocalEntries {
    root: PathBuf,
    state: ListState,
}

impl LocalEntries {
    fn io_error(path: &Path, source: io::Error) -> Error {
        Error::Io {
            location: path.display().to_string(),
            source,
        }
    }
}

impl Iterator for LocalEntries {
    type Item = Result<LocalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                ListState::Pending => match fs::read_dir(&self.root) {
                    Ok(read_dir) => self.state = ListState::Reading(read_dir),
                    Err(source) => {
                        self.state = ListState::Done;
                        return Some(Err(Self::io_error(&self.root, source)));
                    }
                },
                ListState::Reading(read_dir) => {
                    let dir_entry = match read_dir.next() {
                        Some(Ok(dir_entry)) => dir_entry,
                        Some(Err(source)) => return Some(Err(Self::io_error(&self.root, source))),
                        None => {
                            self.state = ListState::Done;
                            return None;
                        }
                    };
                    let path = dir_entry.path();
                    match fs::metadata(&path) {
                        Ok(meta) if meta.is_file() => {
                            trace!(path = %path.display(), "listed file");
                            return Some(Ok(LocalEntry {
                                root: self.root.clone(),
                                path,
                            }));
                        }
                        Ok(_) => continue,
                        // Dangling symlink, or removed since the directory was read.
                        Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                        Err(source) => return Some(Err(Self::io_error(&path, source))),
                    }
                }
                ListState::Done => return None,
            }
        }
    }
}

/// An open local file. The handle is closed when the stream is dropped.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
    len: u64,
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let location = || path.display().to_string();
        let file = File::open(&path).map_err(|e| Error::from_io(location(), e))?;
        let meta = file.metadata().map_err(|e| Error::from_io(location(), e))?;
        if !meta.is_file() {
            return Err(Error::Io {
                location: location(),
                source: io::Error::other("not a regular file"),
            });
        }
        debug!(path = %path.display(), len = meta.len(), "opened stream");
        Ok(Self {
            file,
            path,
            len: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl ByteStream for FileStream {
    fn len(&self) -> u64 {
        self.len
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), "released stream");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn backend_in(dir: &tempfile::TempDir) -> LocalBackend {
        LocalBackend::new(dir.path())
    }

    fn listed(backend: &LocalBackend) -> Vec<PathBuf> {
        let mut paths: Vec<_> = backend
            .list()
            .map(|e| e.unwrap().path().to_path_buf())
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn from_uri_keeps_path_literally() {
        let uri = Uri::parse("file:///path/to/local/dir").unwrap();
        let backend = LocalBackend::from_uri(&uri).unwrap();
        assert_eq!(backend.root(), Path::new("/path/to/local/dir"));

        let uri = Uri::parse("file://~/$HOME/in").unwrap();
        let backend = LocalBackend::from_uri(&uri).unwrap();
        assert_eq!(backend.root(), Path::new("~/$HOME/in"));
    }

    #[test]
    fn construction_does_not_require_existing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let uri = Uri::parse(&format!("file://{}", missing.display())).unwrap();
        assert!(LocalBackend::from_uri(&uri).is_ok());
    }

    #[test]
    fn list_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(listed(&backend_in(&dir)).is_empty());
    }

    #[test]
    fn list_returns_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let file1 = dir.path().join("image1.jpg");
        let file2 = dir.path().join("document.pdf");
        let subdir = dir.path().join("temp_data");
        fs::write(&file1, "content1").unwrap();
        fs::write(&file2, "content2").unwrap();
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("nested.jpg"), "nested").unwrap();

        let files = listed(&backend_in(&dir));
        assert_eq!(files.len(), 2);
        assert!(files.contains(&file1));
        assert!(files.contains(&file2));
        assert!(!files.contains(&subdir));
    }

    #[test]
    fn list_is_fresh_on_each_call() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend_in(&dir);
        assert_eq!(backend.list().count(), 0);

        fs::write(dir.path().join("a.jpg"), "a").unwrap();
        assert_eq!(backend.list().count(), 1);
    }

    #[test]
    fn list_missing_root_fails_on_first_access() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path().join("missing"));

        let mut entries = backend.list();
        let err = entries.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(entries.next().is_none());
    }

    #[test]
    fn list_root_that_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let err = LocalBackend::new(&file).list().next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[cfg(unix)]
    #[test]
    fn list_follows_file_symlinks_only() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("target.jpg");
        fs::write(&target, "t").unwrap();
        symlink(&target, dir.path().join("link.jpg")).unwrap();
        symlink(outside.path(), dir.path().join("dirlink")).unwrap();
        symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();

        let files = listed(&backend_in(&dir));
        assert_eq!(files, vec![dir.path().join("link.jpg")]);
    }

    #[test]
    fn fetch_reads_full_content() {
        let dir = tempfile::tempdir().unwrap();
        let expected = b"This is the content to be fetched.";
        fs::write(dir.path().join("test_fetch.txt"), expected).unwrap();
        let backend = backend_in(&dir);
        let entry = backend.list().next().unwrap().unwrap();

        let mut stream = backend.fetch(&entry).unwrap();
        assert_eq!(stream.len(), expected.len() as u64);
        let mut content = Vec::new();
        stream.read_to_end(&mut content).unwrap();
        assert_eq!(content, expected);
        assert_eq!(stream.position().unwrap(), expected.len() as u64);
    }

    #[test]
    fn fetched_stream_is_seekable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("img.jpg"), b"0123456789").unwrap();
        let backend = backend_in(&dir);
        let entry = backend.list().next().unwrap().unwrap();
        let mut stream = backend.fetch(&entry).unwrap();

        let mut head = [0u8; 4];
        stream.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"0123");

        stream.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(stream.position().unwrap(), 0);
        let mut all = Vec::new();
        stream.read_to_end(&mut all).unwrap();
        assert_eq!(all, b"0123456789");

        stream.seek(SeekFrom::End(-2)).unwrap();
        let mut tail = String::new();
        stream.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "89");
    }

    #[test]
    fn fetch_after_delete_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.jpg");
        fs::write(&path, "x").unwrap();
        let backend = backend_in(&dir);
        let entry = backend.list().next().unwrap().unwrap();

        fs::remove_file(&path).unwrap();
        let err = backend.fetch(&entry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert!(err.to_string().contains("receipt.jpg"));
    }

    #[test]
    fn fetch_entry_replaced_by_directory_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.jpg");
        fs::write(&path, "x").unwrap();
        let backend = backend_in(&dir);
        let entry = backend.list().next().unwrap().unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        let err = backend.fetch(&entry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("receipt.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn fetch_unreadable_file_is_io() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.jpg");
        fs::write(&path, "x").unwrap();
        let backend = backend_in(&dir);
        let entry = backend.list().next().unwrap().unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&path).is_ok() {
            // Running with CAP_DAC_OVERRIDE (root); permissions are not enforced.
            return;
        }
        let err = backend.fetch(&entry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn fetch_rejects_entry_from_other_root() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        fs::write(dir_a.path().join("a.jpg"), "a").unwrap();
        let entry = backend_in(&dir_a).list().next().unwrap().unwrap();

        let err = backend_in(&dir_b).fetch(&entry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ForeignEntry);
    }

    #[test]
    fn with_stream_maps_consumer_failure_to_io() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), "abc").unwrap();
        let backend = backend_in(&dir);
        let entry = backend.list().next().unwrap().unwrap();

        let err = backend
            .with_stream(&entry, |_| -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::InvalidData, "bad image"))
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("a.jpg"));

        let len = backend.with_stream(&entry, |s| Ok(s.len())).unwrap();
        assert_eq!(len, 3);
    }
}
