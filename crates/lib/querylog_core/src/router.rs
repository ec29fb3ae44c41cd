//! File routing: stream to path, write mode, and lazy directory creation.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::naming::FileNaming;

/// Logical log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stream {
    AllQueries,
    SlowQueries,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::AllQueries => f.write_str("all-queries"),
            Stream::SlowQueries => f.write_str("slow-queries"),
        }
    }
}

/// How a line is written to its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate the file, then write.
    Overwrite,
    Append,
}

/// Resolved destination for one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub stream: Stream,
    pub path: PathBuf,
    pub mode: WriteMode,
}

/// Maps streams to files inside the log directory.
pub struct FileRouter {
    directory: PathBuf,
    naming: Arc<dyn FileNaming>,
    override_on_first: bool,
}

impl FileRouter {
    pub fn new(directory: PathBuf, naming: Arc<dyn FileNaming>, override_on_first: bool) -> Self {
        Self {
            directory,
            naming,
            override_on_first,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Resolve the path and write mode for `stream` at sequence `number`.
    ///
    /// Only the all-queries stream is ever overwritten, and only for the
    /// first query of a run with overriding enabled.
    pub fn resolve(&self, stream: Stream, number: u64) -> Route {
        let (file_name, mode) = match stream {
            Stream::AllQueries => {
                let mode = if number == 1 && self.override_on_first {
                    WriteMode::Overwrite
                } else {
                    WriteMode::Append
                };
                (self.naming.for_all_queries(), mode)
            }
            Stream::SlowQueries => (self.naming.for_slow_queries(), WriteMode::Append),
        };

        Route {
            stream,
            path: self.directory.join(file_name),
            mode,
        }
    }

    /// Create the log directory on the first query of a run.
    ///
    /// Returns `true` when the directory was created by this call. For any
    /// sequence number other than `1` no filesystem call is made. A directory
    /// that appears concurrently counts as success.
    pub fn ensure_directory(&self, number: u64) -> Result<bool> {
        if number != 1 || self.directory.is_dir() {
            return Ok(false);
        }

        match std::fs::create_dir_all(&self.directory) {
            Ok(()) => {
                info!(directory = %self.directory.display(), "created query log directory");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && self.directory.is_dir() => Ok(false),
            Err(source) => Err(Error::DirectoryCreationFailed {
                path: self.directory.clone(),
                source,
            }),
        }
    }
}

/// Write `line` to the routed file in a single write call.
pub fn write_line(route: &Route, line: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    match route.mode {
        WriteMode::Overwrite => options.write(true).create(true).truncate(true),
        WriteMode::Append => options.append(true).create(true),
    };

    debug!(stream = %route.stream, path = %route.path.display(), mode = ?route.mode, "writing query line");

    options
        .open(&route.path)
        .and_then(|mut file| {
            file.write_all(line.as_bytes())?;
            file.flush()
        })
        .map_err(|source| Error::FileWriteFailed {
            stream: route.stream,
            path: route.path.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedNames;

    impl FileNaming for FixedNames {
        fn for_all_queries(&self) -> String {
            "all.sql".into()
        }

        fn for_slow_queries(&self) -> String {
            "slow.sql".into()
        }
    }

    fn router(dir: &Path, override_on_first: bool) -> FileRouter {
        FileRouter::new(dir.to_path_buf(), Arc::new(FixedNames), override_on_first)
    }

    #[test]
    fn all_queries_overwrites_only_first_with_override() {
        let r = router(Path::new("/logs"), true);
        let first = r.resolve(Stream::AllQueries, 1);
        assert_eq!(first.path, PathBuf::from("/logs/all.sql"));
        assert_eq!(first.mode, WriteMode::Overwrite);
        assert_eq!(r.resolve(Stream::AllQueries, 2).mode, WriteMode::Append);

        let r = router(Path::new("/logs"), false);
        assert_eq!(r.resolve(Stream::AllQueries, 1).mode, WriteMode::Append);
    }

    #[test]
    fn slow_queries_always_append() {
        for override_on_first in [true, false] {
            let r = router(Path::new("/logs"), override_on_first);
            for number in [1, 2, 3, 100] {
                let route = r.resolve(Stream::SlowQueries, number);
                assert_eq!(route.mode, WriteMode::Append);
                assert_eq!(route.path, PathBuf::from("/logs/slow.sql"));
            }
        }
    }

    #[test]
    fn creates_directory_on_first_query() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("sql");
        let r = router(&dir, false);

        assert!(r.ensure_directory(1).unwrap());
        assert!(dir.is_dir());
        // Already present: no-op success.
        assert!(!r.ensure_directory(1).unwrap());
    }

    #[test]
    fn skips_directory_creation_after_first_query() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("sql");
        let r = router(&dir, false);

        assert!(!r.ensure_directory(2).unwrap());
        assert!(!dir.exists());
    }

    #[test]
    fn directory_creation_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let r = router(&blocker.join("sql"), false);

        let err = r.ensure_directory(1).unwrap_err();
        assert!(matches!(err, Error::DirectoryCreationFailed { .. }));
    }

    #[test]
    fn append_then_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let r = router(tmp.path(), true);

        write_line(&r.resolve(Stream::AllQueries, 2), "a\n").unwrap();
        write_line(&r.resolve(Stream::AllQueries, 3), "b\n").unwrap();
        let path = tmp.path().join("all.sql");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");

        write_line(&r.resolve(Stream::AllQueries, 1), "c\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "c\n");
    }

    #[test]
    fn write_failure_names_stream() {
        let route = Route {
            stream: Stream::SlowQueries,
            path: PathBuf::from("/nonexistent/dir/slow.sql"),
            mode: WriteMode::Append,
        };
        let err = write_line(&route, "x\n").unwrap_err();
        assert!(matches!(
            err,
            Error::FileWriteFailed {
                stream: Stream::SlowQueries,
                ..
            }
        ));
    }

    #[test]
    fn stream_display() {
        assert_eq!(Stream::AllQueries.to_string(), "all-queries");
        assert_eq!(Stream::SlowQueries.to_string(), "slow-queries");
    }
}
