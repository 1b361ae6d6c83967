//! Byte-stream cursors feeding the frame decoder
//!
//! The decoder pulls compressed bytes through [`ByteStream`]. Seekable media
//! (files, in-memory buffers) support the full set of primitives; sequential
//! media (pipes, network bodies) report `tell`, `length` and `seek` as
//! [`io::ErrorKind::Unsupported`] and the decoder falls back to forward-only
//! decoding.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use symphonia::core::io::MediaSource;

/// Random-access (or forward-only) byte source for one compressed asset
pub trait ByteStream: Send + Sync {
    /// Read up to `buf.len()` bytes; `Ok(0)` means end of stream
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move to an absolute byte offset
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Current absolute byte offset
    fn tell(&mut self) -> io::Result<u64>;

    /// Total size in bytes
    fn length(&self) -> io::Result<u64>;

    /// Whether the cursor sits at the end of the data. Always `false` for
    /// sequential media, which cannot know.
    fn at_end(&mut self) -> bool;

    /// Whether the medium is inherently forward-only
    fn is_sequential(&self) -> bool;
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{what} is not supported on a sequential stream"),
    )
}

/// Seekable stream over a file on disk
#[derive(Debug)]
pub struct FileStream {
    file: File,
    len: u64,
}

impl FileStream {
    /// Open a file for reading
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl ByteStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(drop)
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn length(&self) -> io::Result<u64> {
        Ok(self.len)
    }

    fn at_end(&mut self) -> bool {
        self.file
            .stream_position()
            .map(|pos| pos >= self.len)
            .unwrap_or(true)
    }

    fn is_sequential(&self) -> bool {
        false
    }
}

/// Forward-only stream over any reader (pipe, socket, HTTP body)
#[derive(Debug)]
pub struct SequentialStream<R> {
    inner: R,
}

impl<R: Read + Send + Sync> SequentialStream<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read + Send + Sync> ByteStream for SequentialStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn seek(&mut self, _offset: u64) -> io::Result<()> {
        Err(unsupported("seek"))
    }

    fn tell(&mut self) -> io::Result<u64> {
        Err(unsupported("tell"))
    }

    fn length(&self) -> io::Result<u64> {
        Err(unsupported("length"))
    }

    fn at_end(&mut self) -> bool {
        false
    }

    fn is_sequential(&self) -> bool {
        true
    }
}

impl<T: AsRef<[u8]> + Send + Sync> ByteStream for Cursor<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        Seek::seek(self, SeekFrom::Start(offset)).map(drop)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }

    fn length(&self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }

    fn at_end(&mut self) -> bool {
        self.position() >= self.get_ref().as_ref().len() as u64
    }

    fn is_sequential(&self) -> bool {
        false
    }
}

/// Bridges a [`ByteStream`] into symphonia's `MediaSource`
///
/// Bytes pulled with [`MediaSourceAdapter::sniff`] are kept and replayed to
/// the next reads, so sequential streams can be inspected without a rewind.
pub(crate) struct MediaSourceAdapter {
    inner: Box<dyn ByteStream>,
    prefix: Vec<u8>,
    prefix_pos: usize,
}

impl MediaSourceAdapter {
    pub(crate) fn new(inner: Box<dyn ByteStream>) -> Self {
        Self {
            inner,
            prefix: Vec::new(),
            prefix_pos: 0,
        }
    }

    /// Read up to `n` leading bytes without consuming them
    pub(crate) fn sniff(&mut self, n: usize) -> io::Result<&[u8]> {
        let mut chunk = [0u8; 64];
        while self.prefix.len() < n {
            let want = (n - self.prefix.len()).min(chunk.len());
            let got = self.inner.read(&mut chunk[..want])?;
            if got == 0 {
                break;
            }
            self.prefix.extend_from_slice(&chunk[..got]);
        }
        let end = n.min(self.prefix.len());
        let start = self.prefix_pos.min(end);
        Ok(&self.prefix[start..end])
    }

    fn pending(&self) -> usize {
        self.prefix.len() - self.prefix_pos
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.inner.tell()? - self.pending() as u64)
    }
}

fn offset(base: u64, delta: i64) -> io::Result<u64> {
    base.checked_add_signed(delta).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "seek to a negative or overflowing position",
        )
    })
}

impl Read for MediaSourceAdapter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending() > 0 {
            let n = self.pending().min(buf.len());
            buf[..n].copy_from_slice(&self.prefix[self.prefix_pos..self.prefix_pos + n]);
            self.prefix_pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

impl Seek for MediaSourceAdapter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => n,
            SeekFrom::Current(delta) => offset(self.position()?, delta)?,
            SeekFrom::End(delta) => offset(self.inner.length()?, delta)?,
        };
        self.inner.seek(target)?;
        self.prefix.clear();
        self.prefix_pos = 0;
        Ok(target)
    }
}

impl MediaSource for MediaSourceAdapter {
    fn is_seekable(&self) -> bool {
        !self.inner.is_sequential()
    }

    fn byte_len(&self) -> Option<u64> {
        self.inner.length().ok()
    }
}
