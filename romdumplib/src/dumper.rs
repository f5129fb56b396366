//! The `dumper` module provides [`StreamDumper`], a lazy line-by-line hex dump of any
//! seekable byte source.
//!
//! The source is read in fixed-size chunks that are independent of the line width.
//! Bytes left over after cutting a chunk into full lines are carried over to the next
//! read, so the rendered output does not depend on the chunk size.

use crate::error::{DumpError, DumpErrorKind};
use crate::formatter::{ADDRESS_MASK, DisplayLayout, format_line};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Default number of bytes pulled from the source per read.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Window and layout of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Bytes to skip before the first rendered line
    pub skip: u64,
    /// Maximum number of bytes to render (`None` = until EOF)
    pub count: Option<u64>,
    /// Address shown for the first rendered byte (`None` = `skip`)
    pub base: Option<usize>,
    /// Line layout
    pub layout: DisplayLayout,
    /// Bytes read from the source at once
    pub chunk_size: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            skip: 0,
            count: None,
            base: None,
            layout: DisplayLayout::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl DumpOptions {
    #[must_use]
    pub const fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: Option<u64>) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub const fn with_base(mut self, base: Option<usize>) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: DisplayLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// One rendered line of a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// Address shown in the address column
    pub address: usize,
    /// Raw bytes of the line (at most `bytes_per_line`)
    pub bytes: Vec<u8>,
    /// Rendered line, newline included
    pub text: String,
}

/// Complete result of a dump: the rendered text and the raw bytes it shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOutput {
    pub text: String,
    pub bytes: Vec<u8>,
}

type ProgressFn = Box<dyn FnMut(u8) + Send>;

/// Lazy hex dump of a byte source. Yields one [`LineRecord`] per rendered line.
///
/// # Example
/// ```
/// use romdumplib::{DumpOptions, StreamDumper};
/// use std::io::Cursor;
///
/// let data: Vec<u8> = (0..18).collect();
/// let dumper = StreamDumper::new(Cursor::new(data), DumpOptions::default()).unwrap();
/// let lines: Vec<_> = dumper.collect::<Result<_, _>>().unwrap();
///
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[1].bytes, vec![16, 17]);
/// ```
pub struct StreamDumper<R> {
    source: R,
    layout: DisplayLayout,
    chunk_size: usize,
    /// Address of the next line to render
    address: usize,
    /// Bytes of the window not read yet
    remaining: u64,
    /// Size of the window, used for progress
    total: u64,
    consumed: u64,
    /// Bytes read but not rendered yet (less than one line)
    pending: Vec<u8>,
    ready: VecDeque<LineRecord>,
    last_percent: Option<u8>,
    progress: Option<ProgressFn>,
    done: bool,
}

impl<R: Read + Seek> StreamDumper<R> {
    /// Positions `source` at `options.skip` and prepares the dump window.
    ///
    /// # Errors
    /// Returns an error if the address of the first byte (`base`, or `skip` without
    /// a base) does not fit in 32 bits, or if the source cannot be sought.
    pub fn new(mut source: R, options: DumpOptions) -> Result<Self, DumpError> {
        let start_address = options.base.map_or(options.skip, |base| base as u64);
        let address = u32::try_from(start_address)
            .ok()
            .and_then(|addr| usize::try_from(addr).ok())
            .ok_or_else(|| {
                DumpError::AddressError(DumpErrorKind::InvalidAddress(format!(
                    "0x{start_address:X}"
                )))
            })?;

        let len = source.seek(SeekFrom::End(0))?;
        let start = options.skip.min(len);
        source.seek(SeekFrom::Start(start))?;

        let available = len - start;
        let window = options.count.map_or(available, |count| count.min(available));

        log::debug!(
            "Dump window: skip=0x{:X}, bytes=0x{window:X}, base=0x{address:X}",
            options.skip
        );

        Ok(Self {
            source,
            layout: options.layout,
            chunk_size: options.chunk_size.max(1),
            address,
            remaining: window,
            total: window,
            consumed: 0,
            pending: Vec::with_capacity(options.layout.bytes_per_line()),
            ready: VecDeque::new(),
            last_percent: None,
            progress: None,
            done: window == 0,
        })
    }
}

impl<R: Read> StreamDumper<R> {
    /// Registers a callback receiving the consumed share of the window in percent.
    /// It is called after a chunk read only when the value changed.
    #[must_use]
    pub fn with_progress(mut self, callback: impl FnMut(u8) + Send + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Number of bytes in the dump window.
    #[must_use]
    pub const fn window_size(&self) -> u64 {
        self.total
    }

    /// Runs the dump to completion and collects the text and raw bytes.
    ///
    /// # Errors
    /// Returns an error if reading the source fails.
    pub fn into_output(self) -> Result<DumpOutput, DumpError> {
        let mut output = DumpOutput::default();
        for line in self {
            let line = line?;
            output.text.push_str(&line.text);
            output.bytes.extend_from_slice(&line.bytes);
        }
        Ok(output)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_chunk(&mut self) -> Result<(), DumpError> {
        let want = self.remaining.min(self.chunk_size as u64);
        let mut chunk = Vec::with_capacity(want as usize);
        let n = self.source.by_ref().take(want).read_to_end(&mut chunk)?;

        if n == 0 {
            // EOF before the end of the window (source shrank)
            self.finish();
            return Ok(());
        }

        self.remaining -= n as u64;
        self.consumed += n as u64;

        let mut pending = std::mem::take(&mut self.pending);
        pending.extend_from_slice(&chunk);

        let mut lines = pending.chunks_exact(self.layout.bytes_per_line());
        for line in &mut lines {
            self.push_line(line);
        }
        self.pending = lines.remainder().to_vec();

        self.report_progress();

        if self.remaining == 0 {
            self.finish();
        }
        Ok(())
    }

    fn push_line(&mut self, bytes: &[u8]) {
        let formatted = format_line(self.address, bytes, &self.layout);
        self.ready.push_back(LineRecord {
            address: self.address,
            bytes: bytes.to_vec(),
            text: formatted.text,
        });
        self.address = self.address.wrapping_add(bytes.len()) & ADDRESS_MASK;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn report_progress(&mut self) {
        let Some(callback) = self.progress.as_mut() else {
            return;
        };
        if self.total == 0 {
            return;
        }

        let percent = (u128::from(self.consumed) * 100 / u128::from(self.total)) as u8;
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            callback(percent);
        }
    }

    fn finish(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.push_line(&rest);
        }
        log::debug!("Dump finished after 0x{:X} bytes", self.consumed);
        self.done = true;
    }
}

impl<R: Read> Iterator for StreamDumper<R> {
    type Item = Result<LineRecord, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            if let Err(err) = self.read_chunk() {
                self.done = true;
                self.pending.clear();
                return Some(Err(err));
            }
        }
    }
}

/// Streams the dump of `source` into `writer`. Returns the number of bytes dumped.
///
/// # Errors
/// Returns an error if reading the source or writing the output fails.
pub fn dump_to_writer<R: Read + Seek, W: Write>(
    source: R,
    options: DumpOptions,
    writer: &mut W,
) -> Result<u64, DumpError> {
    let mut dumped = 0;
    for line in StreamDumper::new(source, options)? {
        let line = line?;
        writer.write_all(line.text.as_bytes())?;
        dumped += line.bytes.len() as u64;
    }
    writer.flush()?;
    Ok(dumped)
}

/// Dumps the file at `filepath` into memory.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
///
/// # Example
/// ```
/// use romdumplib::{DumpOptions, dump_file};
///
/// let options = DumpOptions::default().with_count(Some(5));
/// let out = dump_file("tests/fixtures/hello.bin", options).unwrap();
/// assert_eq!(out.bytes, b"Hello");
/// assert!(out.text.starts_with("00000000: 48 65 6C 6C 6F"));
/// ```
pub fn dump_file<P: AsRef<Path>>(
    filepath: P,
    options: DumpOptions,
) -> Result<DumpOutput, DumpError> {
    let file = File::open(filepath)?;
    StreamDumper::new(file, options)?.into_output()
}

/// Dumps the file at `filepath` to `writer` through a buffered writer.
///
/// # Errors
/// Returns an error if the file cannot be opened or read, or writing fails.
pub fn dump_file_to<P: AsRef<Path>, W: Write>(
    filepath: P,
    options: DumpOptions,
    writer: W,
) -> Result<u64, DumpError> {
    let file = File::open(filepath)?;
    dump_to_writer(file, options, &mut BufWriter::new(writer))
}

/// Renders an in-memory buffer whose first byte sits at `base`.
/// Addresses wrap around at 32 bits like those of [`StreamDumper`].
#[must_use]
pub fn dump_buffer(buf: &[u8], base: usize, layout: &DisplayLayout) -> String {
    let bpl = layout.bytes_per_line();
    buf.chunks(bpl)
        .enumerate()
        .map(|(i, chunk)| {
            let address = base.wrapping_add(i.wrapping_mul(bpl));
            format_line(address, chunk, layout).text
        })
        .collect()
}
