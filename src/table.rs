//! Row-level table streaming on top of the byte executors.
//!
//! Rows travel as a YSON list fragment: `<row>;\n<row>;\n...`.

use bytes::{Buf, BytesMut};
use serde::Serialize;

use crate::call::Call;
use crate::context::Context;
use crate::error::Result;
use crate::http::{HttpClient, ReadHandle, WriteHandle};
use crate::verb::Verb;
use crate::yson::{self, Yson};

/// Streams rows into `write_table`.
#[derive(Debug)]
pub struct TableWriter {
    handle: WriteHandle,
    scratch: String,
}

impl TableWriter {
    pub fn new(handle: WriteHandle) -> Self {
        Self {
            handle,
            scratch: String::new(),
        }
    }

    pub async fn write_row<T: Serialize + ?Sized>(&mut self, row: &T) -> Result<()> {
        self.write_value(&Yson::from_serialize(row)?).await
    }

    pub async fn write_value(&mut self, row: &Yson) -> Result<()> {
        self.scratch.clear();
        yson::write_fragment_item(row, &mut self.scratch);
        self.handle.write(self.scratch.as_bytes()).await
    }

    /// Finish the upload and report whether the cluster accepted it.
    pub async fn close(self) -> Result<()> {
        self.handle.close().await
    }
}

/// Decodes rows out of a `read_table` stream.
#[derive(Debug)]
pub struct TableReader {
    handle: ReadHandle,
    decoder: RowDecoder,
    eof: bool,
}

impl TableReader {
    pub fn new(handle: ReadHandle) -> Self {
        Self {
            handle,
            decoder: RowDecoder::default(),
            eof: false,
        }
    }

    /// Next row, `None` once the stream is exhausted.
    pub async fn next_row(&mut self) -> Result<Option<Yson>> {
        loop {
            if let Some(row) = self.decoder.next_row(self.eof)? {
                return Ok(Some(row));
            }
            if self.eof {
                return Ok(None);
            }
            match self.handle.chunk().await? {
                Some(chunk) => self.decoder.push(&chunk),
                None => self.eof = true,
            }
        }
    }

    pub fn close(self) {
        self.handle.close();
    }
}

/// Buffers stream bytes and cuts them into rows.
///
/// The parser only runs once a top-level `;` has arrived (or at the end of
/// the stream), so a large row split into many chunks is scanned once.
#[derive(Debug, Default)]
struct RowDecoder {
    buf: BytesMut,
    boundary: Boundary,
}

impl RowDecoder {
    fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    fn next_row(&mut self, at_eof: bool) -> Result<Option<Yson>> {
        if !at_eof && !self.boundary.scan(&self.buf) {
            return Ok(None);
        }
        match yson::next_fragment_item(&self.buf, at_eof)? {
            Some((row, used)) => {
                self.buf.advance(used);
                self.boundary = Boundary::default();
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }
}

/// Incremental search for a `;` outside any string, map or list.
#[derive(Debug, Default)]
struct Boundary {
    scanned: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
    found: bool,
}

impl Boundary {
    /// Continue over the bytes appended since the last call.
    fn scan(&mut self, buf: &[u8]) -> bool {
        while !self.found && self.scanned < buf.len() {
            let byte = buf[self.scanned];
            self.scanned += 1;

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }
            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' | b'<' => self.depth += 1,
                b'}' | b']' | b'>' => self.depth = self.depth.saturating_sub(1),
                b';' if self.depth == 0 => self.found = true,
                _ => {}
            }
        }
        self.found
    }
}

impl HttpClient {
    pub async fn write_table(&self, ctx: &Context, path: &str) -> Result<TableWriter> {
        let call = Call::new(Verb::WriteTable).with_param("path", path);
        Ok(TableWriter::new(self.open_write(ctx, call).await?))
    }

    pub async fn read_table(&self, ctx: &Context, path: &str) -> Result<TableReader> {
        let call = Call::new(Verb::ReadTable).with_param("path", path);
        Ok(TableReader::new(self.open_read(ctx, call).await?))
    }
}
