// Line-atomic output shared by many threads
//
// Queue clients report activity through an injected `LineSink` instead of a
// process-wide locked stdout. One call is one uninterrupted write, so lines
// from concurrent threads never interleave.

use parking_lot::Mutex;
use std::io::{self, Stdout, Write};

/// Destination for whole lines of text.
pub trait LineSink: Send + Sync {
   /// Write `text` as-is, no newline appended.
   fn write_text(&self, text: &str) -> io::Result<()>;

   /// Write `line` followed by a newline, atomically with respect to every
   /// other call on the same sink.
   fn write_line(&self, line: &str) -> io::Result<()>;
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Writer-backed sink                                                      */
/*──────────────────────────────────────────────────────────────────────────*/

/// Serialises writes to any `io::Write` behind one lock.
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Send> {
   out: Mutex<W>,
}

impl ConsoleSink<Stdout> {
   pub fn stdout() -> Self {
      Self::new(io::stdout())
   }
}

impl<W: Write + Send> ConsoleSink<W> {
   pub fn new(out: W) -> Self {
      Self { out: Mutex::new(out) }
   }

   pub fn into_inner(self) -> W {
      self.out.into_inner()
   }
}

impl<W: Write + Send> LineSink for ConsoleSink<W> {
   fn write_text(&self, text: &str) -> io::Result<()> {
      let mut out = self.out.lock();
      out.write_all(text.as_bytes())?;
      out.flush()
   }

   fn write_line(&self, line: &str) -> io::Result<()> {
      let mut out = self.out.lock();
      out.write_all(line.as_bytes())?;
      out.write_all(b"\n")?;
      out.flush()
   }
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  tracing-backed sink                                                     */
/*──────────────────────────────────────────────────────────────────────────*/

/// Forwards every line as an `info` event on the `console` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LineSink for TracingSink {
   fn write_text(&self, text: &str) -> io::Result<()> {
      tracing::info!(target: "console", "{}", text);
      Ok(())
   }

   fn write_line(&self, line: &str) -> io::Result<()> {
      tracing::info!(target: "console", "{}", line);
      Ok(())
   }
}

impl<S: LineSink + ?Sized> LineSink for &S {
   fn write_text(&self, text: &str) -> io::Result<()> {
      (**self).write_text(text)
   }

   fn write_line(&self, line: &str) -> io::Result<()> {
      (**self).write_line(line)
   }
}

impl<S: LineSink + ?Sized> LineSink for std::sync::Arc<S> {
   fn write_text(&self, text: &str) -> io::Result<()> {
      (**self).write_text(text)
   }

   fn write_line(&self, line: &str) -> io::Result<()> {
      (**self).write_line(line)
   }
}

#[doc(hidden)]
pub fn concat(values: &[&dyn std::fmt::Display]) -> String {
   use std::fmt::Write as _;
   let mut text = String::new();
   for value in values {
      // writing into a String cannot fail
      let _ = write!(text, "{}", value);
   }
   text
}

/// Concatenate `Display` values (no separator, no newline) and write them to
/// a [`LineSink`] in one call. Evaluates to `io::Result<()>`.
///
/// ```
/// use blocking_queue::{sync_print, ConsoleSink};
///
/// let sink = ConsoleSink::new(Vec::new());
/// sync_print!(sink, "item [", 7, "]").unwrap();
/// assert_eq!(sink.into_inner(), b"item [7]");
/// ```
#[macro_export]
macro_rules! sync_print {
   ($sink:expr $(, $value:expr)* $(,)?) => {
      $crate::console::LineSink::write_text(
         &$sink,
         &$crate::console::concat(&[$(&$value as &dyn ::std::fmt::Display),*]),
      )
   };
}

/// Like [`sync_print!`] with a trailing newline.
#[macro_export]
macro_rules! sync_println {
   ($sink:expr $(, $value:expr)* $(,)?) => {
      $crate::console::LineSink::write_line(
         &$sink,
         &$crate::console::concat(&[$(&$value as &dyn ::std::fmt::Display),*]),
      )
   };
}
