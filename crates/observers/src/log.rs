use std::io::{self, Write};

use rheo_core::Observer;
use rheo_solvers::{Action, Event};

/// An observer that writes one line per solver event.
///
/// Write failures do not interrupt the solve; the first one is kept and
/// returned by [`Log::finish`].
///
/// # Example
///
/// ```ignore
/// let mut log = Log::new(std::io::stderr());
/// rheo_solvers::stress(&series, 1e-14, &args, &config, &mut log)?;
/// log.finish()?;
/// ```
#[derive(Debug)]
pub struct Log<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> Log<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Returns the writer, or the first write error encountered.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while writing or flushing.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn line(&mut self, event: &Event<'_>) -> io::Result<()> {
        match event {
            Event::Iteration {
                variant,
                iter,
                unknowns,
                step,
                residual,
            } => writeln!(
                self.writer,
                "{variant} iter {iter}: stress {:.6e} step {step:.3e} residual {residual:.3e}",
                unknowns.first().copied().unwrap_or(f64::NAN),
            ),
            Event::BranchChanged {
                member,
                iter,
                active,
            } => {
                let branch = if *active { "active" } else { "inactive" };
                writeln!(self.writer, "iter {iter}: plastic member {member} now {branch}")
            }
        }
    }
}

impl<'a, W: Write> Observer<Event<'a>, Action> for Log<W> {
    fn observe(&mut self, event: &Event<'a>) -> Option<Action> {
        if self.error.is_none() {
            self.error = self.line(event).err();
        }
        None
    }
}

/// Allows `&mut Log` to be passed to solvers that take an observer by value.
impl<'a, W: Write> Observer<Event<'a>, Action> for &mut Log<W> {
    fn observe(&mut self, event: &Event<'a>) -> Option<Action> {
        (**self).observe(event)
    }
}
