use rheo_core::Observer;
use rheo_solvers::{Action, Event, Variant};

/// One recorded solver event.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Iteration {
        variant: Variant,
        iter: usize,
        unknowns: Vec<f64>,
        step: f64,
        residual: f64,
    },
    BranchChanged {
        member: usize,
        iter: usize,
        active: bool,
    },
}

/// An observer that keeps every event in memory.
///
/// Pass `&mut Recorder` as the solver observer to inspect the history after
/// the solve completes.
///
/// # Example
///
/// ```ignore
/// let mut recorder = Recorder::new();
/// let solution = rheo_solvers::stress(&series, 1e-14, &args, &config, &mut recorder)?;
/// assert_eq!(recorder.iterations().count(), solution.iters);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    records: Vec<Record>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterates over the recorded iteration events.
    pub fn iterations(&self) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(|r| matches!(r, Record::Iteration { .. }))
    }

    /// Residual norm of every recorded iteration, in order.
    #[must_use]
    pub fn residuals(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| match r {
                Record::Iteration { residual, .. } => Some(*residual),
                Record::BranchChanged { .. } => None,
            })
            .collect()
    }
}

impl<'a> Observer<Event<'a>, Action> for Recorder {
    fn observe(&mut self, event: &Event<'a>) -> Option<Action> {
        let record = match *event {
            Event::Iteration {
                variant,
                iter,
                unknowns,
                step,
                residual,
            } => Record::Iteration {
                variant,
                iter,
                unknowns: unknowns.to_vec(),
                step,
                residual,
            },
            Event::BranchChanged {
                member,
                iter,
                active,
            } => Record::BranchChanged {
                member,
                iter,
                active,
            },
        };
        self.records.push(record);
        None
    }
}

/// Allows `&mut Recorder` to be passed to solvers that take an observer by
/// value, so the history can be read after the solve completes.
impl<'a> Observer<Event<'a>, Action> for &mut Recorder {
    fn observe(&mut self, event: &Event<'a>) -> Option<Action> {
        (**self).observe(event)
    }
}
