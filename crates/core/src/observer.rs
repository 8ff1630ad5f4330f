/// Watches a Newton iteration and may steer it.
///
/// Solvers hand every event to the observer, and a returned `Some(action)`
/// asks the solver to act on it, for example to stop with the current
/// iterate. Returning `None` leaves the iteration untouched. This is the only
/// diagnostic channel the solvers have; printing progress is an observer too.
///
/// Any `FnMut(&E) -> Option<A>` closure is an observer, and `()` observes
/// nothing.
pub trait Observer<E, A> {
    /// Receives one event and returns the action to take, if any.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive<O: Observer<usize, &'static str>>(mut observer: O, events: usize) -> Option<usize> {
        (1..=events).find(|iter| observer.observe(iter).is_some())
    }

    #[test]
    fn closures_can_stop_an_iteration() {
        let mut seen = Vec::new();
        let stopped = drive(
            |iter: &usize| {
                seen.push(*iter);
                (*iter == 3).then_some("stop")
            },
            10,
        );

        assert_eq!(stopped, Some(3));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn unit_observes_nothing() {
        assert_eq!(drive((), 10), None);
    }
}
