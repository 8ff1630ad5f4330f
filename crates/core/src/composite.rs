use thiserror::Error;

use crate::{Element, Metadata};

/// Errors raised while building a composition.
///
/// A composition that builds successfully is always solvable in shape; these
/// errors never reach a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("composition has no members")]
    Empty,

    #[error("parallel group {group} has no members")]
    EmptyParallel { group: usize },

    #[error("parallel group {group} contains another parallel group")]
    NestedParallel { group: usize },

    #[error("parallel group {group} contains a series composite")]
    SeriesInParallel { group: usize },

    #[error("parallel group {group} has more than one plastic element")]
    MultiplePlasticInParallel { group: usize },

    #[error("parallel group {group} has only plastic elements")]
    PlasticOnlyParallel { group: usize },
}

/// A group of elements sharing a common strain rate; stresses add.
#[derive(Debug)]
pub struct Parallel {
    elements: Vec<Box<dyn Element>>,
    plastic: Option<usize>,
}

impl Parallel {
    /// Builds a parallel group.
    ///
    /// # Errors
    ///
    /// Fails if the group is empty, holds more than one plastic element,
    /// or holds nothing but a plastic element.
    pub fn new(elements: Vec<Box<dyn Element>>) -> Result<Self, CompositionError> {
        Self::build(elements, 0)
    }

    fn build(elements: Vec<Box<dyn Element>>, group: usize) -> Result<Self, CompositionError> {
        if elements.is_empty() {
            return Err(CompositionError::EmptyParallel { group });
        }

        let mut plastic = None;
        for (i, element) in elements.iter().enumerate() {
            if element.as_plastic().is_some() {
                if plastic.is_some() {
                    return Err(CompositionError::MultiplePlasticInParallel { group });
                }
                plastic = Some(i);
            }
        }
        if plastic.is_some() && elements.len() == 1 {
            return Err(CompositionError::PlasticOnlyParallel { group });
        }

        Ok(Self { elements, plastic })
    }

    #[must_use]
    pub fn elements(&self) -> &[Box<dyn Element>] {
        &self.elements
    }

    /// Position of the plastic element inside the group, if any.
    #[must_use]
    pub fn plastic_index(&self) -> Option<usize> {
        self.plastic
    }

    /// Iterates over the non-plastic members of the group.
    pub fn nonplastic(&self) -> impl Iterator<Item = &dyn Element> {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != self.plastic)
            .map(|(_, e)| e.as_ref())
    }
}

/// A member of a series composite.
#[derive(Debug)]
pub enum Member {
    Element(Box<dyn Element>),
    Parallel(Parallel),
}

impl Member {
    /// Wraps an elementary law.
    pub fn element(element: impl Element + 'static) -> Self {
        Self::Element(Box::new(element))
    }
}

impl From<Parallel> for Member {
    fn from(group: Parallel) -> Self {
        Self::Parallel(group)
    }
}

/// The top-level composite: members share a common stress; strain rates add.
///
/// Members are plain elements or [`Parallel`] groups. The [`Metadata`] is
/// computed once here and never changes, so a built composite can be shared
/// read-only across threads and solved concurrently.
#[derive(Debug)]
pub struct Series {
    members: Vec<Member>,
    metadata: Metadata,
}

impl Series {
    /// Builds a series composite from its members.
    ///
    /// # Errors
    ///
    /// Fails if `members` is empty.
    pub fn new(members: Vec<Member>) -> Result<Self, CompositionError> {
        if members.is_empty() {
            return Err(CompositionError::Empty);
        }
        let metadata = Metadata::new(&members);
        Ok(Self { members, metadata })
    }

    /// Builds a series composite from a free-form [`Node`] tree.
    ///
    /// Series inside series are flattened. A top-level parallel node becomes
    /// a single-member series.
    ///
    /// # Errors
    ///
    /// Fails if a parallel node contains a parallel or series node, or if any
    /// group violates the rules of [`Parallel::new`].
    pub fn from_node(node: Node) -> Result<Self, CompositionError> {
        let mut members = Vec::new();
        let mut groups = 0;
        flatten(node, &mut members, &mut groups)?;
        Self::new(members)
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

fn flatten(
    node: Node,
    members: &mut Vec<Member>,
    groups: &mut usize,
) -> Result<(), CompositionError> {
    match node {
        Node::Element(element) => members.push(Member::Element(element)),
        Node::Series(children) => {
            for child in children {
                flatten(child, members, groups)?;
            }
        }
        Node::Parallel(children) => {
            let group = *groups;
            *groups += 1;
            let elements = children
                .into_iter()
                .map(|child| match child {
                    Node::Element(element) => Ok(element),
                    Node::Parallel(_) => Err(CompositionError::NestedParallel { group }),
                    Node::Series(_) => Err(CompositionError::SeriesInParallel { group }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            members.push(Member::Parallel(Parallel::build(elements, group)?));
        }
    }
    Ok(())
}

/// A free-form composition tree, validated by [`Series::from_node`].
#[derive(Debug)]
pub enum Node {
    Element(Box<dyn Element>),
    Series(Vec<Node>),
    Parallel(Vec<Node>),
}

impl Node {
    /// Wraps an elementary law.
    pub fn element(element: impl Element + 'static) -> Self {
        Self::Element(Box::new(element))
    }
}
