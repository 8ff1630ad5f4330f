use crate::composite::Member;

/// Index of the shared series stress in every unknown vector.
pub const STRESS: usize = 0;

/// Composition facts derived once when a [`Series`](crate::Series) is built.
///
/// Solvers dispatch on these fields alone; no values are inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    parallel: Vec<bool>,
    plastic: Vec<bool>,
    volumetric: Vec<bool>,
    layout: Layout,
}

impl Metadata {
    pub(crate) fn new(members: &[Member]) -> Self {
        let parallel = members
            .iter()
            .map(|m| matches!(m, Member::Parallel(_)))
            .collect();
        let plastic = members
            .iter()
            .map(|m| match m {
                Member::Element(e) => e.as_plastic().is_some(),
                Member::Parallel(p) => p.plastic_index().is_some(),
            })
            .collect();
        let volumetric = members
            .iter()
            .map(|m| match m {
                Member::Element(e) => e.is_volumetric(),
                Member::Parallel(p) => p.elements().iter().any(|e| e.is_volumetric()),
            })
            .collect();

        Self {
            parallel,
            plastic,
            volumetric,
            layout: Layout::new(members),
        }
    }

    /// Number of series members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parallel.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parallel.is_empty()
    }

    /// Number of members that are parallel groups.
    #[must_use]
    pub fn n_parallel(&self) -> usize {
        self.parallel.iter().filter(|&&p| p).count()
    }

    /// Number of members that are plastic or contain a plastic element.
    #[must_use]
    pub fn n_plastic(&self) -> usize {
        self.plastic.iter().filter(|&&p| p).count()
    }

    #[must_use]
    pub fn has_parallel(&self) -> bool {
        self.parallel.contains(&true)
    }

    #[must_use]
    pub fn has_plastic(&self) -> bool {
        self.plastic.contains(&true)
    }

    /// Per-slot flags marking parallel groups.
    #[must_use]
    pub fn parallel(&self) -> &[bool] {
        &self.parallel
    }

    /// Per-slot flags marking plastic members, including groups with a plastic element.
    #[must_use]
    pub fn plastic(&self) -> &[bool] {
        &self.plastic
    }

    /// Per-slot flags marking members with a volumetric component.
    #[must_use]
    pub fn volumetric(&self) -> &[bool] {
        &self.volumetric
    }

    /// Unknown-vector layout for the block solvers.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

/// Unknown vector slot of a parallel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSlot {
    /// Position of the group among the series members.
    pub member: usize,
    /// Index of the group's shared strain rate in the unknown vector.
    pub strain_rate: usize,
}

/// Unknown vector slots of a plastic element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlasticSlot {
    /// Position of the element, or of its parallel group, among the series members.
    pub member: usize,
    /// Position of the element inside its parallel group, if it sits in one.
    pub in_group: Option<usize>,
    /// Index of the plastic multiplier in the unknown vector.
    pub multiplier: usize,
    /// Index of the element's own stress, present only inside a parallel group.
    pub stress: Option<usize>,
}

/// Positions of every unknown the block solvers iterate on.
///
/// The vector is `[τ, ε_group…, (λ, τ_local?)…]`: the shared series stress at
/// [`STRESS`], one strain rate per parallel group in member order, then one
/// multiplier per plastic element followed by its local stress when the
/// element sits inside a parallel group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    len: usize,
    groups: Vec<GroupSlot>,
    plastics: Vec<PlasticSlot>,
}

impl Layout {
    fn new(members: &[Member]) -> Self {
        let mut next = STRESS + 1;
        let mut groups = Vec::new();
        for (member, m) in members.iter().enumerate() {
            if let Member::Parallel(_) = m {
                groups.push(GroupSlot {
                    member,
                    strain_rate: next,
                });
                next += 1;
            }
        }

        let mut plastics = Vec::new();
        for (member, m) in members.iter().enumerate() {
            match m {
                Member::Element(e) if e.as_plastic().is_some() => {
                    plastics.push(PlasticSlot {
                        member,
                        in_group: None,
                        multiplier: next,
                        stress: None,
                    });
                    next += 1;
                }
                Member::Parallel(p) => {
                    if let Some(index) = p.plastic_index() {
                        plastics.push(PlasticSlot {
                            member,
                            in_group: Some(index),
                            multiplier: next,
                            stress: Some(next + 1),
                        });
                        next += 2;
                    }
                }
                Member::Element(_) => {}
            }
        }

        Self {
            len: next,
            groups,
            plastics,
        }
    }

    /// Total number of unknowns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: the series stress is always an unknown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn groups(&self) -> &[GroupSlot] {
        &self.groups
    }

    #[must_use]
    pub fn plastics(&self) -> &[PlasticSlot] {
        &self.plastics
    }

    /// Returns the group slot of series member `member`, if it is a parallel group.
    #[must_use]
    pub fn group(&self, member: usize) -> Option<&GroupSlot> {
        self.groups.iter().find(|g| g.member == member)
    }

    /// Returns the plastic slot belonging to series member `member`, if any.
    #[must_use]
    pub fn plastic(&self, member: usize) -> Option<&PlasticSlot> {
        self.plastics.iter().find(|p| p.member == member)
    }
}
