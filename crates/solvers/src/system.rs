//! Residual and Jacobian of the block solvers.
//!
//! Unknowns follow the composite's [`Layout`]. With `r` the residual vector,
//! each Newton step solves `J·Δ = −r` and updates `x ← x + Δ`.
//!
//! ```text
//! r₀   = Σ ε_e(τ) + Σ ε_g + Σ λ_p·∂Q/∂τ − ε_target   (series strain rate)
//! r_g  = Σ σ_np(ε_g) + τ_p − τ                        (group stress balance)
//! r_λ  = F(τ_local, λ)                                (active plastic)
//! r_s  = λ·∂Q/∂τ(τ_p) − ε_g                           (active, inside a group)
//! ```
//!
//! An inactive plastic slot pins `λ = 0`. Inside a group it also pins the
//! group strain rate to zero and lets the rigid plastic element carry
//! `τ − Σ σ_np(0)`.

use nalgebra::{DMatrix, DVector};
use rheo_core::{Args, Layout, Member, Parallel, Plastic, PlasticSlot, STRESS, Series};

use crate::{Config, Error, Variant, eval, group, guess, return_map, series};

pub(crate) struct System<'a> {
    series: &'a Series,
    args: &'a Args,
    config: &'a Config,
    target: f64,
    variant: Variant,
    jacobian: DMatrix<f64>,
    residual: DVector<f64>,
}

impl<'a> System<'a> {
    pub(crate) fn new(
        series: &'a Series,
        target: f64,
        args: &'a Args,
        config: &'a Config,
        variant: Variant,
    ) -> Self {
        let n = series.metadata().layout().len();
        Self {
            series,
            args,
            config,
            target,
            variant,
            jacobian: DMatrix::zeros(n, n),
            residual: DVector::zeros(n),
        }
    }

    fn layout(&self) -> &'a Layout {
        self.series.metadata().layout()
    }

    /// Initial unknowns and active flags.
    ///
    /// The stress comes from the config or the harmonic estimate; every group
    /// starts from its own inner solve at that stress, and every series
    /// plastic element from a return mapping against the plain members.
    pub(crate) fn seed(&self) -> Result<(Vec<f64>, Vec<bool>), Error> {
        let layout = self.layout();
        let stress = match self.config.initial_stress {
            Some(stress) => stress,
            None => guess::harmonic_stress(self.series, self.target, self.args)?,
        };

        let mut x = vec![0.0; layout.len()];
        let mut active = vec![false; layout.plastics().len()];
        x[STRESS] = stress;

        for slot in layout.groups() {
            let group = self.group(slot.member)?;
            let state = group::solve(group, stress, self.args, self.config)?;
            x[slot.strain_rate] = state.strain_rate;
            if let Some(k) = plastic_position(layout, slot.member) {
                let plastic = &layout.plastics()[k];
                x[plastic.multiplier] = state.multiplier;
                if let Some(s) = plastic.stress {
                    x[s] = state.plastic_stress;
                }
                active[k] = state.active;
            }
        }

        for (k, slot) in layout.plastics().iter().enumerate() {
            if slot.in_group.is_some() {
                continue;
            }
            let plastic = self.plastic(slot)?;
            if plastic.yield_function(stress, 0.0, self.args)? <= 0.0 {
                continue;
            }
            active[k] = true;
            let viscosity = series::tangent_viscosity(self.series, stress, self.args, self.config)?;
            if viscosity.is_finite() {
                let args = self.args.with_effective_viscosity(viscosity);
                let mapped = return_map(plastic, stress, viscosity, &args, self.config)?;
                x[slot.multiplier] = mapped.multiplier;
            }
        }

        Ok((x, active))
    }

    /// Fills the residual and Jacobian at `x` for the given active set.
    pub(crate) fn assemble(&mut self, x: &[f64], active: &[bool]) -> Result<(), Error> {
        self.jacobian.fill(0.0);
        self.residual.fill(0.0);

        let layout = self.layout();
        let mode = self.config.derivatives;
        let args = self.args;
        let stress = x[STRESS];

        self.residual[STRESS] = -self.target;
        for element in eval::plain_elements(self.series) {
            self.residual[STRESS] += element.strain_rate(stress, args)?;
            self.jacobian[(STRESS, STRESS)] +=
                eval::dstrain_rate_dstress(element, stress, args, mode)?;
        }

        for slot in layout.groups() {
            let g = slot.strain_rate;
            let rate = x[g];
            let (carried, stiffness) =
                eval::nonplastic_group(self.group(slot.member)?, rate, args, mode)?;

            self.residual[STRESS] += rate;
            self.jacobian[(STRESS, g)] = 1.0;

            let pinned = plastic_position(layout, slot.member).is_some_and(|k| !active[k]);
            if pinned {
                self.residual[g] = rate;
                self.jacobian[(g, g)] = 1.0;
            } else {
                self.residual[g] = carried - stress;
                self.jacobian[(g, g)] = stiffness;
                self.jacobian[(g, STRESS)] = -1.0;
            }
        }

        for (k, slot) in layout.plastics().iter().enumerate() {
            let plastic = self.plastic(slot)?;
            let l = slot.multiplier;
            let multiplier = x[l];

            match (slot.stress, active[k]) {
                (None, true) => {
                    let dq = plastic.dq_dstress(stress, args)?;
                    self.residual[STRESS] += multiplier * dq;
                    self.jacobian[(STRESS, l)] = dq;
                    self.residual[l] = plastic.yield_function(stress, multiplier, args)?;
                    self.jacobian[(l, STRESS)] = plastic.df_dstress(stress, args)?;
                    self.jacobian[(l, l)] = plastic.df_dmultiplier(stress, args)?;
                }
                (None, false) => {
                    self.residual[l] = multiplier;
                    self.jacobian[(l, l)] = 1.0;
                }
                (Some(s), true) => {
                    let g = self.group_index(slot)?;
                    let local = x[s];
                    let dq = plastic.dq_dstress(local, args)?;

                    self.residual[g] += local;
                    self.jacobian[(g, s)] = 1.0;

                    self.residual[l] = plastic.yield_function(local, multiplier, args)?;
                    self.jacobian[(l, s)] = plastic.df_dstress(local, args)?;
                    self.jacobian[(l, l)] = plastic.df_dmultiplier(local, args)?;

                    self.residual[s] = multiplier * dq - x[g];
                    self.jacobian[(s, l)] = dq;
                    self.jacobian[(s, g)] = -1.0;
                }
                (Some(s), false) => {
                    // The group strain rate is pinned, so its coupling into
                    // this row is left out of the Jacobian.
                    let g = self.group_index(slot)?;
                    let (carried, _) =
                        eval::nonplastic_group(self.group(slot.member)?, x[g], args, mode)?;

                    self.residual[l] = multiplier;
                    self.jacobian[(l, l)] = 1.0;

                    self.residual[s] = x[s] - stress + carried;
                    self.jacobian[(s, s)] = 1.0;
                    self.jacobian[(s, STRESS)] = -1.0;
                }
            }
        }

        Ok(())
    }

    /// Euclidean norm of the last assembled residual.
    pub(crate) fn residual_norm(&self) -> f64 {
        self.residual.norm()
    }

    /// Solves `J·Δ = −r` for the last assembled system.
    ///
    /// An exactly zero residual is already a root and gives a zero step
    /// without factoring `J`, which may hold infinite stiffnesses there.
    pub(crate) fn newton_step(&self, iter: usize) -> Result<DVector<f64>, Error> {
        if self.residual.iter().all(|r| *r == 0.0) {
            return Ok(DVector::zeros(self.residual.len()));
        }
        let delta = self
            .jacobian
            .clone()
            .lu()
            .solve(&(-&self.residual))
            .ok_or(Error::SingularJacobian {
                stage: self.variant.into(),
                iter,
            })?;
        if delta.iter().all(|d| d.is_finite()) {
            Ok(delta)
        } else {
            Err(Error::NonFinite {
                stage: self.variant.into(),
                iter,
            })
        }
    }

    /// Yield value of slot `k` at zero multiplier, evaluated at its local stress.
    pub(crate) fn trial_yield(&self, slot: &PlasticSlot, x: &[f64]) -> Result<f64, Error> {
        let local = x[slot.stress.unwrap_or(STRESS)];
        Ok(self.plastic(slot)?.yield_function(local, 0.0, self.args)?)
    }

    /// Stress a rigid plastic element carries inside its group.
    pub(crate) fn rigid_stress(&self, slot: &PlasticSlot, stress: f64) -> Result<f64, Error> {
        let group = self.group(slot.member)?;
        let (carried, _) = eval::nonplastic_group(group, 0.0, self.args, self.config.derivatives)?;
        Ok(stress - carried)
    }

    pub(crate) fn group_index(&self, slot: &PlasticSlot) -> Result<usize, Error> {
        self.layout()
            .group(slot.member)
            .map(|g| g.strain_rate)
            .ok_or(self.mismatch())
    }

    fn group(&self, member: usize) -> Result<&'a Parallel, Error> {
        match self.series.members().get(member) {
            Some(Member::Parallel(group)) => Ok(group),
            _ => Err(self.mismatch()),
        }
    }

    fn plastic(&self, slot: &PlasticSlot) -> Result<&'a dyn Plastic, Error> {
        let plastic = match (self.series.members().get(slot.member), slot.in_group) {
            (Some(Member::Element(e)), None) => e.as_plastic(),
            (Some(Member::Parallel(p)), Some(i)) => {
                p.elements().get(i).and_then(|e| e.as_plastic())
            }
            _ => None,
        };
        plastic.ok_or(self.mismatch())
    }

    fn mismatch(&self) -> Error {
        Error::Unsupported {
            stage: self.variant.into(),
            reason: "a layout that does not match its composition",
        }
    }
}

/// Position in [`Layout::plastics`] of the plastic element at series member `member`.
pub(crate) fn plastic_position(layout: &Layout, member: usize) -> Option<usize> {
    layout.plastics().iter().position(|p| p.member == member)
}

/// Relative step `Σ |Δxᵢ| / (|xᵢ| + guard)`, with `x` already updated.
pub(crate) fn step_norm(x: &[f64], delta: &[f64], guard: f64) -> f64 {
    x.iter()
        .zip(delta)
        .map(|(xi, di)| di.abs() / (xi.abs() + guard))
        .sum()
}
