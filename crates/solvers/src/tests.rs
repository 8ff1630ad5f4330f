use approx::assert_relative_eq;
use rheo_core::{Args, Element, Member, Node, Parallel, Plastic, STRESS, Series};
use rheo_laws::{DruckerPrager, Elastic, LinearViscous, PowerLawViscous};
use uom::si::{
    angle::degree,
    dynamic_viscosity::pascal_second,
    f64::{Angle, DynamicViscosity, MolarEnergy, Pressure},
    molar_energy::joule_per_mole,
    pressure::pascal,
};

use super::{
    Action, Config, Derivatives, Error, Event, Stage, Status, Variant, block, block_plastic,
    numeric_plastic, parallel_stress, scalar, strain_rate, stress, stress_unobserved,
};

const YEAR: f64 = 365.25 * 24.0 * 3600.0;

fn viscous(eta: f64) -> LinearViscous {
    LinearViscous::new(DynamicViscosity::new::<pascal_second>(eta))
}

fn dislocation() -> PowerLawViscous {
    PowerLawViscous::new(1.67e-24, 3.3, MolarEnergy::new::<joule_per_mole>(187e3))
}

fn elastic(shear_modulus: f64) -> Elastic {
    Elastic::new(Pressure::new::<pascal>(shear_modulus))
}

fn yielding(cohesion: f64) -> DruckerPrager {
    DruckerPrager::new(
        Pressure::new::<pascal>(cohesion),
        Angle::new::<degree>(0.0),
    )
}

fn boxed(element: impl Element + 'static) -> Box<dyn Element> {
    Box::new(element)
}

fn mantle_args() -> Args {
    Args::new().with_temperature(773.15).with_dt(1e3 * YEAR)
}

/// Power-law creep in series with elasticity over a thousand-year step.
fn maxwell() -> Series {
    Series::new(vec![
        Member::element(dislocation()),
        Member::element(elastic(1e11)),
    ])
    .expect("valid composition")
}

/// A viscous dashpot in series with a viscous/plastic parallel pair.
fn damper_with_yielding_group(cohesion: f64) -> Series {
    let group = Parallel::new(vec![boxed(viscous(1e20)), boxed(yielding(cohesion))])
        .expect("valid group");
    Series::new(vec![Member::element(viscous(1e21)), group.into()]).expect("valid composition")
}

#[test]
fn maxwell_body_converges_quickly() {
    let series = maxwell();
    let args = mantle_args();
    let target = 1e-14;

    let solution = stress_unobserved(&series, target, &args, &Config::default())
        .expect("should converge");

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.variant, Variant::Scalar);
    assert!(solution.iters < 10, "took {} iterations", solution.iters);

    let creep = dislocation().strain_rate(solution.stress, &args).expect("evaluates");
    let relax = elastic(1e11).strain_rate(solution.stress, &args).expect("evaluates");
    assert_relative_eq!(creep + relax, target, max_relative = 1e-6);
    assert!(solution.stress > 1e6 && solution.stress < 1e8);
}

#[test]
fn analytic_and_numeric_derivatives_agree() {
    let series = maxwell();
    let args = mantle_args();

    let analytic = Config {
        derivatives: Derivatives::Analytic,
        ..Config::default()
    };
    let numeric = Config {
        derivatives: Derivatives::Numeric,
        ..Config::default()
    };

    let a = stress_unobserved(&series, 1e-14, &args, &analytic).expect("should converge");
    let n = stress_unobserved(&series, 1e-14, &args, &numeric).expect("should converge");
    assert_relative_eq!(a.stress, n.stress, max_relative = 1e-6);
}

#[test]
fn series_round_trip() {
    let series = maxwell();
    let args = mantle_args();
    let config = Config::default();

    for target in [1e-16, 1e-15, 1e-14, 1e-13, 1e-12] {
        let solution = stress_unobserved(&series, target, &args, &config).expect("should converge");
        let back = strain_rate(&series, solution.stress, &args, &config).expect("evaluates");
        assert_relative_eq!(back, target, max_relative = 1e-6);
    }
}

#[test]
fn converged_seed_finishes_in_one_iteration() {
    let series = maxwell();
    let args = mantle_args();
    let first = stress_unobserved(&series, 1e-14, &args, &Config::default())
        .expect("should converge");

    let reseeded = Config {
        initial_stress: Some(first.stress),
        ..Config::default()
    };
    let second = stress_unobserved(&series, 1e-14, &args, &reseeded).expect("should converge");
    assert_eq!(second.iters, 1);
    assert_relative_eq!(second.stress, first.stress, max_relative = 1e-6);
}

#[test]
fn parallel_pair_stress_is_closed_form() {
    let (eta1, eta2, rate) = (1e20, 3e21, 2.5e-15);
    let group = Parallel::new(vec![boxed(viscous(eta1)), boxed(viscous(eta2))])
        .expect("valid group");

    let sigma = parallel_stress(&group, rate, &Args::new()).expect("evaluates");
    assert_relative_eq!(sigma, 2.0 * rate * (eta1 + eta2), max_relative = 1e-15);

    let series = Series::new(vec![group.into()]).expect("valid composition");
    let solution = stress_unobserved(&series, rate, &Args::new(), &Config::default())
        .expect("should converge");
    assert_eq!(solution.variant, Variant::Block);
    assert_relative_eq!(solution.stress, 2.0 * rate * (eta1 + eta2), max_relative = 1e-9);
    assert_relative_eq!(
        solution
            .group_strain_rate(series.metadata().layout(), 0)
            .expect("group slot"),
        rate,
        max_relative = 1e-9
    );
}

#[test]
fn block_partitions_strain_rate() {
    let node = Node::Series(vec![
        Node::element(viscous(1e21)),
        Node::Parallel(vec![Node::element(viscous(1e20)), Node::element(viscous(4e20))]),
        Node::Parallel(vec![Node::element(dislocation()), Node::element(viscous(1e22))]),
    ]);
    let series = Series::from_node(node).expect("valid tree");
    let args = mantle_args();
    let target = 1e-14;

    let solution = stress_unobserved(&series, target, &args, &Config::default())
        .expect("should converge");
    assert_eq!(solution.variant, Variant::Block);

    let layout = series.metadata().layout();
    let first = solution.group_strain_rate(layout, 1).expect("group slot");
    let second = solution.group_strain_rate(layout, 2).expect("group slot");
    let dashpot = solution.stress / 2e21;
    assert_relative_eq!(dashpot + first + second, target, max_relative = 1e-6);
    assert_relative_eq!(first, solution.stress / 1e21, max_relative = 1e-6);
    assert!(solution.group_strain_rate(layout, 0).is_none());
}

#[test]
fn block_reseeded_with_converged_stress_finishes_in_one_iteration() {
    let series = damper_with_yielding_group(1e30);
    let first = block::solve_unobserved(&series, 1e-14, &Args::new(), &Config::default());
    assert!(matches!(first, Err(Error::Unsupported { .. })));

    let node = Node::Series(vec![
        Node::element(viscous(1e21)),
        Node::Parallel(vec![Node::element(dislocation()), Node::element(viscous(1e22))]),
    ]);
    let series = Series::from_node(node).expect("valid tree");
    let args = mantle_args();
    let first =
        block::solve_unobserved(&series, 1e-14, &args, &Config::default()).expect("converges");

    let reseeded = Config {
        initial_stress: Some(first.stress),
        ..Config::default()
    };
    let second = block::solve_unobserved(&series, 1e-14, &args, &reseeded).expect("converges");
    assert_eq!(second.iters, 1);
}

#[test]
fn yielding_group_activates_plasticity() {
    let series = damper_with_yielding_group(1e6);
    let target = 1e-14;

    let solution = stress_unobserved(&series, target, &Args::new(), &Config::default())
        .expect("should converge");
    assert_eq!(solution.variant, Variant::BlockPlastic);
    assert_eq!(solution.status, Status::Converged);

    // τ/2η₀ + (τ − C)/2η₁ = ε
    let expected = (target + 1e6 / 2e20) / (1.0 / 2e21 + 1.0 / 2e20);
    assert_relative_eq!(solution.stress, expected, max_relative = 1e-9);

    let layout = series.metadata().layout();
    let multiplier = solution.multiplier(layout, 1).expect("plastic slot");
    let local = solution.plastic_stress(layout, 1).expect("plastic slot");
    assert!(multiplier > 0.0);
    assert_relative_eq!(multiplier, (expected - 1e6) / 2e20, max_relative = 1e-9);
    assert_relative_eq!(
        solution.group_strain_rate(layout, 1).expect("group slot"),
        multiplier,
        max_relative = 1e-9
    );

    let law = yielding(1e6);
    let yield_value = law
        .yield_function(local, multiplier, &Args::new())
        .expect("evaluates");
    assert!(yield_value.abs() <= 1e-6 * 1e6, "F = {yield_value}");
}

#[test]
fn rigid_group_carries_no_strain_rate() {
    let series = damper_with_yielding_group(1e9);
    let solution = stress_unobserved(&series, 1e-14, &Args::new(), &Config::default())
        .expect("should converge");

    let layout = series.metadata().layout();
    assert_relative_eq!(solution.stress, 2e7, max_relative = 1e-12);
    assert_eq!(solution.group_strain_rate(layout, 1), Some(0.0));
    assert_eq!(solution.multiplier(layout, 1), Some(0.0));
    assert_relative_eq!(
        solution.plastic_stress(layout, 1).expect("plastic slot"),
        solution.stress,
        max_relative = 1e-12
    );
}

#[test]
fn inactive_series_plastic_has_zero_multiplier() {
    let series = Series::new(vec![
        Member::element(viscous(1e21)),
        Member::element(yielding(1e8)),
    ])
    .expect("valid composition");

    let solution = stress_unobserved(&series, 1e-14, &Args::new(), &Config::default())
        .expect("should converge");
    let layout = series.metadata().layout();
    assert_eq!(solution.multiplier(layout, 1), Some(0.0));
    assert_relative_eq!(solution.stress, 2e7, max_relative = 1e-12);
    assert_eq!(solution.plastic_stress(layout, 1), Some(solution.stress));
}

#[test]
fn activation_is_reported_to_the_observer() {
    let series = Series::new(vec![
        Member::element(viscous(1e21)),
        Member::element(yielding(1e6)),
    ])
    .expect("valid composition");
    let config = Config {
        initial_stress: Some(1e5),
        ..Config::default()
    };

    let mut switches = Vec::new();
    let mut iterations = 0;
    let observer = |event: &Event<'_>| -> Option<Action> {
        match event {
            Event::BranchChanged { member, active, .. } => switches.push((*member, *active)),
            Event::Iteration { .. } => iterations += 1,
        }
        None
    };
    let solution = block_plastic::solve(&series, 1e-14, &Args::new(), &config, observer)
        .expect("should converge");

    assert_eq!(switches, vec![(1, true)]);
    assert_eq!(iterations, solution.iters);
    assert_relative_eq!(solution.stress, 1e6, max_relative = 1e-9);
    assert_relative_eq!(
        solution
            .multiplier(series.metadata().layout(), 1)
            .expect("plastic slot"),
        1e-14 - 1e6 / 2e21,
        max_relative = 1e-9
    );
}

#[test]
fn branch_oscillation_is_reported() {
    let series = Series::new(vec![
        Member::element(viscous(1e21)),
        Member::element(yielding(1e6)),
    ])
    .expect("valid composition");
    let config = Config {
        initial_stress: Some(1e5),
        max_branch_switches: 0,
        ..Config::default()
    };

    let error = block_plastic::solve_unobserved(&series, 1e-14, &Args::new(), &config).unwrap_err();
    assert!(matches!(
        error,
        Error::BranchOscillation {
            member: 1,
            switches: 1
        }
    ));
}

#[test]
fn numeric_path_solves_a_bingham_body() {
    let series = Series::new(vec![
        Member::element(viscous(1e21)),
        Member::element(yielding(1e6)),
    ])
    .expect("valid composition");
    let config = Config {
        derivatives: Derivatives::Numeric,
        ..Config::default()
    };

    let solution = stress_unobserved(&series, 1e-14, &Args::new(), &config).expect("converges");
    assert_eq!(solution.variant, Variant::NumericPlastic);
    assert!(solution.iters <= 3, "took {} iterations", solution.iters);
    assert_relative_eq!(solution.stress, 1e6, max_relative = 1e-9);
    assert_relative_eq!(
        solution
            .multiplier(series.metadata().layout(), 1)
            .expect("plastic slot"),
        1e-14 - 1e6 / 2e21,
        max_relative = 1e-6
    );
}

#[test]
fn numeric_and_block_plastic_agree() {
    let series = Series::new(vec![
        Member::element(dislocation()),
        Member::element(elastic(1e11)),
        Member::element(yielding(3e6)),
    ])
    .expect("valid composition");
    let args = mantle_args();

    let numeric = Config {
        derivatives: Derivatives::Numeric,
        ..Config::default()
    };
    let by_numeric = numeric_plastic::solve_unobserved(&series, 1e-14, &args, &numeric)
        .expect("converges");
    let by_block = block_plastic::solve_unobserved(&series, 1e-14, &args, &Config::default())
        .expect("converges");

    assert!(by_numeric.iters <= numeric.numeric_plastic_max_iters);
    assert_relative_eq!(by_numeric.stress, 3e6, max_relative = 1e-6);
    assert_relative_eq!(by_block.stress, 3e6, max_relative = 1e-6);

    let layout = series.metadata().layout();
    assert_relative_eq!(
        by_numeric.multiplier(layout, 2).expect("plastic slot"),
        by_block.multiplier(layout, 2).expect("plastic slot"),
        max_relative = 1e-5
    );
}

#[test]
fn numeric_path_uses_the_last_plastic_member() {
    let series = Series::new(vec![
        Member::element(yielding(1e6)),
        Member::element(viscous(1e21)),
        Member::element(yielding(2e6)),
    ])
    .expect("valid composition");
    let config = Config {
        derivatives: Derivatives::Numeric,
        ..Config::default()
    };

    // Two plastic members are dispatched to the block solver.
    assert_eq!(
        Variant::select(series.metadata(), config.derivatives),
        Variant::BlockPlastic
    );

    let solution = numeric_plastic::solve_unobserved(&series, 1e-14, &Args::new(), &config)
        .expect("converges");
    assert_relative_eq!(solution.stress, 2e6, max_relative = 1e-9);
    assert_eq!(solution.multiplier(series.metadata().layout(), 0), Some(0.0));
}

#[test]
fn numeric_path_rejects_parallel_groups() {
    let series = damper_with_yielding_group(1e6);
    let error = numeric_plastic::solve_unobserved(&series, 1e-14, &Args::new(), &Config::default())
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Unsupported {
            stage: Stage::Outer(Variant::NumericPlastic),
            ..
        }
    ));
}

#[test]
fn dispatch_follows_metadata() {
    let scalar = maxwell();
    let block = Series::new(vec![
        Parallel::new(vec![boxed(viscous(1e20))])
            .expect("valid group")
            .into(),
    ])
    .expect("valid composition");
    let single_plastic = Series::new(vec![
        Member::element(viscous(1e21)),
        Member::element(yielding(1e6)),
    ])
    .expect("valid composition");
    let grouped_plastic = damper_with_yielding_group(1e6);

    let select = |series: &Series, mode| Variant::select(series.metadata(), mode);
    for mode in [Derivatives::Analytic, Derivatives::Auto, Derivatives::Numeric] {
        assert_eq!(select(&scalar, mode), Variant::Scalar);
        assert_eq!(select(&block, mode), Variant::Block);
        assert_eq!(select(&grouped_plastic, mode), Variant::BlockPlastic);
    }
    assert_eq!(select(&single_plastic, Derivatives::Auto), Variant::BlockPlastic);
    assert_eq!(
        select(&single_plastic, Derivatives::Numeric),
        Variant::NumericPlastic
    );
}

#[test]
fn zero_strain_rate_gives_zero_stress() {
    let series = Series::new(vec![
        Member::element(viscous(1e21)),
        Member::element(viscous(1e20)),
    ])
    .expect("valid composition");

    let solution = stress_unobserved(&series, 0.0, &Args::new(), &Config::default())
        .expect("trivially converges");
    assert_eq!(solution.stress, 0.0);
    assert_eq!(solution.iters, 1);
    assert!(matches!(solution.viscosity(), Err(Error::ZeroStrainRate)));
}

#[test]
fn zero_strain_rate_gives_zero_stress_with_groups() {
    let creeping = Parallel::new(vec![boxed(dislocation()), boxed(viscous(1e22))])
        .expect("valid group");
    let series = Series::new(vec![Member::element(viscous(1e21)), creeping.into()])
        .expect("valid composition");

    let solution = stress_unobserved(&series, 0.0, &mantle_args(), &Config::default())
        .expect("seed is already the root");
    assert_eq!(solution.variant, Variant::Block);
    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.stress, 0.0);
    assert_eq!(solution.iters, 1);

    let yielding_group = Parallel::new(vec![boxed(dislocation()), boxed(yielding(1e6))])
        .expect("valid group");
    let series = Series::new(vec![Member::element(viscous(1e21)), yielding_group.into()])
        .expect("valid composition");

    let solution = stress_unobserved(&series, 0.0, &mantle_args(), &Config::default())
        .expect("seed is already the root");
    assert_eq!(solution.variant, Variant::BlockPlastic);
    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.stress, 0.0);
    assert_eq!(solution.iters, 1);
}

#[test]
fn viscosity_of_a_converged_state() {
    let series = Series::new(vec![
        Member::element(viscous(1e21)),
        Member::element(viscous(1e21)),
    ])
    .expect("valid composition");

    let solution = stress_unobserved(&series, 1e-14, &Args::new(), &Config::default())
        .expect("should converge");
    assert_relative_eq!(solution.viscosity().expect("nonzero"), 5e20, max_relative = 1e-9);
}

#[test]
fn observer_can_stop_early() {
    let series = maxwell();
    let args = mantle_args();

    let stop_at_second = |event: &Event<'_>| -> Option<Action> {
        (event.iter() == 2).then_some(Action::StopEarly)
    };
    let solution =
        stress(&series, 1e-14, &args, &Config::default(), stop_at_second).expect("stops cleanly");

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.iters, 2);
    assert_eq!(solution.unknowns[STRESS], solution.stress);
}

#[test]
fn iteration_cap_is_reported() {
    let series = maxwell();
    let config = Config {
        max_iters: 1,
        initial_stress: Some(1e3),
        ..Config::default()
    };

    let error = scalar::solve_unobserved(&series, 1e-14, &mantle_args(), &config).unwrap_err();
    assert!(matches!(
        error,
        Error::NonConvergence {
            stage: Stage::Outer(Variant::Scalar),
            iters: 1,
            ..
        }
    ));
}

#[test]
fn missing_arguments_surface_as_element_errors() {
    let error =
        stress_unobserved(&maxwell(), 1e-14, &Args::new(), &Config::default()).unwrap_err();
    assert!(matches!(error, Error::Element(_)));
}

#[test]
fn invalid_config_is_rejected() {
    let config = Config {
        block_max_iters: 0,
        ..Config::default()
    };
    let error = stress_unobserved(&maxwell(), 1e-14, &mantle_args(), &config).unwrap_err();
    assert!(matches!(error, Error::Config(_)));
}

#[test]
fn composites_solve_concurrently() {
    let series = damper_with_yielding_group(1e6);
    let config = Config::default();

    let stresses: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = [1e-15, 1e-14, 1e-13]
            .into_iter()
            .map(|target| {
                let series = &series;
                let config = &config;
                scope.spawn(move || {
                    stress_unobserved(series, target, &Args::new(), config)
                        .expect("should converge")
                        .stress
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("no panic"))
            .collect()
    });

    assert!(stresses.windows(2).all(|w| w[0] < w[1]));
}
