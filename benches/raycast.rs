use autodrome::constants::{CONTROL_OUTPUTS, HIDDEN_NEURONS, RAY_COUNT, TRAFFIC_MAX_SPEED};
use autodrome::random::WyRng;
use autodrome::{Population, Road};
use criterion::Criterion;

fn traffic_heavy_population() -> Population {
    let mut rng = WyRng::seeded(0xca57);
    let layers = [RAY_COUNT, HIDDEN_NEURONS, CONTROL_OUTPUTS];
    let mut population =
        Population::new(Road::new(100., 180.), 100, 1, 100., &layers, &mut rng).unwrap();
    for i in 0..20 {
        population.push_traffic(i % 3, -100. * (i as f64 + 1.), TRAFFIC_MAX_SPEED);
    }
    population
}

fn bench_raycast(bench: &mut Criterion) {
    let mut population = traffic_heavy_population();
    bench.bench_function("population-tick", |b| b.iter(|| population.tick()));
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(100)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_raycast(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
