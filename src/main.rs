use autodrome::constants::{
    CONTROL_OUTPUTS, HIDDEN_NEURONS, MUTATION_AMOUNT, RAY_COUNT, TRAFFIC_MAX_SPEED,
};
use autodrome::{Population, Road};
use rand::RngCore;
use std::error::Error;

const GENERATIONS: usize = 100;
const POPULATION: usize = 100;
const TICKS: usize = 1500;
const BRAIN_FILE: &str = "best_brain.json";

fn build(rng: &mut impl RngCore) -> Result<Population, Box<dyn Error>> {
    let road = Road::new(100., 180.);
    let mut population = Population::new(
        road,
        POPULATION,
        1,
        100.,
        &[RAY_COUNT, HIDDEN_NEURONS, CONTROL_OUTPUTS],
        rng,
    )?;
    for (lane, y) in [
        (1, -100.),
        (0, -300.),
        (2, -300.),
        (0, -500.),
        (1, -500.),
        (1, -700.),
        (2, -700.),
    ] {
        population.push_traffic(lane, y, TRAFFIC_MAX_SPEED);
    }
    Ok(population)
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut rng = autodrome::random::default_rng();

    for gen_idx in 0..GENERATIONS {
        let mut population = build(&mut rng)?;
        if std::path::Path::new(BRAIN_FILE).exists() {
            population.seed_from_file(BRAIN_FILE, MUTATION_AMOUNT, &mut rng)?;
        }

        for _ in 0..TICKS {
            population.tick()?;
        }

        let best = population.best();
        println!(
            "champ {gen_idx}: y = {:.1}{}",
            best.y,
            if best.damaged { " (crashed)" } else { "" }
        );
        population.save_best(BRAIN_FILE)?;
    }

    Ok(())
}
