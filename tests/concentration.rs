use dpmix::misc::SimpsonsRule;
use dpmix::sampler::GammaPriorConcentration;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use special::Gamma as _;

const N_ITEMS: usize = 100;
const N_CLUSTERS: usize = 1;

// ln p(α | k = 1, n = 100) up to a constant, under a Gamma(1, 1) prior
fn ln_posterior(alpha: f64) -> f64 {
    -alpha + (alpha + 1.0).ln_gamma().0
        - (alpha + N_ITEMS as f64).ln_gamma().0
}

fn posterior_moments() -> (f64, f64) {
    let quad = SimpsonsRule::new(0.0, 20.0, 4_000).unwrap();
    let ln_z = quad.log_integrate(ln_posterior);
    let mean = quad.integrate(|a| a * (ln_posterior(a) - ln_z).exp());
    let second = quad.integrate(|a| a * a * (ln_posterior(a) - ln_z).exp());
    (mean, second - mean * mean)
}

#[test]
fn chain_matches_exact_posterior_moments() {
    let mut rng = Xoshiro256Plus::seed_from_u64(0x00C0_FFEE);
    let sampler = GammaPriorConcentration::new(1.0, 1.0).unwrap();

    let n_burn = 1_000;
    let n_draws = 100_000;
    let mut alpha = 1.0;
    for _ in 0..n_burn {
        alpha = sampler.sample(alpha, N_CLUSTERS, N_ITEMS, &mut rng);
    }

    let draws: Vec<f64> = (0..n_draws)
        .map(|_| {
            alpha = sampler.sample(alpha, N_CLUSTERS, N_ITEMS, &mut rng);
            alpha
        })
        .collect();

    let n = n_draws as f64;
    let mean = draws.iter().sum::<f64>() / n;
    let var = draws.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;

    let (true_mean, true_var) = posterior_moments();
    assert!(true_mean > 0.0 && true_var > 0.0);
    assert::close(mean, true_mean, 0.05 * true_mean);
    assert::close(var, true_var, 0.1 * true_var);
}

#[test]
fn more_clusters_pull_alpha_up() {
    let mut rng = Xoshiro256Plus::seed_from_u64(17);
    let sampler = GammaPriorConcentration::new(1.0, 1.0).unwrap();

    let mean_for = |k: usize, rng: &mut Xoshiro256Plus| {
        let mut alpha = 1.0;
        let n = 20_000;
        (0..n)
            .map(|_| {
                alpha = sampler.sample(alpha, k, N_ITEMS, rng);
                alpha
            })
            .sum::<f64>()
            / n as f64
    };

    let few = mean_for(2, &mut rng);
    let many = mean_for(20, &mut rng);
    assert!(many > 3.0 * few);
}
