//! Different partition kernels targeting the same posterior must agree on
//! how often each pair of items shares a cluster.
use dpmix::prelude::*;

const N_SWEEPS: usize = 6_000;
const BURN_IN: usize = 500;

fn data() -> Vec<BinomialDatum> {
    // deliberately ambiguous so co-clustering is not all zeros and ones
    [3, 5, 7, 9, 12, 14, 16]
        .iter()
        .map(|&x| BinomialDatum::new(x, 20))
        .collect()
}

fn co_clustering<Ps>(kernel: Ps, seed: u64) -> Vec<Vec<f64>>
where
    Ps: PartitionSampler<BinomialDatum, f64, Binomial, Beta>,
{
    let config = DpConfig::default()
        .with_seed(seed)
        .with_init(InitStrategy::Connected)
        .with_log_every(0);
    let mut rng = config.rng();
    let mut sampler = DirichletProcessSampler::new(
        Binomial,
        Beta::uniform(),
        kernel,
        ConjugateAtomSampler,
        config,
    )
    .unwrap();

    let mut trace = MemoryTrace::new();
    sampler.run(&data(), &mut trace, N_SWEEPS, &mut rng).unwrap();
    trace.co_clustering(BURN_IN)
}

fn max_abs_diff(a: &[Vec<f64>], b: &[Vec<f64>]) -> f64 {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[test]
fn marginal_and_auxiliary_gibbs_agree() {
    let marginal = co_clustering(MarginalGibbs, 1);
    let auxiliary = co_clustering(AuxiliaryGibbs::default(), 2);

    // neither is degenerate
    assert!(marginal[0][6] < 0.9);
    assert!(marginal[0][1] > 0.1);
    assert!(max_abs_diff(&marginal, &auxiliary) < 0.07);
}

#[test]
fn auxiliary_gibbs_agrees_with_itself_for_larger_m() {
    let m2 = co_clustering(AuxiliaryGibbs::new(2).unwrap(), 3);
    let m5 = co_clustering(AuxiliaryGibbs::new(5).unwrap(), 4);
    assert!(max_abs_diff(&m2, &m5) < 0.07);
}

#[test]
fn split_merge_mixture_agrees_with_marginal_gibbs() {
    let marginal = co_clustering(MarginalGibbs, 5);
    let kernel = SplitMergeGibbs::new(
        SplitMerge::new(PriorProposal::new(Beta::uniform())),
        AuxiliaryGibbs::default(),
        0.3,
    )
    .unwrap();
    let mixed = co_clustering(kernel, 6);
    assert!(max_abs_diff(&marginal, &mixed) < 0.08);
}

// Phase 2 of this kernel reassigns only non-singleton items, so a bias there
// would show up as a shift in co-clustering.
#[test]
fn metropolis_gibbs_agrees_with_marginal_gibbs() {
    let marginal = co_clustering(MarginalGibbs, 7);
    let metropolis = co_clustering(MetropolisGibbs, 8);
    assert!(max_abs_diff(&marginal, &metropolis) < 0.08);
}
