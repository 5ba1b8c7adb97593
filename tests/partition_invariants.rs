//! After every sweep of every kernel, each item is in exactly one
//! non-empty cluster.
use dpmix::misc::crp_labels;
use dpmix::prelude::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn start(alpha: f64, n: usize, rng: &mut Xoshiro256Plus) -> Partition<f64> {
    let labels = crp_labels(alpha, n, rng);
    let k = labels.iter().max().map_or(0, |&k| k + 1);
    let values: Vec<f64> = (0..k).map(|_| Beta::uniform().draw(rng)).collect();
    Partition::from_labels(&labels, values).unwrap()
}

fn check_sweeps<Ps>(
    mut kernel: Ps,
    xs: &[u32],
    alpha: f64,
    seed: u64,
) -> Result<(), TestCaseError>
where
    Ps: PartitionSampler<BinomialDatum, f64, Binomial, Beta>,
{
    let data: Vec<BinomialDatum> =
        xs.iter().map(|&x| BinomialDatum::new(x, 10)).collect();
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    let mut part = start(alpha, data.len(), &mut rng);
    let base = Beta::uniform();
    let mut atoms = ConjugateAtomSampler;

    for _ in 0..5 {
        kernel.sample(&data, &mut part, alpha, &Binomial, &base, &mut rng);
        atoms.sample(&data, &mut part, &Binomial, &base, &mut rng);

        prop_assert_eq!(part.validate(data.len()), Ok(()));
        prop_assert!(part.cells().iter().all(|cell| !cell.is_empty()));
        prop_assert_eq!(part.counts().iter().sum::<usize>(), data.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn marginal_gibbs(
        xs in prop::collection::vec(0_u32..=10, 1..30),
        alpha in 0.1_f64..5.0,
        seed in any::<u64>(),
    ) {
        check_sweeps(MarginalGibbs, &xs, alpha, seed)?;
    }

    #[test]
    fn auxiliary_gibbs(
        xs in prop::collection::vec(0_u32..=10, 1..30),
        alpha in 0.1_f64..5.0,
        m in 1_usize..5,
        seed in any::<u64>(),
    ) {
        check_sweeps(AuxiliaryGibbs::new(m).unwrap(), &xs, alpha, seed)?;
    }

    #[test]
    fn metropolis_gibbs(
        xs in prop::collection::vec(0_u32..=10, 1..30),
        alpha in 0.1_f64..5.0,
        seed in any::<u64>(),
    ) {
        check_sweeps(MetropolisGibbs, &xs, alpha, seed)?;
    }

    #[test]
    fn split_merge_gibbs(
        xs in prop::collection::vec(0_u32..=10, 1..30),
        alpha in 0.1_f64..5.0,
        seed in any::<u64>(),
    ) {
        let kernel = SplitMergeGibbs::new(
            SplitMerge::new(PriorProposal::new(Beta::uniform())),
            AuxiliaryGibbs::default(),
            0.5,
        )
        .unwrap();
        check_sweeps(kernel, &xs, alpha, seed)?;
    }
}
