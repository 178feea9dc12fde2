use rand::Rng;
use sortpool::prelude::*;

fn random_vec(len: usize) -> Vec<u64> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random_range(0..1_000_000)).collect()
}

#[test]
fn test_growing_then_shrinking_sizes() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut sorter = Sorter::new();
    let sizes: Vec<usize> = [0, 1, 10, 100, 1_000, 10_000, 100_000]
        .into_iter()
        .chain([50_000, 5_000, 500, 50, 5, 0])
        .collect();

    let mut last_capacity = sorter.scratch_capacity();
    let mut largest = 0;
    for len in sizes {
        let mut input = random_vec(len);
        let mut expected = input.clone();
        expected.sort();

        sorter.sort(&mut input).unwrap();
        assert_eq!(input, expected, "len {len}");

        largest = largest.max(len);
        let capacity = sorter.scratch_capacity();
        assert!(capacity >= last_capacity, "scratch shrank at len {len}");
        assert!(capacity <= largest / 2, "scratch exceeds half of the largest sort");
        last_capacity = capacity;
    }

    assert!(last_capacity > 0);
}

#[test]
fn test_steady_state_does_not_grow() {
    let mut sorter = Sorter::new();

    // Two swapped halves force the largest merge a 20k sort can need.
    let mut warmup: Vec<u64> = (10_000..20_000).chain(0..10_000).collect();
    sorter.sort(&mut warmup).unwrap();
    let capacity = sorter.scratch_capacity();
    assert_eq!(capacity, 10_000);

    for _ in 0..20 {
        let mut frame = random_vec(20_000);
        sorter.sort(&mut frame).unwrap();
        assert!(frame.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sorter.scratch_capacity(), capacity);
    }
}

#[test]
fn test_preallocated_sorter() {
    let mut sorter = Sorter::with_capacity(4_096).unwrap();
    let capacity = sorter.scratch_capacity();
    assert!(capacity >= 4_096);

    let mut input = random_vec(8_192);
    sorter.sort(&mut input).unwrap();
    assert!(input.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(sorter.scratch_capacity(), capacity);
}

#[test]
fn test_custom_config() {
    assert!(Sorter::<u64>::with_config(SortConfig {
        min_merge: 0,
        min_gallop: 7,
    })
    .is_err());

    for (min_merge, min_gallop) in [(2, 1), (4, 3), (64, 1), (128, 20)] {
        let config = SortConfig {
            min_merge,
            min_gallop,
        };
        let mut sorter = Sorter::with_config(config).unwrap();
        assert_eq!(sorter.config(), &config);

        for len in [0, 1, 2, 3, 17, 300, 4_000] {
            let mut input: Vec<(u64, usize)> = random_vec(len)
                .into_iter()
                .map(|x| x % 50)
                .enumerate()
                .map(|(i, x)| (x, i))
                .collect();
            sorter.sort_by_key(&mut input, |x| x.0).unwrap();
            assert!(input.windows(2).all(|w| w[0] <= w[1]), "config {config:?} len {len}");
        }
    }
}

#[test]
fn test_default_pool_reuses_sorter_per_type() {
    let mut input = random_vec(10_000);
    sort(&mut input).unwrap();
    let capacity = with_default_sorter::<u64, _>(|sorter| sorter.scratch_capacity());
    assert!(capacity > 0);

    // Another element type has its own sorter.
    let other = with_default_sorter::<u32, _>(|sorter| sorter.scratch_capacity());
    assert_eq!(other, 0);

    let mut small = random_vec(100);
    sort(&mut small).unwrap();
    assert_eq!(
        with_default_sorter::<u64, _>(|sorter| sorter.scratch_capacity()),
        capacity
    );
}

#[test]
fn test_default_pool_is_per_thread() {
    let handles: Vec<_> = (0..4)
        .map(|t| {
            std::thread::spawn(move || {
                let mut input = random_vec(5_000 + t * 1_000);
                sort(&mut input).unwrap();
                assert!(input.windows(2).all(|w| w[0] <= w[1]));
                with_default_sorter::<u64, _>(|sorter| sorter.scratch_capacity())
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap() > 0);
    }
}
