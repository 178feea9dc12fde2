use rand::Rng;
use sortpool::prelude::*;
use std::collections::VecDeque;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_basic_sort_integers() {
    init_logging();
    let mut input = [5, 3, 1, 4, 2];
    sort(&mut input).unwrap();
    assert_eq!(input, [1, 2, 3, 4, 5]);
}

#[test]
fn test_basic_sort_strings() {
    let mut input = vec![
        "banana".to_string(),
        "apple".to_string(),
        "cherry".to_string(),
        "date".to_string(),
    ];

    sort(&mut input).unwrap();
    assert_eq!(input, vec!["apple", "banana", "cherry", "date"]);
}

#[test]
fn test_stable_pairs_by_first_component() {
    let mut input = vec![(1, 'a'), (1, 'b'), (0, 'c')];
    sort_by(&mut input, |a, b| a.0.cmp(&b.0)).unwrap();
    assert_eq!(input, vec![(0, 'c'), (1, 'a'), (1, 'b')]);
}

#[test]
fn test_sorted_input_needs_no_merges() {
    let mut sorter = Sorter::new();
    let mut input: Vec<u32> = (0..40).collect();
    let expected = input.clone();

    sorter.sort(&mut input).unwrap();

    assert_eq!(input, expected);
    let stats = sorter.last_stats();
    assert_eq!(stats.len, 40);
    assert_eq!(stats.runs, 1);
    assert_eq!(stats.merges, 0);
    assert_eq!(sorter.scratch_capacity(), 0);
}

#[test]
fn test_reverse_sorted_1000() {
    let mut sorter = Sorter::new();
    let mut input: Vec<i64> = (0..1000).rev().collect();

    sorter.sort(&mut input).unwrap();

    let expected: Vec<i64> = (0..1000).collect();
    assert_eq!(input, expected);
    // A strictly descending range is a single run.
    assert_eq!(sorter.last_stats().merges, 0);
}

#[test]
fn test_reverse_sorted_with_duplicates_is_permutation() {
    let mut input: Vec<u16> = (0..1000).map(|i| (999 - i) / 3).collect();
    let mut expected = input.clone();
    expected.sort();

    sort(&mut input).unwrap();
    assert_eq!(input, expected);
}

#[test]
fn test_sub_range_leaves_outside_untouched() {
    let mut rng = rand::rng();
    let original: Vec<i32> = (0..500).map(|_| rng.random_range(-1000..1000)).collect();

    for (from, to) in [(0, 0), (3, 4), (0, 31), (17, 250), (100, 500), (0, 500)] {
        let mut input = original.clone();
        sort_range(&mut input, from..to).unwrap();

        let mut expected = original.clone();
        expected[from..to].sort();
        assert_eq!(input, expected, "range {from}..{to}");
    }
}

#[test]
fn test_range_forms() {
    let mut input = [4, 3, 2, 1, 0];
    sort_range(&mut input, 2..).unwrap();
    assert_eq!(input, [4, 3, 0, 1, 2]);

    sort_range(&mut input, ..=1).unwrap();
    assert_eq!(input, [3, 4, 0, 1, 2]);

    sort_by_range(&mut input, .., |a, b| b.cmp(a)).unwrap();
    assert_eq!(input, [4, 3, 2, 1, 0]);
}

#[test]
fn test_invalid_range_does_not_mutate() {
    let mut input = vec![3, 2, 1];

    let err = sort_range(&mut input, 2..1).unwrap_err();
    assert_eq!(
        err,
        SortError::InvalidRange {
            from: 2,
            to: 1,
            len: 3
        }
    );
    assert!(sort_range(&mut input, 0..4).is_err());
    assert!(sort_by_range(&mut input, 4..4, |a, b| a.cmp(b)).is_err());

    assert_eq!(input, vec![3, 2, 1]);
}

#[test]
fn test_trivial_ranges_are_noops() {
    let mut input = vec![9, 1, 8, 2];
    sort_range(&mut input, 1..1).unwrap();
    sort_range(&mut input, 2..3).unwrap();
    assert_eq!(input, vec![9, 1, 8, 2]);

    let mut empty: Vec<String> = vec![];
    sort(&mut empty).unwrap();
    assert!(empty.is_empty());

    let mut single = [42];
    sort(&mut single).unwrap();
    assert_eq!(single, [42]);
}

#[test]
fn test_containers() {
    let mut deque: VecDeque<i32> = VecDeque::with_capacity(8);
    deque.extend([5, 6, 7]);
    deque.push_front(9);
    deque.push_front(1);
    sort(&mut deque).unwrap();
    assert_eq!(deque, VecDeque::from(vec![1, 5, 6, 7, 9]));

    let mut boxed: Box<[char]> = vec!['c', 'a', 'b'].into_boxed_slice();
    sort(&mut boxed).unwrap();
    assert_eq!(&*boxed, &['a', 'b', 'c']);

    let mut vec = Vec::with_capacity(100);
    vec.extend([3, 1, 2]);
    let slice: &mut [i32] = &mut vec;
    sort(slice).unwrap();
    assert_eq!(vec, vec![1, 2, 3]);
}

#[test]
fn test_sort_by_key() {
    let mut sorter = Sorter::new();
    let mut words = vec!["ccc", "a", "bb", "dd", "e"];
    sorter.sort_by_key(&mut words, |w| w.len()).unwrap();
    assert_eq!(words, vec!["a", "e", "bb", "dd", "ccc"]);
}

#[test]
fn test_fuzz_random() {
    let mut rng = rand::rng();
    let mut sorter = Sorter::new();

    for _ in 0..2_000 {
        let len = rng.random_range(0..300);
        let mut input: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let mut expected = input.clone();
        expected.sort();

        sorter.sort(&mut input).unwrap();
        assert_eq!(input, expected);
    }
}

#[test]
fn test_fuzz_random_large() {
    let mut rng = rand::rng();
    let mut sorter = Sorter::new();

    for _ in 0..50 {
        let count = rng.random_range(1_000..20_000);
        let mut input: Vec<Vec<u8>> = (0..count)
            .map(|_| {
                let inner_len = rng.random_range(0..8);
                let mut inner = vec![0u8; inner_len];
                rng.fill(&mut inner[..]);
                inner
            })
            .collect();

        let mut expected = input.clone();
        expected.sort();

        sorter.sort(&mut input).unwrap();
        assert_eq!(input, expected);
    }
}

#[test]
fn test_fuzz_edge_cases() {
    let mut sorter = Sorter::new();

    // 1. All equal
    let mut input = vec![7u32; 5_000];
    let expected = input.clone();
    sorter.sort(&mut input).unwrap();
    assert_eq!(input, expected);

    // 2. Saw tooth of ascending runs
    let mut input: Vec<u32> = (0..5_000).map(|i| i % 137).collect();
    let mut expected = input.clone();
    expected.sort();
    sorter.sort(&mut input).unwrap();
    assert_eq!(input, expected);

    // 3. Saw tooth of descending runs
    let mut input: Vec<u32> = (0..5_000).map(|i| 1_000 - i % 211).collect();
    let mut expected = input.clone();
    expected.sort();
    sorter.sort(&mut input).unwrap();
    assert_eq!(input, expected);

    // 4. Pipe organ
    let mut input: Vec<u32> = (0..2_500).chain((0..2_500).rev()).collect();
    let mut expected = input.clone();
    expected.sort();
    sorter.sort(&mut input).unwrap();
    assert_eq!(input, expected);

    // 5. Sorted with random tail
    let mut rng = rand::rng();
    let mut input: Vec<u32> = (0..4_000).collect();
    input.extend((0..1_000).map(|_| rng.random_range(0..4_000)));
    let mut expected = input.clone();
    expected.sort();
    sorter.sort(&mut input).unwrap();
    assert_eq!(input, expected);
    assert!(sorter.last_stats().gallops > 0);
}

#[test]
fn test_stability_random_keys() {
    let mut rng = rand::rng();
    let mut sorter = Sorter::new();

    for len in (2..80).chain([500, 3_001, 10_007]) {
        let mut counts = [0u32; 10];
        // (key, occurrence): occurrences of one key appear in increasing order in the input.
        let input: Vec<(u8, u32)> = (0..len)
            .map(|_| {
                let key = rng.random_range(0..10u8);
                counts[key as usize] += 1;
                (key, counts[key as usize])
            })
            .collect();

        let mut output = input.clone();
        sorter.sort_by(&mut output, |a, b| a.0.cmp(&b.0)).unwrap();

        // Comparing the whole tuple checks that equal keys kept their occurrence order.
        assert!(output.windows(2).all(|w| w[0] <= w[1]), "len {len}");
    }
}

#[test]
fn test_stability_presorted_blocks() {
    let mut sorter = Sorter::new();
    // Long interleaved runs of equal keys exercise galloping on ties.
    let input: Vec<(u32, usize)> = (0..6_000)
        .map(|i| (((i / 1_000) % 2) as u32 * 10 + (i % 3) as u32, i))
        .collect();

    let mut output = input.clone();
    sorter.sort_by_key(&mut output, |x| x.0).unwrap();

    assert!(output.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_zero_sized_elements() {
    let mut input = vec![(); 1_000];
    sort(&mut input).unwrap();
    assert_eq!(input.len(), 1_000);
}
