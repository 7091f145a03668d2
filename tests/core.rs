use briny_reduce::approx::approx_eq;
use briny_reduce::prelude::*;
use briny_reduce::sequence::{self, forward};
use briny_reduce::{generic_fallback, inherit_reduce, Refines};
use rand::Rng;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_sum_with_init() {
    init_logger();
    let data = [1, 2, 3, 4];
    assert_eq!(reduce_by(SeqTag, &data[..], 0, Plus), 10);
    assert_eq!(reduce_by(ParTag, &data[..], 0, Plus), 10);
    assert_eq!(reduce_init(HostTag, &data[..], 0), 10);
}

#[test]
fn test_single_element_without_init() {
    assert_eq!(reduce(SeqTag, &[7][..]).unwrap(), 7);
    assert_eq!(reduce(ParTag, &[7][..]).unwrap(), 7);
}

#[test]
fn test_empty_with_init_is_identity() {
    let empty: &[i32] = &[];
    assert_eq!(reduce_init(SeqTag, empty, 5), 5);
    assert_eq!(reduce_by(ParTag, empty, 5, Multiplies), 5);
    assert_eq!(reduce_by(HostTag, empty, 5, |_: i32, _: i32| -> i32 { unreachable!() }), 5);
}

#[test]
fn test_empty_without_init_errors() {
    let empty: &[i32] = &[];
    assert!(matches!(reduce(SeqTag, empty), Err(ReduceError::EmptyRange)));
    assert!(matches!(reduce(ParTag, empty), Err(ReduceError::EmptyRange)));
    assert!(matches!(
        reduce_with(HostTag, empty, Reduction::new().op(Maximum)),
        Err(ReduceError::EmptyRange)
    ));
}

#[test]
fn test_reduce_n_prefix() {
    let data = [1, 2, 3, 4, 5];
    assert_eq!(reduce_n(SeqTag, &data[..], 3, 100, Plus).unwrap(), 106);
    assert_eq!(reduce_n(ParTag, &data[..], 3, 100, Plus).unwrap(), 106);
}

#[test]
fn test_reduce_n_negative_count() {
    let data = [1, 2, 3, 4, 5];
    let err = reduce_n(SeqTag, &data[..], -1, 0, Plus).unwrap_err();
    assert!(matches!(err, ReduceError::InvalidArgument { arg: "n", .. }));
    assert!(err.to_string().contains("-1"));
}

#[test]
fn test_reduce_n_matches_ranged_reduce() {
    let mut rng = rand::rng();
    let data: Vec<i64> = (0..500).map(|_| rng.random_range(-1_000..1_000)).collect();
    for n in [0usize, 1, 2, 17, 250, 500] {
        let counted = reduce_n(SeqTag, &data[..], n, 3i64, Plus).unwrap();
        let ranged = reduce_by(SeqTag, &data[..n], 3i64, Plus);
        assert_eq!(counted, ranged, "n = {n}");
        assert_eq!(reduce_n(ParTag, &data[..], n, 3i64, Plus).unwrap(), ranged);
    }
}

#[test]
fn test_reduce_n_over_ranges() {
    assert_eq!(reduce_n(SeqTag, 1u32..11, 4, 0u32, Plus).unwrap(), 10);
    assert_eq!(reduce_n(ParTag, 0u64..100_000, 50_000, 0u64, Plus).unwrap(), 1_249_975_000);
}

#[test]
fn test_wider_output_type() {
    let bytes = vec![250u8; 1_000];
    let widen = |acc: u64, b: u8| acc + u64::from(b);
    assert_eq!(reduce_n(SeqTag, &bytes[..], 1_000, 0u64, widen).unwrap(), 250_000);
    assert_eq!(reduce_by(HostTag, &bytes[..], 0u64, widen), 250_000);
    let mapped = sequence::map(&bytes[..], u64::from);
    assert_eq!(reduce_by(ParTag, mapped, 0u64, Plus), 250_000);
}

#[test]
fn test_left_to_right_order_on_fallback() {
    let data = [1, 2, 3];
    // ((10 - 1) - 2) - 3
    assert_eq!(reduce_by(SeqTag, &data[..], 10, |a: i32, b: i32| a - b), 4);
    let letters = forward("abc".chars());
    let reversed = reduce_by(HostTag, letters, String::new(), |acc: String, c: char| {
        format!("{c}{acc}")
    });
    assert_eq!(reversed, "cba");
}

#[test]
fn test_parallel_matches_sequential_on_integers() {
    let mut rng = rand::rng();
    for len in [0usize, 1, 100, 4_095, 4_096, 123_457] {
        let data: Vec<i64> = (0..len).map(|_| rng.random_range(-1_000_000..1_000_000)).collect();
        assert_eq!(
            reduce_by(ParTag, &data[..], 0i64, Plus),
            reduce_by(SeqTag, &data[..], 0i64, Plus),
            "len = {len}"
        );
        assert_eq!(
            reduce_by(ParTag, &data[..], i64::MIN, Maximum),
            reduce_by(SeqTag, &data[..], i64::MIN, Maximum)
        );
        assert_eq!(
            reduce_by(ParTag, &data[..], i64::MAX, Minimum),
            reduce_by(SeqTag, &data[..], i64::MAX, Minimum)
        );
    }
}

#[test]
fn test_parallel_matches_sequential_on_floats() {
    let mut rng = rand::rng();
    let data: Vec<f64> = (0..50_000).map(|_| rng.random_range(0.0..1.0)).collect();
    let seq = reduce_by(SeqTag, &data[..], 0.0, Plus);
    let par = reduce_by(ParTag, &data[..], 0.0, Plus);
    assert!(approx_eq(&seq, &par), "{seq} vs {par}");
}

#[test]
fn test_parallel_keeps_order_for_string_concat() {
    // concatenation is associative but not commutative
    let words: Vec<String> = (0..10_000).map(|i| (i % 10).to_string()).collect();
    let refs: Vec<&str> = words.iter().map(String::as_str).collect();
    let concat = |mut acc: String, w: String| {
        acc.push_str(&w);
        acc
    };
    let owned = sequence::map(&refs[..], str::to_owned);
    let par = reduce_by(ParTag, owned.clone(), String::new(), concat);
    let seq = reduce_by(SeqTag, owned, String::new(), concat);
    assert_eq!(par, seq);
    assert!(par.starts_with("0123456789"));
}

#[test]
fn test_tagged_sequences() {
    let data = [2, 3, 4];
    assert_eq!(data[..].with_tag(SeqTag).reduce_by(1, Multiplies), 24);
    assert_eq!(data[..].with_tag(ParTag).reduce().unwrap(), 9);
    assert_eq!((0u32..4).with_tag(HostTag).reduce_n(2, 0u32, Plus).unwrap(), 1);
}

#[derive(Debug, Clone, Copy, Default)]
struct Embedded;

impl Tag for Embedded {
    const BACKEND: Backend = Backend::Sequential;
    const NAME: &'static str = "embedded";
}

generic_fallback!(Embedded);

#[derive(Debug, Clone, Copy, Default)]
struct Pooled;

impl Tag for Pooled {
    const BACKEND: Backend = Backend::Parallel;
    const NAME: &'static str = "pooled";
}

impl Refines for Pooled {
    type Parent = ParTag;
}

inherit_reduce!(Pooled => ParTag);

#[test]
fn test_custom_tags() {
    let data: Vec<u32> = (1..=10_000).collect();
    assert_eq!(reduce_init(Embedded, &data[..], 0u32), 50_005_000);
    assert_eq!(reduce(Pooled, &data[..]).unwrap(), 50_005_000);
    assert_eq!(reduce_n(Pooled, &data[..], 4, 0u32, Plus).unwrap(), 10);
    assert_eq!(reduce_n(Embedded, &data[..], 4, 0u32, Plus).unwrap(), 10);
}
