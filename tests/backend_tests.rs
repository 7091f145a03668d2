use briny_reduce::backend::{init_from_env, BACKEND_ENV_VAR};
use briny_reduce::prelude::*;

// Single test: the selected backend is process-global.
#[test]
fn test_runtime_backend_selection() {
    let _ = env_logger::builder().is_test(true).try_init();
    let data: Vec<i64> = (1..=20_000).collect();
    let expected = 200_010_000;

    assert_eq!(get_backend(), Backend::Host);
    assert_eq!(reduce_auto(&data[..], 0, Plus).unwrap(), expected);

    for backend in ["sequential", "par", "host"] {
        set_backend(backend.parse().unwrap());
        assert_eq!(get_backend().name(), backend.parse::<Backend>().unwrap().name());
        assert_eq!(reduce_auto(&data[..], 0, Plus).unwrap(), expected);
        assert_eq!(reduce_auto(1i64..20_001, 0, Plus).unwrap(), expected);
    }

    set_backend(Backend::Device);
    assert!(matches!(
        reduce_auto(&data[..], 0, Plus),
        Err(ReduceError::MissingSpecialization {
            backend: Backend::Device,
            operation: "reduce"
        })
    ));

    // statically tagged calls ignore the global choice
    assert_eq!(reduce_by(SeqTag, &data[..], 0i64, Plus), expected);

    set_backend(Backend::Parallel);
    if std::env::var_os(BACKEND_ENV_VAR).is_none() {
        assert_eq!(init_from_env().unwrap(), Backend::Parallel);
    }
    set_backend(Backend::Host);
}
