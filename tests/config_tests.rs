//! Tests for loading dashboard configuration from YAML files

use orderboard::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config_from_file() {
    let file = write_config(
        r#"
generator:
  distribution:
    policy: bucketed
    min: 0
    max: 50
  status_policy:
    policy: weighted
    weights:
      Delivered: 0.60
      Shipped: 0.20
      Pending: 0.15
      Cancelled: 0.05
  window_days: 14
  amount_min: 10
  amount_max: 50000
  decimals: 2
  ordering: shuffled
  seed: 1234
table:
  page_size: 20
feed:
  refresh_interval_secs: 15
  latency_ms: 200
  event_capacity: 64
"#,
    );

    let config = DashboardConfig::from_yaml_file(file.path()).unwrap();

    assert_eq!(
        config.generator.distribution,
        RegionDistribution::Bucketed { min: 0, max: 50 }
    );
    assert_eq!(config.generator.status_policy, StatusPolicy::legacy_weights());
    assert_eq!(config.generator.ordering, BatchOrdering::Shuffled);
    assert_eq!(config.generator.seed, Some(1234));
    assert_eq!(config.table.page_size, 20);
    assert_eq!(config.feed.refresh_interval(), Duration::from_secs(15));
    assert_eq!(config.feed.latency(), Duration::from_millis(200));
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = write_config("");
    let config = DashboardConfig::from_yaml_file(file.path()).unwrap();

    assert_eq!(config, DashboardConfig::default());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");

    let err = DashboardConfig::from_yaml_file(&path).unwrap_err();

    assert!(matches!(err, DashboardError::Config(ConfigError::Read { .. })));
    assert!(err.to_string().contains("missing.yaml"));
}

#[test]
fn test_unknown_status_in_weights_is_rejected() {
    let file = write_config(
        "generator:\n  status_policy:\n    policy: weighted\n    weights:\n      Lost: 1\n",
    );

    let err = DashboardConfig::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(err, DashboardError::Config(ConfigError::Parse(_))));
}

#[test]
fn test_invalid_values_are_rejected() {
    let cases = [
        ("feed:\n  refresh_interval_secs: 0\n", "feed.refresh_interval_secs"),
        ("feed:\n  event_capacity: 0\n", "feed.event_capacity"),
        ("generator:\n  amount_min: -1\n", "generator.amount_min"),
        ("generator:\n  decimals: 9\n", "generator.decimals"),
        ("generator:\n  window_days: 200000000\n", "generator.window_days"),
    ];

    for (yaml, field) in cases {
        let file = write_config(yaml);
        let err = DashboardConfig::from_yaml_file(file.path()).unwrap_err();

        match err {
            DashboardError::Config(ConfigError::InvalidValue { field: f, .. }) => {
                assert_eq!(f, field)
            }
            other => panic!("expected invalid value for {}, got {:?}", field, other),
        }
    }
}

#[test]
fn test_seeded_config_is_reproducible() {
    let config = DashboardConfig::from_yaml_str(
        "generator:\n  distribution:\n    policy: uniform\n    count: 20\n  seed: 5\n",
    )
    .unwrap();

    let first = config
        .generator
        .generator()
        .generate(&mut StdRng::seed_from_u64(5), Utc::now());
    assert_eq!(first.len(), 20);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let (a, b) = runtime.block_on(async {
        let a = config.source().fetch().await.unwrap();
        let b = config.source().fetch().await.unwrap();
        (a, b)
    });

    let amounts = |orders: &[Order]| orders.iter().map(|o| o.amount).collect::<Vec<_>>();
    assert_eq!(amounts(&a), amounts(&b));
    assert_eq!(amounts(&a), amounts(&first));
}
