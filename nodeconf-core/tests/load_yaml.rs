use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Command;
use nodeconf_core::catalog::node_registry;
use nodeconf_core::config::{load, LoaderSettings};
use nodeconf_core::{CliSource, EffectiveConfig, Origin};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/testdata/node-config.yaml")
}

fn load_with_args(args: &[&str]) -> EffectiveConfig {
    let registry = Arc::new(node_registry().expect("catalog should register"));
    let matches = Command::new("node")
        .args(registry.clap_args())
        .try_get_matches_from(std::iter::once("node").chain(args.iter().copied()))
        .expect("arguments should parse");
    let cli = CliSource::from_matches(&registry, &matches);
    load(&registry, &cli, &LoaderSettings::default()).expect("configuration should load")
}

/// Options present in the fixture, by canonical name, plus `conf` itself.
fn expected_set() -> BTreeSet<&'static str> {
    [
        "conf",
        "ntp.disable",
        "ntp.server",
        "docroot",
        "bootnodes",
        "dbtype",
        "networkid",
        "txpool.nolocals",
        "txpool.journal-interval",
        "txpool.pricelimit",
        "txpool.exec-slots.account",
        "txpool.lifetime",
        "db.single",
        "db.leveldb.cache-size",
        "db.leveldb.compression",
        "db.dynamo.region",
        "state.cache-size",
        "cache.scale",
        "cache.level",
        "port",
        "maxconnections",
        "rwtimerwaittime",
        "rpc",
        "rpcaddr",
        "rpcapi",
        "rpc.ethtxfeecap",
        "wsorigins",
        "metrics",
        "prometheusport",
        "autorestart.timeout",
        "chaindatafetcher.mode",
        "chaindatafetcher.kafka.brokers",
        "dbsyncer.db.host",
        "dbsyncer.db.max.lifetime",
        "kas.sc.anchor.request.timeout",
    ]
    .into_iter()
    .collect()
}

#[test]
fn is_set_matches_fixture_for_every_option() {
    let fixture = fixture_path();
    let config = load_with_args(&["--conf", &fixture.to_string_lossy()]);
    let expected = expected_set();

    let registry = config.registry();
    for name in &expected {
        assert!(
            registry.contains(name),
            "fixture names unknown option {name}"
        );
    }
    for descriptor in registry.iter() {
        let name = descriptor.name();
        assert_eq!(
            config.is_set(name),
            expected.contains(name),
            "is_set mismatch for {name}"
        );
    }
    assert_eq!(config.explicitly_set().len(), expected.len());
}

#[test]
fn fixture_values_are_typed() {
    let fixture = fixture_path();
    let config = load_with_args(&["--conf", &fixture.to_string_lossy()]);

    assert!(config.bool("ntp.disable").expect("ntp.disable"));
    assert_eq!(config.str("docroot").expect("docroot"), "/var/kaia/docroot");
    assert_eq!(config.list("bootnodes").expect("bootnodes").len(), 2);
    assert_eq!(
        config.list("rpcapi").expect("rpcapi"),
        ["klay", "eth", "net"].map(str::to_owned)
    );
    assert_eq!(config.integer("maxconnections").expect("maxpeers"), 50);
    assert_eq!(config.float("rpc.ethtxfeecap").expect("fee cap"), 1.5);
    assert_eq!(
        config.duration("autorestart.timeout").expect("timeout"),
        Duration::from_secs(5_400)
    );
    assert_eq!(
        config
            .duration("dbsyncer.db.max.lifetime")
            .expect("lifetime"),
        Duration::from_secs(7_200)
    );
    assert_eq!(config.integer("rpcport").expect("rpcport"), 8_551);
    assert_eq!(config.origin("rpcport").expect("origin"), Origin::Default);
    assert_eq!(config.origin("conf").expect("origin"), Origin::Cli);
}

#[test]
fn flags_override_the_fixture() {
    let fixture = fixture_path();
    let config = load_with_args(&[
        "--conf",
        &fixture.to_string_lossy(),
        "--port=40000",
        "--metrics=false",
        "--nodiscover",
    ]);

    assert_eq!(config.integer("port").expect("port"), 40_000);
    assert_eq!(config.origin("port").expect("origin"), Origin::Cli);
    assert!(!config.bool("metrics").expect("metrics"));
    assert!(config.is_set("metrics"));
    assert!(config.bool("nodiscover").expect("nodiscover"));
    assert!(config.is_set("nodiscover"));
    assert_eq!(config.integer("txpool.pricelimit").expect("pricelimit"), 25);
}

#[test]
fn without_conf_nothing_is_set() {
    let config = load_with_args(&[]);
    assert!(config.explicitly_set().is_empty());
    assert_eq!(config.integer("port").expect("port"), 32_323);
}
