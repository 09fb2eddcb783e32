//! Option catalog of the node process.
//!
//! Grouped the way the node's `--help` output groups them. Every option here
//! is accepted on the command line, in the YAML file passed with `--conf` and,
//! when enabled, from the environment.

use std::time::Duration;

use crate::config::DEFAULT_CONF_OPTION;
use crate::error::Result;
use crate::options::{OptionDescriptor as Opt, OptionRegistry};

pub fn node_registry() -> Result<OptionRegistry> {
    OptionRegistry::from_descriptors(node_descriptors())
}

pub fn node_descriptors() -> Vec<Opt> {
    let conf = Opt::string(DEFAULT_CONF_OPTION, "")
        .with_alias("config-file")
        .with_usage("YAML configuration file to load before applying flags");
    let mut descriptors = vec![conf];
    for group in [
        general(),
        txpool(),
        database(),
        state_and_cache(),
        networking(),
        rpc(),
        service(),
        chain_data_fetcher(),
        db_syncer(),
        service_chain(),
    ] {
        descriptors.extend(group);
    }
    descriptors
}

fn general() -> Vec<Opt> {
    vec![
        Opt::bool("ntp.disable", false)
            .with_usage("disable the NTP clock drift check"),
        Opt::string("ntp.server", "pool.ntp.org:123")
            .with_usage("NTP server used for the drift check"),
        Opt::string("docroot", "")
            .with_usage("document root for ChainID validation"),
        Opt::string_list("bootnodes", Vec::<String>::new())
            .with_usage("comma separated node URLs for P2P discovery bootstrap"),
        Opt::string("identity", "").with_usage("custom node name"),
        Opt::string_list("unlock", Vec::<String>::new())
            .with_usage("comma separated list of accounts to unlock"),
        Opt::string("password", "")
            .with_usage("password file for non-interactive unlocking"),
        Opt::string("dbtype", "LevelDB")
            .with_usage("blockchain storage database type"),
        Opt::string("datadir", "")
            .with_usage("data directory for databases and keystore"),
        Opt::bool("overwrite-genesis", false)
            .with_usage("overwrite the genesis block"),
        Opt::integer("start-block-num", 0)
            .with_usage("block number to start syncing from"),
        Opt::string("keystore", "")
            .with_usage("directory for the keystore"),
        Opt::string("syncmode", "full")
            .with_usage("blockchain sync mode"),
        Opt::string("gcmode", "full")
            .with_usage("blockchain garbage collection mode"),
        Opt::bool("lightkdf", false)
            .with_usage("reduce key-derivation RAM and CPU usage"),
        Opt::integer("networkid", 8217)
            .with_usage("network identifier"),
        Opt::bool("mainnet", false)
            .with_usage("pre-configured mainnet network"),
        Opt::bool("kairos", false)
            .with_usage("pre-configured kairos test network"),
        Opt::string("extradata", "")
            .with_usage("block extra-data set by the proposer"),
        Opt::string("genkey", "")
            .with_usage("generate a node private key and write it to file"),
        Opt::bool("writeaddress", false)
            .with_usage("write the node address derived from the key"),
    ]
}

fn txpool() -> Vec<Opt> {
    vec![
        Opt::bool("txpool.nolocals", false)
            .with_usage("disable price exemptions for local transactions"),
        Opt::bool("txpool.allow-local-anchortx", false)
            .with_usage("allow locally submitted anchoring transactions"),
        Opt::bool("txpool.deny.remotetx", false)
            .with_usage("deny remote transactions from the RPC API"),
        Opt::string("txpool.journal", "transactions.rlp")
            .with_usage("disk journal for local transactions"),
        Opt::duration("txpool.journal-interval", Duration::from_secs(3_600))
            .with_usage("time interval to regenerate the local transaction journal"),
        Opt::integer("txpool.pricelimit", 1)
            .with_usage("minimum gas price limit for acceptance"),
        Opt::integer("txpool.pricebump", 10)
            .with_usage("price bump percentage to replace a transaction"),
        Opt::integer("txpool.exec-slots.account", 16_384)
            .with_usage("executable slots per account"),
        Opt::integer("txpool.exec-slots.all", 16_384)
            .with_usage("executable slots for all accounts"),
        Opt::integer("txpool.nonexec-slots.account", 16_384)
            .with_usage("non-executable slots per account"),
        Opt::integer("txpool.nonexec-slots.all", 16_384)
            .with_usage("non-executable slots for all accounts"),
        Opt::duration("txpool.lifetime", Duration::from_secs(300))
            .with_usage("maximum time non-executable transactions are queued"),
        Opt::bool("txpool.keeplocals", false)
            .with_usage("keep local transactions past their lifetime"),
        Opt::bool("txpool.spamthrottler.disable", false)
            .with_usage("disable the txpool spam throttler"),
        Opt::integer("txresend.interval", 4)
            .with_usage("seconds between pending transaction resends"),
        Opt::integer("txresend.max-count", 1_000)
            .with_usage("maximum resent transactions per interval"),
        Opt::bool("txresend.use-legacy", false)
            .with_usage("use the legacy resend logic"),
    ]
}

fn database() -> Vec<Opt> {
    vec![
        Opt::bool("db.single", false)
            .with_usage("use a single database instead of partitions"),
        Opt::integer("db.num-statetrie-shards", 4)
            .with_usage("number of state trie shards (power of two)"),
        Opt::integer("db.leveldb.compression", 0)
            .with_usage("leveldb compression type (0 to 3)"),
        Opt::bool("db.leveldb.no-buffer-pool", false)
            .with_usage("disable the leveldb buffer pool"),
        Opt::integer("db.leveldb.cache-size", 768)
            .with_usage("leveldb cache size in MiB"),
        Opt::bool("db.no-perf-metrics", false)
            .with_usage("disable database performance metrics"),
        Opt::string("db.dynamo.tablename", "")
            .with_usage("dynamoDB table name"),
        Opt::string("db.dynamo.region", "ap-northeast-2")
            .with_usage("dynamoDB region"),
        Opt::bool("db.dynamo.is-provisioned", false)
            .with_usage("use provisioned capacity for dynamoDB"),
        Opt::integer("db.dynamo.read-capacity", 10_000)
            .with_usage("provisioned dynamoDB read capacity"),
        Opt::integer("db.dynamo.write-capacity", 10_000)
            .with_usage("provisioned dynamoDB write capacity"),
        Opt::bool("db.dynamo.read-only", false)
            .with_usage("open dynamoDB read-only"),
        Opt::bool("db.no-parallel-write", false)
            .with_usage("disable parallel database writes"),
        Opt::bool("sendertxhashindexing", false)
            .with_usage("index sender transaction hashes"),
    ]
}

fn state_and_cache() -> Vec<Opt> {
    vec![
        Opt::integer("state.cache-size", 512)
            .with_usage("state cache size in MiB"),
        Opt::integer("state.block-interval", 128)
            .with_usage("blocks between state trie commits"),
        Opt::integer("state.tries-in-memory", 128)
            .with_usage("recent state tries kept in memory"),
        Opt::bool("state.live-pruning", false)
            .with_usage("enable live pruning of the state trie"),
        Opt::integer("state.live-pruning-retention", 172_800)
            .with_usage("blocks of state kept by live pruning"),
        Opt::integer("cache.type", 2)
            .with_usage("cache implementation type"),
        Opt::integer("cache.scale", 0)
            .with_usage("scale factor for cache sizes"),
        Opt::string("cache.level", "saving")
            .with_usage("cache usage level"),
        Opt::integer("cache.memory", 16)
            .with_usage("physical memory size in GiB used for cache sizing"),
        Opt::string_list("statedb.cache.redis.endpoints", Vec::<String>::new())
            .with_usage("redis endpoints of the external state cache"),
        Opt::bool("statedb.cache.redis.cluster", false)
            .with_usage("redis endpoints form a cluster"),
        Opt::bool("snapshot", false)
            .with_usage("enable the state snapshot"),
        Opt::integer("snapshot.cache-size", 512)
            .with_usage("snapshot cache size in MiB"),
        Opt::bool("snapshot.async-gen", true)
            .with_usage("generate the snapshot in the background"),
    ]
}

fn networking() -> Vec<Opt> {
    vec![
        Opt::integer("port", 32_323)
            .with_usage("network listening port"),
        Opt::integer("subport", 32_324)
            .with_usage("network sub-listening port for multichannel"),
        Opt::bool("multichannel", true)
            .with_usage("create a dedicated channel for block propagation"),
        Opt::integer("maxconnections", 10)
            .with_alias("maxpeers")
            .with_usage("maximum number of physical connections"),
        Opt::integer("maxRequestContentLength", 524_288)
            .with_usage("maximum RPC request body size"),
        Opt::integer("maxpendpeers", 0)
            .with_usage("maximum pending connection attempts"),
        Opt::integer("targetgaslimit", 0)
            .with_usage("target gas limit sets the artificial floor"),
        Opt::string("nat", "any")
            .with_usage("NAT port mapping mechanism"),
        Opt::bool("nodiscover", false)
            .with_usage("disable peer discovery"),
        Opt::duration("rwtimerwaittime", Duration::from_secs(15))
            .with_usage("wait time of the rw timer"),
        Opt::integer("rwtimerinterval", 1_000)
            .with_usage("interval of the rw timer in milliseconds"),
        Opt::string("netrestrict", "")
            .with_usage("restrict network communication to CIDR masks"),
        Opt::string("nodekey", "").with_usage("P2P node key file"),
        Opt::string("nodekeyhex", "")
            .with_usage("P2P node key as hex"),
        Opt::integer("block-generation-interval", 1)
            .with_usage("block generation interval in seconds"),
        Opt::duration("block-generation-time-limit", Duration::from_millis(250))
            .with_usage("time limit for executing transactions while generating a block"),
        Opt::integer("opcode-computation-cost-limit", 100_000_000)
            .with_usage("computation cost limit for a single transaction"),
    ]
}

fn rpc() -> Vec<Opt> {
    vec![
        Opt::bool("rpc", false)
            .with_usage("enable the HTTP-RPC server"),
        Opt::string("rpcaddr", "localhost")
            .with_usage("HTTP-RPC listening interface"),
        Opt::integer("rpcport", 8_551)
            .with_usage("HTTP-RPC listening port"),
        Opt::string_list("rpcapi", Vec::<String>::new())
            .with_usage("APIs offered over HTTP-RPC"),
        Opt::integer("rpc.gascap", 0)
            .with_usage("gas cap for eth_call and estimateGas"),
        Opt::float("rpc.ethtxfeecap", 0.0)
            .with_usage("transaction fee cap in KAIA for eth namespace sends"),
        Opt::string_list("rpccorsdomain", Vec::<String>::new())
            .with_usage("cross-origin domains to accept"),
        Opt::string_list("rpcvhosts", ["localhost"])
            .with_usage("virtual hostnames to accept"),
        Opt::bool("rpc.eth.noncompatible", false)
            .with_usage("disable eth namespace compatibility"),
        Opt::integer("rpc.concurrencylimit", 3_000)
            .with_usage("concurrent RPC request limit"),
        Opt::integer("rpcreadtimeout", 30)
            .with_usage("HTTP-RPC read timeout in seconds"),
        Opt::integer("rpcwritetimeout", 30)
            .with_usage("HTTP-RPC write timeout in seconds"),
        Opt::integer("rpcidletimeout", 120)
            .with_usage("HTTP-RPC idle timeout in seconds"),
        Opt::duration("rpcexecutiontimeout", Duration::from_secs(30))
            .with_usage("HTTP-RPC execution timeout"),
        Opt::bool("ws", false)
            .with_usage("enable the WS-RPC server"),
        Opt::string("wsaddr", "localhost")
            .with_usage("WS-RPC listening interface"),
        Opt::integer("wsport", 8_552)
            .with_usage("WS-RPC listening port"),
        Opt::string_list("wsapi", Vec::<String>::new())
            .with_usage("APIs offered over WS-RPC"),
        Opt::string_list("wsorigins", Vec::<String>::new())
            .with_usage("origins to accept websockets from"),
        Opt::integer("wsmaxsubscriptionperconn", 3_000)
            .with_usage("subscriptions per WS connection"),
        Opt::duration("wsreaddeadline", Duration::from_secs(0))
            .with_usage("WS read deadline"),
        Opt::duration("wswritedeadline", Duration::from_secs(0))
            .with_usage("WS write deadline"),
        Opt::integer("wsmaxconnections", 3_000)
            .with_usage("maximum WS connections"),
        Opt::bool("grpc", false)
            .with_usage("enable the gRPC server"),
        Opt::string("grpcaddr", "localhost")
            .with_usage("gRPC listening interface"),
        Opt::integer("grpcport", 8_553)
            .with_usage("gRPC listening port"),
        Opt::bool("ipcdisable", false)
            .with_usage("disable the IPC-RPC server"),
        Opt::string("ipcpath", "").with_usage("IPC socket path"),
        Opt::integer("api.filter.getLogs.maxitems", 10_000)
            .with_usage("maximum items returned by getLogs"),
        Opt::duration("api.filter.getLogs.deadline", Duration::from_secs(10))
            .with_usage("execution deadline of getLogs"),
    ]
}

fn service() -> Vec<Opt> {
    vec![
        Opt::bool("vmdebug", false)
            .with_usage("record VM debug information"),
        Opt::integer("vmlog", 0)
            .with_usage("VM log target (0 none, 1 file, 2 stdout, 3 both)"),
        Opt::bool("vm.internaltx", false)
            .with_usage("collect internal transaction traces"),
        Opt::bool("metrics", false)
            .with_usage("enable metrics collection"),
        Opt::bool("prometheus", false)
            .with_usage("expose metrics to prometheus"),
        Opt::integer("prometheusport", 61_001)
            .with_usage("prometheus exporter port"),
        Opt::string("srvtype", "fasthttp")
            .with_usage("RPC server implementation"),
        Opt::bool("autorestart.enable", false)
            .with_usage("restart the process when block generation stalls"),
        Opt::duration("autorestart.timeout", Duration::from_secs(900))
            .with_usage("stall time before an automatic restart"),
        Opt::string("autorestart.daemon.path", "~/kaia/bin/kcnd")
            .with_usage("daemon used to restart"),
        Opt::integer("verbosity", 3)
            .with_usage("logging verbosity (0 silent to 5 detail)"),
        Opt::string("vmodule", "")
            .with_usage("per-module verbosity pattern"),
        Opt::bool("debug", false)
            .with_usage("prepend log messages with call-site location"),
        Opt::bool("pprof", false)
            .with_usage("enable the pprof HTTP server"),
        Opt::string("pprofaddr", "127.0.0.1")
            .with_usage("pprof HTTP server listening interface"),
        Opt::integer("pprofport", 6_060)
            .with_usage("pprof HTTP server listening port"),
        Opt::string("cpuprofile", "")
            .with_usage("write CPU profile to the given file"),
        Opt::string("trace", "")
            .with_usage("write execution trace to the given file"),
    ]
}

fn chain_data_fetcher() -> Vec<Opt> {
    vec![
        Opt::bool("chaindatafetcher", false)
            .with_usage("enable the chain data fetcher"),
        Opt::string("chaindatafetcher.mode", "kas")
            .with_usage("chain data fetcher mode (kas or kafka)"),
        Opt::bool("chaindatafetcher.no.default", false)
            .with_usage("start the fetcher stopped"),
        Opt::integer("chaindatafetcher.num.handlers", 10)
            .with_usage("number of fetcher handlers"),
        Opt::string("chaindatafetcher.kas.db.host", "")
            .with_usage("KAS database host"),
        Opt::string("chaindatafetcher.kas.db.port", "3306")
            .with_usage("KAS database port"),
        Opt::string_list("chaindatafetcher.kafka.brokers", Vec::<String>::new())
            .with_usage("kafka broker URLs"),
        Opt::integer("chaindatafetcher.kafka.replicas", 1)
            .with_usage("kafka topic replication factor"),
        Opt::integer("chaindatafetcher.kafka.partitions", 1)
            .with_usage("kafka topic partitions"),
        Opt::string("chaindatafetcher.kafka.topic.environment", "local")
            .with_usage("kafka topic environment"),
    ]
}

fn db_syncer() -> Vec<Opt> {
    vec![
        Opt::bool("dbsyncer", false)
            .with_usage("enable the database syncer"),
        Opt::string("dbsyncer.db.host", "")
            .with_usage("syncer database host"),
        Opt::string("dbsyncer.db.port", "3306")
            .with_usage("syncer database port"),
        Opt::string("dbsyncer.db.name", "")
            .with_usage("syncer database name"),
        Opt::integer("dbsyncer.db.max.idle", 50)
            .with_usage("maximum idle syncer connections"),
        Opt::duration("dbsyncer.db.max.lifetime", Duration::from_secs(3_600))
            .with_usage("maximum lifetime of a syncer connection"),
        Opt::string("dbsyncer.mode", "multi")
            .with_usage("syncer insert mode"),
    ]
}

fn service_chain() -> Vec<Opt> {
    vec![
        Opt::bool("mainbridge", false)
            .with_usage("enable the main bridge service"),
        Opt::string("mainbridgeport", ":50505")
            .with_usage("main bridge listening address"),
        Opt::bool("subbridge", false)
            .with_usage("enable the sub bridge service"),
        Opt::string("subbridgeport", ":50506")
            .with_usage("sub bridge listening address"),
        Opt::integer("parentchainid", 8_217)
            .with_usage("parent chain ID"),
        Opt::bool("vtrecovery", false)
            .with_usage("enable value transfer recovery"),
        Opt::integer("vtrecoveryinterval", 60)
            .with_usage("value transfer recovery interval in seconds"),
        Opt::bool("anchoring", false)
            .with_usage("enable anchoring to the parent chain"),
        Opt::integer("sc.parentoperator.gaslimit", 10_000_000)
            .with_usage("gas limit of parent operator transactions"),
        Opt::bool("kas.sc.anchor", false)
            .with_usage("anchor through KAS"),
        Opt::duration("kas.sc.anchor.request.timeout", Duration::from_millis(500))
            .with_usage("KAS anchor request timeout"),
    ]
}

#[cfg(test)]
mod tests {
    use super::{node_descriptors, node_registry};
    use crate::options::OptionKind;

    #[test]
    fn catalog_registers_without_collisions() {
        let registry = node_registry().expect("catalog should register");
        assert_eq!(registry.len(), node_descriptors().len());
        assert_eq!(
            registry.resolve_alias("maxpeers").expect("alias"),
            "maxconnections"
        );

        let lifetime = registry.descriptor("txpool.lifetime").expect("descriptor");
        assert_eq!(lifetime.kind(), OptionKind::Duration);
    }

    #[test]
    fn catalog_flags_build_a_valid_command() {
        let registry = node_registry().expect("catalog should register");
        clap::Command::new("node")
            .args(registry.clap_args())
            .debug_assert();
    }
}
