use std::sync::{Arc, Mutex};

use facetmap::{
    config::{CollisionPolicy, IndexConfig, RemovalPolicy},
    core::index::MultiKeyIndex,
    error::IndexError,
    observer::{Collision, Resolution},
    types::EntryId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Host {
    name: &'static str,
    ip: &'static str,
    mac: &'static str,
}

const fn host(name: &'static str, ip: &'static str, mac: &'static str) -> Host {
    Host { name, ip, mac }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Seen {
    facet: String,
    key: &'static str,
    incoming: EntryId,
    existing: EntryId,
    existing_name: &'static str,
    resolution: Resolution,
}

type SeenLog = Arc<Mutex<Vec<Seen>>>;

fn hosts(config: IndexConfig) -> (MultiKeyIndex<Host, &'static str>, SeenLog) {
    let log = SeenLog::default();
    let sink = Arc::clone(&log);
    let index = MultiKeyIndex::builder()
        .facet("name", |h: &Host| h.name)
        .facet("ip", |h: &Host| h.ip)
        .facet("mac", |h: &Host| h.mac)
        .config(config)
        .observe_with(move |c: &Collision<'_, &'static str, Host>| {
            sink.lock().unwrap().push(Seen {
                facet: c.facet.to_string(),
                key: *c.key,
                incoming: c.incoming,
                existing: c.existing,
                existing_name: c.existing_value.name,
                resolution: c.resolution,
            });
        })
        .build()
        .unwrap();
    (index, log)
}

#[test]
fn later_insert_takes_over_shared_key_and_is_reported() {
    let (mut index, log) = hosts(IndexConfig::default());
    let a = index.add(host("alpha", "10.0.0.1", "aa:aa"));
    let b = index.add(host("beta", "10.0.0.1", "bb:bb"));

    assert_eq!(index.get(&"10.0.0.1").map(|h| h.name), Some("beta"));
    assert_eq!(index.get(&"alpha").map(|h| h.name), Some("alpha"));
    assert_eq!(index.get(&"aa:aa").map(|h| h.name), Some("alpha"));
    assert_eq!(index.len(), 2);

    let seen = log.lock().unwrap().clone();
    assert_eq!(
        seen,
        [Seen {
            facet: "ip".to_string(),
            key: "10.0.0.1",
            incoming: b,
            existing: a,
            existing_name: "alpha",
            resolution: Resolution::Overwritten,
        }]
    );
}

#[test]
fn verified_removal_keeps_key_owned_by_another_entry() {
    let (mut index, _log) = hosts(IndexConfig::default());
    let a = index.add(host("alpha", "10.0.0.1", "aa:aa"));
    index.add(host("beta", "10.0.0.1", "bb:bb"));

    assert!(index.remove(a).is_some());
    assert_eq!(index.get(&"10.0.0.1").map(|h| h.name), Some("beta"));
    assert!(!index.contains_key(&"alpha"));
    assert!(!index.contains_key(&"aa:aa"));
}

#[test]
fn unconditional_removal_unbinds_shadowed_key() {
    let config = IndexConfig {
        removal_policy: RemovalPolicy::Unconditional,
        ..IndexConfig::default()
    };
    let (mut index, _log) = hosts(config);
    let a = index.add(host("alpha", "10.0.0.1", "aa:aa"));
    index.add(host("beta", "10.0.0.1", "bb:bb"));

    index.remove(a);
    assert_eq!(index.get(&"10.0.0.1"), None);
    assert_eq!(index.get(&"beta").map(|h| h.ip), Some("10.0.0.1"));
}

#[test]
fn keep_existing_leaves_first_owner_bound() {
    let config = IndexConfig {
        collision_policy: CollisionPolicy::KeepExisting,
        ..IndexConfig::default()
    };
    let (mut index, log) = hosts(config);
    index.add(host("alpha", "10.0.0.1", "aa:aa"));
    let b = index.add(host("beta", "10.0.0.1", "bb:bb"));

    assert_eq!(index.get(&"10.0.0.1").map(|h| h.name), Some("alpha"));
    assert_eq!(index.get(&"beta").map(|h| h.name), Some("beta"));

    index.remove(b);
    assert_eq!(index.get(&"10.0.0.1").map(|h| h.name), Some("alpha"));
    assert_eq!(log.lock().unwrap()[0].resolution, Resolution::KeptExisting);
}

#[test]
fn try_add_refuses_atomically() {
    let (mut index, log) = hosts(IndexConfig::default());
    let a = index.add(host("alpha", "10.0.0.1", "aa:aa"));

    let rejected = index
        .try_add(host("beta", "10.0.0.2", "aa:aa"))
        .unwrap_err();
    assert_eq!(
        rejected.error,
        IndexError::DuplicateKey {
            facet: "mac".to_string(),
            existing: a,
        }
    );
    assert_eq!(rejected.into_value().name, "beta");

    assert_eq!(index.len(), 1);
    assert!(!index.contains_key(&"beta"));
    assert!(!index.contains_key(&"10.0.0.2"));
    assert_eq!(index.get(&"aa:aa").map(|h| h.name), Some("alpha"));
    assert_eq!(log.lock().unwrap()[0].resolution, Resolution::Rejected);

    let c = index.try_add(host("gamma", "10.0.0.3", "cc:cc")).unwrap();
    assert_eq!(index.get_id(&"gamma"), Some(c));
}

#[test]
fn replace_drops_all_keys_of_current_owner() {
    let (mut index, _log) = hosts(IndexConfig::default());
    index.add(host("alpha", "10.0.0.1", "aa:aa"));

    let replaced = index
        .replace(&"10.0.0.1", host("alpha", "10.0.0.9", "ff:ff"))
        .unwrap();
    assert_eq!(replaced.previous.mac, "aa:aa");
    assert!(!index.contains_key(&"10.0.0.1"));
    assert!(!index.contains_key(&"aa:aa"));
    assert_eq!(index.get_id(&"ff:ff"), Some(replaced.id));
    assert_eq!(index.key_count(), 3);
}

#[test]
fn update_keeps_hands_off_keys_taken_by_later_entries() {
    for removal_policy in [RemovalPolicy::VerifyOwner, RemovalPolicy::Unconditional] {
        let (mut index, log) = hosts(IndexConfig {
            removal_policy,
            ..IndexConfig::default()
        });
        let a = index.add(host("alpha", "10.0.0.1", "aa:aa"));
        index.add(host("beta", "10.0.0.1", "bb:bb"));

        assert!(index.update_by_id(a, |_| {}));
        assert_eq!(index.get(&"10.0.0.1").map(|h| h.name), Some("beta"));
        assert_eq!(index.get_id(&"alpha"), Some(a));
        assert_eq!(log.lock().unwrap().len(), 1);

        index.update_by_id(a, |h| h.mac = "a2:a2");
        assert_eq!(index.get(&"10.0.0.1").map(|h| h.name), Some("beta"));
        assert!(!index.contains_key(&"aa:aa"));
        assert_eq!(index.get_id(&"a2:a2"), Some(a));
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}

#[test]
fn update_reports_key_it_takes_over() {
    let (mut index, log) = hosts(IndexConfig::default());
    let a = index.add(host("alpha", "10.0.0.1", "aa:aa"));
    let b = index.add(host("beta", "10.0.0.2", "bb:bb"));

    index.update_by_id(a, |h| h.ip = "10.0.0.2");
    assert_eq!(index.get(&"10.0.0.2").map(|h| h.name), Some("alpha"));
    assert!(!index.contains_key(&"10.0.0.1"));

    let seen = log.lock().unwrap().clone();
    assert_eq!(
        seen,
        [Seen {
            facet: "ip".to_string(),
            key: "10.0.0.2",
            incoming: a,
            existing: b,
            existing_name: "beta",
            resolution: Resolution::Overwritten,
        }]
    );
}

#[test]
fn no_report_when_one_value_repeats_its_own_key() {
    let (mut index, log) = hosts(IndexConfig::default());
    index.add(host("localhost", "localhost", "00:00"));
    assert_eq!(index.key_count(), 2);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn default_observer_logs_through_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("facetmap=debug")
        .try_init();

    let mut index = MultiKeyIndex::builder()
        .facet("ip", |h: &Host| h.ip)
        .build()
        .unwrap();
    index.add(host("alpha", "10.0.0.1", "aa:aa"));
    index.add(host("beta", "10.0.0.1", "bb:bb"));
    assert_eq!(index.get(&"10.0.0.1").map(|h| h.name), Some("beta"));
}
