// tests/workflow.rs

//! End-to-end transaction runs: .repo files, file:// repositories,
//! certificate collection, resolution and the dry-run manager.

mod common;

use common::{MemoryDb, gzip, local_repo, named_product_pem};
use productid::config::Config;
use productid::repository::{RepoVars, load_repositories};
use productid::{
    AvailablePackage, CertificateCollector, PackageRepoCache, PlanReporter, ProductUpdater,
    RepomdFetcher, RepositoryClient, RunOutcome, SkipReason, TransactionContext,
};
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

/// Write a `.repo` file describing `repos` (id, baseurl, enabled)
fn write_repo_file(dir: &std::path::Path, repos: &[(&str, &str, bool)]) {
    let mut content = String::new();
    for (id, baseurl, enabled) in repos {
        content.push_str(&format!(
            "[{id}]\nname={id} repository\nbaseurl={baseurl}\nenabled={}\ngpgcheck=1\n\n",
            if *enabled { 1 } else { 0 }
        ));
    }
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("test.repo"), content).unwrap();
}

#[test]
fn test_transaction_updates_products() {
    let root = TempDir::new().unwrap();
    let rhel = named_product_pem("479", "Red Hat Enterprise Linux for x86_64");
    let baseos = local_repo(root.path(), "baseos", Some(&gzip(rhel.as_bytes())));
    let codeready = local_repo(
        root.path(),
        "codeready",
        Some(&gzip(named_product_pem("491", "CodeReady Builder").as_bytes())),
    );
    let appstream = local_repo(root.path(), "appstream", None);

    let repos_d = root.path().join("yum.repos.d");
    write_repo_file(
        &repos_d,
        &[
            ("baseos", baseos.baseurls[0].as_str(), true),
            ("appstream", appstream.baseurls[0].as_str(), true),
            ("codeready", codeready.baseurls[0].as_str(), true),
            ("disabled", "file:///nonexistent/", false),
        ],
    );

    let config = Config::parse(&format!(
        "[repositories]\nrepos_dirs = [\"{}\"]\n",
        repos_d.display()
    ))
    .unwrap();
    let repos = load_repositories(&config.repositories.repos_dirs, &RepoVars::default()).unwrap();
    let context = TransactionContext::configure(repos);
    assert_eq!(context.repositories().len(), 3);

    let updater = ProductUpdater::new(
        CertificateCollector::new(RepomdFetcher::new(RepositoryClient::new().unwrap())),
        PackageRepoCache::new(root.path().join("cache/package_repo_mapping.json")),
        PlanReporter::new(),
    );
    let db = MemoryDb {
        installed: vec![("bash", "x86_64"), ("git", "x86_64")],
        all: vec![
            AvailablePackage::new("bash", "x86_64", "baseos"),
            AvailablePackage::new("git", "x86_64", "appstream"),
            AvailablePackage::new("cmake-devel", "x86_64", "codeready"),
        ],
        ..Default::default()
    };

    let outcome = context.run(2, &updater, move || Ok(db));
    let RunOutcome::Updated(summary) = outcome else {
        panic!("expected an update, got {outcome:?}");
    };

    assert_eq!(
        summary.plan.active_repositories,
        BTreeSet::from(["appstream".to_string(), "baseos".to_string()])
    );
    assert_eq!(summary.plan.products(), BTreeSet::from(["479"]));
    assert_eq!(summary.plan.inactive.len(), 1);
    assert_eq!(summary.plan.inactive[0].product_id, "491");
    assert_eq!(
        summary.metadata_errors,
        BTreeSet::from(["appstream".to_string()])
    );
    assert_eq!(updater.manager().last_plan(), Some(summary.plan.clone()));

    // Summary serializes for `productid update --json`
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["plan"]["repo_map"]["479"][0], "baseos");
    assert_eq!(json["metadata_errors"][0], "appstream");
}

#[test]
fn test_empty_transaction_does_nothing() {
    let root = TempDir::new().unwrap();
    let cache_path = root.path().join("package_repo_mapping.json");
    let updater = ProductUpdater::new(
        CertificateCollector::new(RepomdFetcher::new(RepositoryClient::new().unwrap())),
        PackageRepoCache::new(&cache_path),
        PlanReporter::new(),
    );

    let context = TransactionContext::configure(vec![local_repo(root.path(), "baseos", None)]);
    let outcome = context.run(0, &updater, || Ok(MemoryDb::default()));

    assert_eq!(outcome, RunOutcome::Skipped(SkipReason::EmptyTransaction));
    assert!(!cache_path.exists());
    assert!(updater.manager().last_plan().is_none());
}
