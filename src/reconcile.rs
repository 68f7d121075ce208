// src/reconcile.rs

//! Reconciling collected certificates with the active repository set
//!
//! The plan says which product certificates belong on the machine (their
//! repository is active) and which repositories each product maps to.
//! Persisting certificates is left to a [`CertificateManager`].

use crate::collector::CertificateRepoPair;
use crate::error::Result;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// A certificate selected for installation
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlannedCertificate {
    pub product_id: String,
    pub repo_id: String,
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(skip)]
    pub pem: String,
}

impl From<&CertificateRepoPair> for PlannedCertificate {
    fn from(pair: &CertificateRepoPair) -> Self {
        Self {
            product_id: pair.certificate.product_id.clone(),
            repo_id: pair.repo_id.clone(),
            name: pair.certificate.name.clone(),
            version: pair.certificate.version.clone(),
            pem: pair.certificate.pem.clone(),
        }
    }
}

/// What the certificate store should look like after this transaction
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Certificates whose repository is active
    pub install: Vec<PlannedCertificate>,
    /// Product id to the active repositories providing it
    pub repo_map: BTreeMap<String, Vec<String>>,
    /// Certificates found in repositories no installed package came from
    pub inactive: Vec<PlannedCertificate>,
    pub active_repositories: BTreeSet<String>,
}

impl ReconcilePlan {
    pub fn build(pairs: &[CertificateRepoPair], active: &BTreeSet<String>) -> Self {
        let mut plan = Self {
            active_repositories: active.clone(),
            ..Self::default()
        };
        let mut seen = BTreeSet::new();
        let mut repo_map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for pair in pairs {
            let planned = PlannedCertificate::from(pair);
            if !active.contains(&pair.repo_id) {
                debug!(
                    "Product {} from inactive repository {}",
                    planned.product_id, planned.repo_id
                );
                plan.inactive.push(planned);
                continue;
            }

            repo_map
                .entry(planned.product_id.clone())
                .or_default()
                .insert(planned.repo_id.clone());
            if seen.insert((planned.product_id.clone(), planned.repo_id.clone())) {
                plan.install.push(planned);
            }
        }

        plan.repo_map = repo_map
            .into_iter()
            .map(|(product, repos)| (product, repos.into_iter().collect()))
            .collect();
        plan
    }

    /// Product ids that would be installed
    pub fn products(&self) -> BTreeSet<&str> {
        self.repo_map.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.install.is_empty()
    }
}

/// Applies a reconciliation plan to a certificate store
pub trait CertificateManager {
    fn update(&self, plan: &ReconcilePlan) -> Result<()>;
}

impl<T: CertificateManager + ?Sized> CertificateManager for &T {
    fn update(&self, plan: &ReconcilePlan) -> Result<()> {
        (**self).update(plan)
    }
}

/// Dry-run manager: logs the plan and keeps the last one it was given
#[derive(Debug, Default)]
pub struct PlanReporter {
    last: RefCell<Option<ReconcilePlan>>,
}

impl PlanReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_plan(&self) -> Option<ReconcilePlan> {
        self.last.borrow().clone()
    }
}

impl CertificateManager for PlanReporter {
    fn update(&self, plan: &ReconcilePlan) -> Result<()> {
        for cert in &plan.install {
            info!(
                "Product {} ({}) provided by active repository {}",
                cert.product_id,
                cert.name.as_deref().unwrap_or("unnamed"),
                cert.repo_id
            );
        }
        for cert in &plan.inactive {
            debug!(
                "Skipping product {}: repository {} is not active",
                cert.product_id, cert.repo_id
            );
        }
        *self.last.borrow_mut() = Some(plan.clone());
        Ok(())
    }
}
