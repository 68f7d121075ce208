// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use productid::certificate::PRODUCT_OID_PREFIX;
use productid::{
    AvailablePackage, InstalledIndex, InstalledPackage, PackageDatabase, Repository, Result,
};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use url::Url;

#[path = "../../src/certificate/test_support.rs"]
mod certificates;

pub use certificates::{gzip, named_product_pem};

/// Create a file:// repository under `root/<id>`
///
/// With `artifact`, the repository's repomd.xml lists a productid record
/// pointing at those bytes.
pub fn local_repo(root: &Path, id: &str, artifact: Option<&[u8]>) -> Repository {
    let dir = root.join(id);
    fs::create_dir_all(dir.join("repodata")).unwrap();

    let mut repomd = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<repomd xmlns="http://linux.duke.edu/metadata/repo">
  <data type="primary">
    <location href="repodata/0000-primary.xml.gz"/>
  </data>
"#,
    );
    if let Some(bytes) = artifact {
        fs::write(dir.join("repodata/1111-productid.gz"), bytes).unwrap();
        repomd.push_str(
            r#"  <data type="productid">
    <location href="repodata/1111-productid.gz"/>
  </data>
"#,
        );
    }
    repomd.push_str("</repomd>\n");
    fs::write(dir.join("repodata/repomd.xml"), repomd).unwrap();

    Repository::new(id).with_baseurl(Url::from_directory_path(&dir).unwrap().to_string())
}

/// Repository whose baseurl points nowhere
pub fn unreachable_repo(root: &Path, id: &str) -> Repository {
    let missing = root.join("missing").join(id);
    Repository::new(id).with_baseurl(Url::from_directory_path(missing).unwrap().to_string())
}

pub fn installed(keys: &[(&str, &str)]) -> InstalledIndex {
    keys.iter()
        .map(|(name, arch)| InstalledPackage {
            name: name.to_string(),
            arch: arch.to_string(),
            epoch: None,
            version: "1.0".to_string(),
            release: "1.el9".to_string(),
        })
        .collect()
}

/// In-memory package database counting expensive reloads
#[derive(Default)]
pub struct MemoryDb {
    pub installed: Vec<(&'static str, &'static str)>,
    pub live: Vec<AvailablePackage>,
    pub all: Vec<AvailablePackage>,
    pub reloads: Cell<u32>,
}

impl PackageDatabase for MemoryDb {
    fn installed(&self) -> Result<InstalledIndex> {
        Ok(installed(&self.installed))
    }

    fn available(&self) -> Result<Vec<AvailablePackage>> {
        Ok(self.live.clone())
    }

    fn load_all_available(&self) -> Result<Vec<AvailablePackage>> {
        self.reloads.set(self.reloads.get() + 1);
        Ok(self.all.clone())
    }
}
