// src/certificate.rs

//! Product certificates
//!
//! A productid artifact is a PEM certificate, usually gzip-compressed. The
//! product it identifies is encoded in the OID of its extensions:
//! `1.3.6.1.4.1.2312.9.1.<product id>.<field>`, where field 1 is the product
//! name, 2 the version and 3 the architecture.
//!
//! Only the fields needed to pair a certificate with its repository are
//! extracted; signatures and validity are not checked here.

use crate::error::{Error, Result};
use const_oid::ObjectIdentifier;
use flate2::read::GzDecoder;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::der::Decode;
use x509_cert::der::asn1::Utf8StringRef;
use x509_cert::ext::Extension;

/// OID arc under which product extensions live
pub const PRODUCT_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.2312.9.1");

/// [`PRODUCT_OID`] in dotted form, with the trailing separator
pub const PRODUCT_OID_PREFIX: &str = "1.3.6.1.4.1.2312.9.1.";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Product identity carried by a repository's productid artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCertificate {
    pub product_id: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub arch: Option<String>,
    /// The certificate as PEM, ready to be installed by a certificate store
    pub pem: String,
}

impl ProductCertificate {
    /// Read a productid artifact from disk
    ///
    /// `Ok(None)` means the file was read but holds no usable product
    /// certificate. `Err` is reserved for I/O and decompression failures.
    pub fn from_artifact(path: &Path) -> Result<Option<Self>> {
        let raw = fs::read(path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
        let content = decompress(&raw).map_err(|e| {
            Error::IoError(format!("Failed to decompress {}: {}", path.display(), e))
        })?;

        let Ok(text) = String::from_utf8(content) else {
            debug!("{} is not a text PEM file", path.display());
            return Ok(None);
        };
        Ok(Self::from_pem(&text))
    }

    /// Extract the product certificate from PEM text
    pub fn from_pem(text: &str) -> Option<Self> {
        let blocks = match pem::parse_many(text) {
            Ok(blocks) => blocks,
            Err(e) => {
                debug!("Unable to parse PEM: {}", e);
                return None;
            }
        };

        let Some(block) = blocks.iter().find(|block| block.tag() == "CERTIFICATE") else {
            debug!("No CERTIFICATE block in artifact");
            return None;
        };

        let cert = match Certificate::from_der(block.contents()) {
            Ok(cert) => cert,
            Err(e) => {
                debug!("Failed to read content of certificate: {}", e);
                return None;
            }
        };

        let extensions = cert.tbs_certificate.extensions.unwrap_or_default();
        let Some(product_id) = extensions.iter().find_map(product_id_of) else {
            debug!("Product OID {} not found", PRODUCT_OID_PREFIX);
            return None;
        };
        debug!("ID of product certificate: {}", product_id);

        let field = |n: u32| {
            let oid = format!("{PRODUCT_OID_PREFIX}{product_id}.{n}");
            extensions
                .iter()
                .find(|ext| ext.extn_id.to_string() == oid)
                .and_then(extension_text)
        };

        Some(Self {
            name: field(1),
            version: field(2),
            arch: field(3),
            pem: pem::encode(block),
            product_id,
        })
    }
}

impl fmt::Display for ProductCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product_id)?;
        if let Some(name) = &self.name {
            write!(f, " ({}", name)?;
            if let Some(version) = &self.version {
                write!(f, " {}", version)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

fn decompress(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return Ok(raw.to_vec());
    }
    let mut out = Vec::new();
    GzDecoder::new(raw).read_to_end(&mut out)?;
    Ok(out)
}

/// Product id from an extension OID under the product arc
fn product_id_of(ext: &Extension) -> Option<String> {
    let mut arcs = ext.extn_id.arcs();
    if !PRODUCT_OID.arcs().all(|arc| arcs.next() == Some(arc)) {
        return None;
    }
    arcs.next().map(|id| id.to_string())
}

/// Extension payload as text (DER UTF8String, or raw UTF-8 as a fallback)
fn extension_text(ext: &Extension) -> Option<String> {
    let bytes = ext.extn_value.as_bytes();
    if let Ok(s) = Utf8StringRef::from_der(bytes) {
        return Some(s.as_str().to_string());
    }
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests {
    use super::test_support::{cert_pem, product_artifact, product_pem, text_extension};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_pem_extracts_product_fields() {
        let cert = ProductCertificate::from_pem(&product_pem("479")).unwrap();
        assert_eq!(cert.product_id, "479");
        assert_eq!(cert.name.as_deref(), Some("Red Hat Enterprise Linux for x86_64"));
        assert_eq!(cert.version.as_deref(), Some("9.4"));
        assert_eq!(cert.arch.as_deref(), Some("x86_64"));
        assert!(cert.pem.contains("BEGIN CERTIFICATE"));
        assert_eq!(cert.to_string(), "479 (Red Hat Enterprise Linux for x86_64 9.4)");
    }

    #[test]
    fn test_from_pem_without_product_oid() {
        let pem = cert_pem(vec![text_extension("1.3.6.1.4.1.9999.1.2", "other")]);
        assert_eq!(ProductCertificate::from_pem(&pem), None);
    }

    #[test]
    fn test_from_pem_garbage() {
        assert_eq!(ProductCertificate::from_pem(""), None);
        assert_eq!(ProductCertificate::from_pem("hello"), None);
        let bogus = pem::encode(&pem::Pem::new("CERTIFICATE", vec![1, 2, 3]));
        assert_eq!(ProductCertificate::from_pem(&bogus), None);
    }

    #[test]
    fn test_from_artifact_gzip_and_plain() {
        let dir = TempDir::new().unwrap();
        let pem = product_pem("69");

        let plain = dir.path().join("productid");
        fs::write(&plain, &pem).unwrap();
        assert_eq!(
            ProductCertificate::from_artifact(&plain).unwrap().unwrap().product_id,
            "69"
        );

        let gz = dir.path().join("productid.gz");
        fs::write(&gz, product_artifact("69")).unwrap();
        assert_eq!(
            ProductCertificate::from_artifact(&gz).unwrap().unwrap().product_id,
            "69"
        );
    }

    #[test]
    fn test_from_artifact_empty_file_is_unparseable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("productid");
        fs::write(&path, b"").unwrap();
        assert_eq!(ProductCertificate::from_artifact(&path).unwrap(), None);
    }

    #[test]
    fn test_from_artifact_truncated_gzip_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("productid.gz");
        fs::write(&path, [0x1f, 0x8b, 0x08, 0x00]).unwrap();
        assert!(ProductCertificate::from_artifact(&path).is_err());
    }

    #[test]
    fn test_from_artifact_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(ProductCertificate::from_artifact(&dir.path().join("missing")).is_err());
    }
}
