// src/certificate/test_support.rs

//! Unsigned product certificates for tests
//!
//! Compiled into the library's unit tests and included by the integration
//! tests' `common` module, so both build certificates the same way.

#![allow(dead_code)]

use super::PRODUCT_OID_PREFIX;
use const_oid::ObjectIdentifier;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::time::Duration;
use x509_cert::der::Encode;
use x509_cert::der::asn1::{BitString, OctetString, UtcTime, Utf8StringRef};
use x509_cert::ext::Extension;
use x509_cert::name::RdnSequence;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

pub fn text_extension(oid: &str, value: &str) -> Extension {
    Extension {
        extn_id: ObjectIdentifier::new(oid).unwrap(),
        critical: false,
        extn_value: OctetString::new(Utf8StringRef::new(value).unwrap().to_der().unwrap())
            .unwrap(),
    }
}

pub fn cert_pem(extensions: Vec<Extension>) -> String {
    let algorithm = AlgorithmIdentifierOwned {
        oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11"),
        parameters: None,
    };
    let time = |secs| Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap());
    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[0x2a]).unwrap(),
        signature: algorithm.clone(),
        issuer: RdnSequence(Vec::new()),
        validity: Validity {
            not_before: time(1_700_000_000),
            not_after: time(1_900_000_000),
        },
        subject: RdnSequence(Vec::new()),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1"),
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(&[0u8; 16]).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(extensions),
    };
    let cert = Certificate {
        tbs_certificate: tbs,
        signature_algorithm: algorithm,
        signature: BitString::from_bytes(&[0u8; 16]).unwrap(),
    };
    pem::encode(&pem::Pem::new("CERTIFICATE", cert.to_der().unwrap()))
}

/// Product certificate for `id` with the given product name
pub fn named_product_pem(id: &str, name: &str) -> String {
    cert_pem(vec![
        text_extension(&format!("{PRODUCT_OID_PREFIX}{id}.1"), name),
        text_extension(&format!("{PRODUCT_OID_PREFIX}{id}.2"), "9.4"),
        text_extension(&format!("{PRODUCT_OID_PREFIX}{id}.3"), "x86_64"),
    ])
}

pub fn product_pem(id: &str) -> String {
    named_product_pem(id, "Red Hat Enterprise Linux for x86_64")
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Gzip-compressed product certificate, as repositories ship it
pub fn product_artifact(id: &str) -> Vec<u8> {
    gzip(product_pem(id).as_bytes())
}
