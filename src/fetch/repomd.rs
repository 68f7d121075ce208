// src/fetch/repomd.rs

//! Minimal `repodata/repomd.xml` reader
//!
//! Only record lookup by type is needed: the productid artifact is listed as
//! `<data type="productid"><location href="repodata/...-productid.gz"/></data>`.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Record type carrying the product certificate
pub const PRODUCTID_RECORD: &str = "productid";

/// Find the `location href` of the record with the given `type`
///
/// Returns `Ok(None)` when the repository does not carry such a record.
pub fn find_record_location(xml: &str, record_type: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_record = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"data" => {
                in_record = attribute(&e, b"type")?.as_deref() == Some(record_type);
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"data" => {
                in_record = false;
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if in_record && e.local_name().as_ref() == b"location" =>
            {
                return attribute(&e, b"href");
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(Error::ParseError(format!(
                    "Invalid repomd.xml at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::ParseError(format!("Invalid attribute: {e}")))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::ParseError(format!("Invalid attribute value: {e}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPOMD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<repomd xmlns="http://linux.duke.edu/metadata/repo" xmlns:rpm="http://linux.duke.edu/metadata/rpm">
  <revision>1728000000</revision>
  <data type="primary">
    <checksum type="sha256">aaaa</checksum>
    <location href="repodata/aaaa-primary.xml.gz"/>
    <size>1234</size>
  </data>
  <data type="productid">
    <checksum type="sha256">bbbb</checksum>
    <location href="repodata/bbbb-productid.gz"/>
  </data>
</repomd>
"#;

    #[test]
    fn test_find_productid_location() {
        assert_eq!(
            find_record_location(REPOMD, PRODUCTID_RECORD).unwrap().as_deref(),
            Some("repodata/bbbb-productid.gz")
        );
        assert_eq!(
            find_record_location(REPOMD, "primary").unwrap().as_deref(),
            Some("repodata/aaaa-primary.xml.gz")
        );
    }

    #[test]
    fn test_missing_record() {
        assert_eq!(find_record_location(REPOMD, "updateinfo").unwrap(), None);
    }

    #[test]
    fn test_malformed_repomd() {
        let result = find_record_location("<repomd><data type=\"productid\"></repomd>", "productid");
        assert!(matches!(result, Err(Error::ParseError(_))));
    }
}
