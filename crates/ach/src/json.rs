//! JSON interchange of the in-memory model.
//!
//! The document mirrors [`File`] one-to-one: `fileHeader`, `batches`
//! (`batchHeader`, `entryDetails`, `batchControl`, ADV variants),
//! `IATBatches`, `fileControl` and the optional `fileADVControl`. Decoding
//! errors name the JSON path of the offending value.

use crate::{
    error::{Error, Result},
    file::File,
};

/// Decodes a file from a JSON document.
///
/// The options stored under `validateOpts` are applied to every batch. The
/// control records are taken as they are; call [`File::create`] to
/// recompute them or [`File::validate`] to check them.
pub fn from_json(bytes: &[u8]) -> Result<File> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let mut file: File = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        Error::Json { path: e.path().to_string(), message: e.inner().to_string() }
    })?;
    deserializer
        .end()
        .map_err(|e| Error::Json { path: String::new(), message: e.to_string() })?;
    let opts = *file.validation();
    file.set_validation(opts);
    Ok(file)
}

/// Encodes a file as compact JSON.
pub fn to_json(file: &File) -> Result<Vec<u8>> {
    serde_json::to_vec(file)
        .map_err(|e| Error::Json { path: String::new(), message: e.to_string() })
}

/// Encodes a file as indented JSON.
pub fn to_json_pretty(file: &File) -> Result<String> {
    serde_json::to_string_pretty(file)
        .map_err(|e| Error::Json { path: String::new(), message: e.to_string() })
}

impl File {
    /// See [`from_json`].
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        from_json(bytes)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        to_json(self)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        to_json_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ConsistencyError,
        file::tests::{file_header, ppd_file},
    };

    #[test]
    fn test_roundtrip() {
        let file = ppd_file();
        let json = file.to_json().unwrap();
        let back = File::from_json(&json).unwrap();
        assert_eq!(back, file);
        assert!(back.validate().is_ok());

        let pretty = file.to_json_pretty().unwrap();
        assert_eq!(File::from_json(pretty.as_bytes()).unwrap(), file);
    }

    #[test]
    fn test_field_path_in_error() {
        let json = r#"{"batches":[{"batchHeader":{"standardEntryClassCode":"PPD"},
            "entryDetails":[{"amount":"ten"}]}]}"#;
        let err = from_json(json.as_bytes()).unwrap_err();
        match err {
            Error::Json { path, .. } => assert_eq!(path, "batches[0].entryDetails[0].amount"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_sec_in_json() {
        let json = r#"{"batches":[{"batchHeader":{"standardEntryClassCode":"ZZZ"}}]}"#;
        let err = from_json(json.as_bytes()).unwrap_err();
        match err {
            Error::Json { path, message } => {
                assert_eq!(path, "batches[0]");
                let expected = ConsistencyError::UnknownSec("ZZZ".to_string()).to_string();
                assert!(message.starts_with(&expected), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_adv_entries_in_standard_batch() {
        let json = r#"{"batches":[{"batchHeader":{"standardEntryClassCode":"PPD"},
            "advEntryDetails":[{"amount":10}]}]}"#;
        let err = from_json(json.as_bytes()).unwrap_err();
        match err {
            Error::Json { path, message } => {
                assert_eq!(path, "batches[0]");
                assert!(message.starts_with("advEntryDetails does not belong"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let json = r#"{"batches":[{"batchHeader":{"standardEntryClassCode":"ADV"},
            "entryDetails":[{"amount":10}]}]}"#;
        assert!(matches!(from_json(json.as_bytes()), Err(Error::Json { .. })));
    }

    #[test]
    fn test_garbage_input() {
        let inputs: [&[u8]; 7] =
            [b"000", b"", b"{", b"[1,2]", b"\xff\xfe", b"{} trailing", &[0u8; 16]];
        for input in inputs {
            assert!(matches!(from_json(input), Err(Error::Json { .. })));
        }
    }

    #[test]
    fn test_validate_opts_applied() {
        let json = r#"{"validateOpts":{"allowZeroBatches":true}}"#;
        let mut file = from_json(json.as_bytes()).unwrap();
        assert!(file.validation().allow_zero_batches);
        file.file_header = file_header();
        assert!(file.create().is_ok());
    }
}
