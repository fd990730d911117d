//! Zone publishing.
//!
//! Publishing a validated record set is delegated to a [`ZonePublisher`]
//! backend. The crate ships a single backend, [`ZoneFileWriter`], which
//! prints zone-file style lines instead of changing a live zone; hosted DNS
//! providers plug in by implementing the trait.

use std::io::Write;

use crate::error_handling::PublishError;
use crate::spf::TxtRecordSet;

/// Longest character-string a single TXT string may carry on the wire.
const TXT_STRING_LIMIT: usize = 255;

/// A DNS zone that TXT records can be read from and written to.
pub trait ZonePublisher {
    /// Returns the current TXT value at `name`, if the zone has one.
    fn find_txt(&mut self, name: &str) -> Result<Option<String>, PublishError>;

    /// Creates or replaces the TXT record at `name`.
    fn upsert_txt(&mut self, name: &str, value: &str) -> Result<(), PublishError>;
}

/// Counts of what [`publish_records`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Records that did not exist before
    pub created: usize,
    /// Records whose previous value was replaced
    pub updated: usize,
}

/// Publishes every record of `records` through `publisher`, in set order.
///
/// Must only be called with a set that passed validation. Stops at the
/// first failure; records already written stay written.
///
/// # Errors
///
/// Returns the first [`PublishError`] reported by the backend.
pub fn publish_records<P: ZonePublisher + ?Sized>(
    publisher: &mut P,
    records: &TxtRecordSet,
) -> Result<PublishSummary, PublishError> {
    let mut summary = PublishSummary::default();

    for (name, value) in records.iter() {
        match publisher.find_txt(name)? {
            Some(existing) => {
                log::info!("Updating TXT record {name} (was: {existing})");
                summary.updated += 1;
            }
            None => {
                log::info!("Creating TXT record {name}");
                summary.created += 1;
            }
        }
        publisher.upsert_txt(name, value)?;
    }

    Ok(summary)
}

/// Dry-run publisher writing `<name>\tTXT\t"<value>"` lines.
///
/// It never knows of existing records, so every record is reported as
/// created. Values longer than one TXT string are emitted as several quoted
/// strings separated by spaces.
#[derive(Debug)]
pub struct ZoneFileWriter<W: Write> {
    out: W,
}

impl<W: Write> ZoneFileWriter<W> {
    /// Creates a writer emitting to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ZonePublisher for ZoneFileWriter<W> {
    fn find_txt(&mut self, _name: &str) -> Result<Option<String>, PublishError> {
        Ok(None)
    }

    fn upsert_txt(&mut self, name: &str, value: &str) -> Result<(), PublishError> {
        writeln!(self.out, "{name}\tTXT\t{}", quote_txt(value)).map_err(|source| {
            PublishError::Io {
                name: name.to_string(),
                source,
            }
        })
    }
}

/// Quotes `value` as one or more TXT character-strings.
pub fn quote_txt(value: &str) -> String {
    let mut strings = Vec::new();
    let mut rest = value;
    while !rest.is_empty() {
        let mut end = rest.len().min(TXT_STRING_LIMIT);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (chunk, tail) = rest.split_at(end);
        strings.push(format!("\"{}\"", chunk.replace('\\', "\\\\").replace('"', "\\\"")));
        rest = tail;
    }
    if strings.is_empty() {
        return "\"\"".to_string();
    }
    strings.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Zone held in memory, optionally refusing writes.
    #[derive(Default)]
    struct MemoryZone {
        records: HashMap<String, String>,
        read_only: bool,
    }

    impl ZonePublisher for MemoryZone {
        fn find_txt(&mut self, name: &str) -> Result<Option<String>, PublishError> {
            Ok(self.records.get(name).cloned())
        }

        fn upsert_txt(&mut self, name: &str, value: &str) -> Result<(), PublishError> {
            if self.read_only {
                return Err(PublishError::Rejected {
                    name: name.to_string(),
                    message: "zone is read-only".to_string(),
                });
            }
            self.records.insert(name.to_string(), value.to_string());
            Ok(())
        }
    }

    fn sample_set() -> TxtRecordSet {
        let mut records = TxtRecordSet::new();
        records.insert("_spf1.example.net", "v=spf1 ip4:192.0.2.0/24 ~all");
        records.insert("example.net", "v=spf1 include:_spf1.example.net ~all");
        records
    }

    #[test]
    fn test_publish_counts_created_and_updated() {
        let mut zone = MemoryZone::default();
        zone.records
            .insert("example.net".to_string(), "v=spf1 -all".to_string());

        let summary = publish_records(&mut zone, &sample_set()).unwrap();

        assert_eq!(summary, PublishSummary { created: 1, updated: 1 });
        assert_eq!(
            zone.records["example.net"],
            "v=spf1 include:_spf1.example.net ~all"
        );
        assert_eq!(zone.records["_spf1.example.net"], "v=spf1 ip4:192.0.2.0/24 ~all");
    }

    #[test]
    fn test_publish_stops_at_rejection() {
        let mut zone = MemoryZone {
            read_only: true,
            ..Default::default()
        };

        let err = publish_records(&mut zone, &sample_set()).unwrap_err();
        assert!(matches!(err, PublishError::Rejected { ref name, .. } if name == "_spf1.example.net"));
        assert!(zone.records.is_empty());
    }

    #[test]
    fn test_zone_file_writer_output() {
        let mut writer = ZoneFileWriter::new(Vec::new());
        let summary = publish_records(&mut writer, &sample_set()).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();

        assert_eq!(summary.created, 2);
        assert_eq!(
            output,
            "_spf1.example.net\tTXT\t\"v=spf1 ip4:192.0.2.0/24 ~all\"\n\
             example.net\tTXT\t\"v=spf1 include:_spf1.example.net ~all\"\n"
        );
    }

    #[test]
    fn test_quote_txt_splits_long_values() {
        let value = "a".repeat(300);
        let quoted = quote_txt(&value);

        assert_eq!(quoted, format!("\"{}\" \"{}\"", "a".repeat(255), "a".repeat(45)));
        assert_eq!(quote_txt(""), "\"\"");
        assert_eq!(quote_txt("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
