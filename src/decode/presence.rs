use crate::decode::Record;

/// Decoder for space-delimited presence-sensor lines: `id time signal`.
#[derive(Debug, Clone, Default)]
pub struct PresenceDecoder;

impl PresenceDecoder {
    /// Decode one line, or `None` if it does not have exactly three fields
    /// with a numeric timestamp and signal.
    pub fn decode(&self, line: &str) -> Option<Record> {
        let mut fields = line.split_whitespace();
        let entity_id = fields.next()?;
        let timestamp = fields.next()?.parse::<f64>().ok()?;
        let signal = fields.next()?.parse::<u8>().ok()?;
        if fields.next().is_some() {
            return None;
        }

        Some(Record {
            entity_id: entity_id.to_string(),
            timestamp,
            signal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_line() {
        let record = PresenceDecoder.decode("NB-L1 1686812400.25 1").unwrap();
        assert_eq!(record.entity_id, "NB-L1");
        assert_eq!(record.timestamp, 1686812400.25);
        assert_eq!(record.signal, 1);
    }

    #[test]
    fn tolerates_extra_whitespace() {
        let record = PresenceDecoder.decode("  SB-L2   1686812401   0  ").unwrap();
        assert_eq!(record.entity_id, "SB-L2");
        assert_eq!(record.signal, 0);
    }

    #[test]
    fn rejects_malformed_lines() {
        // Truncated final line.
        assert!(PresenceDecoder.decode("NB-L1 16868").is_none());
        // Non-numeric timestamp.
        assert!(PresenceDecoder.decode("NB-L1 yesterday 1").is_none());
        // Non-numeric signal.
        assert!(PresenceDecoder.decode("NB-L1 1686812400 on").is_none());
        // Too many fields.
        assert!(PresenceDecoder.decode("NB-L1 1686812400 1 extra").is_none());
        // Empty line.
        assert!(PresenceDecoder.decode("").is_none());
    }
}
