//! Joining and splitting the four record fields.

use std::fmt;
use std::str::FromStr;

use super::CodecError;

/// Separator between record fields.
pub const DELIMITER: char = '-';

const PART_COUNT: usize = 4;

/// The four text fields of a compact record.
///
/// `name` is carried verbatim. It must not contain [`DELIMITER`], otherwise
/// the assembled record splits into more than four parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    pub numeric: String,
    pub binary: String,
    pub name: String,
    pub contact: String,
}

impl EncodedRecord {
    /// Joins the fields: `numeric-binary-name-contact`.
    pub fn assemble(&self) -> String {
        [
            self.numeric.as_str(),
            self.binary.as_str(),
            self.name.as_str(),
            self.contact.as_str(),
        ]
        .join(&DELIMITER.to_string())
    }

    /// Splits a record into exactly four fields.
    pub fn disassemble(record: &str) -> Result<Self, CodecError> {
        let parts: Vec<&str> = record.split(DELIMITER).collect();
        match parts.as_slice() {
            [numeric, binary, name, contact] => Ok(Self {
                numeric: numeric.to_string(),
                binary: binary.to_string(),
                name: name.to_string(),
                contact: contact.to_string(),
            }),
            _ => Err(CodecError::WrongPartCount(parts.len())),
        }
    }
}

impl fmt::Display for EncodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.assemble())
    }
}

impl FromStr for EncodedRecord {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::disassemble(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> EncodedRecord {
        EncodedRecord {
            numeric: "abc".to_string(),
            binary: "0".to_string(),
            name: name.to_string(),
            contact: "XYZ".to_string(),
        }
    }

    #[test]
    fn test_assemble_layout() {
        assert_eq!(record("Jane Roe").assemble(), "abc-0-Jane Roe-XYZ");
        assert_eq!(record("Jane Roe").to_string(), "abc-0-Jane Roe-XYZ");
    }

    #[test]
    fn test_disassemble_inverts_assemble() {
        let original = record("José Núñez");
        assert_eq!(EncodedRecord::disassemble(&original.assemble()).unwrap(), original);
    }

    #[test]
    fn test_wrong_part_counts() {
        assert_eq!(
            "a-b-c".parse::<EncodedRecord>(),
            Err(CodecError::WrongPartCount(3))
        );
        assert_eq!(
            EncodedRecord::disassemble(&record("Mary-Jane").assemble()),
            Err(CodecError::WrongPartCount(PART_COUNT + 1))
        );
        assert_eq!(
            EncodedRecord::disassemble(""),
            Err(CodecError::WrongPartCount(1))
        );
    }
}
