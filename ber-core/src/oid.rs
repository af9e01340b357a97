use crate::error::{BerError, BerResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DOTTED_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)+$").expect("static OID pattern"));

/// ASN.1 OBJECT IDENTIFIER
///
/// An ordered sequence of unsigned arcs such as `1.2.840.113549`. The first
/// two arcs are restricted by the BER encoding, which folds them into a single
/// subidentifier `40 * arc1 + arc2`:
/// - `arc1` must be 0, 1 or 2
/// - `arc2` must be below 40 unless `arc1` is 2
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct ObjectIdentifier {
    arcs: Vec<u64>,
}

impl ObjectIdentifier {
    /// Create an object identifier from its arcs
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if there are fewer than two arcs or the first
    /// pair is out of range.
    pub fn new(arcs: Vec<u64>) -> BerResult<Self> {
        if arcs.len() < 2 {
            return Err(BerError::InvalidData(format!(
                "Object identifier needs at least 2 arcs, got {}",
                arcs.len()
            )));
        }
        if arcs[0] > 2 {
            return Err(BerError::InvalidData(format!(
                "First OID arc must be 0, 1 or 2, got {}",
                arcs[0]
            )));
        }
        if arcs[0] < 2 && arcs[1] >= 40 {
            return Err(BerError::InvalidData(format!(
                "Second OID arc must be below 40 when the first is {}, got {}",
                arcs[0], arcs[1]
            )));
        }
        if arcs[1].checked_add(40 * arcs[0]).is_none() {
            return Err(BerError::InvalidData("OID arc too large".to_string()));
        }

        Ok(Self { arcs })
    }

    /// Parse the dotted text form, e.g. `"0.4.5.1888"`
    pub fn from_string(s: &str) -> BerResult<Self> {
        if !DOTTED_FORM.is_match(s) {
            return Err(BerError::InvalidData(format!("Invalid OID format: {}", s)));
        }

        let arcs = s
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| BerError::InvalidData(format!("Invalid OID arc: {}", part)))
            })
            .collect::<BerResult<Vec<_>>>()?;

        Self::new(arcs)
    }

    /// The arcs in order
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Number of arcs
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Always false; an object identifier has at least two arcs
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// The first subidentifier on the wire, `40 * arc1 + arc2`
    pub fn first_subidentifier(&self) -> u64 {
        40 * self.arcs[0] + self.arcs[1]
    }

    /// Rebuild the arcs from decoded subidentifiers
    ///
    /// The first subidentifier is split back into two arcs: below 40 is
    /// `0.x`, below 80 is `1.(x - 40)`, anything else is `2.(x - 80)`.
    pub fn from_subidentifiers(subids: &[u64]) -> BerResult<Self> {
        let (&first, rest) = subids
            .split_first()
            .ok_or_else(|| BerError::InvalidData("Empty object identifier".to_string()))?;

        let (arc1, arc2) = match first {
            0..=39 => (0, first),
            40..=79 => (1, first - 40),
            _ => (2, first - 80),
        };

        let mut arcs = Vec::with_capacity(subids.len() + 1);
        arcs.push(arc1);
        arcs.push(arc2);
        arcs.extend_from_slice(rest);

        Ok(Self { arcs })
    }
}

impl TryFrom<Vec<u64>> for ObjectIdentifier {
    type Error = BerError;

    fn try_from(arcs: Vec<u64>) -> Result<Self, Self::Error> {
        Self::new(arcs)
    }
}

impl From<ObjectIdentifier> for Vec<u64> {
    fn from(oid: ObjectIdentifier) -> Self {
        oid.arcs
    }
}

impl FromStr for ObjectIdentifier {
    type Err = BerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_from_string() {
        let oid = ObjectIdentifier::from_string("1.2.840.113549").unwrap();
        assert_eq!(oid.arcs(), &[1, 2, 840, 113549]);
    }

    #[test]
    fn test_oid_display() {
        let oid = ObjectIdentifier::new(vec![0, 10, 5, 1888, 234, 324234]).unwrap();
        assert_eq!(oid.to_string(), "0.10.5.1888.234.324234");
    }

    #[test]
    fn test_oid_rejects_bad_first_pair() {
        assert!(ObjectIdentifier::new(vec![3, 1]).is_err());
        assert!(ObjectIdentifier::new(vec![1, 40]).is_err());
        assert!(ObjectIdentifier::new(vec![2, 981]).is_ok());
        assert!(ObjectIdentifier::new(vec![1]).is_err());
    }

    #[test]
    fn test_oid_rejects_malformed_text() {
        assert!(ObjectIdentifier::from_string("1").is_err());
        assert!(ObjectIdentifier::from_string("1..2").is_err());
        assert!(ObjectIdentifier::from_string("1.2.x").is_err());
        assert!("".parse::<ObjectIdentifier>().is_err());
    }

    #[test]
    fn test_oid_split_first_subidentifier() {
        let oid = ObjectIdentifier::from_subidentifiers(&[1061, 7]).unwrap();
        assert_eq!(oid.to_string(), "2.981.7");

        let oid = ObjectIdentifier::from_subidentifiers(&[43]).unwrap();
        assert_eq!(oid.to_string(), "1.3");
    }
}
