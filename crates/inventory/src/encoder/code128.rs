//! Code 128 (code set B) symbology.
//!
//! A symbol is a sequence of element widths in modules, alternating bar and
//! space and always starting with a bar. Every character symbol is 6 elements
//! spanning 11 modules; the stop symbol is 7 elements spanning 13 modules.

use depot_core::{DomainError, DomainResult};

/// Start symbol for code set B.
pub(crate) const START_B: u8 = 104;

/// Checksum modulus defined by the symbology.
const CHECKSUM_MODULUS: u32 = 103;

/// Lowest and highest characters representable in code set B without shifts.
const FIRST_CHAR: u8 = b' ';
const LAST_CHAR: u8 = b'~';

const STOP_PATTERN: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

/// Bar/space widths for symbol values 0..=105.
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2],
    [2, 2, 2, 1, 2, 2],
    [2, 2, 2, 2, 2, 1],
    [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2],
    [1, 2, 2, 2, 1, 3],
    [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2],
    [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2],
    [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2],
    [1, 2, 2, 1, 3, 2],
    [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2],
    [1, 2, 3, 2, 2, 1],
    [2, 2, 3, 2, 1, 1],
    [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1],
    [2, 1, 3, 2, 1, 2],
    [2, 2, 3, 1, 1, 2],
    [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2],
    [3, 2, 1, 2, 2, 1],
    [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2],
    [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3],
    [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1],
    [1, 1, 1, 3, 2, 3],
    [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3],
    [1, 3, 2, 1, 1, 3],
    [1, 3, 2, 3, 1, 1],
    [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3],
    [2, 3, 1, 3, 1, 1],
    [1, 1, 2, 1, 3, 3],
    [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3],
    [1, 1, 3, 3, 2, 1],
    [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1],
    [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1],
    [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1],
    [2, 1, 3, 1, 3, 1],
    [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1],
    [3, 1, 2, 1, 1, 3],
    [3, 1, 2, 3, 1, 1],
    [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1],
    [2, 2, 1, 4, 1, 1],
    [4, 3, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4],
    [1, 2, 1, 4, 2, 1],
    [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1],
    [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2],
    [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1],
    [1, 4, 2, 1, 1, 2],
    [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4],
    [4, 1, 3, 1, 1, 1],
    [2, 4, 1, 1, 1, 2],
    [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2],
    [1, 2, 1, 1, 4, 2],
    [1, 2, 1, 2, 4, 1],
    [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1],
    [4, 1, 1, 2, 1, 2],
    [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1],
    [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1],
    [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3],
    [1, 1, 1, 3, 4, 1],
    [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1],
    [4, 1, 1, 1, 1, 3],
    [4, 1, 1, 3, 1, 1],
    [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1],
    [3, 1, 1, 1, 4, 1],
    [4, 1, 1, 1, 3, 1],
    [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2],
];

/// Map a payload to its symbol values: start, data, checksum.
///
/// Only printable ASCII is accepted; control characters would need code set A
/// shifts that scanners in the field are not configured for.
pub(crate) fn symbol_values(payload: &str, max_len: usize) -> DomainResult<Vec<u8>> {
    if payload.is_empty() {
        return Err(DomainError::encoding("payload cannot be empty"));
    }
    let len = payload.chars().count();
    if len > max_len {
        return Err(DomainError::encoding(format!(
            "payload is {len} characters, maximum is {max_len}"
        )));
    }

    let mut values = Vec::with_capacity(len + 2);
    values.push(START_B);
    for (pos, ch) in payload.chars().enumerate() {
        let byte = u8::try_from(ch)
            .ok()
            .filter(|b| (FIRST_CHAR..=LAST_CHAR).contains(b))
            .ok_or_else(|| {
                DomainError::encoding(format!(
                    "unsupported character {ch:?} at position {pos}"
                ))
            })?;
        values.push(byte - FIRST_CHAR);
    }
    values.push(checksum(&values[1..]));
    Ok(values)
}

fn checksum(data: &[u8]) -> u8 {
    let weighted = data
        .iter()
        .enumerate()
        .fold(u32::from(START_B), |acc, (i, v)| {
            acc + (i as u32 + 1) * u32::from(*v)
        });
    (weighted % CHECKSUM_MODULUS) as u8
}

/// Element widths for the full symbol, stop pattern included.
pub(crate) fn element_widths(payload: &str, max_len: usize) -> DomainResult<Vec<u8>> {
    let values = symbol_values(payload, max_len)?;
    let mut widths = Vec::with_capacity(values.len() * 6 + STOP_PATTERN.len());
    for v in values {
        widths.extend_from_slice(&PATTERNS[usize::from(v)]);
    }
    widths.extend_from_slice(&STOP_PATTERN);
    Ok(widths)
}

/// Total width of a symbol in modules, quiet zones excluded.
pub(crate) fn module_count(widths: &[u8]) -> u32 {
    widths.iter().map(|w| u32::from(*w)).sum()
}

/// Decode element widths back into the payload, verifying start, checksum and stop.
pub(crate) fn decode_widths(widths: &[u8]) -> DomainResult<String> {
    let stop_len = STOP_PATTERN.len();
    // start + at least one data symbol + checksum + stop
    if widths.len() < 6 * 3 + stop_len || (widths.len() - stop_len) % 6 != 0 {
        return Err(DomainError::encoding(format!(
            "malformed symbol: {} elements",
            widths.len()
        )));
    }

    let (body, stop) = widths.split_at(widths.len() - stop_len);
    if stop != STOP_PATTERN {
        return Err(DomainError::encoding("missing stop pattern"));
    }

    let values = body
        .chunks_exact(6)
        .map(lookup)
        .collect::<DomainResult<Vec<u8>>>()?;

    let (start, rest) = values
        .split_first()
        .ok_or_else(|| DomainError::encoding("missing start symbol"))?;
    if *start != START_B {
        return Err(DomainError::encoding(format!(
            "unsupported start symbol {start}"
        )));
    }
    let (check, data) = rest
        .split_last()
        .ok_or_else(|| DomainError::encoding("missing checksum"))?;
    if checksum(data) != *check {
        return Err(DomainError::encoding("checksum mismatch"));
    }

    data.iter()
        .map(|v| {
            let byte = v + FIRST_CHAR;
            if (FIRST_CHAR..=LAST_CHAR).contains(&byte) {
                Ok(char::from(byte))
            } else {
                Err(DomainError::encoding(format!("unsupported symbol value {v}")))
            }
        })
        .collect()
}

fn lookup(chunk: &[u8]) -> DomainResult<u8> {
    PATTERNS
        .iter()
        .position(|p| p.as_slice() == chunk)
        .map(|v| v as u8)
        .ok_or_else(|| DomainError::encoding(format!("unknown symbol pattern {chunk:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_pattern_spans_eleven_modules_and_is_unique() {
        let mut seen = HashSet::new();
        for (value, pattern) in PATTERNS.iter().enumerate() {
            assert_eq!(module_count(pattern), 11, "value {value}");
            assert!(seen.insert(*pattern), "duplicate pattern at value {value}");
        }
        assert_eq!(module_count(&STOP_PATTERN), 13);
    }

    #[test]
    fn checksum_is_weighted_sum_mod_103() {
        // 104 + 48*1 + 42*2 + 42*3 + 17*4 + 18*5 + 19*6 + 35*7 = 879; 879 % 103 = 55
        let values = symbol_values("PJJ123C", 128).unwrap();
        assert_eq!(values.first(), Some(&START_B));
        assert_eq!(values.last(), Some(&55));
        assert_eq!(values.len(), 9);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let widths = element_widths("Drill-Bob-2026-10-18T09:15:02.123Z", 128).unwrap();
        assert_eq!(
            decode_widths(&widths).unwrap(),
            "Drill-Bob-2026-10-18T09:15:02.123Z"
        );
    }

    #[test]
    fn rejects_non_ascii_and_control_characters() {
        let err = symbol_values("Bohrmaschine Ü", 128).unwrap_err();
        assert!(matches!(err, DomainError::Encoding(_)));

        let err = symbol_values("tab\there", 128).unwrap_err();
        assert!(matches!(err, DomainError::Encoding(_)));
    }

    #[test]
    fn rejects_payloads_over_the_limit() {
        assert!(symbol_values("abcd", 4).is_ok());
        let err = symbol_values("abcde", 4).unwrap_err();
        assert!(matches!(err, DomainError::Encoding(_)));
    }

    #[test]
    fn corrupted_checksum_is_detected() {
        let mut widths = element_widths("ABC", 128).unwrap();
        // Swap the checksum symbol (last 6 elements before stop) for the pattern of value 0.
        let at = widths.len() - 7 - 6;
        widths[at..at + 6].copy_from_slice(&PATTERNS[0]);
        let err = decode_widths(&widths).unwrap_err();
        assert!(matches!(err, DomainError::Encoding(_)));
    }
}
