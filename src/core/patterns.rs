//! Pattern-pair file reader.
//!
//! Rows are `name` followed by `ninputs` input values and `noutputs`
//! target values. Value tokens accept the legacy shorthand `+` (1.0),
//! `-` (-1.0) and `.` (0.0) besides plain decimal numbers. A negative
//! target is the "don't care" sentinel: that output unit contributes
//! nothing to error or gradient.

use std::fs;
use std::path::Path;

use crate::error::{BpError, Result};

/// An ordered set of named input/target pattern pairs.
#[derive(Debug, Clone, Default)]
pub struct PatternPairs {
    pub names: Vec<String>,
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
}

impl PatternPairs {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn from_file(path: impl AsRef<Path>, ninputs: usize, noutputs: usize) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, ninputs, noutputs)
    }

    pub fn parse(text: &str, ninputs: usize, noutputs: usize) -> Result<Self> {
        let mut pairs = PatternPairs::default();
        let row_width = 1 + ninputs + noutputs;

        for line in text.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < row_width {
                return Err(BpError::Format(format!(
                    "pattern row {:?} too short: expected {} tokens, got {}",
                    fields[0],
                    row_width,
                    fields.len()
                )));
            }
            pairs.names.push(fields[0].to_string());
            let values: Vec<f64> = fields[1..row_width]
                .iter()
                .map(|t| parse_value(t))
                .collect::<Result<_>>()?;
            pairs.inputs.push(values[..ninputs].to_vec());
            pairs.targets.push(values[ninputs..].to_vec());
        }

        Ok(pairs)
    }
}

fn parse_value(token: &str) -> Result<f64> {
    match token {
        "+" => Ok(1.0),
        "-" => Ok(-1.0),
        "." => Ok(0.0),
        _ => token
            .parse()
            .map_err(|_| BpError::Format(format!("bad pattern value {token:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XOR_PAT: &str = "\
p00 0 0 0
p01 0 1 1
p10 1 0 1
p11 1 1 0
";

    #[test]
    fn reads_xor_pairs() {
        let pairs = PatternPairs::parse(XOR_PAT, 2, 1).unwrap();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs.names, vec!["p00", "p01", "p10", "p11"]);
        assert_eq!(pairs.inputs[2], vec![1.0, 0.0]);
        assert_eq!(pairs.targets[1], vec![1.0]);
    }

    #[test]
    fn shorthand_tokens() {
        let pairs = PatternPairs::parse("a + - . 1\n", 3, 1).unwrap();
        assert_eq!(pairs.inputs[0], vec![1.0, -1.0, 0.0]);
        assert_eq!(pairs.targets[0], vec![1.0]);
    }

    #[test]
    fn short_row_is_fatal() {
        let err = PatternPairs::parse("a 1 0\n", 2, 1).unwrap_err();
        assert!(matches!(err, BpError::Format(_)));
    }

    #[test]
    fn blank_lines_skipped() {
        let pairs = PatternPairs::parse("\na 0 1 1\n\n\nb 1 0 1\n", 2, 1).unwrap();
        assert_eq!(pairs.len(), 2);
    }
}
