//! Network specification loader.
//!
//! The legacy format has four sections, each opened by a `name:` token and
//! closed by `end`:
//!
//! ```text
//! definitions:
//! nunits 5
//! ninputs 2
//! noutputs 1
//! end
//! network:
//! %r 2 2 0 2
//! %r 4 1 2 2
//! end
//! biases:
//! %r 2 3
//! end
//! ```
//!
//! Tokenization is pure whitespace splitting, never line based, so authors
//! may lay out the sections however they like. A `network:` block header is
//! `%<fillchar?> rstart rnum sstart snum`: with a fill character every
//! weight in the rnum x snum block uses that one code; without one, the
//! next rnum tokens are per-receiver code strings of snum characters each.
//! Bias headers are the one-dimensional `%<fillchar?> rstart rnum` shape.
//!
//! Weight codes map through the constraint table: `r` symmetric random,
//! `p` positive random, `n` negative random by default; a `constraints:`
//! section may redefine letters with a fixed value or
//! random/positive/negative/linked flags. `.` is always a fixed zero.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{BpError, Result};

/// One letter of the constraint table.
///
/// `linked` (tied weights) is parsed for compatibility but not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub value: f64,
    pub random: bool,
    pub positive: bool,
    pub negative: bool,
    pub linked: bool,
}

/// Parsed architecture: sparse connectivity plus the weight-code tables.
///
/// `first_weight_to[i]` / `num_weights_to[i]` describe the contiguous
/// sender range feeding unit `i`. Input units have `num_weights_to == 0`.
/// `wchar[i][j]` is the init code for weight `j` of receiver `i`, and
/// `bchar[i]` the code for its bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub nunits: usize,
    pub ninputs: usize,
    pub noutputs: usize,
    pub wrange: f64,
    pub first_weight_to: Vec<usize>,
    pub num_weights_to: Vec<usize>,
    pub wchar: Vec<Vec<char>>,
    pub bchar: Vec<char>,
    pub constraints: HashMap<char, Constraint>,
    pub definitions: HashMap<String, f64>,
}

impl NetworkSpec {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        parse_tokens(&tokens)
    }

    /// Total declared weight count (the flat arena size).
    pub fn total_weights(&self) -> usize {
        self.num_weights_to.iter().sum()
    }
}

fn default_constraints() -> HashMap<char, Constraint> {
    let mut map = HashMap::new();
    map.insert(
        'r',
        Constraint {
            random: true,
            ..Constraint::default()
        },
    );
    map.insert(
        'p',
        Constraint {
            random: true,
            positive: true,
            ..Constraint::default()
        },
    );
    map.insert(
        'n',
        Constraint {
            random: true,
            negative: true,
            ..Constraint::default()
        },
    );
    map
}

struct Cursor<'a> {
    tokens: &'a [&'a str],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [&'a str]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, what: &str) -> Result<&'a str> {
        self.next()
            .ok_or_else(|| BpError::Format(format!("unexpected end of input, expected {what}")))
    }

    fn expect_usize(&mut self, what: &str) -> Result<usize> {
        let t = self.expect(what)?;
        t.parse()
            .map_err(|_| BpError::Format(format!("bad integer {t:?} for {what}")))
    }

    fn expect_f64(&mut self, what: &str) -> Result<f64> {
        let t = self.expect(what)?;
        t.parse()
            .map_err(|_| BpError::Format(format!("bad number {t:?} for {what}")))
    }
}

fn parse_tokens(tokens: &[&str]) -> Result<NetworkSpec> {
    let mut cur = Cursor::new(tokens);

    let mut definitions: HashMap<String, f64> = HashMap::new();
    let mut constraints = default_constraints();
    let mut network_tokens: Vec<&str> = Vec::new();
    let mut biases_tokens: Vec<&str> = Vec::new();

    while let Some(tok) = cur.next() {
        match tok.to_ascii_lowercase().as_str() {
            "definitions:" => parse_definitions(&mut cur, &mut definitions)?,
            "constraints:" => parse_constraints(&mut cur, &mut constraints)?,
            "network:" => collect_section(&mut cur, &mut network_tokens),
            "biases:" => collect_section(&mut cur, &mut biases_tokens),
            // Stray "end" or unknown top-level tokens are skipped.
            _ => {}
        }
    }

    let nunits = definitions.get("nunits").copied().unwrap_or(0.0) as usize;
    if nunits == 0 {
        return Err(BpError::Format("missing 'nunits' in definitions".into()));
    }
    let ninputs = definitions.get("ninputs").copied().unwrap_or(0.0) as usize;
    let noutputs = definitions.get("noutputs").copied().unwrap_or(0.0) as usize;
    if ninputs + noutputs > nunits {
        return Err(BpError::Format(format!(
            "ninputs {ninputs} + noutputs {noutputs} exceed nunits {nunits}"
        )));
    }
    let wrange = definitions.get("wrange").copied().unwrap_or(1.0);

    let (first_weight_to, num_weights_to, wchar) = parse_network_section(&network_tokens, nunits)?;
    let bchar = parse_biases_section(&biases_tokens, nunits)?;

    Ok(NetworkSpec {
        nunits,
        ninputs,
        noutputs,
        wrange,
        first_weight_to,
        num_weights_to,
        wchar,
        bchar,
        constraints,
        definitions,
    })
}

fn parse_definitions(cur: &mut Cursor, definitions: &mut HashMap<String, f64>) -> Result<()> {
    while let Some(key) = cur.next() {
        if key.eq_ignore_ascii_case("end") {
            break;
        }
        let value = cur.expect_f64("definition value")?;
        definitions.insert(key.to_ascii_lowercase(), value);
    }
    Ok(())
}

fn is_number(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

fn is_constraint_flag(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "random" | "positive" | "negative" | "linked"
    )
}

/// The legacy reader consumed one line per constraint letter. With a pure
/// token stream the row boundary is recovered by looking ahead: a new row
/// starts at a single letter followed by a flag keyword or a number.
fn parse_constraints(cur: &mut Cursor, constraints: &mut HashMap<char, Constraint>) -> Result<()> {
    while let Some(letter_tok) = cur.next() {
        if letter_tok.eq_ignore_ascii_case("end") {
            break;
        }
        let letter = letter_tok
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .ok_or_else(|| BpError::Format("empty constraint letter".into()))?;

        let mut spec = Constraint::default();
        while let Some(next) = cur.peek() {
            let lower = next.to_ascii_lowercase();
            if lower == "end" || lower.ends_with(':') {
                break;
            }
            if next.len() == 1
                && next.chars().all(|c| c.is_ascii_alphabetic())
                && cur
                    .tokens
                    .get(cur.pos + 1)
                    .is_some_and(|t| is_constraint_flag(t) || is_number(t))
            {
                break;
            }
            let tok = cur.next().unwrap_or_default();
            match tok.to_ascii_lowercase().as_str() {
                "random" => spec.random = true,
                "positive" => spec.positive = true,
                "negative" => spec.negative = true,
                "linked" => spec.linked = true,
                other => {
                    if let Ok(v) = other.parse::<f64>() {
                        spec.value = v;
                    }
                }
            }
        }
        constraints.insert(letter, spec);
    }
    Ok(())
}

fn collect_section<'a>(cur: &mut Cursor<'a>, out: &mut Vec<&'a str>) {
    while let Some(tok) = cur.next() {
        if tok.eq_ignore_ascii_case("end") {
            break;
        }
        out.push(tok);
    }
}

type Connectivity = (Vec<usize>, Vec<usize>, Vec<Vec<char>>);

fn parse_network_section(tokens: &[&str], nunits: usize) -> Result<Connectivity> {
    // Units receive nothing until a block claims them. A later block that
    // names the same receiver overwrites the earlier assignment.
    let mut first_weight_to = vec![nunits; nunits];
    let mut num_weights_to = vec![0usize; nunits];
    let mut wchar: Vec<Vec<char>> = vec![Vec::new(); nunits];

    let mut cur = Cursor::new(tokens);
    let mut rstart = 0usize;
    let mut sstart = 0usize;

    while let Some(tok) = cur.next() {
        if let Some(rest) = tok.strip_prefix('%') {
            let fill = rest.chars().next();
            rstart = cur.expect_usize("rstart")?;
            let rnum = cur.expect_usize("rnum")?;
            sstart = cur.expect_usize("sstart")?;
            let snum = cur.expect_usize("snum")?;
            if sstart + snum > nunits {
                return Err(BpError::Format(format!(
                    "network block senders {sstart}..{} out of range (nunits {nunits})",
                    sstart + snum
                )));
            }

            for r in rstart..rstart + rnum {
                if r >= nunits {
                    return Err(BpError::Format(format!(
                        "network block receiver {r} out of range (nunits {nunits})"
                    )));
                }
                let row: Vec<char> = match fill {
                    Some(c) => vec![c; snum],
                    None => cur.expect("receiver code string")?.chars().collect(),
                };
                set_receiver(
                    r,
                    sstart,
                    snum,
                    &row,
                    &mut first_weight_to,
                    &mut num_weights_to,
                    &mut wchar,
                );
            }
        } else {
            // Bare code string with no % header: one full receiver row,
            // advancing the implicit receiver counter.
            if rstart >= nunits {
                return Err(BpError::Format(format!(
                    "network row receiver {rstart} out of range (nunits {nunits})"
                )));
            }
            let row: Vec<char> = tok.chars().collect();
            let snum = row.len();
            if sstart + snum > nunits {
                return Err(BpError::Format(format!(
                    "network row senders {sstart}..{} out of range (nunits {nunits})",
                    sstart + snum
                )));
            }
            set_receiver(
                rstart,
                sstart,
                snum,
                &row,
                &mut first_weight_to,
                &mut num_weights_to,
                &mut wchar,
            );
            rstart += 1;
        }
    }

    Ok((first_weight_to, num_weights_to, wchar))
}

fn set_receiver(
    r: usize,
    sstart: usize,
    snum: usize,
    row: &[char],
    first_weight_to: &mut [usize],
    num_weights_to: &mut [usize],
    wchar: &mut [Vec<char>],
) {
    first_weight_to[r] = sstart;
    num_weights_to[r] = snum;
    let mut codes: Vec<char> = row.iter().copied().take(snum).collect();
    // A short code string pads out with no-connection zeros.
    codes.resize(snum, '.');
    wchar[r] = codes;
}

fn parse_biases_section(tokens: &[&str], nunits: usize) -> Result<Vec<char>> {
    let mut bchar = vec!['.'; nunits];
    let mut cur = Cursor::new(tokens);
    let mut rstart = 0usize;

    while let Some(tok) = cur.next() {
        if let Some(rest) = tok.strip_prefix('%') {
            let fill = rest.chars().next();
            rstart = cur.expect_usize("rstart")?;
            let rnum = cur.expect_usize("rnum")?;
            let row: Vec<char> = match fill {
                Some(c) => vec![c; rnum],
                None => cur.expect("bias code string")?.chars().collect(),
            };
            for (j, &c) in row.iter().enumerate().take(rnum) {
                if rstart + j < nunits {
                    bchar[rstart + j] = c;
                }
            }
        } else {
            for (j, c) in tok.chars().enumerate() {
                if rstart + j < nunits {
                    bchar[rstart + j] = c;
                }
            }
            rstart += tok.chars().count();
        }
    }

    Ok(bchar)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XOR_NET: &str = "\
definitions:
nunits 5
ninputs 2
noutputs 1
end
network:
%r 2 2 0 2
%r 4 1 2 2
end
biases:
%r 2 3
end
";

    #[test]
    fn xor_dimensions() {
        let spec = NetworkSpec::parse(XOR_NET).unwrap();
        assert_eq!(spec.nunits, 5);
        assert_eq!(spec.ninputs, 2);
        assert_eq!(spec.noutputs, 1);
        assert_eq!(spec.total_weights(), 6);
    }

    #[test]
    fn xor_connectivity() {
        let spec = NetworkSpec::parse(XOR_NET).unwrap();
        // Hidden units 2,3 read inputs 0,1; output 4 reads hidden 2,3.
        assert_eq!(spec.first_weight_to[2], 0);
        assert_eq!(spec.num_weights_to[2], 2);
        assert_eq!(spec.first_weight_to[3], 0);
        assert_eq!(spec.num_weights_to[3], 2);
        assert_eq!(spec.first_weight_to[4], 2);
        assert_eq!(spec.num_weights_to[4], 2);
        // Input units receive nothing.
        assert_eq!(spec.num_weights_to[0], 0);
        assert_eq!(spec.num_weights_to[1], 0);
    }

    #[test]
    fn xor_codes_all_random() {
        let spec = NetworkSpec::parse(XOR_NET).unwrap();
        for i in spec.ninputs..spec.nunits {
            for &c in &spec.wchar[i] {
                assert_eq!(c, 'r');
            }
            assert_eq!(spec.bchar[i], 'r');
        }
        assert_eq!(spec.bchar[0], '.');
        assert_eq!(spec.bchar[1], '.');
    }

    #[test]
    fn missing_nunits_is_fatal() {
        let err = NetworkSpec::parse("definitions:\nninputs 2\nend\n").unwrap_err();
        assert!(matches!(err, BpError::Format(_)));
    }

    #[test]
    fn inconsistent_partition_is_fatal() {
        // Unit order is inputs first, outputs last; the two ranges must
        // fit inside nunits or the runtime index math is meaningless.
        let err =
            NetworkSpec::parse("definitions:\nnunits 3\nninputs 1\nnoutputs 5\nend\n").unwrap_err();
        assert!(matches!(err, BpError::Format(_)));

        let err =
            NetworkSpec::parse("definitions:\nnunits 3\nninputs 4\nend\n").unwrap_err();
        assert!(matches!(err, BpError::Format(_)));
    }

    #[test]
    fn malformed_block_header_is_fatal() {
        let text = "definitions:\nnunits 3\nend\nnetwork:\n%r 2 x 0 2\nend\n";
        let err = NetworkSpec::parse(text).unwrap_err();
        assert!(matches!(err, BpError::Format(_)));
    }

    #[test]
    fn definitions_keep_overrides() {
        let text = "definitions:\nnunits 10\nninputs 4\nnoutputs 4\n\
                    nepochs 500\necrit 0.04\nwrange 2.0\nend\n";
        let spec = NetworkSpec::parse(text).unwrap();
        assert_eq!(spec.definitions.get("nepochs").copied(), Some(500.0));
        assert!((spec.definitions["ecrit"] - 0.04).abs() < 1e-12);
        assert!((spec.wrange - 2.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_constraints() {
        let text = "definitions:\nnunits 3\nninputs 1\nnoutputs 2\nend\n\
                    constraints:\na 0.75\nb random negative\nend\n\
                    network:\n% 1 2 0 1\naa\nbb\nend\n\
                    biases:\n% 1 2\nab\nend\n";
        let spec = NetworkSpec::parse(text).unwrap();

        let a = spec.constraints[&'a'];
        assert!(!a.random);
        assert!((a.value - 0.75).abs() < 1e-12);

        let b = spec.constraints[&'b'];
        assert!(b.random);
        assert!(b.negative);

        // snum is 1, so the two-character rows truncate to one code each.
        assert_eq!(spec.wchar[1], vec!['a']);
        assert_eq!(spec.wchar[2], vec!['b']);
        assert_eq!(spec.bchar[1], 'a');
        assert_eq!(spec.bchar[2], 'b');
    }

    #[test]
    fn bias_rows_advance_by_characters_not_bytes() {
        // 'é' is two bytes; the implicit receiver counter must still
        // advance by one unit per code character.
        let text = "definitions:\nnunits 4\nend\nbiases:\néa\nbb\nend\n";
        let spec = NetworkSpec::parse(text).unwrap();
        assert_eq!(spec.bchar, vec!['é', 'a', 'b', 'b']);
    }

    #[test]
    fn linked_flag_is_parsed() {
        let text = "definitions:\nnunits 2\nend\n\
                    constraints:\nq random linked\nend\n";
        let spec = NetworkSpec::parse(text).unwrap();
        assert!(spec.constraints[&'q'].linked);
    }

    #[test]
    fn out_of_range_senders_are_fatal() {
        let text = "definitions:\nnunits 3\nninputs 1\nnoutputs 1\nend\n\
                    network:\n%r 2 1 0 9\nend\n";
        let err = NetworkSpec::parse(text).unwrap_err();
        assert!(matches!(err, BpError::Format(_)));
    }

    #[test]
    fn later_block_overwrites_receiver() {
        let text = "definitions:\nnunits 4\nninputs 2\nnoutputs 1\nend\n\
                    network:\n%r 3 1 0 2\n%p 3 1 1 3\nend\n";
        let spec = NetworkSpec::parse(text).unwrap();
        assert_eq!(spec.first_weight_to[3], 1);
        assert_eq!(spec.num_weights_to[3], 3);
        assert_eq!(spec.wchar[3], vec!['p', 'p', 'p']);
    }

    #[test]
    fn layout_is_token_stream_not_lines() {
        // Same XOR network crammed onto two lines.
        let text = "definitions: nunits 5 ninputs 2 noutputs 1 end\n\
                    network: %r 2 2 0 2 %r 4 1 2 2 end biases: %r 2 3 end";
        let spec = NetworkSpec::parse(text).unwrap();
        assert_eq!(spec.num_weights_to, vec![0, 0, 2, 2, 2]);
        assert_eq!(spec.bchar, vec!['.', '.', 'r', 'r', 'r']);
    }
}
