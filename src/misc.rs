// Copyright (C) 2018 Red Hat, Inc.
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

use std::io::Write;

use regex::Regex;

use super::error::*;

/// Oldest stratisd version this client talks to.
pub const REQUIRED_STRATISD_VERSION: [u32; 3] = [1, 0, 0];
/// Newest stratisd version this client talks to.
pub const MAXIMUM_STRATISD_VERSION: [u32; 3] = [2, 0, 0];

/// Parse a dotted version string like `1.0.3` into its integer
/// components.
pub fn parse_version(s: &str) -> Result<Vec<u32>> {
    let regex_version = Regex::new(r"^[0-9]+(\.[0-9]+)*$")?;
    if !regex_version.is_match(s) {
        return Err(StratisError::DaemonBug(format!(
            "stratisd reported an invalid version string '{}'",
            s
        )));
    }
    let mut ret = Vec::new();
    for part in s.split('.') {
        ret.push(part.parse::<u32>()?);
    }
    Ok(ret)
}

/// Check `version` against the inclusive range
/// [`REQUIRED_STRATISD_VERSION`, `MAXIMUM_STRATISD_VERSION`].
///
/// Components compare left to right, a shorter version sorts before a
/// longer one sharing its prefix.
pub fn check_version(version: &str) -> Result<Vec<u32>> {
    let actual = parse_version(version)?;
    if actual.as_slice() < &REQUIRED_STRATISD_VERSION[..]
        || actual.as_slice() > &MAXIMUM_STRATISD_VERSION[..]
    {
        return Err(StratisError::VersionMismatch {
            actual,
            min: REQUIRED_STRATISD_VERSION.to_vec(),
            max: MAXIMUM_STRATISD_VERSION.to_vec(),
        });
    }
    Ok(actual)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Left,
    Right,
    Centre,
}

fn pad(cell: &str, width: usize, align: Alignment) -> String {
    match align {
        Alignment::Left => format!("{:<width$}", cell, width = width),
        Alignment::Right => format!("{:>width$}", cell, width = width),
        Alignment::Centre => format!("{:^width$}", cell, width = width),
    }
}

/// Print a text table. Every column is as wide as its widest cell, header
/// included, and columns are separated by two spaces. Columns without an
/// alignment are left aligned.
pub fn print_table<W: Write>(
    out: &mut W,
    headers: &[&str],
    rows: &[Vec<String>],
    alignments: &[Alignment],
) -> Result<()> {
    let mut widths: Vec<usize> =
        headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if i >= widths.len() {
                widths.push(len);
            } else if len > widths[i] {
                widths[i] = len;
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    lines.extend(rows.iter().cloned());

    for line in &lines {
        let cells: Vec<String> = line
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let align =
                    alignments.get(i).cloned().unwrap_or(Alignment::Left);
                pad(cell, widths[i], align)
            })
            .collect();
        writeln!(out, "{}", cells.join("  ").trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_boundaries() {
        assert!(check_version("1.0.0").is_ok());
        assert!(check_version("2.0.0").is_ok());
        assert!(check_version("1.4.17").is_ok());
        match check_version("0.9.9") {
            Err(StratisError::VersionMismatch { actual, .. }) => {
                assert_eq!(actual, vec![0, 9, 9])
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
        match check_version("2.0.1") {
            Err(StratisError::VersionMismatch { .. }) => (),
            other => panic!("expected version mismatch, got {:?}", other),
        }
    }

    #[test]
    fn version_garbage() {
        match parse_version("1.x.0") {
            Err(StratisError::DaemonBug(_)) => (),
            other => panic!("expected daemon bug, got {:?}", other),
        }
        assert!(parse_version("").is_err());
        assert_eq!(parse_version("10.2").unwrap(), vec![10, 2]);
    }

    #[test]
    fn table_alignment() {
        let mut out = Vec::new();
        print_table(
            &mut out,
            &["Name", "Size"],
            &[
                vec!["a".to_string(), "1".to_string()],
                vec!["longer".to_string(), "100".to_string()],
            ],
            &[Alignment::Left, Alignment::Right],
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "Name    Size\na          1\nlonger   100\n");
    }
}
