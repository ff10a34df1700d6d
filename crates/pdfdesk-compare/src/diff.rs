//! Line-based text diff.
//!
//! Classic longest-common-subsequence over lines, with common prefix and
//! suffix stripped first so the quadratic table only covers the changed
//! middle. Runs of same-kind lines are merged into one unit; unit order
//! preserves input order, with removals emitted before additions at each
//! divergence.

use serde::Serialize;

/// How a span relates the old text to the new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Unchanged,
    Added,
    Removed,
}

/// An ordered span of one or more whole lines, newline-joined.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffUnit {
    pub kind: DiffKind,
    pub text: String,
}

/// Diff two texts line by line.
///
/// Invariants: the lines of all `Unchanged` + `Removed` units, in unit
/// order, reconstruct `old`; `Unchanged` + `Added` reconstruct `new`.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffUnit> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();

    let common_prefix = old_lines
        .iter()
        .zip(&new_lines)
        .take_while(|(a, b)| a == b)
        .count();
    let common_suffix = old_lines[common_prefix..]
        .iter()
        .rev()
        .zip(new_lines[common_prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old_lines[common_prefix..old_lines.len() - common_suffix];
    let new_mid = &new_lines[common_prefix..new_lines.len() - common_suffix];

    let mut tagged: Vec<(DiffKind, &str)> = Vec::new();
    tagged.extend(
        old_lines[..common_prefix]
            .iter()
            .map(|&l| (DiffKind::Unchanged, l)),
    );
    tagged.extend(diff_middle(old_mid, new_mid));
    tagged.extend(
        old_lines[old_lines.len() - common_suffix..]
            .iter()
            .map(|&l| (DiffKind::Unchanged, l)),
    );

    merge_runs(tagged)
}

/// LCS dynamic program over the changed middle, backtracked into per-line
/// tags with removals ahead of additions at each divergence point.
fn diff_middle<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<(DiffKind, &'a str)> {
    let n = old.len();
    let m = new.len();
    if n == 0 {
        return new.iter().map(|&l| (DiffKind::Added, l)).collect();
    }
    if m == 0 {
        return old.iter().map(|&l| (DiffKind::Removed, l)).collect();
    }

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![0u32; (n + 1) * (m + 1)];
    let idx = |i: usize, j: usize| i * (m + 1) + j;
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[idx(i, j)] = if old[i] == new[j] {
                lcs[idx(i + 1, j + 1)] + 1
            } else {
                lcs[idx(i + 1, j)].max(lcs[idx(i, j + 1)])
            };
        }
    }

    let mut out = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            out.push((DiffKind::Unchanged, old[i]));
            i += 1;
            j += 1;
        } else if lcs[idx(i + 1, j)] >= lcs[idx(i, j + 1)] {
            out.push((DiffKind::Removed, old[i]));
            i += 1;
        } else {
            out.push((DiffKind::Added, new[j]));
            j += 1;
        }
    }
    out.extend(old[i..].iter().map(|&l| (DiffKind::Removed, l)));
    out.extend(new[j..].iter().map(|&l| (DiffKind::Added, l)));
    out
}

fn merge_runs(tagged: Vec<(DiffKind, &str)>) -> Vec<DiffUnit> {
    let mut units: Vec<DiffUnit> = Vec::new();
    for (kind, line) in tagged {
        match units.last_mut() {
            Some(unit) if unit.kind == kind => {
                unit.text.push('\n');
                unit.text.push_str(line);
            }
            _ => units.push(DiffUnit {
                kind,
                text: line.to_string(),
            }),
        }
    }
    units
}
