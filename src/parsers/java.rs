//! Java structural diff using tree-sitter
//!
//! Compares the semantic token streams of two versions of a Java file and
//! reports which lines of the second version are affected. Comments and
//! import declarations are excluded from the token stream, so edits touching
//! only those (or only whitespace) produce no affected lines.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use tree_sitter::{Node, Parser, Tree};

// Above this many DP cells the exact diff is skipped and the whole changed
// region between the common prefix and suffix is reported.
const LCS_CELL_LIMIT: usize = 4_000_000;

/// A leaf token with the zero-based row it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    row: u32,
}

/// A structurally changed region, as one-based start/end lines in the
/// second file of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DiffSpan {
    start: u32,
    end: u32,
}

/// One-based line numbers in `to` affected by structural differences
/// between `from` and `to`.
///
/// Each difference contributes the start and end line of its span, matching
/// how downstream consumers cross-reference these with textual hunks.
pub fn affected_line_numbers(from: &str, to: &str) -> Result<BTreeSet<u32>> {
    let from_tokens = semantic_tokens(from).context("parsing first file")?;
    let to_tokens = semantic_tokens(to).context("parsing second file")?;

    let mut affected = BTreeSet::new();
    for span in token_diff_spans(&from_tokens, &to_tokens) {
        affected.insert(span.start);
        affected.insert(span.end);
    }
    Ok(affected)
}

fn parse(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    let language = tree_sitter_java::LANGUAGE;
    parser
        .set_language(&language.into())
        .context("Failed to set Java language")?;

    let tree = parser
        .parse(source, None)
        .context("Failed to parse Java source")?;
    if tree.root_node().has_error() {
        bail!("Java source has syntax errors");
    }
    Ok(tree)
}

fn semantic_tokens(source: &str) -> Result<Vec<Token>> {
    let tree = parse(source)?;
    let mut tokens = Vec::new();
    collect_tokens(tree.root_node(), source.as_bytes(), &mut tokens);
    Ok(tokens)
}

fn collect_tokens(node: Node, source: &[u8], out: &mut Vec<Token>) {
    match node.kind() {
        "line_comment" | "block_comment" | "import_declaration" => return,
        _ => {}
    }

    if node.child_count() == 0 {
        if let Ok(text) = node.utf8_text(source) {
            if !text.is_empty() {
                out.push(Token {
                    text: text.to_string(),
                    row: node.start_position().row as u32,
                });
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, source, out);
    }
}

/// Changed regions between two token streams, located in the `to` stream.
///
/// A region with inserted `to` tokens spans their first and last rows; a
/// region deleted from `from` is anchored at the row of the `to` token at
/// the deletion point.
fn token_diff_spans(from: &[Token], to: &[Token]) -> Vec<DiffSpan> {
    // Trim the common prefix and suffix; most edits are local.
    let mut prefix = 0;
    while prefix < from.len() && prefix < to.len() && from[prefix].text == to[prefix].text {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < from.len() - prefix
        && suffix < to.len() - prefix
        && from[from.len() - 1 - suffix].text == to[to.len() - 1 - suffix].text
    {
        suffix += 1;
    }

    let from_mid = &from[prefix..from.len() - suffix];
    let to_mid = &to[prefix..to.len() - suffix];
    if from_mid.is_empty() && to_mid.is_empty() {
        return Vec::new();
    }

    let regions = if from_mid.len() * to_mid.len() > LCS_CELL_LIMIT {
        vec![(0..from_mid.len(), 0..to_mid.len())]
    } else {
        unmatched_regions(from_mid, to_mid)
    };

    regions
        .into_iter()
        .map(|(_, to_range)| {
            if to_range.is_empty() {
                let anchor = to_mid
                    .get(to_range.start)
                    .or_else(|| to.get(prefix + to_range.start))
                    .or_else(|| to.last());
                let row = anchor.map(|t| t.row).unwrap_or(0);
                DiffSpan {
                    start: row + 1,
                    end: row + 1,
                }
            } else {
                DiffSpan {
                    start: to_mid[to_range.start].row + 1,
                    end: to_mid[to_range.end - 1].row + 1,
                }
            }
        })
        .collect()
}

/// Maximal runs of tokens not matched by the longest common subsequence,
/// as parallel ranges into `from` and `to`.
fn unmatched_regions(
    from: &[Token],
    to: &[Token],
) -> Vec<(std::ops::Range<usize>, std::ops::Range<usize>)> {
    let n = from.len();
    let m = to.len();

    // LCS length table, (n+1) x (m+1).
    let mut table = vec![0u32; (n + 1) * (m + 1)];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * (m + 1) + j] = if from[i].text == to[j].text {
                table[(i + 1) * (m + 1) + j + 1] + 1
            } else {
                table[(i + 1) * (m + 1) + j].max(table[i * (m + 1) + j + 1])
            };
        }
    }

    let mut regions = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    let (mut ri, mut rj) = (0usize, 0usize);
    let mut open = false;

    while i < n || j < m {
        if i < n && j < m && from[i].text == to[j].text {
            if open {
                regions.push((ri..i, rj..j));
                open = false;
            }
            i += 1;
            j += 1;
        } else {
            if !open {
                ri = i;
                rj = j;
                open = true;
            }
            if j < m && (i >= n || table[i * (m + 1) + j + 1] >= table[(i + 1) * (m + 1) + j]) {
                j += 1;
            } else {
                i += 1;
            }
        }
    }
    if open {
        regions.push((ri..n, rj..m));
    }

    regions
}
