//! The puzzle file grammar (spec.md §6): a plain-text format with no
//! separate size line — a board's side `N` is inferred from how many
//! digit tokens appear in the file's first board row.
//!
//! ```text
//! 0 0 0 0
//! v       v
//! 0 0 0 0
//! 0 0 0 0
//! 0 0 < 3 < 0
//! ```
//!
//! Each board row is a line of `N` whitespace-separated digit tokens (`0`
//! for an empty cell, `1..=N` for a pre-set value), with `<`/`>` tokens
//! allowed to appear inline between two consecutive value tokens on the
//! same row (left-smaller / left-greater). A line between two board rows
//! whose tokens are drawn only from `^`/`v`/`V` (top-smaller / top-greater)
//! carries that gap's vertical constraints; each such token is matched to
//! the column whose value token in the row above sits at the closest
//! byte offset. A gap with no such line between its two board rows carries
//! no vertical constraints at all.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::SolveError;
use crate::puzzle::{Constraint, Puzzle};

/// Reads and parses a puzzle file, producing a fully constructed [`Puzzle`]
/// with candidate lists initialized but not yet pre-colored.
pub fn parse_file(path: &Path) -> Result<Puzzle, SolveError> {
    let text = fs::read_to_string(path).map_err(|source| SolveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&text).map_err(|reason| SolveError::Parse {
        path: path.display().to_string(),
        reason,
    })
}

/// Parses puzzle text already read into memory, independent of any file
/// path — used directly by tests and by [`parse_file`].
pub fn parse_str(text: &str) -> Result<Puzzle, String> {
    let mut size: Option<usize> = None;
    let mut board: Vec<Vec<u8>> = Vec::new();
    let mut h_cons: Vec<Vec<Constraint>> = Vec::new();
    let mut row_offsets: Vec<Vec<usize>> = Vec::new();
    let mut v_gaps: HashMap<usize, Vec<Constraint>> = HashMap::new();

    for line in text.lines() {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            continue;
        }

        if is_vconstraint_line(&tokens) {
            let prev_offsets = row_offsets
                .last()
                .ok_or_else(|| "a vertical-constraint line must follow a board row".to_string())?;
            let gap_index = board.len() - 1;
            let size = size.expect("a board row always sets `size` before any gap line");
            if gap_index >= size.saturating_sub(1) {
                return Err("vertical-constraint line after the puzzle's last row gap".into());
            }
            let row = parse_vconstraint_row(&tokens, prev_offsets)?;
            v_gaps.insert(gap_index, row);
        } else {
            let (values, offsets, row_h_cons) = parse_board_row(&tokens)?;
            let n = *size.get_or_insert(values.len());
            if values.is_empty() {
                return Err("board row has no value tokens".into());
            }
            if values.len() != n {
                return Err(format!("expected {n} board values, found {}", values.len()));
            }
            for &value in &values {
                if value as usize > n {
                    return Err(format!("board value {value} out of range 0..={n}"));
                }
            }
            board.push(values);
            h_cons.push(row_h_cons);
            row_offsets.push(offsets);
        }
    }

    let size = size.ok_or_else(|| "puzzle file has no board rows".to_string())?;
    if board.len() != size {
        return Err(format!("expected {size} board rows, found {}", board.len()));
    }

    let v_cons = (0..size.saturating_sub(1))
        .map(|gap| v_gaps.remove(&gap).unwrap_or_else(|| vec![Constraint::None; size]))
        .collect();

    Puzzle::new(board, h_cons, v_cons).map_err(|e| e.to_string())
}

/// Splits `line` into its whitespace-separated tokens, each paired with its
/// byte offset within the line — the offsets a vertical-constraint line's
/// tokens are later matched against.
fn tokenize(line: &str) -> Vec<(usize, &str)> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        tokens.push((start, &line[start..i]));
    }
    tokens
}

fn is_vconstraint_line(tokens: &[(usize, &str)]) -> bool {
    tokens.iter().all(|(_, tok)| matches!(*tok, "^" | "v" | "V"))
}

/// Parses one board row's tokens into its values (with their byte offsets,
/// for later vertical-constraint matching) and the horizontal constraints
/// an inline `<`/`>` token places between two consecutive values.
fn parse_board_row(tokens: &[(usize, &str)]) -> Result<(Vec<u8>, Vec<usize>, Vec<Constraint>), String> {
    let mut values = Vec::new();
    let mut offsets = Vec::new();
    let mut h_cons = Vec::new();
    let mut pending_op: Option<Constraint> = None;

    for &(offset, tok) in tokens {
        match tok {
            "<" | ">" => {
                if pending_op.is_some() || values.is_empty() {
                    return Err(format!("misplaced horizontal-constraint token {tok:?}"));
                }
                pending_op = Some(if tok == "<" { Constraint::Smaller } else { Constraint::Greater });
            }
            other => {
                let value: u8 = other.parse().map_err(|_| format!("invalid board token {other:?}"))?;
                if !values.is_empty() {
                    h_cons.push(pending_op.take().unwrap_or(Constraint::None));
                }
                values.push(value);
                offsets.push(offset);
            }
        }
    }

    if pending_op.is_some() {
        return Err("trailing horizontal-constraint token with no following value".into());
    }
    Ok((values, offsets, h_cons))
}

/// Parses a vertical-constraint line's tokens, matching each one to the
/// column in `reference_offsets` (the value offsets of the board row just
/// above this gap) whose byte offset is closest.
fn parse_vconstraint_row(
    tokens: &[(usize, &str)],
    reference_offsets: &[usize],
) -> Result<Vec<Constraint>, String> {
    let mut row = vec![Constraint::None; reference_offsets.len()];
    for &(offset, tok) in tokens {
        let constraint = match tok {
            "^" => Constraint::Smaller,
            "v" | "V" => Constraint::Greater,
            other => return Err(format!("invalid vertical-constraint token {other:?}")),
        };
        let col = reference_offsets
            .iter()
            .enumerate()
            .min_by_key(|&(_, &col_offset)| (col_offset as i64 - offset as i64).abs())
            .map(|(i, _)| i)
            .ok_or_else(|| "vertical-constraint line matched against an empty board row".to_string())?;
        row[col] = constraint;
    }
    Ok(row)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_single_cell_board() {
        // spec.md §8 scenario S1.
        let puzzle = parse_str("1").unwrap();
        assert_eq!(puzzle.size(), 1);
        assert_eq!(puzzle.board(0, 0), 0);
    }

    #[test]
    fn parses_a_minimal_blank_puzzle() {
        let text = "0 0\n0 0\n";
        let puzzle = parse_str(text).unwrap();
        assert_eq!(puzzle.size(), 2);
        assert!(!puzzle.is_preset(0, 0));
    }

    #[test]
    fn parses_inline_horizontal_constraints() {
        let text = "1 < 2 > 3\n0 0 0\n0 0 0\n";
        let puzzle = parse_str(text).unwrap();
        assert_eq!(puzzle.board(0, 0), 1);
        assert_eq!(puzzle.board(0, 1), 2);
        assert_eq!(puzzle.board(0, 2), 3);
        assert_eq!(puzzle.h_constraint(0, 0), Constraint::Smaller);
        assert_eq!(puzzle.h_constraint(0, 1), Constraint::Greater);
    }

    #[test]
    fn matches_vertical_tokens_to_the_nearest_column_by_offset() {
        let text = "0 0 0 0\nv       v\n0 0 0 0\n0 0 0 0\n0 0 0 0\n";
        let puzzle = parse_str(text).unwrap();
        assert_eq!(puzzle.v_constraint(0, 0), Constraint::Greater);
        assert_eq!(puzzle.v_constraint(0, 1), Constraint::None);
        assert_eq!(puzzle.v_constraint(0, 2), Constraint::None);
        assert_eq!(puzzle.v_constraint(0, 3), Constraint::Greater);
    }

    #[test]
    fn a_gap_with_no_constraint_line_defaults_to_none() {
        let text = "0 0\n0 0\n0 0\n";
        let puzzle = parse_str(text).unwrap();
        assert_eq!(puzzle.v_constraint(0, 0), Constraint::None);
        assert_eq!(puzzle.v_constraint(0, 1), Constraint::None);
        assert_eq!(puzzle.v_constraint(1, 0), Constraint::None);
    }

    #[test]
    fn rejects_text_with_no_board_rows() {
        assert!(parse_str("").is_err());
        assert!(parse_str("^ ^\n").is_err());
    }

    #[test]
    fn rejects_a_short_board_row() {
        let text = "0 0\n0\n";
        assert!(parse_str(text).is_err());
    }

    #[test]
    fn rejects_an_out_of_range_preset_value() {
        let text = "5 0\n0 0\n";
        assert!(parse_str(text).is_err());
    }

    #[test]
    fn rejects_a_misplaced_horizontal_constraint_token() {
        assert!(parse_str("< 1 2\n0 0\n").is_err());
    }
}
