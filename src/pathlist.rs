//! Reading newline-separated path lists from a stream

use std::io::BufRead;
use std::path::PathBuf;

use crate::error::Result;

/// Iterate over the paths in a newline-separated list.
///
/// Lines are trimmed and blank lines skipped; read failures are passed
/// through so callers decide whether a broken stream is fatal.
pub fn paths<R: BufRead>(reader: R) -> impl Iterator<Item = Result<PathBuf>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Ok(PathBuf::from(trimmed)))
            }
        }
        Err(e) => Some(Err(e.into())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_blank_lines_are_skipped() {
        let input = Cursor::new("a.jpg\n\n  \nb.jpg\n");
        let paths: Vec<PathBuf> = paths(input).collect::<Result<_>>().unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let input = Cursor::new("  photos/c.jpg \t\n");
        let paths: Vec<PathBuf> = paths(input).collect::<Result<_>>().unwrap();
        assert_eq!(paths, vec![PathBuf::from("photos/c.jpg")]);
    }
}
