//! Source helpers shared by the rules.

use std::path::Path;

use oxc_span::SourceType;

/// Pick the oxc source type from a file extension, falling back to TSX so
/// that extensionless buffers still accept both JSX and type annotations.
pub fn source_type_for(path: &Path) -> SourceType {
    SourceType::from_path(path).unwrap_or_else(|_| SourceType::tsx())
}

/// Fast line/column lookup using pre-calculated line offsets.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Calculate line and column from byte offset.
    /// Returns (line, column) where line is 1-indexed and column is 0-indexed.
    pub fn line_column(&self, offset: u32, source: &str) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(0) => 0,
            Err(idx) => idx - 1,
        };

        let line_start = self.line_starts[line_idx] as usize;
        let line = (line_idx + 1) as u32;

        // Columns count characters, not bytes
        let column = source
            .get(line_start..offset as usize)
            .map_or(0, |prefix| prefix.chars().count() as u32);

        (line, column)
    }
}

/// Byte offset just past the line break that ends the line containing `end`,
/// if nothing but whitespace follows `end` on that line.
pub fn end_of_line_after(source: &str, end: usize) -> Option<usize> {
    let rest = source.get(end..)?;
    let newline = rest.find('\n')?;
    rest[..newline]
        .chars()
        .all(char::is_whitespace)
        .then_some(end + newline + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_column_at_start_and_after_newlines() {
        let source = "ab\ncd\n\nef";
        let index = LineIndex::new(source);
        assert_eq!(index.line_column(0, source), (1, 0));
        assert_eq!(index.line_column(3, source), (2, 0));
        assert_eq!(index.line_column(4, source), (2, 1));
        assert_eq!(index.line_column(7, source), (4, 0));
    }

    #[test]
    fn columns_count_characters() {
        let source = "const é = 1; window";
        let index = LineIndex::new(source);
        let offset = source.find("window").unwrap() as u32;
        assert_eq!(index.line_column(offset, source), (1, 13));
    }

    #[test]
    fn source_type_fallback() {
        assert!(source_type_for(Path::new("a.tsx")).is_jsx());
        assert!(source_type_for(Path::new("a.ts")).is_typescript());
        let fallback = source_type_for(Path::new("buffer"));
        assert!(fallback.is_typescript() && fallback.is_jsx());
    }

    #[test]
    fn end_of_line_requires_trailing_whitespace_only() {
        let source = "import a from 'a';  \nrest";
        assert_eq!(end_of_line_after(source, 18), Some(21));
        assert_eq!(end_of_line_after("a; b;\n", 2), None);
        assert_eq!(end_of_line_after("a;", 2), None);
    }
}
