use crate::path::Path;

/// Committed strokes, oldest first.
///
/// Paths only ever enter at the end and only the last one can leave, so the
/// history is a plain stack: commit pushes, undo pops. There is no redo.
#[derive(Debug, Clone, Default)]
pub struct StrokeHistory {
    paths: Vec<Path>,
}

impl StrokeHistory {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self { paths: Vec::new() }
    }

    /// Append a finished stroke
    pub fn commit(&mut self, path: Path) {
        self.paths.push(path);
    }

    /// Remove the most recent stroke, if any
    pub fn undo(&mut self) -> Option<Path> {
        self.paths.pop()
    }

    /// Returns true if there are strokes that can be undone
    pub fn can_undo(&self) -> bool {
        !self.paths.is_empty()
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
