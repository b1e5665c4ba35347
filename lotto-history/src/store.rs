use crate::models::Draw;

/// Draw history kept most-recent-first, unique by `draw_id`.
///
/// Every windowed computation downstream slices from the front, so the
/// descending order is established here once and never re-checked.
#[derive(Debug, Clone, Default)]
pub struct History {
    draws: Vec<Draw>,
}

impl History {
    pub fn new(mut draws: Vec<Draw>) -> Self {
        draws.sort_by(|a, b| b.draw_id.cmp(&a.draw_id));
        draws.dedup_by_key(|d| d.draw_id);
        Self { draws }
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// All draws, `[0]` being the most recent.
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn latest(&self) -> Option<&Draw> {
        self.draws.first()
    }

    /// The `n` most recent draws (fewer if the history is shorter).
    pub fn recent(&self, n: usize) -> &[Draw] {
        &self.draws[..n.min(self.draws.len())]
    }

    pub fn find(&self, draw_id: u32) -> Option<&Draw> {
        self.position(draw_id).map(|i| &self.draws[i])
    }

    /// Index of `draw_id` in most-recent-first order.
    pub fn position(&self, draw_id: u32) -> Option<usize> {
        self.draws
            .binary_search_by(|d| draw_id.cmp(&d.draw_id))
            .ok()
    }

    /// Draws strictly older than `draw_id`, still most-recent-first.
    pub fn before(&self, draw_id: u32) -> &[Draw] {
        let start = self.draws.partition_point(|d| d.draw_id >= draw_id);
        &self.draws[start..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Draw> {
        self.draws.iter()
    }

    pub fn into_draws(self) -> Vec<Draw> {
        self.draws
    }
}

impl From<Vec<Draw>> for History {
    fn from(draws: Vec<Draw>) -> Self {
        Self::new(draws)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Draw;
    type IntoIter = std::slice::Iter<'a, Draw>;

    fn into_iter(self) -> Self::IntoIter {
        self.draws.iter()
    }
}
