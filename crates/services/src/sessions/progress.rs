/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub current_index: usize,
    /// `current_index / total * 100`; `0.0` for an empty bank.
    pub percentage: f64,
    pub is_complete: bool,
}

pub(crate) fn progress_percentage(current_index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = current_index as f64 / total as f64;
    ratio * 100.0
}
