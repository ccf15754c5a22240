#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open,
}

impl ViewerState {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}
