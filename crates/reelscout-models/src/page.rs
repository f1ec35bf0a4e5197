use serde::{Deserialize, Serialize};

/// One page of a paginated catalog response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn empty() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            total_results: 0,
            results: Vec::new(),
        }
    }
}
