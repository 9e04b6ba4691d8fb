use crate::model::ScanReport;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fixed-capacity rolling history of scan reports, oldest evicted first.
#[derive(Debug, Clone)]
pub struct ScanBuffer {
    scans: VecDeque<ScanReport>,
    capacity: usize,
}

/// A window into the buffer plus the paging values actually applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPage {
    pub items: Vec<ScanReport>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl ScanBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            scans: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a report and returns the buffer length after eviction.
    ///
    /// The returned number is a position count, not a durable identifier:
    /// once the buffer is full every push returns the capacity.
    pub fn push(&mut self, report: ScanReport) -> usize {
        self.scans.push_back(report);
        while self.scans.len() > self.capacity {
            self.scans.pop_front();
        }
        self.scans.len()
    }

    pub fn latest(&self) -> Option<&ScanReport> {
        self.scans.back()
    }

    /// Copies out `limit` reports starting at `offset`, oldest first.
    ///
    /// `limit` defaults to the whole buffer; an offset past the end yields an
    /// empty page.
    pub fn page(&self, offset: Option<usize>, limit: Option<usize>) -> ScanPage {
        let total = self.scans.len();
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(total);
        let items = self.scans.iter().skip(offset).take(limit).cloned().collect();

        ScanPage {
            items,
            total,
            offset,
            limit,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanReport> {
        self.scans.iter()
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.scans.clear();
    }
}
