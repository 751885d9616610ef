use std::collections::VecDeque;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Deserialize;

/// What happens when a line arrives and the history is already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// Keep the first entries and silently drop new ones.
    #[default]
    Stop,
    /// Drop the oldest entry to make room.
    EvictOldest,
}

/// Bounded, append-only record of the lines entered in this session.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
    overflow: Overflow,
}

impl History {
    pub fn new(capacity: usize, overflow: Overflow) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            overflow,
        }
    }

    /// Records a line. Returns false if it was dropped because the history is full.
    pub fn push(&mut self, line: &str) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() >= self.capacity {
            match self.overflow {
                Overflow::Stop => return false,
                Overflow::EvictOldest => {
                    self.entries.pop_front();
                }
            }
        }
        self.entries
            .push_back(line.trim_end_matches(['\n', '\r']).to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Renders every entry as `<n>: <line>`, numbered from 1.
    pub fn render(&self) -> Bytes {
        let mut buf = BytesMut::new();
        for (i, entry) in self.entries.iter().enumerate() {
            buf.put_slice(format!("{}: {}\n", i + 1, entry).as_bytes());
        }
        buf.freeze()
    }
}
