/// Capacity of a session's read buffer.
pub const BUFFER_SIZE: usize = 2048;

/// Result of scanning the valid bytes for a line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inspection {
    /// Bytes belonging to the line, terminator excluded.
    pub data_len: usize,
    /// Bytes to drop from the front, terminator included when present.
    pub consume: usize,
    /// Whether the terminator was found within the valid bytes.
    pub terminated: bool,
}

/// Fixed-capacity byte buffer with a count of valid bytes.
///
/// Bytes `[0, pending)` are valid data; the rest of the backing array is
/// unspecified. The session only reads from the socket when the buffer is
/// fully drained, so reads always target the whole array.
pub struct LineBuffer {
    bytes: [u8; BUFFER_SIZE],
    pending: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0u8; BUFFER_SIZE],
            pending: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Valid bytes, `[0, pending)`.
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.pending]
    }

    /// The whole backing array, for filling from a socket read.
    pub fn read_slot(&mut self) -> &mut [u8] {
        debug_assert_eq!(self.pending, 0);
        &mut self.bytes[..]
    }

    /// Records `n` bytes as valid after a read.
    pub fn set_pending(&mut self, n: usize) {
        debug_assert!(n <= BUFFER_SIZE);
        self.pending = n;
    }

    /// Locates the first `term` among the valid bytes.
    ///
    /// When absent, `data_len == consume == pending`: the whole buffer is a
    /// mid-line chunk to be hashed and discarded.
    pub fn inspect(&self, term: u8) -> Inspection {
        match self.data().iter().position(|&b| b == term) {
            Some(i) => Inspection {
                data_len: i,
                consume: i + 1,
                terminated: true,
            },
            None => Inspection {
                data_len: self.pending,
                consume: self.pending,
                terminated: false,
            },
        }
    }

    /// Drops the first `n` valid bytes, shifting the remainder to the
    /// front. The vacated tail is zeroed.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.pending);
        self.bytes.copy_within(n.., 0);
        self.bytes[BUFFER_SIZE - n..].fill(0);
        self.pending -= n;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
