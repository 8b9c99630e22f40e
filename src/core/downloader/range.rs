/// A contiguous byte range of a remote resource.
///
/// `start` is inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadRange {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl DownloadRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Value for the HTTP `Range` header (inclusive on both ends).
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end.saturating_sub(1))
    }

    /// Split `length` bytes into at most `parts` contiguous ranges.
    ///
    /// Every range but the last has `ceil(length / parts)` bytes. Ranges never
    /// overlap, leave no gaps and are never empty, so fewer than `parts`
    /// ranges come back when `length` is small.
    pub fn partition(length: u64, parts: usize) -> Vec<DownloadRange> {
        if length == 0 {
            return Vec::new();
        }

        let parts = (parts.max(1) as u64).min(length);
        let part_size = length.div_ceil(parts);

        (0..parts)
            .map(|i| i * part_size)
            .take_while(|start| *start < length)
            .enumerate()
            .map(|(index, start)| DownloadRange {
                index,
                start,
                end: (start + part_size).min(length),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(ranges: &[DownloadRange], length: u64) {
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(length));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
        assert!(ranges.iter().all(|r| !r.is_empty()));
        assert_eq!(ranges.iter().map(DownloadRange::len).sum::<u64>(), length);
    }

    #[test]
    fn even_split() {
        let length = 10 * 1024 * 1024;
        let ranges = DownloadRange::partition(length, 4);
        assert_eq!(ranges.len(), 4);
        assert_contiguous(&ranges, length);
        assert_eq!(ranges[0].header_value(), "bytes=0-2621439");
    }

    #[test]
    fn uneven_split_puts_the_remainder_last() {
        let ranges = DownloadRange::partition(10, 3);
        assert_eq!(
            ranges.iter().map(DownloadRange::len).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
        assert_contiguous(&ranges, 10);
    }

    #[test]
    fn no_empty_ranges_for_small_lengths() {
        let ranges = DownloadRange::partition(3, 8);
        assert_eq!(ranges.len(), 3);
        assert_contiguous(&ranges, 3);

        // ceil(10 / 4) = 3 leaves 1 byte for the last part: 3, 3, 3, 1.
        let ranges = DownloadRange::partition(10, 4);
        assert_contiguous(&ranges, 10);

        // ceil(9 / 4) = 3 covers everything in three ranges.
        let ranges = DownloadRange::partition(9, 4);
        assert_eq!(ranges.len(), 3);
        assert_contiguous(&ranges, 9);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(DownloadRange::partition(0, 4).is_empty());
        let single = DownloadRange::partition(100, 0);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].header_value(), "bytes=0-99");
    }
}
