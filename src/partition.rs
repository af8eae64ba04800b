/// Splits `items` into contiguous slices for a pool of `workers`.
///
/// The slice length is `items.len() / workers` (at least 1), so there are
/// `ceil(len / chunk_size)` slices and the final one holds the remainder.
/// Input order is preserved within and across slices.
pub fn partition<T>(items: &[T], workers: usize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }
    let chunk_size = (items.len() / workers.max(1)).max(1);
    items.chunks(chunk_size).collect()
}
