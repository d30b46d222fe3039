//! Page checksums for page reads

/// CRC-32C of each `page_size` page of `data`, in order.
///
/// The last page may be short. Empty input has no pages. A `page_size` of
/// zero is treated as one page spanning the whole input.
#[must_use]
pub fn page_checksums(data: &[u8], page_size: usize) -> Vec<u32> {
    if data.is_empty() {
        return Vec::new();
    }
    let page_size = if page_size == 0 { data.len() } else { page_size };
    data.chunks(page_size).map(crc32c::crc32c).collect()
}
