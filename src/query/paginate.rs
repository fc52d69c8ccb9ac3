//! Sequential pagination over the indexer's per-request row cap.
//!
//! Pages are requested strictly one after another: each request's `skip`
//! offset depends on the previous page having been consumed, and the server
//! must be observed at a consistent point. Concurrent out-of-order paging is
//! not supported.
//!
//! Any error aborts the loop and discards whatever was accumulated; a
//! partial daily series would silently corrupt downstream gap-filling, so
//! partial data is never surfaced.

use std::future::Future;

use crate::error::Result;

/// Maximum rows the indexer returns per request.
pub const PAGE_SIZE: usize = 1000;

/// Retrieves a full result set by advancing a `skip` offset.
///
/// `fetch_page` is invoked with the current offset and must return at most
/// [`PAGE_SIZE`] rows; a short page terminates the loop. The offset always
/// advances by the full page size, regardless of how the page's rows bucket
/// into output days.
pub async fn fetch_paged<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut rows = Vec::new();
    let mut skip = 0;
    loop {
        let page = fetch_page(skip).await?;
        let fetched = page.len();
        rows.extend(page);
        if fetched < PAGE_SIZE {
            break;
        }
        skip += PAGE_SIZE;
    }
    Ok(rows)
}

/// Retrieves a full result set by slicing an oversized key set.
///
/// Used when a single `id_in` predicate would exceed the row cap: the key
/// set is split into [`PAGE_SIZE`] chunks queried sequentially.
pub async fn fetch_sliced<K, T, F, Fut>(keys: &[K], mut fetch_slice: F) -> Result<Vec<T>>
where
    F: FnMut(&[K]) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut rows = Vec::new();
    for slice in keys.chunks(PAGE_SIZE) {
        rows.extend(fetch_slice(slice).await?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScryError;

    #[tokio::test]
    async fn paged_fetch_stops_on_short_page() {
        let pages = vec![vec![0u32; 1000], vec![0u32; 1000], vec![0u32; 400]];
        let mut offsets = Vec::new();

        let rows = fetch_paged(|skip| {
            offsets.push(skip);
            let page = pages[skip / PAGE_SIZE].clone();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(rows.len(), 2400);
        assert_eq!(offsets, vec![0, 1000, 2000]);
    }

    #[tokio::test]
    async fn paged_fetch_single_short_page() {
        let rows = fetch_paged(|_skip| async { Ok(vec![1u32, 2, 3]) })
            .await
            .unwrap();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn paged_fetch_error_discards_partial_rows() {
        let result: Result<Vec<u32>> = fetch_paged(|skip| async move {
            if skip == 0 {
                Ok(vec![0u32; 1000])
            } else {
                Err(ScryError::PartialData("page failed"))
            }
        })
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn sliced_fetch_covers_all_keys_in_order() {
        let keys: Vec<usize> = (0..2500).collect();
        let mut seen = Vec::new();

        let rows = fetch_sliced(&keys, |slice| {
            seen.push(slice.len());
            let out: Vec<usize> = slice.to_vec();
            async move { Ok(out) }
        })
        .await
        .unwrap();

        assert_eq!(rows, keys);
        assert_eq!(seen, vec![1000, 1000, 500]);
    }
}
