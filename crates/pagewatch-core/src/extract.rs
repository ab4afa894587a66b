//! Region extraction
//!
//! Isolates the part of a document that lies between a start marker and an
//! end marker, so that volatile surroundings (timestamps, banners, ads) do
//! not register as changes.
//!
//! ## Boundary Policy
//!
//! | Situation                              | Region                          |
//! |----------------------------------------|---------------------------------|
//! | both markers found, start before end   | `content[start..end]`           |
//! | start marker missing                   | starts at document start        |
//! | end marker missing                     | runs to end of document         |
//! | end marker first occurs before start   | empty                           |
//!
//! Both markers are located by their *first* occurrence in the whole
//! document. The returned region includes the start marker itself and
//! excludes the end marker.

/// Resolve the start offset of the region
///
/// Returns the byte offset of the first occurrence of `marker`, or `0` when
/// the marker does not occur.
pub fn start_boundary(content: &str, marker: &str) -> usize {
    content.find(marker).unwrap_or(0)
}

/// Resolve the end offset of the region
///
/// Returns the byte offset of the first occurrence of `marker`, or
/// `content.len()` when the marker does not occur. A missing end marker
/// never limits the region.
pub fn end_boundary(content: &str, marker: &str) -> usize {
    content.find(marker).unwrap_or(content.len())
}

/// Extract the region between `start_marker` and `end_marker`
///
/// See the module docs for the boundary policy. The result borrows from
/// `content` and may be empty; an empty region is a valid region.
///
/// # Example
///
/// ```
/// use pagewatch_core::extract::extract;
///
/// let page = "ad<!-- Header / End -->body<!-- Footer -->ad";
/// assert_eq!(extract(page, "<!-- Header / End -->", "<!-- Footer "), "<!-- Header / End -->body");
/// ```
pub fn extract<'a>(content: &'a str, start_marker: &str, end_marker: &str) -> &'a str {
    let start = start_boundary(content, start_marker);
    let end = end_boundary(content, end_marker);

    if end < start {
        return "";
    }

    // Offsets come from str::find, so both are char boundaries.
    &content[start..end]
}
