/// Decodes exactly `&lt;`, `&gt;`, `&amp;` and `&quot;`, one sequential pass each, in that order.
/// Every other entity (`&nbsp;`, `&#39;`, ...) is left encoded.
pub fn decode_basic_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
}
