//! Device model identifiers.

/// Reduce a raw `model` attribute to its identifier: the text before the first
/// `(`, trimmed. `"JJJ(JA,JB)"` becomes `"JJJ"`.
pub fn sanitize_model(raw: &str) -> &str {
    raw.split_once('(').map_or(raw, |(head, _)| head).trim()
}
