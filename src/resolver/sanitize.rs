/// Tokens stripped from window text and version metadata before a label is
/// used as a directory name. ".exe" and "$" are stripped as whole substrings,
/// not per character.
const DISALLOWED_TOKENS: [&str; 11] = [
    "\\", "/", ":", "*", "?", "\"", "<", ">", "|", ".exe", "$",
];

pub fn sanitize_label(raw: &str) -> String {
    let mut label = raw.to_string();
    for token in DISALLOWED_TOKENS {
        if label.contains(token) {
            label = label.replace(token, "");
        }
    }
    label.trim().to_string()
}
