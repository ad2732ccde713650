use super::sanitize;

#[test]
fn it_keeps_plain_text() {
    assert_eq!(
        sanitize("Why did the scarecrow win an award?\nBecause he was outstanding in his field."),
        "Why did the scarecrow win an award?\nBecause he was outstanding in his field."
    );
}

#[test]
fn it_keeps_markup_as_text() {
    assert_eq!(
        sanitize("<img src=x onerror=alert(1)>"),
        "<img src=x onerror=alert(1)>"
    );
}

#[test]
fn it_strips_csi_sequences() {
    assert_eq!(sanitize("\u{1b}[31mred\u{1b}[0m text"), "red text");
    assert_eq!(sanitize("\u{1b}[2J\u{1b}[Hcleared"), "cleared");
    assert_eq!(sanitize("\u{9b}1mbold"), "bold");
}

#[test]
fn it_strips_osc_sequences() {
    assert_eq!(sanitize("\u{1b}]0;pwned\u{07}title"), "title");
    assert_eq!(sanitize("\u{1b}]8;;http://x\u{1b}\\link"), "link");
}

#[test]
fn it_drops_other_control_characters() {
    assert_eq!(sanitize("a\u{07}b\u{08}c\u{00}d"), "abcd");
}

#[test]
fn it_normalizes_whitespace() {
    assert_eq!(sanitize("one\r\ntwo\rthree"), "one\ntwo\nthree");
    assert_eq!(sanitize("\tindented"), "  indented");
}

#[test]
fn it_handles_truncated_escapes() {
    assert_eq!(sanitize("text\u{1b}"), "text");
    assert_eq!(sanitize("text\u{1b}[31"), "text");
}

#[test]
fn it_keeps_unicode() {
    assert_eq!(sanitize("¿Qué tal? 😀"), "¿Qué tal? 😀");
}
