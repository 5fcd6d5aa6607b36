use std::convert::Infallible;

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::domain::LabeledRow;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Escape the five HTML-significant characters; everything else is kept as is.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `<tr><td>{text}</td><td>{top_class}</td></tr>`, both cells escaped.
pub fn render_row(row: &LabeledRow) -> String {
    let label = row.top_class.as_deref().map(escape_html).unwrap_or_default();
    format!(
        "<tr><td>{}</td><td>{}</td></tr>",
        escape_html(&row.record.text),
        label
    )
}

/// Stream one table row per labeled row; the body ends after the last row.
pub fn table_rows(rows: Vec<LabeledRow>) -> Response {
    let chunks = rows
        .into_iter()
        .map(|row| Ok::<_, Infallible>(Bytes::from(render_row(&row))));

    (
        [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)],
        Body::from_stream(futures::stream::iter(chunks)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TextRecord;

    fn row(text: &str, class: Option<&str>) -> LabeledRow {
        LabeledRow {
            record: TextRecord::new(0, text),
            top_class: class.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_row() {
        assert_eq!(
            render_row(&row("windy", Some("conditions"))),
            "<tr><td>windy</td><td>conditions</td></tr>"
        );
    }

    #[test]
    fn test_markup_is_escaped() {
        let html = render_row(&row("<script>alert(1)</script>", Some("<b>")));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.starts_with("<tr><td>&lt;script&gt;"));
        assert!(html.ends_with("<td>&lt;b&gt;</td></tr>"));
    }

    #[test]
    fn test_only_markup_characters_are_escaped() {
        assert_eq!(
            render_row(&row("Is it hot? 30/40 & 'humid'", Some("a/b \"c\""))),
            "<tr><td>Is it hot? 30/40 &amp; &#39;humid&#39;</td><td>a/b &quot;c&quot;</td></tr>"
        );
    }

    #[test]
    fn test_missing_label_renders_empty_cell() {
        assert_eq!(render_row(&row("hmm", None)), "<tr><td>hmm</td><td></td></tr>");
    }

    #[tokio::test]
    async fn test_table_rows_streams_every_row_in_order() {
        let response = table_rows(vec![row("a", Some("x")), row("b", Some("y"))]);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            HTML_CONTENT_TYPE
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            body,
            "<tr><td>a</td><td>x</td></tr><tr><td>b</td><td>y</td></tr>"
        );
    }
}
