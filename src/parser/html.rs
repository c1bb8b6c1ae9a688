//! HTML to plain text
//!
//! Directory listings are consumed line by line, so the stripper keeps the
//! line structure of the document: `<br>` becomes a newline and every other
//! tag is dropped in place.

use regex::{Captures, Regex};

/// Elements removed together with their content
const DROPPED_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "object",
    "embed",
    "applet",
    "noframes",
    "noscript",
    "noembed",
    "figcaption",
];

/// Converts HTML documents into plain text
pub struct HtmlStripper {
    /// Regex for the opening body tag: `<body ...>`
    body_re: Regex,
    /// Regex for line breaks: `<br>`, `<br/>`, `<br />`
    br_re: Regex,
    /// Regexes for elements dropped with their content, one per element
    dropped_res: Vec<Regex>,
    /// Regex for HTML comments
    comment_re: Regex,
    /// Regex for any remaining tag
    tag_re: Regex,
    /// Regex for named and numeric character references
    entity_re: Regex,
    /// Regex for runs of spaces
    spaces_re: Regex,
}

impl HtmlStripper {
    pub fn new() -> Self {
        Self {
            body_re: Regex::new(r"(?i)<body[^>]*>").unwrap(),
            br_re: Regex::new(r"(?i)<br[^>]*>").unwrap(),
            dropped_res: DROPPED_ELEMENTS
                .iter()
                .map(|tag| Regex::new(&format!(r"(?si)<{tag}[^>]*>.*?</{tag}\s*>")).unwrap())
                .collect(),
            comment_re: Regex::new(r"(?s)<!--.*?-->").unwrap(),
            tag_re: Regex::new(r"(?s)<[^>]*>").unwrap(),
            entity_re: Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap(),
            spaces_re: Regex::new(r" {2,}").unwrap(),
        }
    }

    /// Strips markup and returns the text content, one source line per line.
    pub fn strip(&self, html: &str) -> String {
        let html = html.replace("\r\n", "\n").replace('\r', "\n");

        // Only what follows the last body tag is content
        let body = match self.body_re.find_iter(&html).last() {
            Some(m) => &html[m.end()..],
            None => html.as_str(),
        };

        let mut text = self.br_re.replace_all(body, "\n").into_owned();
        for re in &self.dropped_res {
            text = re.replace_all(&text, "").into_owned();
        }
        text = self.comment_re.replace_all(&text, "").into_owned();
        text = self.tag_re.replace_all(&text, "").into_owned();
        text = self.decode_entities(&text);

        let text = text.replace('\t', "");
        let text = self.spaces_re.replace_all(&text, " ");
        text.trim().to_string()
    }

    fn decode_entities(&self, text: &str) -> String {
        self.entity_re
            .replace_all(text, |caps: &Captures| {
                let entity = &caps[1];
                decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl Default for HtmlStripper {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn strip_keeps_line_structure_of_table() {
        let html = r#"<html><head><title>Directory Listing</title></head>
<body>
<table>
<tr>
    <td>Dir</td>
    <td><a href="/pub/firefox/releases/59.0/">59.0/</a></td>
</tr>
</table>
</body></html>"#;

        let text = HtmlStripper::new().strip(html);
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        assert_eq!(lines, vec!["Dir", "59.0/"]);
    }

    #[test]
    fn strip_drops_head_and_script_content() {
        let html = "<HEAD><title>ignored</title></HEAD><BODY>kept<script type=\"x\">var a = 1;</script><STYLE>p {}</STYLE></BODY>";

        assert_eq!(HtmlStripper::new().strip(html), "kept");
    }

    #[rstest]
    #[case("a<br>b", "a\nb")]
    #[case("a<BR />b", "a\nb")]
    #[case("Tom &amp; Jerry", "Tom & Jerry")]
    #[case("&lt;tag&gt;", "<tag>")]
    #[case("&#65;&#x42;", "AB")]
    #[case("&unknown;", "&unknown;")]
    #[case("a\t\tb    c", "ab c")]
    #[case("x<!-- hidden -->y", "xy")]
    fn strip_handles_inline_markup(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(HtmlStripper::new().strip(html), expected);
    }
}
