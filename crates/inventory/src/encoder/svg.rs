//! SVG rendering of a 1-D symbol, and the inverse bar scan.
//!
//! Output is plain text with integer coordinates so identical inputs always
//! produce identical bytes. Bars carry `class="bar"`; nothing else does.

use std::fmt::Write as _;

use depot_core::{DomainError, DomainResult};

use super::RenderOptions;
use super::code128;

const BAR_TAG: &str = "<rect class=\"bar\"";

/// Render element widths (bar first) as an SVG document with a caption.
pub(crate) fn render(widths: &[u8], caption: &str, options: &RenderOptions) -> String {
    let module = options.module_width;
    let quiet = options.quiet_zone * module;
    let width = code128::module_count(widths) * module + 2 * quiet;
    let caption_height = options.font_size + options.font_size / 2;
    let height = options.bar_height + caption_height;

    let mut svg = String::with_capacity(64 + widths.len() * 56 + caption.len());
    // Writing into a String cannot fail.
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\" shape-rendering=\"crispEdges\">"
    );
    let _ = write!(
        svg,
        "<rect width=\"{width}\" height=\"{height}\" fill=\"#ffffff\"/><g fill=\"#000000\">"
    );

    let mut x = quiet;
    for (i, w) in widths.iter().enumerate() {
        let w = u32::from(*w) * module;
        if i % 2 == 0 {
            let _ = write!(
                svg,
                "{BAR_TAG} x=\"{x}\" y=\"0\" width=\"{w}\" height=\"{}\"/>",
                options.bar_height
            );
        }
        x += w;
    }

    let _ = write!(
        svg,
        "</g><text x=\"{}\" y=\"{}\" font-family=\"monospace\" font-size=\"{}\" \
         text-anchor=\"middle\">{}</text></svg>",
        width / 2,
        options.bar_height + options.font_size,
        options.font_size,
        escape(caption)
    );
    svg
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Recover element widths (in modules) from the bars of a rendered document.
///
/// The narrowest bar is taken as one module; every start symbol contains one.
pub(crate) fn scan_widths(svg: &str) -> DomainResult<Vec<u8>> {
    let mut bars = svg
        .split(BAR_TAG)
        .skip(1)
        .map(|chunk| {
            let tag = chunk
                .split_once("/>")
                .map(|(tag, _)| tag)
                .ok_or_else(|| DomainError::encoding("unterminated bar element"))?;
            Ok((attr(tag, "x")?, attr(tag, "width")?))
        })
        .collect::<DomainResult<Vec<(u32, u32)>>>()?;

    if bars.is_empty() {
        return Err(DomainError::encoding("artifact contains no bars"));
    }
    bars.sort_unstable_by_key(|(x, _)| *x);

    let module = bars
        .iter()
        .map(|(_, w)| *w)
        .min()
        .filter(|m| *m > 0)
        .ok_or_else(|| DomainError::encoding("zero-width bar"))?;

    let mut widths = Vec::with_capacity(bars.len() * 2);
    for (i, (x, w)) in bars.iter().enumerate() {
        if i > 0 {
            let (prev_x, prev_w) = bars[i - 1];
            let gap = prev_x
                .checked_add(prev_w)
                .and_then(|end| x.checked_sub(end))
                .ok_or_else(|| DomainError::encoding("overlapping bars"))?;
            widths.push(to_modules(gap, module)?);
        }
        widths.push(to_modules(*w, module)?);
    }
    Ok(widths)
}

fn to_modules(px: u32, module: u32) -> DomainResult<u8> {
    if px % module != 0 {
        return Err(DomainError::encoding(format!(
            "element of {px}px is not a multiple of the {module}px module"
        )));
    }
    match px / module {
        n @ 1..=4 => Ok(n as u8),
        n => Err(DomainError::encoding(format!("element width {n} out of range"))),
    }
}

fn attr(tag: &str, name: &str) -> DomainResult<u32> {
    let needle = format!(" {name}=\"");
    let start = tag
        .find(&needle)
        .map(|i| i + needle.len())
        .ok_or_else(|| DomainError::encoding(format!("bar is missing `{name}`")))?;
    let value = tag[start..]
        .split_once('"')
        .map(|(v, _)| v)
        .ok_or_else(|| DomainError::encoding(format!("unterminated `{name}` attribute")))?;
    value
        .parse()
        .map_err(|_| DomainError::encoding(format!("bad `{name}` value {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_is_escaped() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn bar_scan_recovers_widths() {
        let widths = code128::element_widths("A&B<C>", 128).unwrap();
        let svg = render(&widths, "A&B<C>", &RenderOptions::default());
        assert_eq!(scan_widths(&svg).unwrap(), widths);
    }

    #[test]
    fn quiet_zone_and_module_width_set_document_width() {
        let options = RenderOptions {
            module_width: 3,
            quiet_zone: 10,
            ..RenderOptions::default()
        };
        let widths = code128::element_widths("A", 128).unwrap();
        let svg = render(&widths, "A", &options);
        // start + 'A' + checksum = 33 modules, stop = 13, quiet = 2 * 10
        let expected = (33 + 13 + 20) * 3;
        assert!(svg.contains(&format!("width=\"{expected}\"")), "{svg}");
    }

    #[test]
    fn bars_at_the_coordinate_limit_are_rejected() {
        let svg = r#"<svg><rect class="bar" x="4294967295" y="0" width="1" height="1"/><rect class="bar" x="4294967295" y="0" width="1" height="1"/></svg>"#;
        let err = scan_widths(svg).unwrap_err();
        assert!(matches!(err, DomainError::Encoding(_)));
    }

    #[test]
    fn document_without_bars_is_rejected() {
        let err = scan_widths("<svg></svg>").unwrap_err();
        assert!(matches!(err, DomainError::Encoding(_)));
    }
}
