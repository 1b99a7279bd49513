//! 区块组装 - 业务能力层
//!
//! 把各区域独立生成的标记片段拼成一个完整文档。槽位顺序固定：
//!
//! ```text
//! header → navigation → <div flex> sidebar → main content </div> → footer
//! ```
//!
//! 与输入顺序、区块是否缺失都无关；缺失的槽位不输出任何标记。

use std::fmt::Write;

use crate::models::{LayoutBlock, RegionLabel, RegionMap, Slot};

/// 组装选项
#[derive(Debug, Clone, Copy)]
pub struct AssembleOptions {
    /// 是否输出完整页面（doctype / head / body）
    pub include_full_page: bool,
    /// 非标准区域是否追加到页面末尾
    pub place_extra_regions: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            include_full_page: true,
            place_extra_regions: false,
        }
    }
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Layout</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="min-h-screen bg-gray-50">
"#;

const PAGE_TAIL: &str = "</body>\n</html>";

/// 从区块列表组装（失败的区块使用占位标记）
pub fn assemble_blocks(
    blocks: &[LayoutBlock],
    width: u32,
    height: u32,
    options: AssembleOptions,
) -> String {
    let fragments: RegionMap<String> = blocks
        .iter()
        .map(|block| (block.name().to_string(), block.html()))
        .collect();
    assemble(&fragments, width, height, options)
}

/// 组装 region name → 片段
pub fn assemble(
    fragments: &RegionMap<String>,
    width: u32,
    height: u32,
    options: AssembleOptions,
) -> String {
    let slot = |s: Slot| fragments.get(s.name());

    let mut body = String::new();
    let _ = writeln!(body, "    <!-- Source screenshot: {}x{} -->", width, height);

    if let Some(html) = slot(Slot::Header) {
        push_slot(&mut body, 1, "Header", "header", r#"class="w-full""#, html);
    }
    if let Some(html) = slot(Slot::Navigation) {
        push_slot(&mut body, 1, "Navigation", "nav", r#"class="w-full""#, html);
    }

    body.push_str("\n    <!-- Main Container -->\n    <div class=\"flex flex-1\">\n");
    if let Some(html) = slot(Slot::Sidebar) {
        push_slot(&mut body, 2, "Sidebar", "aside", r#"class="w-64""#, html);
    }
    if let Some(html) = slot(Slot::MainContent) {
        push_slot(&mut body, 2, "Main Content", "main", r#"class="flex-1""#, html);
    }
    body.push_str("    </div>\n");

    if let Some(html) = slot(Slot::Footer) {
        push_slot(&mut body, 1, "Footer", "footer", r#"class="w-full""#, html);
    }

    if options.place_extra_regions {
        for (name, html) in fragments.iter() {
            if RegionLabel::from_label(name).slot().is_some() {
                continue;
            }
            let attrs = format!(r#"class="w-full" data-region="{}""#, escape_attr(name));
            push_slot(&mut body, 1, name, "section", &attrs, html);
        }
    }

    if options.include_full_page {
        format!("{}{}{}", PAGE_HEAD, body, PAGE_TAIL)
    } else {
        body
    }
}

fn push_slot(out: &mut String, depth: usize, title: &str, tag: &str, attrs: &str, html: &str) {
    let indent = "    ".repeat(depth);
    let _ = write!(
        out,
        "\n{indent}<!-- {title} -->\n{indent}<{tag} {attrs}>\n{indent}    {html}\n{indent}</{tag}>\n",
        indent = indent,
        title = comment_safe(title),
        tag = tag,
        attrs = attrs,
        html = html.trim(),
    );
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// HTML 注释中不能出现 `--`
fn comment_safe(value: &str) -> String {
    value.replace("--", "- -")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockOutcome, PixelBox};

    fn fragments(pairs: &[(&str, &str)]) -> RegionMap<String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_header_and_main_without_sidebar() {
        let html = assemble(
            &fragments(&[("header", "<h>"), ("main content", "<m>")]),
            800,
            600,
            AssembleOptions::default(),
        );

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<header class=\"w-full\">"));
        assert!(html.contains("<h>"));
        assert!(html.contains("<main class=\"flex-1\">"));
        assert!(html.contains("<m>"));
        assert!(!html.contains("<aside"));
        assert!(!html.contains("<nav"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_slot_order_independent_of_input_order() {
        let html = assemble(
            &fragments(&[
                ("footer", "<f>"),
                ("main content", "<m>"),
                ("sidebar", "<s>"),
                ("navigation", "<n>"),
                ("header", "<h>"),
            ]),
            800,
            600,
            AssembleOptions::default(),
        );

        let pos = |needle: &str| html.find(needle).unwrap();
        assert!(pos("<h>") < pos("<n>"));
        assert!(pos("<n>") < pos("<div class=\"flex flex-1\">"));
        assert!(pos("<div class=\"flex flex-1\">") < pos("<s>"));
        assert!(pos("<s>") < pos("<m>"));
        assert!(pos("<m>") < pos("<f>"));
    }

    #[test]
    fn test_extra_regions_omitted_by_default() {
        let html = assemble(
            &fragments(&[("header", "<h>"), ("hero banner", "<hero>")]),
            800,
            600,
            AssembleOptions::default(),
        );
        assert!(!html.contains("<hero>"));
        assert!(!html.contains("data-region"));
    }

    #[test]
    fn test_extra_regions_placed_when_enabled() {
        let html = assemble(
            &fragments(&[
                ("hero banner", "<hero>"),
                ("header", "<h>"),
                ("pricing \"table\"", "<p>"),
                ("footer", "<f>"),
            ]),
            800,
            600,
            AssembleOptions {
                include_full_page: true,
                place_extra_regions: true,
            },
        );

        assert!(html.contains(r#"<section class="w-full" data-region="hero banner">"#));
        assert!(html.contains(r#"data-region="pricing &quot;table&quot;""#));
        let pos = |needle: &str| html.find(needle).unwrap();
        // 追加在 footer 之后，保持检测顺序
        assert!(pos("<f>") < pos("<hero>"));
        assert!(pos("<hero>") < pos("<p>"));
    }

    #[test]
    fn test_fragment_only_output() {
        let html = assemble(
            &fragments(&[("header", "<h>")]),
            800,
            600,
            AssembleOptions {
                include_full_page: false,
                place_extra_regions: false,
            },
        );
        assert!(!html.contains("<!DOCTYPE"));
        assert!(!html.contains("<body"));
        assert!(html.contains("<header class=\"w-full\">"));
    }

    #[test]
    fn test_failed_block_becomes_placeholder() {
        let blocks = vec![
            LayoutBlock::new(
                RegionLabel::from_label("header"),
                PixelBox::new(0, 0, 800, 100),
                BlockOutcome::Generated("<h>".to_string()),
            ),
            LayoutBlock::new(
                RegionLabel::from_label("sidebar"),
                PixelBox::new(0, 100, 200, 600),
                BlockOutcome::Failed {
                    reason: "boom".to_string(),
                },
            ),
            LayoutBlock::new(
                RegionLabel::from_label("main content"),
                PixelBox::new(200, 100, 800, 600),
                BlockOutcome::Generated("<m>".to_string()),
            ),
        ];

        let html = assemble_blocks(&blocks, 800, 600, AssembleOptions::default());
        assert!(html.contains("<h>"));
        assert!(html.contains("<m>"));
        assert!(html.contains("<aside class=\"w-64\">"));
        assert!(html.contains("<!-- sidebar: generation failed -->"));
    }

    #[test]
    fn test_empty_input_still_produces_document() {
        let html = assemble(&RegionMap::new(), 800, 600, AssembleOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<div class=\"flex flex-1\">"));
        assert!(!html.contains("<header"));
    }
}
