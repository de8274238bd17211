//! HTML document rewriting.
//!
//! # Responsibilities
//! - Route every link-bearing attribute back through the proxy
//! - Honour the first `<base href>` as the resolution base for what follows
//! - Inject the provenance banner as the first child of `<body>`, or at the
//!   end of documents that never open one
//!
//! # Design Decisions
//! - Each call builds its own `lol_html` rewriter; no parse state outlives a request
//! - Rules are independent selectors, one attribute each, so an element
//!   matched by several rules still has every attribute rewritten exactly once
//! - Unresolvable values are left untouched instead of failing the page
//! - Doctype, comments and everything not matched pass through byte-for-byte

use std::cell::{Cell, RefCell};

use lol_html::{element, end, html_content::ContentType, HtmlRewriter, Settings};
use url::Url;

use crate::error::ProxyError;
use crate::rewrite::refresh::rewrite_refresh;
use crate::rewrite::srcset::rewrite_srcset;
use crate::rewrite::url::{is_fragment_only, RewriteContext};

/// `id` of the injected provenance banner.
pub const BANNER_ID: &str = "rewrite-proxy-banner";

/// Page decoration switches.
#[derive(Debug, Clone, Copy)]
pub struct RewriteOptions {
    pub banner: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self { banner: true }
    }
}

/// Rewrite a full HTML document so every reference re-enters the proxy.
pub fn rewrite_html(
    html: &str,
    ctx: &RewriteContext,
    options: RewriteOptions,
) -> Result<String, ProxyError> {
    let current = RefCell::new(ctx.clone());
    let base_seen = Cell::new(false);
    let banner_done = Cell::new(!options.banner);
    let mut output = Vec::with_capacity(html.len() + 512);

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("base[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        if !base_seen.replace(true) {
                            let resolved = ctx.base().join(href.trim());
                            if let Ok(base) = resolved {
                                let next = current.borrow().with_base(base);
                                *current.borrow_mut() = next;
                            }
                        }
                        el.remove_attribute("href");
                    }
                    Ok(())
                }),
                element!("[src]", |el| {
                    if let Some(src) = el.get_attribute("src") {
                        if let Some(proxied) = current.borrow().rewrite_reference(&src) {
                            el.set_attribute("src", &proxied)?;
                        }
                    }
                    Ok(())
                }),
                element!("[href]", |el| {
                    if el.tag_name() == "base" {
                        return Ok(());
                    }
                    if let Some(href) = el.get_attribute("href") {
                        if is_fragment_only(&href) {
                            return Ok(());
                        }
                        if let Some(proxied) = current.borrow().rewrite_reference(&href) {
                            el.set_attribute("href", &proxied)?;
                        }
                    }
                    Ok(())
                }),
                element!("form[action]", |el| {
                    if let Some(action) = el.get_attribute("action") {
                        if let Some(proxied) = current.borrow().rewrite_reference(&action) {
                            el.set_attribute("action", &proxied)?;
                        }
                    }
                    Ok(())
                }),
                element!("[srcset]", |el| {
                    if let Some(srcset) = el.get_attribute("srcset") {
                        if !srcset.trim().is_empty() {
                            let rewritten = rewrite_srcset(&srcset, &current.borrow());
                            el.set_attribute("srcset", &rewritten)?;
                        }
                    }
                    Ok(())
                }),
                element!("meta[http-equiv][content]", |el| {
                    let is_refresh = el
                        .get_attribute("http-equiv")
                        .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"));
                    if !is_refresh {
                        return Ok(());
                    }
                    if let Some(content) = el.get_attribute("content") {
                        if let Some(rewritten) = rewrite_refresh(&content, &current.borrow()) {
                            el.set_attribute("content", &rewritten)?;
                        }
                    }
                    Ok(())
                }),
                element!("body", |el| {
                    if !banner_done.replace(true) {
                        el.prepend(&banner_html(ctx.base()), ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            // `<body>` is optional markup; browsers place trailing content in the
            // implied body.
            document_content_handlers: vec![end!(|end| {
                if !banner_done.replace(true) {
                    end.append(&banner_html(ctx.base()), ContentType::Html);
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter
        .write(html.as_bytes())
        .and_then(|_| rewriter.end())
        .map_err(|e| ProxyError::Rewrite(e.to_string()))?;

    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// Fixed-position banner naming the page being viewed.
pub fn banner_html(target: &Url) -> String {
    format!(
        concat!(
            r#"<div id="{}" style="position:fixed;left:8px;top:8px;z-index:2147483647;"#,
            r#"background:#222;color:#fff;padding:6px 10px;border-radius:6px;"#,
            r#"font-family:Arial,Helvetica,sans-serif;font-size:12px;opacity:0.9;"#,
            r#"pointer-events:none;">proxied: {}</div>"#,
        ),
        BANNER_ID,
        html_escape::encode_text(target.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "/proxy";

    fn rewrite(html: &str, base: &str) -> String {
        let ctx = RewriteContext::new(Url::parse(base).unwrap(), PREFIX);
        rewrite_html(html, &ctx, RewriteOptions { banner: false }).unwrap()
    }

    #[test]
    fn test_rewrites_src_and_href() {
        let out = rewrite(
            r#"<img src="a.png"><a href="/about">About</a><script src="//cdn.test/x.js"></script>"#,
            "https://example.com/dir/index.html",
        );
        assert!(out.contains(r#"<img src="/proxy?url=https%3A%2F%2Fexample.com%2Fdir%2Fa.png">"#));
        assert!(out.contains(r#"<a href="/proxy?url=https%3A%2F%2Fexample.com%2Fabout">About</a>"#));
        assert!(out.contains(r#"<script src="/proxy?url=https%3A%2F%2Fcdn.test%2Fx.js"></script>"#));
    }

    #[test]
    fn test_fragment_hrefs_untouched() {
        let out = rewrite(r##"<a href="#top">Top</a>"##, "https://example.com/");
        assert_eq!(out, r##"<a href="#top">Top</a>"##);
    }

    #[test]
    fn test_form_action_only_touches_action() {
        let out = rewrite(
            r#"<form action="search" method="post" enctype="multipart/form-data"></form>"#,
            "https://example.com/app/",
        );
        assert_eq!(
            out,
            r#"<form action="/proxy?url=https%3A%2F%2Fexample.com%2Fapp%2Fsearch" method="post" enctype="multipart/form-data"></form>"#
        );
    }

    #[test]
    fn test_link_rewritten_once() {
        let out = rewrite(
            r#"<link rel="stylesheet" href="style.css">"#,
            "https://example.com/",
        );
        assert_eq!(
            out,
            r#"<link rel="stylesheet" href="/proxy?url=https%3A%2F%2Fexample.com%2Fstyle.css">"#
        );
    }

    #[test]
    fn test_element_with_several_attributes() {
        let out = rewrite(
            r#"<img src="a.png" srcset="a.png 1x, b.png 2x">"#,
            "https://example.com/dir/",
        );
        assert_eq!(
            out,
            "<img src=\"/proxy?url=https%3A%2F%2Fexample.com%2Fdir%2Fa.png\" \
             srcset=\"/proxy?url=https%3A%2F%2Fexample.com%2Fdir%2Fa.png 1x, \
             /proxy?url=https%3A%2F%2Fexample.com%2Fdir%2Fb.png 2x\">"
        );
    }

    #[test]
    fn test_meta_refresh() {
        let out = rewrite(
            r#"<meta http-equiv="Refresh" content="5; url=/next"><meta http-equiv="refresh" content="10">"#,
            "https://example.com/page",
        );
        assert!(out.contains(
            r#"content="5; url=/proxy?url=https%3A%2F%2Fexample.com%2Fnext""#
        ));
        assert!(out.contains(r#"<meta http-equiv="refresh" content="10">"#));
    }

    #[test]
    fn test_base_href_changes_resolution_base() {
        let out = rewrite(
            r#"<head><base href="https://static.example.net/assets/" target="_top"></head><img src="logo.png">"#,
            "https://example.com/page",
        );
        assert!(out.contains(r#"<base target="_top">"#));
        assert!(out.contains(
            r#"<img src="/proxy?url=https%3A%2F%2Fstatic.example.net%2Fassets%2Flogo.png">"#
        ));
    }

    #[test]
    fn test_non_http_references_untouched() {
        let html = r#"<img src="data:image/gif;base64,R0lGOD"><a href="mailto:a@b.test">m</a><a href="javascript:void(0)">j</a>"#;
        assert_eq!(rewrite(html, "https://example.com/"), html);
    }

    #[test]
    fn test_doctype_and_comments_preserved() {
        let html = "<!DOCTYPE html>\n<!-- note --><html><head><meta charset=\"utf-8\"></head><body></body></html>";
        assert_eq!(rewrite(html, "https://example.com/"), html);
    }

    #[test]
    fn test_malformed_markup_does_not_fail() {
        let out = rewrite(
            r#"<div><a href="x.html">unclosed <p><img src="y.png" <b>"#,
            "https://example.com/",
        );
        assert!(out.contains("/proxy?url=https%3A%2F%2Fexample.com%2Fx.html"));
    }

    #[test]
    fn test_banner_is_first_child_of_body() {
        let ctx = RewriteContext::new(
            Url::parse("https://example.com/?a=1&b=<2>").unwrap(),
            PREFIX,
        );
        let out = rewrite_html(
            "<html><body class=\"main\"><p>hi</p></body></html>",
            &ctx,
            RewriteOptions::default(),
        )
        .unwrap();

        let body = out.find("<body class=\"main\">").unwrap() + "<body class=\"main\">".len();
        assert!(out[body..].starts_with(&format!("<div id=\"{}\"", BANNER_ID)));
        assert!(out.contains("z-index:2147483647"));
        assert!(out.contains("proxied: https://example.com/?a=1&amp;b=%3C2%3E"));
        assert_eq!(out.matches(BANNER_ID).count(), 1);
    }

    #[test]
    fn test_banner_added_when_body_tag_omitted() {
        let ctx = RewriteContext::new(Url::parse("https://example.com/").unwrap(), PREFIX);
        let out = rewrite_html(
            "<!doctype html><title>t</title><p>hi</p>",
            &ctx,
            RewriteOptions::default(),
        )
        .unwrap();

        assert!(out.starts_with("<!doctype html><title>t</title><p>hi</p>"));
        assert!(out.ends_with(&banner_html(ctx.base())));
        assert_eq!(out.matches(BANNER_ID).count(), 1);
    }

    #[test]
    fn test_banner_disabled() {
        let ctx = RewriteContext::new(Url::parse("https://example.com/").unwrap(), PREFIX);
        let options = RewriteOptions { banner: false };
        let out = rewrite_html("<p>fragment</p>", &ctx, options).unwrap();
        assert_eq!(out, "<p>fragment</p>");
    }
}
