use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::content::meta::ArticleMeta;
use crate::helpers::french_date;

/// Classes injected into every element of the article body so that
/// hand-written store files stay free of presentation markup.
const CLASS_REWRITES: [(&str, &str); 7] = [
    ("<h2", r#"<h2 class="text-3xl font-semibold mb-6 mt-10""#),
    ("<h3", r#"<h3 class="text-2xl font-medium mb-4 mt-8""#),
    ("<p>", r#"<p class="mb-6 leading-relaxed">"#),
    (
        "<blockquote>",
        r#"<blockquote class="my-8 p-6 bg-gray-50 border-l-4 border-blue-500 rounded-r italic text-white-700">"#,
    ),
    ("<ul>", r#"<ul class="list-disc pl-6 my-6 space-y-2">"#),
    ("<ol>", r#"<ol class="list-decimal pl-6 my-6 space-y-2">"#),
    ("<figure>", r#"<figure class="my-8">"#),
];

const IMG_CLASSES: &str = "rounded-lg shadow-md max-w-full h-auto mx-auto mt-4 mb-4";

lazy_static! {
    static ref H1_RE: Regex = Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>").unwrap();
    static ref P_RE: Regex = Regex::new(r"(?s)<p[^>]*>(.*?)</p>").unwrap();
    static ref IMG_RE: Regex = Regex::new(r"<img([^>]+)>").unwrap();
}

/// Inner markup of the first `<h1>`, tags preserved.
pub fn first_heading_html(body: &str) -> Option<String> {
    H1_RE
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
}

/// Inner markup of the first `<p>`, tags preserved.
pub fn first_paragraph_html(body: &str) -> Option<String> {
    P_RE.captures(body).map(|caps| caps[1].to_string())
}

/// Removes the first `<h1>` from the body. The heading is re-rendered
/// inside the article header, so it must go before class injection.
pub fn strip_first_heading(body: &str) -> String {
    H1_RE.replace(body, "").into_owned()
}

/// Applies the fixed rewrite table, then decorates images that carry
/// no class attribute of their own.
pub fn apply_article_classes(body: &str) -> String {
    let decorated = CLASS_REWRITES
        .iter()
        .fold(body.to_string(), |acc, (from, to)| acc.replace(from, to));
    IMG_RE
        .replace_all(&decorated, |caps: &Captures| {
            let attributes = &caps[1];
            if attributes.contains(r#"class=""#) {
                caps[0].to_string()
            } else {
                format!(
                    r#"<img{} class="{}" style="max-width: 10vw;" />"#,
                    attributes, IMG_CLASSES
                )
            }
        })
        .into_owned()
}

/// Builds the article header (title, optional subtitle and banner,
/// localized byline) and prepends it to the rewritten body.
pub fn compose_article(
    heading_html: Option<&str>,
    meta: &ArticleMeta,
    author: &str,
    date: &DateTime<Local>,
    body: &str,
) -> String {
    let mut out = String::with_capacity(body.len() + 512);
    out.push_str("<div class=\"article-header mb-12 text-center\">\n");
    out.push_str(&format!(
        "  <h1 class=\"text-4xl font-bold mb-4\">{}</h1>\n",
        heading_html.unwrap_or("Sans titre")
    ));
    if let Some(subtitle) = meta.subtitle.as_deref() {
        out.push_str(&format!(
            "  <p class=\"text-xl text-gray-400 mb-8\">{}</p>\n",
            subtitle
        ));
    }
    if let Some(banner) = meta.banner.as_deref() {
        out.push_str(&format!(
            "  <img src=\"{}\" alt=\"Bannière de {}\" style=\"width: 500px; height: 250px; object-fit: cover; margin: 0 auto; display: block;\" class=\"rounded-lg mb-6\" />\n",
            banner,
            heading_html.unwrap_or("l'article")
        ));
    }
    out.push_str(&format!(
        "  <div class=\"text-base text-gray-400 mb-10\">Par {}&nbsp;Le&nbsp;{}</div>\n",
        author,
        french_date(date)
    ));
    out.push_str("</div>\n");
    out.push_str("<div class=\"text-left\">\n");
    out.push_str(body);
    out.push_str("\n</div>\n");
    out
}
