//! Export assembly for the three output targets.
//!
//! The core only supplies the strings — downloading, printing and clipboard
//! plumbing belong to the host. All three builders take the current document
//! (and, where relevant, its rendered HTML) and return a finished string.

use crate::document::Document;

const UNTITLED: &str = "Untitled";

/// Stylesheet embedded in the print document.
const PRINT_STYLE: &str = "\
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    max-width: 800px;
    margin: 0 auto;
    padding: 40px 20px;
    line-height: 1.8;
    color: #333;
}
h1, h2, h3, h4, h5, h6 { margin-top: 1.5em; margin-bottom: 0.5em; color: #1a1a1a; }
h1 { font-size: 2em; border-bottom: 2px solid #e0e0e0; padding-bottom: 0.3em; }
p { margin: 1em 0; }
code { background: #f4f4f4; padding: 2px 6px; border-radius: 3px; font-family: 'Courier New', monospace; }
pre { background: #f4f4f4; padding: 16px; border-radius: 8px; overflow-x: auto; }
pre code { background: none; padding: 0; }
blockquote { border-left: 4px solid #007aff; margin: 1em 0; color: #666; background: #f8f9fa; padding: 12px 16px; }
img { max-width: 100%; height: auto; display: block; margin: 20px auto; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 8px 12px; text-align: left; }
th { background: #f4f4f4; }
hr { border: none; border-top: 2px solid #e0e0e0; margin: 30px 0; }
a { color: #007aff; text-decoration: none; }
";

fn display_title(doc: &Document) -> &str {
    if doc.title.is_empty() {
        UNTITLED
    } else {
        &doc.title
    }
}

/// Plain markdown export: title header, optional author line, raw text.
pub fn markdown_document(doc: &Document) -> String {
    let title = display_title(doc);
    let mut out = format!("# {title}\n\n");
    if !doc.author.is_empty() {
        out.push_str(&format!("By {}\n\n", doc.author));
    }
    out.push_str(&doc.text);
    out
}

/// A complete standalone HTML document for printing.
pub fn print_document(doc: &Document, rendered_html: &str) -> String {
    let title = display_title(doc);
    let author_line = if doc.author.is_empty() {
        String::new()
    } else {
        format!(
            "<p style=\"color: #666; margin-bottom: 30px;\">By {}</p>\n",
            doc.author
        )
    };
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <title>{title}</title>\n\
         <style>\n{PRINT_STYLE}</style>\n\
         </head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         {author_line}{rendered_html}\n\
         </body>\n\
         </html>\n"
    )
}

/// An inline-styled HTML fragment for pasting into rich-text surfaces that
/// strip external stylesheets.
pub fn clipboard_fragment(doc: &Document, rendered_html: &str) -> String {
    let title = display_title(doc);
    let author_line = if doc.author.is_empty() {
        String::new()
    } else {
        format!(
            "<p style=\"color: #888; font-size: 14px; margin-bottom: 30px;\">By {}</p>\n",
            doc.author
        )
    };
    format!(
        "<section style=\"max-width: 677px; margin: 0 auto; font-family: -apple-system, \
         BlinkMacSystemFont, 'Segoe UI', sans-serif;\">\n\
         <h1 style=\"font-size: 22px; font-weight: bold; color: #1a1a1a; \
         margin-bottom: 20px; text-align: left;\">{title}</h1>\n\
         {author_line}\
         <section style=\"font-size: 16px; line-height: 1.8; color: #333;\">\n\
         {rendered_html}\n\
         </section>\n\
         </section>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_has_title_header_and_author_line() {
        let doc = Document::new("body text", "My Post", "Ada");
        let out = markdown_document(&doc);
        assert!(out.starts_with("# My Post\n\n"));
        assert!(out.contains("By Ada\n\n"));
        assert!(out.ends_with("body text"));
    }

    #[test]
    fn markdown_omits_empty_author() {
        let doc = Document::new("body", "My Post", "");
        assert!(!markdown_document(&doc).contains("By "));
    }

    #[test]
    fn untitled_fallback() {
        let doc = Document::new("body", "", "");
        assert!(markdown_document(&doc).starts_with("# Untitled"));
    }

    #[test]
    fn print_document_embeds_rendered_html() {
        let doc = Document::new("ignored", "Post", "Ada");
        let out = print_document(&doc, "<p>rendered</p>");
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<p>rendered</p>"));
        assert!(out.contains("<title>Post</title>"));
        assert!(out.contains("By Ada"));
    }

    #[test]
    fn clipboard_fragment_is_inline_styled() {
        let doc = Document::new("ignored", "Post", "");
        let out = clipboard_fragment(&doc, "<p>x</p>");
        assert!(out.starts_with("<section style="));
        assert!(out.contains("<p>x</p>"));
        assert!(!out.contains("By "));
    }
}
