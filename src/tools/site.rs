//! Static site emitters: `index.html`, `css/style.css`, `js/main.js`.

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use super::Tool;

pub const HTML_PATH: &str = "site/index.html";
pub const CSS_PATH: &str = "site/css/style.css";
pub const JS_PATH: &str = "site/js/main.js";

/// Asset locations as referenced from `index.html`.
const CSS_HREF: &str = "css/style.css";
const JS_SRC: &str = "js/main.js";

const FALLBACK_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="description" content="Professional portfolio of [YOUR_NAME]">
    <meta name="keywords" content="portfolio, projects, developer">
    <title>[YOUR_NAME] | Portfolio</title>
    <link rel="stylesheet" href="css/style.css">
</head>
<body>
    <header>
        <nav>
            <a href="#home" class="logo">[YOUR_NAME]</a>
            <ul>
                <li><a href="#about">About</a></li>
                <li><a href="#projects">Projects</a></li>
                <li><a href="#skills">Skills</a></li>
                <li><a href="#contact">Contact</a></li>
            </ul>
        </nav>
    </header>
    <main id="home">
        <section id="about">
            <h1>Hi, I'm [YOUR_NAME]</h1>
            <p>[SHORT_BIO]</p>
        </section>
        <section id="projects">
            <h2>Projects</h2>
        </section>
        <section id="skills">
            <h2>Skills</h2>
        </section>
        <section id="contact">
            <h2>Contact</h2>
            <a href="mailto:[YOUR_EMAIL]">[YOUR_EMAIL]</a>
        </section>
    </main>
    <footer>
        <p>&copy; [YOUR_NAME]</p>
    </footer>
    <script src="js/main.js"></script>
</body>
</html>
"##;

const FALLBACK_CSS: &str = r##"/* Main styles */
:root {
    --primary-color: #2A2A2A;
    --secondary-color: #F5F5F5;
}

body {
    font-family: 'Segoe UI', sans-serif;
    margin: 0;
    padding: 0;
}
"##;

const FALLBACK_JS: &str = r##"// Smooth scrolling for in-page links
document.querySelectorAll('a[href^="#"]').forEach(anchor => {
    anchor.addEventListener('click', function (e) {
        e.preventDefault();
        document.querySelector(this.getAttribute('href')).scrollIntoView({
            behavior: 'smooth'
        });
    });
});
"##;

/// Rewrite stray asset references to the canonical layout and make sure
/// the page links `css/style.css` and loads `js/main.js`.
pub fn normalize_asset_paths(html: &str) -> String {
    let stylesheet = Regex::new(r#"href="(?:\./)?styles\.css""#).expect("valid regex");
    let script = Regex::new(r#"src="(?:\./)?script\.js""#).expect("valid regex");

    let html = stylesheet.replace_all(html, format!(r#"href="{}""#, CSS_HREF).as_str());
    let mut html = script
        .replace_all(&html, format!(r#"src="{}""#, JS_SRC).as_str())
        .into_owned();

    if !html.contains(CSS_HREF) {
        let link = format!(r#"<link rel="stylesheet" href="{}">"#, CSS_HREF);
        html = insert_before_closing(&html, "head", &link);
    }
    if !html.contains(JS_SRC) {
        let tag = format!(r#"<script src="{}"></script>"#, JS_SRC);
        html = insert_before_closing(&html, "body", &tag);
    }

    html
}

/// Insert `snippet` before the first `</tag>` (any case), or append it.
fn insert_before_closing(html: &str, tag: &str, snippet: &str) -> String {
    let closing = Regex::new(&format!("(?i)</{}>", tag)).expect("valid regex");
    match closing.find(html) {
        Some(m) => format!("{}{}{}", &html[..m.start()], snippet, &html[m.start()..]),
        None => format!("{}{}", html, snippet),
    }
}

/// Optional `content` argument; empty strings count as absent.
fn content_arg(args: &Value) -> Option<&str> {
    args["content"].as_str().filter(|s| !s.trim().is_empty())
}

fn content_schema(what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": format!("Full {} source. Omit to write the built-in template.", what)
            }
        }
    })
}

async fn write_site_file(workspace: &Path, relative: &str, content: &str) -> anyhow::Result<()> {
    let path = workspace.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, content).await?;
    tracing::info!("Wrote {} ({} bytes)", relative, content.len());
    Ok(())
}

/// Write the main HTML page.
pub struct CreateHtml;

#[async_trait]
impl Tool for CreateHtml {
    fn name(&self) -> &str {
        "create_html"
    }

    fn description(&self) -> &str {
        "Create the portfolio's main HTML page at site/index.html. Stylesheet and script references are normalized to css/style.css and js/main.js."
    }

    fn parameters_schema(&self) -> Value {
        content_schema("HTML")
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let content = normalize_asset_paths(content_arg(&args).unwrap_or(FALLBACK_HTML));
        write_site_file(workspace, HTML_PATH, &content).await?;
        Ok(format!("HTML file created at {}", HTML_PATH))
    }
}

/// Write the stylesheet.
pub struct CreateCss;

#[async_trait]
impl Tool for CreateCss {
    fn name(&self) -> &str {
        "create_css"
    }

    fn description(&self) -> &str {
        "Create the stylesheet for the portfolio at site/css/style.css."
    }

    fn parameters_schema(&self) -> Value {
        content_schema("CSS")
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let content = content_arg(&args).unwrap_or(FALLBACK_CSS);
        write_site_file(workspace, CSS_PATH, content).await?;
        Ok(format!("CSS file created at {}", CSS_PATH))
    }
}

/// Write the page script.
pub struct CreateJs;

#[async_trait]
impl Tool for CreateJs {
    fn name(&self) -> &str {
        "create_js"
    }

    fn description(&self) -> &str {
        "Create the JavaScript that adds interactivity to the portfolio at site/js/main.js."
    }

    fn parameters_schema(&self) -> Value {
        content_schema("JavaScript")
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let content = content_arg(&args).unwrap_or(FALLBACK_JS);
        write_site_file(workspace, JS_PATH, content).await?;
        Ok(format!("JavaScript file created at {}", JS_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><head><title>x</title></head><body><p>hi</p></body></html>";

    #[test]
    fn rewrites_all_four_alternate_spellings() {
        let html = r#"<head><link rel="stylesheet" href="styles.css"><link href="./styles.css"></head>
<body><script src="script.js"></script><script src="./script.js"></script></body>"#;

        let out = normalize_asset_paths(html);

        assert_eq!(out.matches(r#"href="css/style.css""#).count(), 2);
        assert_eq!(out.matches(r#"src="js/main.js""#).count(), 2);
        assert!(!out.contains("styles.css"));
        assert!(!out.contains("script.js"));
    }

    #[test]
    fn injects_missing_references_before_closing_tags() {
        let out = normalize_asset_paths(PAGE);

        assert!(out.contains(r#"<link rel="stylesheet" href="css/style.css"></head>"#));
        assert!(out.contains(r#"<script src="js/main.js"></script></body>"#));
    }

    #[test]
    fn closing_tags_match_case_insensitively() {
        let out = normalize_asset_paths("<HEAD></HEAD><BODY></BODY>");
        assert!(out.starts_with(r#"<HEAD><link rel="stylesheet" href="css/style.css"></HEAD>"#));
        assert!(out.ends_with(r#"<script src="js/main.js"></script></BODY>"#));
    }

    #[test]
    fn appends_when_no_closing_tags() {
        let out = normalize_asset_paths("<p>fragment</p>");
        assert!(out.contains("css/style.css"));
        assert!(out.ends_with(r#"<script src="js/main.js"></script>"#));
    }

    #[test]
    fn templates_keep_in_page_anchors() {
        assert!(FALLBACK_HTML.contains(r##"<a href="#home" class="logo">"##));
        assert!(FALLBACK_HTML.trim_end().ends_with("</html>"));
        assert!(FALLBACK_JS.contains(r##"'a[href^="#"]'"##));
        assert!(FALLBACK_JS.trim_end().ends_with("});"));
    }

    #[test]
    fn canonical_page_is_untouched() {
        assert_eq!(normalize_asset_paths(FALLBACK_HTML), FALLBACK_HTML);
    }

    #[tokio::test]
    async fn html_without_content_writes_fallback() {
        let dir = tempfile::tempdir().unwrap();

        let result = CreateHtml.execute(json!({}), dir.path()).await.unwrap();

        assert_eq!(result, "HTML file created at site/index.html");
        let written = std::fs::read_to_string(dir.path().join(HTML_PATH)).unwrap();
        assert_eq!(written, FALLBACK_HTML);
    }

    #[tokio::test]
    async fn html_content_is_normalized_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<html><head><link href="./styles.css"></head><body></body></html>"#;

        CreateHtml
            .execute(json!({ "content": html }), dir.path())
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join(HTML_PATH)).unwrap();
        assert!(written.contains(r#"href="css/style.css""#));
        assert!(written.contains(r#"<script src="js/main.js"></script></body>"#));
    }

    #[tokio::test]
    async fn css_and_js_overwrite_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("site/css")).unwrap();
        std::fs::write(dir.path().join(CSS_PATH), "old").unwrap();

        CreateCss
            .execute(json!({ "content": "body { color: red; }" }), dir.path())
            .await
            .unwrap();
        CreateJs.execute(json!({ "content": "" }), dir.path()).await.unwrap();

        let css = std::fs::read_to_string(dir.path().join(CSS_PATH)).unwrap();
        let js = std::fs::read_to_string(dir.path().join(JS_PATH)).unwrap();
        assert_eq!(css, "body { color: red; }");
        assert_eq!(js, FALLBACK_JS);
    }

    #[tokio::test]
    async fn io_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the `site` directory should be.
        std::fs::write(dir.path().join("site"), "").unwrap();

        let result = CreateCss.execute(json!({}), dir.path()).await;
        assert!(result.is_err());
    }
}
